pub mod auth;
pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod followers;
pub mod friendship;
pub mod logging;
pub mod report;
pub mod routine;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod upload;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use follower_ledger::cli::{Cli, Command, DiffArgs, QueueArgs, ShowArgs, TrackArgs};
use follower_ledger::config::Config;
use follower_ledger::followers::parse_follower_list;
use follower_ledger::logging;
use follower_ledger::report;
use follower_ledger::store::diff;
use follower_ledger::store::{SnapshotStore, StoreResponse};
use follower_ledger::upload;
use std::io;
use tracing::{debug, error};

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    logging::init(config.log_level);
    debug!(data_dir = %config.data_dir.display(), "configuration loaded");

    let today = Utc::now().date_naive();
    let store = config.store();

    match cli.command {
        Command::Track(args) => track(&store, &args, today),
        Command::Show(args) => show(&store, &args, today),
        Command::Days(args) => match store.list_days() {
            Ok(days) => report::print_days(&days, args.json),
            Err(e) => {
                eprintln!("Error listing snapshots: {e}");
                std::process::exit(1);
            }
        },
        Command::Diff(args) => compare(&store, &args),
        Command::Queue(args) => queue(&config, &args),
    }
}

fn read_followers(source: &str) -> io::Result<String> {
    if source == "-" {
        io::read_to_string(io::stdin())
    } else {
        std::fs::read_to_string(source)
    }
}

fn track(store: &SnapshotStore, args: &TrackArgs, today: NaiveDate) {
    let content = read_followers(&args.followers).unwrap_or_else(|e| {
        eprintln!("Error reading follower list '{}': {e}", args.followers);
        std::process::exit(1);
    });

    let followers = parse_follower_list(&content).unwrap_or_else(|e| {
        eprintln!("Invalid follower list '{}': {e}", args.followers);
        std::process::exit(1);
    });

    match store.record(&args.account, &followers, today) {
        Ok(response) => {
            debug!(data_file = %response.data_file.display(), "analytics data written");
            if args.json {
                println!("{}", report::json::render_response(&response));
            } else {
                println!("Snapshot stored in {}", response.data_file.display());
            }
        }
        Err(e) => {
            error!(account = %args.account, "{e}");
            if args.json {
                let response = StoreResponse::failed(store.snapshot_path(today));
                println!("{}", report::json::render_response(&response));
            }
            eprintln!("Error recording followers: {e}");
            std::process::exit(1);
        }
    }
}

fn show(store: &SnapshotStore, args: &ShowArgs, today: NaiveDate) {
    let date = args.date.unwrap_or(today);

    match store.load_previous(&args.account, date) {
        Ok(Some(snapshot)) => report::print_snapshot(&args.account, date, &snapshot, args.json),
        Ok(None) => {
            eprintln!(
                "No snapshot for {} on {}. Run 'follower-ledger track' to create one.",
                args.account,
                date.format("%Y-%m-%d")
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error loading snapshot: {e}");
            std::process::exit(1);
        }
    }
}

fn compare(store: &SnapshotStore, args: &DiffArgs) {
    // validate that --from and --to are used together
    if args.from.is_some() != args.to.is_some() {
        eprintln!("Both --from and --to must be specified together.");
        std::process::exit(1);
    }

    let (from, to) = if let (Some(from), Some(to)) = (args.from, args.to) {
        (from, to)
    } else {
        match store.list_days() {
            Ok(days) if days.len() >= 2 => (days[1], days[0]),
            Ok(_) => {
                eprintln!("Need at least 2 snapshots to compare. Run 'follower-ledger track' on two days.");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Error loading snapshots: {e}");
                std::process::exit(1);
            }
        }
    };

    match diff::compare_days(store, &args.account, from, to) {
        Ok(result) => report::print_diff(&result, args.json),
        Err(e) => {
            eprintln!("Error comparing snapshots: {e}");
            std::process::exit(1);
        }
    }
}

fn queue(config: &Config, args: &QueueArgs) {
    let queue = config.upload_queue();

    let post = match queue.next() {
        Ok(Some(post)) => post,
        Ok(None) => {
            println!("Upload queue in {} is empty.", queue.dir().display());
            return;
        }
        Err(e) => {
            eprintln!("Error reading upload queue: {e}");
            std::process::exit(1);
        }
    };

    println!("photo:   {}", post.photo.display());
    match &post.caption {
        Some(caption) => println!("caption: {}", caption.display()),
        None => println!("caption: (none)"),
    }

    if args.mark_uploaded {
        match upload::mark_uploaded(&post) {
            Ok(archived) => {
                for path in archived {
                    println!("archived: {}", path.display());
                }
            }
            Err(e) => {
                eprintln!("Error marking upload: {e}");
                std::process::exit(1);
            }
        }
    }
}

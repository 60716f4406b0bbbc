use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dirjournal::{Event, Journal, JournalConfig};

/// Drive a directory journal from the command line.
#[derive(Debug, Parser)]
#[command(name = "dirjournal", version)]
struct Cli {
    /// Directory holding the `.journal` directory. Defaults to the current directory.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Number of threads loading records during a scan.
    #[arg(long, global = true, default_value_t = dirjournal::journal::config::DEFAULT_SCAN_WORKERS)]
    workers: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create and close events from many threads at once.
    Stress {
        #[arg(long, default_value_t = 30)]
        threads: usize,

        /// Events created and closed by each thread.
        #[arg(long, default_value_t = 50)]
        events: usize,
    },
    /// Print every event.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print events that have not been closed.
    Running {
        #[arg(long)]
        json: bool,
    },
    /// Print events created inside another event.
    Overlapping {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dirjournal=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("reading current directory")?,
    };
    let config = JournalConfig::new().with_scan_workers(cli.workers);
    let journal = Journal::open_with_config(&root, config)
        .with_context(|| format!("opening journal at {}", root.display()))?;

    match cli.command {
        Command::Stress { threads, events } => stress(&journal, threads, events),
        Command::List { json } => print_events(&journal.list_events()?, json)?,
        Command::Running { json } => print_events(&journal.running_events()?, json)?,
        Command::Overlapping { json } => print_events(&journal.overlapping_events()?, json)?,
    }

    journal.close().context("writing journal hint")?;
    Ok(())
}

fn stress(journal: &Journal, threads: usize, events: usize) {
    let failures = AtomicUsize::new(0);
    let started = Instant::now();

    std::thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                for _ in 0..events {
                    let result = journal
                        .create_event(["TEST", "echo", "test", ">", "test.txt"])
                        .and_then(|mut event| journal.close_event(&mut event));
                    if let Err(e) = result {
                        tracing::error!(error = %e, "stress iteration failed");
                        failures.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    tracing::info!(
        threads,
        events_per_thread = events,
        failures = failures.load(Ordering::Relaxed),
        elapsed = ?started.elapsed(),
        "stress run finished"
    );
}

fn print_events(events: &[Event], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(events)?);
    } else {
        for event in events {
            println!("{}", event);
        }
    }
    Ok(())
}

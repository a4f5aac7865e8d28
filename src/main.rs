use clap::Parser;
use quota_trend::cli::{Cli, Command};
use quota_trend::config::Config;
use quota_trend::fetch::MeteringClient;
use quota_trend::history::Snapshot;
use quota_trend::pipeline::{self, RunSummary};
use quota_trend::stats::{OrNa, Summary};
use quota_trend::{delta, logging, report, store, Result};

fn print_summary(run: &RunSummary) {
    println!("history: {} snapshots", run.entries);
    println!("average per day: {}", OrNa(run.summary.average));
    println!("days remaining:  {}", OrNa(run.summary.days_remaining));
    println!("chart:  {}", run.chart_file.display());
    println!("report: {}", run.report_file.display());
}

async fn execute(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Run => {
            // fetch before opening storage: a failed fetch touches nothing
            let client = MeteringClient::new(&config.fetch)?;
            let reading = client.fetch().await?;

            let mut store = store::open(config)?;
            let snapshot = Snapshot::new(pipeline::today(), reading.remaining);
            let run = pipeline::record(store.as_mut(), snapshot, config)?;
            print_summary(&run);
        }
        Command::Record(args) => {
            let date = args.date.unwrap_or_else(pipeline::today);
            let mut store = store::open(config)?;
            let run = pipeline::record(store.as_mut(), Snapshot::new(date, args.remaining), config)?;
            print_summary(&run);
        }
        Command::Render => {
            let store = store::open(config)?;
            let run = pipeline::render(store.as_ref(), config)?;
            print_summary(&run);
        }
        Command::Show(args) => {
            let store = store::open(config)?;
            let history = store.load()?;
            let rows = report::rows(&history);
            let summary = Summary::compute(
                &delta::derive(&history),
                history.latest().map(|s| s.remaining),
            );

            if args.json {
                println!("{}", report::json::render(&rows, &summary)?);
            } else {
                print!("{}", report::table::render(&rows, &summary, &config.unit_label));
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.log);
    if config.retention_days <= 0 {
        tracing::warn!(retention_days = config.retention_days, "retention disabled, history is unbounded");
    }

    if let Err(e) = execute(cli.command, &config).await {
        tracing::error!(error = %e, "run aborted");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

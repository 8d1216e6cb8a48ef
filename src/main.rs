use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use sentiment_watch::aggregate;
use sentiment_watch::alerts::{AlertContext, AlertWindow};
use sentiment_watch::config::Config;
use sentiment_watch::export;
use sentiment_watch::filter::{self, FilterCriteria, SentimentFilter, SortKey};
use sentiment_watch::ingest;
use sentiment_watch::logging;
use sentiment_watch::mock::{self, SeededRng};
use sentiment_watch::models::InteractionRecord;
use sentiment_watch::narrative::{self, SummaryTemplate};
use sentiment_watch::processing::{ProcessedBatch, ProcessingSession, Typewriter};
use sentiment_watch::report;

#[derive(Parser)]
#[command(name = "sentiment-watch")]
#[command(about = "Sentiment watchdog for customer support interactions", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "SENTIMENT_WATCH_CONFIG")]
    config: Option<PathBuf>,
    /// Override the simulated processing delay
    #[arg(long, global = true)]
    delay_ms: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Interaction records to load (.csv); sample data is used when omitted
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Seed for sample data and narrative selection
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print aggregate statistics and rollups
    Summary {
        #[command(flatten)]
        source: Source,
    },
    /// Search, filter and sort interactions
    Filter {
        #[command(flatten)]
        source: Source,
        #[arg(long, value_enum, default_value_t = SentimentFilter::All)]
        sentiment: SentimentFilter,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        agent: Option<String>,
        #[arg(long, value_enum, default_value_t = SortKey::Timestamp)]
        sort: SortKey,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Evaluate alert rules against the loaded interactions
    Alerts {
        #[command(flatten)]
        source: Source,
        /// Only consider interactions from the last N days
        #[arg(long, conflicts_with = "most_recent")]
        last_days: Option<i64>,
        /// Only consider the N most recent interactions
        #[arg(long)]
        most_recent: Option<usize>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: Source,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export interactions as CSV
    Export {
        #[command(flatten)]
        source: Source,
        #[arg(long, default_value = "sentiment-analysis-results.csv")]
        out: PathBuf,
    },
    /// Generate sample interactions, printed or written as CSV
    Mock {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Type out a conversational summary
    Narrate {
        #[command(flatten)]
        source: Source,
    },
}

fn rng_for(seed: Option<u64>) -> SeededRng {
    seed.map(SeededRng::new).unwrap_or_else(SeededRng::from_clock)
}

fn print_records(records: &[InteractionRecord]) {
    for record in records.iter() {
        println!(
            "- [{:+.2}] {} via {} ({}) {}: {}",
            record.sentiment,
            record.customer,
            record.channel,
            record.agent,
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.message
        );
    }
}

fn load_records(
    source: &Source,
    config: &Config,
    now: DateTime<Utc>,
) -> anyhow::Result<(String, Vec<InteractionRecord>)> {
    match &source.csv {
        Some(path) => {
            let records = ingest::read_records(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            Ok((path.display().to_string(), records))
        }
        None => {
            let records = mock::generate_records(&mut rng_for(source.seed), now, config.mock_record_count);
            Ok(("sample data".to_string(), records))
        }
    }
}

async fn process(config: &Config, records: Vec<InteractionRecord>) -> anyhow::Result<ProcessedBatch> {
    let session = ProcessingSession::new(config.processing_delay());
    session.submit(records).await.context("processing task failed")?;
    session.latest().context("processing produced no result")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(delay_ms) = cli.delay_ms {
        config.processing_delay_ms = delay_ms;
    }
    logging::init(config.log_format);
    let now = Utc::now();

    match cli.command {
        Commands::Summary { source } => {
            let (_, records) = load_records(&source, &config, now)?;
            if records.is_empty() {
                println!("No interactions found.");
                return Ok(());
            }
            let batch = process(&config, records).await?;
            let summary = &batch.summary;

            println!("Total interactions: {}", summary.total);
            println!("Average sentiment: {:.2}", summary.mean_sentiment);
            println!(
                "Positive {} / neutral {} / negative {}",
                summary.positive, summary.neutral, summary.negative
            );
            println!("Average confidence: {:.1}%", summary.average_confidence * 100.0);

            println!("Agents by average sentiment:");
            for agent in summary.agents.iter() {
                println!(
                    "- {} {:.2} across {} tickets ({:.1}% positive, {:.1}% negative)",
                    agent.agent, agent.mean_sentiment, agent.count, agent.positive_rate, agent.negative_rate
                );
            }

            println!("Top issues:");
            for issue in aggregate::top_issues(&batch.records, 3) {
                println!("- {} ({} negative mentions)", issue.keyword, issue.mentions);
            }
        }
        Commands::Filter {
            source,
            sentiment,
            channel,
            agent,
            sort,
            limit,
            search,
        } => {
            let (_, records) = load_records(&source, &config, now)?;
            let criteria = FilterCriteria {
                sentiment,
                channel: filter::parse_selector(channel),
                agent: filter::parse_selector(agent),
                sort_by: sort,
                limit: limit.map_or(config.default_limit, |limit| limit as usize),
                search,
            };
            let view = filter::filter_and_sort(&records, &criteria);

            if view.is_empty() {
                println!("No interactions match these filters.");
                return Ok(());
            }
            println!("Showing {} of {} interactions:", view.len(), records.len());
            print_records(&view);
        }
        Commands::Alerts {
            source,
            last_days,
            most_recent,
        } => {
            let (_, records) = load_records(&source, &config, now)?;
            let window = match (last_days, most_recent) {
                (Some(days), _) => AlertWindow::LastDays(days),
                (None, Some(count)) => AlertWindow::MostRecent(count),
                (None, None) => config.alert_window,
            };
            let batch = process(&config, records).await?;
            let mut alerts = AlertContext::new(window);
            let evaluation = alerts.evaluate(&batch.records, now);

            match &evaluation.spike {
                Some(alert) => {
                    println!("[{}] {}: {}", alert.severity, alert.message, alert.details);
                    for action in alert.suggested_actions.iter() {
                        println!("  - {action}");
                    }
                }
                None => println!("No sentiment spike detected."),
            }
            if let Some(warning) = &evaluation.warning {
                println!("[{}] {}: {}", warning.severity, warning.message, warning.details);
            }
        }
        Commands::Report { source, out } => {
            let (label, records) = load_records(&source, &config, now)?;
            let batch = process(&config, records).await?;
            let mut alerts = AlertContext::new(config.alert_window);
            alerts.evaluate(&batch.records, now);

            let report = report::build_report(&label, &batch.records, &alerts, now);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { source, out } => {
            let (_, records) = load_records(&source, &config, now)?;
            export::export_to_path(&out, &records)?;
            println!("Exported {} interactions to {}.", records.len(), out.display());
        }
        Commands::Mock { seed, count, out } => {
            let count = count.map_or(config.mock_record_count, |count| count as usize);
            let records = mock::generate_records(&mut rng_for(seed), now, count);
            match out {
                Some(path) => {
                    export::export_to_path(&path, &records)?;
                    println!("Wrote {} sample interactions to {}.", records.len(), path.display());
                }
                None => print_records(&records),
            }
        }
        Commands::Narrate { source } => {
            let (_, records) = load_records(&source, &config, now)?;
            let template = SummaryTemplate::pick(&mut rng_for(source.seed));
            let text = narrative::summarize_text(&records, template, now);

            let typewriter = Typewriter::new(config.reveal_delay());
            let mut stdout = std::io::stdout();
            let mut shown = 0;
            typewriter
                .reveal(&text, |frame| {
                    let _ = write!(stdout, "{}", &frame[shown..]);
                    let _ = stdout.flush();
                    shown = frame.len();
                })
                .await;
            println!();
        }
    }

    Ok(())
}

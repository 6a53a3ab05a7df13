use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use storm_report::config::Config;
use storm_report::logging;
use storm_report::metrics;
use storm_report::pipeline::ingestion::fetch::ensure_source;
use storm_report::pipeline::processing::normalize::rules::RuleSet;
use storm_report::pipeline::processing::normalize::CategoryNormalizer;
use storm_report::Pipeline;

#[derive(Parser)]
#[command(name = "storm_report")]
#[command(about = "Which severe weather events hurt people most, and which cost the most")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to $STORM_REPORT_CONFIG, then storm_report.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the data if needed and write the report, its charts and metrics.prom
    Run {
        /// Download the source artifact even when it is cached
        #[arg(long)]
        refresh: bool,
        /// Output directory (overrides [report].output_dir)
        #[arg(long)]
        output: Option<PathBuf>,
        /// First year of the window, inclusive
        #[arg(long)]
        start_year: Option<i32>,
        /// Last year of the window, inclusive
        #[arg(long)]
        end_year: Option<i32>,
    },
    /// Download and cache the source artifact only
    Fetch {
        #[arg(long)]
        refresh: bool,
    },
    /// Show how raw category strings are cleaned and matched
    Explain {
        #[arg(required = true)]
        categories: Vec<String>,
    },
    /// Print the rewrite rule table in application order
    Rules,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(&cli.log_dir);

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Run {
            refresh,
            output,
            start_year,
            end_year,
        } => {
            if let Some(output) = output {
                config.report.output_dir = output;
            }
            if let Some(start) = start_year {
                config.window.start_year = start;
            }
            if let Some(end) = end_year {
                config.window.end_year = end;
            }
            config.validate().context("validating command-line overrides")?;

            metrics::init_metrics();
            info!("Starting storm report run");
            let result = match Pipeline::run(&config, refresh) {
                Ok(result) => result,
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    return Err(e.into());
                }
            };

            println!("\n📊 Storm report {}", result.run_id);
            for line in &result.report.findings {
                println!("   {}", line);
            }
            println!("\n   Files:");
            for path in &result.output_files {
                println!("   - {}", path.display());
            }
        }
        Commands::Fetch { refresh } => {
            let artifact = ensure_source(&config.source, refresh).context("fetching source")?;
            println!("{}  {}", artifact.sha256, artifact.path.display());
        }
        Commands::Explain { categories } => {
            let rules = RuleSet::raw();
            let mut normalizer = CategoryNormalizer::from_config(&config.matching);
            for raw in &categories {
                let trace = rules.trace(raw);
                println!("{:?}", raw);
                for step in &trace.steps {
                    println!(
                        "  pass {} {:?}: {:?} -> {:?}",
                        step.pass, step.rule.family, step.before, step.after
                    );
                }
                match &normalizer.resolve(raw).matched {
                    Some(found) => println!(
                        "  => {:?} matches {} (distance {})\n",
                        trace.output, found.canonical, found.distance
                    ),
                    None => println!("  => {:?} is unmatched\n", trace.output),
                }
            }
        }
        Commands::Rules => {
            for (i, rule) in RuleSet::raw().rules().enumerate() {
                println!("{:>3}. {}", i + 1, rule);
            }
        }
    }

    Ok(())
}

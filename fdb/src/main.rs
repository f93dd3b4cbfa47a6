use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail, eyre};
use log::info;

use fortunedb::cli::{Cli, Command};
use fortunedb::config::Config;
use fortunedb::{FileFilter, FortuneLibrary, FortuneStore, Metric, MetricQuery};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("fortunedb starting");

    match cli.file {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .context(format!("Failed to read corpus file: {}", path.display()))?;
            let store = FortuneStore::from_blob(&raw)
                .context(format!("Failed to parse corpus file: {}", path.display()))?;
            run_store(&store, cli.command)
        }
        None => {
            let library = FortuneLibrary::load(&config.fortunes_dir)
                .context(format!("Failed to load fortunes from: {}", config.fortunes_dir.display()))?;
            run_library(&library, cli.command)
        }
    }
}

fn run_store(store: &FortuneStore, command: Command) -> Result<()> {
    match command {
        Command::Get { index } => {
            println!("{}", store.get(index)?.text());
        }
        Command::Random { prefixes, regex } => {
            if prefixes.is_some() || regex.is_some() {
                bail!("file name filters only apply to a fortunes directory, not --file");
            }
            println!("{}", store.random()?.text());
        }
        Command::Size => {
            println!("{}", store.len());
        }
        Command::Query { metric, eq, min, max } => {
            let metric = parse_metric(&metric)?;
            for fortune in store.query_by_metric(metric, metric_query(eq, min, max)?)? {
                print_query_row(metric.value_of(fortune), fortune.text());
            }
        }
        Command::Stats => {
            println!("Fortunes: {}", store.len().to_string().cyan());
            println!("  Total chars: {}", store.iter().map(|f| f.length()).sum::<usize>());
            println!("  Widest: {}", store.iter().map(|f| f.width()).max().unwrap_or(0));
            println!("  Tallest: {}", store.iter().map(|f| f.height()).max().unwrap_or(0));
        }
    }
    Ok(())
}

fn run_library(library: &FortuneLibrary, command: Command) -> Result<()> {
    match command {
        Command::Get { index } => {
            println!("{}", library.get(index)?.text());
        }
        Command::Random { prefixes, regex } => {
            let filter = FileFilter::from_settings(prefixes.as_deref(), regex.as_deref())?;
            println!("{}", library.random_matching(&filter)?.text());
        }
        Command::Size => {
            println!("{}", library.fortune_count());
        }
        Command::Query { metric, eq, min, max } => {
            let metric = parse_metric(&metric)?;
            for fortune in library.query_by_metric(metric, metric_query(eq, min, max)?)? {
                print_query_row(metric.value_of(fortune), fortune.text());
            }
        }
        Command::Stats => {
            println!("Files: {}", library.file_count().to_string().cyan());
            for name in library.file_names() {
                println!("  {}", name);
            }
            println!("Fortunes: {}", library.fortune_count().to_string().cyan());
            println!("  Total chars: {}", library.total_len());
        }
    }
    Ok(())
}

fn parse_metric(metric: &str) -> Result<Metric> {
    metric.parse::<Metric>().map_err(|err| eyre!(err))
}

fn metric_query(eq: Option<usize>, min: Option<usize>, max: Option<usize>) -> Result<MetricQuery> {
    match (eq, min, max) {
        (Some(value), _, _) => Ok(MetricQuery::Equals(value)),
        (None, Some(lo), Some(hi)) => Ok(MetricQuery::Between(lo, hi)),
        (None, Some(lo), None) => Ok(MetricQuery::AtLeast(lo)),
        (None, None, Some(hi)) => Ok(MetricQuery::AtMost(hi)),
        (None, None, None) => bail!("query needs --eq, --min, or --max"),
    }
}

fn print_query_row(value: usize, text: &str) {
    println!("{} {}", value.to_string().yellow(), text);
}

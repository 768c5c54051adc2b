use std::path::PathBuf;
use std::thread;

use anyhow::Context;
use clap::Parser;
use lexplain::{Config, Document, OutputFormat, Report, Session};
use tracing::{debug, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "lexplain",
    about = "Summarize legal documents, score their risk and answer questions about them",
    version
)]
struct Cli {
    /// File paths to analyze (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// Question to answer against each document
    #[arg(short, long)]
    question: Option<String>,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Analyze the built-in sample contract
    #[arg(long, conflicts_with = "files")]
    sample: bool,

    /// Simulated latency in milliseconds before results are shown
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Path to a TOML config file
    #[arg(short, long, env = "LEXPLAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config =
        Config::load_or_default(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(delay_ms) = cli.delay_ms {
        config.analysis_delay_ms = delay_ms;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    config.validate()?;

    let documents = if cli.sample {
        vec![Document::new("sample", "")]
    } else if cli.files.is_empty() {
        vec![Document::from_reader("<stdin>", std::io::stdin().lock())?]
    } else {
        cli.files
            .iter()
            .map(Document::from_path)
            .collect::<lexplain::Result<Vec<_>>>()?
    };

    for document in documents {
        let source = document.source.clone();
        let mut session = Session::with_sample(config.sample_document.clone());
        session.load(document);
        if let Some(question) = &cli.question {
            session.set_question(question.clone());
        }

        let ticket = session.request_analysis();
        debug!("Analyzing {source}");
        thread::sleep(config.analysis_delay());
        let outcome = ticket.run();

        let report = Report::new(&source, &outcome.result, outcome.answer.as_deref());
        match config.format {
            OutputFormat::Json => println!("{}", report.to_json()?),
            OutputFormat::Text => print!("{}", report.to_text()),
        }
    }

    Ok(())
}

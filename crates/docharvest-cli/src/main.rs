//! DocHarvest CLI - Command-line interface for harvesting documentation

use clap::{Args, Parser, Subcommand};
use docharvest::{
    harvest, load_category_index, load_documents, rebuild_markdown, render_tree, HarvestConfig,
    HarvestError, Labels, RebuildStats, RunResult, TaskOutcome, TaskProgress,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// DocHarvest - mirror a documentation portal as Markdown files
#[derive(Parser, Debug)]
#[command(name = "docharvest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch every document in the category index and write Markdown files
    Run(RunArgs),
    /// Print the category tree
    Tree {
        /// Category index file
        #[arg(long, short, default_value = "category.json")]
        input: PathBuf,
    },
    /// Rebuild Markdown files from a previously written documents file
    Render {
        /// Full result file of an earlier run
        #[arg(long, default_value = "documents.json")]
        documents_file: PathBuf,

        /// Root directory for Markdown files
        #[arg(long, short, default_value = "docs")]
        output_dir: PathBuf,

        /// Language code selecting the section labels
        #[arg(long, default_value = docharvest::config::DEFAULT_LANGUAGE)]
        language: String,

        /// Overwrite Markdown files that already exist
        #[arg(long)]
        no_skip_existing: bool,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Category index file [default: category.json]
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Root directory for Markdown files [default: docs]
    #[arg(long, short)]
    output_dir: Option<PathBuf>,

    /// Full result file [default: documents.json]
    #[arg(long)]
    documents_file: Option<PathBuf>,

    /// Summary file [default: documents_summary.json]
    #[arg(long)]
    summary_file: Option<PathBuf>,

    /// Catalog name sent with each request [default: harmonyos-guides]
    #[arg(long)]
    catalog: Option<String>,

    /// Language code sent with each request [default: cn]
    #[arg(long)]
    language: Option<String>,

    /// Pause between requests in milliseconds [default: 500]
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Fetch documents even when their Markdown file exists
    #[arg(long)]
    no_skip_existing: bool,

    /// Only write the JSON reports, no Markdown files
    #[arg(long)]
    no_markdown: bool,

    /// Document service endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds [default: 10]
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl RunArgs {
    fn into_config(self) -> HarvestConfig {
        let mut builder = HarvestConfig::builder()
            .skip_existing(!self.no_skip_existing)
            .save_markdown(!self.no_markdown);

        if let Some(input) = self.input {
            builder = builder.input(input);
        }
        if let Some(output_dir) = self.output_dir {
            builder = builder.output_dir(output_dir);
        }
        if let Some(documents_file) = self.documents_file {
            builder = builder.documents_file(documents_file);
        }
        if let Some(summary_file) = self.summary_file {
            builder = builder.summary_file(summary_file);
        }
        if let Some(catalog) = self.catalog {
            builder = builder.catalog(catalog);
        }
        if let Some(language) = self.language {
            builder = builder.language(language);
        }
        if let Some(ms) = self.delay_ms {
            builder = builder.delay(Duration::from_millis(ms));
        }
        if let Some(endpoint) = self.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some(ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let outcome = match cli.command {
        Commands::Run(args) => run_harvest(args.into_config()).await,
        Commands::Tree { input } => run_tree(&input),
        Commands::Render {
            documents_file,
            output_dir,
            language,
            no_skip_existing,
        } => run_render(&documents_file, &output_dir, &language, !no_skip_existing),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so progress output on stdout stays clean
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docharvest=info,warn"),
            1 => EnvFilter::new("docharvest=debug,info"),
            2 => EnvFilter::new("docharvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run_harvest(config: HarvestConfig) -> Result<(), HarvestError> {
    let result = harvest(&config, |p| writeln_safe(&format_progress(&p))).await?;
    writeln_safe(&format_summary(&result));
    Ok(())
}

fn run_tree(input: &std::path::Path) -> Result<(), HarvestError> {
    let roots = load_category_index(input)?;
    let rendered = render_tree(&roots);
    writeln_safe(rendered.trim_end());
    Ok(())
}

fn run_render(
    documents_file: &std::path::Path,
    output_dir: &std::path::Path,
    language: &str,
    skip_existing: bool,
) -> Result<(), HarvestError> {
    let documents = load_documents(documents_file)?;
    info!(count = documents.len(), file = %documents_file.display(), "Loaded documents");
    let stats = rebuild_markdown(
        &documents,
        output_dir,
        &Labels::for_language(language),
        skip_existing,
    );
    writeln_safe(&format_rebuild(&stats));
    Ok(())
}

/// One progress line per task
fn format_progress(progress: &TaskProgress) -> String {
    let prefix = format!("[{}/{}]", progress.index, progress.total);
    match &progress.outcome {
        TaskOutcome::Skipped => format!("{} Skipped: {} (already exists)", prefix, progress.name),
        TaskOutcome::Fetched => format!("{} Fetched: {}", prefix, progress.name),
        TaskOutcome::Saved(path) => {
            format!("{} Saved: {} -> {}", prefix, progress.name, path.display())
        }
        TaskOutcome::FetchFailed(err) => format!(
            "{} Failed: {} ({}): {}",
            prefix, progress.name, progress.document_ref, err
        ),
        TaskOutcome::WriteFailed(err) => {
            format!("{} Write failed: {}: {}", prefix, progress.name, err)
        }
    }
}

fn format_summary(result: &RunResult) -> String {
    format!(
        "\nTotal: {}\nSuccessful: {}\nSkipped: {}\nFailed: {}\nSaved: {}",
        result.total, result.successful, result.skipped, result.failed, result.saved
    )
}

fn format_rebuild(stats: &RebuildStats) -> String {
    format!(
        "Total: {}\nWritten: {}\nSkipped: {}\nFailed: {}",
        stats.total, stats.written, stats.skipped, stats.failed
    )
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

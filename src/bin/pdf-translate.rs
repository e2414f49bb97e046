//! CLI binary for pdf-translate.
//!
//! A thin shim over the library crate that maps CLI flags to an
//! `ExtractionGraph` and a `TranslationConfig`, then prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_translate::graph::{DEFAULT_MODEL, PLACEHOLDER_KEY};
use pdf_translate::{
    preview, translate, ContentId, ContentStatus, ExtractionGraph, ExtractionService,
    HttpExtractionService, ProgressCallback, TranslationConfig, TranslationOutput,
    TranslationProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// The sample document translated when no input is given.
const DEFAULT_INPUT: &str = "https://arxiv.org/pdf/2310.06825.pdf";

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a single spinner whose prefix tracks the
/// current phase.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Fetching input…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl TranslationProgressCallback for CliProgressCallback {
    fn on_input_ready(&self, bytes: u64) {
        self.bar.println(format!(
            "  {} Input ready  {}",
            green("✓"),
            dim(&format!("{bytes} bytes"))
        ));
        self.bar.set_prefix("Uploading");
        self.bar.set_message("Sending to extraction service…");
    }

    fn on_submitted(&self, content_id: &ContentId) {
        self.bar.println(format!(
            "  {} Submitted  {}",
            green("✓"),
            dim(&format!("content {content_id}"))
        ));
        self.bar.set_prefix("Extracting");
        self.bar.set_message("waiting for the pipeline…");
    }

    fn on_poll(&self, attempt: u32, status: &ContentStatus) {
        match status {
            ContentStatus::Pending => self.bar.set_message(format!("check #{attempt}: pending")),
            ContentStatus::Completed => {
                self.bar.set_prefix("Fetching");
                self.bar.set_message("reading artifact…");
            }
            ContentStatus::Failed { reason } => {
                self.bar.println(format!("  {} Extraction failed  {}", red("✗"), red(reason)));
            }
        }
    }

    fn on_complete(&self, chars: usize) {
        self.bar.finish_and_clear();
        eprintln!("{} {} characters translated", green("✔"), bold(&chars.to_string()));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Translate the sample paper against a local server
  pdf-translate

  # Translate a specific URL, print the first 500 characters
  pdf-translate https://example.com/report.pdf --preview-chars 500

  # Translate a local file into Spanish and save the full text
  pdf-translate report.pdf --language Spanish -o report.es.txt

  # Use a graph defined in YAML
  pdf-translate --graph graph.yaml report.pdf

  # Keep using a graph already registered under the same name
  pdf-translate report.pdf --reuse-graph

  # Print the graph that would be registered, then exit
  pdf-translate --print-graph

GRAPH FILE:
  name: pdf_translator
  extraction_policies:
    - extractor: tensorlake/openai
      name: pdf_to_french
      input_params:
        model_name: gpt-4o
        key: YOUR_OPENAI_API_KEY
        system_prompt: Translate the content of the following PDF ...

ENVIRONMENT VARIABLES:
  INDEXIFY_URL            Extraction service base URL
  OPENAI_API_KEY          Credential placed into the graph's policies
  PDF_TRANSLATE_MODEL     Model name placed into the graph's policies
"#;

/// Translate PDF documents through an extraction-pipeline service.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-translate",
    version,
    about = "Translate PDF files and URLs through an extraction-pipeline service",
    long_about = "Upload a PDF (local file or URL) to an Indexify-style extraction service \
whose graph runs an LLM translation policy, wait for the job, and print the translated text.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    #[arg(default_value = DEFAULT_INPUT)]
    input: String,

    /// Extraction service base URL.
    #[arg(long, env = "INDEXIFY_URL", default_value = pdf_translate::config::DEFAULT_SERVER_URL)]
    server: String,

    /// Service namespace.
    #[arg(long, env = "INDEXIFY_NAMESPACE", default_value = pdf_translate::config::DEFAULT_NAMESPACE)]
    namespace: String,

    /// Load the extraction graph from a YAML file instead of the built-in translator.
    #[arg(long, env = "PDF_TRANSLATE_GRAPH")]
    graph: Option<PathBuf>,

    /// Model name for the translation policy.
    #[arg(long, env = "PDF_TRANSLATE_MODEL")]
    model: Option<String>,

    /// Credential for the model backend.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Target language of the built-in translator.
    #[arg(long, env = "PDF_TRANSLATE_LANGUAGE", default_value = "French")]
    language: String,

    /// Keep downloaded inputs in this directory instead of a temp dir.
    #[arg(long, env = "PDF_TRANSLATE_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Write the full translated text to this file.
    #[arg(short, long, env = "PDF_TRANSLATE_OUTPUT")]
    output: Option<PathBuf>,

    /// Characters of the translation to print on stdout.
    #[arg(long, env = "PDF_TRANSLATE_PREVIEW_CHARS", default_value_t = 1000)]
    preview_chars: usize,

    /// Initial delay between status checks, in milliseconds.
    #[arg(long, env = "PDF_TRANSLATE_POLL_INTERVAL_MS", default_value_t = 500)]
    poll_interval_ms: u64,

    /// Upper bound for the status-check delay, in milliseconds.
    #[arg(long, env = "PDF_TRANSLATE_MAX_POLL_INTERVAL_MS", default_value_t = 10_000)]
    max_poll_interval_ms: u64,

    /// Give up waiting for the pipeline after this many seconds (0 = never).
    #[arg(long, env = "PDF_TRANSLATE_TIMEOUT", default_value_t = 600)]
    timeout: u64,

    /// HTTP download timeout in seconds (0 = none).
    #[arg(long, env = "PDF_TRANSLATE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-request timeout for extraction-service calls, in seconds (0 = none).
    #[arg(long, env = "PDF_TRANSLATE_REQUEST_TIMEOUT", default_value_t = 60)]
    request_timeout: u64,

    /// Print the extraction graph as YAML and exit.
    #[arg(long)]
    print_graph: bool,

    /// Do not register the graph; assume it already exists on the server.
    #[arg(long)]
    skip_graph_create: bool,

    /// Accept a graph of the same name that is already registered. The
    /// server keeps its definition, so local model, key and prompt changes
    /// are not applied.
    #[arg(long, env = "PDF_TRANSLATE_REUSE_GRAPH", conflicts_with = "skip_graph_create")]
    reuse_graph: bool,

    /// Output structured JSON (TranslationOutput) instead of text.
    #[arg(long, env = "PDF_TRANSLATE_JSON")]
    json: bool,

    /// Disable progress spinner.
    #[arg(long, env = "PDF_TRANSLATE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_TRANSLATE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_TRANSLATE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides all the feedback that matters while active, so
    // library INFO logs are muted unless -v is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.print_graph;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let graph = build_graph(&cli)?;

    if cli.print_graph {
        print!("{}", graph.to_yaml().context("Failed to serialise graph")?);
        return Ok(());
    }

    if !cli.skip_graph_create {
        graph
            .ensure_credentials()
            .context("Refusing to register the extraction graph")?;
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn TranslationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let service = HttpExtractionService::new(&config).context("Failed to create service client")?;

    // Dropping the translation future on Ctrl-C stops polling immediately.
    let output = tokio::select! {
        result = run(&cli, &graph, &service, &config) => result?,
        _ = tokio::signal::ctrl_c() => {
            anyhow::bail!("Interrupted while waiting for the extraction service");
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let shown = preview(&output.text, cli.preview_chars);
        handle
            .write_all(shown.as_bytes())
            .context("Failed to write to stdout")?;
        if !shown.ends_with('\n') {
            handle
                .write_all(b"\n")
                .context("Failed to write to stdout")?;
        }
    }

    if !cli.quiet && !cli.json {
        let stats = &output.stats;
        eprintln!(
            "   {}  {} checks  {}ms total{}",
            dim(&format!("content {}", output.content_id)),
            stats.poll_attempts,
            stats.total_duration_ms,
            cli.output
                .as_ref()
                .map(|p| format!("  →  {}", bold(&p.display().to_string())))
                .unwrap_or_default(),
        );
    }

    Ok(())
}

async fn run(
    cli: &Cli,
    graph: &ExtractionGraph,
    service: &dyn ExtractionService,
    config: &TranslationConfig,
) -> Result<TranslationOutput> {
    match cli.output {
        Some(ref path) => pdf_translate::translate_to_file(&cli.input, path, graph, service, config)
            .await
            .context("Translation failed"),
        None => translate(&cli.input, graph, service, config)
            .await
            .context("Translation failed"),
    }
}

/// Load or build the extraction graph, then apply CLI overrides.
fn build_graph(cli: &Cli) -> Result<ExtractionGraph> {
    let mut graph = match cli.graph {
        Some(ref path) => ExtractionGraph::from_path(path)
            .with_context(|| format!("Failed to load graph from {}", path.display()))?,
        None => ExtractionGraph::translator_for(&cli.language, DEFAULT_MODEL, PLACEHOLDER_KEY),
    };

    if let Some(ref model) = cli.model {
        graph = graph.with_model(model);
    }
    if let Some(ref key) = cli.api_key {
        graph = graph.with_key(key);
    }
    Ok(graph)
}

/// Map CLI args to `TranslationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<TranslationConfig> {
    let mut builder = TranslationConfig::builder()
        .server_url(&cli.server)
        .namespace(&cli.namespace)
        .download_timeout_secs(cli.download_timeout)
        .request_timeout_secs(cli.request_timeout)
        .poll_interval_ms(cli.poll_interval_ms)
        .max_poll_interval_ms(cli.max_poll_interval_ms)
        .poll_timeout_secs(cli.timeout)
        .create_graph(!cli.skip_graph_create)
        .reuse_existing_graph(cli.reuse_graph);

    if let Some(ref dir) = cli.work_dir {
        builder = builder.work_dir(dir);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

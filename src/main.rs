use anyhow::Result;
use bookscout::config::{load_config, SearchConfig};
use bookscout::controller::{PagedResultController, SearchEvent};
use bookscout::models::DEFAULT_PAGE_SIZE;
use bookscout::ui;
use bookscout::VolumesClient;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// bookscout - Search books from the Google Books volumes API
#[derive(Parser, Debug)]
#[command(name = "bookscout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search books from the Google Books volumes API", long_about = None)]
struct Cli {
    /// Query term to search for (an empty query is forwarded as-is)
    query: String,

    /// Maximum number of pages to fetch (0 = keep fetching until exhausted)
    #[arg(long, short, default_value_t = 1)]
    pages: usize,

    /// Results per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Override the volumes-search base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto => {
                if ui::is_terminal() {
                    OutputFormat::Table
                } else {
                    OutputFormat::Json
                }
            }
            other => other,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("bookscout={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration, then apply command-line overrides
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SearchConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    config.page_size = cli.page_size.max(1);

    let format = cli.output.resolve();
    let client = Arc::new(VolumesClient::with_config(&config));
    let mut controller =
        PagedResultController::new(client).with_page_size(config.page_size);

    controller.submit_query(&cli.query);

    let mut pages_loaded = 0usize;
    loop {
        match controller.next_event().await {
            SearchEvent::PageLoaded(items) => {
                pages_loaded += 1;
                let first_index = controller.results().len() - items.len();
                match format {
                    OutputFormat::Table => println!("{}", ui::render_table(&items, first_index)),
                    OutputFormat::Plain => print!("{}", ui::render_plain(&items, first_index)),
                    // JSON is emitted once, after the last page
                    OutputFormat::Json | OutputFormat::Auto => {}
                }
                if cli.pages != 0 && pages_loaded >= cli.pages {
                    break;
                }
                controller.request_more();
            }
            SearchEvent::Exhausted => {
                if !cli.quiet && format != OutputFormat::Json {
                    if controller.results().is_empty() {
                        ui::print_status(&format!("no results for \"{}\"", cli.query));
                    } else {
                        ui::print_status("no more results");
                    }
                }
                break;
            }
            SearchEvent::Error(err) => {
                ui::print_error(&err.to_string());
                anyhow::bail!("search failed: {err}");
            }
        }
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(controller.results())?);
    }

    Ok(())
}

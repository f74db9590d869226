//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use sitefetch_crawler::{OutputFormat, fetch_site, serialize_pages};
use sitefetch_shared::{
    AppConfig, ContentSelector, CrawlConfig, config_file_path, init_config, load_config,
    load_config_from,
};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// sitefetch: fetch a whole documentation site as Markdown.
#[derive(Parser)]
#[command(
    name = "sitefetch",
    version,
    about = "Fetch a website and save its pages as Markdown in text or JSON.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging entirely.
    #[arg(long, global = true)]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Output format accepted by `--format`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum FormatArg {
    Json,
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl a site starting from URL and write every page found.
    Fetch(FetchArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `sitefetch fetch`. Anything set here overrides the config file.
#[derive(Args, Debug)]
pub(crate) struct FetchArgs {
    /// Seed URL; only pages on its host are crawled.
    pub url: String,

    /// Write output to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Output format. Inferred from the `-o` extension when omitted.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Number of pages fetched at the same time.
    #[arg(short, long, env = "SITEFETCH_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Only fetch pages whose pathname matches (repeatable, `!` negates).
    #[arg(short = 'm', long = "match", value_name = "PATTERN")]
    pub match_patterns: Vec<String>,

    /// CSS selector narrowing each page to its main content.
    #[arg(long, value_name = "SELECTOR")]
    pub content_selector: Option<String>,

    /// Stop after this many pages.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Seed the crawl from the site's /sitemap.xml.
    #[arg(long)]
    pub sitemap: bool,

    /// Keep pages that redirect to another host.
    #[arg(long)]
    pub follow_domain_redirects: bool,

    /// Config file to use instead of ~/.sitefetch/sitefetch.toml.
    #[arg(long, env = "SITEFETCH_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Create the default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// Show current configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so crawl output on stdout stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = if cli.silent {
        EnvFilter::new("off")
    } else {
        let filter = match cli.verbose {
            0 => "sitefetch=info",
            1 => "sitefetch=debug",
            _ => "sitefetch=trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
    };

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fetch(args) => cmd_fetch(args).await,
        Command::Config { action } => match action {
            ConfigAction::Init { force } => cmd_config_init(force),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_fetch(args: FetchArgs) -> Result<()> {
    let config = crawl_config(&args)?;
    let format = resolve_format(args.format, args.out.as_deref());

    let pages = fetch_site(&args.url, config).await?;
    if pages.is_empty() {
        warn!(url = %args.url, "no pages were collected");
    } else {
        info!(pages = pages.len(), "crawl finished");
    }

    let output = serialize_pages(&pages, format)?;

    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, output)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), %format, "output written");
        }
        None => println!("{output}"),
    }

    Ok(())
}

fn cmd_config_init(force: bool) -> Result<()> {
    let path = config_file_path()?;
    if path.exists() && !force {
        return Err(eyre!(
            "config file already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }

    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the config file named by `--config` (or the default one) and layer
/// the command-line flags on top.
fn crawl_config(args: &FetchArgs) -> Result<CrawlConfig> {
    let app = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let mut config = CrawlConfig::try_from(&app)?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut CrawlConfig, args: &FetchArgs) {
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if !args.match_patterns.is_empty() {
        config.match_patterns = args.match_patterns.clone();
    }
    if let Some(selector) = &args.content_selector {
        config.content_selector = Some(ContentSelector::Static(selector.clone()));
    }
    if args.limit.is_some() {
        config.limit = args.limit;
    }
    if args.sitemap {
        config.enable_sitemap = true;
    }
    if args.follow_domain_redirects {
        config.follow_domain_redirects = true;
    }
}

/// `--format` wins; otherwise a `.json` output file selects JSON and
/// everything else is text.
fn resolve_format(format: Option<FormatArg>, out: Option<&Path>) -> OutputFormat {
    if let Some(format) = format {
        return format.into();
    }

    let is_json = out
        .and_then(Path::extension)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

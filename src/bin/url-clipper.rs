//! url-clipper command line
//!
//! Clips a web page into a markdown note file, or opens the page in Chrome
//! so a content region can be picked by hand.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use url_clipper::note::InsertPosition;
use url_clipper::utils::normalize_url;
use url_clipper::{BrowserSession, ClipRequest, Clipper, ClipperSettings, ExtractMode, HttpTransport, LaunchOptions, NoteFile};

const DEFAULT_CONFIG: &str = "url-clipper.json";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Detect the main content automatically
    Auto,
    /// Use a CSS selector
    Css,
    /// Use an XPath expression
    Xpath,
}

impl From<ModeArg> for ExtractMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => ExtractMode::Auto,
            ModeArg::Css => ExtractMode::Css,
            ModeArg::Xpath => ExtractMode::Xpath,
        }
    }
}

#[derive(Parser)]
#[command(name = "url-clipper")]
#[command(version)]
#[command(about = "Clip the main content of a web page into a markdown note", long_about = None)]
struct Cli {
    /// Settings file (default: ./url-clipper.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clip a page into a note
    Clip {
        /// Page to clip
        url: String,

        /// Markdown note that receives the clip (must exist)
        #[arg(long, value_name = "FILE")]
        note: PathBuf,

        /// How to find the content (default: from settings)
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// CSS selector or XPath for the css/xpath modes
        #[arg(long, value_name = "EXPR")]
        path: Option<String>,

        /// Insert before this 0-based line instead of at the end
        #[arg(long, value_name = "N")]
        line: Option<usize>,

        /// Keep remote image references
        #[arg(long)]
        no_images: bool,

        /// Prefix for downloaded image file names
        #[arg(long, value_name = "PREFIX")]
        image_prefix: Option<String>,
    },

    /// Open a page in Chrome and pick the content region
    Pick {
        /// Page to open
        url: String,

        /// Locator printed as the content path
        #[arg(long, value_enum, default_value = "css")]
        mode: ModeArg,

        /// Seconds to wait for a double-click confirmation
        #[arg(long, default_value = "300")]
        timeout: u64,

        /// Run the browser without a window
        #[arg(long)]
        headless: bool,

        /// Path to custom browser executable
        #[arg(long, value_name = "PATH")]
        executable_path: Option<PathBuf>,
    },

    /// Print the effective settings
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let settings = ClipperSettings::load(&config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;

    init_logging(settings.debug);

    match cli.command {
        Command::Clip {
            url,
            note,
            mode,
            path,
            line,
            no_images,
            image_prefix,
        } => {
            let mut settings = settings;
            if no_images {
                settings.download_images = false;
            }
            if let Some(prefix) = image_prefix {
                settings.image_prefix = prefix;
            }

            let mut request = ClipRequest::from_settings(normalize_url(&url), &settings);
            if let Some(mode) = mode {
                request.mode = mode.into();
            }
            if let Some(path) = path {
                request.content_path = path;
            }

            let position = line.map(InsertPosition::Line).unwrap_or_default();
            let mut destination = NoteFile::open(&note).at(position);
            let clipper = Clipper::new(HttpTransport::new()?, settings);

            let notifier = |message: &str| eprintln!("{}", message);
            match clipper.clip(&request, &mut destination, &notifier).await {
                Ok(summary) => {
                    let images = &summary.images;
                    if images.localized_count() + images.failed_count() > 0 {
                        eprintln!(
                            "Images: {} stored, {} failed, {} skipped",
                            images.localized_count(),
                            images.failed_count(),
                            images.skipped_count()
                        );
                    }
                }
                // already reported through the notifier
                Err(_) => std::process::exit(1),
            }
        }

        Command::Pick {
            url,
            mode,
            timeout,
            headless,
            executable_path,
        } => pick(&normalize_url(&url), mode.into(), Duration::from_secs(timeout), headless, executable_path)?,

        Command::Config => {
            eprintln!("Settings file: {}", config_path.display());
            println!("{}", settings.to_json()?);
        }
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "url_clipper=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn pick(
    url: &str,
    mode: ExtractMode,
    timeout: Duration,
    headless: bool,
    executable_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut options = LaunchOptions::new().headless(headless);
    if let Some(path) = executable_path {
        options = options.chrome_path(path);
    }

    let session = BrowserSession::launch(options)?;
    session.open(url)?;

    let mut picker = session.start_picker()?;
    eprintln!("Hover to highlight, click to preview, double-click to confirm.");

    let Some(pick) = picker.wait_for_confirmation(timeout)? else {
        picker.stop();
        bail!("No element confirmed within {} seconds", timeout.as_secs());
    };
    picker.stop();

    let locator = pick.locator();
    let output = serde_json::json!({
        "css": locator.css,
        "xpath": locator.xpath,
        "mode": mode.as_str(),
        "contentPath": locator.for_mode(mode).unwrap_or_default(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

use std::io::BufRead;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vpm::render::{self, render};
use vpm::{
    capture_file, capture_url, App, AppConfig, AppError, CaptureConfig, LocalImage, LogFormat,
    MatchClient, MatchService, PendingQuery, QuerySlot, QuickFilter, StubMatcher, UploadCapture,
    UploadMethod,
};

/// Delay added by `--demo` so the loading screen is visible.
const DEMO_LATENCY: Duration = Duration::from_millis(400);

const HELP: &str = "\
commands:
  file <path>          search with a local image
  drop <path>...       drop files on the upload area (first one is used)
  url <url>            search with an image URL
  search <text>        filter by name, brand, category or tag (empty clears)
  threshold <0-100>    minimum similarity in percent
  quick <high|medium|all>
  brand <name>         toggle a brand filter
  reset                threshold back to 70%, brands cleared
  new                  start a new search
  show                 redraw the current screen
  help                 this text
  quit";

#[derive(Parser)]
#[command(name = "vpm", version)]
#[command(about = "Find visually similar products from an image", long_about = None)]
struct Cli {
    /// Matching service base URL; overrides VPM_BACKEND_URL and vpm.toml.
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Answer from the built-in demo catalogue instead of the service.
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Search once and print the results.
    Match {
        /// Local image path or http(s) URL.
        source: String,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, conflicts_with = "quick", value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,
        #[arg(long)]
        quick: Option<QuickFilter>,
        /// Only show this brand; repeat for several.
        #[arg(long = "brand")]
        brands: Vec<String>,
        /// Print the results as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Read commands from stdin and redraw after each one.
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = AppConfig::load_dotenv();
    let config = AppConfig::load(cli.backend_url.as_deref())?;
    init_tracing(&config);
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let service: Box<dyn MatchService> = if cli.demo {
        tracing::info!("demo mode, no requests will be sent");
        Box::new(StubMatcher::default().with_latency(DEMO_LATENCY))
    } else {
        Box::new(MatchClient::new(config.client_config())?)
    };

    match cli.cmd {
        Cmd::Match {
            source,
            search,
            threshold,
            quick,
            brands,
            json,
        } => {
            let opts = MatchOpts {
                search,
                threshold,
                quick,
                brands,
                json,
            };
            run_match(&config, service.as_ref(), &source, opts).await
        }
        Cmd::Interactive => run_interactive(&config, service.as_ref()).await,
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

struct MatchOpts {
    search: Option<String>,
    threshold: Option<u8>,
    quick: Option<QuickFilter>,
    brands: Vec<String>,
    json: bool,
}

async fn run_match(
    config: &AppConfig,
    service: &dyn MatchService,
    source: &str,
    opts: MatchOpts,
) -> Result<()> {
    let query = query_from_source(source, &config.capture_config())?;

    let mut app = App::new();
    app.submit(query, service).await?;
    if let Some(message) = app.error() {
        bail!("{message}");
    }

    if let Some(text) = opts.search {
        app.set_search_text(text)?;
    }
    match (opts.quick, opts.threshold) {
        (Some(quick), _) => app.apply_quick_filter(quick)?,
        (None, Some(percent)) => app.set_threshold(percent)?,
        (None, None) => {}
    }
    for brand in &opts.brands {
        app.select_brand(brand)?;
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&render::results_view(&app))?);
    } else {
        println!("{}", render(&app));
    }
    Ok(())
}

/// URLs go through the URL capture, anything else is a local path.
fn query_from_source(source: &str, cfg: &CaptureConfig) -> Result<PendingQuery> {
    let trimmed = source.trim();
    let query = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        capture_url(trimmed)?
    } else {
        capture_file(Path::new(trimmed), cfg)?
    };
    Ok(query)
}

#[derive(Debug, PartialEq)]
enum Command {
    File(String),
    Drop(Vec<String>),
    Url(String),
    Search(String),
    Threshold(u8),
    Quick(QuickFilter),
    Brand(String),
    Reset,
    New,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let need = |what: &str| {
        if rest.is_empty() {
            Err(format!("{word}: missing {what}"))
        } else {
            Ok(rest.to_string())
        }
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "file" => Command::File(need("path")?),
        "drop" => Command::Drop(rest.split_whitespace().map(str::to_string).collect()),
        "url" => Command::Url(rest.to_string()),
        "search" => Command::Search(rest.to_string()),
        "threshold" => {
            let percent = need("percentage")?
                .trim_end_matches('%')
                .parse::<u8>()
                .map_err(|_| format!("threshold: '{rest}' is not a number between 0 and 100"))?;
            Command::Threshold(percent)
        }
        "quick" => Command::Quick(need("high, medium or all")?.parse()?),
        "brand" => Command::Brand(need("brand name")?),
        "reset" => Command::Reset,
        "new" => Command::New,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(cmd))
}

async fn run_interactive(config: &AppConfig, service: &dyn MatchService) -> Result<()> {
    let mut app = App::new();
    let mut control = UploadCapture::new(QuerySlot::default(), config.capture_config());

    println!("{}\n\n{HELP}", render(&app));
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        control.set_disabled(app.is_loading());
        let captured = match cmd {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Show => Ok(()),
            Command::File(path) => {
                control.set_method(UploadMethod::File);
                control.select_file(Path::new(&path))
            }
            Command::Drop(paths) => {
                let items: Vec<LocalImage> = paths.iter().map(LocalImage::new).collect();
                control.drop_files(&items)
            }
            Command::Url(url) => {
                control.set_method(UploadMethod::Url);
                control.set_url_input(url);
                control.submit().map(|_| ())
            }
            Command::New => report(app.new_search()),
            Command::Search(text) => report(app.set_search_text(text)),
            Command::Threshold(percent) => report(app.set_threshold(percent)),
            Command::Quick(quick) => report(app.apply_quick_filter(quick)),
            Command::Brand(brand) => report(app.toggle_brand(&brand).map(|_| ())),
            Command::Reset => report(app.reset_filters()),
        };
        if let Err(err) = captured {
            tracing::info!(error = %err, "upload ignored");
            println!("{err}");
        }

        if let Some(query) = control.sink_mut().take() {
            app.begin(query.clone())?;
            println!("{}", render(&app));
            let result = service.submit_query(&query).await;
            app.finish(result)?;
        }
        println!("{}", render(&app));
    }
    Ok(())
}

/// Print controller refusals; they never end the session.
fn report(result: Result<(), AppError>) -> Result<(), vpm::CaptureError> {
    if let Err(err) = result {
        println!("{err}");
    }
    Ok(())
}

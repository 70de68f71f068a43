//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use champscout_client::PageClient;
use champscout_extractor::{Extractor, parse_html_bytes};
use champscout_shared::{
    AppConfig, ChampionRecord, Locale, MasteryRecord, RiotId, ScoutError, config_file_path,
    init_config, load_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// champscout: most-played champions and masteries from summoner pages.
#[derive(Parser)]
#[command(
    name = "champscout",
    version,
    about = "Extract most-played champions and champion masteries from summoner pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Record kind to extract from a saved page.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum Kind {
    Champions,
    Masteries,
}

/// Options shared by the extracting commands.
#[derive(clap::Args, Clone, Debug)]
pub(crate) struct OutputArgs {
    /// Number of records to show (defaults to the config's top_n).
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Page language: ko or en (defaults to the config's locale).
    #[arg(long)]
    pub locale: Option<Locale>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract records from a saved HTML page ("-" reads stdin).
    Parse {
        /// Path to the HTML file.
        file: PathBuf,

        /// Which records the page holds.
        #[arg(short, long, value_enum)]
        kind: Kind,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch a player's champions and mastery pages and extract both.
    Lookup {
        /// Riot ID as name#tag (e.g. "Hide on bush#KR1").
        riot_id: String,

        /// Server region (defaults to the config's region).
        #[arg(short, long)]
        region: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "champscout=warn,champscout_extractor=warn",
        1 => "champscout=info,champscout_extractor=info,champscout_client=info",
        2 => "champscout=debug,champscout_extractor=debug,champscout_client=debug",
        _ => "champscout=trace,champscout_extractor=trace,champscout_client=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
        Command::Parse { file, kind, output } => cmd_parse(&file, kind, &output),
        Command::Lookup {
            riot_id,
            region,
            output,
        } => cmd_lookup(&riot_id, region.as_deref(), &output).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Config file values with command-line overrides applied.
fn resolve_config(output: &OutputArgs, region: Option<&str>) -> Result<AppConfig> {
    let mut config = load_config()?;

    if let Some(top) = output.top {
        config.defaults.top_n = top;
    }
    if let Some(locale) = output.locale {
        config.defaults.locale = locale;
    }
    if let Some(region) = region {
        config.defaults.region = region.to_string();
    }

    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

fn read_input(file: &PathBuf) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if file.as_os_str() == "-" {
        std::io::stdin()
            .read_to_end(&mut bytes)
            .wrap_err("failed to read stdin")?;
    } else {
        bytes = std::fs::read(file).map_err(|e| ScoutError::io(file, e))?;
    }
    Ok(bytes)
}

fn cmd_parse(file: &PathBuf, kind: Kind, output: &OutputArgs) -> Result<()> {
    let config = resolve_config(output, None)?;
    let extractor = Extractor::from_config(&config)?;
    let top_n = config.defaults.top_n;

    let bytes = read_input(file)?;
    let doc = parse_html_bytes(&bytes).map_err(page_error)?;

    info!(file = %file.display(), ?kind, top_n, "extracting from saved page");

    match kind {
        Kind::Champions => print_champions(&extractor.champions_in(&doc, top_n), output.json),
        Kind::Masteries => print_masteries(&extractor.masteries_in(&doc, top_n), output.json),
    }
}

/// Phrase an unreadable page differently from every other failure.
fn page_error(err: ScoutError) -> color_eyre::eyre::Report {
    if err.is_parse() {
        eyre!("could not read the page: {err}")
    } else {
        err.into()
    }
}

// ---------------------------------------------------------------------------
// lookup
// ---------------------------------------------------------------------------

async fn cmd_lookup(riot_id: &str, region: Option<&str>, output: &OutputArgs) -> Result<()> {
    let riot_id: RiotId = riot_id.parse()?;
    let config = resolve_config(output, region)?;
    let extractor = Extractor::from_config(&config)?;
    let client = PageClient::from_config(&config)?;
    let top_n = config.defaults.top_n;

    info!(%riot_id, region = %config.defaults.region, "looking up summoner");

    let spinner = spinner(&format!("Fetching pages for {riot_id}"), output.json);
    let pages = client.fetch_summoner(&riot_id).await;
    spinner.finish_and_clear();
    let pages = pages?;

    let champions = extractor.champions(&pages.champions, top_n).map_err(page_error)?;
    let masteries = extractor.masteries(&pages.mastery, top_n).map_err(page_error)?;

    if output.json {
        let value = serde_json::json!({
            "riot_id": riot_id.to_string(),
            "champions": champions,
            "masteries": masteries,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("  {riot_id}");
    print_masteries(&masteries, false)?;
    print_champions(&champions, false)?;
    Ok(())
}

fn spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_champions(records: &[ChampionRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!();
    println!("  Most played");
    if records.is_empty() {
        println!("  No champion data on this page.");
        return Ok(());
    }

    println!("  {:<3} {:<16} {:>5} {:>6} {:>8}", "#", "Champion", "Wins", "Losses", "Win rate");
    for (i, rec) in records.iter().enumerate() {
        println!(
            "  {:<3} {:<16} {:>5} {:>6} {:>7.1}%",
            i + 1,
            rec.name,
            rec.wins,
            rec.losses,
            rec.win_rate()
        );
    }
    Ok(())
}

fn print_masteries(records: &[MasteryRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!();
    println!("  Champion mastery");
    if records.is_empty() {
        println!("  No mastery data on this page.");
        return Ok(());
    }

    println!("  {:<3} {:<16} {:>12} {:>6}", "#", "Champion", "Score", "Level");
    for (i, rec) in records.iter().enumerate() {
        println!(
            "  {:<3} {:<16} {:>12} {:>6}",
            i + 1,
            rec.name,
            rec.score,
            rec.level
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let path = config_file_path()?;

    println!("# {}", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

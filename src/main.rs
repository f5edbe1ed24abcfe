use clap::{Args, Parser, Subcommand};
use log::error;
use sale_board::app::{build_all, run_app};
use sale_board::countdown::Clock;
use sale_board::fetch::{FeedLoader, FeedSource, DEFAULT_SOURCE};
use sale_board::filter::Mode;
use sale_board::locale::Lang;
use sale_board::page::{render_page, write_page};
use sale_board::render::RenderOptions;
use sale_board::RetryPolicy;
use std::io::Write;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::ExitCode;
use time::format_description::well_known::Rfc3339;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

fn configure_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    let log_level = match cli.debug {
        true => log::LevelFilter::Debug,
        false => log::LevelFilter::Info,
    };
    builder.filter_module("sale_board", log_level);
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    configure_logging(&cli);

    let clock = match cli.now {
        Some(now) => Clock::new(now, cli.utc_offset),
        None => Clock::system(cli.utc_offset),
    };
    let loader = FeedLoader::new(cli.source, RetryPolicy::with_attempts(cli.retries));

    let result = match cli.command {
        Commands::Render(cmd) => do_render(cmd, &loader, &clock),
        Commands::Build(cmd) => do_build(cmd, &loader, &clock),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the feed loaded.
fn do_render(cmd: RenderCommand, loader: &FeedLoader, clock: &Clock) -> anyhow::Result<bool> {
    let opts = RenderOptions::new(cmd.lang, cmd.mode);
    let board = run_app(loader, &opts, clock);
    let html = render_page(&board, cmd.lang);
    match cmd.output {
        Some(path) => {
            write_page(&html, &path, cmd.compress)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(!board.failed)
}

fn do_build(cmd: BuildCommand, loader: &FeedLoader, clock: &Clock) -> anyhow::Result<bool> {
    let report = build_all(loader, clock, &cmd.output_dir, cmd.compress)?;
    Ok(!report.failed)
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[arg(long, default_value_t = false)]
    debug: bool,
    /// Feed location, an http(s) URL or a file path
    #[arg(long, env = "SALE_BOARD_SOURCE", default_value = DEFAULT_SOURCE)]
    source: FeedSource,
    /// Reference time for countdowns, RFC 3339 (defaults to the system clock)
    #[arg(long, value_parser = now_from_str)]
    now: Option<OffsetDateTime>,
    /// Offset applied to sale end times that carry none, e.g. +09:00
    #[arg(long, value_parser = utc_offset_from_str, default_value = "+00:00")]
    utc_offset: UtcOffset,
    /// Attempts per HTTP request
    #[arg(long, default_value = "3")]
    retries: NonZeroU32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one page
    Render(RenderCommand),
    /// Render a page for every language and mode
    Build(BuildCommand),
}

#[derive(Args)]
struct RenderCommand {
    #[arg(long, value_enum, default_value_t = Lang::Ja)]
    lang: Lang,
    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,
    /// Write the page here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, default_value_t = false, requires = "output")]
    compress: bool,
}

#[derive(Args)]
struct BuildCommand {
    #[arg(long)]
    output_dir: PathBuf,
    #[arg(long, default_value_t = false)]
    compress: bool,
}

fn now_from_str(s: &str) -> Result<OffsetDateTime, String> {
    match OffsetDateTime::parse(s, &Rfc3339) {
        Ok(now) => Ok(now),
        Err(error) => Err(format!(
            "Error parsing time, use RFC 3339 (e.g. 2024-05-01T12:00:00+09:00). The parser reported the following error: {}",
            error
        )),
    }
}

fn utc_offset_from_str(s: &str) -> Result<UtcOffset, String> {
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
    match UtcOffset::parse(s, &format) {
        Ok(offset) => Ok(offset),
        Err(error) => Err(format!(
            "Error parsing offset, use format +hh:mm (e.g. +09:00). The parser reported the following error: {}",
            error
        )),
    }
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Cli::command().debug_assert()
}

#[test]
fn parse_offset() {
    use time::macros::offset;
    assert_eq!(utc_offset_from_str("+09:00"), Ok(offset!(+9)));
    assert_eq!(utc_offset_from_str("-03:30"), Ok(offset!(-3:30)));
    assert!(utc_offset_from_str("9").is_err());
}

#[test]
fn parse_render_args() {
    let cli = Cli::try_parse_from([
        "sale-board",
        "--now",
        "2024-05-01T12:00:00Z",
        "render",
        "--lang",
        "en",
        "--mode",
        "r18only",
    ])
    .unwrap();
    assert!(cli.now.is_some());
    assert_eq!(cli.retries.get(), 3);
    match cli.command {
        Commands::Render(cmd) => {
            assert_eq!(cmd.lang, Lang::En);
            assert_eq!(cmd.mode, Mode::R18Only);
            assert!(cmd.output.is_none());
        }
        Commands::Build(_) => panic!("expected render"),
    }
}

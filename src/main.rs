use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{debug, error, info};
use sorubankasi::libsoru::{QuestionStore, StoreError, DB_NAME};
use sorubankasi::theme::{Theme, ThemeError};
use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

mod cli;
#[cfg(feature = "gui")]
mod gui;

#[derive(Parser, Debug)]
#[command(name = "Mini Soru Bankası")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = DB_NAME)]
    db: PathBuf,
    #[arg(short, long, default_value = "warn")]
    log_level: String,
    /// JSON file overriding the default colours
    #[arg(short, long, value_name = "FILE")]
    theme: Option<PathBuf>,
    /// Lines on each page of the print preview and printout
    #[arg(long, default_value = "40")]
    lines_per_page: usize,
    /// Where "Print All Questions" writes its printable page
    #[arg(long, value_name = "FILE", default_value = "soru_bankasi_print.html")]
    print_to: PathBuf,
    /// Use the terminal shell even when the window is available
    #[arg(long)]
    cli: bool,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("question bank unavailable")]
    Storage(#[from] StoreError),
    #[error("cannot load theme")]
    Theme(#[from] ThemeError),
    #[cfg(feature = "gui")]
    #[error("window failed")]
    Gui(#[from] eframe::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:?}", err);
            eprintln!(
                "{}: {}",
                err.to_string().bright_red(),
                err.source().map(|s| s.to_string()).unwrap_or_default()
            );
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let store = QuestionStore::new(&args.db);
    info!("[Setup] Question bank at {:?}", store.path());
    store.initialize()?;
    debug!("[DB] Database Connection Successful!");

    let theme = match &args.theme {
        Some(path) => Theme::load(path)?,
        None => Theme::default(),
    };

    start_shell(&store, theme, &args)
}

cfg_if::cfg_if! {
    if #[cfg(all(feature = "gui", not(feature = "cli")))] {
        fn start_shell(store: &QuestionStore, theme: Theme, args: &Args) -> Result<(), Error> {
            if args.cli {
                cli::cli_loop(store, theme, args.lines_per_page);
                return Ok(());
            }
            gui::init_gui(store, theme, args.lines_per_page, args.print_to.clone())
        }
    } else {
        fn start_shell(store: &QuestionStore, theme: Theme, args: &Args) -> Result<(), Error> {
            debug!("[Setup] Terminal shell (--cli: {})", args.cli);
            cli::cli_loop(store, theme, args.lines_per_page);
            Ok(())
        }
    }
}

use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sorubankasi::libsoru::question::{check_submission, NewQuestion, QuestionRecord};
use sorubankasi::libsoru::{QuestionStore, StoreError, DB_NAME};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "Aktarıcı (soru_aktar)")]
#[command(version, about = "Import and export the question bank as JSON", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info")]
    log_level: String,
    #[arg(short, long, value_name = "FILE", default_value = DB_NAME)]
    db: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    json: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add every question in the JSON file to the bank
    Import,
    /// Write every question in the bank to the JSON file
    Export,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
struct BankJson {
    questions: Vec<QuestionJson>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct QuestionJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    text: String,
    options: Vec<String>,
    correct_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl From<QuestionRecord> for QuestionJson {
    fn from(record: QuestionRecord) -> Self {
        QuestionJson {
            id: Some(record.id),
            text: record.text,
            options: record.options.to_vec(),
            correct_index: record.correct_index,
            category: Some(record.category),
        }
    }
}

#[derive(Debug, Error)]
enum Error {
    #[error("cannot access {0:?}")]
    File(PathBuf, #[source] std::io::Error),
    #[error("malformed JSON")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Default, PartialEq)]
struct ImportSummary {
    added: usize,
    skipped: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();
    info!(
        "{}",
        format!("File at {:?} and Database at {:?}", args.json, args.db).cyan()
    );

    let store = QuestionStore::new(&args.db);
    let result = store.initialize().map_err(Error::from).and_then(|()| match args.command {
        Commands::Import => import(&store, &args.json).map(|summary| {
            info!(
                "{}",
                format!(
                    "Imported {} questions, skipped {}.",
                    summary.added, summary.skipped
                )
                .blue()
            );
        }),
        Commands::Export => export(&store, &args.json).map(|count| {
            info!("{}", format!("Exported {} questions.", count).blue());
        }),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", format!("{}: {:?}", err, err).red());
            ExitCode::FAILURE
        }
    }
}

/// Why an entry of the JSON file cannot be imported, if it cannot.
fn rejection(entry: &QuestionJson) -> Option<String> {
    if let Err(err) = check_submission(&entry.text, &entry.options, entry.correct_index) {
        return Some(err.to_string());
    }
    NewQuestion::from_input(&entry.text, &entry.options, entry.correct_index, None)
        .is_none()
        .then(|| format!("at most 5 options are allowed, got {}", entry.options.len()))
}

fn import(store: &QuestionStore, json_file: &Path) -> Result<ImportSummary, Error> {
    let json =
        std::fs::read_to_string(json_file).map_err(|e| Error::File(json_file.to_path_buf(), e))?;
    let content: BankJson = serde_json::from_str(&json)?;
    info!(
        "{}",
        format!("Importing data... ({} Questions)", content.questions.len()).blue()
    );

    let mut summary = ImportSummary::default();
    for entry in &content.questions {
        if let Some(reason) = rejection(entry) {
            error!(
                "{}",
                format!("├ ✘ Question: {:?} ({})", entry.text, reason)
                    .red()
                    .strikethrough()
            );
            summary.skipped += 1;
            continue;
        }
        if store.add_question(
            entry.text.trim(),
            &entry.options.iter().map(|o| o.trim()).collect::<Vec<_>>(),
            entry.correct_index,
            entry.category.as_deref(),
        ) {
            info!("{}", format!("├ Question: {:?}", entry.text).green());
            summary.added += 1;
        } else {
            error!("{}", format!("├ ✘ Question: {:?} (not saved)", entry.text).red());
            summary.skipped += 1;
        }
    }
    Ok(summary)
}

fn export(store: &QuestionStore, json_file: &Path) -> Result<usize, Error> {
    let questions = store.try_get_all_questions()?;
    let content = BankJson {
        questions: questions.into_iter().map(QuestionJson::from).collect(),
    };
    let json = serde_json::to_string_pretty(&content)?;
    std::fs::write(json_file, json).map_err(|e| Error::File(json_file.to_path_buf(), e))?;
    Ok(content.questions.len())
}

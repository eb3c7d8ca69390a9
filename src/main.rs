mod cli;
mod commands;
mod document;
mod docx;
mod model;
mod output;
mod store;
mod util;
mod vocabulary;

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::cli::{Cli, Commands};
use crate::util::ensure_parent_directory;

fn main() {
    let cli = Cli::parse();

    let (labels_file, labels_error) = match open_labels_log(cli.labels_log.as_deref()) {
        Ok(file) => (file, None),
        Err(err) => (None, Some(err)),
    };
    init_tracing(labels_file);

    let result = match labels_error {
        Some(err) => Err(err),
        None => run(cli),
    };

    if let Err(err) = result {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Parse(args) => commands::parse::run(args),
        Commands::Status(args) => commands::status::run(args),
    }
}

fn open_labels_log(path: Option<&Path>) -> Result<Option<File>> {
    let Some(path) = path else {
        return Ok(None);
    };
    ensure_parent_directory(path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open labels log {}", path.display()))?;
    Ok(Some(file))
}

fn init_tracing(labels_file: Option<File>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,labels=off"));

    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let labels = labels_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
            .with_filter(Targets::new().with_target("labels", Level::DEBUG))
    });

    tracing_subscriber::registry()
        .with(console)
        .with(labels)
        .init();
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::{IfExists, ParseArgs};
use crate::docx::read_document;
use crate::model::ParseOptions;
use crate::output::{WriteMode, write_records};
use crate::store::{DedupIndex, PennyStore};
use crate::util::backup_stamp;
use crate::vocabulary::Vocabulary;

use super::accumulator::parse_blocks;
use super::state::resolve_state;

pub fn run(args: ParseArgs) -> Result<()> {
    let inputs = collect_inputs(&args.input)?;
    if inputs.is_empty() {
        warn!(input = %args.input.display(), "no .docx files found");
        return Ok(());
    }

    let Some(first_mode) = resolve_output_mode(&args.output, args.if_exists, args.new_only)? else {
        info!(output = %args.output.display(), "output exists; cancelled");
        return Ok(());
    };

    let vocabulary = Vocabulary::load_or_default(args.vocabulary.as_deref())?;
    let mut store = PennyStore::open(&args.db_path)?;
    let options = ParseOptions {
        short_location: args.short_location,
        multi_line_dash: args.multi_line_dash,
        new_only: args.new_only,
    };

    info!(
        files = inputs.len(),
        output = %args.output.display(),
        db_path = %args.db_path.display(),
        short_location = options.short_location,
        multi_line_dash = options.multi_line_dash,
        new_only = options.new_only,
        "parse started"
    );

    let mut total = 0usize;
    for (index, input) in inputs.iter().enumerate() {
        let mode = if index == 0 {
            first_mode
        } else {
            WriteMode::Append
        };
        info!(file = %input.display(), index = index + 1, of = inputs.len(), "processing");

        let written = parse_file(input, &args.output, mode, options, &vocabulary, &mut store)?;
        total += written;
    }

    info!(
        rows = total,
        stored = store.count()?,
        output = %args.output.display(),
        "parse completed"
    );
    Ok(())
}

pub fn parse_file<D: DedupIndex>(
    input: &Path,
    output: &Path,
    mode: WriteMode,
    options: ParseOptions,
    vocabulary: &Vocabulary,
    store: &mut D,
) -> Result<usize> {
    let blocks = read_document(input)?;
    let state = resolve_state(&input.to_string_lossy(), vocabulary);
    let records = parse_blocks(&blocks, &state, options, vocabulary, store)?;

    write_records(output, &records, mode)?;
    info!(
        file = %input.display(),
        state = %state,
        rows = records.len(),
        "parsed document"
    );
    Ok(records.len())
}

fn has_docx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"))
}

fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        bail!("input does not exist: {}", input.display());
    }

    if !input.is_dir() {
        if !has_docx_extension(input) {
            bail!("input is not a .docx file: {}", input.display());
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    let entries = fs::read_dir(input)
        .with_context(|| format!("failed to read directory {}", input.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read entry in {}", input.display()))?
            .path();
        if path.is_file() && has_docx_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn resolve_output_mode(
    output: &Path,
    policy: IfExists,
    new_only: bool,
) -> Result<Option<WriteMode>> {
    if !output.exists() {
        return Ok(Some(WriteMode::Replace));
    }

    match policy {
        IfExists::Overwrite => {
            if new_only {
                warn!(
                    output = %output.display(),
                    "overwriting with --new-only discards rows from earlier runs"
                );
            }
            Ok(Some(WriteMode::Replace))
        }
        IfExists::Append => Ok(Some(WriteMode::Append)),
        IfExists::Backup => {
            let backup = backup_path(output, &backup_stamp(Utc::now()));
            fs::rename(output, &backup).with_context(|| {
                format!(
                    "failed to back up {} to {}",
                    output.display(),
                    backup.display()
                )
            })?;
            info!(backup = %backup.display(), "existing output backed up");
            Ok(Some(WriteMode::Replace))
        }
        IfExists::Cancel => Ok(None),
    }
}

fn backup_path(output: &Path, stamp: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    output.with_file_name(format!("{stem}_backup_{stamp}{extension}"))
}

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{CSV_HEADER, PennyRecord};
use crate::util::ensure_parent_directory;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WriteMode {
    Replace,
    Append,
}

pub fn write_records(path: &Path, records: &[PennyRecord], mode: WriteMode) -> Result<()> {
    ensure_parent_directory(path)?;

    let opened = match mode {
        WriteMode::Replace => File::create(path),
        WriteMode::Append => OpenOptions::new().create(true).append(true).open(path),
    };
    let file = opened.with_context(|| format!("failed to open output {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    if mode == WriteMode::Replace {
        write_row(&mut writer, CSV_HEADER.iter().copied())?;
    }
    for record in records {
        let fields = record.csv_fields();
        write_row(&mut writer, fields.iter().map(String::as_str))?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}

fn write_row<'a, W: Write>(writer: &mut W, fields: impl Iterator<Item = &'a str>) -> Result<()> {
    let line = fields.map(escape_csv_cell).collect::<Vec<_>>().join(",");
    writeln!(writer, "{line}").context("failed to write csv row")?;
    Ok(())
}

fn escape_csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Orientation;
    use std::fs;

    fn castle() -> PennyRecord {
        PennyRecord {
            state: "California".to_string(),
            city: "Anaheim".to_string(),
            location: "Disneyland".to_string(),
            name: "Castle".to_string(),
            orientation: Orientation::H,
            penny_type: "Copper Penny".to_string(),
            year: "2024".to_string(),
            position: Some(1),
            ..PennyRecord::default()
        }
    }

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(escape_csv_cell("plain"), "plain");
        assert_eq!(escape_csv_cell("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_cell("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_csv_cell("cr\rhere"), "\"cr\rhere\"");
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).expect("output should be readable")
    }

    #[test]
    fn replace_writes_header_and_rows() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("out").join("pennies.csv");

        write_records(&path, &[castle()], WriteMode::Replace).expect("rows should be written");

        let written = read(&path);
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("State,City,Neighborhood,Location"));
        assert!(lines[0].ends_with("Retired,Set #,Quantity,Need"));
        assert_eq!(lines[0].split(',').count(), 13);
        assert_eq!(
            lines[1],
            "California,Anaheim,,Disneyland,Castle,h,Copper Penny,2024,1,,,1,"
        );
    }

    #[test]
    fn append_adds_rows_without_header() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("pennies.csv");

        write_records(&path, &[castle()], WriteMode::Replace).expect("rows should be written");
        let mut retired = castle();
        retired.name = "Castle, Night".to_string();
        retired.retired = true;
        retired.set_number = Some(2);
        write_records(&path, &[retired], WriteMode::Append).expect("rows should be appended");

        let written = read(&path);
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("State,"));
        assert_eq!(
            lines[2],
            "California,Anaheim,,Disneyland,\"Castle, Night\",h,Copper Penny,2024,1,Yes,2,1,"
        );
    }

    #[test]
    fn replace_truncates_and_append_creates() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("pennies.csv");

        write_records(&path, &[castle()], WriteMode::Append).expect("rows should be appended");
        assert_eq!(read(&path).lines().count(), 1);

        write_records(&path, &[], WriteMode::Replace).expect("header should be written");
        assert_eq!(read(&path).lines().count(), 1);
    }
}

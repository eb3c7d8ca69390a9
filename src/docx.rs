use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::document::{Block, Cell, ParagraphStyle, Table};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

pub fn read_document(path: &Path) -> Result<Vec<Block>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_document_from(file).with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_document_from<R: Read + Seek>(reader: R) -> Result<Vec<Block>> {
    let mut archive = ZipArchive::new(reader).context("input is not a zip-packaged document")?;

    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_style_names(&xml)?,
        None => HashMap::new(),
    };

    let Some(document_xml) = read_part(&mut archive, DOCUMENT_PART)? else {
        bail!("package has no {DOCUMENT_PART} part");
    };

    parse_body(&document_xml, &styles)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("failed to open part {name}")),
    };

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .with_context(|| format!("failed to read part {name}"))?;
    Ok(Some(xml))
}

fn attribute(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn parse_style_names(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut names = HashMap::new();
    let mut current_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"style" => current_id = attribute(e, b"styleId"),
                b"name" => {
                    if let (Some(id), Some(name)) = (current_id.as_ref(), attribute(e, b"val")) {
                        names.insert(id.clone(), name);
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"style" => current_id = None,
            Ok(Event::Eof) => break,
            Err(err) => return Err(err).context("malformed styles XML"),
            _ => {}
        }
        buf.clear();
    }

    Ok(names)
}

#[derive(Debug, Default)]
struct ParagraphDraft {
    style_id: Option<String>,
    text: String,
    in_cell: bool,
}

#[derive(Debug)]
struct CellDraft {
    paragraphs: Vec<String>,
    fill: Option<String>,
    span: usize,
    merge_continue: bool,
}

impl Default for CellDraft {
    fn default() -> Self {
        Self {
            paragraphs: Vec::new(),
            fill: None,
            span: 1,
            merge_continue: false,
        }
    }
}

#[derive(Debug, Default)]
struct TableDraft {
    grid_columns: usize,
    rows: Vec<Vec<Cell>>,
    row: Option<Vec<CellDraft>>,
    cell: Option<CellDraft>,
}

impl TableDraft {
    fn finish_row(&mut self) {
        let Some(drafts) = self.row.take() else {
            return;
        };

        let mut cells: Vec<Cell> = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let above = self.rows.last().and_then(|row| row.get(cells.len()));
            let cell = match above {
                Some(above) if draft.merge_continue => above.clone(),
                _ => Cell {
                    text: draft.paragraphs.join("\n").trim().to_string(),
                    fill: draft.fill,
                },
            };
            for _ in 0..draft.span {
                cells.push(cell.clone());
            }
        }
        self.rows.push(cells);
    }

    fn finish(self) -> Table {
        let column_count = match self.grid_columns {
            0 => self.rows.iter().map(Vec::len).max().unwrap_or(0),
            declared => declared,
        };
        Table {
            rows: self.rows,
            column_count,
        }
    }
}

struct BodyParser<'a> {
    styles: &'a HashMap<String, String>,
    stack: Vec<Vec<u8>>,
    blocks: Vec<Block>,
    paragraph: Option<ParagraphDraft>,
    nested_paragraphs: usize,
    table_depth: usize,
    table: Option<TableDraft>,
    in_text: bool,
}

impl<'a> BodyParser<'a> {
    fn new(styles: &'a HashMap<String, String>) -> Self {
        Self {
            styles,
            stack: Vec::new(),
            blocks: Vec::new(),
            paragraph: None,
            nested_paragraphs: 0,
            table_depth: 0,
            table: None,
            in_text: false,
        }
    }

    fn parent_is(&self, name: &[u8]) -> bool {
        self.stack.last().is_some_and(|parent| parent == name)
    }

    fn cell_mut(&mut self) -> Option<&mut CellDraft> {
        self.table.as_mut().and_then(|table| table.cell.as_mut())
    }

    fn collecting_mut(&mut self) -> Option<&mut ParagraphDraft> {
        if self.nested_paragraphs > 0 {
            return None;
        }
        self.paragraph.as_mut()
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.collecting_mut() {
            paragraph.text.push_str(text);
        }
    }

    fn open(&mut self, name: &[u8], e: &BytesStart) {
        if name == b"tbl" {
            self.table_depth += 1;
            if self.table_depth == 1 && self.parent_is(b"body") {
                self.table = Some(TableDraft::default());
            }
            return;
        }
        if self.table_depth > 1 {
            return;
        }

        match name {
            b"gridCol" => {
                if let Some(table) = self.table.as_mut() {
                    table.grid_columns += 1;
                }
            }
            b"tr" => {
                if let Some(table) = self.table.as_mut() {
                    table.row = Some(Vec::new());
                }
            }
            b"tc" => {
                if let Some(table) = self.table.as_mut() {
                    table.cell = Some(CellDraft::default());
                }
            }
            b"gridSpan" => {
                let span = attribute(e, b"val").and_then(|value| value.parse::<usize>().ok());
                if let Some(cell) = self.cell_mut() {
                    cell.span = span.unwrap_or(1).max(1);
                }
            }
            b"vMerge" => {
                let restart = attribute(e, b"val").as_deref() == Some("restart");
                if let Some(cell) = self.cell_mut() {
                    cell.merge_continue = !restart;
                }
            }
            b"shd" => {
                if !self.parent_is(b"tcPr") {
                    return;
                }
                let fill = attribute(e, b"fill");
                if let Some(cell) = self.cell_mut() {
                    cell.fill = fill;
                }
            }
            b"p" => self.open_paragraph(),
            b"pStyle" => {
                let style_id = attribute(e, b"val");
                if let Some(paragraph) = self.collecting_mut() {
                    paragraph.style_id = style_id;
                }
            }
            b"t" => self.in_text = true,
            b"tab" if self.parent_is(b"r") => self.push_text("\t"),
            b"br" | b"cr" if self.parent_is(b"r") => self.push_text("\n"),
            _ => {}
        }
    }

    fn open_paragraph(&mut self) {
        if self.paragraph.is_some() {
            self.nested_paragraphs += 1;
        } else if self.table_depth == 0 && self.parent_is(b"body") {
            self.paragraph = Some(ParagraphDraft::default());
        } else if self.parent_is(b"tc") && self.cell_mut().is_some() {
            self.paragraph = Some(ParagraphDraft {
                in_cell: true,
                ..ParagraphDraft::default()
            });
        }
    }

    fn close(&mut self, name: &[u8]) {
        if name == b"tbl" {
            let finished = match self.table_depth {
                1 => self.table.take(),
                _ => None,
            };
            if let Some(table) = finished {
                self.blocks.push(Block::Table(table.finish()));
            }
            self.table_depth = self.table_depth.saturating_sub(1);
            return;
        }
        if self.table_depth > 1 {
            return;
        }

        match name {
            b"t" => self.in_text = false,
            b"p" => {
                if self.nested_paragraphs > 0 {
                    self.nested_paragraphs -= 1;
                } else if let Some(draft) = self.paragraph.take() {
                    self.finish_paragraph(draft);
                }
            }
            b"tc" => {
                if let Some(table) = self.table.as_mut() {
                    let cell = table.cell.take();
                    if let (Some(cell), Some(row)) = (cell, table.row.as_mut()) {
                        row.push(cell);
                    }
                }
            }
            b"tr" => {
                if let Some(table) = self.table.as_mut() {
                    table.finish_row();
                }
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self, draft: ParagraphDraft) {
        if draft.in_cell {
            if let Some(cell) = self.cell_mut() {
                cell.paragraphs.push(draft.text);
            }
            return;
        }

        let style = match draft.style_id.as_deref() {
            Some(id) => {
                let name = self.styles.get(id).map_or(id, String::as_str);
                ParagraphStyle::classify(name)
            }
            None => ParagraphStyle::Body,
        };

        self.blocks.push(Block::paragraph(style, &draft.text));
    }
}

fn parse_body(xml: &str, styles: &HashMap<String, String>) -> Result<Vec<Block>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut parser = BodyParser::new(styles);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name().as_ref().to_vec();
                parser.open(&name, e);
                parser.stack.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.local_name().as_ref().to_vec();
                parser.open(&name, e);
                parser.close(&name);
            }
            Ok(Event::End(ref e)) => {
                let name = e.local_name().as_ref().to_vec();
                parser.stack.pop();
                parser.close(&name);
            }
            Ok(Event::Text(ref e)) => {
                if parser.in_text {
                    let text = e.unescape().context("malformed text in document XML")?;
                    parser.push_text(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                let position = reader.buffer_position();
                return Err(err).with_context(|| format!("malformed XML near byte {position}"));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.blocks)
}

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::document::{Block, Cell, Paragraph, ParagraphStyle, Table};
use crate::model::{HeadingContext, ParseOptions, PennyRecord};
use crate::store::DedupIndex;
use crate::vocabulary::Vocabulary;

use super::grid::cell_pairs;
use super::labels::{LabelParser, has_separator_dash, sanitize, split_on_dashes, strip_newlines};
use super::outline::{HeadingOutline, build_heading_outline};

pub fn parse_blocks<D: DedupIndex>(
    blocks: &[Block],
    state: &str,
    options: ParseOptions,
    vocabulary: &Vocabulary,
    store: &mut D,
) -> Result<Vec<PennyRecord>> {
    let outline = build_heading_outline(blocks);
    debug!(level_two_headings = outline.len(), "built heading outline");
    for (heading, has_children) in outline.headings() {
        debug!(heading = %heading, has_children, "level 2 heading outline");
    }

    let mut walk = DocumentWalk {
        labels: LabelParser::new(options, vocabulary)?,
        outline,
        options,
        state,
        context: HeadingContext::default(),
        records: Vec::new(),
    };

    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => walk.apply_heading(paragraph),
            Block::Table(table) => walk.process_table(table, store)?,
        }
    }

    Ok(walk.records)
}

struct DocumentWalk<'a> {
    labels: LabelParser<'a>,
    outline: HeadingOutline,
    options: ParseOptions,
    state: &'a str,
    context: HeadingContext,
    records: Vec<PennyRecord>,
}

impl DocumentWalk<'_> {
    fn apply_heading(&mut self, paragraph: &Paragraph) {
        let text = paragraph.text.trim();
        if text.is_empty() {
            return;
        }

        match paragraph.style {
            ParagraphStyle::Heading1 => {
                info!(city = %text, "level 1 heading");
                self.context = HeadingContext {
                    state: sanitize(self.state),
                    city: sanitize(text),
                    ..HeadingContext::default()
                };
            }
            ParagraphStyle::Heading2 => {
                info!(heading = %text, "level 2 heading");
                self.context.neighborhood.clear();
                if self.outline.has_children(text) || self.options.short_location {
                    self.context.location.clear();
                } else {
                    self.context.location = sanitize(text);
                }
            }
            ParagraphStyle::Heading3 => {
                info!(heading = %text, "level 3 heading");
                let (neighborhood, location) = if has_separator_dash(text) {
                    let parts = split_on_dashes(text);
                    (parts[0].clone(), parts[1..].join(" "))
                } else {
                    (String::new(), text.to_string())
                };

                let location = if self.options.short_location || neighborhood.is_empty() {
                    location
                } else {
                    format!("{neighborhood} - {location}")
                };
                self.context.neighborhood.clear();
                self.context.location = sanitize(&location);
                self.context.last_year = None;
                debug!(context = ?self.context, "level 3 context");
            }
            ParagraphStyle::Heading4 => {
                info!(year = %text, "level 4 heading");
                if self.context.last_year.as_deref() != Some(text) {
                    self.context.set_counter = 0;
                    self.context.last_year = Some(text.to_string());
                }
                self.context.year = text.to_string();
                debug!(context = ?self.context, "level 4 context");
            }
            ParagraphStyle::Toc | ParagraphStyle::Body => {}
        }
    }

    fn process_table<D: DedupIndex>(&mut self, table: &Table, store: &mut D) -> Result<()> {
        if !self.context.year.is_empty() {
            self.context.set_counter += 1;
        }
        let working = self.context.clone();
        let mut positions = HashMap::<String, u32>::new();
        let mut emitted = 0usize;

        for pair in cell_pairs(table) {
            let top_text = pair.top.text.trim();
            let bottom_text = pair.bottom.map(|cell| cell.text.trim()).unwrap_or("");
            if top_text.is_empty() && bottom_text.is_empty() {
                continue;
            }

            if !top_text.is_empty() {
                self.report_label_mismatch(top_text, &working);
            }
            if bottom_text.is_empty() {
                continue;
            }

            let attributes = self.labels.detect_orientation_and_type(bottom_text);
            let name = sanitize(&strip_newlines(&attributes.name));
            let retired = pair.top.is_retired() && pair.bottom.is_some_and(Cell::is_retired);

            let key = format!(
                "{}|{}|{}",
                working.location,
                name,
                attributes.orientation.as_str()
            );
            let position = match positions.get(&key) {
                Some(&earlier) => {
                    debug!(
                        name = %name,
                        position = earlier,
                        layout_position = pair.position,
                        "same location, name and orientation earlier in table; reusing position"
                    );
                    earlier
                }
                None => pair.position,
            };
            positions.insert(key, position);

            let record = PennyRecord {
                state: working.state.clone(),
                city: working.city.clone(),
                neighborhood: working.neighborhood.clone(),
                location: working.location.clone(),
                name,
                orientation: attributes.orientation,
                penny_type: attributes.penny_type,
                year: working.year.clone(),
                position: Some(position),
                retired,
                set_number: (working.set_counter > 1).then_some(working.set_counter),
                ..PennyRecord::default()
            };

            let is_new = !store.exists(&record)? && store.add(&record)?;
            if is_new {
                debug!(name = %record.name, location = %record.location, "new penny");
            } else {
                debug!(name = %record.name, location = %record.location, "existing penny");
            }

            if is_new || !self.options.new_only {
                self.records.push(record);
                emitted += 1;
            }
        }

        debug!(
            emitted,
            set = working.set_counter,
            location = %working.location,
            "processed table"
        );
        Ok(())
    }

    fn report_label_mismatch(&self, label: &str, working: &HeadingContext) {
        let parsed = self.labels.detect_city_location_neighborhood(label);
        let differs = |found: &str, expected: &str| !found.is_empty() && found != expected;

        let city = differs(&parsed.city, &working.city);
        let location = differs(&parsed.location, &working.location);
        let neighborhood = differs(&parsed.neighborhood, &working.neighborhood);
        if !(city || location || neighborhood) {
            return;
        }

        let label = sanitize(&strip_newlines(label));
        if city {
            warn!(
                target: "labels",
                label = %label,
                heading = %working.city,
                parsed = %parsed.city,
                "city mismatch"
            );
        }
        if location {
            warn!(
                target: "labels",
                label = %label,
                heading = %working.location,
                parsed = %parsed.location,
                "location mismatch"
            );
        }
        if neighborhood {
            warn!(
                target: "labels",
                label = %label,
                heading = %working.neighborhood,
                parsed = %parsed.neighborhood,
                "neighborhood mismatch"
            );
        }
    }
}

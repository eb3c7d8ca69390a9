use anyhow::{Context, Result};
use regex::Regex;

use crate::model::{Orientation, ParseOptions};
use crate::vocabulary::Vocabulary;

const ASCII_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2019}', "'"),
    ('\u{2018}', "'"),
    ('\u{201c}', "\""),
    ('\u{201d}', "\""),
    ('\u{02bc}', "'"),
    ('\u{00b4}', "'"),
    ('\u{201b}', "'"),
    ('\u{2032}', "'"),
    ('\u{2026}', "..."),
    ('\u{00ae}', "(R)"),
    ('\u{2122}', "(TM)"),
    ('\u{00a9}', "(C)"),
    ('\u{00b0}', "deg"),
];

pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match ASCII_REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

pub fn strip_newlines(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

fn is_line_break(c: char) -> bool {
    let control = matches!(c, '\n'..='\r' | '\u{1c}'..='\u{1e}');
    control || matches!(c, '\u{85}' | '\u{2028}' | '\u{2029}')
}

pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + c.len_utf8();
        if c == '\r' && chars.next_if(|&(_, next)| next == '\n').is_some() {
            start += 1;
        }
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_dash(c: char) -> bool {
    matches!(c, '-' | '\u{2013}' | '\u{2014}')
}

fn separator_dashes(text: &str) -> Vec<(usize, usize)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut ranges = Vec::new();

    for (i, &(idx, c)) in chars.iter().enumerate() {
        if !is_dash(c) {
            continue;
        }
        let before_word = i > 0 && is_word_char(chars[i - 1].1);
        let next = chars.get(i + 1).map(|&(_, next)| next);
        let after_word = next.is_some_and(is_word_char);
        if !before_word && !after_word {
            ranges.push((idx, idx + c.len_utf8()));
        }
    }
    ranges
}

pub fn has_separator_dash(text: &str) -> bool {
    !separator_dashes(text).is_empty()
}

pub fn split_on_dashes(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (from, to) in separator_dashes(text) {
        parts.push(text[start..from].trim().to_string());
        start = to;
    }
    parts.push(text[start..].trim().to_string());
    parts
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelContext {
    pub city: String,
    pub location: String,
    pub neighborhood: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelAttributes {
    pub orientation: Orientation,
    pub penny_type: String,
    pub name: String,
}

pub struct LabelParser<'a> {
    options: ParseOptions,
    vocabulary: &'a Vocabulary,
    orientation_marker: Regex,
}

impl<'a> LabelParser<'a> {
    pub fn new(options: ParseOptions, vocabulary: &'a Vocabulary) -> Result<Self> {
        let orientation_marker =
            Regex::new(r"(?i)\((h|v)\)").context("failed to compile orientation marker regex")?;
        Ok(Self {
            options,
            vocabulary,
            orientation_marker,
        })
    }

    fn dashed_location(&self, parts: &[String]) -> String {
        if self.options.short_location {
            sanitize(parts[1..].join(" ").trim())
        } else {
            sanitize(parts.join(" - ").trim())
        }
    }

    pub fn detect_city_location_neighborhood(&self, label: &str) -> LabelContext {
        let lines = split_lines(label);
        let mut parsed = LabelContext::default();

        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                parsed.city = sanitize(line.trim());
                continue;
            }

            if i == 1 {
                if has_separator_dash(line) {
                    let parts = split_on_dashes(line);
                    parsed.neighborhood = sanitize(&parts[0]);
                    parsed.location = self.dashed_location(&parts);
                } else if lines.len() == 2 {
                    parsed.location = sanitize(line.trim());
                } else {
                    parsed.neighborhood = sanitize(line.trim());
                    parsed.location.clear();
                }
                continue;
            }

            if has_separator_dash(line) {
                let parts = split_on_dashes(line);
                if parsed.neighborhood.is_empty() {
                    parsed.neighborhood = sanitize(&parts[0]);
                }

                if self.options.short_location {
                    parsed.location = if parts.len() > 1 {
                        sanitize(parts[1..].join(" ").trim())
                    } else {
                        sanitize(line.trim())
                    };
                } else if parsed.location.is_empty() {
                    parsed.location = sanitize(line.trim());
                } else {
                    parsed.location = format!("{} - {}", parsed.location, sanitize(line.trim()));
                }
                continue;
            }

            let piece = sanitize(line).trim().to_string();
            let spacer = if self.vocabulary.is_continuation(line.trim()) {
                " "
            } else {
                " - "
            };

            parsed.location = if self.options.short_location {
                piece
            } else if !parsed.location.is_empty() {
                format!("{}{spacer}{piece}", parsed.location)
            } else if !parsed.neighborhood.is_empty() {
                format!("{}{spacer}{piece}", parsed.neighborhood)
            } else {
                piece
            };
        }

        parsed
    }

    pub fn detect_orientation_and_type(&self, label: &str) -> LabelAttributes {
        let Some(captures) = self.orientation_marker.captures(label) else {
            return LabelAttributes {
                name: label.to_string(),
                ..LabelAttributes::default()
            };
        };
        let (Some(marker), Some(letter)) = (captures.get(0), captures.get(1)) else {
            return LabelAttributes {
                name: label.to_string(),
                ..LabelAttributes::default()
            };
        };

        let name_lines: Vec<&str> = split_lines(&label[..marker.start()])
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let name = match name_lines.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            [first, rest @ ..] if self.options.multi_line_dash => {
                format!("{first} - {}", rest.join(" "))
            }
            lines => lines.join(" "),
        };

        LabelAttributes {
            orientation: Orientation::from_marker(letter.as_str()),
            penny_type: label[marker.end()..].trim().to_string(),
            name,
        }
    }
}

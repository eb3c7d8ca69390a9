use std::collections::HashMap;

use crate::document::{Block, ParagraphStyle};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingOutline {
    order: Vec<String>,
    has_children: HashMap<String, bool>,
}

impl HeadingOutline {
    pub fn has_children(&self, heading: &str) -> bool {
        self.has_children.get(heading).copied().unwrap_or(false)
    }

    pub fn headings(&self) -> impl Iterator<Item = (&str, bool)> {
        self.order
            .iter()
            .map(|heading| (heading.as_str(), self.has_children(heading)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    fn insert(&mut self, heading: &str) {
        if !self.has_children.contains_key(heading) {
            self.order.push(heading.to_string());
            self.has_children.insert(heading.to_string(), false);
        }
    }

    fn mark_children(&mut self, heading: &str) {
        if let Some(flag) = self.has_children.get_mut(heading) {
            *flag = true;
        }
    }
}

pub fn build_heading_outline(blocks: &[Block]) -> HeadingOutline {
    let mut outline = HeadingOutline::default();
    let mut current: Option<String> = None;

    for block in blocks {
        let Block::Paragraph(paragraph) = block else {
            continue;
        };
        let text = paragraph.text.trim();
        if text.is_empty() {
            continue;
        }

        match paragraph.style {
            ParagraphStyle::Heading2 => {
                outline.insert(text);
                current = Some(text.to_string());
            }
            ParagraphStyle::Heading3 => {
                if let Some(heading) = current.as_deref() {
                    outline.mark_children(heading);
                }
            }
            _ => {}
        }
    }

    outline
}

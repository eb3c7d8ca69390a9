pub const RETIRED_FILL: &str = "f2dbdb";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParagraphStyle {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Toc,
    Body,
}

impl ParagraphStyle {
    pub fn classify(style: &str) -> Self {
        let lowered = style.to_lowercase();
        if lowered.contains("toc") {
            return Self::Toc;
        }

        let compact: String = lowered.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.strip_prefix("heading") {
            Some("1") => Self::Heading1,
            Some("2") => Self::Heading2,
            Some("3") => Self::Heading3,
            Some("4") => Self::Heading4,
            _ => Self::Body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub fill: Option<String>,
}

impl Cell {
    pub fn is_retired(&self) -> bool {
        match self.fill.as_deref() {
            Some(fill) => fill.eq_ignore_ascii_case(RETIRED_FILL),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
    pub column_count: usize,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl Block {
    pub fn paragraph(style: ParagraphStyle, text: &str) -> Self {
        Self::Paragraph(Paragraph {
            style,
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_accepts_names_and_ids() {
        let classify = ParagraphStyle::classify;
        assert_eq!(classify("Heading 1"), ParagraphStyle::Heading1);
        assert_eq!(classify("heading 4"), ParagraphStyle::Heading4);
        assert_eq!(classify("Heading3"), ParagraphStyle::Heading3);
        assert_eq!(classify("TOC 2"), ParagraphStyle::Toc);
        assert_eq!(classify("TOC Heading"), ParagraphStyle::Toc);
        assert_eq!(classify("Heading 5"), ParagraphStyle::Body);
        assert_eq!(classify("Normal"), ParagraphStyle::Body);
    }

    #[test]
    fn retired_fill_is_case_insensitive() {
        let cell = |fill: Option<&str>| Cell {
            text: "Test".to_string(),
            fill: fill.map(str::to_string),
        };
        assert!(cell(Some("f2dbdb")).is_retired());
        assert!(cell(Some("F2DBDB")).is_retired());
        assert!(!cell(Some("FFFFFF")).is_retired());
        assert!(!cell(Some("auto")).is_retired());
        assert!(!cell(None).is_retired());
    }

    #[test]
    fn cell_lookup_tolerates_short_rows() {
        let table = Table {
            rows: vec![vec![Cell::default(); 3], vec![Cell::default()]],
            column_count: 3,
        };
        assert!(table.cell(0, 2).is_some());
        assert!(table.cell(1, 2).is_none());
        assert!(table.cell(5, 0).is_none());
    }
}

use crate::util::sha256_hex;

pub const CSV_HEADER: [&str; 13] = [
    "State",
    "City",
    "Neighborhood",
    "Location",
    "Name",
    "Orientation",
    "Type",
    "Year",
    "Position",
    "Retired",
    "Set #",
    "Quantity",
    "Need",
];

const FINGERPRINT_SEPARATOR: &str = "|";

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Orientation {
    H,
    V,
    #[default]
    Unknown,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::H => "h",
            Self::V => "v",
            Self::Unknown => "",
        }
    }

    pub fn from_marker(marker: &str) -> Self {
        match marker {
            "h" | "H" => Self::H,
            "v" | "V" => Self::V,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PennyRecord {
    pub state: String,
    pub city: String,
    pub neighborhood: String,
    pub location: String,
    pub name: String,
    pub orientation: Orientation,
    pub penny_type: String,
    pub year: String,
    pub position: Option<u32>,
    pub retired: bool,
    pub set_number: Option<u32>,
    pub quantity: u32,
    pub need: String,
}

impl Default for PennyRecord {
    fn default() -> Self {
        Self {
            state: String::new(),
            city: String::new(),
            neighborhood: String::new(),
            location: String::new(),
            name: String::new(),
            orientation: Orientation::Unknown,
            penny_type: String::new(),
            year: String::new(),
            position: None,
            retired: false,
            set_number: None,
            quantity: 1,
            need: String::new(),
        }
    }
}

impl PennyRecord {
    pub fn fingerprint(&self) -> String {
        let fields = [
            self.state.as_str(),
            self.city.as_str(),
            self.location.as_str(),
            self.name.as_str(),
            self.orientation.as_str(),
        ];
        sha256_hex(&fields.join(FINGERPRINT_SEPARATOR))
    }

    pub fn csv_fields(&self) -> [String; 13] {
        [
            self.state.clone(),
            self.city.clone(),
            self.neighborhood.clone(),
            self.location.clone(),
            self.name.clone(),
            self.orientation.as_str().to_string(),
            self.penny_type.clone(),
            self.year.clone(),
            optional_number(self.position),
            retired_flag(self.retired),
            optional_number(self.set_number),
            self.quantity.to_string(),
            self.need.clone(),
        ]
    }
}

fn optional_number(value: Option<u32>) -> String {
    value.map(|number| number.to_string()).unwrap_or_default()
}

fn retired_flag(retired: bool) -> String {
    if retired {
        "Yes".to_string()
    } else {
        String::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingContext {
    pub state: String,
    pub city: String,
    pub neighborhood: String,
    pub location: String,
    pub year: String,
    pub set_counter: u32,
    pub last_year: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ParseOptions {
    pub short_location: bool,
    pub multi_line_dash: bool,
    pub new_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn castle() -> PennyRecord {
        PennyRecord {
            state: "California".to_string(),
            city: "Anaheim".to_string(),
            location: "Downtown Disney - World of Disney".to_string(),
            name: "Castle".to_string(),
            orientation: Orientation::H,
            penny_type: "Copper Penny".to_string(),
            year: "2024".to_string(),
            position: Some(1),
            ..PennyRecord::default()
        }
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(castle().fingerprint(), castle().fingerprint());
        assert_eq!(castle().fingerprint().len(), 64);
    }

    #[test]
    fn fingerprint_ignores_non_key_fields() {
        let mut other = castle();
        other.penny_type = "Zinc Penny".to_string();
        other.year = "2023".to_string();
        other.position = Some(7);
        other.retired = true;
        other.quantity = 3;
        other.neighborhood = "Downtown Disney".to_string();
        assert_eq!(castle().fingerprint(), other.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_every_key_field() {
        let base = castle().fingerprint();
        let edits: [fn(&mut PennyRecord); 5] = [
            |r| r.state = "Nevada".to_string(),
            |r| r.city = "Orange".to_string(),
            |r| r.location = "Disneyland".to_string(),
            |r| r.name = "Castle View".to_string(),
            |r| r.orientation = Orientation::V,
        ];
        for edit in edits {
            let mut record = castle();
            edit(&mut record);
            assert_ne!(record.fingerprint(), base);
        }
    }

    #[test]
    fn fingerprint_is_case_sensitive() {
        let mut lowered = castle();
        lowered.location = "downtown disney - world of disney".to_string();
        assert_ne!(castle().fingerprint(), lowered.fingerprint());
    }

    #[test]
    fn csv_fields_render_flags_and_optional_numbers() {
        let mut record = castle();
        assert_eq!(record.csv_fields()[8], "1");
        assert_eq!(record.csv_fields()[9], "");
        assert_eq!(record.csv_fields()[10], "");
        assert_eq!(record.csv_fields()[11], "1");

        record.retired = true;
        record.set_number = Some(2);
        record.orientation = Orientation::Unknown;
        let fields = record.csv_fields();
        assert_eq!(fields[5], "");
        assert_eq!(fields[9], "Yes");
        assert_eq!(fields[10], "2");
    }

    #[test]
    fn orientation_marker_is_case_folded() {
        assert_eq!(Orientation::from_marker("H"), Orientation::H);
        assert_eq!(Orientation::from_marker("v"), Orientation::V);
        assert_eq!(Orientation::from_marker("x"), Orientation::Unknown);
    }
}

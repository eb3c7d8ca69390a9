use crate::vocabulary::{Jurisdiction, Vocabulary};

fn file_stem(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    stem.to_lowercase()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest: String = chars.flat_map(char::to_lowercase).collect();
    format!("{}{rest}", first.to_uppercase())
}

pub fn resolve_state(filename: &str, vocabulary: &Vocabulary) -> String {
    let stem = file_stem(filename);
    let normalized = stem.replace(['-', '_', '.'], " ");

    let mut by_name: Vec<&Jurisdiction> = vocabulary.jurisdictions.iter().collect();
    by_name.sort_by_key(|j| std::cmp::Reverse(j.name.chars().count()));
    for jurisdiction in &by_name {
        let name = jurisdiction.name.to_lowercase();
        if normalized.contains(&name) || stem.contains(&name.replace(' ', "")) {
            return jurisdiction.name.clone();
        }
    }

    let mut by_abbreviation: Vec<&Jurisdiction> = vocabulary.jurisdictions.iter().collect();
    by_abbreviation.sort_by_key(|j| std::cmp::Reverse(j.abbreviation.chars().count()));
    for jurisdiction in by_abbreviation {
        let abbreviation = jurisdiction.abbreviation.to_lowercase();
        if abbreviation.is_empty() {
            continue;
        }
        let prefixed = stem
            .strip_prefix(abbreviation.as_str())
            .is_some_and(|rest| rest.starts_with(['-', '_', '.']));
        if stem == abbreviation || prefixed {
            return jurisdiction.name.clone();
        }
    }

    capitalize(&stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(filename: &str) -> String {
        resolve_state(filename, &Vocabulary::default())
    }

    #[test]
    fn abbreviations_resolve_in_any_case() {
        assert_eq!(resolve("ca.docx"), "California");
        assert_eq!(resolve("CA.docx"), "California");
        assert_eq!(resolve("ca-new.docx"), "California");
        assert_eq!(resolve("ca_backup.docx"), "California");
        assert_eq!(resolve("dc.docx"), "District of Columbia");
    }

    #[test]
    fn full_names_resolve_with_any_separator() {
        assert_eq!(resolve("new-york.docx"), "New York");
        assert_eq!(resolve("new.york.docx"), "New York");
        assert_eq!(resolve("new_york.docx"), "New York");
        assert_eq!(resolve("newyork.docx"), "New York");
        assert_eq!(resolve("massachusetts-old.docx"), "Massachusetts");
    }

    #[test]
    fn full_name_beats_embedded_abbreviation() {
        assert_eq!(resolve("indiana.docx"), "Indiana");
        assert_eq!(resolve("west-virginia.docx"), "West Virginia");
        assert_eq!(resolve("north_dakota.docx"), "North Dakota");
    }

    #[test]
    fn unknown_stems_fall_back_to_capitalized() {
        assert_eq!(resolve("readme.docx"), "Readme");
        assert_eq!(resolve("PENNIES.docx"), "Pennies");
        assert_eq!(resolve("unknown"), "Unknown");
    }

    #[test]
    fn directories_are_ignored() {
        assert_eq!(resolve("/data/collections/tx.docx"), "Texas");
        assert_eq!(resolve("C:\\pennies\\oregon.docx"), "Oregon");
        assert_eq!(resolve("ca/readme.docx"), "Readme");
    }

    #[test]
    fn alternate_vocabulary_is_honored() {
        let vocabulary = Vocabulary {
            jurisdictions: vec![Jurisdiction {
                abbreviation: "on".to_string(),
                name: "Ontario".to_string(),
            }],
            continuation_words: Vec::new(),
        };
        assert_eq!(resolve_state("on.docx", &vocabulary), "Ontario");
        assert_eq!(resolve_state("ca.docx", &vocabulary), "Ca");
    }
}

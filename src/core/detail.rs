// Spellbook - core/detail.rs
//
// Detail view of one selected record and the symbolic export token.

use crate::core::model::SpellRecord;

/// Rendered detail of a selected record. All fields are empty when nothing
/// is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellDetail {
    /// Every field as `"<key>: <value>"`, one per line, in field order.
    pub display_text: String,

    /// Name reduced to a constant-style identifier, e.g. `MindFlay`.
    pub sanitized_token: String,

    pub id: String,
}

impl SpellDetail {
    pub fn is_empty(&self) -> bool {
        self.display_text.is_empty() && self.sanitized_token.is_empty() && self.id.is_empty()
    }

    /// Copy string of the form `"<token> = <id>,"`. Empty for an empty detail.
    pub fn export_line(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!("{} = {},", self.sanitized_token, self.id)
    }
}

/// Format the selected record. `None` yields an empty detail.
pub fn format_detail(record: Option<&SpellRecord>) -> SpellDetail {
    let Some(record) = record else {
        return SpellDetail::default();
    };

    let display_text = record
        .fields()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    SpellDetail {
        display_text,
        sanitized_token: sanitize_name(record.name().unwrap_or_default()),
        id: record.id().unwrap_or_default().to_string(),
    }
}

/// Reduce a spell name to an identifier token.
///
/// Cuts at the first `(`, keeps ASCII letters, digits, commas and
/// whitespace, then joins the words with their first letter upper-cased.
pub fn sanitize_name(name: &str) -> String {
    let head = name.split('(').next().unwrap_or_default().trim();
    let kept: String = head
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ',' || c.is_whitespace())
        .collect();

    kept.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// First record whose `id` equals `id`. Duplicate ids resolve to the
/// earliest record.
pub fn find_by_id<'a>(records: &'a [SpellRecord], id: &str) -> Option<&'a SpellRecord> {
    records.iter().find(|r| r.id() == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse;

    #[test]
    fn test_sanitize_drops_parenthesised_suffix() {
        assert_eq!(sanitize_name("Mind Flay (Rank 2) (id=15407)"), "MindFlay");
    }

    #[test]
    fn test_sanitize_strips_punctuation_and_capitalises_words() {
        assert_eq!(sanitize_name("power word: shield"), "PowerWordShield");
        assert_eq!(sanitize_name("Ray of Frost"), "RayOfFrost");
        assert_eq!(sanitize_name("Shadow Word, pain"), "ShadowWord,Pain");
        assert_eq!(sanitize_name("Bloodlust-2 x"), "Bloodlust2X");
        assert_eq!(sanitize_name("(id=5)"), "");
        assert_eq!(sanitize_name(""), "");
    }

    #[test]
    fn test_format_detail_renders_fields_in_order() {
        let records = parse("Name: Mind Flay (Rank 2) (id=15407)\nClass: Priest\n");
        let detail = format_detail(records.first());
        assert_eq!(
            detail.display_text,
            "Name: Mind Flay (Rank 2) (id=15407)\nid: 15407\nClass: Priest"
        );
        assert_eq!(detail.sanitized_token, "MindFlay");
        assert_eq!(detail.id, "15407");
        assert_eq!(detail.export_line(), "MindFlay = 15407,");
    }

    #[test]
    fn test_absent_record_is_empty() {
        let detail = format_detail(None);
        assert!(detail.is_empty());
        assert_eq!(detail.export_line(), "");
    }

    #[test]
    fn test_find_by_id_returns_first_duplicate() {
        let records = parse("Name: A (id=7)\nName: B (id=7)\n");
        assert_eq!(find_by_id(&records, "7").and_then(|r| r.name()), Some("A (id=7)"));
        assert!(find_by_id(&records, "8").is_none());
    }
}

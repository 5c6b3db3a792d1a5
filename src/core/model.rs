// Spellbook - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants::{
    FIELD_CLASS, FIELD_ID, FIELD_NAME, FIELD_SPELL_FAMILY_ID, HIDDEN_MARKER, NO_ID_LABEL,
    PASSIVE_MARKER, UNNAMED_LABEL,
};
use serde::ser::{Serialize, SerializeMap, Serializer};

// =============================================================================
// Spell Record
// =============================================================================

/// One parsed spell block: an ordered field-name to value mapping.
///
/// Exports carry arbitrary keys beyond `Name`/`Class`/`id`, so the record is
/// an open-ended map rather than a struct of named fields. Field order is the
/// order in which keys were first seen; it drives display and export but
/// never lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellRecord {
    fields: Vec<(String, String)>,
}

impl SpellRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field value by exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a field. An existing key keeps its position and takes the new
    /// value (last write wins).
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Iterate fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.get(FIELD_NAME)
    }

    pub fn id(&self) -> Option<&str> {
        self.get(FIELD_ID)
    }

    pub fn spell_family_id(&self) -> Option<&str> {
        self.get(FIELD_SPELL_FAMILY_ID)
    }

    pub fn class_field(&self) -> Option<&str> {
        self.get(FIELD_CLASS)
    }

    /// True if `Name` contains "passive" in any letter case.
    pub fn is_passive(&self) -> bool {
        self.name_contains_lower(PASSIVE_MARKER)
    }

    /// True if `Name` contains "hidden" in any letter case.
    pub fn is_hidden(&self) -> bool {
        self.name_contains_lower(HIDDEN_MARKER)
    }

    fn name_contains_lower(&self, needle: &str) -> bool {
        self.name()
            .is_some_and(|name| name.to_lowercase().contains(needle))
    }

    /// List label: `"<Name> (ID: <id>)"`, with placeholders for missing fields.
    pub fn list_label(&self) -> String {
        format!(
            "{} (ID: {})",
            self.name().unwrap_or(UNNAMED_LABEL),
            self.id().unwrap_or(NO_ID_LABEL)
        )
    }
}

impl Serialize for SpellRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Spell family lookup table
// =============================================================================

/// Spell family id to canonical class name, used by family-classified
/// exports. Order is the display order of the class filter.
pub const SPELL_FAMILY_CLASSES: &[(u32, &str)] = &[
    (15, "Death Knight"),
    (107, "Demon Hunter"),
    (7, "Druid"),
    (224, "Evoker"),
    (9, "Hunter"),
    (3, "Mage"),
    (53, "Monk"),
    (10, "Paladin"),
    (6, "Priest"),
    (8, "Rogue"),
    (11, "Shaman"),
    (5, "Warlock"),
    (4, "Warrior"),
];

/// Resolve a textual spell family id to its class name.
///
/// Returns `None` for non-numeric ids and ids missing from the table.
pub fn class_for_spell_family(family_id: &str) -> Option<&'static str> {
    let id: u32 = family_id.trim().parse().ok()?;
    SPELL_FAMILY_CLASSES
        .iter()
        .find(|(family, _)| *family == id)
        .map(|(_, class)| *class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position_and_last_value() {
        let mut record = SpellRecord::new();
        record.insert("Name", "Fireball");
        record.insert("School", "Fire");
        record.insert("Name", "Frostbolt");

        let fields: Vec<_> = record.fields().collect();
        assert_eq!(fields, vec![("Name", "Frostbolt"), ("School", "Fire")]);
    }

    #[test]
    fn test_passive_and_hidden_are_case_insensitive() {
        let mut record = SpellRecord::new();
        record.insert("Name", "Mastery: Arcane (PASSIVE) Hidden Aura");
        assert!(record.is_passive());
        assert!(record.is_hidden());

        let unnamed = SpellRecord::new();
        assert!(!unnamed.is_passive());
        assert!(!unnamed.is_hidden());
    }

    #[test]
    fn test_list_label_placeholders() {
        let mut record = SpellRecord::new();
        assert_eq!(record.list_label(), "Unnamed Spell (ID: No ID)");
        record.insert("Name", "Smite");
        record.insert("id", "585");
        assert_eq!(record.list_label(), "Smite (ID: 585)");
    }

    #[test]
    fn test_spell_family_lookup() {
        assert_eq!(SPELL_FAMILY_CLASSES.len(), 13);
        assert_eq!(class_for_spell_family("3"), Some("Mage"));
        assert_eq!(class_for_spell_family("224"), Some("Evoker"));
        assert_eq!(class_for_spell_family("999"), None);
        assert_eq!(class_for_spell_family("abc"), None);
    }

    #[test]
    fn test_serialize_preserves_field_order() {
        let mut record = SpellRecord::new();
        record.insert("Name", "Zap");
        record.insert("Cost", "5");
        record.insert("Alpha", "1");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Name":"Zap","Cost":"5","Alpha":"1"}"#);
    }
}

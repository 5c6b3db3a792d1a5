// Spellbook - core/parser.rs
//
// Block-oriented parsing of flat `Key: Value` spell exports.
// Core layer: accepts the complete text blob, never touches the network
// or filesystem directly.

use crate::core::model::SpellRecord;
use crate::util::constants::{self, FIELD_ID, FIELD_NAME, FIELD_SPELL_FAMILY_ID};
use regex::Regex;
use std::sync::OnceLock;

/// Configuration for parsing operations.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Derive `Spell Family ID` from each `Name` and drop records that lack
    /// the `[Spell Family (<digits>)]` marker. Used by family-classified
    /// exports; directly-classified exports leave this off.
    pub require_spell_family: bool,

    /// Maximum number of records collected; the rest of the export is
    /// still scanned but further records are discarded.
    pub max_records: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            require_spell_family: false,
            max_records: constants::MAX_RECORDS,
        }
    }
}

impl ParseConfig {
    /// Config for family-classified exports.
    pub fn spell_family() -> Self {
        Self {
            require_spell_family: true,
            ..Default::default()
        }
    }
}

/// Result of parsing one export.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Records in first-seen order.
    pub records: Vec<SpellRecord>,
    /// Total lines processed.
    pub lines_processed: u64,
    /// Records dropped because they lacked a spell family marker.
    pub records_dropped: usize,
    /// Records discarded after `max_records` was reached.
    pub records_truncated: usize,
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(id=([0-9]+)\)").expect("id pattern is valid"))
}

fn spell_family_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[Spell Family \(([0-9]+)\)\]").expect("spell family pattern is valid")
    })
}

/// Extract the digits of the first `(id=<digits>)` in `name`.
pub fn extract_id(name: &str) -> Option<&str> {
    id_pattern()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract the digits of the first `[Spell Family (<digits>)]` in `name`.
pub fn extract_spell_family_id(name: &str) -> Option<&str> {
    spell_family_pattern()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse a directly-classified export with default limits.
pub fn parse(text: &str) -> Vec<SpellRecord> {
    parse_content(text, &ParseConfig::default()).records
}

/// Parse a complete export into spell records.
///
/// A line whose trimmed text starts with `Name` closes the current record
/// and opens a new one. Every line inside a record is split on its first
/// colon into a trimmed key and value; lines without a colon or with an
/// empty key are skipped. Lines before the first `Name` line are ignored.
/// Never fails: degenerate input yields an empty result.
pub fn parse_content(text: &str, config: &ParseConfig) -> ParseResult {
    tracing::debug!(
        bytes = text.len(),
        require_spell_family = config.require_spell_family,
        "Parsing started"
    );

    let mut result = ParseResult::default();
    let mut current: Option<SpellRecord> = None;

    for line in text.lines() {
        result.lines_processed += 1;
        let trimmed = line.trim();

        if trimmed.starts_with(FIELD_NAME) {
            if let Some(record) = current.take() {
                finish_record(record, config, &mut result);
            }
            current = Some(SpellRecord::new());
        }

        let Some(record) = current.as_mut() else {
            continue;
        };

        let Some((raw_key, raw_value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = raw_key.trim();
        if key.is_empty() {
            continue;
        }
        let value = raw_value.trim();
        record.insert(key, value);

        if key == FIELD_NAME {
            if let Some(id) = extract_id(value) {
                record.insert(FIELD_ID, id);
            }
        }
    }

    if let Some(record) = current.take() {
        finish_record(record, config, &mut result);
    }

    if result.records_truncated > 0 {
        tracing::warn!(
            kept = result.records.len(),
            discarded = result.records_truncated,
            max = config.max_records,
            "Record cap reached; remaining records discarded"
        );
    }

    tracing::debug!(
        records = result.records.len(),
        dropped = result.records_dropped,
        lines = result.lines_processed,
        "Parsing finished"
    );

    result
}

/// Apply the parse-time family requirement and the record cap, then emit.
fn finish_record(mut record: SpellRecord, config: &ParseConfig, result: &mut ParseResult) {
    if config.require_spell_family {
        let family_id = record
            .name()
            .and_then(extract_spell_family_id)
            .map(str::to_string);
        match family_id {
            Some(family_id) => record.insert(FIELD_SPELL_FAMILY_ID, family_id),
            None => {
                result.records_dropped += 1;
                return;
            }
        }
    }

    if result.records.len() >= config.max_records {
        result.records_truncated += 1;
        return;
    }

    result.records.push(record);
}

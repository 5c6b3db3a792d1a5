// Spellbook - core/classify.rs
//
// Class membership and the per-class index behind the class filter.
// Core layer: pure logic, rebuilt in full whenever records or exclusion
// toggles change.

use crate::core::filter::FilterState;
use crate::core::model::{class_for_spell_family, SpellRecord, SPELL_FAMILY_CLASSES};
use crate::util::constants::CLASS_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a record's class membership is determined. One strategy is chosen
/// per deployment; the two are never mixed over one record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classifier {
    /// Split the record's `Class` field on `", "`.
    #[default]
    Direct,

    /// Look the record's `Spell Family ID` up in the static family table.
    SpellFamily,
}

impl Classifier {
    /// Class labels the record belongs to, in field order.
    pub fn memberships(self, record: &SpellRecord) -> Vec<String> {
        match self {
            Classifier::Direct => record
                .class_field()
                .map(|classes| {
                    classes
                        .split(CLASS_SEPARATOR)
                        .filter(|label| !label.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            Classifier::SpellFamily => record
                .spell_family_id()
                .and_then(class_for_spell_family)
                .map(|class| vec![class.to_string()])
                .unwrap_or_default(),
        }
    }

    /// True if any membership label satisfies `pred`.
    pub fn belongs_to_any(self, record: &SpellRecord, pred: impl Fn(&str) -> bool) -> bool {
        self.memberships(record).iter().any(|label| pred(label.as_str()))
    }

    /// Every label the class filter offers for `records`.
    ///
    /// Direct: labels seen on any record, first-seen order.
    /// SpellFamily: the fixed family table, in table order.
    pub fn known_labels(self, records: &[SpellRecord]) -> Vec<String> {
        match self {
            Classifier::Direct => {
                let mut labels: Vec<String> = Vec::new();
                for label in records.iter().flat_map(|r| self.memberships(r)) {
                    if !labels.contains(&label) {
                        labels.push(label);
                    }
                }
                labels
            }
            Classifier::SpellFamily => SPELL_FAMILY_CLASSES
                .iter()
                .map(|(_, class)| class.to_string())
                .collect(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Classifier::Direct => "direct",
            Classifier::SpellFamily => "spell-family",
        }
    }
}

impl std::fmt::Display for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Classifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(Classifier::Direct),
            "spell-family" | "spell_family" => Ok(Classifier::SpellFamily),
            other => Err(format!(
                "unknown classifier '{other}' (expected direct or spell-family)"
            )),
        }
    }
}

/// One class label and the records currently eligible under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBucket {
    pub label: String,
    /// Indices into the record slice, in parse order.
    pub record_indices: Vec<usize>,
}

impl ClassBucket {
    /// An empty bucket is shown as a disabled checkbox.
    pub fn is_enabled(&self) -> bool {
        !self.record_indices.is_empty()
    }
}

/// Class label to eligible records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassIndex {
    pub buckets: Vec<ClassBucket>,
}

impl ClassIndex {
    pub fn get(&self, label: &str) -> Option<&ClassBucket> {
        self.buckets.iter().find(|b| b.label == label)
    }

    /// False for unknown labels and labels with no eligible records.
    pub fn is_enabled(&self, label: &str) -> bool {
        self.get(label).is_some_and(ClassBucket::is_enabled)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.label.as_str())
    }

    pub fn enabled_labels(&self) -> impl Iterator<Item = &str> {
        self.buckets
            .iter()
            .filter(|b| b.is_enabled())
            .map(|b| b.label.as_str())
    }

    pub fn disabled_labels(&self) -> impl Iterator<Item = &str> {
        self.buckets
            .iter()
            .filter(|b| !b.is_enabled())
            .map(|b| b.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Build the class index from scratch.
///
/// Only the passive/hidden exclusions apply here; class selection and the
/// search term do not affect which labels are enabled.
pub fn build_class_index(
    records: &[SpellRecord],
    filter: &FilterState,
    classifier: Classifier,
) -> ClassIndex {
    let mut buckets: Vec<ClassBucket> = classifier
        .known_labels(records)
        .into_iter()
        .map(|label| ClassBucket {
            label,
            record_indices: Vec::new(),
        })
        .collect();

    for (idx, record) in records.iter().enumerate() {
        if filter.is_excluded(record) {
            continue;
        }
        for label in classifier.memberships(record) {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.label == label) {
                // A record listing the same class twice is indexed once.
                if bucket.record_indices.last() != Some(&idx) {
                    bucket.record_indices.push(idx);
                }
            }
        }
    }

    tracing::debug!(
        classifier = %classifier,
        labels = buckets.len(),
        enabled = buckets.iter().filter(|b| b.is_enabled()).count(),
        "Class index rebuilt"
    );

    ClassIndex { buckets }
}

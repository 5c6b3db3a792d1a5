// Spellbook - core/filter.rs
//
// Query pipeline over parsed spell records.
// Core layer: pure logic, no I/O dependencies. Results are indices into
// the caller's record slice, in parse order.

use crate::core::classify::{ClassIndex, Classifier};
use crate::core::model::SpellRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Caller-held filter state. Survives re-parses until the user changes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Exclude records whose name contains "passive".
    pub hide_passives: bool,

    /// Exclude records whose name contains "hidden".
    pub hide_hidden: bool,

    /// Class labels to include. Empty selects nothing.
    pub selected_classes: BTreeSet<String>,

    /// Case-insensitive substring matched against `Name` and `id`.
    pub search_term: String,

    /// State the next select/unselect-all applies (true = select).
    pub select_all_next: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            hide_passives: false,
            hide_hidden: false,
            selected_classes: BTreeSet::new(),
            search_term: String::new(),
            select_all_next: true,
        }
    }
}

impl FilterState {
    /// True if an active exclusion toggle removes `record`.
    pub fn is_excluded(&self, record: &SpellRecord) -> bool {
        (self.hide_passives && record.is_passive()) || (self.hide_hidden && record.is_hidden())
    }

    /// Check or uncheck a single class label.
    pub fn set_class_selected(&mut self, label: &str, selected: bool) {
        if selected {
            self.selected_classes.insert(label.to_string());
        } else {
            self.selected_classes.remove(label);
        }
    }

    /// Select or unselect every enabled class label at once.
    ///
    /// Applies `select_all_next` to each enabled label of `index`, leaves
    /// disabled labels as they are, then flips `select_all_next`. Returns
    /// the state that was applied.
    pub fn toggle_select_all(&mut self, index: &ClassIndex) -> bool {
        let applied = self.select_all_next;
        let enabled: Vec<String> = index.enabled_labels().map(str::to_string).collect();
        for label in &enabled {
            self.set_class_selected(label, applied);
        }
        self.select_all_next = !applied;

        tracing::debug!(selected = applied, labels = enabled.len(), "Select/unselect all");
        applied
    }
}

/// Which predicates a query applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Exclusion toggles plus class selection. The search term is ignored.
    #[default]
    Class,

    /// Search term only. Exclusions and class selection are ignored.
    Search,

    /// Class mode narrowed further by the search term.
    Combined,
}

impl QueryMode {
    pub fn label(self) -> &'static str {
        match self {
            QueryMode::Class => "class",
            QueryMode::Search => "search",
            QueryMode::Combined => "combined",
        }
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "class" => Ok(QueryMode::Class),
            "search" => Ok(QueryMode::Search),
            "combined" => Ok(QueryMode::Combined),
            other => Err(format!(
                "unknown query mode '{other}' (expected class, search or combined)"
            )),
        }
    }
}

/// Run a query, returning indices of matching records in parse order.
pub fn query(
    records: &[SpellRecord],
    filter: &FilterState,
    classifier: Classifier,
    mode: QueryMode,
) -> Vec<usize> {
    let search_lower = filter.search_term.to_lowercase();

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| match mode {
            QueryMode::Class => matches_class(record, filter, classifier),
            QueryMode::Search => matches_search(record, &search_lower),
            QueryMode::Combined => {
                matches_class(record, filter, classifier) && matches_search(record, &search_lower)
            }
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Exclusion toggles plus class intersection. An empty selection matches
/// nothing.
fn matches_class(record: &SpellRecord, filter: &FilterState, classifier: Classifier) -> bool {
    if filter.selected_classes.is_empty() || filter.is_excluded(record) {
        return false;
    }
    classifier.belongs_to_any(record, |label| filter.selected_classes.contains(label))
}

/// `Name` or `id` contains the lowercased term. An empty term matches all.
fn matches_search(record: &SpellRecord, search_lower: &str) -> bool {
    if search_lower.is_empty() {
        return true;
    }
    let name = record.name().unwrap_or_default().to_lowercase();
    let id = record.id().unwrap_or_default().to_lowercase();
    name.contains(search_lower) || id.contains(search_lower)
}

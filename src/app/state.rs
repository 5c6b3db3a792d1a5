// Spellbook - app/state.rs
//
// Application state management. Holds the current record set, filter
// state, derived class index and query results, and the selection.
// Owned by the CLI shell; every mutation re-derives index and results.

use crate::app::fetch::{fetch_text, FetchConfig};
use crate::core::classify::{build_class_index, ClassIndex, Classifier};
use crate::core::detail::{find_by_id, format_detail, SpellDetail};
use crate::core::filter::{query, FilterState, QueryMode};
use crate::core::model::SpellRecord;
use crate::core::parser::{parse_content, ParseConfig};
use crate::util::error::FetchError;

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Records from the most recent successful load.
    records: Vec<SpellRecord>,

    /// Current filter configuration.
    pub filter_state: FilterState,

    /// Class membership strategy for this deployment.
    classifier: Classifier,

    /// Parser settings; `require_spell_family` follows the classifier.
    parse_config: ParseConfig,

    /// Which query path populates the browsable list.
    query_mode: QueryMode,

    /// Class index for the current records and exclusion toggles.
    class_index: ClassIndex,

    /// Indices of records matching the current query (into `records`).
    filtered_indices: Vec<usize>,

    /// Id of the selected record, if any.
    selected_id: Option<String>,

    /// Status message for the shell.
    pub status_message: String,

    /// Non-fatal warnings accumulated during loads.
    pub warnings: Vec<String>,
}

impl AppState {
    /// Create empty state for the given classifier.
    pub fn new(classifier: Classifier, query_mode: QueryMode) -> Self {
        let parse_config = ParseConfig {
            require_spell_family: classifier == Classifier::SpellFamily,
            ..Default::default()
        };
        Self {
            records: Vec::new(),
            filter_state: FilterState::default(),
            classifier,
            parse_config,
            query_mode,
            class_index: ClassIndex::default(),
            filtered_indices: Vec::new(),
            selected_id: None,
            status_message: "Ready. Load a spell export to begin.".to_string(),
            warnings: Vec::new(),
        }
    }

    /// Cap the number of records kept per load.
    pub fn set_max_records(&mut self, max_records: usize) {
        self.parse_config.max_records = max_records;
    }

    /// Parse `text` and replace the record set.
    ///
    /// The previous records are discarded entirely; filter state carries
    /// over. A selection whose id no longer exists is cleared.
    pub fn load_text(&mut self, text: &str) {
        let result = parse_content(text, &self.parse_config);
        self.records = result.records;

        if result.records_truncated > 0 {
            self.warnings.push(format!(
                "Record cap of {} reached; {} records discarded.",
                self.parse_config.max_records, result.records_truncated
            ));
        }

        let selection_gone = self
            .selected_id
            .as_deref()
            .is_some_and(|id| find_by_id(&self.records, id).is_none());
        if selection_gone {
            self.selected_id = None;
        }

        self.refresh();
        self.status_message = format!(
            "Loaded {} spells ({} without spell family skipped).",
            self.records.len(),
            result.records_dropped
        );
        tracing::info!(
            records = self.records.len(),
            dropped = result.records_dropped,
            lines = result.lines_processed,
            "Spell export loaded"
        );
    }

    /// Fetch and load an export.
    ///
    /// On failure the previous records stay in place and the error is
    /// recorded as a warning as well as returned.
    pub fn load_source(&mut self, input: &str, config: &FetchConfig) -> Result<(), FetchError> {
        match fetch_text(input, config) {
            Ok(text) => {
                self.load_text(&text);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(source = input, error = %e, "Spell export retrieval failed");
                self.warnings.push(e.to_string());
                self.status_message = format!("Load failed: {e}");
                Err(e)
            }
        }
    }

    /// Rebuild the class index and re-run the current query.
    fn refresh(&mut self) {
        self.class_index = build_class_index(&self.records, &self.filter_state, self.classifier);
        self.filtered_indices = query(
            &self.records,
            &self.filter_state,
            self.classifier,
            self.query_mode,
        );
    }

    pub fn set_hide_passives(&mut self, hide: bool) {
        self.filter_state.hide_passives = hide;
        self.refresh();
    }

    pub fn set_hide_hidden(&mut self, hide: bool) {
        self.filter_state.hide_hidden = hide;
        self.refresh();
    }

    pub fn set_class_selected(&mut self, label: &str, selected: bool) {
        self.filter_state.set_class_selected(label, selected);
        self.refresh();
    }

    /// Select or unselect every enabled class; returns the state applied.
    pub fn toggle_select_all(&mut self) -> bool {
        let applied = self.filter_state.toggle_select_all(&self.class_index);
        self.refresh();
        applied
    }

    pub fn set_search(&mut self, term: &str) {
        self.filter_state.search_term = term.to_string();
        self.refresh();
    }

    pub fn set_query_mode(&mut self, mode: QueryMode) {
        self.query_mode = mode;
        self.refresh();
    }

    /// Select the first record with this id. Unknown ids clear the selection.
    pub fn select_id(&mut self, id: &str) -> Option<&SpellRecord> {
        self.selected_id = find_by_id(&self.records, id).map(|_| id.to_string());
        self.selected_record()
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    pub fn records(&self) -> &[SpellRecord] {
        &self.records
    }

    pub fn classifier(&self) -> Classifier {
        self.classifier
    }

    pub fn query_mode(&self) -> QueryMode {
        self.query_mode
    }

    pub fn class_index(&self) -> &ClassIndex {
        &self.class_index
    }

    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered_indices
    }

    /// Records matching the current query, in parse order.
    pub fn filtered_records(&self) -> impl Iterator<Item = &SpellRecord> {
        self.filtered_indices
            .iter()
            .filter_map(|&idx| self.records.get(idx))
    }

    pub fn selected_record(&self) -> Option<&SpellRecord> {
        self.selected_id
            .as_deref()
            .and_then(|id| find_by_id(&self.records, id))
    }

    /// Detail of the selection; empty when nothing is selected.
    pub fn selected_detail(&self) -> SpellDetail {
        format_detail(self.selected_record())
    }
}

//! Belief set catalog: the loaded belief sets and the active selection.
//!
//! The active belief set and its sentence index travel together in one
//! immutable `ActiveBeliefSet` snapshot. Selecting replaces the whole
//! snapshot, so every reader sees either the old set with the old index
//! or the new set with the new index.

use std::collections::HashSet;
use std::sync::Arc;

use crate::belief::{Belief, BeliefSet, BeliefSetFile};
use crate::error::{CheemeraResult, ValidationError};
use crate::sentence::SentenceIndex;

/// The selected belief set together with its derived sentence index.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBeliefSet {
    file: Arc<BeliefSetFile>,
    index: SentenceIndex,
}

impl ActiveBeliefSet {
    /// Builds the snapshot, indexing the belief set from scratch.
    #[must_use]
    pub fn new(file: impl Into<Arc<BeliefSetFile>>) -> Self {
        let file = file.into();
        let index = SentenceIndex::build(&file.belief_set);
        Self { file, index }
    }

    /// File name of the selected set.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file.file_name
    }

    /// The selected belief set.
    #[must_use]
    pub fn belief_set(&self) -> &BeliefSet {
        &self.file.belief_set
    }

    /// Sentence index built from the selected set.
    #[must_use]
    pub fn index(&self) -> &SentenceIndex {
        &self.index
    }

    /// Looks up a belief of the selected set.
    #[must_use]
    pub fn find_belief(&self, belief_unique_id: &str) -> Option<&Belief> {
        self.file.belief_set.find_belief(belief_unique_id)
    }
}

/// Loaded belief sets with at most one active selection.
#[derive(Debug, Default)]
pub struct BeliefSetCatalog {
    files: Vec<Arc<BeliefSetFile>>,
    active: Option<Arc<ActiveBeliefSet>>,
}

impl BeliefSetCatalog {
    /// Builds a catalog from a listing.
    ///
    /// Every belief set must have unique belief ids, and file names must
    /// be unique across the listing. Nothing is selected initially.
    pub fn new(files: Vec<BeliefSetFile>) -> Result<Self, ValidationError> {
        let mut names = HashSet::with_capacity(files.len());
        for file in &files {
            if !names.insert(file.file_name.as_str()) {
                return Err(ValidationError::DuplicateFileName {
                    file_name: file.file_name.clone(),
                });
            }
            file.belief_set.validate()?;
        }

        Ok(Self {
            files: files.into_iter().map(Arc::new).collect(),
            active: None,
        })
    }

    /// Builds a catalog from the listing payload
    /// (`[{ "fileName": ..., "beliefSet": ... }, ...]`).
    pub fn from_listing_json(json: &str) -> CheemeraResult<Self> {
        let files: Vec<BeliefSetFile> =
            serde_json::from_str(json).map_err(|e| ValidationError::InvalidListing {
                message: e.to_string(),
            })?;
        Ok(Self::new(files)?)
    }

    /// Every loaded belief set, in listing order.
    #[must_use]
    pub fn list(&self) -> &[Arc<BeliefSetFile>] {
        &self.files
    }

    /// Makes `file_name` the active belief set, or clears the selection
    /// when no such file is loaded. Returns the new active snapshot.
    pub fn select(&mut self, file_name: &str) -> Option<Arc<ActiveBeliefSet>> {
        self.active = self
            .files
            .iter()
            .find(|f| f.file_name == file_name)
            .map(|f| Arc::new(ActiveBeliefSet::new(Arc::clone(f))));

        match &self.active {
            Some(active) => tracing::info!(
                file = file_name,
                beliefs = active.belief_set().len(),
                sentences = active.index().len(),
                "belief set selected"
            ),
            None => tracing::info!(file = file_name, "belief set not found, selection cleared"),
        }
        self.active.clone()
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// The active snapshot, if a set is selected.
    #[must_use]
    pub fn active(&self) -> Option<&Arc<ActiveBeliefSet>> {
        self.active.as_ref()
    }

    /// Looks up a belief of the active belief set.
    #[must_use]
    pub fn find_belief(&self, belief_unique_id: &str) -> Option<&Belief> {
        self.active.as_ref()?.find_belief(belief_unique_id)
    }

    /// Sentence index of the active belief set.
    #[must_use]
    pub fn sentence_index(&self) -> Option<&SentenceIndex> {
        self.active.as_ref().map(|a| a.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;
    use crate::scenario::{Consequence, Scenario};

    fn rule(id: &str, a: &str, b: &str) -> Belief {
        Belief::new(
            id,
            Scenario::if_then(
                vec![Property::positive(a)],
                vec![Consequence::always(vec![Property::positive(b)])],
            ),
        )
    }

    fn catalog() -> BeliefSetCatalog {
        BeliefSetCatalog::new(vec![
            BeliefSetFile::new("abc.json", BeliefSet::new("abc").with_belief(rule("r1", "A", "B"))),
            BeliefSetFile::new("xyz.json", BeliefSet::new("xyz").with_belief(rule("r9", "X", "Y"))),
        ])
        .unwrap()
    }

    #[test]
    fn nothing_selected_initially() {
        let catalog = catalog();
        assert_eq!(catalog.list().len(), 2);
        assert!(catalog.active().is_none());
        assert!(catalog.find_belief("r1").is_none());
        assert!(catalog.sentence_index().is_none());
    }

    #[test]
    fn select_indexes_the_new_set() {
        let mut catalog = catalog();
        let active = catalog.select("xyz.json").unwrap();
        assert_eq!(active.file_name(), "xyz.json");
        assert_eq!(active.index().sentences(), &["X".to_string(), "Y".to_string()]);
        assert_eq!(catalog.sentence_index().map(SentenceIndex::len), Some(2));
    }

    #[test]
    fn find_belief_is_scoped_to_active_set() {
        let mut catalog = catalog();
        catalog.select("abc.json");
        assert!(catalog.find_belief("r1").is_some());
        assert!(catalog.find_belief("r9").is_none());

        catalog.select("xyz.json");
        assert!(catalog.find_belief("r1").is_none());
        assert!(catalog.find_belief("r9").is_some());
    }

    #[test]
    fn selecting_unknown_file_clears_selection() {
        let mut catalog = catalog();
        catalog.select("abc.json");
        assert!(catalog.select("missing.json").is_none());
        assert!(catalog.active().is_none());
    }

    #[test]
    fn rejects_duplicate_file_names() {
        let err = BeliefSetCatalog::new(vec![
            BeliefSetFile::new("a.json", BeliefSet::new("a")),
            BeliefSetFile::new("a.json", BeliefSet::new("b")),
        ])
        .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateFileName { .. }));
    }

    #[test]
    fn rejects_duplicate_belief_ids() {
        let err = BeliefSetCatalog::new(vec![BeliefSetFile::new(
            "a.json",
            BeliefSet::new("a")
                .with_belief(rule("r1", "A", "B"))
                .with_belief(rule("r1", "C", "D")),
        )])
        .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateBeliefId { .. }));
    }

    #[test]
    fn parses_listing_payload() {
        let json = r#"[
            { "fileName": "w.json", "beliefSet": { "beliefSetName": "Weather", "beliefs": [] } }
        ]"#;
        let catalog = BeliefSetCatalog::from_listing_json(json).unwrap();
        assert_eq!(catalog.list()[0].belief_set.belief_set_name, "Weather");

        let err = BeliefSetCatalog::from_listing_json("{}").unwrap_err();
        assert!(err.is_validation());
    }
}

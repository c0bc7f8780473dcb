//! Explorer: one catalog and the sessions exploring its active belief set.
//!
//! Selecting a belief set is the one event that cascades: the catalog
//! builds a fresh snapshot (belief set plus sentence index) and the
//! session manager is reset onto it in the same call.

use std::sync::Arc;

use crate::belief::Belief;
use crate::catalog::BeliefSetCatalog;
use crate::client::ReasoningService;
use crate::error::CheemeraResult;
use crate::session::{SessionConfig, SessionManager, TabId};

/// A belief set catalog together with the sessions exploring its selection.
pub struct Explorer {
    catalog: BeliefSetCatalog,
    sessions: SessionManager,
}

impl Explorer {
    /// Starts the session manager and binds it to the catalog's current
    /// selection, if any.
    pub fn new(
        catalog: BeliefSetCatalog,
        service: Arc<dyn ReasoningService>,
        config: SessionConfig,
    ) -> CheemeraResult<Self> {
        let mut sessions = SessionManager::new(service, config)?;
        sessions.reset(catalog.active().cloned());
        Ok(Self { catalog, sessions })
    }

    /// Loaded belief sets.
    #[must_use]
    pub fn catalog(&self) -> &BeliefSetCatalog {
        &self.catalog
    }

    /// Explore tabs.
    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Explore tabs, for edits and for applying completions.
    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    /// Selects a belief set (or clears the selection if `file_name` is not
    /// loaded) and resets every tab. Returns whether a set is now active.
    pub fn select(&mut self, file_name: &str) -> bool {
        let active = self.catalog.select(file_name);
        let selected = active.is_some();
        self.sessions.reset(active);
        selected
    }

    /// Sentences of the active belief set, empty when nothing is selected.
    #[must_use]
    pub fn sentences(&self) -> &[String] {
        self.catalog
            .sentence_index()
            .map(|index| index.sentences())
            .unwrap_or_default()
    }

    /// Autocomplete candidates for a tab's search box.
    #[must_use]
    pub fn suggestions(&self, tab: TabId, query: &str) -> Vec<String> {
        let (Some(index), Some(tab)) = (self.catalog.sentence_index(), self.sessions.tab(tab)) else {
            return Vec::new();
        };
        index
            .suggest(query, &tab.selectors)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Looks up a belief of the active set.
    #[must_use]
    pub fn find_belief(&self, belief_unique_id: &str) -> Option<&Belief> {
        self.catalog.find_belief(belief_unique_id)
    }

    /// Belief behind one reasoning step of a tab's current result.
    #[must_use]
    pub fn step_source(&self, tab: TabId, step_index: usize) -> Option<&Belief> {
        let tab = self.sessions.tab(tab)?;
        let result = tab.result.as_ref()?;
        let id = result.steps().get(step_index)?.source_belief_id.as_deref()?;
        self.catalog.find_belief(id)
    }
}

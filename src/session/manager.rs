//! Session manager: owns the explore tabs and routes query results.
//!
//! Tabs live in a keyed map from `TabId` to an immutable `Arc<ExploreTab>`,
//! with a separate vector for display order. Selector edits produce an
//! explicit `SelectorsChanged` signal which the manager consumes to decide
//! whether to issue a query. Completions are routed by the tab id captured
//! when the query was issued, never by whichever tab is active.
//!
//! Response ordering is governed by [`ResponsePolicy`]. In-flight queries
//! are never cancelled.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use serde::{Deserialize, Serialize};

use crate::catalog::ActiveBeliefSet;
use crate::client::ReasoningService;
use crate::error::CheemeraResult;
use crate::session::dispatch::{Completion, DispatcherConfig, QueryDispatcher, RequestTicket};
use crate::session::{
    ExploreTab, FailureCause, Selector, SelectorEdit, SkipReason, TabId, Trigger,
};

/// How a tab reconciles responses that arrive out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePolicy {
    /// Responses to requests older than the tab's latest request are
    /// discarded; the tab stays loading until the latest one lands.
    #[default]
    LatestRequestWins,
    /// Every response is applied as it arrives, so a slow stale response
    /// can overwrite a newer one.
    LastArrivalWins,
}

/// Session manager configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How out-of-order responses are reconciled.
    pub policy: ResponsePolicy,
    /// Worker pool settings.
    pub dispatcher: DispatcherConfig,
}

/// What applying one completion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Applied {
    /// The tab took the result.
    Resolved(TabId),
    /// The tab recorded the failure; its prior result is untouched.
    Failed(TabId),
    /// A newer request for the tab was already issued.
    Stale(TabId),
    /// The tab no longer exists.
    Orphaned(TabId),
}

/// Emitted by every operation that changes a tab's selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SelectorsChanged {
    tab: TabId,
}

/// Owns the explore tabs of one belief set selection.
pub struct SessionManager {
    tabs: HashMap<TabId, Arc<ExploreTab>>,
    order: Vec<TabId>,
    active_tab: TabId,
    /// Number used in the next "Explore N" name; never reused.
    next_number: u64,
    next_seq: u64,
    context: Option<Arc<ActiveBeliefSet>>,
    policy: ResponsePolicy,
    dispatcher: QueryDispatcher,
    completions: Receiver<Completion>,
}

impl SessionManager {
    /// Creates a manager holding one empty tab and no belief set.
    pub fn new(service: Arc<dyn ReasoningService>, config: SessionConfig) -> CheemeraResult<Self> {
        let (tx, rx) = unbounded();
        let dispatcher = QueryDispatcher::start(service, &config.dispatcher, tx)?;
        let first = ExploreTab::empty("Explore 1");
        let active_tab = first.id;

        Ok(Self {
            tabs: HashMap::from([(first.id, Arc::new(first))]),
            order: vec![active_tab],
            active_tab,
            next_number: 2,
            next_seq: 0,
            context: None,
            policy: config.policy,
            dispatcher,
            completions: rx,
        })
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Current value of one tab.
    #[must_use]
    pub fn tab(&self, id: TabId) -> Option<Arc<ExploreTab>> {
        self.tabs.get(&id).cloned()
    }

    /// All tabs in display order.
    #[must_use]
    pub fn tabs(&self) -> Vec<Arc<ExploreTab>> {
        self.order
            .iter()
            .filter_map(|id| self.tabs.get(id).cloned())
            .collect()
    }

    /// Number of tabs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false: the manager never holds fewer than one tab.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Id of the active tab.
    #[must_use]
    pub fn active_id(&self) -> TabId {
        self.active_tab
    }

    /// Current value of the active tab.
    #[must_use]
    pub fn active_tab(&self) -> Option<Arc<ExploreTab>> {
        self.tab(self.active_tab)
    }

    /// Belief set queries are currently issued against.
    #[must_use]
    pub fn context(&self) -> Option<&Arc<ActiveBeliefSet>> {
        self.context.as_ref()
    }

    /// Response policy in force.
    #[must_use]
    pub fn policy(&self) -> ResponsePolicy {
        self.policy
    }

    /// Returns true if any tab has a query in flight.
    #[must_use]
    pub fn any_loading(&self) -> bool {
        self.tabs.values().any(|t| t.is_loading())
    }

    // ------------------------------------------------------------------
    // Tab lifecycle
    // ------------------------------------------------------------------

    /// Appends an empty tab named "Explore N" and makes it active.
    pub fn create_tab(&mut self) -> TabId {
        let tab = ExploreTab::empty(format!("Explore {}", self.next_number));
        self.next_number += 1;
        let id = tab.id;
        self.insert(tab);
        self.active_tab = id;
        tracing::debug!(tab = %id, "tab created");
        id
    }

    /// Copies a tab's selectors into a new active tab. The result is not
    /// copied and no query is issued; use [`Self::run`] for that.
    pub fn duplicate_tab(&mut self, id: TabId) -> Option<TabId> {
        let Some(source) = self.tabs.get(&id) else {
            tracing::debug!(tab = %id, "duplicate of unknown tab ignored");
            return None;
        };
        let copy = source.duplicate();
        let copy_id = copy.id;
        self.insert(copy);
        self.active_tab = copy_id;
        tracing::debug!(source = %id, tab = %copy_id, "tab duplicated");
        Some(copy_id)
    }

    /// Removes a tab unless it is the only one. Returns whether it was removed.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        if !self.tabs.contains_key(&id) {
            tracing::debug!(tab = %id, "close of unknown tab ignored");
            return false;
        }
        if self.order.len() == 1 {
            tracing::debug!(tab = %id, "refusing to close the last tab");
            return false;
        }

        self.tabs.remove(&id);
        self.order.retain(|t| *t != id);
        if self.active_tab == id {
            // Non-empty: at least two tabs existed before the removal.
            self.active_tab = self.order[0];
        }
        tracing::debug!(tab = %id, "tab closed");
        true
    }

    /// Returns whether the tab exists (and is now active).
    pub fn set_active(&mut self, id: TabId) -> bool {
        if self.tabs.contains_key(&id) {
            self.active_tab = id;
            true
        } else {
            false
        }
    }

    /// Drops every tab and starts over with a single empty tab bound to
    /// `context`. Completions of queries issued before the reset find no
    /// tab to land in and are dropped.
    pub fn reset(&mut self, context: Option<Arc<ActiveBeliefSet>>) {
        let first = ExploreTab::empty("Explore 1");
        let id = first.id;
        self.tabs.clear();
        self.order.clear();
        self.insert(first);
        self.active_tab = id;
        self.next_number = 2;
        self.context = context;
        tracing::debug!(
            belief_set = ?self.context.as_ref().map(|c| c.file_name()),
            "sessions reset"
        );
    }

    // ------------------------------------------------------------------
    // Selector edits
    // ------------------------------------------------------------------

    /// Appends a selector with `valence = true`. Without a sentence (or
    /// with an empty one) the first sentence of the active index is used,
    /// or "" if there is none.
    pub fn add_selector(&mut self, id: TabId, sentence: Option<&str>) -> Trigger {
        let sentence = sentence
            .filter(|s| !s.is_empty())
            .or_else(|| self.context.as_ref().and_then(|c| c.index().first()))
            .unwrap_or_default()
            .to_string();
        let changed = self.edit_selectors(id, |selectors| {
            selectors.push(Selector::new(sentence, true));
            Ok(())
        });
        self.consume(changed)
    }

    /// Deletes the selector at `index`; later selectors shift down.
    pub fn remove_selector(&mut self, id: TabId, index: usize) -> Trigger {
        let changed = self.edit_selectors(id, |selectors| {
            if index >= selectors.len() {
                return Err(SkipReason::IndexOutOfRange);
            }
            selectors.remove(index);
            Ok(())
        });
        self.consume(changed)
    }

    /// Replaces the sentence or the valence of the selector at `index`.
    pub fn update_selector(&mut self, id: TabId, index: usize, edit: SelectorEdit) -> Trigger {
        let changed = self.edit_selectors(id, |selectors| {
            let selector = selectors.get_mut(index).ok_or(SkipReason::IndexOutOfRange)?;
            let before = selector.clone();
            match edit {
                SelectorEdit::Sentence(sentence) => selector.sentence = sentence,
                SelectorEdit::Valence(valence) => selector.valence = valence,
            }
            if *selector == before {
                return Err(SkipReason::Unchanged);
            }
            Ok(())
        });
        self.consume(changed)
    }

    /// Issues a query for the tab's current selectors.
    pub fn run(&mut self, id: TabId) -> Trigger {
        if !self.tabs.contains_key(&id) {
            return Trigger::Skipped(SkipReason::UnknownTab);
        }
        self.issue(id)
    }

    /// Applies a selector edit to a copy of the tab and swaps the copy in.
    fn edit_selectors<F>(&mut self, id: TabId, edit: F) -> Result<SelectorsChanged, SkipReason>
    where
        F: FnOnce(&mut Vec<Selector>) -> Result<(), SkipReason>,
    {
        let tab = self.tabs.get(&id).ok_or(SkipReason::UnknownTab)?;
        let mut selectors = tab.selectors.clone();
        edit(&mut selectors)?;
        let updated = tab.with_selectors(selectors);
        self.tabs.insert(id, Arc::new(updated));
        Ok(SelectorsChanged { tab: id })
    }

    fn consume(&mut self, changed: Result<SelectorsChanged, SkipReason>) -> Trigger {
        match changed {
            Ok(SelectorsChanged { tab }) => self.issue(tab),
            Err(reason) => {
                tracing::debug!(%reason, "selector edit ignored");
                Trigger::Skipped(reason)
            }
        }
    }

    // ------------------------------------------------------------------
    // Querying
    // ------------------------------------------------------------------

    fn issue(&mut self, id: TabId) -> Trigger {
        let Some(tab) = self.tabs.get(&id) else {
            return Trigger::Skipped(SkipReason::UnknownTab);
        };
        if tab.selectors.is_empty() {
            return Trigger::Skipped(SkipReason::NoSelectors);
        }
        let Some(snapshot) = self.context.clone() else {
            return Trigger::Skipped(SkipReason::NoBeliefSet);
        };

        self.next_seq += 1;
        let ticket = RequestTicket {
            tab: id,
            seq: self.next_seq,
        };
        let properties = tab.properties();
        let loading = tab.loading(ticket.seq);

        match self.dispatcher.submit(ticket, snapshot, properties) {
            Ok(()) => {
                tracing::debug!(tab = %id, seq = ticket.seq, "explore issued");
                self.tabs.insert(id, Arc::new(loading));
                Trigger::Issued(ticket)
            }
            Err(e) => {
                tracing::warn!(tab = %id, error = %e, "explore could not be dispatched");
                let failed = loading.failed(&FailureCause::Dispatch(e.clone()));
                self.tabs.insert(id, Arc::new(failed));
                Trigger::Rejected(e)
            }
        }
    }

    /// Applies every completion that has already arrived, without blocking.
    pub fn poll(&mut self) -> Vec<Applied> {
        let mut applied = Vec::new();
        while let Ok(completion) = self.completions.try_recv() {
            applied.push(self.apply(completion));
        }
        applied
    }

    /// Waits up to `timeout` for the next completion and applies it.
    pub fn wait(&mut self, timeout: Duration) -> Option<Applied> {
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => Some(self.apply(completion)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Applies completions until no tab is loading or `timeout` elapses.
    /// Returns whether every tab settled.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.any_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || self.wait(remaining).is_none() {
                return !self.any_loading();
            }
        }
        true
    }

    /// Routes one completion to the tab that issued it.
    pub fn apply(&mut self, completion: Completion) -> Applied {
        let Completion {
            ticket,
            snapshot,
            outcome,
        } = completion;

        let Some(tab) = self.tabs.get(&ticket.tab) else {
            tracing::debug!(tab = %ticket.tab, seq = ticket.seq, "completion for closed tab dropped");
            return Applied::Orphaned(ticket.tab);
        };

        if self.policy == ResponsePolicy::LatestRequestWins && ticket.seq < tab.latest_request {
            tracing::debug!(
                tab = %ticket.tab,
                seq = ticket.seq,
                latest = tab.latest_request,
                "stale completion dropped"
            );
            return Applied::Stale(ticket.tab);
        }

        match outcome {
            Ok(result) => {
                let dangling = result.dangling_sources(snapshot.belief_set());
                if !dangling.is_empty() {
                    tracing::warn!(
                        tab = %ticket.tab,
                        ?dangling,
                        "reasoning steps cite beliefs missing from the queried set"
                    );
                }
                let updated = tab.resolved(result);
                self.tabs.insert(ticket.tab, Arc::new(updated));
                tracing::debug!(tab = %ticket.tab, seq = ticket.seq, "explore resolved");
                Applied::Resolved(ticket.tab)
            }
            Err(e) => {
                tracing::warn!(tab = %ticket.tab, seq = ticket.seq, error = %e, "explore failed");
                let updated = tab.failed(&FailureCause::Transport(e));
                self.tabs.insert(ticket.tab, Arc::new(updated));
                Applied::Failed(ticket.tab)
            }
        }
    }

    fn insert(&mut self, tab: ExploreTab) {
        self.order.push(tab.id);
        self.tabs.insert(tab.id, Arc::new(tab));
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("tabs", &self.tabs())
            .field("active_tab", &self.active_tab)
            .field("policy", &self.policy)
            .field("context", &self.context.as_ref().map(|c| c.file_name()))
            .finish_non_exhaustive()
    }
}

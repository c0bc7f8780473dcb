//! Explore sessions ("tabs") and the manager that owns them.
//!
//! A tab is an immutable value: every edit or response builds a new
//! `ExploreTab` and swaps it into the manager's keyed map, so a holder
//! of an older `Arc<ExploreTab>` never observes a change.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DispatchError, TransportError};
use crate::property::Property;
use crate::result::ExploreResult;

pub mod dispatch;
pub mod manager;

pub use dispatch::{Completion, DispatcherConfig, QueryDispatcher, RequestTicket};
pub use manager::{Applied, ResponsePolicy, SessionConfig, SessionManager};

/// Opaque, unique tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(Uuid);

impl TabId {
    /// Creates a new random tab ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One asserted property in a tab.
///
/// The sentence is free text; it need not occur in the active belief set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    /// Asserted sentence; need not come from the index.
    pub sentence: String,
    /// Whether the sentence is asserted true.
    pub valence: bool,
}

impl Selector {
    /// Creates a selector.
    #[must_use]
    pub fn new(sentence: impl Into<String>, valence: bool) -> Self {
        Self {
            sentence: sentence.into(),
            valence,
        }
    }

    /// The selector as a wire property.
    #[must_use]
    pub fn to_property(&self) -> Property {
        Property::new(self.sentence.clone(), self.valence)
    }
}

/// Replacement for one field of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEdit {
    /// New sentence.
    Sentence(String),
    /// New valence.
    Valence(bool),
}

/// Query state of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabStatus {
    /// No query has been issued yet.
    Idle,
    /// A query is in flight.
    Loading,
    /// The latest applied query produced a result.
    Resolved,
    /// The latest applied query failed; `result` holds whatever came before.
    Failed,
}

impl fmt::Display for TabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Resolved => write!(f, "resolved"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One exploration tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreTab {
    /// Stable identity.
    pub id: TabId,
    /// Display name, "Explore N" or "... (copy)".
    pub name: String,
    /// Asserted properties, in order.
    pub selectors: Vec<Selector>,
    /// Latest applied result, if any.
    pub result: Option<ExploreResult>,
    /// Query state.
    pub status: TabStatus,

    /// Text of the failure that moved the tab to `Failed`.
    pub last_error: Option<String>,

    /// When `result` was last replaced.
    pub resolved_at: Option<DateTime<Utc>>,

    /// Sequence number of the latest request issued for this tab.
    #[serde(skip)]
    pub(crate) latest_request: u64,
}

impl ExploreTab {
    pub(crate) fn empty(name: impl Into<String>) -> Self {
        Self {
            id: TabId::new(),
            name: name.into(),
            selectors: Vec::new(),
            result: None,
            status: TabStatus::Idle,
            last_error: None,
            resolved_at: None,
            latest_request: 0,
        }
    }

    /// Returns true if a query for this tab is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == TabStatus::Loading
    }

    /// The tab's selectors as wire properties.
    #[must_use]
    pub fn properties(&self) -> Vec<Property> {
        self.selectors.iter().map(Selector::to_property).collect()
    }

    /// Fresh tab carrying a deep copy of the selectors and nothing else.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            selectors: self.selectors.clone(),
            ..Self::empty(format!("{} (copy)", self.name))
        }
    }

    pub(crate) fn with_selectors(&self, selectors: Vec<Selector>) -> Self {
        Self {
            selectors,
            ..self.clone()
        }
    }

    pub(crate) fn loading(&self, seq: u64) -> Self {
        Self {
            status: TabStatus::Loading,
            latest_request: seq,
            ..self.clone()
        }
    }

    pub(crate) fn resolved(&self, result: ExploreResult) -> Self {
        Self {
            result: Some(result),
            status: TabStatus::Resolved,
            last_error: None,
            resolved_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    pub(crate) fn failed(&self, error: &FailureCause) -> Self {
        Self {
            status: TabStatus::Failed,
            last_error: Some(error.to_string()),
            ..self.clone()
        }
    }
}

/// Why a query did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The reasoning service call failed.
    Transport(TransportError),
    /// The query never left the dispatcher.
    Dispatch(DispatchError),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{e}"),
            Self::Dispatch(e) => write!(f, "{e}"),
        }
    }
}

/// What a tab operation did about querying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A query was handed to the dispatcher.
    Issued(RequestTicket),
    /// The dispatcher refused the query; the tab is now `Failed`.
    Rejected(DispatchError),
    /// No query was issued.
    Skipped(SkipReason),
}

impl Trigger {
    /// Returns true if a query was handed to the dispatcher.
    #[must_use]
    pub const fn is_issued(&self) -> bool {
        matches!(self, Self::Issued(_))
    }

    /// Ticket of the issued query.
    #[must_use]
    pub const fn ticket(&self) -> Option<&RequestTicket> {
        match self {
            Self::Issued(ticket) => Some(ticket),
            _ => None,
        }
    }
}

/// Reason a tab operation issued no query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No tab with the given id.
    UnknownTab,
    /// Selector index past the end of the list.
    IndexOutOfRange,
    /// The edit left the selectors as they were.
    Unchanged,
    /// The tab has no selectors to explore.
    NoSelectors,
    /// No belief set is selected.
    NoBeliefSet,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTab => write!(f, "unknown tab"),
            Self::IndexOutOfRange => write!(f, "selector index out of range"),
            Self::Unchanged => write!(f, "selectors unchanged"),
            Self::NoSelectors => write!(f, "no selectors"),
            Self::NoBeliefSet => write!(f, "no belief set selected"),
        }
    }
}

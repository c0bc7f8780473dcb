//! # Cheemera - exploration sessions over belief sets
//!
//! Cheemera lets a user pick properties (a sentence asserted true or
//! false) and ask an external reasoning service whether they are
//! consistent with a belief set, and what else they imply. This crate is
//! the client and session layer around that service.
//!
//! ## Core Concepts
//!
//! - **Belief set**: a collection of rules (`IF_THEN`, `MUTUAL_EXCLUSION`,
//!   `MUTUAL_INCLUSION`) over named sentences
//! - **Sentence index**: the sorted, deduplicated sentences of a belief set
//! - **Explore tab**: an independent query context with its own selectors
//!   and result
//! - **Session manager**: owns the tabs and issues a query whenever a tab's
//!   selectors change
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cheemera::{BeliefSetCatalog, ClientConfig, Explorer, HttpExploreClient, SessionConfig};
//!
//! let catalog = BeliefSetCatalog::from_listing_json(&listing)?;
//! let service = HttpExploreClient::new(ClientConfig::new("http://localhost:3001"))?;
//! let mut explorer = Explorer::new(catalog, Arc::new(service), SessionConfig::default())?;
//!
//! explorer.select("weather.json");
//! let tab = explorer.sessions().active_id();
//! explorer.sessions_mut().add_selector(tab, Some("It is raining"));
//! explorer.sessions_mut().wait_idle(Duration::from_secs(5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod belief;
pub mod error;
pub mod property;
pub mod result;
pub mod scenario;
pub mod sentence;
pub mod wire;

// Client and sessions
pub mod catalog;
pub mod client;
pub mod explorer;
pub mod session;

#[cfg(feature = "proxy")]
pub mod proxy;

// Re-export primary types at crate root for convenience
pub use belief::{Belief, BeliefSet, BeliefSetFile};
pub use catalog::{ActiveBeliefSet, BeliefSetCatalog};
pub use client::{ClientConfig, HttpExploreClient, ReasoningService};
pub use error::{CheemeraError, CheemeraResult, DispatchError, TransportError, ValidationError};
pub use explorer::Explorer;
pub use property::Property;
pub use result::{ExploreOutcome, ExploreResult, ReasoningStep};
pub use scenario::{Consequence, Modal, Scenario, ScenarioType};
pub use sentence::{extract_sentences, SentenceIndex};
pub use session::{
    Applied, DispatcherConfig, ExploreTab, RequestTicket, ResponsePolicy, Selector, SelectorEdit,
    SessionConfig, SessionManager, SkipReason, TabId, TabStatus, Trigger,
};
pub use wire::ExploreRequest;

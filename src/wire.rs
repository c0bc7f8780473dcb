//! Wire schema for the reasoning service and the explore proxy.
//!
//! ```text
//! POST <reasoning-service>/exploreBeliefSet
//! Request:  { "beliefSet": BeliefSet, "explore": Property[] }
//! Response: ExploreResult (2xx) | anything else is a failure
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::belief::BeliefSet;
use crate::property::Property;

/// Path of the reasoning service's explore endpoint.
pub const EXPLORE_PATH: &str = "/exploreBeliefSet";

/// Path the proxy serves explore requests on.
pub const PROXY_EXPLORE_PATH: &str = "/api/explore";

/// Error text the proxy returns when the upstream call fails.
pub const PROXY_FAILURE_MESSAGE: &str = "Failed to explore belief set";

/// Request body for an explore call.
///
/// Borrowing by default keeps dispatch from cloning the belief set for
/// every query. Deserializing yields the owned form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreRequest<'a> {
    /// Belief set to explore against.
    pub belief_set: Cow<'a, BeliefSet>,

    /// Some front-ends send `properties` instead.
    #[serde(alias = "properties")]
    pub explore: Cow<'a, [Property]>,
}

impl<'a> ExploreRequest<'a> {
    /// Borrows the belief set and properties.
    #[must_use]
    pub fn new(belief_set: &'a BeliefSet, explore: &'a [Property]) -> Self {
        Self {
            belief_set: Cow::Borrowed(belief_set),
            explore: Cow::Borrowed(explore),
        }
    }
}

/// Error payload returned by the proxy on upstream failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyErrorBody {
    /// Failure text.
    pub error: String,
}

impl ProxyErrorBody {
    /// The body returned when the upstream call fails.
    #[must_use]
    pub fn upstream_failure() -> Self {
        Self {
            error: PROXY_FAILURE_MESSAGE.to_string(),
        }
    }
}

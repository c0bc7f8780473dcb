//! ExploreResult - the reasoning service's verdict on an assertion set.
//!
//! A result says whether the submitted properties are jointly satisfiable
//! against the belief set, and lists the deductions made along the way.

use serde::{Deserialize, Serialize};

use crate::belief::BeliefSet;
use crate::property::Property;

/// The result code the reasoning service reports for a completed query.
pub const RESULT_CODE_OK: &str = "OK";

/// One deduction made while exploring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningStep {
    /// Kind of inference, e.g. `ApplyRule`.
    pub inference_step_type: String,

    /// Properties this step deduced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deduced_property: Option<Vec<Property>>,

    /// Belief that produced this step, as a `beliefUniqueId` of the queried set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_belief_id: Option<String>,
}

impl ReasoningStep {
    /// A step of the given kind that deduced nothing.
    #[must_use]
    pub fn new(inference_step_type: impl Into<String>) -> Self {
        Self {
            inference_step_type: inference_step_type.into(),
            deduced_property: None,
            source_belief_id: None,
        }
    }

    /// Sets the deduced properties.
    #[must_use]
    pub fn deducing(mut self, properties: Vec<Property>) -> Self {
        self.deduced_property = Some(properties);
        self
    }

    /// Sets the source belief.
    #[must_use]
    pub fn from_belief(mut self, belief_unique_id: impl Into<String>) -> Self {
        self.source_belief_id = Some(belief_unique_id.into());
        self
    }

    /// Deduced properties, empty when the step deduced nothing.
    #[must_use]
    pub fn deduced(&self) -> &[Property] {
        self.deduced_property.as_deref().unwrap_or_default()
    }
}

/// Verdict and deductions of one explore call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreOutcome {
    /// Whether the explored properties can hold together.
    pub possible: bool,

    /// Deductions, in the order the service made them.
    #[serde(default)]
    pub reasoning_steps: Vec<ReasoningStep>,

    /// Secondary output from the service; opaque to this crate.
    #[serde(default)]
    pub array_of_secondary_residues: Vec<String>,
}

/// Envelope the reasoning service answers an explore call with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreResult {
    /// `"OK"` when the service completed the query.
    pub result_code: String,

    /// Free-text detail accompanying the code.
    #[serde(default)]
    pub result_reason: String,

    /// The verdict.
    pub results: ExploreOutcome,
}

impl ExploreResult {
    /// A successful result with the given verdict and steps.
    #[must_use]
    pub fn ok(possible: bool, reasoning_steps: Vec<ReasoningStep>) -> Self {
        Self {
            result_code: RESULT_CODE_OK.to_string(),
            result_reason: String::new(),
            results: ExploreOutcome {
                possible,
                reasoning_steps,
                array_of_secondary_residues: Vec::new(),
            },
        }
    }

    /// Returns true if the service reported `OK`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result_code == RESULT_CODE_OK
    }

    /// Whether the explored properties can hold together.
    #[must_use]
    pub const fn possible(&self) -> bool {
        self.results.possible
    }

    /// Reasoning steps, in order.
    #[must_use]
    pub fn steps(&self) -> &[ReasoningStep] {
        &self.results.reasoning_steps
    }

    /// All deduced properties, in step order.
    pub fn deduced_properties(&self) -> impl Iterator<Item = &Property> {
        self.results
            .reasoning_steps
            .iter()
            .flat_map(ReasoningStep::deduced)
    }

    /// Source belief ids that do not name a belief of `belief_set`.
    #[must_use]
    pub fn dangling_sources<'a>(&'a self, belief_set: &BeliefSet) -> Vec<&'a str> {
        self.results
            .reasoning_steps
            .iter()
            .filter_map(|step| step.source_belief_id.as_deref())
            .filter(|id| belief_set.find_belief(id).is_none())
            .collect()
    }
}

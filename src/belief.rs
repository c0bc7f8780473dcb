//! Belief types - the rules a belief set is made of.
//!
//! A Belief is one scenario plus provenance metadata, uniquely
//! identified within its belief set. Belief sets are loaded as a whole
//! and never mutated in place; replacing the active set is a full swap.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::property::Property;
use crate::scenario::Scenario;

/// One rule of a belief set.
///
/// # Examples
///
/// ```
/// use cheemera::{Belief, Consequence, Property, Scenario};
///
/// let belief = Belief::new(
///     "rain-wets-ground",
///     Scenario::if_then(
///         vec![Property::positive("It is raining")],
///         vec![Consequence::always(vec![Property::positive("The ground is wet")])],
///     ),
/// );
///
/// assert_eq!(belief.belief_unique_id, "rain-wets-ground");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Belief {
    /// Identifier, unique within the owning belief set.
    pub belief_unique_id: String,
    /// The rule this belief asserts.
    pub scenario: Scenario,

    /// Name of the rule system the belief was imported from.
    #[serde(default)]
    pub originating_rule_system_name: String,

    /// Identifier of that rule system.
    #[serde(default)]
    pub originating_rule_system_uuid: String,
}

impl Belief {
    /// Creates a belief with empty provenance.
    #[must_use]
    pub fn new(belief_unique_id: impl Into<String>, scenario: Scenario) -> Self {
        Self {
            belief_unique_id: belief_unique_id.into(),
            scenario,
            originating_rule_system_name: String::new(),
            originating_rule_system_uuid: String::new(),
        }
    }

    /// Records the rule system this belief was imported from.
    #[must_use]
    pub fn with_origin(mut self, name: impl Into<String>, uuid: impl Into<String>) -> Self {
        self.originating_rule_system_name = name.into();
        self.originating_rule_system_uuid = uuid.into();
        self
    }

    /// Every property the belief's scenario mentions.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.scenario.properties()
    }
}

/// A named, versioned collection of beliefs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeliefSet {
    /// Display name.
    pub belief_set_name: String,

    /// Owner, free text.
    #[serde(default)]
    pub belief_set_owner: String,

    /// Version label, free text.
    #[serde(default)]
    pub belief_set_version: String,

    /// Rules, in file order.
    #[serde(default)]
    pub beliefs: Vec<Belief>,

    /// External references carried through to the reasoning service untouched.
    #[serde(default)]
    pub blind_reference_external_id_array: Vec<serde_json::Value>,
}

impl BeliefSet {
    /// Creates an empty belief set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            belief_set_name: name.into(),
            belief_set_owner: String::new(),
            belief_set_version: String::new(),
            beliefs: Vec::new(),
            blind_reference_external_id_array: Vec::new(),
        }
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.belief_set_owner = owner.into();
        self
    }

    /// Sets the version label.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.belief_set_version = version.into();
        self
    }

    /// Appends a belief.
    #[must_use]
    pub fn with_belief(mut self, belief: Belief) -> Self {
        self.beliefs.push(belief);
        self
    }

    /// Looks up a belief by its unique id.
    #[must_use]
    pub fn find_belief(&self, belief_unique_id: &str) -> Option<&Belief> {
        self.beliefs
            .iter()
            .find(|b| b.belief_unique_id == belief_unique_id)
    }

    /// Checks that belief ids are unique within the set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.beliefs.len());
        for belief in &self.beliefs {
            if !seen.insert(belief.belief_unique_id.as_str()) {
                return Err(ValidationError::DuplicateBeliefId {
                    belief_set: self.belief_set_name.clone(),
                    belief_unique_id: belief.belief_unique_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Number of beliefs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    /// Returns true if the set has no beliefs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }
}

/// A belief set as returned by the catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeliefSetFile {
    /// Name the set is listed and selected under.
    pub file_name: String,
    /// The belief set itself.
    pub belief_set: BeliefSet,
}

impl BeliefSetFile {
    /// Pairs a belief set with its file name.
    #[must_use]
    pub fn new(file_name: impl Into<String>, belief_set: BeliefSet) -> Self {
        Self {
            file_name: file_name.into(),
            belief_set,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Consequence, ScenarioType};

    fn rule(id: &str, a: &str, b: &str) -> Belief {
        Belief::new(
            id,
            Scenario::if_then(
                vec![Property::positive(a)],
                vec![Consequence::always(vec![Property::positive(b)])],
            ),
        )
    }

    #[test]
    fn find_belief_by_id() {
        let set = BeliefSet::new("chain")
            .with_belief(rule("r1", "A", "B"))
            .with_belief(rule("r2", "B", "C"));

        assert_eq!(set.find_belief("r2").map(|b| b.scenario.antecedents[0][0].sentence.as_str()), Some("B"));
        assert!(set.find_belief("r3").is_none());
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let set = BeliefSet::new("dup")
            .with_belief(rule("r1", "A", "B"))
            .with_belief(rule("r1", "B", "C"));

        let err = set.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateBeliefId {
                belief_set: "dup".to_string(),
                belief_unique_id: "r1".to_string(),
            }
        );
    }

    #[test]
    fn validate_accepts_empty_set() {
        let set = BeliefSet::new("empty");
        assert!(set.validate().is_ok());
        assert!(set.is_empty());
    }

    #[test]
    fn parses_wire_json() {
        let json = serde_json::json!({
            "beliefSetName": "Weather",
            "beliefSetOwner": "alice",
            "beliefSetVersion": "1.0",
            "beliefs": [{
                "beliefUniqueId": "w1",
                "originatingRuleSystemName": "manual",
                "originatingRuleSystemUuid": "0000",
                "scenario": {
                    "type": "MUTUAL_INCLUSION",
                    "antecedents": [],
                    "consequences": [{
                        "modal": "Always",
                        "properties": [
                            { "sentence": "Thunder", "valence": true },
                            { "sentence": "Lightning", "valence": true }
                        ]
                    }]
                }
            }],
            "blindReferenceExternalIdArray": [42, "ext-7"]
        });

        let set: BeliefSet = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.beliefs[0].scenario.scenario_type, ScenarioType::MutualInclusion);
        assert_eq!(set.beliefs[0].originating_rule_system_name, "manual");
        assert_eq!(set.blind_reference_external_id_array.len(), 2);

        // Opaque references survive a trip back to the wire unchanged.
        assert_eq!(serde_json::to_value(&set).unwrap(), json);
    }

    #[test]
    fn listing_entry_shape() {
        let file = BeliefSetFile::new("weather.json", BeliefSet::new("Weather"));
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["fileName"], "weather.json");
        assert_eq!(json["beliefSet"]["beliefSetName"], "Weather");
    }
}

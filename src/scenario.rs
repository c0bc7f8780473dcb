//! Scenarios - the logical rule shapes carried by beliefs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::property::{write_conjunction, Property};

/// The rule shape of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioType {
    /// Antecedents imply the consequences.
    IfThen,
    /// The listed properties cannot hold together.
    MutualExclusion,
    /// The listed properties hold together or not at all.
    MutualInclusion,
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IfThen => write!(f, "IF_THEN"),
            Self::MutualExclusion => write!(f, "MUTUAL_EXCLUSION"),
            Self::MutualInclusion => write!(f, "MUTUAL_INCLUSION"),
        }
    }
}

/// Whether a consequence's properties must or must not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modal {
    /// The properties jointly hold in every satisfying extension.
    Always,
    /// The properties jointly cannot hold.
    Never,
}

impl fmt::Display for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::Never => write!(f, "Never"),
        }
    }
}

/// A group of properties under a modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consequence {
    /// Whether the group must or must not hold.
    pub modal: Modal,
    /// The group, read as a conjunction.
    pub properties: Vec<Property>,
}

impl Consequence {
    /// The properties jointly hold.
    #[must_use]
    pub fn always(properties: Vec<Property>) -> Self {
        Self {
            modal: Modal::Always,
            properties,
        }
    }

    /// The properties jointly cannot hold.
    #[must_use]
    pub fn never(properties: Vec<Property>) -> Self {
        Self {
            modal: Modal::Never,
            properties,
        }
    }
}

impl fmt::Display for Consequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) ", self.modal)?;
        write_conjunction(f, &self.properties)
    }
}

/// A rule over antecedent and consequence property groups.
///
/// `antecedents` is a disjunction of conjunctions: the condition holds if
/// any inner group holds, and a group holds if all of its properties hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Rule shape.
    #[serde(rename = "type")]
    pub scenario_type: ScenarioType,

    /// Condition groups; empty for exclusion and inclusion rules.
    #[serde(default)]
    pub antecedents: Vec<Vec<Property>>,

    /// What follows when the condition holds.
    #[serde(default)]
    pub consequences: Vec<Consequence>,
}

impl Scenario {
    /// An `IF_THEN` rule with a single antecedent group.
    #[must_use]
    pub fn if_then(antecedent: Vec<Property>, consequences: Vec<Consequence>) -> Self {
        Self {
            scenario_type: ScenarioType::IfThen,
            antecedents: vec![antecedent],
            consequences,
        }
    }

    /// Every property mentioned by the scenario, antecedents first.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.antecedents
            .iter()
            .flatten()
            .chain(self.consequences.iter().flat_map(|c| c.properties.iter()))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scenario_type)?;
        if !self.antecedents.is_empty() {
            f.write_str(": IF ")?;
            for (i, group) in self.antecedents.iter().enumerate() {
                if i > 0 {
                    f.write_str(" OR ")?;
                }
                write_conjunction(f, group)?;
            }
        }
        for (i, consequence) in self.consequences.iter().enumerate() {
            f.write_str(if i == 0 { " THEN " } else { "; " })?;
            write!(f, "{consequence}")?;
        }
        Ok(())
    }
}

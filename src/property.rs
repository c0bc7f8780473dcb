//! Properties - a sentence paired with an asserted valence.
//!
//! `valence = true` asserts the sentence holds; `valence = false` asserts
//! that it does not. Properties are the shared vocabulary of scenarios,
//! explore requests and reasoning steps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A sentence asserted true or false.
///
/// # Examples
///
/// ```
/// use cheemera::Property;
///
/// let p = Property::negative("It is raining");
/// assert_eq!(p.to_string(), "NOT It is raining");
/// assert_eq!(p.prose(), "It is not true that it is raining");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Property {
    /// The proposition, as free text.
    pub sentence: String,
    /// Whether the sentence is asserted to hold.
    pub valence: bool,
}

impl Property {
    /// Creates a property.
    #[must_use]
    pub fn new(sentence: impl Into<String>, valence: bool) -> Self {
        Self {
            sentence: sentence.into(),
            valence,
        }
    }

    /// The sentence asserted true.
    #[must_use]
    pub fn positive(sentence: impl Into<String>) -> Self {
        Self::new(sentence, true)
    }

    /// The sentence asserted false.
    #[must_use]
    pub fn negative(sentence: impl Into<String>) -> Self {
        Self::new(sentence, false)
    }

    /// Returns the same sentence with the opposite valence.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self::new(self.sentence.clone(), !self.valence)
    }

    /// Renders the property as an English clause.
    ///
    /// The sentence's first character is lowercased so that it reads as a
    /// continuation of "It is true that".
    #[must_use]
    pub fn prose(&self) -> String {
        let mut chars = self.sentence.chars();
        let continued: String = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        };
        if self.valence {
            format!("It is true that {continued}")
        } else {
            format!("It is not true that {continued}")
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valence {
            write!(f, "{}", self.sentence)
        } else {
            write!(f, "NOT {}", self.sentence)
        }
    }
}

/// Writes a conjunction of properties as `A AND NOT B`.
pub(crate) fn write_conjunction(f: &mut fmt::Formatter<'_>, properties: &[Property]) -> fmt::Result {
    for (i, property) in properties.iter().enumerate() {
        if i > 0 {
            f.write_str(" AND ")?;
        }
        write!(f, "{property}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_sentence_and_valence() {
        assert_eq!(Property::positive("A"), Property::new("A", true));
        assert_ne!(Property::positive("A"), Property::negative("A"));
        assert_ne!(Property::positive("A"), Property::positive("B"));
    }

    #[test]
    fn negated_flips_valence_only() {
        let p = Property::positive("It is raining");
        let n = p.negated();
        assert_eq!(n.sentence, "It is raining");
        assert!(!n.valence);
        assert_eq!(n.negated(), p);
    }

    #[test]
    fn display_marks_negation() {
        assert_eq!(Property::positive("A").to_string(), "A");
        assert_eq!(Property::negative("A").to_string(), "NOT A");
    }

    #[test]
    fn prose_lowercases_first_letter() {
        assert_eq!(
            Property::positive("The ground is wet").prose(),
            "It is true that the ground is wet"
        );
        assert_eq!(
            Property::negative("Äpfel fallen").prose(),
            "It is not true that äpfel fallen"
        );
    }

    #[test]
    fn prose_of_empty_sentence() {
        assert_eq!(Property::positive("").prose(), "It is true that ");
    }

    #[test]
    fn wire_shape() {
        let json = serde_json::to_value(Property::negative("B")).unwrap();
        assert_eq!(json, serde_json::json!({ "sentence": "B", "valence": false }));
    }
}

//! Sentence index: the selectable vocabulary of a belief set.
//!
//! The index is a pure function of a belief set. It is rebuilt in full
//! whenever the active belief set changes and never maintained
//! incrementally.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::belief::BeliefSet;
use crate::session::Selector;

/// Collects every sentence mentioned in the belief set's antecedent groups
/// and consequence lists.
///
/// Valence is ignored. The result is sorted lexicographically and free of
/// duplicates; an empty belief set yields an empty vector.
#[must_use]
pub fn extract_sentences(belief_set: &BeliefSet) -> Vec<String> {
    let unique: BTreeSet<&str> = belief_set
        .beliefs
        .iter()
        .flat_map(|belief| belief.properties())
        .map(|property| property.sentence.as_str())
        .collect();
    unique.into_iter().map(str::to_owned).collect()
}

/// Sorted, deduplicated sentences of one belief set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SentenceIndex {
    sentences: Vec<String>,
}

impl SentenceIndex {
    /// Indexes every sentence of `belief_set`.
    #[must_use]
    pub fn build(belief_set: &BeliefSet) -> Self {
        Self {
            sentences: extract_sentences(belief_set),
        }
    }

    /// Sentences in sorted order.
    #[must_use]
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Default sentence for a newly added selector.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.sentences.first().map(String::as_str)
    }

    /// Advisory check for free-text selector input.
    #[must_use]
    pub fn contains(&self, sentence: &str) -> bool {
        self.sentences
            .binary_search_by(|s| s.as_str().cmp(sentence))
            .is_ok()
    }

    /// Autocomplete candidates for a search box.
    ///
    /// Case-insensitive substring match on `query`, skipping sentences
    /// already used by one of `selected`. Order follows the index.
    #[must_use]
    pub fn suggest<'a>(&'a self, query: &str, selected: &[Selector]) -> Vec<&'a str> {
        let needle = query.to_lowercase();
        self.sentences
            .iter()
            .filter(|s| !selected.iter().any(|sel| &sel.sentence == *s))
            .filter(|s| s.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Number of distinct sentences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Returns true if the index holds no sentences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

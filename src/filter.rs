//! Fuzzy filtering and ranking of candidates.

use crate::catalog::Item;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which item field a query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKey {
    Name,
    Value,
}

impl MatchKey {
    fn field(self, item: &Item) -> &str {
        match self {
            MatchKey::Name => &item.name,
            MatchKey::Value => &item.value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMatching {
    /// Case-insensitive unless the query contains an uppercase letter.
    #[default]
    Smart,
    Ignore,
    Respect,
}

/// Caller-supplied scoring policy, passed through to the scorer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Fields to score; an item's score is the best across them.
    pub keys: Vec<MatchKey>,
    pub case: CaseMatching,
    /// Drop matches scoring below this.
    pub threshold: Option<i64>,
    /// Keep at most this many results.
    pub limit: Option<usize>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            keys: vec![MatchKey::Name],
            case: CaseMatching::Smart,
            threshold: None,
            limit: None,
        }
    }
}

/// Scores candidates with the skim v2 algorithm, which rewards consecutive
/// runs and matches at word starts and near the beginning of the label.
pub struct FuzzyFilter {
    matcher: SkimMatcherV2,
    options: MatchOptions,
}

impl fmt::Debug for FuzzyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyFilter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for FuzzyFilter {
    fn default() -> Self {
        FuzzyFilter::new(MatchOptions::default())
    }
}

impl FuzzyFilter {
    pub fn new(options: MatchOptions) -> Self {
        let matcher = SkimMatcherV2::default();
        let matcher = match options.case {
            CaseMatching::Smart => matcher.smart_case(),
            CaseMatching::Ignore => matcher.ignore_case(),
            CaseMatching::Respect => matcher.respect_case(),
        };
        FuzzyFilter { matcher, options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Best score of `item` across the configured keys, or `None` on no match.
    pub fn score(&self, query: &str, item: &Item) -> Option<i64> {
        let best = self
            .options
            .keys
            .iter()
            .filter_map(|key| self.matcher.fuzzy_match(key.field(item), query))
            .max()?;
        match self.options.threshold {
            Some(min) if best < min => None,
            _ => Some(best),
        }
    }

    /// Filter and rank `candidates` (any borrowed form of [`Item`]).
    ///
    /// An empty query returns every candidate in its original order. Otherwise
    /// matches are sorted by descending score; ties keep their input order.
    pub fn filter<T: AsRef<Item>>(&self, query: &str, candidates: Vec<T>) -> Vec<T> {
        if query.is_empty() {
            return candidates;
        }

        let mut scored: Vec<(i64, T)> = candidates
            .into_iter()
            .filter_map(|c| self.score(query, c.as_ref()).map(|s| (s, c)))
            .collect();
        // `sort_by` is stable, which keeps equal scores in catalog order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        if let Some(limit) = self.options.limit {
            scored.truncate(limit);
        }

        tracing::debug!(query, matched = scored.len(), "filtered candidates");
        scored.into_iter().map(|(_, c)| c).collect()
    }
}

/// Convenience wrapper: filter `candidates` with a one-off [`FuzzyFilter`].
pub fn filter<T: AsRef<Item>>(query: &str, candidates: Vec<T>, options: &MatchOptions) -> Vec<T> {
    FuzzyFilter::new(options.clone()).filter(query, candidates)
}

//! Deterministic ordering of trials.
//!
//! Sort key: composite ascending (IEEE total order, with NaN of either sign
//! after every number), then key ascending. The sort is stable, so trials that tie on both keep their
//! input order.

use serde::Serialize;

use crate::search::Trial;

/// Trials ordered best-first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Ranking<K> {
    trials: Vec<Trial<K>>,
}

/// Rank `trials` without modifying the input.
pub fn rank<K: Ord + Clone>(trials: &[Trial<K>]) -> Ranking<K> {
    Ranking::from_trials(trials.to_vec())
}

/// The first `min(n, len)` trials of a ranking.
pub fn top_n<K>(ranking: &Ranking<K>, n: usize) -> &[Trial<K>] {
    ranking.top_n(n)
}

impl<K: Ord> Ranking<K> {
    /// Rank an owned collection of trials.
    pub fn from_trials(mut trials: Vec<Trial<K>>) -> Self {
        trials.sort_by(|a, b| {
            a.composite
                .is_nan()
                .cmp(&b.composite.is_nan())
                .then_with(|| a.composite.total_cmp(&b.composite))
                .then_with(|| a.key.cmp(&b.key))
        });
        Self { trials }
    }
}

impl<K> Ranking<K> {
    pub fn top_n(&self, n: usize) -> &[Trial<K>] {
        &self.trials[..n.min(self.trials.len())]
    }

    pub fn best(&self) -> Option<&Trial<K>> {
        self.trials.first()
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trial<K>> {
        self.trials.iter()
    }

    pub fn as_slice(&self) -> &[Trial<K>] {
        &self.trials
    }

    pub fn into_vec(self) -> Vec<Trial<K>> {
        self.trials
    }
}

impl<K: Clone> Ranking<K> {
    /// Trials for one section, still in ranked order.
    pub fn for_section(&self, section: &str) -> Ranking<K> {
        Ranking {
            trials: self
                .trials
                .iter()
                .filter(|t| t.section == section)
                .cloned()
                .collect(),
        }
    }
}

impl<'a, K> IntoIterator for &'a Ranking<K> {
    type Item = &'a Trial<K>;
    type IntoIter = std::slice::Iter<'a, Trial<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.trials.iter()
    }
}

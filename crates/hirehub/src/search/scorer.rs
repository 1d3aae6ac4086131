use serde::{Deserialize, Serialize};

use super::record::SearchableRecord;

/// Tunable constants of the relevance heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub match_bonus: f64,
    pub occurrence_weight: f64,
    pub brevity_bonus: f64,
    pub brevity_chars_per_point: f64,
    pub featured_bonus: f64,
    pub verified_bonus: f64,
    pub active_bonus: f64,
    pub rating_multiplier: f64,
    pub experience_cap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            match_bonus: 10.0,
            occurrence_weight: 2.0,
            brevity_bonus: 5.0,
            brevity_chars_per_point: 100.0,
            featured_bonus: 5.0,
            verified_bonus: 3.0,
            active_bonus: 2.0,
            rating_multiplier: 2.0,
            experience_cap: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Scores {
    pub relevance: f64,
    pub score: f64,
}

/// A record with its computed scores. Lives only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub record: SearchableRecord,
    pub relevance: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub const fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Deterministic score of `record` against `term`; a missing or blank term yields
    /// zero relevance so only the status bonuses remain.
    pub fn score(&self, record: &SearchableRecord, term: Option<&str>) -> Scores {
        let relevance = term
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| self.relevance(record.text(), term))
            .unwrap_or(0.0);

        let weights = &self.weights;
        let signals = record.signals();
        let mut score = relevance;
        if signals.is_featured {
            score += weights.featured_bonus;
        }
        if signals.is_verified {
            score += weights.verified_bonus;
        }
        if signals.is_active {
            score += weights.active_bonus;
        }
        if let Some(rating) = signals.rating {
            score += rating.max(0.0) * weights.rating_multiplier;
        }
        if let Some(years) = signals.experience_years {
            score += years.clamp(0.0, weights.experience_cap);
        }

        Scores { relevance, score }
    }

    pub fn scored(&self, record: SearchableRecord, term: Option<&str>) -> ScoredResult {
        let Scores { relevance, score } = self.score(&record, term);
        ScoredResult {
            record,
            relevance,
            score,
        }
    }

    fn relevance(&self, text: &str, term: &str) -> f64 {
        let weights = &self.weights;
        let haystack = text.to_lowercase();
        let needle = term.to_lowercase();
        let occurrences = haystack.matches(needle.as_str()).count() as f64;

        let mut relevance = 0.0;
        if occurrences > 0.0 {
            relevance += weights.match_bonus;
        }
        relevance += weights.occurrence_weight * occurrences;

        let length = haystack.chars().count() as f64;
        relevance += (weights.brevity_bonus - length / weights.brevity_chars_per_point).max(0.0);
        relevance
    }
}

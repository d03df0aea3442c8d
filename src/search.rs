//! Fuzzy name matching for artist lookup.

/// Best candidate for a query: its position in the candidate list and a 0-100 similarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub index: usize,
    pub score: u8,
}

pub trait NameMatcher: Send + Sync {
    /// Highest-scoring candidate, or `None` when there are no candidates.
    fn best_match(&self, query: &str, candidates: &[String]) -> Option<Match>;
}

/// Normalized Levenshtein similarity on trimmed, lowercased names. Ties keep the earlier candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LevenshteinMatcher;

impl LevenshteinMatcher {
    pub fn score(query: &str, candidate: &str) -> u8 {
        let a = query.trim().to_lowercase();
        let b = candidate.trim().to_lowercase();
        (strsim::normalized_levenshtein(&a, &b) * 100.0).round() as u8
    }
}

impl NameMatcher for LevenshteinMatcher {
    fn best_match(&self, query: &str, candidates: &[String]) -> Option<Match> {
        candidates
            .iter()
            .enumerate()
            .map(|(index, c)| Match {
                index,
                score: Self::score(query, c),
            })
            .fold(None, |best: Option<Match>, m| match best {
                Some(b) if b.score >= m.score => Some(b),
                _ => Some(m),
            })
    }
}

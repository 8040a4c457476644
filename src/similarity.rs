use strsim::levenshtein;

pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// Ranks candidate names by case-insensitive Levenshtein distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityMatcher;

impl SimilarityMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Largest distance still considered a plausible typo of `candidate`.
    pub fn threshold(candidate: &str) -> usize {
        candidate.chars().count() / 2 + 1
    }

    pub fn distance(left: &str, right: &str) -> usize {
        levenshtein(&left.to_lowercase(), &right.to_lowercase())
    }

    /// Up to `max` entries of `universe`, nearest first, ties broken lexicographically.
    pub fn suggest<S: AsRef<str>>(&self, candidate: &str, universe: &[S], max: usize) -> Vec<String> {
        let threshold = Self::threshold(candidate);
        let candidate = candidate.to_lowercase();

        let mut ranked = universe
            .iter()
            .map(|entry| {
                let entry: &str = entry.as_ref();
                (levenshtein(&candidate, &entry.to_lowercase()), entry)
            })
            .filter(|(distance, _)| *distance <= threshold)
            .collect::<Vec<_>>();
        ranked.sort_unstable();
        ranked.dedup_by(|left, right| left.1 == right.1);

        ranked
            .into_iter()
            .take(max)
            .map(|(_, entry)| entry.to_string())
            .collect()
    }
}

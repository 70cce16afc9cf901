//! Token scoring: engagement counts → derived token score.

use serde::{Deserialize, Serialize};

use crate::engagement::LatestCounts;

/// Conversion ratios applied when deriving a token score from counts.
///
/// Both ratios must be strictly positive; the API and CLI validate before
/// a value ever reaches [`tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSettings {
    pub likes_per_token: u64,
    pub views_per_token: u64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            likes_per_token: 1,
            views_per_token: 50,
        }
    }
}

impl TokenSettings {
    /// Both ratios strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.likes_per_token > 0 && self.views_per_token > 0
    }

    /// Token score for one post's newest counts under these settings.
    #[must_use]
    pub fn tokens_for(&self, counts: LatestCounts) -> u64 {
        tokens(
            counts.likes,
            counts.views,
            self.likes_per_token,
            self.views_per_token,
        )
    }
}

/// `floor(likes / likes_per_token) + floor(views / views_per_token)`.
///
/// Performs no validation: a zero ratio is a division panic. Callers are
/// responsible for ensuring both ratios are strictly positive.
#[must_use]
pub fn tokens(likes: u64, views: u64, likes_per_token: u64, views_per_token: u64) -> u64 {
    likes / likes_per_token + views / views_per_token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_is_floor_of_each_ratio_summed() {
        assert_eq!(tokens(1000, 5000, 1, 50), 1000 + 100);
        assert_eq!(tokens(999, 49, 1000, 50), 0);
        assert_eq!(tokens(1999, 99, 1000, 50), 1 + 1);
    }

    #[test]
    fn zero_counts_score_zero() {
        assert_eq!(tokens(0, 0, 1, 50), 0);
    }

    #[test]
    fn default_settings_match_the_dashboard_defaults() {
        let settings = TokenSettings::default();
        assert_eq!(settings.likes_per_token, 1);
        assert_eq!(settings.views_per_token, 50);
        assert!(settings.is_valid());
    }

    #[test]
    fn settings_with_a_zero_ratio_are_invalid() {
        let settings = TokenSettings {
            likes_per_token: 0,
            views_per_token: 50,
        };
        assert!(!settings.is_valid());
    }

    #[test]
    fn tokens_for_uses_the_latest_counts() {
        let settings = TokenSettings::default();
        let counts = LatestCounts {
            likes: 1500,
            views: 7500,
        };
        assert_eq!(settings.tokens_for(counts), 1500 + 150);
    }
}

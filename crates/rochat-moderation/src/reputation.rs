//! Domain reputation scoring.
//!
//! A pure function from URL to trust score. No I/O, never fails: input that
//! does not parse as a URL earns the neutral score rather than an error.

use url::Url;

use crate::rules::{self, DomainRules};

/// Trust score for a URL, always in `[0.0, 1.0]`.
///
/// `1.0` is fully trusted (whitelisted), `0.0` fully untrusted
/// (blacklisted), `0.5` the neutral default for unknown input.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ReputationScore(f32);

impl ReputationScore {
    /// Fully trusted.
    pub const TRUSTED: Self = Self(1.0);

    /// Fully untrusted.
    pub const UNTRUSTED: Self = Self(0.0);

    /// Neutral default.
    pub const NEUTRAL: Self = Self(0.5);

    /// Build a score, clamping into `[0.0, 1.0]`.
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Raw score value.
    pub fn value(self) -> f32 {
        self.0
    }

    /// Score clears the malicious-link threshold.
    pub fn is_trusted(self) -> bool {
        self.0 >= rochat_proto::constants::MALICIOUS_LINK_THRESHOLD
    }
}

/// Computes reputation scores against a fixed set of domain rules.
#[derive(Debug, Clone, Default)]
pub struct ReputationScorer {
    rules: DomainRules,
}

impl ReputationScorer {
    /// Create a scorer over the given rules.
    pub fn new(rules: DomainRules) -> Self {
        Self { rules }
    }

    /// The rules this scorer consults.
    pub fn rules(&self) -> &DomainRules {
        &self.rules
    }

    /// Score a URL.
    ///
    /// Whitelist and blacklist suffix matches short-circuit to the extremes.
    /// Otherwise the score starts neutral; a suspicious-pattern match takes
    /// the 0.3 penalty and forfeits the positive heuristics, while clean
    /// URLs collect a TLD bonus (0.2) and a host-length bonus (0.1, hosts
    /// longer than 10 characters as a proxy for domain maturity).
    pub fn score(&self, url: &str) -> ReputationScore {
        let Some(host) = host_of(url) else {
            return ReputationScore::NEUTRAL;
        };

        if self.rules.is_whitelisted(&host) {
            return ReputationScore::TRUSTED;
        }
        if self.rules.is_blacklisted(&host) {
            return ReputationScore::UNTRUSTED;
        }

        let mut score = 0.5;
        if rules::is_suspicious(url) {
            score -= 0.3;
        } else {
            if rules::has_recognized_tld(&host) {
                score += 0.2;
            }
            if host.len() > 10 {
                score += 0.1;
            }
        }

        ReputationScore::new(score)
    }
}

/// Host component of a URL, if it parses and has one.
pub(crate) fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> ReputationScorer {
        ReputationScorer::default()
    }

    #[test]
    fn whitelisted_domains_are_fully_trusted() {
        let s = scorer();
        assert_eq!(s.score("https://www.roblox.com/games"), ReputationScore::TRUSTED);
        assert_eq!(s.score("https://github.com/org/repo"), ReputationScore::TRUSTED);
    }

    #[test]
    fn blacklisted_domains_are_fully_untrusted() {
        let s = scorer();
        assert_eq!(s.score("http://malicious.com/x"), ReputationScore::UNTRUSTED);
        assert_eq!(s.score("http://login.phishing.net"), ReputationScore::UNTRUSTED);
    }

    #[test]
    fn unparsable_input_is_neutral() {
        let s = scorer();
        assert_eq!(s.score("not a url"), ReputationScore::NEUTRAL);
        assert_eq!(s.score(""), ReputationScore::NEUTRAL);
    }

    #[test]
    fn suspicious_pattern_forfeits_bonuses() {
        // 0.5 - 0.3 with no TLD or length bonus applied on top.
        let score = scorer().score("http://roblox-phishing.com");
        assert!(score.value() <= 0.2, "got {}", score.value());
    }

    #[test]
    fn clean_long_com_domain_clears_threshold() {
        // 0.5 + 0.2 (TLD) + 0.1 (length): exactly at the 0.8 threshold.
        let score = scorer().score("https://example.com/page");
        assert!((score.value() - 0.8).abs() < f32::EPSILON);
        assert!(score.is_trusted());
    }

    #[test]
    fn short_host_misses_length_bonus() {
        let score = scorer().score("https://ab.com");
        assert!((score.value() - 0.7).abs() < f32::EPSILON);
        assert!(!score.is_trusted());
    }

    #[test]
    fn score_constructor_clamps() {
        assert_eq!(ReputationScore::new(1.5).value(), 1.0);
        assert_eq!(ReputationScore::new(-0.5).value(), 0.0);
    }
}

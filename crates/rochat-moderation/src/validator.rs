//! Link safety verdicts.
//!
//! Wraps the reputation scorer with structural and pattern checks to produce
//! a single boolean: is this URL safe to show a user? Every check
//! short-circuits to unsafe.

use url::Url;

use crate::{
    reputation::{ReputationScore, ReputationScorer, host_of},
    rules::{self, DomainRules},
};

/// Canonical domain for the brand token; anything else mentioning the brand
/// is treated as phishing-like.
const BRAND_TOKEN: &str = "roblox";
const BRAND_DOMAIN: &str = "roblox.com";

/// Validator tuning knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorConfig {
    /// Also reject hosts with more than three dots. Off by default; turn on
    /// for stricter deployments.
    pub strict_subdomains: bool,
}

/// Boolean safety verdicts over URLs.
#[derive(Debug, Clone, Default)]
pub struct LinkValidator {
    scorer: ReputationScorer,
    config: ValidatorConfig,
}

impl LinkValidator {
    /// Create a validator over the given rules and config.
    pub fn new(rules: DomainRules, config: ValidatorConfig) -> Self {
        Self { scorer: ReputationScorer::new(rules), config }
    }

    /// URL has a scheme and a host.
    pub fn is_valid_url(&self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|u| u.host_str().is_some())
    }

    /// Composite safety verdict.
    ///
    /// Decision order, each failure short-circuiting to unsafe:
    /// syntactic validity, suspicious patterns, (optionally) excessive
    /// subdomains, phishing-likeness, blacklist, reputation threshold.
    pub fn is_safe(&self, url: &str) -> bool {
        if !self.is_valid_url(url) {
            return false;
        }
        if rules::is_suspicious(url) {
            return false;
        }

        let Some(host) = host_of(url) else {
            return false;
        };
        if self.config.strict_subdomains && has_excessive_subdomains(&host) {
            return false;
        }
        if is_phishing_like(url) {
            return false;
        }
        if self.scorer.rules().is_blacklisted(&host) {
            return false;
        }

        self.scorer.score(url).is_trusted()
    }

    /// Domain suffix-matches the whitelist. Diagnostic query, not part of
    /// the `is_safe` chain (the scorer already short-circuits on it).
    pub fn is_domain_whitelisted(&self, domain: &str) -> bool {
        self.scorer.rules().is_whitelisted(domain)
    }

    /// Domain suffix-matches the blacklist.
    pub fn is_domain_blacklisted(&self, domain: &str) -> bool {
        self.scorer.rules().is_blacklisted(domain)
    }

    /// Reputation score for a URL.
    pub fn reputation(&self, url: &str) -> ReputationScore {
        self.scorer.score(url)
    }

    /// Host portion of a URL, if any.
    pub fn extract_domain(&self, url: &str) -> Option<String> {
        host_of(url)
    }
}

/// URL mentions the brand token but is not hosted on the canonical domain.
/// Flagged anywhere in the URL, path included.
fn is_phishing_like(url: &str) -> bool {
    let lowered = url.to_ascii_lowercase();
    lowered.contains(BRAND_TOKEN) && !lowered.contains(BRAND_DOMAIN)
}

/// More than three dots in the host.
fn has_excessive_subdomains(host: &str) -> bool {
    host.matches('.').count() > 3
}

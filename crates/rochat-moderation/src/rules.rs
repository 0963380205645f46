//! Static domain rules shared by the scorer and validator.

use std::sync::LazyLock;

use regex::Regex;

/// Substrings whose presence anywhere in a URL marks it suspicious:
/// URL shorteners that can hide the real destination, and the brand token
/// adjacent to a hyphen (typosquats like `roblox-login.example`).
const SUSPICIOUS_PATTERNS: &[&str] = &["bit.ly", "tinyurl", "url.shortener", "roblox-", "-roblox"];

/// TLDs that earn a small trust bonus.
const RECOGNIZED_TLDS: &[&str] =
    &[".com", ".org", ".net", ".edu", ".gov", ".io", ".co", ".tv", ".info", ".app", ".dev"];

/// IPv4 literal in place of a domain name.
static IPV4_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // static pattern, exercised by tests
    let re = Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").unwrap();
    re
});

/// Domain whitelist and blacklist with case-insensitive suffix matching.
///
/// A host matches an entry when it ends with that entry, so `scam.org`
/// covers `login.scam.org` as well.
#[derive(Debug, Clone)]
pub struct DomainRules {
    whitelist: Vec<String>,
    blacklist: Vec<String>,
}

impl DomainRules {
    /// Build rules from explicit lists. Entries are normalized to lowercase.
    pub fn new(
        whitelist: impl IntoIterator<Item = String>,
        blacklist: impl IntoIterator<Item = String>,
    ) -> Self {
        let normalize =
            |items: Vec<String>| items.into_iter().map(|d| d.to_ascii_lowercase()).collect();
        Self {
            whitelist: normalize(whitelist.into_iter().collect()),
            blacklist: normalize(blacklist.into_iter().collect()),
        }
    }

    /// Host suffix-matches a whitelist entry.
    pub fn is_whitelisted(&self, host: &str) -> bool {
        suffix_match(&self.whitelist, host)
    }

    /// Host suffix-matches a blacklist entry.
    pub fn is_blacklisted(&self, host: &str) -> bool {
        suffix_match(&self.blacklist, host)
    }
}

impl Default for DomainRules {
    /// Built-in rules: the domains the client trusts out of the box and a
    /// seed blacklist of known-bad domains.
    fn default() -> Self {
        Self::new(
            ["roblox.com", "discord.com", "youtube.com", "twitch.tv", "github.com"]
                .map(String::from),
            ["malicious.com", "phishing.net", "scam.org", "suspicious.net"].map(String::from),
        )
    }
}

fn suffix_match(patterns: &[String], host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    patterns.iter().any(|p| host.ends_with(p.as_str()))
}

/// URL matches a suspicious-pattern rule: a shortener domain, a brand-hyphen
/// typosquat, or an IPv4 literal.
pub(crate) fn is_suspicious(url: &str) -> bool {
    let lowered = url.to_ascii_lowercase();
    SUSPICIOUS_PATTERNS.iter().any(|p| lowered.contains(p)) || IPV4_LITERAL.is_match(url)
}

/// Host ends in one of the recognized TLDs.
pub(crate) fn has_recognized_tld(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    RECOGNIZED_TLDS.iter().any(|tld| host.ends_with(tld))
}

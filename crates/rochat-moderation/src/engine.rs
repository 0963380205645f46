//! Moderation engine: link extraction, blacklist management, and content
//! filtering.
//!
//! The engine keeps its own pattern blacklist next to the validator's domain
//! rules. A URL is malicious when either judgment says so; the local
//! blacklist can flag content the composite validator would let through.
//!
//! The blacklist is an immutable snapshot behind a lock: reload builds the
//! replacement list fully, then swaps it in, so concurrent readers never
//! observe a partial update. Reload failure keeps the previous snapshot
//! (stale-but-available).

use std::{
    io::{self, BufRead, BufReader},
    path::Path,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    image,
    reputation::ReputationScore,
    validator::LinkValidator,
};

/// Replacement text for a redacted link.
pub const REDACTED_LINK: &str = "[REMOVED - MALICIOUS LINK]";

/// HTTP(S) URL token: scheme followed by a non-whitespace run.
static LINK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // static pattern, exercised by tests
    let re = Regex::new(r"https?://\S+").unwrap();
    re
});

/// Default pattern blacklist applied before any file is loaded.
const SEED_BLACKLIST: &[&str] = &["malicious.com", "phishing.net", "scam.org"];

/// Content moderation over free text.
#[derive(Debug)]
pub struct ModerationEngine {
    validator: LinkValidator,
    blacklist: RwLock<Arc<Vec<String>>>,
}

impl ModerationEngine {
    /// Create an engine around the given validator, seeded with the built-in
    /// blacklist patterns.
    pub fn new(validator: LinkValidator) -> Self {
        let seed = SEED_BLACKLIST.iter().map(|p| p.to_ascii_lowercase()).collect();
        Self { validator, blacklist: RwLock::new(Arc::new(seed)) }
    }

    /// The validator this engine consults.
    pub fn validator(&self) -> &LinkValidator {
        &self.validator
    }

    /// Replace the blacklist with patterns read from a text source: one
    /// pattern per line, blank lines and `#` comments skipped.
    ///
    /// # Errors
    ///
    /// An I/O error mid-read leaves the previous blacklist untouched.
    pub fn load_blacklist(&self, reader: impl BufRead) -> io::Result<usize> {
        let patterns = parse_blacklist(reader)?;
        let count = patterns.len();
        self.swap_blacklist(patterns);
        info!(entries = count, "blacklist loaded");
        Ok(count)
    }

    /// Load the blacklist from a file, keeping the previous list if the
    /// file cannot be opened or read. Never fatal.
    pub fn load_blacklist_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match std::fs::File::open(path) {
            Ok(file) => {
                if let Err(e) = self.load_blacklist(BufReader::new(file)) {
                    warn!(path = %path.display(), error = %e, "blacklist read failed, keeping previous list");
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not open blacklist file, keeping previous list");
            },
        }
    }

    /// Re-fetch the blacklist from its upstream source.
    ///
    /// Stub contract: the upstream refresh protocol (source, cadence, retry)
    /// is unspecified, so this only records the intent.
    pub fn refresh_blacklist(&self) {
        debug!("blacklist refresh requested; no upstream source configured");
    }

    /// Number of patterns currently loaded.
    pub fn blacklist_len(&self) -> usize {
        self.blacklist_snapshot().len()
    }

    /// All HTTP(S) links in `text`, left to right, duplicates preserved.
    pub fn extract_links(&self, text: &str) -> Vec<String> {
        LINK_TOKEN.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }

    /// Redact every malicious link in `text`.
    ///
    /// Replacement is substring-based: if the same link text occurs more
    /// than once, every occurrence is redacted. Idempotent, since the
    /// marker contains no link token.
    pub fn filter_content(&self, text: &str) -> String {
        let mut filtered = text.to_string();
        for link in self.extract_links(text) {
            if self.is_malicious_link(&link) {
                filtered = filtered.replace(&link, REDACTED_LINK);
            }
        }
        filtered
    }

    /// URL is malicious: it contains a local blacklist pattern
    /// (case-insensitive substring), or its trust score falls below the
    /// malicious-link threshold. Two independent judgments, OR-ed.
    pub fn is_malicious_link(&self, url: &str) -> bool {
        let lowered = url.to_ascii_lowercase();
        if self.blacklist_snapshot().iter().any(|p| lowered.contains(p.as_str())) {
            warn!(%url, "malicious link detected by blacklist");
            return true;
        }

        !self.link_trust_score(url).is_trusted()
    }

    /// URL passes moderation.
    pub fn validate_link(&self, url: &str) -> bool {
        !self.is_malicious_link(url)
    }

    /// Trust score for a URL, delegated to the validator's scorer.
    pub fn link_trust_score(&self, url: &str) -> ReputationScore {
        self.validator.reputation(url)
    }

    /// Byte stream looks like a supported image format.
    pub fn validate_image(&self, bytes: &[u8]) -> bool {
        image::is_supported_image(bytes)
    }

    fn blacklist_snapshot(&self) -> Arc<Vec<String>> {
        Arc::clone(&self.blacklist.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn swap_blacklist(&self, patterns: Vec<String>) {
        *self.blacklist.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(patterns);
    }
}

impl Default for ModerationEngine {
    fn default() -> Self {
        Self::new(LinkValidator::default())
    }
}

/// Parse newline-delimited patterns, skipping blanks and `#` comments.
/// Patterns are normalized to lowercase for case-insensitive matching.
fn parse_blacklist(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut patterns = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        patterns.push(trimmed.to_ascii_lowercase());
    }
    Ok(patterns)
}

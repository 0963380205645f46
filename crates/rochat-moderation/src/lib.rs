//! Content moderation for RoChat
//!
//! Inspects chat text for unsafe links and decides, via a reputation score,
//! whether content may reach a user. Layered leaf-first:
//!
//! - [`ReputationScorer`]: pure trust score for a URL from static rules
//! - [`LinkValidator`]: wraps the scorer with blacklist/whitelist/pattern
//!   checks into a boolean safety verdict
//! - [`ModerationEngine`]: link extraction, blacklist loading, and content
//!   redaction on top of the validator
//!
//! The engine and validator keep two deliberately independent notions of
//! "malicious": the engine may flag a URL on its local blacklist alone even
//! when the validator's composite check would pass. The overlap is a
//! defense-in-depth OR, not duplication to be merged.
//!
//! Everything here is deterministic and I/O-free apart from blacklist
//! loading; readers may call in concurrently from any thread.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod engine;
mod image;
mod reputation;
mod rules;
mod validator;

pub use engine::{ModerationEngine, REDACTED_LINK};
pub use image::{is_supported_image, sniff_image_format};
pub use reputation::{ReputationScore, ReputationScorer};
pub use rules::DomainRules;
pub use validator::{LinkValidator, ValidatorConfig};

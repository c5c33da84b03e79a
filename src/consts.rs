/// Fallback label when an entry carries no model name
pub(crate) const UNKNOWN_MODEL: &str = "unknown";

/// Characters of the session id shown when no working directory is known
pub(crate) const SESSION_SUFFIX_LEN: usize = 8;

/// Token count above which tiered rates apply
pub(crate) const TIER_THRESHOLD_TOKENS: u64 = 200_000;

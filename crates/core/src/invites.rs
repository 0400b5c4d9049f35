//! Invite token generation, hashing, and expiry rules.
//!
//! Managers invite employees by sharing a single-use token. Only the
//! SHA-256 hash is stored; the plaintext appears once in the create
//! response and is never retrievable again. A short prefix is kept for
//! display so a manager can tell pending invites apart.

use rand::Rng;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the generated invite token (alphanumeric characters).
pub const TOKEN_LENGTH: usize = 48;

/// Number of leading characters stored as a human-visible prefix.
pub const TOKEN_PREFIX_LENGTH: usize = 8;

/// Days until an unaccepted invite expires.
pub const INVITE_EXPIRY_DAYS: i64 = 14;

// ---------------------------------------------------------------------------
// Token generation
// ---------------------------------------------------------------------------

/// The result of generating a new invite token.
pub struct GeneratedInviteToken {
    /// The plaintext token (shown to the manager exactly once, never stored).
    pub plaintext: String,
    /// The first [`TOKEN_PREFIX_LENGTH`] characters of the token for display.
    pub prefix: String,
    /// The SHA-256 hex digest of the plaintext token (stored in the database).
    pub hash: String,
}

/// Generate a new random invite token.
///
/// Returns the plaintext (shown once), prefix (for identification), and
/// SHA-256 hash (for storage). The plaintext must never be persisted.
pub fn generate_invite_token() -> GeneratedInviteToken {
    let token: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();

    let prefix = token[..TOKEN_PREFIX_LENGTH].to_string();
    let hash = hash_invite_token(&token);

    GeneratedInviteToken {
        plaintext: token,
        prefix,
        hash,
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Compute the SHA-256 hex digest of an invite token.
///
/// Used both during invite creation (to store the hash) and during
/// acceptance (to look up the invite by hash).
pub fn hash_invite_token(token: &str) -> String {
    crate::hashing::sha256_hex(token.as_bytes())
}

/// Extract the prefix from a plaintext invite token.
pub fn extract_prefix(token: &str) -> &str {
    &token[..TOKEN_PREFIX_LENGTH.min(token.len())]
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

/// The expiry instant for an invite created at `created_at`.
pub fn default_expires_at(created_at: Timestamp) -> Timestamp {
    created_at + chrono::TimeDelta::days(INVITE_EXPIRY_DAYS)
}

/// Whether an invite has expired as of `now`. Expiry is inclusive: an
/// invite presented exactly at its expiry instant is rejected.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now >= expires_at
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

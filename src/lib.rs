//! # Foodshare (food donation & sharing API)
//!
//! `foodshare` is the REST backend of a food-sharing web application. Donators
//! publish food listings, other users request them, and both sides manage their
//! own listings.
//!
//! ## Listings
//!
//! All data lives in a single flat `foods` collection. A listing's `status`
//! (`available`, `requested`, `cancelled`, `completed`) decides whether it is
//! shown in the public "available foods" view. Donator email scopes
//! "manage my foods"; requester email scopes "my requested foods".
//!
//! ## Authentication
//!
//! `POST /jwt` signs a short-lived HS256 token for the submitted identity and
//! returns it in an `HttpOnly` cookie named `token`. Only the email-scoped
//! listing views require it, and they additionally check that the token's
//! email matches the email in the path.
//!
//! ## Storage
//!
//! Handlers talk to a [`foods::FoodStore`]. Production uses PostgreSQL via a
//! `sqlx` pool; the in-memory store backs tests and database-less local runs.

pub mod api;
pub mod cli;
pub mod foods;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}

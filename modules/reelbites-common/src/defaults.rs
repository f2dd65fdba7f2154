//! Default policy table.
//!
//! Every non-fatal degradation in the pipeline falls back to one of these
//! named values. Keeping them in one module (instead of scattered per call
//! site) makes the fallback behavior auditable:
//!
//! | field            | default                        | applied when                 |
//! |------------------|--------------------------------|------------------------------|
//! | caption          | [`NO_CAPTION`]                 | resolver yields no caption   |
//! | comment digest   | [`NO_COMMENTS`]                | comment fetch failed/empty   |
//! | reviewer         | [`TIKTOK_REVIEWER`] / [`GENERIC_REVIEWER`] | author missing   |
//! | coordinate       | [`FALLBACK_COORD`]             | zero geocode candidates      |
//! | thumbnail        | [`FALLBACK_THUMBNAIL`]         | thumbnail heuristics fail    |
//! | website          | empty string                   | place details absent/failed  |

use crate::types::GeoPoint;

pub const NO_CAPTION: &str = "No caption found";
pub const NO_COMMENTS: &str = "No comments available";

pub const TIKTOK_REVIEWER: &str = "TikTok Creator";
pub const GENERIC_REVIEWER: &str = "Social Creator";

/// Tel Aviv city center, used when geocoding returns no candidates.
pub const FALLBACK_COORD: GeoPoint = GeoPoint {
    lat: 32.0853,
    lng: 34.7818,
};

/// Stock food photo shown when no platform thumbnail can be derived.
pub const FALLBACK_THUMBNAIL: &str =
    "https://images.unsplash.com/photo-1504674900247-0877df9cc836?w=800";

/// At most this many comments feed the extraction prompt.
pub const COMMENT_DIGEST_LIMIT: usize = 20;

/// Separator between comments in the digest.
pub const COMMENT_SEPARATOR: &str = " | ";

/// Prefix length of `full_description` used for a single-review local summary.
pub const INITIAL_DESCRIPTION_CHARS: usize = 50;

/// Number of highlights promoted to decision chips for a single-review record.
pub const INITIAL_CHIP_COUNT: usize = 3;

/// Build the comment digest for prompts: first [`COMMENT_DIGEST_LIMIT`]
/// comments joined with [`COMMENT_SEPARATOR`], or [`NO_COMMENTS`].
pub fn comment_digest(comments: &[String]) -> String {
    if comments.is_empty() {
        return NO_COMMENTS.to_string();
    }
    comments
        .iter()
        .take(COMMENT_DIGEST_LIMIT)
        .cloned()
        .collect::<Vec<_>>()
        .join(COMMENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_comments_use_sentinel() {
        assert_eq!(comment_digest(&[]), NO_COMMENTS);
    }

    #[test]
    fn digest_caps_at_twenty_comments() {
        let comments: Vec<String> = (0..30).map(|i| format!("c{i}")).collect();
        let digest = comment_digest(&comments);
        assert_eq!(digest.matches(COMMENT_SEPARATOR).count(), 19);
        assert!(digest.starts_with("c0 | c1"));
        assert!(!digest.contains("c20"));
    }
}

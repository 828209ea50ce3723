//! Decoding of Reddit's public listing JSON.
//!
//! Only the fields a feed renders are kept. Children that are not links
//! (kind other than "t3") are skipped.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default, rename = "over_18")]
    pub nsfw: bool,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub is_self: bool,
}

impl Post {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        if !self.created_utc.is_finite() || self.created_utc < 0.0 {
            return None;
        }
        DateTime::from_timestamp(self.created_utc as i64, 0)
    }

    /// Compact age relative to `now`, e.g. "5m", "3h", "2d".
    pub fn age(&self, now: DateTime<Utc>) -> String {
        let Some(created) = self.created() else {
            return String::new();
        };
        let secs = (now - created).num_seconds().max(0);
        match secs {
            s if s < 60 => format!("{s}s"),
            s if s < 3_600 => format!("{}m", s / 60),
            s if s < 86_400 => format!("{}h", s / 3_600),
            s if s < 31_536_000 => format!("{}d", s / 86_400),
            s => format!("{}y", s / 31_536_000),
        }
    }
}

/// One page of posts plus the cursor for the next page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub posts: Vec<Post>,
    pub after: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    data: EnvelopeData,
}

#[derive(Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    children: Vec<Child>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Deserialize)]
struct Child {
    kind: String,
    data: serde_json::Value,
}

/// Decode a listing body. Malformed individual posts are skipped and logged.
pub fn parse_listing(body: &[u8]) -> Result<Listing, serde_json::Error> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    let mut skipped = 0usize;
    let posts = envelope
        .data
        .children
        .into_iter()
        .filter(|child| child.kind == "t3")
        .filter_map(|child| match serde_json::from_value::<Post>(child.data) {
            Ok(post) => Some(post),
            Err(e) => {
                skipped += 1;
                tracing::debug!(error = %e, "Skipping malformed post");
                None
            }
        })
        .collect();
    if skipped > 0 {
        tracing::warn!(skipped, "Listing contained malformed posts");
    }
    Ok(Listing {
        posts,
        after: envelope.data.after.filter(|a| !a.is_empty()),
    })
}

// ============================================================================
// Tests
// ============================================================================

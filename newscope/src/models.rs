//! Domain types shared between the persistence layer, the resolver and the HTTP API.
//!
//! These are plain data carriers; the SQL lives in `db::*`. Enums round-trip through
//! sqlite as their lower-case string representation (`FromStr`/`Display`) since sqlite
//! has no native enum type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let s = match self {
                    $(Self::$variant => $s),+
                };
                write!(f, "{}", s)
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant),)+
                    other => Err(anyhow::anyhow!("unknown {} value: {}", stringify!($name), other)),
                }
            }
        }
    };
}

string_enum!(MediaType { None => "none", Photo => "photo", Video => "video", Document => "document" });
string_enum!(Tone { Positive => "positive", Negative => "negative", Neutral => "neutral", Anxious => "anxious" });
string_enum!(ModerationStatus { Pending => "pending", Approved => "approved", Rejected => "rejected" });
string_enum!(SourceType { Manual => "manual", Rss => "rss", Telegram => "telegram", Twitter => "twitter", Website => "website" });
string_enum!(BlockType { Tag => "tag", Source => "source", Language => "language", Category => "category" });
string_enum!(ReactionKind { Like => "like", Dislike => "dislike" });
string_enum!(InteractionAction { View => "view", Like => "like", Dislike => "dislike", Save => "save", Skip => "skip", ReadFull => "read_full", Report => "report" });
string_enum!(ViewMode { Manual => "manual", Auto => "auto" });
string_enum!(Frequency { Hourly => "hourly", Daily => "daily" });
string_enum!(SourceStatus { Active => "active", Blocked => "blocked" });
string_enum!(FilterKind { Tags => "tags", Sources => "sources", Languages => "languages", Countries => "countries", ContentTypes => "content_types" });

/// A registered chat-bot user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub external_id: String,
    pub language: Option<String>,
    pub country: Option<String>,
    pub safe_mode: bool,
    pub view_mode: ViewMode,
    pub is_premium: bool,
    pub premium_expires_at: Option<DateTime<Utc>>,
    pub auto_notifications: bool,
    pub email: Option<String>,
    pub current_feed_id: Option<i64>,
    pub inviter_id: Option<i64>,
    pub level: i64,
    pub badges: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Premium expiry is advisory: a stale flag with a past expiry reads as not-premium.
    pub fn effective_is_premium(&self, now: DateTime<Utc>) -> bool {
        self.is_premium
            && self
                .premium_expires_at
                .map(|exp| now < exp)
                .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub lang: String,
    pub country: Option<String>,
    pub tags: Vec<String>,
    pub ai_classified_topics: Vec<String>,
    pub source: String,
    pub link: Option<String>,
    pub media_type: MediaType,
    pub file_id: Option<String>,
    pub published_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub tone: Option<Tone>,
    pub sentiment_score: Option<f64>,
    pub is_fake: Option<bool>,
    pub is_duplicate: bool,
    pub moderation_status: ModerationStatus,
    pub source_type: SourceType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Filter {
    pub tag: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub content_type: Option<String>,
}

/// One inclusion clause of a custom feed: "any of these values for this kind".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedFilterClause {
    pub kind: FilterKind,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFeed {
    pub id: i64,
    pub user_id: i64,
    pub feed_name: String,
    pub filters: Vec<FeedFilterClause>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: i64,
    pub user_id: i64,
    pub block_type: BlockType,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: i64,
    pub active: bool,
    pub frequency: Frequency,
    pub last_dispatched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub user_id: i64,
    pub news_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub user_id: i64,
    pub parent_comment_id: Option<i64>,
    pub content: String,
    pub moderation_status: ModerationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: i64,
    pub viewed: i64,
    pub saved: i64,
    pub reported: i64,
    pub read_full_count: i64,
    pub skipped_count: i64,
    pub liked_count: i64,
    pub disliked_count: i64,
    pub comments_count: i64,
    pub sources_added_count: i64,
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub source_type: SourceType,
    pub added_by_user: Option<i64>,
    pub verified: bool,
    pub reliability_score: Option<f64>,
    pub status: SourceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    pub id: i64,
    pub inviter_user_id: i64,
    pub invite_code: String,
    pub invited_user_id: Option<i64>,
    pub accepted_at: Option<DateTime<Utc>>,
}

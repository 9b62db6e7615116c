use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Comment, Identified, Post, Subreddit};

/// Posts, comments and subreddits in one ordered collection, such as a profile timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MixedMedia {
    Post {
        post: Post,
        date: Option<DateTime<Utc>>,
    },
    Comment {
        comment: Comment,
        date: Option<DateTime<Utc>>,
    },
    Subreddit {
        subreddit: Subreddit,
    },
}

impl MixedMedia {
    /// Wrap a post, taking its date from the post's creation time.
    pub fn from_post(post: Post) -> Self {
        let date = post.created.as_deref().and_then(parse_date);
        MixedMedia::Post { post, date }
    }

    /// Wrap a comment, taking its date from the comment's time string.
    pub fn from_comment(comment: Comment) -> Self {
        let date = parse_date(&comment.time);
        MixedMedia::Comment { comment, date }
    }

    pub fn from_subreddit(subreddit: Subreddit) -> Self {
        MixedMedia::Subreddit { subreddit }
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        match self {
            MixedMedia::Post { date, .. } | MixedMedia::Comment { date, .. } => *date,
            MixedMedia::Subreddit { .. } => None,
        }
    }

    pub fn as_post(&self) -> Option<&Post> {
        match self {
            MixedMedia::Post { post, .. } => Some(post),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            MixedMedia::Comment { comment, .. } => Some(comment),
            _ => None,
        }
    }
}

impl Identified for MixedMedia {
    fn id(&self) -> &str {
        match self {
            MixedMedia::Post { post, .. } => post.id(),
            MixedMedia::Comment { comment, .. } => comment.id(),
            MixedMedia::Subreddit { subreddit } => subreddit.id(),
        }
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Sort newest first. Undated entries keep their relative order behind dated ones.
pub fn sort_newest_first(items: &mut [MixedMedia]) {
    items.sort_by(|a, b| match (a.date(), b.date()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Encode entities for the storage collaborator.
pub fn to_json(items: &[MixedMedia]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

pub fn from_json(encoded: &str) -> Result<Vec<MixedMedia>, serde_json::Error> {
    serde_json::from_str(encoded)
}

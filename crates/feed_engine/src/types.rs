use std::fmt;

use feed_core::{MixedMedia, Page, Post, Subreddit};

use crate::comments::CommentsPage;
use crate::query::{ProfileFilter, SearchQuery, SubredditQuery};

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

/// Page-level failure. Any of these aborts the whole fetch+parse call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The locator could not be turned into a request URL.
    InvalidUrl,
    /// Network or OS level failure; the message carries the underlying cause.
    Transport,
    /// The server answered with a non-success status.
    HttpStatus(u16),
    /// Successful transport with an empty body.
    NoData,
    /// The body is not decodable text.
    DecodeFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Transport => write!(f, "transport failure"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::NoData => write!(f, "no data"),
            FailureKind::DecodeFailure => write!(f, "decode failure"),
        }
    }
}

/// A unit of work for [`crate::EngineHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedRequest {
    Subreddit {
        query: SubredditQuery,
        after: Option<String>,
    },
    SearchPosts {
        query: SearchQuery,
        after: Option<String>,
    },
    SearchSubreddits {
        query: SearchQuery,
    },
    Profile {
        username: String,
        filter: ProfileFilter,
        after: Option<String>,
    },
    Comments {
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedResponse {
    Posts(Page<Post>),
    Subreddits(Vec<Subreddit>),
    Mixed(Page<MixedMedia>),
    Comments(CommentsPage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Completed {
        request_id: RequestId,
        result: Result<FeedResponse, FetchError>,
    },
    Cancelled {
        request_id: RequestId,
    },
    /// Outcome of a tracking list refresh: entry count or a readable error.
    TrackingListUpdated(Result<usize, String>),
}

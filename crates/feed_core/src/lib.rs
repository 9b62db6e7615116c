//! Feed core: plain entity types and pure helpers shared by the engine and its callers.
mod accumulate;
mod comment;
mod media;
mod post;
mod subreddit;

pub use accumulate::{FeedAccumulator, Page};
pub use comment::Comment;
pub use media::{from_json, sort_newest_first, to_json, MixedMedia};
pub use post::{determine_post_type, Post, PostType, PrivateUrl};
pub use subreddit::Subreddit;

/// Entities that carry a stable identity within one listing or comment page.
pub trait Identified {
    fn id(&self) -> &str;
}

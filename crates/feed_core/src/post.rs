use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Identified;

/// A link as found on the page plus the address the reader should actually be sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrivateUrl {
    #[serde(rename = "originalURL")]
    pub original_url: String,
    #[serde(rename = "privateURL")]
    pub private_url: String,
}

impl PrivateUrl {
    /// Both fields set to the same address.
    pub fn unchanged(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            original_url: url.clone(),
            private_url: url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Text,
    Image,
    Gif,
    Gallery,
    Video,
    Article,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Text => "text",
            PostType::Image => "image",
            PostType::Gif => "gif",
            PostType::Gallery => "gallery",
            PostType::Video => "video",
            PostType::Article => "article",
        }
    }

    /// Whether listing thumbnails are worth extracting for this kind of post.
    pub fn has_thumbnail(&self) -> bool {
        matches!(self, PostType::Gallery | PostType::Video | PostType::Article)
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp"];
const GIF_EXTENSIONS: &[&str] = &[".gif", ".gifv"];
const GALLERY_MARKER: &str = "reddit.com/gallery/";
const VIDEO_HOST_MARKERS: &[&str] = &["v.redd.it", "youtube.com", "youtu.be", "streamable.com"];

/// Classify a post by its media URL.
///
/// Rules are checked top to bottom on the lowercased URL and the first hit wins,
/// so a gallery URL ending in `.jpg` is still a gallery.
pub fn determine_post_type(media_url: &str) -> PostType {
    let url = media_url.to_lowercase();

    if url.contains("/r/") && url.contains("/comments/") {
        PostType::Text
    } else if url.contains(GALLERY_MARKER) {
        PostType::Gallery
    } else if IMAGE_EXTENSIONS.iter().any(|ext| url.ends_with(ext)) {
        PostType::Image
    } else if GIF_EXTENSIONS.iter().any(|ext| url.ends_with(ext)) {
        PostType::Gif
    } else if VIDEO_HOST_MARKERS.iter().any(|host| url.contains(host)) || url.ends_with(".mp4") {
        PostType::Video
    } else {
        PostType::Article
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    /// Link flair, when the post has one.
    pub tag: Option<String>,
    pub author: String,
    /// Site-supplied vote count; may be a placeholder such as `•`.
    pub votes: String,
    /// ISO8601 creation time. Search results do not always carry one.
    pub created: Option<String>,
    pub media: PrivateUrl,
    pub comments_url: String,
    pub comment_count: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub thumbnail: Option<String>,
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

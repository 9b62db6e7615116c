//! Feed engine: fetching, scraping and link rewriting for listing and comment pages.
mod comments;
mod decode;
mod dom;
mod driver;
mod engine;
mod fetch;
mod filter;
mod listing;
mod markdown;
mod persist;
mod privacy;
mod query;
mod rewrite;
mod settings;
mod tracking;
mod types;

pub use comments::{parse_comments, CommentsPage, SCORE_HIDDEN};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use dom::ScrapeContext;
pub use driver::FeedClient;
pub use engine::EngineHandle;
pub use fetch::{fetch_html, FetchSettings, Fetcher, ReqwestFetcher};
pub use filter::ContentFilter;
pub use listing::{parse_listing, parse_profile, parse_search_posts, parse_search_subreddits};
pub use markdown::{
    convert_element, html_to_markdown, AnchorRewrite, KeepLinks, MarkdownConverter, MarkdownError,
};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use privacy::{
    rewrite_to_private, LinkTransformer, IMGUR_MIRROR_HOST, INVIDIOUS_HOST, NITTER_HOST,
    SCRIBE_HOST,
};
pub use query::{
    profile_url, search_url, subreddit_url, ProfileFilter, SearchKind, SearchQuery, SearchSort,
    SubredditQuery, SubredditSort, TimeRange,
};
pub use rewrite::InternalLinkRewriter;
pub use settings::{
    FeedSettings, SettingsError, DEFAULT_APP_SCHEME, DEFAULT_BASE_URL, DEFAULT_TRACKING_LIST_URL,
};
pub use tracking::{
    parse_tracking_list, TrackingListConfig, TrackingListError, TrackingParamRemover,
    TrackingParams, TrackingStatus,
};
pub use types::{
    EngineEvent, FailureKind, FeedRequest, FeedResponse, FetchError, FetchMetadata, FetchOutput,
    RequestId,
};

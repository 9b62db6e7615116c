use std::sync::Arc;

use feed_core::{sort_newest_first, MixedMedia, Page, Post, Subreddit};
use feed_logging::feed_debug;
use url::Url;

use crate::comments::{parse_comments, CommentsPage};
use crate::dom::ScrapeContext;
use crate::fetch::{fetch_html, Fetcher, ReqwestFetcher};
use crate::listing::{parse_listing, parse_profile, parse_search_posts, parse_search_subreddits};
use crate::privacy::LinkTransformer;
use crate::query::{
    profile_url, search_url, subreddit_url, ProfileFilter, SearchKind, SearchQuery, SubredditQuery,
};
use crate::settings::FeedSettings;
use crate::tracking::{TrackingParamRemover, TrackingParams};
use crate::{FailureKind, FeedRequest, FeedResponse, FetchError};

/// Fetch-and-parse entry points. Holds no per-feed state; cursors travel with the caller.
#[derive(Clone)]
pub struct FeedClient {
    fetcher: Arc<dyn Fetcher>,
    ctx: ScrapeContext,
    settings: FeedSettings,
}

impl FeedClient {
    pub fn new(
        settings: FeedSettings,
        fetcher: Arc<dyn Fetcher>,
        transformer: LinkTransformer,
    ) -> Result<Self, FetchError> {
        let ctx = ScrapeContext::from_settings(&settings, transformer)?;
        Ok(Self {
            fetcher,
            ctx,
            settings,
        })
    }

    /// The usual wiring: a reqwest fetcher and a transformer backed by the shared tracking list.
    pub fn from_settings(
        settings: FeedSettings,
        tracking: Arc<TrackingParams>,
    ) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(settings.fetch_settings()));
        let remover = TrackingParamRemover::new(tracking, settings.remove_tracking_params);
        let transformer = LinkTransformer::new(settings.redirect_to_private_sites, Some(remover));
        Self::new(settings, fetcher, transformer)
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    pub fn context(&self) -> &ScrapeContext {
        &self.ctx
    }

    pub async fn subreddit(
        &self,
        query: &SubredditQuery,
        after: Option<&str>,
    ) -> Result<Page<Post>, FetchError> {
        let url = subreddit_url(&self.ctx.base_url, query, self.settings.page_limit, after)?;
        let html = self.get(&url).await?;
        Ok(Page::new(parse_listing(&html, &self.ctx)))
    }

    pub async fn search_posts(
        &self,
        query: &SearchQuery,
        after: Option<&str>,
    ) -> Result<Page<Post>, FetchError> {
        let url = search_url(
            &self.ctx.base_url,
            query,
            SearchKind::Posts,
            self.settings.include_over_18,
            after,
        )?;
        let html = self.get(&url).await?;
        Ok(Page::new(parse_search_posts(&html, &self.ctx)))
    }

    pub async fn search_subreddits(&self, query: &SearchQuery) -> Result<Vec<Subreddit>, FetchError> {
        let url = search_url(
            &self.ctx.base_url,
            query,
            SearchKind::Subreddits,
            self.settings.include_over_18,
            None,
        )?;
        let html = self.get(&url).await?;
        Ok(parse_search_subreddits(&html))
    }

    /// A profile page, newest first. The cursor still refers to the last entry in page order.
    pub async fn profile(
        &self,
        username: &str,
        filter: ProfileFilter,
        after: Option<&str>,
    ) -> Result<Page<MixedMedia>, FetchError> {
        let url = profile_url(&self.ctx.base_url, username, filter, after)?;
        let html = self.get(&url).await?;
        let mut page = Page::new(parse_profile(&html, &self.ctx));
        sort_newest_first(&mut page.items);
        Ok(page)
    }

    /// A post's comments page; relative locators resolve against the base URL.
    pub async fn comments(&self, comments_url: &str) -> Result<CommentsPage, FetchError> {
        let locator = comments_url.trim();
        if locator.is_empty() {
            return Err(FetchError::new(FailureKind::InvalidUrl, "empty comments url"));
        }
        let url = self
            .ctx
            .base_url
            .join(locator)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let html = self.get(&url).await?;
        Ok(parse_comments(&html, &self.ctx))
    }

    pub async fn execute(&self, request: FeedRequest) -> Result<FeedResponse, FetchError> {
        match request {
            FeedRequest::Subreddit { query, after } => self
                .subreddit(&query, after.as_deref())
                .await
                .map(FeedResponse::Posts),
            FeedRequest::SearchPosts { query, after } => self
                .search_posts(&query, after.as_deref())
                .await
                .map(FeedResponse::Posts),
            FeedRequest::SearchSubreddits { query } => self
                .search_subreddits(&query)
                .await
                .map(FeedResponse::Subreddits),
            FeedRequest::Profile {
                username,
                filter,
                after,
            } => self
                .profile(&username, filter, after.as_deref())
                .await
                .map(FeedResponse::Mixed),
            FeedRequest::Comments { url } => {
                self.comments(&url).await.map(FeedResponse::Comments)
            }
        }
    }

    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        let html = fetch_html(self.fetcher.as_ref(), url.as_str()).await?;
        feed_debug!("{} returned {} bytes of html", url, html.len());
        Ok(html)
    }
}

use url::Url;

use crate::{FailureKind, FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubredditSort {
    Hot,
    New,
    Rising,
    Top,
    Controversial,
}

impl SubredditSort {
    pub fn as_path(&self) -> &'static str {
        match self {
            SubredditSort::Hot => "hot",
            SubredditSort::New => "new",
            SubredditSort::Rising => "rising",
            SubredditSort::Top => "top",
            SubredditSort::Controversial => "controversial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeRange {
    pub fn as_param(&self) -> &'static str {
        match self {
            TimeRange::Hour => "hour",
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
            TimeRange::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubredditQuery {
    pub name: String,
    pub sort: Option<SubredditSort>,
    /// Only meaningful for `top` and `controversial`.
    pub time: Option<TimeRange>,
}

impl SubredditQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort: None,
            time: None,
        }
    }

    pub fn sorted(mut self, sort: SubredditSort, time: Option<TimeRange>) -> Self {
        self.sort = Some(sort);
        self.time = time;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Posts,
    Subreddits,
}

impl SearchKind {
    fn as_param(&self) -> &'static str {
        match self {
            SearchKind::Posts => "link",
            SearchKind::Subreddits => "sr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSort {
    Relevance,
    Hot,
    Top,
    New,
    Comments,
}

impl SearchSort {
    pub fn as_param(&self) -> &'static str {
        match self {
            SearchSort::Relevance => "relevance",
            SearchSort::Hot => "hot",
            SearchSort::Top => "top",
            SearchSort::New => "new",
            SearchSort::Comments => "comments",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub sort: SearchSort,
    pub time: TimeRange,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sort: SearchSort::Relevance,
            time: TimeRange::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileFilter {
    /// Posts and comments together.
    #[default]
    Overview,
    Submitted,
    Comments,
}

impl ProfileFilter {
    fn as_path(&self) -> Option<&'static str> {
        match self {
            ProfileFilter::Overview => None,
            ProfileFilter::Submitted => Some("submitted"),
            ProfileFilter::Comments => Some("comments"),
        }
    }
}

/// `{base}/r/{name}[/{sort}][?t=..][&limit=..][&after=..]`
pub fn subreddit_url(
    base: &Url,
    query: &SubredditQuery,
    limit: Option<u32>,
    after: Option<&str>,
) -> Result<Url, FetchError> {
    let mut url = base.clone();
    {
        let mut segments = path_segments(&mut url)?;
        segments.push("r").push(checked_name(&query.name, "subreddit")?);
        if let Some(sort) = query.sort {
            segments.push(sort.as_path());
        }
    }
    {
        let mut pairs = url.query_pairs_mut();
        if let Some(time) = query.time {
            pairs.append_pair("t", time.as_param());
        }
        if let Some(limit) = limit {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(after) = non_empty(after) {
            pairs.append_pair("after", after);
        }
    }
    Ok(tidy_query(url))
}

/// `{base}/search?q=..&type=..&sort=..&t=..[&include_over_18=on][&after=..]`
pub fn search_url(
    base: &Url,
    query: &SearchQuery,
    kind: SearchKind,
    include_over_18: bool,
    after: Option<&str>,
) -> Result<Url, FetchError> {
    let text = query.text.trim();
    if text.is_empty() {
        return Err(FetchError::new(FailureKind::InvalidUrl, "empty search query"));
    }
    let mut url = base.clone();
    path_segments(&mut url)?.push("search");
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("q", text)
            .append_pair("type", kind.as_param())
            .append_pair("sort", query.sort.as_param())
            .append_pair("t", query.time.as_param());
        if include_over_18 {
            pairs.append_pair("include_over_18", "on");
        }
        if let Some(after) = non_empty(after) {
            pairs.append_pair("after", after);
        }
    }
    Ok(url)
}

/// `{base}/user/{name}[/{filter}][?after=..]`
pub fn profile_url(
    base: &Url,
    username: &str,
    filter: ProfileFilter,
    after: Option<&str>,
) -> Result<Url, FetchError> {
    let mut url = base.clone();
    {
        let mut segments = path_segments(&mut url)?;
        segments.push("user").push(checked_name(username, "username")?);
        if let Some(path) = filter.as_path() {
            segments.push(path);
        }
    }
    if let Some(after) = non_empty(after) {
        url.query_pairs_mut().append_pair("after", after);
    }
    Ok(url)
}

fn path_segments(url: &mut Url) -> Result<url::PathSegmentsMut<'_>, FetchError> {
    let mut segments = url
        .path_segments_mut()
        .map_err(|_| FetchError::new(FailureKind::InvalidUrl, "base url cannot have a path"))?;
    segments.pop_if_empty();
    Ok(segments)
}

fn checked_name<'a>(name: &'a str, what: &str) -> Result<&'a str, FetchError> {
    let name = name.trim();
    if name.is_empty() || name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(FetchError::new(
            FailureKind::InvalidUrl,
            format!("invalid {what}: {name:?}"),
        ));
    }
    Ok(name)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `query_pairs_mut` leaves an empty `?` behind when nothing was appended.
fn tidy_query(mut url: Url) -> Url {
    if url.query() == Some("") {
        url.set_query(None);
    }
    url
}

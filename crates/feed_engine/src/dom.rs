use scraper::{ElementRef, Selector};
use url::Url;

use crate::filter::ContentFilter;
use crate::privacy::LinkTransformer;
use crate::rewrite::InternalLinkRewriter;
use crate::settings::{FeedSettings, DEFAULT_APP_SCHEME, DEFAULT_BASE_URL};
use crate::{FailureKind, FetchError};

/// Everything a parser needs besides the HTML itself.
#[derive(Clone)]
pub struct ScrapeContext {
    pub transformer: LinkTransformer,
    pub filter: ContentFilter,
    pub base_url: Url,
    pub app_scheme: String,
    pub show_original_url: bool,
}

impl ScrapeContext {
    pub fn new(base_url: Url) -> Self {
        Self {
            transformer: LinkTransformer::new(true, None),
            filter: ContentFilter::default(),
            base_url,
            app_scheme: DEFAULT_APP_SCHEME.to_string(),
            show_original_url: false,
        }
    }

    pub fn from_settings(
        settings: &FeedSettings,
        transformer: LinkTransformer,
    ) -> Result<Self, FetchError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        Ok(Self {
            transformer,
            filter: settings.content_filter(),
            base_url,
            app_scheme: settings.app_scheme.clone(),
            show_original_url: settings.show_original_url,
        })
    }

    pub fn with_filter(mut self, filter: ContentFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_transformer(mut self, transformer: LinkTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn with_show_original_url(mut self, show: bool) -> Self {
        self.show_original_url = show;
        self
    }

    pub fn rewriter(&self) -> InternalLinkRewriter<'_> {
        InternalLinkRewriter::new(&self.transformer, &self.app_scheme, self.show_original_url)
    }

    /// Resolve a possibly relative href against the site root.
    pub fn absolutize(&self, href: &str) -> String {
        match self.base_url.join(href) {
            Ok(url) => url.into(),
            Err(_) => href.to_string(),
        }
    }
}

impl Default for ScrapeContext {
    fn default() -> Self {
        // the constant is a well-formed absolute URL
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base url parses");
        Self::new(base_url)
    }
}

/// Per-element extraction failure; the element is skipped, the page is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ExtractError {
    #[error("missing {0}")]
    MissingField(&'static str),
}

pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid built-in selector {css}: {err}"))
}

pub(crate) fn has_class(element: ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Direct element children with the given tag and class.
pub(crate) fn child_elements<'a>(
    element: ElementRef<'a>,
    tag: &'a str,
    class: &'a str,
) -> impl DoubleEndedIterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag && has_class(*child, class))
        .collect::<Vec<_>>()
        .into_iter()
}

pub(crate) fn first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

pub(crate) fn text_of(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub(crate) fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// Drop an `r/` or `/r/` prefix from a displayed subreddit name.
pub(crate) fn strip_subreddit_prefix(name: &str) -> &str {
    let name = name.trim().trim_start_matches('/');
    name.strip_prefix("r/").unwrap_or(name).trim_end_matches('/')
}

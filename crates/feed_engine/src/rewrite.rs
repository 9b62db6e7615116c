use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::markdown::AnchorRewrite;
use crate::privacy::LinkTransformer;

const INTERNAL_PREFIXES: &[&str] = &["/r/", "/u/", "/user/"];

static RAW_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s\[\]()<>]+").expect("url pattern is valid"));

/// Routes body links back into the app through its custom URI scheme.
///
/// Subreddit and user paths are prefixed as they are. Everything else is
/// privacy-transformed first and loses its own scheme.
pub struct InternalLinkRewriter<'a> {
    transformer: &'a LinkTransformer,
    scheme: &'a str,
    show_original_url: bool,
}

impl<'a> InternalLinkRewriter<'a> {
    pub fn new(transformer: &'a LinkTransformer, scheme: &'a str, show_original_url: bool) -> Self {
        Self {
            transformer,
            scheme,
            show_original_url,
        }
    }
}

impl AnchorRewrite for InternalLinkRewriter<'_> {
    fn rewrite_href(&self, href: &str) -> String {
        if href.is_empty() {
            return String::new();
        }
        if INTERNAL_PREFIXES.iter().any(|prefix| href.starts_with(prefix)) {
            return format!("{}://{}", self.scheme, href);
        }
        let private = self.transformer.transform(href).private_url;
        format!("{}://{}", self.scheme, strip_scheme(&private))
    }

    fn rewrite_text(&self, text: &str) -> String {
        if self.show_original_url {
            return text.to_string();
        }
        RAW_URL
            .replace_all(text, |captures: &Captures| {
                self.transformer.transform(&captures[0]).private_url
            })
            .into_owned()
    }
}

fn strip_scheme(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::InternalLinkRewriter;
    use crate::markdown::AnchorRewrite;
    use crate::privacy::LinkTransformer;

    #[test]
    fn internal_paths_keep_their_path() {
        let transformer = LinkTransformer::new(true, None);
        let rewriter = InternalLinkRewriter::new(&transformer, "feed", false);
        assert_eq!(rewriter.rewrite_href("/r/rust"), "feed:///r/rust");
        assert_eq!(rewriter.rewrite_href("/u/alice"), "feed:///u/alice");
    }

    #[test]
    fn external_links_are_privatized_and_lose_scheme() {
        let transformer = LinkTransformer::new(true, None);
        let rewriter = InternalLinkRewriter::new(&transformer, "feed", false);
        assert_eq!(
            rewriter.rewrite_href("https://twitter.com/a/status/1"),
            "feed://nitter.net/a/status/1"
        );
        assert_eq!(
            rewriter.rewrite_href("https://example.org/page"),
            "feed://example.org/page"
        );
    }

    #[test]
    fn visible_urls_follow_show_original_preference() {
        let transformer = LinkTransformer::new(true, None);
        let hidden = InternalLinkRewriter::new(&transformer, "feed", false);
        let shown = InternalLinkRewriter::new(&transformer, "feed", true);
        let text = "see https://twitter.com/a/status/1 now";

        assert_eq!(hidden.rewrite_text(text), "see https://nitter.net/a/status/1 now");
        assert_eq!(shown.rewrite_text(text), text);
    }
}

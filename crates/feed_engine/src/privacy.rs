use std::sync::LazyLock;

use feed_core::PrivateUrl;
use regex::Regex;
use url::Url;

use crate::tracking::TrackingParamRemover;

pub const NITTER_HOST: &str = "nitter.net";
pub const INVIDIOUS_HOST: &str = "yewtu.be";
pub const SCRIBE_HOST: &str = "scribe.rip";
pub const IMGUR_MIRROR_HOST: &str = "rimgo.projectsegfau.lt";

#[derive(Debug, Clone, Copy)]
enum Rewrite {
    /// Swap the host, keep everything else.
    Host(&'static str),
    /// `youtu.be/ID` short links become full watch URLs.
    ShortVideo,
}

/// Checked in order; the first domain that matches the URL host wins.
const DOMAIN_RULES: &[(&str, Rewrite)] = &[
    ("twitter.com", Rewrite::Host(NITTER_HOST)),
    ("x.com", Rewrite::Host(NITTER_HOST)),
    ("youtu.be", Rewrite::ShortVideo),
    ("youtube.com", Rewrite::Host(INVIDIOUS_HOST)),
    ("medium.com", Rewrite::Host(SCRIBE_HOST)),
];

static IMGUR_GIFV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^i\.imgur\.com/([A-Za-z0-9]+)\.gifv$").expect("imgur pattern is valid")
});

/// Rewrites links to privacy front-ends and strips tracking parameters.
#[derive(Clone, Default)]
pub struct LinkTransformer {
    redirect_to_private_sites: bool,
    remover: Option<TrackingParamRemover>,
}

impl LinkTransformer {
    pub fn new(redirect_to_private_sites: bool, remover: Option<TrackingParamRemover>) -> Self {
        Self {
            redirect_to_private_sites,
            remover,
        }
    }

    pub fn redirects(&self) -> bool {
        self.redirect_to_private_sites
    }

    /// Never fails: input that is not an absolute URL is returned for both fields.
    pub fn transform(&self, url: &str) -> PrivateUrl {
        let mut result = if self.redirect_to_private_sites {
            rewrite_to_private(url)
        } else {
            PrivateUrl::unchanged(url)
        };

        if let Some(remover) = self.remover.as_ref().filter(|r| r.is_enabled()) {
            result.original_url = remover.clean(&result.original_url);
            result.private_url = remover.clean(&result.private_url);
        }
        result
    }
}

/// Apply the domain table alone; `private_url` is the input when nothing matches.
pub fn rewrite_to_private(url: &str) -> PrivateUrl {
    let private_url = match Url::parse(url) {
        Ok(parsed) => private_equivalent(&parsed),
        Err(_) => None,
    };
    PrivateUrl {
        original_url: url.to_string(),
        private_url: private_url.unwrap_or_else(|| url.to_string()),
    }
}

fn private_equivalent(parsed: &Url) -> Option<String> {
    let host = parsed.host_str()?;

    let rule = DOMAIN_RULES
        .iter()
        .find(|(domain, _)| host_matches(host, domain))
        .map(|(_, rule)| *rule);

    match rule {
        Some(Rewrite::Host(mirror)) => {
            let mut rewritten = parsed.clone();
            rewritten.set_host(Some(mirror)).ok()?;
            Some(rewritten.into())
        }
        Some(Rewrite::ShortVideo) => Some(short_video_url(parsed)),
        None => imgur_mirror_url(host, parsed.path()),
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn short_video_url(parsed: &Url) -> String {
    let id = parsed.path().trim_matches('/');
    let mut watch = format!("https://{INVIDIOUS_HOST}/watch?v={id}");
    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        watch.push('&');
        watch.push_str(query);
    }
    if let Some(fragment) = parsed.fragment() {
        watch.push('#');
        watch.push_str(fragment);
    }
    watch
}

fn imgur_mirror_url(host: &str, path: &str) -> Option<String> {
    let candidate = format!("{host}{path}");
    let captures = IMGUR_GIFV.captures(&candidate)?;
    Some(format!("https://{IMGUR_MIRROR_HOST}/{}.mp4", &captures[1]))
}

#[cfg(test)]
mod tests {
    use super::host_matches;

    #[test]
    fn host_match_requires_label_boundary() {
        assert!(host_matches("x.com", "x.com"));
        assert!(host_matches("mobile.x.com", "x.com"));
        assert!(!host_matches("dropbox.com", "x.com"));
        assert!(!host_matches("notmedium.com", "medium.com"));
    }
}

//! Listing pages: subreddit feeds, search results and user profiles.
//!
//! Output keeps document order. Promoted entries never become posts, and a
//! post whose required fields cannot be read is logged and skipped.
use std::sync::LazyLock;

use feed_core::{determine_post_type, MixedMedia, Post, Subreddit};
use feed_logging::{feed_debug, feed_warn};
use scraper::{ElementRef, Html, Selector};

use crate::comments::extract_comment;
use crate::dom::{
    first, first_token, has_class, non_empty_attr, selector, strip_subreddit_prefix, text_of,
    ExtractError, ScrapeContext,
};

static LINK_THING: LazyLock<Selector> = LazyLock::new(|| selector("div.thing.link"));
static PROFILE_THING: LazyLock<Selector> = LazyLock::new(|| selector("div.thing"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("a.title"));
static FLAIR: LazyLock<Selector> = LazyLock::new(|| selector("span.linkflairlabel"));
static TIME: LazyLock<Selector> = LazyLock::new(|| selector("time"));
static SCORE: LazyLock<Selector> = LazyLock::new(|| selector("div.score.unvoted"));
static COMMENTS_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.bylink.comments"));
static THUMBNAIL: LazyLock<Selector> = LazyLock::new(|| selector("a.thumbnail img"));

static SEARCH_LINK: LazyLock<Selector> = LazyLock::new(|| selector("div.search-result-link"));
static SEARCH_SUBREDDIT: LazyLock<Selector> =
    LazyLock::new(|| selector("div.search-result-subreddit"));
static SEARCH_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("a.search-title"));
static SEARCH_SUBREDDIT_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("a.search-subreddit-link"));
static SEARCH_AUTHOR: LazyLock<Selector> = LazyLock::new(|| selector("a.author"));
static SEARCH_SCORE: LazyLock<Selector> = LazyLock::new(|| selector("span.search-score"));
static SEARCH_COMMENTS: LazyLock<Selector> = LazyLock::new(|| selector("a.search-comments"));
static SEARCH_MEDIA: LazyLock<Selector> = LazyLock::new(|| selector("a.search-link"));

const DELETED_AUTHOR: &str = "[deleted]";
const UNKNOWN_SCORE: &str = "•";

/// Posts of a subreddit or front-page listing.
pub fn parse_listing(html: &str, ctx: &ScrapeContext) -> Vec<Post> {
    let document = Html::parse_document(html);
    let posts = collect_posts(document.select(&LINK_THING), ctx, extract_listing_post);
    feed_debug!("listing yielded {} posts", posts.len());
    posts
}

/// Posts of a `type=link` search result page.
pub fn parse_search_posts(html: &str, ctx: &ScrapeContext) -> Vec<Post> {
    let document = Html::parse_document(html);
    let posts = collect_posts(document.select(&SEARCH_LINK), ctx, extract_search_post);
    feed_debug!("search yielded {} posts", posts.len());
    posts
}

/// Subreddits of a `type=sr` search result page.
pub fn parse_search_subreddits(html: &str) -> Vec<Subreddit> {
    let document = Html::parse_document(html);
    document
        .select(&SEARCH_SUBREDDIT)
        .filter(|element| !is_promoted(*element))
        .filter_map(|element| match extract_subreddit(element) {
            Ok(subreddit) => Some(subreddit),
            Err(err) => {
                feed_warn!("skipping subreddit result: {}", err);
                None
            }
        })
        .collect()
}

/// Posts and comments of a user profile, in document order.
pub fn parse_profile(html: &str, ctx: &ScrapeContext) -> Vec<MixedMedia> {
    let document = Html::parse_document(html);
    let rewriter = ctx.rewriter();
    let mut items = Vec::new();

    for element in document.select(&PROFILE_THING) {
        if is_promoted(element) {
            continue;
        }
        if has_class(element, "link") {
            match extract_listing_post(element, ctx) {
                Ok(post) if ctx.filter.blocks(&post) => {
                    feed_debug!("filtered profile post {}", post.id);
                }
                Ok(post) => items.push(MixedMedia::from_post(post)),
                Err(err) => feed_warn!("skipping profile post: {}", err),
            }
        } else if has_class(element, "comment") {
            let Some(id) = non_empty_attr(element, "data-fullname") else {
                feed_warn!("skipping profile comment: missing data-fullname");
                continue;
            };
            let comment = extract_comment(element, id, None, 0, ctx, &rewriter);
            items.push(MixedMedia::from_comment(comment));
        }
    }

    feed_debug!("profile yielded {} entries", items.len());
    items
}

fn collect_posts<'a>(
    elements: impl Iterator<Item = ElementRef<'a>>,
    ctx: &ScrapeContext,
    extract: fn(ElementRef<'a>, &ScrapeContext) -> Result<Post, ExtractError>,
) -> Vec<Post> {
    let mut posts = Vec::new();
    for element in elements {
        if is_promoted(element) {
            feed_debug!("dropping promoted entry");
            continue;
        }
        match extract(element, ctx) {
            Ok(post) if ctx.filter.blocks(&post) => {
                feed_debug!("filtered post {} from r/{}", post.id, post.subreddit);
            }
            Ok(post) => posts.push(post),
            Err(err) => feed_warn!("skipping post: {}", err),
        }
    }
    posts
}

fn is_promoted(element: ElementRef) -> bool {
    has_class(element, "promoted")
        || has_class(element, "promotedlink")
        || element.value().attr("data-promoted") == Some("true")
}

fn extract_listing_post(element: ElementRef, ctx: &ScrapeContext) -> Result<Post, ExtractError> {
    let id = non_empty_attr(element, "data-fullname").ok_or(ExtractError::MissingField("id"))?;
    let subreddit = non_empty_attr(element, "data-subreddit")
        .ok_or(ExtractError::MissingField("subreddit"))?;
    let title = first(element, &TITLE)
        .map(text_of)
        .filter(|title| !title.is_empty())
        .ok_or(ExtractError::MissingField("title"))?;
    let raw_media = non_empty_attr(element, "data-url").ok_or(ExtractError::MissingField("url"))?;

    let comments_link = first(element, &COMMENTS_LINK);
    let comments_url = comments_link
        .and_then(|link| non_empty_attr(link, "href"))
        .or_else(|| non_empty_attr(element, "data-permalink"))
        .map(|href| ctx.absolutize(href))
        .ok_or(ExtractError::MissingField("comments url"))?;
    let comment_count = non_empty_attr(element, "data-comments-count")
        .map(str::to_string)
        .or_else(|| comments_link.and_then(|link| numeric_token(&text_of(link))))
        .unwrap_or_else(|| "0".to_string());

    let votes = non_empty_attr(element, "data-score")
        .map(str::to_string)
        .or_else(|| first(element, &SCORE).map(text_of).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| UNKNOWN_SCORE.to_string());

    Ok(build_post(PostFields {
        id,
        subreddit: subreddit.to_string(),
        title,
        tag: flair(element),
        author: non_empty_attr(element, "data-author").unwrap_or(DELETED_AUTHOR).to_string(),
        votes,
        created: created(element),
        raw_media,
        comments_url,
        comment_count,
        element,
        ctx,
    }))
}

fn extract_search_post(element: ElementRef, ctx: &ScrapeContext) -> Result<Post, ExtractError> {
    let id = non_empty_attr(element, "data-fullname").ok_or(ExtractError::MissingField("id"))?;
    let title_link = first(element, &SEARCH_TITLE).ok_or(ExtractError::MissingField("title"))?;
    let title = text_of(title_link);
    if title.is_empty() {
        return Err(ExtractError::MissingField("title"));
    }
    let subreddit = first(element, &SEARCH_SUBREDDIT_LINK)
        .map(|link| strip_subreddit_prefix(&text_of(link)).to_string())
        .filter(|name| !name.is_empty())
        .ok_or(ExtractError::MissingField("subreddit"))?;

    let comments_link = first(element, &SEARCH_COMMENTS);
    let comments_url = comments_link
        .and_then(|link| non_empty_attr(link, "href"))
        .or_else(|| non_empty_attr(title_link, "href"))
        .map(|href| ctx.absolutize(href))
        .ok_or(ExtractError::MissingField("comments url"))?;
    let raw_media = first(element, &SEARCH_MEDIA)
        .and_then(|link| non_empty_attr(link, "href"))
        .or_else(|| non_empty_attr(title_link, "href"))
        .ok_or(ExtractError::MissingField("url"))?;

    let votes = first(element, &SEARCH_SCORE)
        .and_then(|score| first_token(&text_of(score)).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_SCORE.to_string());
    let comment_count = comments_link
        .and_then(|link| numeric_token(&text_of(link)))
        .unwrap_or_else(|| "0".to_string());
    let author = first(element, &SEARCH_AUTHOR)
        .map(text_of)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DELETED_AUTHOR.to_string());

    Ok(build_post(PostFields {
        id,
        subreddit,
        title,
        tag: flair(element),
        author,
        votes,
        created: created(element),
        raw_media,
        comments_url,
        comment_count,
        element,
        ctx,
    }))
}

fn extract_subreddit(element: ElementRef) -> Result<Subreddit, ExtractError> {
    let name = first(element, &SEARCH_SUBREDDIT_LINK)
        .map(|link| strip_subreddit_prefix(&text_of(link)).to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| {
            first(element, &SEARCH_TITLE)
                .and_then(|link| non_empty_attr(link, "href"))
                .and_then(subreddit_from_href)
        })
        .ok_or(ExtractError::MissingField("subreddit name"))?;

    Ok(match non_empty_attr(element, "data-fullname") {
        Some(id) => Subreddit::new(id, name),
        None => Subreddit::from_name(name),
    })
}

fn subreddit_from_href(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("/r/")?;
    let name = rest.split('/').next()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

struct PostFields<'a, 'c> {
    id: &'a str,
    subreddit: String,
    title: String,
    tag: Option<String>,
    author: String,
    votes: String,
    created: Option<String>,
    raw_media: &'a str,
    comments_url: String,
    comment_count: String,
    element: ElementRef<'a>,
    ctx: &'c ScrapeContext,
}

fn build_post(fields: PostFields) -> Post {
    let ctx = fields.ctx;
    let media_url = ctx.absolutize(fields.raw_media);
    let post_type = determine_post_type(&media_url);
    let thumbnail = if post_type.has_thumbnail() {
        thumbnail(fields.element)
    } else {
        None
    };

    Post {
        id: fields.id.to_string(),
        subreddit: fields.subreddit,
        title: fields.title,
        tag: fields.tag,
        author: fields.author,
        votes: fields.votes,
        created: fields.created,
        media: ctx.transformer.transform(&media_url),
        comments_url: fields.comments_url,
        comment_count: fields.comment_count,
        post_type,
        thumbnail,
    }
}

fn flair(element: ElementRef) -> Option<String> {
    first(element, &FLAIR)
        .map(text_of)
        .filter(|flair| !flair.is_empty())
}

fn created(element: ElementRef) -> Option<String> {
    first(element, &TIME)
        .and_then(|time| non_empty_attr(time, "datetime"))
        .map(str::to_string)
}

fn thumbnail(element: ElementRef) -> Option<String> {
    let src = first(element, &THUMBNAIL).and_then(|img| non_empty_attr(img, "src"))?;
    Some(match src.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => src.to_string(),
    })
}

fn numeric_token(text: &str) -> Option<String> {
    first_token(text)
        .filter(|token| token.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.'))
        .map(str::to_string)
}

//! Comment tree reconstruction from a comments page.
//!
//! Comments are nested in the DOM: each comment's `div.child` holds a listing
//! of its replies. The walk below follows that nesting in document order with
//! an explicit stack, emitting each comment before its replies.
use std::collections::HashMap;
use std::sync::LazyLock;

use feed_core::Comment;
use feed_logging::{feed_debug, feed_warn};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::dom::{
    child_elements, first_token, has_class, non_empty_attr, selector, text_of, ScrapeContext,
};
use crate::markdown::convert_element;
use crate::rewrite::InternalLinkRewriter;

static TOP_LEVEL: LazyLock<Selector> =
    LazyLock::new(|| selector("div.sitetable.nestedlisting > div.comment"));
static POST_BODY: LazyLock<Selector> =
    LazyLock::new(|| selector("div.thing.link div.expando div.md"));
static AUTHOR: LazyLock<Selector> = LazyLock::new(|| selector("a.author"));
static SCORE: LazyLock<Selector> = LazyLock::new(|| selector("span.score.unvoted"));
static TIME: LazyLock<Selector> = LazyLock::new(|| selector("time"));
static STICKIED: LazyLock<Selector> = LazyLock::new(|| selector("span.stickied-tagline"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("div.md"));
static PERMALINK: LazyLock<Selector> = LazyLock::new(|| selector("a.bylink"));

pub const SCORE_HIDDEN: &str = "[score hidden]";
const DELETED_AUTHOR: &str = "[deleted]";

/// Parsed comments page: the post's self text plus its flattened comment forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsPage {
    /// Markdown of the post body, when the post has one.
    pub post_body: Option<String>,
    /// All comments in pre-order.
    pub comments: Vec<Comment>,
}

impl CommentsPage {
    /// Depth-0 comments, in order.
    pub fn roots(&self) -> Vec<&Comment> {
        self.comments.iter().filter(|c| c.is_root()).collect()
    }

    /// Direct replies of the given comment, in order.
    pub fn replies_to(&self, id: &str) -> Vec<&Comment> {
        self.comments
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(id))
            .collect()
    }
}

/// Comments in order of discovery plus an id index, so parent and duplicate
/// lookups never scan the whole list.
#[derive(Default)]
struct CommentArena {
    comments: Vec<Comment>,
    index: HashMap<String, usize>,
}

impl CommentArena {
    fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn push(&mut self, comment: Comment) -> usize {
        let position = self.comments.len();
        self.index.insert(comment.id.clone(), position);
        self.comments.push(comment);
        position
    }
}

pub fn parse_comments(html: &str, ctx: &ScrapeContext) -> CommentsPage {
    let document = Html::parse_document(html);
    let rewriter = ctx.rewriter();

    let post_body = document
        .select(&POST_BODY)
        .next()
        .map(|body| convert_element(body, &rewriter))
        .filter(|body| !body.is_empty());

    let mut arena = CommentArena::default();
    // (element, index of parent in the arena)
    let mut stack: Vec<(ElementRef, Option<usize>)> =
        document.select(&TOP_LEVEL).map(|el| (el, None)).collect();
    stack.reverse();

    let mut duplicates = 0usize;
    while let Some((element, parent)) = stack.pop() {
        let Some(id) = non_empty_attr(element, "data-fullname") else {
            feed_warn!("skipping comment without data-fullname");
            continue;
        };
        if arena.contains(id) {
            duplicates += 1;
            continue;
        }

        let (parent_id, depth) = match parent {
            Some(index) => {
                let parent = &arena.comments[index];
                (Some(parent.id.clone()), parent.depth + 1)
            }
            None => (None, 0),
        };
        let comment = extract_comment(element, id, parent_id, depth, ctx, &rewriter);
        let index = arena.push(comment);

        for reply in nested_replies(element).into_iter().rev() {
            stack.push((reply, Some(index)));
        }
    }

    if duplicates > 0 {
        feed_debug!("skipped {} duplicate comment subtrees", duplicates);
    }
    feed_debug!("comments page yielded {} comments", arena.comments.len());

    CommentsPage {
        post_body,
        comments: arena.comments,
    }
}

/// `div.child > div.sitetable > div.comment`, direct children only.
fn nested_replies(element: ElementRef) -> Vec<ElementRef> {
    child_elements(element, "div", "child")
        .flat_map(|child| child_elements(child, "div", "sitetable"))
        .flat_map(|table| child_elements(table, "div", "comment"))
        .collect()
}

/// Build one comment from its `div.thing`; fields missing from the markup get placeholders.
pub(crate) fn extract_comment(
    element: ElementRef,
    id: &str,
    parent_id: Option<String>,
    depth: usize,
    ctx: &ScrapeContext,
    rewriter: &InternalLinkRewriter,
) -> Comment {
    // The entry holds this comment's own fields; replies live beside it in div.child.
    let entry = child_elements(element, "div", "entry")
        .next()
        .unwrap_or(element);

    let author = non_empty_attr(element, "data-author")
        .map(str::to_string)
        .or_else(|| {
            own_match(entry, element, &AUTHOR)
                .map(text_of)
                .filter(|a| !a.is_empty())
        })
        .unwrap_or_else(|| DELETED_AUTHOR.to_string());
    let score = own_match(entry, element, &SCORE)
        .and_then(|score| first_token(&text_of(score)).map(str::to_string))
        .unwrap_or_else(|| SCORE_HIDDEN.to_string());
    let time = own_match(entry, element, &TIME)
        .and_then(|time| non_empty_attr(time, "datetime"))
        .unwrap_or_default()
        .to_string();
    let stickied = own_match(entry, element, &STICKIED).is_some();
    let body = own_match(entry, element, &BODY)
        .map(|body| convert_element(body, rewriter))
        .unwrap_or_default();
    let direct_url = own_match(entry, element, &PERMALINK)
        .and_then(|link| non_empty_attr(link, "href"))
        .or_else(|| non_empty_attr(element, "data-permalink"))
        .map(|href| ctx.absolutize(href))
        .unwrap_or_default();

    Comment {
        id: id.to_string(),
        parent_id,
        author,
        score,
        time,
        body,
        depth,
        stickied,
        direct_url,
        is_collapsed: false,
        is_root_collapsed: stickied,
    }
}

/// First match under `scope` that is not part of a reply of `comment`.
fn own_match<'a>(
    scope: ElementRef<'a>,
    comment: ElementRef<'a>,
    selector: &Selector,
) -> Option<ElementRef<'a>> {
    scope
        .select(selector)
        .find(|found| !inside_replies(*found, comment))
}

fn inside_replies(found: ElementRef, comment: ElementRef) -> bool {
    found
        .ancestors()
        .take_while(|node| node.id() != comment.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "div" && has_class(ancestor, "child"))
}

//! Small HTML to Markdown transducer for comment and post bodies.
//!
//! The walk is a recursive pre-order over the fragment. Each conversion owns
//! its own [`ConversionContext`], so converters are never shared between
//! concurrent conversions. Nesting depth is bounded by the HTML parser's own
//! tree and the thread stack.
use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));

static CODE_LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"lang[A-Za-z]*-(\w+)").expect("language pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MarkdownError {
    #[error("convert called before parse")]
    DocumentNotInitialized,
    #[error("document has no body element")]
    BodyNotPresent,
}

/// Hook for rewriting anchors while they are emitted.
pub trait AnchorRewrite {
    fn rewrite_href(&self, href: &str) -> String;

    /// Rewrite the already rendered link text.
    fn rewrite_text(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Leaves anchors as they are.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepLinks;

impl AnchorRewrite for KeepLinks {
    fn rewrite_href(&self, href: &str) -> String {
        href.to_string()
    }
}

/// Single-use converter: `parse` a fragment, then `convert` it.
pub struct MarkdownConverter<'r> {
    document: Option<Html>,
    rewrite: &'r dyn AnchorRewrite,
}

impl MarkdownConverter<'static> {
    pub fn new() -> Self {
        Self::with_rewrite(&KeepLinks)
    }
}

impl Default for MarkdownConverter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> MarkdownConverter<'r> {
    pub fn with_rewrite(rewrite: &'r dyn AnchorRewrite) -> Self {
        Self {
            document: None,
            rewrite,
        }
    }

    pub fn parse(&mut self, html: &str) {
        self.document = Some(Html::parse_document(html));
    }

    pub fn convert(&self) -> Result<String, MarkdownError> {
        let document = self
            .document
            .as_ref()
            .ok_or(MarkdownError::DocumentNotInitialized)?;
        let body = document
            .select(&BODY)
            .next()
            .ok_or(MarkdownError::BodyNotPresent)?;
        Ok(convert_element(body, self.rewrite))
    }
}

/// Parse and convert in one go, leaving links untouched.
pub fn html_to_markdown(html: &str) -> Result<String, MarkdownError> {
    let mut converter = MarkdownConverter::new();
    converter.parse(html);
    converter.convert()
}

/// Convert the children of an element that is already part of a parsed page.
pub fn convert_element(root: ElementRef, rewrite: &dyn AnchorRewrite) -> String {
    let mut ctx = ConversionContext::default();
    for child in root.children() {
        visit_node(child, &mut ctx, rewrite);
    }
    ctx.into_markdown()
}

#[derive(Debug, Default)]
struct ConversionContext {
    buffer: String,
    paragraph_started: bool,
    inside_quote: bool,
    preformatted: bool,
}

impl ConversionContext {
    fn push(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Separator before a paragraph; the first paragraph gets none.
    fn paragraph_gap(&mut self) {
        if self.paragraph_started {
            let gap = if self.inside_quote { "\n\n >" } else { "\n\n" };
            self.buffer.push_str(gap);
        } else {
            self.paragraph_started = true;
        }
    }

    fn line_break(&mut self) {
        if self.paragraph_started {
            self.buffer.push('\n');
        } else {
            self.paragraph_started = true;
        }
    }

    fn ensure_newline(&mut self) {
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
    }

    fn into_markdown(self) -> String {
        self.buffer.trim().to_string()
    }
}

fn visit_node(node: NodeRef<'_, Node>, ctx: &mut ConversionContext, rewrite: &dyn AnchorRewrite) {
    match node.value() {
        Node::Text(text) => {
            // whitespace-only nodes are formatting between tags
            if ctx.preformatted || !text.trim().is_empty() {
                ctx.push(text);
            }
        }
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                visit_element(element, ctx, rewrite);
            }
        }
        _ => {
            for child in node.children() {
                visit_node(child, ctx, rewrite);
            }
        }
    }
}

fn visit_children(element: ElementRef, ctx: &mut ConversionContext, rewrite: &dyn AnchorRewrite) {
    for child in element.children() {
        visit_node(child, ctx, rewrite);
    }
}

fn visit_element(element: ElementRef, ctx: &mut ConversionContext, rewrite: &dyn AnchorRewrite) {
    let tag = element.value().name().to_ascii_lowercase();
    match tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            ctx.push(&"#".repeat(level));
            ctx.push(" ");
            visit_children(element, ctx, rewrite);
            ctx.push("\n\n");
        }
        "p" => {
            ctx.paragraph_gap();
            visit_children(element, ctx, rewrite);
        }
        "br" => ctx.line_break(),
        "a" => handle_anchor(element, ctx, rewrite),
        "strong" => wrap_children("**", element, ctx, rewrite),
        "em" => wrap_children("*", element, ctx, rewrite),
        "code" => wrap_children("`", element, ctx, rewrite),
        "blockquote" => {
            let outer = ctx.inside_quote;
            ctx.inside_quote = true;
            visit_children(element, ctx, rewrite);
            ctx.inside_quote = outer;
            ctx.push("\n\n");
        }
        "pre" => match first_child_element(element, "code") {
            Some(code) => handle_code_block(code, ctx, rewrite),
            None => visit_children(element, ctx, rewrite),
        },
        _ => visit_children(element, ctx, rewrite),
    }
}

fn wrap_children(
    delimiter: &str,
    element: ElementRef,
    ctx: &mut ConversionContext,
    rewrite: &dyn AnchorRewrite,
) {
    ctx.push(delimiter);
    visit_children(element, ctx, rewrite);
    ctx.push(delimiter);
}

fn handle_anchor(element: ElementRef, ctx: &mut ConversionContext, rewrite: &dyn AnchorRewrite) {
    let href = element.value().attr("href").unwrap_or_default();
    ctx.push("[");
    let start = ctx.buffer.len();
    visit_children(element, ctx, rewrite);
    let rendered = ctx.buffer[start..].to_string();
    let replaced = rewrite.rewrite_text(&rendered);
    if replaced != rendered {
        ctx.buffer.truncate(start);
        ctx.push(&replaced);
    }
    ctx.push("](");
    ctx.push(&rewrite.rewrite_href(href));
    ctx.push(")");
}

fn handle_code_block(code: ElementRef, ctx: &mut ConversionContext, rewrite: &dyn AnchorRewrite) {
    ctx.push("```");
    if let Some(language) = code
        .value()
        .attr("class")
        .and_then(|class| CODE_LANGUAGE.captures(class))
        .map(|captures| captures[1].to_string())
    {
        ctx.push(&language);
    }
    ctx.push("\n");
    ctx.preformatted = true;
    visit_children(code, ctx, rewrite);
    ctx.preformatted = false;
    ctx.ensure_newline();
    ctx.push("```");
}

fn first_child_element<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name().eq_ignore_ascii_case(name))
}

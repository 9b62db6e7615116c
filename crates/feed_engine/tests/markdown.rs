use feed_engine::{html_to_markdown, AnchorRewrite, MarkdownConverter, MarkdownError};
use pretty_assertions::assert_eq;

fn md(html: &str) -> String {
    html_to_markdown(html).expect("conversion succeeds")
}

#[test]
fn paragraphs_and_emphasis() {
    assert_eq!(
        md("<p>Hello <strong>world</strong></p><p>Next</p>"),
        "Hello **world**\n\nNext"
    );
    assert_eq!(md("<p><em>soft</em> and <code>x = 1</code></p>"), "*soft* and `x = 1`");
}

#[test]
fn fenced_code_keeps_the_language() {
    let html = r#"<pre><code class="language-python">print("hi")
</code></pre>"#;
    assert_eq!(md(html), "```python\nprint(\"hi\")\n```");
}

#[test]
fn fenced_code_takes_a_lang_prefixed_class() {
    assert_eq!(
        md(r#"<pre><code class="lang-python">x=1</code></pre>"#),
        "```python\nx=1\n```"
    );
}

#[test]
fn fenced_code_without_language() {
    assert_eq!(md("<pre><code>let x = 1;</code></pre>"), "```\nlet x = 1;\n```");
}

#[test]
fn headings_use_their_level() {
    assert_eq!(md("<h1>Title</h1><h3>Sub</h3>"), "# Title\n\n### Sub");
}

#[test]
fn quoted_paragraphs_carry_the_quote_marker() {
    let html = "<p>intro</p><blockquote><p>quoted</p><p>more</p></blockquote><p>after</p>";
    assert_eq!(md(html), "intro\n\n >quoted\n\n >more\n\n\n\nafter");
}

#[test]
fn line_breaks_inside_a_paragraph() {
    assert_eq!(md("<p>one<br>two</p>"), "one\ntwo");
}

#[test]
fn links_keep_their_href() {
    assert_eq!(
        md(r#"<p>see <a href="https://example.org">the site</a></p>"#),
        "see [the site](https://example.org)"
    );
}

#[test]
fn lone_spaces_between_tags_are_dropped() {
    assert_eq!(md("<p><strong>a</strong> <em>b</em></p>"), "**a***b*");
}

#[test]
fn newlines_between_paragraphs_are_formatting() {
    assert_eq!(
        md("<div class=\"md\"><p>first</p>\n<p>second</p>\n</div>"),
        "first\n\nsecond"
    );
    assert_eq!(
        md("<p>intro</p>\n<blockquote>\n<p>quoted</p>\n<p>more</p>\n</blockquote>\n<p>after</p>"),
        "intro\n\n >quoted\n\n >more\n\n\n\nafter"
    );
}

#[test]
fn whitespace_inside_code_blocks_is_kept() {
    assert_eq!(
        md("<pre><code><span>a</span>\n<span>b</span></code></pre>"),
        "```\na\nb\n```"
    );
}

#[test]
fn unknown_tags_pass_their_text_through() {
    assert_eq!(md("<div><span>plain</span> text</div>"), "plain text");
}

struct Upper;

impl AnchorRewrite for Upper {
    fn rewrite_href(&self, href: &str) -> String {
        href.to_uppercase()
    }

    fn rewrite_text(&self, text: &str) -> String {
        format!("<{text}>")
    }
}

#[test]
fn anchor_hook_rewrites_href_and_text() {
    let rewrite = Upper;
    let mut converter = MarkdownConverter::with_rewrite(&rewrite);
    converter.parse(r#"<a href="/r/rust">rust</a>"#);
    assert_eq!(converter.convert().unwrap(), "[<rust>](/R/RUST)");
}

#[test]
fn convert_requires_a_parsed_document() {
    assert_eq!(
        MarkdownConverter::new().convert(),
        Err(MarkdownError::DocumentNotInitialized)
    );
}

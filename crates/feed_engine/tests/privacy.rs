use std::sync::Arc;

use feed_engine::{rewrite_to_private, LinkTransformer, TrackingParamRemover, TrackingParams};
use pretty_assertions::assert_eq;

fn remover(params: &[&str]) -> TrackingParamRemover {
    let entries = params.iter().map(|p| p.to_string()).collect();
    TrackingParamRemover::new(Arc::new(TrackingParams::preloaded(entries)), true)
}

#[test]
fn table_domains_move_to_their_front_ends() {
    let cases = [
        ("https://twitter.com/rustlang/status/1", "https://nitter.net/rustlang/status/1"),
        ("https://x.com/rustlang", "https://nitter.net/rustlang"),
        ("https://youtu.be/1234", "https://yewtu.be/watch?v=1234"),
        ("https://www.youtube.com/watch?v=abc", "https://yewtu.be/watch?v=abc"),
        ("https://youtube.com/watch?v=abc", "https://yewtu.be/watch?v=abc"),
        ("https://medium.com/@writer/post-42", "https://scribe.rip/@writer/post-42"),
        (
            "https://i.imgur.com/abc123.gifv",
            "https://rimgo.projectsegfau.lt/abc123.mp4",
        ),
    ];
    for (input, expected) in cases {
        let rewritten = rewrite_to_private(input);
        assert_eq!(rewritten.original_url, input);
        assert_eq!(rewritten.private_url, expected, "input: {input}");
    }
}

#[test]
fn other_domains_are_left_alone_and_stay_put_on_repeat() {
    for url in [
        "https://example.org/path?q=1",
        "https://dropbox.com/s/xyz",
        "https://i.imgur.com/abc123.png",
        "not a url",
    ] {
        let once = rewrite_to_private(url);
        assert_eq!(once.private_url, url);
        let twice = rewrite_to_private(&once.private_url);
        assert_eq!(twice.private_url, once.private_url);
    }
}

#[test]
fn disabled_redirects_keep_the_original() {
    let transformer = LinkTransformer::new(false, None);
    let result = transformer.transform("https://twitter.com/a");
    assert_eq!(result.private_url, "https://twitter.com/a");
}

#[test]
fn tracking_params_are_removed_in_order() {
    let transformer = LinkTransformer::new(true, Some(remover(&["utm_source", "fbclid"])));
    let result = transformer.transform("https://example.org/a?utm_source=x&keep=1&FBCLID=2&next=3");
    assert_eq!(result.original_url, "https://example.org/a?keep=1&next=3");
    assert_eq!(result.private_url, "https://example.org/a?keep=1&next=3");
}

#[test]
fn campaign_params_are_stripped_from_a_plain_link() {
    let transformer = LinkTransformer::new(
        true,
        Some(remover(&["utm_source", "utm_campaign", "utm_medium"])),
    );
    let result = transformer
        .transform("https://example.org/?utm_source=a&utm_campaign=b&utm_medium=c&keep=1");
    assert_eq!(result.private_url, "https://example.org/?keep=1");
}

#[test]
fn removing_every_param_drops_the_question_mark() {
    let transformer = LinkTransformer::new(true, Some(remover(&["utm_source"])));
    let result = transformer.transform("https://twitter.com/a?utm_source=share");
    assert_eq!(result.original_url, "https://twitter.com/a");
    assert_eq!(result.private_url, "https://nitter.net/a");
}

#[test]
fn disabled_remover_changes_nothing() {
    let params = Arc::new(TrackingParams::preloaded(vec!["utm_source".to_string()]));
    let transformer =
        LinkTransformer::new(true, Some(TrackingParamRemover::new(params, false)));
    let result = transformer.transform("https://example.org/?utm_source=x");
    assert_eq!(result.private_url, "https://example.org/?utm_source=x");
}

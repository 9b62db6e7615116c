use feed_core::{
    from_json, sort_newest_first, to_json, Comment, Identified, MixedMedia, Post, PostType,
    PrivateUrl, Subreddit,
};
use pretty_assertions::assert_eq;

fn post(id: &str, created: Option<&str>) -> Post {
    Post {
        id: id.to_string(),
        subreddit: "rust".to_string(),
        title: format!("title {id}"),
        tag: Some("News".to_string()),
        author: "alice".to_string(),
        votes: "42".to_string(),
        created: created.map(str::to_string),
        media: PrivateUrl {
            original_url: "https://twitter.com/a/status/1".to_string(),
            private_url: "https://nitter.net/a/status/1".to_string(),
        },
        comments_url: format!("https://old.reddit.com/r/rust/comments/{id}/"),
        comment_count: "7".to_string(),
        post_type: PostType::Article,
        thumbnail: None,
    }
}

fn comment(id: &str, time: &str) -> Comment {
    Comment {
        id: id.to_string(),
        parent_id: None,
        author: "bob".to_string(),
        score: "[score hidden]".to_string(),
        time: time.to_string(),
        body: "Hello **world**".to_string(),
        depth: 0,
        stickied: true,
        direct_url: format!("https://old.reddit.com/r/rust/comments/x/y/{id}/"),
        is_collapsed: false,
        is_root_collapsed: true,
    }
}

#[test]
fn dates_come_from_entity_timestamps() {
    let item = MixedMedia::from_post(post("t3_a", Some("2024-03-01T10:00:00+00:00")));
    assert_eq!(
        item.date().map(|d| d.to_rfc3339()),
        Some("2024-03-01T10:00:00+00:00".to_string())
    );

    let undated = MixedMedia::from_post(post("t3_b", None));
    assert_eq!(undated.date(), None);

    let garbage = MixedMedia::from_comment(comment("t1_c", "an hour ago"));
    assert_eq!(garbage.date(), None);
}

#[test]
fn newest_first_keeps_undated_entries_last() {
    let mut items = vec![
        MixedMedia::from_post(post("t3_old", Some("2024-01-01T00:00:00+00:00"))),
        MixedMedia::from_subreddit(Subreddit::new("t5_x", "rust")),
        MixedMedia::from_comment(comment("t1_new", "2024-02-01T00:00:00+00:00")),
        MixedMedia::from_post(post("t3_undated", None)),
        MixedMedia::from_post(post("t3_mid", Some("2024-01-15T00:00:00+01:00"))),
    ];

    sort_newest_first(&mut items);

    let ids: Vec<&str> = items.iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec!["t1_new", "t3_mid", "t3_old", "t5_x", "t3_undated"]);
}

#[test]
fn mixed_media_encodes_with_type_discriminator() {
    let items = vec![
        MixedMedia::from_post(post("t3_a", Some("2024-03-01T10:00:00+00:00"))),
        MixedMedia::from_comment(comment("t1_b", "2024-03-02T10:00:00+00:00")),
        MixedMedia::from_subreddit(Subreddit::from_name("rust")),
    ];

    let encoded = to_json(&items).unwrap();
    let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(value[0]["type"], "post");
    assert_eq!(value[0]["post"]["type"], "article");
    assert_eq!(value[0]["post"]["media"]["privateURL"], "https://nitter.net/a/status/1");
    assert_eq!(value[1]["type"], "comment");
    assert_eq!(value[1]["comment"]["isRootCollapsed"], true);
    assert_eq!(value[2]["type"], "subreddit");

    let decoded = from_json(&encoded).unwrap();
    assert_eq!(decoded, items);
}

#[test]
fn unknown_discriminator_is_rejected() {
    let err = from_json(r#"[{"type":"video","url":"x"}]"#);
    assert!(err.is_err());
}

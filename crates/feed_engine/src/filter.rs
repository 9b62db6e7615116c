use feed_core::Post;

/// User denylists applied to parsed posts.
///
/// Subreddits and authors match exactly (ignoring case); keywords match
/// anywhere in the title (ignoring case).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    subreddits: Vec<String>,
    authors: Vec<String>,
    keywords: Vec<String>,
}

impl ContentFilter {
    pub fn new(subreddits: &[String], authors: &[String], keywords: &[String]) -> Self {
        Self {
            subreddits: normalize(subreddits),
            authors: normalize(authors),
            keywords: normalize(keywords),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subreddits.is_empty() && self.authors.is_empty() && self.keywords.is_empty()
    }

    pub fn blocks_subreddit(&self, subreddit: &str) -> bool {
        let subreddit = subreddit.to_lowercase();
        self.subreddits.iter().any(|banned| *banned == subreddit)
    }

    pub fn blocks_author(&self, author: &str) -> bool {
        let author = author.to_lowercase();
        self.authors.iter().any(|banned| *banned == author)
    }

    pub fn blocks_title(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.keywords.iter().any(|keyword| title.contains(keyword.as_str()))
    }

    pub fn blocks(&self, post: &Post) -> bool {
        self.blocks_subreddit(&post.subreddit)
            || self.blocks_author(&post.author)
            || self.blocks_title(&post.title)
    }
}

fn normalize(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::ContentFilter;

    fn filter() -> ContentFilter {
        ContentFilter::new(
            &["Politics".to_string()],
            &["SpamBot".to_string()],
            &["giveaway".to_string(), "  ".to_string()],
        )
    }

    #[test]
    fn subreddit_and_author_match_exactly() {
        let filter = filter();
        assert!(filter.blocks_subreddit("politics"));
        assert!(!filter.blocks_subreddit("politicsdiscussion"));
        assert!(filter.blocks_author("spambot"));
        assert!(!filter.blocks_author("spambot2"));
    }

    #[test]
    fn keywords_match_substrings() {
        let filter = filter();
        assert!(filter.blocks_title("Huge GIVEAWAY today"));
        assert!(!filter.blocks_title("Regular title"));
    }

    #[test]
    fn blank_entries_are_ignored() {
        assert!(ContentFilter::new(&[], &[], &[" ".to_string()]).is_empty());
    }
}

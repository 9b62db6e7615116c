use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Identified;

/// One fetched page plus the cursor for the next request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Id of the last entity on the page in document order.
    pub after: Option<String>,
}

impl<T: Identified> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        let after = items.last().map(|item| item.id().to_string());
        Self { items, after }
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Caller-owned list of entities gathered over successive pages, unique by id.
#[derive(Debug, Clone)]
pub struct FeedAccumulator<T> {
    items: Vec<T>,
    seen: HashSet<String>,
    cursor: Option<String>,
    exhausted: bool,
}

impl<T> Default for FeedAccumulator<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            exhausted: false,
        }
    }
}

impl<T: Identified> FeedAccumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a page and return how many entities were new.
    ///
    /// A page that adds nothing marks the feed exhausted; the cursor only moves
    /// when the page had a cursor of its own.
    pub fn extend(&mut self, page: Page<T>) -> usize {
        let before = self.items.len();
        for item in page.items {
            if self.seen.insert(item.id().to_string()) {
                self.items.push(item);
            }
        }
        let added = self.items.len() - before;
        if let Some(after) = page.after {
            self.cursor = Some(after);
        }
        self.exhausted = added == 0;
        added
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forget everything, e.g. when the user switches to another subreddit.
    pub fn reset(&mut self) {
        self.items.clear();
        self.seen.clear();
        self.cursor = None;
        self.exhausted = false;
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

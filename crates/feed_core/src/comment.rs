use serde::{Deserialize, Serialize};

use crate::Identified;

/// One comment of a comments page, flattened in pre-order.
///
/// The tree is carried by `parent_id`, which names another comment of the same
/// parse. The two collapse flags are initial values for the UI only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(rename = "parentID")]
    pub parent_id: Option<String>,
    pub author: String,
    /// Score as shown by the site, or `[score hidden]`.
    pub score: String,
    pub time: String,
    /// Body converted to Markdown.
    pub body: String,
    pub depth: usize,
    pub stickied: bool,
    #[serde(rename = "directURL")]
    pub direct_url: String,
    pub is_collapsed: bool,
    pub is_root_collapsed: bool,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

impl Identified for Comment {
    fn id(&self) -> &str {
        &self.id
    }
}

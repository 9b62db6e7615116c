use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::Identified;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subreddit {
    pub id: String,
    pub name: String,
}

impl Subreddit {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Build a record whose id is derived from the name alone, for markup without a fullname.
    ///
    /// The id is stable across fetches and ignores letter case.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = format!("sr_{}", short_hash(&name.to_lowercase()));
        Self { id, name }
    }
}

impl Identified for Subreddit {
    fn id(&self) -> &str {
        &self.id
    }
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

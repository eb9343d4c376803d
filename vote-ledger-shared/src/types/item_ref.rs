use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a votable item by the collection it lives in and its id.
///
/// The collection path is opaque to the ledger and may be nested
/// (e.g. `trips/42/reviews`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub collection_path: String,
    pub item_id: String,
}

impl ItemRef {
    pub fn new(collection_path: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            collection_path: collection_path.into(),
            item_id: item_id.into(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection_path, self.item_id)
    }
}

/// Identity of an authenticated voter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VoterId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex content hash identifying a commit
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        CommitId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, as git abbreviates
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(7) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        CommitId(oid.to_string())
    }
}

/// A commit as read from the repository. Never modified after reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub parents: Vec<CommitId>,
    /// Author timestamp, seconds since the unix epoch
    pub authored_at: i64,
}

impl Commit {
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        parents: Vec<CommitId>,
        authored_at: i64,
    ) -> Self {
        Commit {
            id: CommitId::new(id),
            message: message.into(),
            parents,
            authored_at,
        }
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

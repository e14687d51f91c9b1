use std::collections::HashMap;

use serde_derive::{Deserialize, Serialize};

/// Hash of the synthetic row standing in for working-directory changes.
pub const UNCOMMITTED: &str = "*";

const ABBREVIATED_HASH_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitTag {
    pub name: String,
    pub annotated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRemote {
    /// Full remote branch name, e.g. `origin/main`.
    pub name: String,
    /// The remote this branch belongs to, when known.
    pub remote: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStash {
    pub selector: String,
    pub base_hash: String,
    pub untracked_files_hash: Option<String>,
}

/// A commit as delivered by the version-control access layer.
///
/// Only `hash` and `parents` matter to the layout; everything else is carried
/// through for the table that renders next to the graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub hash: String,
    /// Parent hashes, main parent first.
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub heads: Vec<String>,
    #[serde(default)]
    pub tags: Vec<CommitTag>,
    #[serde(default)]
    pub remotes: Vec<CommitRemote>,
    #[serde(default)]
    pub stash: Option<CommitStash>,
}

impl Commit {
    pub fn new(hash: impl Into<String>, parents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Commit {
            hash: hash.into(),
            parents: parents.into_iter().map(Into::into).collect(),
            author: String::new(),
            email: String::new(),
            date: 0,
            message: String::new(),
            heads: Vec::new(),
            tags: Vec::new(),
            remotes: Vec::new(),
            stash: None,
        }
    }

    /// The pseudo-commit for uncommitted changes on top of `head`.
    pub fn uncommitted(head: &str) -> Self {
        let mut commit = Commit::new(UNCOMMITTED, [head]);
        commit.message = "Uncommitted Changes".to_string();
        commit
    }

    pub fn is_uncommitted(&self) -> bool {
        self.hash == UNCOMMITTED
    }
}

pub fn abbrev_commit(hash: &str) -> &str {
    match hash.char_indices().nth(ABBREVIATED_HASH_LEN) {
        Some((end, _)) => &hash[..end],
        None => hash,
    }
}

/// Maps a commit hash to its row in the loaded window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitLookup(HashMap<String, usize>);

impl CommitLookup {
    pub fn from_commits(commits: &[Commit]) -> Self {
        commits
            .iter()
            .enumerate()
            .map(|(ix, commit)| (commit.hash.clone(), ix))
            .collect()
    }

    pub fn get(&self, hash: &str) -> Option<usize> {
        self.0.get(hash).copied()
    }

    pub fn insert(&mut self, hash: impl Into<String>, ix: usize) {
        self.0.insert(hash.into(), ix);
    }

    /// Like [`CommitLookup::get`], but only trusts entries that point at the
    /// commit with that hash.
    pub fn resolve(&self, hash: &str, commits: &[Commit]) -> Option<usize> {
        self.get(hash)
            .filter(|&ix| commits.get(ix).is_some_and(|commit| commit.hash == hash))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, usize)> for CommitLookup {
    fn from_iter<T: IntoIterator<Item = (String, usize)>>(iter: T) -> Self {
        CommitLookup(iter.into_iter().collect())
    }
}

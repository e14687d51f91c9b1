use std::collections::HashMap;

use crate::{commit::CommitRemote, settings::ReferenceLabelSettings};

/// A local branch label, along with the remotes tracking a branch of the same name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadLabel {
    pub name: String,
    /// Remote names (e.g. `origin`), not full remote branch names.
    pub remotes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchLabels<'a> {
    pub heads: Vec<HeadLabel>,
    /// Remote branches that weren't folded into a head label.
    pub remotes: Vec<&'a CommitRemote>,
}

pub fn branch_labels<'a>(
    heads: &[String],
    remotes: &'a [CommitRemote],
    settings: &ReferenceLabelSettings,
) -> BranchLabels<'a> {
    let mut head_labels: Vec<HeadLabel> = heads
        .iter()
        .map(|name| HeadLabel {
            name: name.clone(),
            remotes: Vec::new(),
        })
        .collect();

    if !settings.combine_local_and_remote_branch_labels {
        return BranchLabels {
            heads: head_labels,
            remotes: remotes.iter().collect(),
        };
    }

    let head_lookup: HashMap<&str, usize> = heads
        .iter()
        .enumerate()
        .map(|(ix, name)| (name.as_str(), ix))
        .collect();

    let mut remaining = Vec::new();
    for remote_branch in remotes {
        let matching_head = remote_branch.remote.as_deref().and_then(|remote| {
            let branch = remote_branch
                .name
                .strip_prefix(remote)?
                .strip_prefix('/')?;
            Some((remote, *head_lookup.get(branch)?))
        });

        match matching_head {
            Some((remote, ix)) => head_labels[ix].remotes.push(remote.to_string()),
            None => remaining.push(remote_branch),
        }
    }

    BranchLabels {
        heads: head_labels,
        remotes: remaining,
    }
}

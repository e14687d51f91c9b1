//! Decides which commits are drawn de-emphasized.

use crate::{graph::CommitGraph, settings::MuteSettings};

/// Returns one flag per commit, `true` for commits that should be muted.
///
/// `current` is the row the view treats as "here" (the uncommitted changes
/// row when present, otherwise the checked-out commit). When it is outside
/// the window no commit is muted for not being its ancestor.
pub fn muted_commits(
    graph: &CommitGraph,
    current: Option<usize>,
    settings: &MuteSettings,
) -> Vec<bool> {
    let mut muted = vec![false; graph.len()];

    if settings.merge_commits {
        for (row, muted) in muted.iter_mut().enumerate() {
            *muted = graph.is_merge(row);
        }
    }

    if settings.commits_not_ancestors_of_head
        && let Some(current) = current.filter(|&row| row < graph.len())
    {
        let ancestors = ancestors_of(graph, current);
        for (muted, is_ancestor) in muted.iter_mut().zip(ancestors) {
            *muted |= !is_ancestor;
        }
    }

    muted
}

/// Marks `start` and every commit reachable from it through loaded parents.
pub fn ancestors_of(graph: &CommitGraph, start: usize) -> Vec<bool> {
    let mut reached = vec![false; graph.len()];
    let mut stack = vec![start];

    while let Some(row) = stack.pop() {
        let Some(seen) = reached.get_mut(row) else {
            continue;
        };
        if *seen {
            continue;
        }
        *seen = true;
        stack.extend(graph.loaded_parents(row).filter(|&parent| !reached[parent]));
    }

    reached
}

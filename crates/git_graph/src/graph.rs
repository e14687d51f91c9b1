use std::{collections::BTreeSet, num::NonZeroUsize, ops::Range};

use itertools::Itertools as _;
use smallvec::{SmallVec, smallvec};

use crate::commit::{Commit, CommitLookup};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// A parent loaded in the current window, by row.
    Loaded(usize),
    /// A parent further down the history than the window reaches.
    BeyondWindow,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct GraphOptions {
    pub only_follow_first_parent: bool,
    /// Keep edges to parents outside the window, running them off the bottom.
    pub more_commits_available: bool,
}

/// Index-based DAG over the loaded commit window.
#[derive(Clone, Debug, Default)]
pub struct CommitGraph {
    parents: Vec<SmallVec<[ParentRef; 2]>>,
    effective_parent_counts: Vec<usize>,
    uncommitted: Option<usize>,
    head: Option<usize>,
    clipped_parents: usize,
}

impl CommitGraph {
    pub fn build(
        commits: &[Commit],
        head: Option<&str>,
        lookup: &CommitLookup,
        options: GraphOptions,
    ) -> Self {
        let mut clipped_parents = 0;
        let mut parents = Vec::with_capacity(commits.len());
        let mut effective_parent_counts = Vec::with_capacity(commits.len());

        for (row, commit) in commits.iter().enumerate() {
            let effective = if options.only_follow_first_parent {
                &commit.parents[..commit.parents.len().min(1)]
            } else {
                &commit.parents[..]
            };
            effective_parent_counts.push(effective.len());

            let mut resolved = SmallVec::new();
            for parent in effective {
                match lookup.get(parent) {
                    Some(parent_row)
                        if parent_row > row
                            && commits
                                .get(parent_row)
                                .is_some_and(|candidate| &candidate.hash == parent) =>
                    {
                        resolved.push(ParentRef::Loaded(parent_row));
                    }
                    Some(parent_row) => {
                        log::warn!(
                            "ignoring lookup entry {parent_row} for parent {parent} of commit {}",
                            commit.hash
                        );
                        clipped_parents += 1;
                    }
                    None if options.more_commits_available => {
                        resolved.push(ParentRef::BeyondWindow);
                    }
                    None => clipped_parents += 1,
                }
            }
            parents.push(resolved);
        }

        if clipped_parents > 0 {
            log::debug!("clipped {clipped_parents} parent edges at the window boundary");
        }

        CommitGraph {
            parents,
            effective_parent_counts,
            uncommitted: commits
                .first()
                .filter(|commit| commit.is_uncommitted())
                .map(|_| 0),
            head: head.and_then(|head| lookup.resolve(head, commits)),
            clipped_parents,
        }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Parents that survived clipping, main parent first.
    pub fn parents(&self, row: usize) -> &[ParentRef] {
        self.parents
            .get(row)
            .map(|parents| parents.as_slice())
            .unwrap_or_default()
    }

    pub fn loaded_parents(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.parents(row).iter().filter_map(|parent| match parent {
            ParentRef::Loaded(parent_row) => Some(*parent_row),
            ParentRef::BeyondWindow => None,
        })
    }

    /// Whether the commit has more than one parent, counting parents outside the window.
    pub fn is_merge(&self, row: usize) -> bool {
        self.effective_parent_counts
            .get(row)
            .is_some_and(|count| *count > 1)
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }

    pub fn uncommitted(&self) -> Option<usize> {
        self.uncommitted
    }

    pub fn clipped_parents(&self) -> usize {
        self.clipped_parents
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct BranchColor(usize);

/// Hands out palette colors, one per lane allocation.
#[derive(Debug)]
struct BranchColors {
    next: usize,
    palette_size: NonZeroUsize,
}

impl BranchColors {
    fn new(palette_size: NonZeroUsize) -> Self {
        BranchColors {
            next: 0,
            palette_size,
        }
    }

    fn next_color(&mut self) -> BranchColor {
        let color = BranchColor(self.next % self.palette_size.get());
        self.next += 1;
        color
    }
}

#[derive(Debug)]
enum LaneState {
    Empty,
    Active {
        child: usize,
        parent: ParentRef,
        color: BranchColor,
        starting_row: usize,
        starting_lane: usize,
        uncommitted: bool,
    },
}

impl LaneState {
    fn to_commit_line(
        &mut self,
        track_lane: usize,
        ending_row: usize,
        ending_lane: usize,
    ) -> Option<CommitLine> {
        let state = std::mem::replace(self, LaneState::Empty);

        match state {
            LaneState::Active {
                child,
                parent,
                color,
                starting_row,
                starting_lane,
                uncommitted,
            } => Some(CommitLine {
                child,
                parent,
                child_lane: starting_lane,
                track_lane,
                parent_lane: ending_lane,
                full_interval: starting_row..ending_row,
                color_idx: color.0,
                uncommitted,
                segments: route_segments(
                    starting_row,
                    starting_lane,
                    track_lane,
                    ending_row,
                    ending_lane,
                ),
            }),
            LaneState::Empty => None,
        }
    }

    fn color(&self) -> Option<BranchColor> {
        match self {
            LaneState::Active { color, .. } => Some(*color),
            LaneState::Empty => None,
        }
    }

    fn is_active(&self) -> bool {
        match self {
            LaneState::Empty => false,
            LaneState::Active { .. } => true,
        }
    }
}

/// Lays out the route of an edge that leaves `starting_lane` on `starting_row`,
/// travels down `track_lane` and arrives at `ending_lane` on `ending_row`.
fn route_segments(
    starting_row: usize,
    starting_lane: usize,
    track_lane: usize,
    ending_row: usize,
    ending_lane: usize,
) -> SmallVec<[CommitLineSegment; 3]> {
    if ending_row == starting_row + 1 {
        if starting_lane == ending_lane {
            return smallvec![CommitLineSegment::Straight { to_row: ending_row }];
        }
        let curve_kind = if track_lane == starting_lane {
            CurveKind::Checkout
        } else {
            CurveKind::Merge
        };
        return smallvec![CommitLineSegment::Curve {
            to_lane: ending_lane,
            on_row: ending_row,
            curve_kind,
        }];
    }

    let mut segments = SmallVec::new();
    let mut current_row = starting_row;
    if track_lane != starting_lane {
        current_row += 1;
        segments.push(CommitLineSegment::Curve {
            to_lane: track_lane,
            on_row: current_row,
            curve_kind: CurveKind::Merge,
        });
    }

    if track_lane == ending_lane {
        segments.push(CommitLineSegment::Straight { to_row: ending_row });
    } else {
        if ending_row - 1 > current_row {
            segments.push(CommitLineSegment::Straight {
                to_row: ending_row - 1,
            });
        }
        segments.push(CommitLineSegment::Curve {
            to_lane: ending_lane,
            on_row: ending_row,
            curve_kind: CurveKind::Checkout,
        });
    }
    segments
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CommitVertex {
    pub lane: usize,
    pub color_idx: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CurveKind {
    /// Branching out of a vertex into another lane.
    Merge,
    /// Converging from a lane into a vertex.
    Checkout,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommitLineSegment {
    Straight {
        to_row: usize,
    },
    /// Moves to `to_lane` between `on_row - 1` and `on_row`.
    Curve {
        to_lane: usize,
        on_row: usize,
        curve_kind: CurveKind,
    },
}

/// The edge from a commit to one of its parents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitLine {
    pub child: usize,
    pub parent: ParentRef,
    pub child_lane: usize,
    /// The lane held open for this edge between its endpoints.
    pub track_lane: usize,
    pub parent_lane: usize,
    pub full_interval: Range<usize>,
    pub color_idx: usize,
    /// Whether the edge leaves the uncommitted changes row.
    pub uncommitted: bool,
    pub segments: SmallVec<[CommitLineSegment; 3]>,
}

impl CommitLine {
    /// The lanes this edge passes through, in order.
    pub fn lane_path(&self) -> SmallVec<[usize; 3]> {
        std::iter::once(self.child_lane)
            .chain(self.segments.iter().filter_map(|segment| match segment {
                CommitLineSegment::Curve { to_lane, .. } => Some(*to_lane),
                CommitLineSegment::Straight { .. } => None,
            }))
            .dedup()
            .collect()
    }
}

/// Lane and color assignment for one load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaneLayout {
    pub vertices: Vec<CommitVertex>,
    pub lines: Vec<CommitLine>,
    /// Highest lane index in use on each row.
    pub row_extents: Vec<usize>,
    pub max_lanes: usize,
}

pub struct LaneAllocator {
    lane_states: SmallVec<[LaneState; 8]>,
    free_lanes: BTreeSet<usize>,
    awaiting: Vec<SmallVec<[usize; 2]>>,
    awaiting_beyond_window: SmallVec<[usize; 2]>,
    colors: BranchColors,
}

impl LaneAllocator {
    fn new(commit_count: usize, palette_size: NonZeroUsize) -> Self {
        LaneAllocator {
            lane_states: SmallVec::default(),
            free_lanes: BTreeSet::default(),
            awaiting: vec![SmallVec::new(); commit_count],
            awaiting_beyond_window: SmallVec::new(),
            colors: BranchColors::new(palette_size),
        }
    }

    pub fn allocate(graph: &CommitGraph, palette_size: NonZeroUsize) -> LaneLayout {
        let mut allocator = LaneAllocator::new(graph.len(), palette_size);
        let mut layout = LaneLayout {
            vertices: Vec::with_capacity(graph.len()),
            ..LaneLayout::default()
        };

        for row in 0..graph.len() {
            allocator.place_commit(graph, row, &mut layout);
        }

        let window_end = graph.len();
        let awaiting_beyond_window = std::mem::take(&mut allocator.awaiting_beyond_window);
        for lane in awaiting_beyond_window {
            if let Some(line) = allocator.lane_states[lane].to_commit_line(lane, window_end, lane)
            {
                layout.lines.push(line);
            }
        }

        log::debug!(
            "allocated {} lanes for {} commits and {} edges",
            layout.max_lanes,
            graph.len(),
            layout.lines.len()
        );
        layout
    }

    fn first_empty_lane_idx(&mut self) -> usize {
        self.free_lanes.pop_first().unwrap_or_else(|| {
            self.lane_states.push(LaneState::Empty);
            self.lane_states.len() - 1
        })
    }

    fn open_lane(&mut self) -> (usize, BranchColor) {
        let lane = self.first_empty_lane_idx();
        (lane, self.colors.next_color())
    }

    fn retire(&mut self, lane: usize) {
        self.lane_states[lane] = LaneState::Empty;
        self.free_lanes.insert(lane);
    }

    fn await_parent(&mut self, parent: ParentRef, lane: usize) {
        match parent {
            ParentRef::Loaded(parent_row) => self.awaiting[parent_row].push(lane),
            ParentRef::BeyondWindow => self.awaiting_beyond_window.push(lane),
        }
    }

    fn place_commit(&mut self, graph: &CommitGraph, row: usize, layout: &mut LaneLayout) {
        let mut converging = std::mem::take(&mut self.awaiting[row]);
        converging.sort_unstable();

        let passing_extent = self
            .lane_states
            .iter()
            .enumerate()
            .filter(|(lane, state)| state.is_active() && !converging.contains(lane))
            .map(|(lane, _)| lane)
            .max();

        let (commit_lane, commit_color) = match converging
            .first()
            .and_then(|&lane| Some((lane, self.lane_states[lane].color()?)))
        {
            Some(existing) => existing,
            None => self.open_lane(),
        };

        for &lane in &converging {
            if let Some(line) = self.lane_states[lane].to_commit_line(lane, row, commit_lane) {
                layout.lines.push(line);
            }
            if lane != commit_lane {
                self.retire(lane);
            }
        }

        layout.vertices.push(CommitVertex {
            lane: commit_lane,
            color_idx: commit_color.0,
        });
        layout
            .row_extents
            .push(passing_extent.map_or(commit_lane, |extent| extent.max(commit_lane)));

        let uncommitted = graph.uncommitted() == Some(row);
        let mut parents = graph.parents(row).iter().copied();
        match parents.next() {
            Some(parent) => {
                self.lane_states[commit_lane] = LaneState::Active {
                    child: row,
                    parent,
                    color: commit_color,
                    starting_row: row,
                    starting_lane: commit_lane,
                    uncommitted,
                };
                self.await_parent(parent, commit_lane);
            }
            None => self.retire(commit_lane),
        }

        for parent in parents {
            let (parent_lane, parent_color) = self.open_lane();
            self.lane_states[parent_lane] = LaneState::Active {
                child: row,
                parent,
                color: parent_color,
                starting_row: row,
                starting_lane: commit_lane,
                uncommitted,
            };
            self.await_parent(parent, parent_lane);
        }

        layout.max_lanes = layout.max_lanes.max(self.lane_states.len());
    }
}

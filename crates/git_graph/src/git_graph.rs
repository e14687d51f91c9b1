mod color;
pub mod commit;
pub mod graph;
pub mod graph_rendering;
pub mod layout;
pub mod mute;
pub mod ref_labels;
pub mod settings;
mod svg;

#[cfg(test)]
mod git_graph_tests;

use std::num::NonZeroUsize;

use anyhow::{Context as _, Result};

pub use color::Rgba;
pub use commit::{
    Commit, CommitLookup, CommitRemote, CommitStash, CommitTag, UNCOMMITTED, abbrev_commit,
};
pub use graph::{CommitGraph, GraphOptions, LaneAllocator, LaneLayout};
pub use graph_rendering::{
    DrawSurface, EdgePath, PathCommand, Point, RenderedGraph, VertexShape, VertexStyle,
};
pub use layout::{Expansion, GridLayout};
pub use ref_labels::{BranchLabels, HeadLabel, branch_labels};
pub use settings::{
    EdgeStyle, GitGraphSettings, GraphSettings, GridSettings, MuteSettings,
    ReferenceLabelSettings, UncommittedChangesStyle,
};
pub use svg::SvgSurface;

use graph_rendering::GraphStyle;

/// Layout engine for one commit graph view.
///
/// Owns the loaded window of commits and the lane layout derived from it.
/// Loading recomputes lanes and colors; rendering only recomputes pixel
/// geometry, so expanding a row never moves a commit to another lane.
pub struct GitGraph {
    surface_id: String,
    settings: GraphSettings,
    palette: Vec<Rgba>,
    palette_size: NonZeroUsize,
    mute: MuteSettings,
    more_commits_available: bool,
    commits: Vec<Commit>,
    lookup: CommitLookup,
    head: Option<String>,
    graph: CommitGraph,
    lanes: LaneLayout,
    rendered: RenderedGraph,
}

impl GitGraph {
    pub fn new(
        surface_id: impl Into<String>,
        settings: GraphSettings,
        mute: MuteSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let palette = settings.palette()?;
        let palette_size = NonZeroUsize::new(palette.len())
            .context("Invalid colors: the graph palette must contain at least one color.")?;

        Ok(GitGraph {
            surface_id: surface_id.into(),
            settings,
            palette,
            palette_size,
            mute,
            more_commits_available: false,
            commits: Vec::new(),
            lookup: CommitLookup::default(),
            head: None,
            graph: CommitGraph::default(),
            lanes: LaneLayout::default(),
            rendered: RenderedGraph::default(),
        })
    }

    pub fn from_settings(surface_id: impl Into<String>, settings: &GitGraphSettings) -> Result<Self> {
        Self::new(surface_id, settings.graph.clone(), settings.mute)
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn palette(&self) -> &[Rgba] {
        &self.palette
    }

    /// Takes effect on the next [`GitGraph::load_commits`].
    pub fn set_more_commits_available(&mut self, more_commits_available: bool) {
        self.more_commits_available = more_commits_available;
    }

    /// Replaces the loaded window and recomputes lanes and colors from scratch.
    ///
    /// `lookup` maps hashes to rows in `commits`. Entries that disagree with
    /// `commits` are ignored.
    pub fn load_commits(
        &mut self,
        commits: Vec<Commit>,
        head: Option<&str>,
        lookup: &CommitLookup,
        only_follow_first_parent: bool,
    ) {
        let options = GraphOptions {
            only_follow_first_parent,
            more_commits_available: self.more_commits_available,
        };
        self.graph = CommitGraph::build(&commits, head, lookup, options);
        self.lanes = LaneAllocator::allocate(&self.graph, self.palette_size);
        self.commits = commits;
        self.lookup = lookup.clone();
        self.head = head.map(str::to_string);

        log::debug!(
            "loaded {} commits into {} ({} lanes)",
            self.commits.len(),
            self.surface_id,
            self.lanes.max_lanes
        );

        self.render(None);
    }

    /// Recomputes pixel geometry, leaving room for `expansion` if given.
    pub fn render(&mut self, expansion: Option<Expansion>) {
        let grid = GridLayout::new(self.settings.grid, self.graph.len(), expansion);
        let style = GraphStyle {
            edge_style: self.settings.style,
            uncommitted_changes: self.settings.uncommitted_changes,
        };
        self.rendered = graph_rendering::render_graph(
            &self.lanes,
            &grid,
            &style,
            self.graph.head(),
            self.graph.uncommitted(),
        );
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }

    pub fn lanes(&self) -> &LaneLayout {
        &self.lanes
    }

    pub fn rendered(&self) -> &RenderedGraph {
        &self.rendered
    }

    pub fn vertex_colors(&self) -> Vec<usize> {
        self.lanes
            .vertices
            .iter()
            .map(|vertex| vertex.color_idx)
            .collect()
    }

    pub fn widths_at_vertices(&self) -> Vec<f32> {
        layout::widths_at_vertices(&self.lanes.row_extents, self.settings.grid.lane_spacing)
    }

    /// Per-row widths for positioning branch labels, empty unless they are
    /// aligned to the graph.
    pub fn widths_for_labels(&self, settings: &ReferenceLabelSettings) -> Vec<f32> {
        if settings.branch_labels_aligned_to_graph {
            self.widths_at_vertices()
        } else {
            Vec::new()
        }
    }

    pub fn muted_commits(&self, current_hash: Option<&str>) -> Vec<bool> {
        let current = current_hash.and_then(|hash| self.lookup.resolve(hash, &self.commits));
        if current_hash.is_some() && current.is_none() {
            log::debug!("current commit {current_hash:?} is not in the loaded window");
        }
        mute::muted_commits(&self.graph, current, &self.mute)
    }

    /// The uncommitted changes row if there is one, otherwise the checked-out commit.
    pub fn current_hash(&self) -> Option<&str> {
        match self.graph.uncommitted() {
            Some(_) => Some(UNCOMMITTED),
            None => self.head.as_deref(),
        }
    }

    pub fn commit_index(&self, hash: &str) -> Option<usize> {
        self.lookup.resolve(hash, &self.commits)
    }

    /// Orders two loaded commits as `(from, to)`, `from` being the older one.
    pub fn commit_order<'a>(&self, a: &'a str, b: &'a str) -> Option<(&'a str, &'a str)> {
        let a_ix = self.commit_index(a)?;
        let b_ix = self.commit_index(b)?;
        if a_ix > b_ix {
            Some((a, b))
        } else {
            Some((b, a))
        }
    }

    pub fn paint(&self, surface: &mut dyn DrawSurface) {
        self.rendered.paint(surface);
    }

    pub fn to_svg(&self) -> String {
        let mut surface = SvgSurface::new(&self.palette);
        self.paint(&mut surface);
        surface.finish(&self.surface_id, self.rendered.width, self.rendered.height)
    }
}

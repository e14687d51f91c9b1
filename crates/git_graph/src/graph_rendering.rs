use smallvec::SmallVec;

use crate::{
    graph::{CommitLine, CommitLineSegment, CurveKind, LaneLayout},
    layout::GridLayout,
    settings::{EdgeStyle, UncommittedChangesStyle},
};

pub const LINE_WIDTH: f32 = 2.;
pub const COMMIT_CIRCLE_RADIUS: f32 = 4.;
pub const COMMIT_CIRCLE_STROKE_WIDTH: f32 = 1.5;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

pub const fn point(x: f32, y: f32) -> Point {
    Point { x, y }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic curve through `control`.
    CurveTo { to: Point, control: Point },
}

/// A stroked connector between a commit and one of its parents.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgePath {
    pub color_idx: usize,
    pub uncommitted: bool,
    pub commands: SmallVec<[PathCommand; 8]>,
}

impl EdgePath {
    fn new(color_idx: usize, uncommitted: bool, start: Point) -> Self {
        let mut commands = SmallVec::new();
        commands.push(PathCommand::MoveTo(start));
        EdgePath {
            color_idx,
            uncommitted,
            commands,
        }
    }

    fn line_to(&mut self, to: Point) {
        self.commands.push(PathCommand::LineTo(to));
    }

    fn curve_to(&mut self, to: Point, control: Point) {
        self.commands.push(PathCommand::CurveTo { to, control });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexStyle {
    Filled,
    OpenCircle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexShape {
    pub row: usize,
    pub center: Point,
    pub radius: f32,
    pub color_idx: usize,
    pub style: VertexStyle,
}

/// The minimal drawing capability the graph needs from a rendering backend.
pub trait DrawSurface {
    fn draw_edge(&mut self, edge: &EdgePath);
    fn draw_vertex(&mut self, vertex: &VertexShape);
}

/// Pixel geometry for a loaded graph, recomputed on every render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedGraph {
    pub edges: Vec<EdgePath>,
    pub vertices: Vec<VertexShape>,
    pub width: f32,
    pub height: f32,
}

impl RenderedGraph {
    /// Edges first, so commit circles sit on top of them.
    pub fn paint(&self, surface: &mut dyn DrawSurface) {
        for edge in &self.edges {
            surface.draw_edge(edge);
        }
        for vertex in &self.vertices {
            surface.draw_vertex(vertex);
        }
    }
}

pub struct GraphStyle {
    pub edge_style: EdgeStyle,
    pub uncommitted_changes: UncommittedChangesStyle,
}

pub fn render_graph(
    lanes: &LaneLayout,
    grid: &GridLayout,
    style: &GraphStyle,
    head: Option<usize>,
    uncommitted: Option<usize>,
) -> RenderedGraph {
    let open_circle_row = match style.uncommitted_changes {
        UncommittedChangesStyle::OpenCircleAtTheUncommittedChanges => uncommitted,
        UncommittedChangesStyle::OpenCircleAtTheCheckedOutCommit => uncommitted.and(head),
    };

    let vertices = lanes
        .vertices
        .iter()
        .enumerate()
        .map(|(row, vertex)| VertexShape {
            row,
            center: point(grid.lane_x(vertex.lane), grid.row_y(row)),
            radius: COMMIT_CIRCLE_RADIUS,
            color_idx: vertex.color_idx,
            style: if open_circle_row == Some(row) {
                VertexStyle::OpenCircle
            } else {
                VertexStyle::Filled
            },
        })
        .collect();

    let edges = lanes
        .lines
        .iter()
        .map(|line| edge_path(line, grid, style.edge_style))
        .collect();

    RenderedGraph {
        edges,
        vertices,
        width: grid.graph_width(lanes.max_lanes),
        height: grid.graph_height(),
    }
}

fn edge_path(line: &CommitLine, grid: &GridLayout, edge_style: EdgeStyle) -> EdgePath {
    let mut current = point(
        grid.lane_x(line.child_lane),
        grid.row_y(line.full_interval.start),
    );
    let mut path = EdgePath::new(line.color_idx, line.uncommitted, current);

    for segment in &line.segments {
        match segment {
            CommitLineSegment::Straight { to_row } => {
                current = point(current.x, grid.row_y(*to_row));
                path.line_to(current);
            }
            CommitLineSegment::Curve {
                to_lane,
                on_row,
                curve_kind,
            } => {
                let to = point(grid.lane_x(*to_lane), grid.row_y(*on_row));
                draw_bend(&mut path, current, to, *curve_kind, grid, edge_style);
                current = to;
            }
        }
    }

    path
}

/// Draws an elbow from `from` to `to`, turning at the row midpoint.
///
/// A branch-out turns half a row below the child and a checkout half a row
/// above the parent, so an expanded panel between the rows stretches the
/// straight part rather than the turn.
fn draw_bend(
    path: &mut EdgePath,
    from: Point,
    to: Point,
    curve_kind: CurveKind,
    grid: &GridLayout,
    edge_style: EdgeStyle,
) {
    let half_row = grid.row_spacing() / 2.;
    let turn_y = match curve_kind {
        CurveKind::Merge => from.y + half_row,
        CurveKind::Checkout => to.y - half_row,
    }
    .clamp(from.y, to.y);

    match edge_style {
        EdgeStyle::Angular => {
            path.line_to(point(from.x, turn_y));
            path.line_to(point(to.x, turn_y));
            path.line_to(to);
        }
        EdgeStyle::Rounded { corner_radius } => {
            let radius = corner_radius
                .min((to.x - from.x).abs() / 2.)
                .min(turn_y - from.y)
                .min(to.y - turn_y)
                .max(0.);
            let direction = (to.x - from.x).signum();

            path.line_to(point(from.x, turn_y - radius));
            path.curve_to(
                point(from.x + direction * radius, turn_y),
                point(from.x, turn_y),
            );
            path.line_to(point(to.x - direction * radius, turn_y));
            path.curve_to(point(to.x, turn_y + radius), point(to.x, turn_y));
            path.line_to(to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commit::{Commit, CommitLookup},
        graph::{CommitGraph, GraphOptions, LaneAllocator},
        layout::Expansion,
        settings::GridSettings,
    };
    use pretty_assertions::assert_eq;
    use std::num::NonZeroUsize;

    use super::PathCommand::*;

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<String>,
    }

    impl DrawSurface for RecordingSurface {
        fn draw_edge(&mut self, edge: &EdgePath) {
            self.calls.push(format!(
                "edge {} ({} cmds)",
                edge.color_idx,
                edge.commands.len()
            ));
        }

        fn draw_vertex(&mut self, vertex: &VertexShape) {
            self.calls.push(format!("vertex {}", vertex.row));
        }
    }

    fn lanes_for(commits: &[Commit]) -> (CommitGraph, LaneLayout) {
        let lookup = CommitLookup::from_commits(commits);
        let graph = CommitGraph::build(
            commits,
            Some(commits[0].hash.as_str()),
            &lookup,
            GraphOptions::default(),
        );
        let lanes = LaneAllocator::allocate(&graph, NonZeroUsize::new(12).unwrap());
        (graph, lanes)
    }

    fn merge_history() -> Vec<Commit> {
        vec![
            Commit::new("m", ["b", "f"]),
            Commit::new("f", ["a"]),
            Commit::new("b", ["a"]),
            Commit::new("a", Vec::<String>::new()),
        ]
    }

    fn style(edge_style: EdgeStyle) -> GraphStyle {
        GraphStyle {
            edge_style,
            uncommitted_changes: UncommittedChangesStyle::OpenCircleAtTheUncommittedChanges,
        }
    }

    #[test]
    fn test_same_lane_edges_are_straight() {
        let commits = vec![
            Commit::new("b", ["a"]),
            Commit::new("a", Vec::<String>::new()),
        ];
        let (graph, lanes) = lanes_for(&commits);
        let grid = GridLayout::new(GridSettings::default(), graph.len(), None);
        let rendered = render_graph(&lanes, &grid, &style(EdgeStyle::Angular), None, None);

        assert_eq!(
            rendered.edges[0].commands.as_slice(),
            [MoveTo(point(16., 12.)), LineTo(point(16., 36.))]
        );
        assert_eq!(rendered.vertices[1].center, point(16., 36.));
        assert_eq!(rendered.vertices[1].style, VertexStyle::Filled);
    }

    #[test]
    fn test_angular_bends_turn_at_row_midpoint() {
        let (graph, lanes) = lanes_for(&merge_history());
        let grid = GridLayout::new(GridSettings::default(), graph.len(), None);
        let rendered = render_graph(&lanes, &grid, &style(EdgeStyle::Angular), None, None);

        let merge_edge = lanes
            .lines
            .iter()
            .position(|line| line.child == 0 && line.child_lane != line.parent_lane)
            .unwrap();
        assert_eq!(
            rendered.edges[merge_edge].commands.as_slice(),
            [
                MoveTo(point(16., 12.)),
                LineTo(point(16., 24.)),
                LineTo(point(32., 24.)),
                LineTo(point(32., 36.)),
            ]
        );

        let checkout_edge = lanes
            .lines
            .iter()
            .position(|line| line.child == 1)
            .unwrap();
        assert_eq!(
            rendered.edges[checkout_edge].commands.as_slice(),
            [
                MoveTo(point(32., 36.)),
                LineTo(point(32., 60.)),
                LineTo(point(32., 72.)),
                LineTo(point(16., 72.)),
                LineTo(point(16., 84.)),
            ]
        );
    }

    #[test]
    fn test_rounded_bends_use_clamped_corner_radius() {
        let (graph, lanes) = lanes_for(&merge_history());
        let grid = GridLayout::new(GridSettings::default(), graph.len(), None);
        let rendered = render_graph(
            &lanes,
            &grid,
            &style(EdgeStyle::Rounded {
                corner_radius: 100.,
            }),
            None,
            None,
        );

        let merge_edge = lanes
            .lines
            .iter()
            .position(|line| line.child == 0 && line.child_lane != line.parent_lane)
            .unwrap();
        // Half the lane distance (8) is the tightest limit.
        assert_eq!(
            rendered.edges[merge_edge].commands.as_slice(),
            [
                MoveTo(point(16., 12.)),
                LineTo(point(16., 16.)),
                CurveTo {
                    to: point(24., 24.),
                    control: point(16., 24.)
                },
                LineTo(point(24., 24.)),
                CurveTo {
                    to: point(32., 32.),
                    control: point(32., 24.)
                },
                LineTo(point(32., 36.)),
            ]
        );
    }

    #[test]
    fn test_expansion_moves_geometry_without_relayout() {
        let (graph, lanes) = lanes_for(&merge_history());
        let style = style(EdgeStyle::Angular);
        let collapsed = render_graph(
            &lanes,
            &GridLayout::new(GridSettings::default(), graph.len(), None),
            &style,
            None,
            None,
        );
        let expanded = render_graph(
            &lanes,
            &GridLayout::new(
                GridSettings::default(),
                graph.len(),
                Some(Expansion {
                    row_index: 1,
                    height: Some(100.),
                }),
            ),
            &style,
            None,
            None,
        );

        assert_eq!(expanded.vertices[1].center, collapsed.vertices[1].center);
        assert_eq!(
            expanded.vertices[2].center.y,
            collapsed.vertices[2].center.y + 100.
        );
        assert_eq!(expanded.height, collapsed.height + 100.);
        assert_eq!(expanded.edges.len(), collapsed.edges.len());
    }

    #[test]
    fn test_uncommitted_circle_placement() {
        let commits = vec![
            Commit::uncommitted("b"),
            Commit::new("b", ["a"]),
            Commit::new("a", Vec::<String>::new()),
        ];
        let (graph, lanes) = lanes_for(&commits);
        let grid = GridLayout::new(GridSettings::default(), graph.len(), None);
        let head = Some(1);

        let at_changes = render_graph(
            &lanes,
            &grid,
            &style(EdgeStyle::Angular),
            head,
            graph.uncommitted(),
        );
        let styles: Vec<_> = at_changes.vertices.iter().map(|v| v.style).collect();
        assert_eq!(
            styles,
            vec![
                VertexStyle::OpenCircle,
                VertexStyle::Filled,
                VertexStyle::Filled
            ]
        );
        assert!(at_changes.edges[0].uncommitted);
        assert!(!at_changes.edges[1].uncommitted);

        let at_checkout = render_graph(
            &lanes,
            &grid,
            &GraphStyle {
                edge_style: EdgeStyle::Angular,
                uncommitted_changes: UncommittedChangesStyle::OpenCircleAtTheCheckedOutCommit,
            },
            head,
            graph.uncommitted(),
        );
        let styles: Vec<_> = at_checkout.vertices.iter().map(|v| v.style).collect();
        assert_eq!(
            styles,
            vec![
                VertexStyle::Filled,
                VertexStyle::OpenCircle,
                VertexStyle::Filled
            ]
        );

        // Without uncommitted changes nothing is drawn open.
        let (graph, lanes) = lanes_for(&commits[1..]);
        let grid = GridLayout::new(GridSettings::default(), graph.len(), None);
        let clean = render_graph(&lanes, &grid, &style(EdgeStyle::Angular), Some(0), None);
        assert!(
            clean
                .vertices
                .iter()
                .all(|vertex| vertex.style == VertexStyle::Filled)
        );
    }

    #[test]
    fn test_paint_draws_edges_before_vertices() {
        let commits = vec![
            Commit::new("b", ["a"]),
            Commit::new("a", Vec::<String>::new()),
        ];
        let (graph, lanes) = lanes_for(&commits);
        let grid = GridLayout::new(GridSettings::default(), graph.len(), None);
        let rendered = render_graph(&lanes, &grid, &style(EdgeStyle::Angular), None, None);

        let mut surface = RecordingSurface::default();
        rendered.paint(&mut surface);
        assert_eq!(
            surface.calls,
            vec!["edge 0 (2 cmds)", "vertex 0", "vertex 1"]
        );
    }
}

//! Writes a rendered graph out as a standalone SVG document.

use std::fmt::Write as _;

use crate::{
    color::Rgba,
    graph_rendering::{
        COMMIT_CIRCLE_STROKE_WIDTH, DrawSurface, EdgePath, LINE_WIDTH, PathCommand, VertexShape,
        VertexStyle,
    },
};

const UNCOMMITTED_DASH_ARRAY: &str = "2";
const FALLBACK_COLOR: Rgba = Rgba::rgb(0x808080);

pub struct SvgSurface<'a> {
    palette: &'a [Rgba],
    edges: String,
    vertices: String,
}

impl<'a> SvgSurface<'a> {
    pub fn new(palette: &'a [Rgba]) -> Self {
        SvgSurface {
            palette,
            edges: String::new(),
            vertices: String::new(),
        }
    }

    fn color(&self, color_idx: usize) -> Rgba {
        if self.palette.is_empty() {
            return FALLBACK_COLOR;
        }
        self.palette[color_idx % self.palette.len()]
    }

    pub fn finish(self, id: &str, width: f32, height: f32) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"{}\" width=\"{width}\" height=\"{height}\"><g>{}</g><g>{}</g></svg>",
            escape_attribute(id),
            self.edges,
            self.vertices
        )
    }
}

impl DrawSurface for SvgSurface<'_> {
    fn draw_edge(&mut self, edge: &EdgePath) {
        let mut d = String::new();
        for command in &edge.commands {
            if !d.is_empty() {
                d.push(' ');
            }
            match command {
                PathCommand::MoveTo(to) => write!(d, "M{} {}", to.x, to.y).ok(),
                PathCommand::LineTo(to) => write!(d, "L{} {}", to.x, to.y).ok(),
                PathCommand::CurveTo { to, control } => {
                    write!(d, "Q{} {} {} {}", control.x, control.y, to.x, to.y).ok()
                }
            };
        }

        let color = self.color(edge.color_idx);
        write!(
            self.edges,
            "<path d=\"{d}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{LINE_WIDTH}\""
        )
        .ok();
        if edge.uncommitted {
            write!(self.edges, " stroke-dasharray=\"{UNCOMMITTED_DASH_ARRAY}\"").ok();
        }
        self.edges.push_str("/>");
    }

    fn draw_vertex(&mut self, vertex: &VertexShape) {
        let color = self.color(vertex.color_idx);
        let center = vertex.center;
        let paint = match vertex.style {
            VertexStyle::Filled => format!("fill=\"{color}\""),
            VertexStyle::OpenCircle => format!(
                "fill=\"none\" stroke=\"{color}\" stroke-width=\"{COMMIT_CIRCLE_STROKE_WIDTH}\""
            ),
        };
        write!(
            self.vertices,
            "<circle data-row=\"{}\" cx=\"{}\" cy=\"{}\" r=\"{}\" {paint}/>",
            vertex.row, center.x, center.y, vertex.radius
        )
        .ok();
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

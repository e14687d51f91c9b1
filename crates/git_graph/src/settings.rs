use anyhow::{Context as _, Result};
use schemars::JsonSchema;
use serde_derive::{Deserialize, Serialize};

use crate::color::Rgba;

const DEFAULT_COLORS: [&str; 12] = [
    "#0085d9", "#d9008f", "#00d90a", "#d98500", "#a300d9", "#ff0000", "#00d9cc", "#e138e8",
    "#85d900", "#dc5b23", "#6f24d6", "#ffcc00",
];
const DEFAULT_CORNER_RADIUS: f32 = 6.0;

/// Settings for the whole commit graph view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GitGraphSettings {
    pub graph: GraphSettings,
    pub mute: MuteSettings,
    pub reference_labels: ReferenceLabelSettings,
}

impl GitGraphSettings {
    /// Parses settings from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: GitGraphSettings =
            serde_json::from_str(json).context("failed to parse git graph settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.graph.validate()
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(GitGraphSettings)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GraphSettings {
    /// Palette cycled through as branches are allocated lanes.
    ///
    /// Default: twelve colors starting at "#0085d9"
    pub colors: Vec<String>,
    /// How edges that change lanes are drawn.
    ///
    /// Default: rounded
    pub style: EdgeStyle,
    pub grid: GridSettings,
    /// Where the open circle marking uncommitted changes is drawn.
    ///
    /// Default: open_circle_at_the_uncommitted_changes
    pub uncommitted_changes: UncommittedChangesStyle,
}

impl Default for GraphSettings {
    fn default() -> Self {
        GraphSettings {
            colors: DEFAULT_COLORS.iter().map(|color| color.to_string()).collect(),
            style: EdgeStyle::default(),
            grid: GridSettings::default(),
            uncommitted_changes: UncommittedChangesStyle::default(),
        }
    }
}

impl GraphSettings {
    /// Parses the palette. Fails on an empty palette or a malformed entry.
    pub fn palette(&self) -> Result<Vec<Rgba>> {
        if self.colors.is_empty() {
            anyhow::bail!("Invalid colors: the graph palette must contain at least one color.");
        }
        self.colors
            .iter()
            .enumerate()
            .map(|(ix, color)| {
                Rgba::try_from(color.as_str())
                    .with_context(|| format!("invalid graph palette entry {ix}"))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        self.palette()?;
        self.grid.validate()?;
        if let EdgeStyle::Rounded { corner_radius } = self.style
            && !(corner_radius.is_finite() && corner_radius >= 0.)
        {
            anyhow::bail!(
                "Invalid corner_radius: {corner_radius}. It must be a non-negative number."
            );
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeStyle {
    /// Lane changes bend through smooth corners.
    Rounded {
        /// Radius of each corner, in pixels. Shrunk when the bend is too tight.
        #[serde(default = "default_corner_radius")]
        corner_radius: f32,
    },
    /// Lane changes bend through right angles.
    Angular,
}

fn default_corner_radius() -> f32 {
    DEFAULT_CORNER_RADIUS
}

impl Default for EdgeStyle {
    fn default() -> Self {
        EdgeStyle::Rounded {
            corner_radius: DEFAULT_CORNER_RADIUS,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UncommittedChangesStyle {
    #[default]
    OpenCircleAtTheUncommittedChanges,
    OpenCircleAtTheCheckedOutCommit,
}

/// Pixel grid the graph is laid out on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GridSettings {
    /// Horizontal distance between lanes.
    ///
    /// Default: 16
    pub lane_spacing: f32,
    /// Vertical distance between rows.
    ///
    /// Default: 24
    pub row_spacing: f32,
    /// Default: 16
    pub offset_x: f32,
    /// Default: 12
    pub offset_y: f32,
    /// Height of an expanded detail panel when the caller doesn't measure one.
    ///
    /// Default: 250
    pub expansion_height: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings {
            lane_spacing: 16.,
            row_spacing: 24.,
            offset_x: 16.,
            offset_y: 12.,
            expansion_height: 250.,
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("lane_spacing", self.lane_spacing),
            ("row_spacing", self.row_spacing),
        ] {
            if !(value.is_finite() && value > 0.) {
                anyhow::bail!("Invalid {name}: {value}. It must be a positive number.");
            }
        }
        for (name, value) in [("offset_x", self.offset_x), ("offset_y", self.offset_y)] {
            if !value.is_finite() {
                anyhow::bail!("Invalid {name}: {value}. It must be a finite number.");
            }
        }
        if !(self.expansion_height.is_finite() && self.expansion_height >= 0.) {
            anyhow::bail!(
                "Invalid expansion_height: {}. It must be a non-negative number.",
                self.expansion_height
            );
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MuteSettings {
    /// Mute commits that aren't ancestors of the current commit.
    ///
    /// Default: true
    pub commits_not_ancestors_of_head: bool,
    /// Mute commits with more than one parent.
    ///
    /// Default: true
    pub merge_commits: bool,
}

impl Default for MuteSettings {
    fn default() -> Self {
        MuteSettings {
            commits_not_ancestors_of_head: true,
            merge_commits: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReferenceLabelSettings {
    /// Place branch labels next to the graph instead of in the description column.
    ///
    /// Default: false
    pub branch_labels_aligned_to_graph: bool,
    /// Fold `origin/foo` into the label for the local branch `foo`.
    ///
    /// Default: true
    pub combine_local_and_remote_branch_labels: bool,
    /// Default: false
    pub tag_labels_on_right: bool,
}

impl Default for ReferenceLabelSettings {
    fn default() -> Self {
        ReferenceLabelSettings {
            branch_labels_aligned_to_graph: false,
            combine_local_and_remote_branch_labels: true,
            tag_labels_on_right: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let settings = GitGraphSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.graph.palette().unwrap().len(), 12);
        assert_eq!(settings.graph.palette().unwrap()[0], Rgba::rgb(0x0085d9));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings = GitGraphSettings::from_json(
            r##"{
                "graph": {
                    "colors": ["#111111", "#222222"],
                    "style": { "kind": "angular" },
                    "grid": { "row_spacing": 30 }
                },
                "mute": { "merge_commits": false }
            }"##,
        )
        .unwrap();

        assert_eq!(settings.graph.style, EdgeStyle::Angular);
        assert_eq!(
            settings.graph.grid,
            GridSettings {
                row_spacing: 30.,
                ..GridSettings::default()
            }
        );
        assert_eq!(
            settings.mute,
            MuteSettings {
                commits_not_ancestors_of_head: true,
                merge_commits: false,
            }
        );
        assert_eq!(settings.reference_labels, ReferenceLabelSettings::default());

        let rounded = GitGraphSettings::from_json(r#"{ "graph": { "style": { "kind": "rounded" } } }"#)
            .unwrap();
        assert_eq!(rounded.graph.style, EdgeStyle::default());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let err = GitGraphSettings::from_json(r#"{ "graph": { "colors": [] } }"#).unwrap_err();
        assert!(err.to_string().contains("at least one color"));

        assert!(GitGraphSettings::from_json(r#"{ "graph": { "colors": ["blue"] } }"#).is_err());
        assert!(GitGraphSettings::from_json(r#"{ "graph": { "grid": { "lane_spacing": 0 } } }"#).is_err());
        assert!(
            GitGraphSettings::from_json(r#"{ "graph": { "grid": { "expansion_height": -1 } } }"#)
                .is_err()
        );
        assert!(
            GitGraphSettings::from_json(
                r#"{ "graph": { "style": { "kind": "rounded", "corner_radius": -2 } } }"#
            )
            .is_err()
        );
        assert!(GitGraphSettings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_json_schema_describes_settings() {
        let schema = serde_json::to_value(GitGraphSettings::json_schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("graph").is_some());
        assert!(properties.get("mute").is_some());
        assert!(properties.get("reference_labels").is_some());
    }
}

//! Configuration for graph behaviour.
//!
//! [`GraphConfig`] collects the policy switches consulted by the constraint
//! engine and the structural operations. It implements
//! [`serde::Deserialize`] so it can be loaded from TOML; every field falls
//! back to its default when missing.
//!
//! # Example
//!
//! ```
//! # use cellgraph::config::GraphConfig;
//! let config = GraphConfig::from_toml_str(
//!     r#"
//!     allow_negative_coordinates = false
//!
//!     [maximum_graph_bounds]
//!     x = 0.0
//!     y = 0.0
//!     width = 800.0
//!     height = 600.0
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(!config.allow_negative_coordinates());
//! assert!(config.extend_parents());
//! assert_eq!(config.maximum_graph_bounds().map(|b| b.width()), Some(800.0));
//! ```

use std::{fs, path::Path};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use cellgraph_core::geometry::Rect;

use crate::error::{CellGraphError, ConfigError};

/// Policy switches for the graph engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Grow parents whose children exceed their bounds after a resize.
    extend_parents: bool,
    /// Grow parents when children are added to them.
    extend_parents_on_add: bool,
    /// Grow parents instead of constraining children when cells are moved.
    extend_parents_on_move: bool,
    /// Clamp children into their parent's containment area.
    constrain_children: bool,
    /// Also clamp children with relative geometries.
    constrain_relative_children: bool,
    allow_negative_coordinates: bool,
    /// Global region every cell must stay inside, in model units.
    maximum_graph_bounds: Option<Rect>,
    /// Use the view's preferred size for the collapsed bounds.
    collapse_to_preferred_size: bool,
    recursive_resize: bool,
    reset_edges_on_connect: bool,
    reset_edges_on_resize: bool,
    reset_edges_on_move: bool,
    disconnect_on_move: bool,
    allow_dangling_edges: bool,
    clone_invalid_edges: bool,
    ports_enabled: bool,
    /// Snap sizes and values passed to [`Graph::snap`](crate::Graph::snap)
    /// to multiples of `grid_size`.
    grid_enabled: bool,
    grid_size: f64,
    /// Default border around grouped cells.
    border: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            extend_parents: true,
            extend_parents_on_add: true,
            extend_parents_on_move: false,
            constrain_children: true,
            constrain_relative_children: false,
            allow_negative_coordinates: true,
            maximum_graph_bounds: None,
            collapse_to_preferred_size: true,
            recursive_resize: false,
            reset_edges_on_connect: true,
            reset_edges_on_resize: false,
            reset_edges_on_move: false,
            disconnect_on_move: true,
            allow_dangling_edges: true,
            clone_invalid_edges: false,
            ports_enabled: true,
            grid_enabled: true,
            grid_size: 10.0,
            border: 0.0,
        }
    }
}

impl GraphConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Validation`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GraphConfig =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        debug!(config:?; "Parsed graph configuration");
        Ok(config)
    }

    /// Checks value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 0.0 {
            return Err(ConfigError::Validation(format!(
                "grid_size must not be negative, got {}",
                self.grid_size
            )));
        }
        if self.border < 0.0 {
            return Err(ConfigError::Validation(format!(
                "border must not be negative, got {}",
                self.border
            )));
        }
        if let Some(bounds) = self.maximum_graph_bounds {
            if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
                return Err(ConfigError::Validation(
                    "maximum_graph_bounds must have a positive size".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn extend_parents(&self) -> bool {
        self.extend_parents
    }

    pub fn extend_parents_on_add(&self) -> bool {
        self.extend_parents_on_add
    }

    pub fn extend_parents_on_move(&self) -> bool {
        self.extend_parents_on_move
    }

    pub fn constrain_children(&self) -> bool {
        self.constrain_children
    }

    pub fn constrain_relative_children(&self) -> bool {
        self.constrain_relative_children
    }

    pub fn allow_negative_coordinates(&self) -> bool {
        self.allow_negative_coordinates
    }

    pub fn maximum_graph_bounds(&self) -> Option<Rect> {
        self.maximum_graph_bounds
    }

    pub fn collapse_to_preferred_size(&self) -> bool {
        self.collapse_to_preferred_size
    }

    pub fn recursive_resize(&self) -> bool {
        self.recursive_resize
    }

    pub fn reset_edges_on_connect(&self) -> bool {
        self.reset_edges_on_connect
    }

    pub fn reset_edges_on_resize(&self) -> bool {
        self.reset_edges_on_resize
    }

    pub fn reset_edges_on_move(&self) -> bool {
        self.reset_edges_on_move
    }

    pub fn disconnect_on_move(&self) -> bool {
        self.disconnect_on_move
    }

    pub fn allow_dangling_edges(&self) -> bool {
        self.allow_dangling_edges
    }

    pub fn clone_invalid_edges(&self) -> bool {
        self.clone_invalid_edges
    }

    pub fn ports_enabled(&self) -> bool {
        self.ports_enabled
    }

    pub fn grid_enabled(&self) -> bool {
        self.grid_enabled
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn border(&self) -> f64 {
        self.border
    }

    pub fn with_extend_parents(mut self, value: bool) -> Self {
        self.extend_parents = value;
        self
    }

    pub fn with_extend_parents_on_add(mut self, value: bool) -> Self {
        self.extend_parents_on_add = value;
        self
    }

    pub fn with_extend_parents_on_move(mut self, value: bool) -> Self {
        self.extend_parents_on_move = value;
        self
    }

    pub fn with_constrain_children(mut self, value: bool) -> Self {
        self.constrain_children = value;
        self
    }

    pub fn with_constrain_relative_children(mut self, value: bool) -> Self {
        self.constrain_relative_children = value;
        self
    }

    pub fn with_allow_negative_coordinates(mut self, value: bool) -> Self {
        self.allow_negative_coordinates = value;
        self
    }

    pub fn with_maximum_graph_bounds(mut self, bounds: Option<Rect>) -> Self {
        self.maximum_graph_bounds = bounds;
        self
    }

    pub fn with_collapse_to_preferred_size(mut self, value: bool) -> Self {
        self.collapse_to_preferred_size = value;
        self
    }

    pub fn with_recursive_resize(mut self, value: bool) -> Self {
        self.recursive_resize = value;
        self
    }

    pub fn with_reset_edges_on_connect(mut self, value: bool) -> Self {
        self.reset_edges_on_connect = value;
        self
    }

    pub fn with_reset_edges_on_resize(mut self, value: bool) -> Self {
        self.reset_edges_on_resize = value;
        self
    }

    pub fn with_reset_edges_on_move(mut self, value: bool) -> Self {
        self.reset_edges_on_move = value;
        self
    }

    pub fn with_disconnect_on_move(mut self, value: bool) -> Self {
        self.disconnect_on_move = value;
        self
    }

    pub fn with_allow_dangling_edges(mut self, value: bool) -> Self {
        self.allow_dangling_edges = value;
        self
    }

    pub fn with_clone_invalid_edges(mut self, value: bool) -> Self {
        self.clone_invalid_edges = value;
        self
    }

    pub fn with_ports_enabled(mut self, value: bool) -> Self {
        self.ports_enabled = value;
        self
    }

    pub fn with_grid_enabled(mut self, value: bool) -> Self {
        self.grid_enabled = value;
        self
    }

    pub fn with_grid_size(mut self, value: f64) -> Self {
        self.grid_size = value;
        self
    }

    pub fn with_border(mut self, value: f64) -> Self {
        self.border = value;
        self
    }

    pub(crate) fn set_allow_negative_coordinates(&mut self, value: bool) {
        self.allow_negative_coordinates = value;
    }
}

/// Loads a [`GraphConfig`] from a TOML file.
///
/// Without a path the default configuration is returned.
///
/// # Errors
///
/// Returns an error if:
/// - The path is given but the file does not exist
/// - The file cannot be read ([`CellGraphError::Io`])
/// - The contents do not parse or validate
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<GraphConfig, CellGraphError> {
    let Some(path) = explicit_path else {
        info!("No configuration file given, using defaults");
        return Ok(GraphConfig::default());
    };

    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    info!(path = path.display().to_string(); "Loading configuration");
    let text = fs::read_to_string(path)?;
    Ok(GraphConfig::from_toml_str(&text)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert!(config.extend_parents());
        assert!(config.extend_parents_on_add());
        assert!(!config.extend_parents_on_move());
        assert!(config.constrain_children());
        assert!(config.allow_negative_coordinates());
        assert!(config.allow_dangling_edges());
        assert!(config.ports_enabled());
        assert_eq!(config.maximum_graph_bounds(), None);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = GraphConfig::from_toml_str("").unwrap();
        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = GraphConfig::from_toml_str("extend_parents = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let err = GraphConfig::from_toml_str("grid_size = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = GraphConfig::from_toml_str(
            "[maximum_graph_bounds]\nx = 0.0\ny = 0.0\nwidth = 0.0\nheight = 10.0",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recursive_resize = true\ndisconnect_on_move = false").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert!(config.recursive_resize());
        assert!(!config.disconnect_on_move());
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, CellGraphError::Config(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_load_config_unreadable_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path())).unwrap_err();
        assert!(matches!(err, CellGraphError::Io(_)));
    }

    #[test]
    fn test_load_config_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "border = -2.0").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, CellGraphError::Config(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_config_without_path() {
        let config = load_config(None::<&Path>).unwrap();
        assert_eq!(config, GraphConfig::default());
    }
}

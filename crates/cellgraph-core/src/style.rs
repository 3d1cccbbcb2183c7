//! Cell styles.
//!
//! A [`Style`] is an ordered mapping from style keys to string values. The
//! engine only interprets the keys listed in [`keys`]; every other entry is
//! carried along untouched for the rendering layer.
//!
//! # Text form
//!
//! Styles round trip through the compact `key=value;key=value` notation:
//!
//! ```
//! # use cellgraph_core::style::Style;
//! let style: Style = "shape=swimlane;startSize=30;rotation=90".parse().unwrap();
//! assert!(style.is_swimlane());
//! assert_eq!(style.start_size(), 30.0);
//! assert_eq!(style.rotation(), 90.0);
//! assert_eq!(style.to_string(), "shape=swimlane;startSize=30;rotation=90");
//! ```

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Style keys understood by the engine.
pub mod keys {
    pub const ROTATION: &str = "rotation";
    pub const DIRECTION: &str = "direction";
    pub const FLIP_H: &str = "flipH";
    pub const FLIP_V: &str = "flipV";
    pub const SHAPE: &str = "shape";
    pub const PERIMETER: &str = "perimeter";
    pub const PERIMETER_SPACING: &str = "perimeterSpacing";
    pub const START_SIZE: &str = "startSize";
    pub const HORIZONTAL: &str = "horizontal";
    pub const FOLDABLE: &str = "foldable";
    pub const ASPECT: &str = "aspect";
    pub const RESIZE_WIDTH: &str = "resizeWidth";
    pub const RESIZE_HEIGHT: &str = "resizeHeight";
    pub const EXIT_X: &str = "exitX";
    pub const EXIT_Y: &str = "exitY";
    pub const EXIT_DX: &str = "exitDx";
    pub const EXIT_DY: &str = "exitDy";
    pub const EXIT_PERIMETER: &str = "exitPerimeter";
    pub const ENTRY_X: &str = "entryX";
    pub const ENTRY_Y: &str = "entryY";
    pub const ENTRY_DX: &str = "entryDx";
    pub const ENTRY_DY: &str = "entryDy";
    pub const ENTRY_PERIMETER: &str = "entryPerimeter";
    pub const SOURCE_PORT: &str = "sourcePort";
    pub const TARGET_PORT: &str = "targetPort";
}

/// Header size used for swimlanes that do not set `startSize`.
pub const DEFAULT_START_SIZE: f64 = 40.0;

/// Errors produced while parsing the text form of a style.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("style entry `{0}` has no value")]
    MissingValue(String),

    #[error("invalid direction `{0}`")]
    InvalidDirection(String),
}

/// Cardinal orientation of a shape.
///
/// `North`, `West` and `South` rotate the shape by 270, 180 and 90 degrees
/// respectively relative to the default `East`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    #[default]
    East,
    South,
    West,
}

impl Direction {
    /// Quarter-turn rotation implied by the direction, in degrees.
    pub fn angle(self) -> f64 {
        match self {
            Direction::East => 0.0,
            Direction::South => 90.0,
            Direction::West => 180.0,
            Direction::North => 270.0,
        }
    }

    /// Returns true for directions that exchange the width and height axes.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

impl FromStr for Direction {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "north" => Ok(Direction::North),
            "east" => Ok(Direction::East),
            "south" => Ok(Direction::South),
            "west" => Ok(Direction::West),
            other => Err(StyleError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Ordered key/value style of a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style {
    entries: IndexMap<String, String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the style with `key` set to `value`.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, Some(value));
        self
    }

    /// Sets `key` to `value`, or removes it when `value` is `None`.
    pub fn set(&mut self, key: &str, value: Option<impl ToString>) {
        match value {
            Some(value) => {
                self.entries.insert(key.to_string(), value.to_string());
            }
            None => {
                self.entries.shift_remove(key);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Numeric value of `key`, or `default` when it is absent or unparsable.
    pub fn number(&self, key: &str, default: f64) -> f64 {
        self.number_opt(key).unwrap_or(default)
    }

    /// Optional numeric value of `key`.
    ///
    /// A present but non-numeric value is logged and treated as absent.
    pub fn number_opt(&self, key: &str) -> Option<f64> {
        let value = self.get(key)?;
        match value.trim().parse::<f64>() {
            Ok(number) => Some(number),
            Err(err) => {
                warn!(key, value, err:err; "Ignoring non-numeric style value");
                None
            }
        }
    }

    /// Boolean value of `key`. Accepts `1`/`0` and `true`/`false`.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(str::trim) {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            _ => default,
        }
    }

    /// Arbitrary rotation of the shape in degrees.
    pub fn rotation(&self) -> f64 {
        self.number(keys::ROTATION, 0.0)
    }

    pub fn direction(&self) -> Direction {
        let Some(value) = self.get(keys::DIRECTION) else {
            return Direction::default();
        };
        value.parse().unwrap_or_else(|err: StyleError| {
            warn!(value, err:err; "Ignoring unknown direction");
            Direction::default()
        })
    }

    pub fn flip_h(&self) -> bool {
        self.flag(keys::FLIP_H, false)
    }

    pub fn flip_v(&self) -> bool {
        self.flag(keys::FLIP_V, false)
    }

    pub fn shape(&self) -> Option<&str> {
        self.get(keys::SHAPE)
    }

    pub fn perimeter(&self) -> Option<&str> {
        self.get(keys::PERIMETER)
    }

    pub fn perimeter_spacing(&self) -> f64 {
        self.number(keys::PERIMETER_SPACING, 0.0)
    }

    /// Returns true if the shape is a swimlane container with a header.
    pub fn is_swimlane(&self) -> bool {
        self.shape() == Some("swimlane")
    }

    /// Header size of a swimlane.
    pub fn start_size(&self) -> f64 {
        self.number(keys::START_SIZE, DEFAULT_START_SIZE)
    }

    /// Whether a swimlane header runs along the top (`true`) or the left side.
    pub fn is_horizontal(&self) -> bool {
        self.flag(keys::HORIZONTAL, true)
    }

    pub fn is_foldable(&self) -> bool {
        self.flag(keys::FOLDABLE, true)
    }

    pub fn is_aspect_fixed(&self) -> bool {
        self.get(keys::ASPECT) == Some("fixed")
    }
}

impl FromStr for Style {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut style = Style::new();
        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| StyleError::MissingValue(entry.to_string()))?;
            style.set(key.trim(), Some(value.trim()));
        }
        Ok(style)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let style: Style = "rotation=45; flipH=1;;shape=ellipse".parse().unwrap();
        assert_eq!(style.rotation(), 45.0);
        assert!(style.flip_h());
        assert!(!style.flip_v());
        assert_eq!(style.shape(), Some("ellipse"));
        assert_eq!(style.to_string(), "rotation=45;flipH=1;shape=ellipse");
    }

    #[test]
    fn test_parse_missing_value() {
        let err = "rotation".parse::<Style>().unwrap_err();
        assert_eq!(err, StyleError::MissingValue("rotation".to_string()));
    }

    #[test]
    fn test_defaults() {
        let style = Style::new();
        assert_eq!(style.rotation(), 0.0);
        assert_eq!(style.direction(), Direction::East);
        assert_eq!(style.start_size(), DEFAULT_START_SIZE);
        assert!(style.is_horizontal());
        assert!(style.is_foldable());
        assert!(!style.is_aspect_fixed());
    }

    #[test]
    fn test_set_none_removes() {
        let mut style = Style::new().with(keys::EXIT_X, 0.5).with(keys::EXIT_Y, 1);
        style.set(keys::EXIT_X, None::<f64>);
        assert!(!style.contains(keys::EXIT_X));
        assert_eq!(style.number(keys::EXIT_Y, 0.0), 1.0);
    }

    #[test]
    fn test_direction_angles() {
        assert_eq!("north".parse::<Direction>().unwrap().angle(), 270.0);
        assert_eq!(Direction::West.angle(), 180.0);
        assert_eq!(Direction::South.angle(), 90.0);
        assert!(Direction::North.is_vertical());
        assert!(!Direction::West.is_vertical());
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn test_unparsable_number_falls_back() {
        let style = Style::new().with(keys::ROTATION, "abc");
        assert_eq!(style.rotation(), 0.0);
        assert_eq!(style.number_opt(keys::ROTATION), None);

        let style = Style::new().with(keys::DIRECTION, "up");
        assert_eq!(style.direction(), Direction::East);
    }
}

//! Named events fired by the [`Graph`](super::Graph) operations.

use std::{fmt, str::FromStr};

use cellgraph_core::{constraint::ConnectionConstraint, geometry::Rect, identifier::Id};

/// Edge or axis that [`align_cells`](super::Graph::align_cells) lines cells up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl Alignment {
    /// Returns true for alignments that move cells along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Center | Self::Right)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "top" => Ok(Self::Top),
            "middle" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            other => Err(format!("unknown alignment `{other}`")),
        }
    }
}

/// One event per public operation, carrying the operation's parameters.
///
/// Events are fired inside the operation's update, so listeners run before
/// the model's change set is committed.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    CellsAdded {
        cells: Vec<Id>,
        parent: Id,
        index: Option<usize>,
        source: Option<Id>,
        target: Option<Id>,
    },
    CellsRemoved {
        cells: Vec<Id>,
        include_edges: bool,
    },
    CellsMoved {
        cells: Vec<Id>,
        dx: f64,
        dy: f64,
        clone: bool,
        target: Option<Id>,
    },
    CellsResized {
        cells: Vec<Id>,
        bounds: Vec<Rect>,
    },
    CellsFolded {
        cells: Vec<Id>,
        collapse: bool,
        recurse: bool,
    },
    CellsAligned {
        cells: Vec<Id>,
        align: Alignment,
        param: Option<f64>,
    },
    CellsGrouped {
        group: Id,
        border: f64,
        cells: Vec<Id>,
    },
    CellsUngrouped {
        groups: Vec<Id>,
        children: Vec<Id>,
    },
    CellsRemovedFromParent {
        cells: Vec<Id>,
    },
    EdgeSplit {
        edge: Id,
        new_edge: Id,
        cells: Vec<Id>,
        dx: f64,
        dy: f64,
    },
    CellsOrdered {
        cells: Vec<Id>,
        back: bool,
    },
    CellsToggled {
        cells: Vec<Id>,
        show: bool,
        include_edges: bool,
    },
    CellConnected {
        edge: Id,
        terminal: Option<Id>,
        previous: Option<Id>,
        is_source: bool,
        constraint: Option<ConnectionConstraint>,
    },
    CellsCloned {
        cells: Vec<Id>,
        clones: Vec<Id>,
    },
    CellsDisconnected {
        cells: Vec<Id>,
    },
    EdgesReset {
        cells: Vec<Id>,
    },
    GroupBoundsUpdated {
        cells: Vec<Id>,
        border: f64,
        move_group: bool,
    },
    /// `key` is `None` when the whole style was replaced.
    CellsStyled {
        cells: Vec<Id>,
        key: Option<String>,
        value: Option<String>,
    },
    OverlayAdded {
        cell: Id,
        name: String,
    },
    OverlayRemoved {
        cell: Id,
        name: String,
    },
}

impl GraphEvent {
    /// Stable kebab-case name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CellsAdded { .. } => "cells-added",
            Self::CellsRemoved { .. } => "cells-removed",
            Self::CellsMoved { .. } => "cells-moved",
            Self::CellsResized { .. } => "cells-resized",
            Self::CellsFolded { .. } => "cells-folded",
            Self::CellsAligned { .. } => "cells-aligned",
            Self::CellsGrouped { .. } => "cells-grouped",
            Self::CellsUngrouped { .. } => "cells-ungrouped",
            Self::CellsRemovedFromParent { .. } => "cells-removed-from-parent",
            Self::EdgeSplit { .. } => "edge-split",
            Self::CellsOrdered { .. } => "cells-ordered",
            Self::CellsToggled { .. } => "cells-toggled",
            Self::CellConnected { .. } => "cell-connected",
            Self::CellsCloned { .. } => "cells-cloned",
            Self::CellsDisconnected { .. } => "cells-disconnected",
            Self::EdgesReset { .. } => "edges-reset",
            Self::GroupBoundsUpdated { .. } => "group-bounds-updated",
            Self::CellsStyled { .. } => "cells-styled",
            Self::OverlayAdded { .. } => "overlay-added",
            Self::OverlayRemoved { .. } => "overlay-removed",
        }
    }
}

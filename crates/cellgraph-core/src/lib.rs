//! Cellgraph Core Types and Definitions
//!
//! This crate provides the value types shared by the cellgraph model and
//! its geometry engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned cell identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes, rectangles and rotation math ([`geometry`] module)
//! - **Cell geometry**: The per-cell [`geometry::Geometry`] value with its pure transforms
//! - **Style**: Ordered key/value cell styles with typed accessors ([`style`] module)
//! - **Constraints**: Normalized perimeter anchors for edge terminals ([`constraint`] module)

pub mod constraint;
pub mod geometry;
pub mod identifier;
pub mod style;

//! # symbios-roads
//!
//! A road network generator that interprets [Symbios](https://crates.io/crates/symbios) style
//! L-System grammars with a 2-D turtle, steered by terrain elevation and population density.
//!
//! Highways grow between population centers, a grid of intersections sprouts local road stubs,
//! and the drawing phase walks a rewritten axiom, terminating road branches that run into empty
//! land or cross an earlier road. The output is a flat list of `Mat3` poses that a renderer can
//! feed straight into instanced mesh placement.

pub mod config;
pub mod error;
pub mod field;
pub mod generator;
pub mod geometry;
pub mod grammar;
pub mod turtle;

pub use config::*;
pub use error::*;
pub use field::*;
pub use generator::*;
pub use geometry::*;
pub use grammar::*;
pub use turtle::*;

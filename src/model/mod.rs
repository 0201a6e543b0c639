//! Bonded-atom structures consumed by the typing engine.
//!
//! - [`atom`] – Atom kinds (element or connection port) and typing results.
//! - [`structure`] – Atoms plus unordered bonds, with adjacency construction.
//!
//! Atoms carry no coordinates; typing only reads element kinds and
//! connectivity.

pub mod atom;
pub mod structure;

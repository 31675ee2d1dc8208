//! # Hazardsim
//!
//! Headless front end for the hazardsim engine: a facade over the core
//! crates plus a scenario runner driven by a fixed-timestep frame loop.

pub mod app;
pub mod model;

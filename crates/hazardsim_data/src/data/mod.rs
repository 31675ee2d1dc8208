//! Core data structures for the hazardsim simulation.

pub mod agent;
pub mod faction;
pub mod material;

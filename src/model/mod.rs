pub use hazardsim_core::{
    init_logging, AgentSnapshot, FrameDriver, Metrics, PlacementError, ResetOptions, SimConfig,
    SimError, SpawnAt, StepSettings, TickDiagnostics, TileSnapshot, World, WorldEvent,
};
pub mod config {
    pub use hazardsim_core::config::*;
}
pub mod grid {
    pub use hazardsim_core::grid::*;
}
pub mod diffusion {
    pub use hazardsim_core::diffusion::*;
}
pub mod pheromone {
    pub use hazardsim_core::pheromone::*;
}
pub mod reactions {
    pub use hazardsim_core::reactions::*;
}
pub mod territory {
    pub use hazardsim_core::territory::*;
}
pub mod systems {
    pub use hazardsim_core::systems::*;
}
pub mod world {
    pub use hazardsim_core::world::*;
}

pub mod state {
    pub use hazardsim_data::*;
    pub use hazardsim_core::snapshot;
}

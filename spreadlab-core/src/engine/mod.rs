//! Simulation engine: strategy parameters and the position state machine.

pub mod config;
pub mod simulation;

pub use config::{apply_exclusions, StrategyParams};
pub use simulation::{
    project_position, run_simulation, OpenPositionReport, PositionProjection, SimulationOutcome,
    SimulationReport,
};

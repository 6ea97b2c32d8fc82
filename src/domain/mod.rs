// Domain layer - Core models with no I/O
pub mod dashboard;
pub mod node;
pub mod simulation;
pub mod telemetry;

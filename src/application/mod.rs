// Application layer - Use cases over the domain, independent of transport
pub mod acquisition_service;
pub mod dashboard_service;
pub mod node_registry;
pub mod poller;
pub mod simulation_service;
pub mod synthetic;
pub mod telemetry_repository;

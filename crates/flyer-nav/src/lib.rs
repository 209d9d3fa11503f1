pub mod arrival;
pub mod context;
pub mod doctor;
pub mod error;
pub mod fsm;
pub mod mission;
pub mod planner;

pub use context::{FlightContext, FlightState, MissionParams};
pub use error::FlightError;
pub use fsm::FlightStateMachine;
pub use mission::{Mission, TelemetryObserver, VehicleCommander};
pub use planner::Waypoint;

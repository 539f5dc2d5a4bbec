//! `bot_core`: decision core of the fleet agent.
//!
//! No IO, no network, no clock. Time comes in as arguments and all
//! randomness via the passed-in Rng.

mod buildables;
pub mod farm;
pub mod feasibility;
mod feature;
pub mod interval;
mod resources;
pub mod rules;
pub mod search;
mod ships;
pub mod sleep;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use buildables::*;
pub use farm::{FarmError, FarmState, FarmTable, FarmTarget, ReportPolicy};
pub use feasibility::{FlightPrediction, SendRejection};
pub use feature::{evaluate, Feature, FeatureToggles};
pub use interval::{next_delay, CheckWindow, Jitter};
pub use resources::*;
pub use rules::{FlightContext, GameRules, Leg, StandardRules};
pub use ships::*;
pub use sleep::{SleepPhase, SleepWindow, SleepWindowError};
pub use types::*;

#[cfg(test)]
mod tests;

#![warn(clippy::all)]

mod config;
mod controller;
mod error;
mod grid;
mod step;
mod utils;

pub use config::{Config, ControllerConfig};
pub use controller::{Generation, LifeEvent, SimulationController, SubscriptionId};
pub use error::{ErrorKind, LifeError};
pub use grid::{Grid, GridId};
pub use step::{ConwayStep, StepEngine, MOORE_OFFSETS};
pub use utils::PollLimiter;

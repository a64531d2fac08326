//! Domain types shared by the coordinator and its workers

mod status;
mod temperature;

pub use status::{WorkerId, WorkerStatus};
pub use temperature::{WorkerTemperature, WorkerTemperatureList};

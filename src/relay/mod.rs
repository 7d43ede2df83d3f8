pub mod controller;
pub mod report;

pub use controller::{RelayController, RelaySettings, SharedLink};
pub use report::StatsEntry;

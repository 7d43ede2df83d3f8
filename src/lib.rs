#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod ledger;
pub mod links;
pub mod relay;
pub mod transport;

pub use config::Config;
pub use error::{RelayError, Result};
pub use ledger::{ShareLedger, ShareRecord};
pub use links::{CatalogIdentifier, LinkValidator, Validation, extract_links, identifier_of};
pub use relay::{RelayController, RelaySettings};

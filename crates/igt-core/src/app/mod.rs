//! App - wiring the domain to the ports.
//!
//! # Components
//! - **SessionBuilder**: validation and wiring
//! - **SessionController**: phase and trial sequencing, the only mutator of session state
//! - **SessionRunner**: the event loop that feeds input and deadlines to the controller

pub mod builder;
pub mod controller;
pub mod runner;

pub use self::builder::{BuildError, SessionBuilder};
pub use self::controller::{ExportStatus, SessionController, SessionSummary};
pub use self::runner::SessionRunner;

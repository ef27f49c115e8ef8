//! igt-core
//!
//! Trial engine for the Iowa Gambling Task.
//!
//! # Modules
//! - **domain**: decks and outcomes, the trial state machine, session state, records, configuration
//! - **ports**: seams to the outside (Clock, IdGenerator, DeadlineTimer, Presenter, Exporter, InputSource)
//! - **app**: SessionBuilder, SessionController, SessionRunner
//! - **impls**: tokio deadline timer, CSV exporter and in-memory adapters for tests

pub mod domain;
pub mod ports;
pub mod app;
pub mod impls;

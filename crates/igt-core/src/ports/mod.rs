//! Ports: the seams between the engine and its collaborators.

pub mod clock;
pub mod exporter;
pub mod id_generator;
pub mod input;
pub mod presenter;
pub mod timer;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::exporter::{ExportReceipt, Exporter};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::input::{Input, InputSource};
pub use self::presenter::{Board, Presenter, Screen};
pub use self::timer::DeadlineTimer;

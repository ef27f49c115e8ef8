//! Concrete adapters for the ports.

pub mod channel_input;
pub mod csv_exporter;
pub mod manual_timer;
pub mod memory_exporter;
pub mod recording_presenter;
pub mod tokio_timer;

pub use self::channel_input::ChannelInput;
pub use self::csv_exporter::CsvExporter;
pub use self::manual_timer::{ArmedDeadline, ManualTimer};
pub use self::memory_exporter::{ExportedBatch, MemoryExporter};
pub use self::recording_presenter::{PresenterEvent, RecordingPresenter};
pub use self::tokio_timer::{AbortOnDrop, TokioDeadlineTimer};

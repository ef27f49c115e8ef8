//! InputSource port: participant and operator events.

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Register { id: String, name: String },
    Play,
    Pass,
    Continue,
    /// Operator abort.
    Quit,
}

#[async_trait]
pub trait InputSource: Send {
    /// Next event, or `None` once the source is closed.
    async fn next_input(&mut self) -> Option<Input>;
}

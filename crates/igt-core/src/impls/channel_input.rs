//! Input source fed through a tokio channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::ports::{Input, InputSource};

pub struct ChannelInput {
    rx: mpsc::UnboundedReceiver<Input>,
}

impl ChannelInput {
    pub fn new() -> (mpsc::UnboundedSender<Input>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl InputSource for ChannelInput {
    async fn next_input(&mut self) -> Option<Input> {
        self.rx.recv().await
    }
}

//! SessionRunner - the event loop.
//!
//! One task, one loop: participant input and elapsed deadlines are raced with
//! `select!` and handed to the controller one at a time. The first event to
//! reach an armed trial wins; whichever arrives second finds the trial out of
//! `Armed` and is dropped by the controller.

use tokio::sync::mpsc;
use tracing::{Instrument, info, info_span};

use super::controller::{SessionController, SessionSummary};
use crate::domain::{EngineError, TrialId};
use crate::impls::TokioDeadlineTimer;
use crate::ports::{Exporter, InputSource, Presenter};

pub struct SessionRunner<P, E> {
    controller: SessionController<P, E, TokioDeadlineTimer>,
    deadlines: mpsc::UnboundedReceiver<TrialId>,
}

impl<P: Presenter, E: Exporter> SessionRunner<P, E> {
    pub fn new(
        controller: SessionController<P, E, TokioDeadlineTimer>,
        deadlines: mpsc::UnboundedReceiver<TrialId>,
    ) -> Self {
        Self {
            controller,
            deadlines,
        }
    }

    pub fn controller(&self) -> &SessionController<P, E, TokioDeadlineTimer> {
        &self.controller
    }

    /// Drive the session until it ends.
    ///
    /// A closed input source ends the session as an operator quit would.
    /// Invariant violations stop the loop and are returned; dropping the
    /// controller on the way out cancels any armed deadline.
    pub async fn run<I>(self, input: &mut I) -> Result<SessionSummary, EngineError>
    where
        I: InputSource + ?Sized,
    {
        let span = info_span!("session", session_id = %self.controller.session_id());
        self.drive(input).instrument(span).await
    }

    async fn drive<I>(mut self, input: &mut I) -> Result<SessionSummary, EngineError>
    where
        I: InputSource + ?Sized,
    {
        self.controller.start();

        while !self.controller.is_ended() {
            tokio::select! {
                Some(trial) = self.deadlines.recv() => {
                    self.controller.handle_deadline(trial)?;
                }
                next = input.next_input() => match next {
                    Some(event) => match self.controller.handle(event) {
                        Ok(()) | Err(EngineError::MissingParticipantIdentity { .. }) => {}
                        Err(err) => return Err(err),
                    },
                    None => {
                        info!("input closed, ending session");
                        self.controller.end_session();
                    }
                },
            }
        }

        Ok(self.controller.summary())
    }
}

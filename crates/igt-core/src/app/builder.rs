//! SessionBuilder - construction and wiring.
//!
//! Fail-fast: the configuration is validated in `build`, so a deck schedule
//! too short for the configured blocks is rejected before anyone sits down,
//! never halfway through a session.
//!
//! ```ignore
//! let runner = SessionBuilder::new(SessionConfig::sampled(), presenter, exporter)
//!     .with_participant("p-01", "Ada")
//!     .build_runner()?;
//! let summary = runner.run(&mut input).await?;
//! ```

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::controller::{Parts, SessionController};
use super::runner::SessionRunner;
use crate::domain::{ConfigError, EngineError, Participant, SessionConfig};
use crate::impls::TokioDeadlineTimer;
use crate::ports::{Clock, DeadlineTimer, Exporter, IdGenerator, Presenter, SystemClock, UlidGenerator};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("invalid participant: {0}")]
    InvalidParticipant(#[source] EngineError),
}

pub struct SessionBuilder<P, E> {
    config: SessionConfig,
    presenter: P,
    exporter: E,
    participant: Option<(String, String)>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    rng: Option<Box<dyn RngCore + Send>>,
}

impl<P: Presenter, E: Exporter> SessionBuilder<P, E> {
    pub fn new(config: SessionConfig, presenter: P, exporter: E) -> Self {
        Self {
            config,
            presenter,
            exporter,
            participant: None,
            clock: None,
            ids: None,
            rng: None,
        }
    }

    /// Supply identity up front; registration is then skipped.
    pub fn with_participant(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.participant = Some((id.into(), name.into()));
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Override the RNG. Takes precedence over `config.seed`.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Validate and build a controller around any deadline timer.
    pub fn build<T: DeadlineTimer>(self, timer: T) -> Result<SessionController<P, E, T>, BuildError> {
        self.config.validate()?;

        let participant = match self.participant {
            Some((id, name)) => Some(Participant::new(id, name).map_err(BuildError::InvalidParticipant)?),
            None => None,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));
        let seed = self.config.seed;
        let rng = self.rng.unwrap_or_else(|| match seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        });

        Ok(SessionController::new(Parts {
            session_id: ids.session_id(),
            config: self.config,
            participant,
            presenter: self.presenter,
            exporter: self.exporter,
            timer,
            clock,
            ids,
            rng,
        }))
    }

    /// Validate and build a runner driven by tokio deadline tasks.
    pub fn build_runner(self) -> Result<SessionRunner<P, E>, BuildError> {
        let (timer, deadlines) = TokioDeadlineTimer::channel();
        let controller = self.build(timer)?;
        Ok(SessionRunner::new(controller, deadlines))
    }
}

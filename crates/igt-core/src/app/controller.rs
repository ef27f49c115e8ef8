//! SessionController - phase and trial sequencing.
//!
//! The controller is the only mutator of `Session` (net worth, arrow
//! position, counters) and of the `TrialLog`. Every event, participant input
//! or elapsed deadline alike, comes in through `&mut self`, so no two
//! transitions can interleave.
//!
//! # Flow
//! 1. `start` shows registration (or welcome if identity was supplied)
//! 2. `register` -> Welcome, `continue` -> `begin_practice`
//! 3. `continue` on a briefing -> `next_trial` arms a `TrialStateMachine`
//! 4. `resolve` (play / pass / deadline) books the outcome
//! 5. `continue_trial` redraws the arrow and calls `next_trial`
//! 6. a finished block moves on: practice -> `begin_main`, main -> `end_session`

use std::sync::Arc;

use rand::{Rng, RngCore};
use tracing::{debug, error, info, warn};

use crate::domain::{
    ConfigError, DeckId, DeckModel, EngineError, Participant, Phase, PhaseEvent, Resolution, Session, SessionConfig,
    SessionId, TrialError, TrialId, TrialInput, TrialLog, TrialRecord, TrialState, TrialStateMachine, Trigger,
};
use crate::ports::{Board, Clock, DeadlineTimer, ExportReceipt, Exporter, IdGenerator, Input, Presenter, Screen};

/// What happened to the trial log at session end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    /// Session has not ended, or ended before the main block.
    NotAttempted,
    Exported(ExportReceipt),
    Failed(String),
}

/// Everything the caller gets back once the session is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub participant: Option<Participant>,
    pub final_net_worth: i64,
    pub records: Vec<TrialRecord>,
    pub export: ExportStatus,
}

enum Stage<G> {
    /// Registration, welcome, ended.
    Idle,
    /// Block entered, briefing screen shown, waiting for continue.
    Briefing,
    Trial(TrialStateMachine<G>),
}

/// Collaborators handed over by `SessionBuilder`.
pub(crate) struct Parts<P, E, T> {
    pub session_id: SessionId,
    pub config: SessionConfig,
    pub participant: Option<Participant>,
    pub presenter: P,
    pub exporter: E,
    pub timer: T,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub rng: Box<dyn RngCore + Send>,
}

pub struct SessionController<P, E, T: DeadlineTimer> {
    session_id: SessionId,
    config: SessionConfig,
    participant: Option<Participant>,
    session: Session,
    decks: DeckModel,
    log: TrialLog,
    stage: Stage<T::Guard>,
    export: ExportStatus,
    presenter: P,
    exporter: E,
    timer: T,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    rng: Box<dyn RngCore + Send>,
}

impl<P, E, T> SessionController<P, E, T>
where
    P: Presenter,
    E: Exporter,
    T: DeadlineTimer,
{
    pub(crate) fn new(parts: Parts<P, E, T>) -> Self {
        let Parts {
            session_id,
            config,
            participant,
            presenter,
            exporter,
            timer,
            clock,
            ids,
            mut rng,
        } = parts;
        let decks = DeckModel::new(config.decks.clone(), &mut *rng);
        let session = Session::new(config.initial_stake, config.initial_position);
        Self {
            session_id,
            config,
            participant,
            session,
            decks,
            log: TrialLog::new(),
            stage: Stage::Idle,
            export: ExportStatus::NotAttempted,
            presenter,
            exporter,
            timer,
            clock,
            ids,
            rng,
        }
    }

    // ------------------------------------------------------------------
    // accessors
    // ------------------------------------------------------------------

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn participant(&self) -> Option<&Participant> {
        self.participant.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn is_ended(&self) -> bool {
        self.session.phase == Phase::Ended
    }

    pub fn log(&self) -> &TrialLog {
        &self.log
    }

    pub fn decks(&self) -> &DeckModel {
        &self.decks
    }

    pub fn export_status(&self) -> &ExportStatus {
        &self.export
    }

    pub fn presented_deck(&self) -> Option<DeckId> {
        DeckId::from_index(self.session.position)
    }

    pub fn trial_state(&self) -> Option<TrialState> {
        match &self.stage {
            Stage::Trial(tsm) => Some(tsm.state()),
            _ => None,
        }
    }

    /// Is the controller holding a briefing screen for the current block?
    pub fn is_briefing(&self) -> bool {
        matches!(self.stage, Stage::Briefing)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id,
            participant: self.participant.clone(),
            final_net_worth: self.session.net_worth,
            records: self.log.records().to_vec(),
            export: self.export.clone(),
        }
    }

    fn board(&self) -> Board {
        Board {
            phase: self.session.phase,
            trial_number: self.session.trial_counter,
            position: self.session.position,
            net_worth: self.session.net_worth,
            previous_net_worth: self.session.previous_net_worth,
            numerals: self.config.numerals,
        }
    }

    fn block_limit(&self) -> u32 {
        match self.session.phase {
            Phase::Practice => self.config.practice_trials,
            _ => self.config.main_trials,
        }
    }

    fn transition(&mut self, event: PhaseEvent) -> Option<Phase> {
        let from = self.session.phase;
        let to = from.next(event)?;
        info!(session_id = %self.session_id, from = from.as_str(), to = to.as_str(), ?event, "phase transition");
        self.session.phase = to;
        Some(to)
    }

    // ------------------------------------------------------------------
    // registration and screens
    // ------------------------------------------------------------------

    /// Show the first screen. Skips registration when identity was supplied
    /// up front.
    pub fn start(&mut self) {
        if self.session.phase != Phase::Registration {
            return;
        }
        if self.participant.is_some() {
            self.transition(PhaseEvent::Registered);
            self.show_welcome();
        } else {
            self.presenter.show_screen(&Screen::Registration);
        }
    }

    /// Accept participant identity. A blank id or name is reported to the
    /// presenter and the session stays in registration.
    pub fn register(&mut self, id: &str, name: &str) -> Result<(), EngineError> {
        if self.session.phase != Phase::Registration {
            debug!(phase = self.session.phase.as_str(), "registration outside registration phase ignored");
            return Ok(());
        }
        match Participant::new(id, name) {
            Ok(participant) => {
                info!(session_id = %self.session_id, participant_id = %participant.id, "participant registered");
                self.participant = Some(participant);
                self.transition(PhaseEvent::Registered);
                self.show_welcome();
                Ok(())
            }
            Err(err) => {
                self.presenter.prompt_registration(&err);
                Err(err)
            }
        }
    }

    fn show_welcome(&mut self) {
        self.presenter.show_screen(&Screen::Welcome {
            deadline_ms: self.config.deadline_ms,
            initial_stake: self.config.initial_stake,
        });
    }

    // ------------------------------------------------------------------
    // blocks
    // ------------------------------------------------------------------

    /// Enter the practice block from the welcome screen. Net worth is left
    /// alone.
    pub fn begin_practice(&mut self) -> Result<(), EngineError> {
        self.enter_block("begin_practice", PhaseEvent::Continue, Phase::Practice)?;
        info!(session_id = %self.session_id, trials = self.config.practice_trials, "practice block started");
        self.presenter.show_screen(&Screen::PracticeBriefing {
            trials: self.config.practice_trials,
        });
        Ok(())
    }

    /// Enter the main block once practice is complete: reset net worth to
    /// the stake, reshuffle the scheduled decks and start logging.
    pub fn begin_main(&mut self) -> Result<(), EngineError> {
        self.enter_block("begin_main", PhaseEvent::BlockComplete, Phase::Main)?;
        self.session.net_worth = self.config.initial_stake;
        self.session.previous_net_worth = self.config.initial_stake;
        self.session.logging_active = true;
        self.decks.reset(&mut *self.rng);
        info!(session_id = %self.session_id, trials = self.config.main_trials, "main block started");
        self.presenter.show_screen(&Screen::MainBriefing {
            trials: self.config.main_trials,
        });
        Ok(())
    }

    /// Move into `target` if the transition table allows `event` from the
    /// current phase, and park on the briefing with a fresh trial counter.
    fn enter_block(&mut self, operation: &'static str, event: PhaseEvent, target: Phase) -> Result<(), EngineError> {
        let phase = self.session.phase;
        if phase.next(event) != Some(target) || !self.trial_closed() {
            return Err(TrialError::WrongPhase { operation, phase }.into());
        }
        self.transition(event);
        self.session.trial_counter = 0;
        self.stage = Stage::Briefing;
        Ok(())
    }

    fn trial_closed(&self) -> bool {
        match &self.stage {
            Stage::Trial(tsm) => tsm.state() == TrialState::Closed,
            _ => true,
        }
    }

    /// Start the next trial, or close the block if its limit is reached.
    pub fn next_trial(&mut self) -> Result<(), EngineError> {
        if !self.session.phase.is_block() {
            return Err(TrialError::WrongPhase {
                operation: "next_trial",
                phase: self.session.phase,
            }
            .into());
        }
        if let Stage::Trial(tsm) = &self.stage {
            if tsm.state() != TrialState::Closed {
                return Err(TrialError::NotAccepted {
                    trial: tsm.id(),
                    input: TrialInput::Continue,
                    state: tsm.state(),
                }
                .into());
            }
        }

        if self.session.trial_counter >= self.block_limit() {
            match self.session.phase.next(PhaseEvent::BlockComplete) {
                Some(Phase::Main) => self.begin_main()?,
                Some(Phase::Ended) => {
                    self.finish(PhaseEvent::BlockComplete);
                }
                _ => {}
            }
            return Ok(());
        }

        self.session.trial_counter += 1;
        let deck = DeckId::from_index(self.session.position)
            .ok_or(ConfigError::InitialPositionOutOfRange(self.session.position))?;
        let trial_id = self.ids.trial_id();
        let deadline = self.timer.arm(trial_id, self.config.deadline());
        self.stage = Stage::Trial(TrialStateMachine::arm(
            trial_id,
            self.session.trial_counter,
            deck,
            self.clock.now(),
            deadline,
        ));
        debug!(
            %trial_id,
            phase = self.session.phase.as_str(),
            trial = self.session.trial_counter,
            %deck,
            "trial armed"
        );
        let board = self.board();
        self.presenter.show_board(&board);
        Ok(())
    }

    // ------------------------------------------------------------------
    // trials
    // ------------------------------------------------------------------

    /// Resolve the current trial with a play, pass or timeout, book the
    /// outcome and hold for continue.
    pub fn resolve(&mut self, trigger: Trigger) -> Result<Resolution, EngineError> {
        let now = self.clock.now();
        let Stage::Trial(tsm) = &mut self.stage else {
            return Err(TrialError::NoActiveTrial { input: trigger.into() }.into());
        };
        let resolution = match tsm.resolve(trigger, &mut self.decks, &mut *self.rng, now) {
            Ok(r) => r,
            Err(err) => {
                if !err.is_stray_input() {
                    error!(error = %err, "trial resolution failed");
                }
                return Err(err);
            }
        };

        self.session.apply_outcome(resolution.outcome);
        if self.session.logging_active {
            if let Some(participant) = &self.participant {
                self.log.append(TrialRecord::main(
                    participant,
                    resolution.trial_number,
                    resolution.deck,
                    resolution.action(),
                    resolution.outcome,
                    self.session.net_worth,
                    resolution.response_ms,
                ));
            }
        }
        debug!(
            trial_id = %resolution.trial_id,
            phase = self.session.phase.as_str(),
            trial = resolution.trial_number,
            deck = %resolution.deck,
            action = resolution.action().as_str(),
            outcome = resolution.outcome,
            net_worth = self.session.net_worth,
            "trial resolved"
        );

        self.presenter.show_feedback(resolution.deck, resolution.feedback());
        let board = self.board();
        self.presenter.show_board(&board);

        if let Stage::Trial(tsm) = &mut self.stage {
            tsm.enter_awaiting_continue();
        }
        self.presenter.prompt_continue();
        Ok(resolution)
    }

    /// A deadline elapsed. Acts only if it belongs to the current trial and
    /// that trial is still armed.
    pub fn deadline_elapsed(&mut self, fired_for: TrialId) -> Result<Resolution, EngineError> {
        let current = match &self.stage {
            Stage::Trial(tsm) => Some(tsm.id()),
            _ => None,
        };
        if current != Some(fired_for) {
            return Err(TrialError::StaleDeadline { fired_for }.into());
        }
        self.resolve(Trigger::Timeout)
    }

    /// Acknowledge feedback, redraw the arrow and move on.
    pub fn continue_trial(&mut self) -> Result<(), EngineError> {
        let Stage::Trial(tsm) = &mut self.stage else {
            return Err(TrialError::NoActiveTrial {
                input: TrialInput::Continue,
            }
            .into());
        };
        tsm.acknowledge()?;

        self.session.position = self.rng.gen_range(0..DeckId::ALL.len());
        self.presenter.clear_feedback();
        self.next_trial()
    }

    /// End the session from any phase.
    ///
    /// If the main block was running, the final summary record is appended
    /// and the log is exported. Export failure is logged and recorded in the
    /// returned status but changes nothing else. Calling this again after the
    /// session has ended returns the existing status.
    pub fn end_session(&mut self) -> ExportStatus {
        self.finish(PhaseEvent::Quit)
    }

    fn finish(&mut self, event: PhaseEvent) -> ExportStatus {
        if self.is_ended() {
            return self.export.clone();
        }
        // cancels any outstanding deadline
        self.stage = Stage::Idle;

        self.transition(event);
        self.session.phase = Phase::Ended;

        // one terminal summary per log
        if self.session.logging_active && !self.log.is_sealed() {
            if let Some(participant) = self.participant.clone() {
                self.log
                    .append(TrialRecord::final_summary(&participant, self.session.net_worth));
                self.export = match self.exporter.export(&participant, self.log.records()) {
                    Ok(receipt) => {
                        info!(
                            session_id = %self.session_id,
                            location = %receipt.location,
                            rows = receipt.rows,
                            "trial log exported"
                        );
                        ExportStatus::Exported(receipt)
                    }
                    Err(err) => {
                        let err = EngineError::from(err);
                        warn!(session_id = %self.session_id, error = %err, "trial log not saved");
                        ExportStatus::Failed(err.to_string())
                    }
                };
            }
        }

        info!(
            session_id = %self.session_id,
            final_net_worth = self.session.net_worth,
            records = self.log.len(),
            "session ended"
        );
        self.presenter.show_screen(&Screen::Ended {
            final_net_worth: self.session.net_worth,
        });
        self.export.clone()
    }

    // ------------------------------------------------------------------
    // dispatch
    // ------------------------------------------------------------------

    /// Route one participant/operator event.
    ///
    /// Stray inputs (wrong state, duplicates) are absorbed and return `Ok`.
    /// A rejected registration returns its error after prompting. Anything
    /// else is an invariant violation.
    pub fn handle(&mut self, input: Input) -> Result<(), EngineError> {
        let result = match input {
            Input::Register { id, name } => self.register(&id, &name),
            Input::Play => self.resolve(Trigger::Play).map(|_| ()),
            Input::Pass => self.resolve(Trigger::Pass).map(|_| ()),
            Input::Continue => self.on_continue(),
            Input::Quit => {
                self.end_session();
                Ok(())
            }
        };
        absorb_stray(result)
    }

    /// Deliver an elapsed deadline, absorbing stale fires.
    pub fn handle_deadline(&mut self, fired_for: TrialId) -> Result<(), EngineError> {
        absorb_stray(self.deadline_elapsed(fired_for).map(|_| ()))
    }

    fn on_continue(&mut self) -> Result<(), EngineError> {
        if matches!(self.stage, Stage::Trial(_)) {
            return self.continue_trial();
        }
        if matches!(self.stage, Stage::Briefing) {
            return self.next_trial();
        }
        if self.session.phase == Phase::Welcome {
            return self.begin_practice();
        }
        Err(TrialError::NoActiveTrial {
            input: TrialInput::Continue,
        }
        .into())
    }
}

fn absorb_stray(result: Result<(), EngineError>) -> Result<(), EngineError> {
    match result {
        Err(err) if err.is_stray_input() => {
            debug!(reason = %err, "stray input ignored");
            Ok(())
        }
        other => other,
    }
}

use crate::config::{ExperimentConfig, secs};
use crate::error::Result;
use crate::plan::{Block, BlockPlan};
use crate::record::RecordSink;
use lexis_core::{Frame, InputKey, Response, ResponseRecord, Screen, Trial};
use lexis_timing::{SessionClock, Timer};
use log::{debug, info, warn};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::borrow::Cow;
use std::time::Duration;

const WELCOME_TEXT_PX: f32 = 25.0;
const READY_TEXT_PX: f32 = 50.0;
const MESSAGE_TEXT_PX: f32 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentEvent {
    KeyPressed(InputKey),
    /// A frame showing the current screen has been handed to the display.
    FramePresented,
    ScreenElapsed,
    ResponseTimeout,
}

/// How a session ended.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Abort key during a trial's response window
    Aborted,
    /// Escape on the welcome screen or the window was closed
    Quit,
}

pub struct ExperimentStateMachine<T, R, S>
where
    T: Timer,
    R: Rng,
    S: RecordSink,
{
    pub config: ExperimentConfig,
    timer: T,
    rng: R,
    sink: S,
    plan: BlockPlan,
    screen: Screen,
    screen_started: T::Timestamp,
    hold: Option<Duration>,
    block: usize,
    trial: usize,
    onset: Option<T::Timestamp>,
    session: Option<SessionClock<T>>,
    records: usize,
    outcome: Option<Outcome>,
}

impl<T, R, S> ExperimentStateMachine<T, R, S>
where
    T: Timer,
    R: Rng,
    S: RecordSink,
{
    pub fn new(config: ExperimentConfig, plan: BlockPlan, timer: T, rng: R, sink: S) -> Self {
        let now = timer.now();
        info!(
            "Block order: {:?} ({} trials)",
            plan.order(),
            plan.total_trials()
        );
        Self {
            config,
            timer,
            rng,
            sink,
            plan,
            screen: Screen::Welcome,
            screen_started: now,
            hold: None,
            block: 0,
            trial: 0,
            onset: None,
            session: None,
            records: 0,
            outcome: None,
        }
    }

    /// Deadline checks for the current screen
    pub fn update(&self) -> Vec<ExperimentEvent> {
        let mut events = Vec::new();
        if self.outcome.is_some() {
            return events;
        }

        match self.screen {
            Screen::Welcome => {}
            Screen::Stimulus => {
                if let Some(onset) = self.onset {
                    if self.timer.elapsed(onset) >= self.config.timing.response_window() {
                        events.push(ExperimentEvent::ResponseTimeout);
                    }
                }
            }
            _ => {
                if let Some(hold) = self.hold {
                    if self.timer.elapsed(self.screen_started) >= hold {
                        events.push(ExperimentEvent::ScreenElapsed);
                    }
                }
            }
        }

        events
    }

    /// Runs `update` and feeds every produced event back in
    pub fn poll(&mut self) -> Result<()> {
        for event in self.update() {
            self.handle_event(event)?;
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: ExperimentEvent) -> Result<bool> {
        if self.outcome.is_some() {
            return Ok(false);
        }

        match (self.screen, event) {
            (Screen::Welcome, ExperimentEvent::KeyPressed(InputKey::Space)) => {
                self.session = Some(SessionClock::start(self.timer.clone()));
                info!("Session clock started");
                let hold = self.config.timing.opening_fixation();
                self.enter(Screen::Fixation, Some(hold));
                Ok(true)
            }
            (Screen::Welcome, ExperimentEvent::KeyPressed(InputKey::Escape)) => {
                warn!("Escape on welcome screen, leaving before the first block");
                self.finish(Outcome::Quit)?;
                Ok(true)
            }

            (Screen::Stimulus, ExperimentEvent::FramePresented) => {
                if self.onset.is_none() {
                    self.onset = Some(self.timer.now());
                }
                Ok(true)
            }
            (Screen::Stimulus, ExperimentEvent::KeyPressed(key)) => {
                let Some(key) = key.as_response() else {
                    return Ok(false);
                };
                let now = self.timer.now();
                let onset = *self.onset.get_or_insert(now);
                let response = Response::Pressed {
                    key,
                    reaction_time: self.timer.between(onset, now),
                };
                self.record(response, now)?;
                if key.is_abort() {
                    warn!("Abort key pressed, closing session");
                    self.finish(Outcome::Aborted)?;
                } else {
                    self.next_trial();
                }
                Ok(true)
            }
            (Screen::Stimulus, ExperimentEvent::ResponseTimeout) => {
                let now = self.timer.now();
                self.record(Response::TimedOut, now)?;
                self.next_trial();
                Ok(true)
            }

            (screen, ExperimentEvent::ScreenElapsed) if !screen.awaits_key() => {
                self.advance_timed(screen)?;
                Ok(true)
            }

            _ => Ok(false),
        }
    }

    /// Closes the sink and ends the session without completing it
    pub fn quit(&mut self) -> Result<()> {
        if self.outcome.is_none() {
            warn!("Session closed on {:?}", self.screen);
            self.finish(Outcome::Quit)?;
        }
        Ok(())
    }

    fn advance_timed(&mut self, screen: Screen) -> Result<()> {
        let timing = self.config.timing.clone();
        match screen {
            Screen::Fixation => self.enter(Screen::Ready, Some(timing.ready())),
            Screen::Ready => self.start_block(0),
            Screen::BlockInstructions => {
                if self.current_block().is_some_and(|b| b.trials.is_empty()) {
                    self.end_block();
                } else {
                    self.trial = 0;
                    self.enter_trial_fixation();
                }
            }
            Screen::TrialFixation => self.enter(Screen::Stimulus, None),
            Screen::BlockPause => self.after_block_pause(),
            Screen::Break => self.next_block(),
            Screen::ClosingFixation => self.enter(Screen::Complete, Some(timing.complete())),
            Screen::Complete => self.finish(Outcome::Completed)?,
            Screen::Welcome | Screen::Stimulus => {}
        }
        Ok(())
    }

    fn start_block(&mut self, index: usize) {
        self.block = index;
        self.trial = 0;
        if let Some(block) = self.plan.blocks.get(index) {
            if block.trials.is_empty() {
                warn!("Block {} ({}) has no trials", index + 1, block.condition);
            }
            info!("Block {}/{}: {}", index + 1, self.plan.blocks.len(), block.condition);
        }
        let hold = self.config.timing.instructions();
        self.enter(Screen::BlockInstructions, Some(hold));
    }

    fn enter_trial_fixation(&mut self) {
        let pause = self.pick(&self.config.timing.trial_fixation_choices_secs.clone());
        self.enter(Screen::TrialFixation, Some(pause));
    }

    fn next_trial(&mut self) {
        self.trial += 1;
        let remaining = self
            .current_block()
            .is_some_and(|b| self.trial < b.trials.len());
        if remaining {
            self.enter_trial_fixation();
        } else {
            self.end_block();
        }
    }

    fn end_block(&mut self) {
        if self.block + 1 < self.plan.blocks.len() {
            let pause = self.pick(&self.config.timing.block_pause_choices_secs.clone());
            self.enter(Screen::BlockPause, Some(pause));
        } else {
            self.after_block_pause();
        }
    }

    fn after_block_pause(&mut self) {
        if self.block == self.config.timing.break_after_block {
            let hold = self.config.timing.break_screen();
            self.enter(Screen::Break, Some(hold));
        } else {
            self.next_block();
        }
    }

    fn next_block(&mut self) {
        if self.block + 1 < self.plan.blocks.len() {
            self.start_block(self.block + 1);
        } else {
            let hold = self.config.timing.closing_fixation();
            self.enter(Screen::ClosingFixation, Some(hold));
        }
    }

    fn enter(&mut self, screen: Screen, hold: Option<Duration>) {
        debug!("{:?} -> {:?} (hold {:?})", self.screen, screen, hold);
        self.screen = screen;
        self.screen_started = self.timer.now();
        self.hold = hold;
        self.onset = None;
    }

    fn pick(&mut self, choices: &[f64]) -> Duration {
        choices
            .choose(&mut self.rng)
            .map_or(Duration::ZERO, |s| secs(*s))
    }

    fn record(&mut self, response: Response, at: T::Timestamp) -> Result<()> {
        let session_time = self
            .session
            .as_ref()
            .map_or(Duration::ZERO, |clock| clock.elapsed_at(at));
        let Some(trial) = self.current_trial() else {
            return Ok(());
        };
        let record = ResponseRecord::new(trial, response, session_time);
        self.sink.append(&record)?;
        self.records += 1;
        let fields = record.fields();
        info!(
            "Trial {}: {} target={} answer={} rt={} correct={}",
            self.records, fields[0], fields[1], fields[5], fields[7], fields[8]
        );
        Ok(())
    }

    fn finish(&mut self, outcome: Outcome) -> Result<()> {
        self.outcome = Some(outcome);
        self.hold = None;
        info!(
            "Session finished: {:?} after {} records",
            outcome, self.records
        );
        self.sink.close()
    }

    /// Frame for the renderer
    pub fn view(&self) -> Frame<'_> {
        if self.outcome.is_some() {
            return Frame::Blank;
        }
        let texts = &self.config.texts;
        match self.screen {
            Screen::Welcome => Frame::Message {
                text: Cow::Borrowed(&texts.welcome),
                size: WELCOME_TEXT_PX,
            },
            Screen::Ready => Frame::Message {
                text: Cow::Borrowed(&texts.ready),
                size: READY_TEXT_PX,
            },
            Screen::BlockInstructions => match self.current_block() {
                Some(block) => Frame::Message {
                    text: Cow::Owned(texts.block_instructions_for(block.condition.display_name())),
                    size: MESSAGE_TEXT_PX,
                },
                None => Frame::Blank,
            },
            Screen::Stimulus => self.current_trial().map_or(Frame::Blank, Frame::Stimulus),
            Screen::Break => Frame::Message {
                text: Cow::Borrowed(&texts.break_message),
                size: MESSAGE_TEXT_PX,
            },
            Screen::Complete => Frame::Message {
                text: Cow::Borrowed(&texts.complete),
                size: MESSAGE_TEXT_PX,
            },
            Screen::Fixation
            | Screen::TrialFixation
            | Screen::BlockPause
            | Screen::ClosingFixation => Frame::Fixation,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn plan(&self) -> &BlockPlan {
        &self.plan
    }

    pub fn current_block(&self) -> Option<&Block> {
        self.plan.blocks.get(self.block)
    }

    pub fn current_block_index(&self) -> usize {
        self.block
    }

    pub fn current_trial(&self) -> Option<&Trial> {
        self.current_block().and_then(|b| b.trials.get(self.trial))
    }

    /// Fixed duration of the current screen, if it has one
    pub fn hold(&self) -> Option<Duration> {
        self.hold
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

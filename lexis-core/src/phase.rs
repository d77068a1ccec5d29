use crate::session::SetupForm;
use crate::trial::Trial;
use std::borrow::Cow;

/// Screens of a session, in presentation order.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Welcome,
    Fixation,
    Ready,
    BlockInstructions,
    TrialFixation,
    Stimulus,
    BlockPause,
    Break,
    ClosingFixation,
    Complete,
}

impl Screen {
    /// Screens that stay up until a key arrives rather than for a fixed time.
    pub fn awaits_key(&self) -> bool {
        matches!(self, Screen::Welcome | Screen::Stimulus)
    }
}

/// What the renderer should draw for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame<'a> {
    Setup(&'a SetupForm),
    Message { text: Cow<'a, str>, size: f32 },
    Fixation,
    Stimulus(&'a Trial),
    Blank,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_welcome_and_stimulus_wait_for_keys() {
        let waiting: Vec<_> = [
            Screen::Welcome,
            Screen::Fixation,
            Screen::Ready,
            Screen::BlockInstructions,
            Screen::TrialFixation,
            Screen::Stimulus,
            Screen::BlockPause,
            Screen::Break,
            Screen::ClosingFixation,
            Screen::Complete,
        ]
        .into_iter()
        .filter(Screen::awaits_key)
        .collect();
        assert_eq!(waiting, [Screen::Welcome, Screen::Stimulus]);
    }
}

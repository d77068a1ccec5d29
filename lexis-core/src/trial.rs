use crate::condition::Condition;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One stimulus-file row: a target word, three candidates and the correct key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub condition: Condition,
    /// Label exactly as written in the stimulus file.
    pub condition_label: String,
    pub target: String,
    pub words: [String; 3],
    pub correct: String,
}

impl Trial {
    /// Label shown above the words: `meaning` for high/low, otherwise the
    /// file's own label.
    pub fn stimulus_label(&self) -> &str {
        if self.condition.is_meaning() {
            self.condition.display_name()
        } else {
            &self.condition_label
        }
    }

    /// Every word drawn on this trial's stimulus screen.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.stimulus_label())
            .chain(std::iter::once(self.target.as_str()))
            .chain(self.words.iter().map(String::as_str))
    }
}

/// Keys that end a trial's response window.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKey {
    One,
    Two,
    Three,
    Escape,
}

impl ResponseKey {
    pub fn name(&self) -> &'static str {
        match self {
            ResponseKey::One => "1",
            ResponseKey::Two => "2",
            ResponseKey::Three => "3",
            ResponseKey::Escape => "escape",
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, ResponseKey::Escape)
    }
}

/// How a trial's response window ended.
#[derive(Copy, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Pressed { key: ResponseKey, reaction_time: Duration },
    TimedOut,
}

impl Response {
    pub const TIMEOUT_KEY: &'static str = "none";

    pub fn key_name(&self) -> &'static str {
        match self {
            Response::Pressed { key, .. } => key.name(),
            Response::TimedOut => Self::TIMEOUT_KEY,
        }
    }

    pub fn reaction_time(&self) -> Option<Duration> {
        match self {
            Response::Pressed { reaction_time, .. } => Some(*reaction_time),
            Response::TimedOut => None,
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Response::Pressed { key, .. } if key.is_abort())
    }
}

/// Recorded result per trial, one output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub condition: String,
    pub target: String,
    pub words: [String; 3],
    pub response: Response,
    pub correct_answer: String,
    pub session_time: Duration,
}

impl ResponseRecord {
    /// Column names as existing analysis scripts expect them, spacing included.
    pub const HEADER: [&'static str; 10] = [
        "Condition",
        " Target",
        " Word1",
        " Word2",
        " Word3",
        " Answer",
        " CorrectAnswer",
        "RT",
        " IsCorrect",
        " Time",
    ];

    pub fn new(trial: &Trial, response: Response, session_time: Duration) -> Self {
        Self {
            condition: trial.condition_label.clone(),
            target: trial.target.clone(),
            words: trial.words.clone(),
            response,
            correct_answer: trial.correct.clone(),
            session_time,
        }
    }

    /// `None` when the trial was aborted; a timeout counts as incorrect.
    pub fn is_correct(&self) -> Option<bool> {
        if self.response.is_abort() {
            None
        } else {
            Some(self.response.key_name() == self.correct_answer)
        }
    }

    pub fn fields(&self) -> [String; 10] {
        [
            self.condition.clone(),
            self.target.clone(),
            self.words[0].clone(),
            self.words[1].clone(),
            self.words[2].clone(),
            self.response.key_name().to_string(),
            self.correct_answer.clone(),
            format_reaction_time(self.response.reaction_time()),
            match self.is_correct() {
                Some(true) => "1".to_string(),
                Some(false) => "0".to_string(),
                None => NOT_AVAILABLE.to_string(),
            },
            format_session_time(self.session_time),
        ]
    }
}

pub const NOT_AVAILABLE: &str = "NA";

/// Seconds with three decimals, or `NA`.
pub fn format_reaction_time(rt: Option<Duration>) -> String {
    match rt {
        Some(rt) => format!("{:.3}", rt.as_secs_f64()),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `MM : SS.s` with zero-padded minutes and seconds.
///
/// Rounds to tenths before splitting so seconds never read `60.0`.
pub fn format_session_time(elapsed: Duration) -> String {
    let tenths = (elapsed.as_millis() + 50) / 100;
    let minutes = tenths / 600;
    let rest = tenths % 600;
    format!("{:02} : {:02}.{}", minutes, rest / 10, rest % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog_trial() -> Trial {
        Trial {
            condition: Condition::High,
            condition_label: "high".into(),
            target: "dog".into(),
            words: ["cat".into(), "car".into(), "tree".into()],
            correct: "1".into(),
        }
    }

    #[test]
    fn correct_press_is_scored_and_timed() {
        let record = ResponseRecord::new(
            &dog_trial(),
            Response::Pressed {
                key: ResponseKey::One,
                reaction_time: Duration::from_millis(1234),
            },
            Duration::from_secs(12),
        );
        let fields = record.fields();
        assert_eq!(fields[5], "1");
        assert_eq!(fields[7], "1.234");
        assert_eq!(fields[8], "1");
        assert_eq!(fields[9], "00 : 12.0");
    }

    #[test]
    fn timeout_records_none_and_na_time() {
        let record = ResponseRecord::new(&dog_trial(), Response::TimedOut, Duration::ZERO);
        let fields = record.fields();
        assert_eq!(fields[5], "none");
        assert_eq!(fields[7], "NA");
        assert_eq!(fields[8], "0");
        assert_eq!(record.is_correct(), Some(false));
    }

    #[test]
    fn abort_keeps_reaction_time_but_not_correctness() {
        let record = ResponseRecord::new(
            &dog_trial(),
            Response::Pressed {
                key: ResponseKey::Escape,
                reaction_time: Duration::from_millis(500),
            },
            Duration::from_secs(61),
        );
        let fields = record.fields();
        assert_eq!(fields[5], "escape");
        assert_eq!(fields[7], "0.500");
        assert_eq!(fields[8], "NA");
        assert_eq!(fields[9], "01 : 01.0");
    }

    #[test]
    fn wrong_key_is_incorrect() {
        let record = ResponseRecord::new(
            &dog_trial(),
            Response::Pressed {
                key: ResponseKey::Three,
                reaction_time: Duration::from_millis(800),
            },
            Duration::ZERO,
        );
        assert_eq!(record.is_correct(), Some(false));
    }

    #[test]
    fn session_time_formatting() {
        assert_eq!(format_session_time(Duration::ZERO), "00 : 00.0");
        assert_eq!(format_session_time(Duration::from_millis(75_300)), "01 : 15.3");
        assert_eq!(format_session_time(Duration::from_secs(600)), "10 : 00.0");
        assert_eq!(format_session_time(Duration::from_millis(5_340)), "00 : 05.3");
    }

    #[test]
    fn session_time_rounds_into_the_next_minute() {
        assert_eq!(format_session_time(Duration::from_millis(59_960)), "01 : 00.0");
        assert_eq!(format_session_time(Duration::from_millis(119_970)), "02 : 00.0");
        assert_eq!(format_session_time(Duration::from_millis(59_940)), "00 : 59.9");
    }

    #[test]
    fn stimulus_texts_use_display_name() {
        let trial = dog_trial();
        let texts: Vec<_> = trial.texts().collect();
        assert_eq!(texts, ["meaning", "dog", "cat", "car", "tree"]);
    }

    #[test]
    fn feature_label_is_shown_as_written() {
        let trial = Trial {
            condition: Condition::Shape,
            condition_label: " Shape ".into(),
            ..dog_trial()
        };
        assert_eq!(trial.stimulus_label(), " Shape ");
        let low = Trial {
            condition: Condition::Low,
            condition_label: "LOW".into(),
            ..dog_trial()
        };
        assert_eq!(low.stimulus_label(), "meaning");
    }
}

use crate::input::InputKey;
use serde::{Deserialize, Serialize};

/// Participant and session metadata collected before the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub experiment_name: String,
    pub date: String,
    pub participant_id: String,
}

impl SessionInfo {
    /// `<ParticipantID>_<Date>.csv`
    pub fn output_file_name(&self) -> String {
        format!("{}_{}.csv", self.participant_id, self.date)
    }
}

/// Result of feeding one key to the setup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Editing,
    Confirmed(SessionInfo),
    Cancelled,
}

/// The modal setup form: name and date are fixed, the participant ID is typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupForm {
    pub title: String,
    pub experiment_name: String,
    pub date: String,
    pub participant_id: String,
}

impl SetupForm {
    pub fn new(experiment_name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: "Input Participant data".to_string(),
            experiment_name: experiment_name.into(),
            date: date.into(),
            participant_id: String::new(),
        }
    }

    pub fn handle_key(&mut self, key: &InputKey) -> FormAction {
        match key {
            InputKey::Escape => return FormAction::Cancelled,
            InputKey::Enter => {
                let id = self.participant_id.trim();
                if !id.is_empty() {
                    return FormAction::Confirmed(SessionInfo {
                        experiment_name: self.experiment_name.clone(),
                        date: self.date.clone(),
                        participant_id: id.to_string(),
                    });
                }
            }
            InputKey::Backspace => {
                self.participant_id.pop();
            }
            InputKey::Text(text) => {
                self.participant_id
                    .extend(text.chars().filter(|c| !c.is_control()));
            }
            InputKey::Space => self.participant_id.push(' '),
            InputKey::One => self.participant_id.push('1'),
            InputKey::Two => self.participant_id.push('2'),
            InputKey::Three => self.participant_id.push('3'),
        }
        FormAction::Editing
    }

    /// Label/value pairs in display order.
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("Experiment Name", self.experiment_name.as_str()),
            ("Date", self.date.as_str()),
            ("Participant ID", self.participant_id.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SetupForm {
        SetupForm::new("My test experiment", "20261016_101500")
    }

    #[test]
    fn typing_then_enter_confirms() {
        let mut f = form();
        assert_eq!(f.handle_key(&InputKey::Text("p0".into())), FormAction::Editing);
        f.handle_key(&InputKey::Text("7".into()));
        f.handle_key(&InputKey::Text("x".into()));
        f.handle_key(&InputKey::Backspace);
        let FormAction::Confirmed(info) = f.handle_key(&InputKey::Enter) else {
            panic!("form should confirm");
        };
        assert_eq!(info.participant_id, "p07");
        assert_eq!(info.output_file_name(), "p07_20261016_101500.csv");
    }

    #[test]
    fn empty_id_cannot_be_confirmed() {
        let mut f = form();
        f.handle_key(&InputKey::Space);
        assert_eq!(f.handle_key(&InputKey::Enter), FormAction::Editing);
    }

    #[test]
    fn escape_cancels() {
        let mut f = form();
        f.handle_key(&InputKey::Text("p1".into()));
        assert_eq!(f.handle_key(&InputKey::Escape), FormAction::Cancelled);
    }
}

use crate::error::{ExperimentError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "lexis.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub experiment_name: String,
    pub stimuli_path: PathBuf,
    pub output_dir: PathBuf,
    /// Fixes block and trial order when set
    pub seed: Option<u64>,
    pub font_path: Option<PathBuf>,
    pub window: WindowConfig,
    pub timing: TimingConfig,
    pub texts: TextConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            experiment_name: "My test experiment".to_string(),
            stimuli_path: PathBuf::from("stimuli/trials.csv"),
            output_dir: PathBuf::from("."),
            seed: None,
            font_path: None,
            window: WindowConfig::default(),
            timing: TimingConfig::default(),
            texts: TextConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            fullscreen: false,
        }
    }
}

/// Screen durations in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub opening_fixation_secs: f64,
    pub ready_secs: f64,
    pub instructions_secs: f64,
    pub trial_fixation_choices_secs: Vec<f64>,
    pub response_window_secs: f64,
    pub block_pause_choices_secs: Vec<f64>,
    /// Zero-based block index followed by the break screen
    pub break_after_block: usize,
    pub break_secs: f64,
    pub closing_fixation_secs: f64,
    pub complete_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            opening_fixation_secs: 5.0,
            ready_secs: 5.0,
            instructions_secs: 5.0,
            trial_fixation_choices_secs: vec![0.5, 2.5],
            response_window_secs: 10.0,
            block_pause_choices_secs: vec![7.5, 12.5],
            break_after_block: 2,
            break_secs: 10.0,
            closing_fixation_secs: 5.0,
            complete_secs: 7.0,
        }
    }
}

impl TimingConfig {
    pub fn opening_fixation(&self) -> Duration {
        secs(self.opening_fixation_secs)
    }
    pub fn ready(&self) -> Duration {
        secs(self.ready_secs)
    }
    pub fn instructions(&self) -> Duration {
        secs(self.instructions_secs)
    }
    pub fn response_window(&self) -> Duration {
        secs(self.response_window_secs)
    }
    pub fn break_screen(&self) -> Duration {
        secs(self.break_secs)
    }
    pub fn closing_fixation(&self) -> Duration {
        secs(self.closing_fixation_secs)
    }
    pub fn complete(&self) -> Duration {
        secs(self.complete_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub welcome: String,
    pub ready: String,
    /// `{condition}` is replaced by the block's upper-cased display name
    pub block_instructions: String,
    pub break_message: String,
    pub complete: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            welcome: "Welcome to our experiment!\n\n\nYou will see a target word and three choices.\n\n\
                      Choose the word closest to the meaning or to a specific feature of the target word as fast as possible.\n\n\
                      Left Answer: Keypress \"1\". Middle Answer: Keypress \"2\". Right Answer: Keypress \"3\".\n\n\
                      Press \"space\" to start"
                .to_string(),
            ready: "The experiment is about to begin.\n\nGET READY!".to_string(),
            block_instructions: "In the next block, choose the word that is a similar {condition} to the target word.\n\nGET READY!"
                .to_string(),
            break_message: "Take a short break, but please pay attention to the screen.\n\n\
                            The experiment is going to start again in a few seconds."
                .to_string(),
            complete: "You have completed this experiment!\n\nYour responses have been recorded.\n\n\
                       Thank you for taking part!\n\nThis screen will close in a few seconds."
                .to_string(),
        }
    }
}

impl TextConfig {
    pub fn block_instructions_for(&self, display_name: &str) -> String {
        self.block_instructions
            .replace("{condition}", &display_name.to_uppercase())
    }
}

impl ExperimentConfig {
    /// Reads a TOML config; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ExperimentError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents).map_err(|err| match err {
            ExperimentError::ConfigParse { source, .. } => ExperimentError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|source| ExperimentError::ConfigParse {
                path: PathBuf::new(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let timing = &self.timing;
        if timing.trial_fixation_choices_secs.is_empty() {
            return Err(ExperimentError::InvalidConfig(
                "timing.trial_fixation_choices_secs is empty".into(),
            ));
        }
        if timing.block_pause_choices_secs.is_empty() {
            return Err(ExperimentError::InvalidConfig(
                "timing.block_pause_choices_secs is empty".into(),
            ));
        }
        let all = [
            timing.opening_fixation_secs,
            timing.ready_secs,
            timing.instructions_secs,
            timing.response_window_secs,
            timing.break_secs,
            timing.closing_fixation_secs,
            timing.complete_secs,
        ];
        if all
            .iter()
            .chain(&timing.trial_fixation_choices_secs)
            .chain(&timing.block_pause_choices_secs)
            .any(|s| !s.is_finite() || *s < 0.0)
        {
            return Err(ExperimentError::InvalidConfig(
                "durations must be finite and non-negative".into(),
            ));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ExperimentError::InvalidConfig(
                "window size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

pub fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_the_protocol() {
        let config = ExperimentConfig::default();
        assert_eq!(config.timing.response_window(), Duration::from_secs(10));
        assert_eq!(config.timing.trial_fixation_choices_secs, [0.5, 2.5]);
        assert_eq!(config.timing.block_pause_choices_secs, [7.5, 12.5]);
        assert_eq!(config.timing.break_after_block, 2);
        assert_eq!(config.stimuli_path, PathBuf::from("stimuli/trials.csv"));
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = ExperimentConfig::from_toml(
            r#"
            seed = 7

            [timing]
            response_window_secs = 4.0

            [window]
            fullscreen = true
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.timing.response_window(), Duration::from_secs(4));
        assert_eq!(config.timing.ready_secs, 5.0);
        assert!(config.window.fullscreen);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.experiment_name, "My test experiment");
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempdir().unwrap();
        let config = ExperimentConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, ExperimentConfig::default());
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "seed = \"not a number\"").unwrap();
        let err = ExperimentConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE), "{err}");
    }

    #[test]
    fn empty_pause_choices_are_rejected() {
        let err = ExperimentConfig::from_toml("[timing]\nblock_pause_choices_secs = []").unwrap_err();
        assert!(matches!(err, ExperimentError::InvalidConfig(_)));
    }

    #[test]
    fn block_text_names_the_condition() {
        let texts = TextConfig::default();
        let text = texts.block_instructions_for("meaning");
        assert!(text.contains("similar MEANING to the target"));
    }
}

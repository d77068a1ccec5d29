use crate::error::{ExperimentError, Result};
use csv::ReaderBuilder;
use lexis_core::{Condition, Trial};
use log::{info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TrialRow {
    #[serde(rename = "Condition")]
    condition: String,
    #[serde(rename = "Target")]
    target: String,
    #[serde(rename = "Word1")]
    word1: String,
    #[serde(rename = "Word2")]
    word2: String,
    #[serde(rename = "Word3")]
    word3: String,
    #[serde(rename = "Correct")]
    correct: String,
}

impl TrialRow {
    fn into_trial(self) -> Option<Trial> {
        let condition = Condition::from_label(&self.condition)?;
        Some(Trial {
            condition,
            condition_label: self.condition,
            target: self.target,
            words: [self.word1, self.word2, self.word3],
            correct: self.correct,
        })
    }
}

/// Loaded trials bucketed by condition, in file order.
#[derive(Debug, Clone, Default)]
pub struct ConditionGroups {
    groups: BTreeMap<Condition, Vec<Trial>>,
    skipped: usize,
}

impl ConditionGroups {
    pub fn trials(&self, condition: Condition) -> &[Trial] {
        self.groups
            .get(&condition)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows dropped because their condition is not one of the six
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn push(&mut self, trial: Trial) {
        self.groups.entry(trial.condition).or_default().push(trial);
    }
}

pub fn read_trials(path: &Path) -> Result<ConditionGroups> {
    let reader = ReaderBuilder::new()
        .from_path(path)
        .map_err(|source| ExperimentError::StimuliOpen {
            path: path.to_path_buf(),
            source,
        })?;
    let groups = collect(reader)?;
    info!(
        "Loaded {} trials from {} ({} skipped)",
        groups.len(),
        path.display(),
        groups.skipped()
    );
    for condition in Condition::ALL {
        let count = groups.trials(condition).len();
        if count == 0 {
            warn!("No trials for condition '{}'", condition);
        } else {
            info!("  {}: {} trials", condition, count);
        }
    }
    Ok(groups)
}

pub fn read_trials_from<R: io::Read>(rdr: R) -> Result<ConditionGroups> {
    collect(ReaderBuilder::new().from_reader(rdr))
}

fn collect<R: io::Read>(mut reader: csv::Reader<R>) -> Result<ConditionGroups> {
    let mut groups = ConditionGroups::default();
    for (idx, row) in reader.deserialize::<TrialRow>().enumerate() {
        let row = row.map_err(|source| ExperimentError::StimulusRow {
            row: idx + 1,
            source,
        })?;
        let label = row.condition.clone();
        match row.into_trial() {
            Some(trial) => groups.push(trial),
            None => {
                warn!("Skipping row {}: unknown condition '{}'", idx + 1, label);
                groups.skipped += 1;
            }
        }
    }
    Ok(groups)
}

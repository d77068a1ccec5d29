use crate::config::ExperimentConfig;
use crate::error::Result;
use crate::plan::BlockPlan;
use crate::record::{ResultWriter, create_output};
use crate::stimuli::read_trials;
use lexis_core::{FormAction, InputKey, SessionInfo, SetupForm};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::path::PathBuf;

/// Everything a confirmed setup form yields before the first screen.
pub struct PreparedSession {
    pub info: SessionInfo,
    pub seed: u64,
    pub plan: BlockPlan,
    pub rng: StdRng,
    pub output: PathBuf,
    pub writer: ResultWriter<File>,
}

/// Result of one key press while the setup form is up.
pub enum SetupStep {
    Editing,
    Ready(Box<PreparedSession>),
    Cancelled,
}

/// Loads stimuli, shuffles the plan and opens the result file.
pub fn prepare_session(
    config: &ExperimentConfig,
    info: SessionInfo,
    seed: u64,
) -> Result<PreparedSession> {
    info!(
        "Experiment '{}', participant '{}', date {}",
        info.experiment_name, info.participant_id, info.date
    );
    let groups = read_trials(&config.stimuli_path)?;

    info!("RNG seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    let plan = BlockPlan::build(&groups, &mut rng);

    let (output, writer) = create_output(&config.output_dir, &info)?;
    Ok(PreparedSession {
        info,
        seed,
        plan,
        rng,
        output,
        writer,
    })
}

/// Feeds a key to the form. Nothing touches the disk unless the form is confirmed.
///
/// `fresh_seed` is only called when the config does not pin a seed.
pub fn apply_setup_key(
    form: &mut SetupForm,
    key: &InputKey,
    config: &ExperimentConfig,
    fresh_seed: impl FnOnce() -> u64,
) -> Result<SetupStep> {
    match form.handle_key(key) {
        FormAction::Editing => Ok(SetupStep::Editing),
        FormAction::Cancelled => {
            warn!("Setup cancelled, no output file created");
            Ok(SetupStep::Cancelled)
        }
        FormAction::Confirmed(info) => {
            let seed = config.seed.unwrap_or_else(fresh_seed);
            let prepared = prepare_session(config, info, seed)?;
            Ok(SetupStep::Ready(Box::new(prepared)))
        }
    }
}

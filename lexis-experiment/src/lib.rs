pub mod config;
pub mod error;
pub mod plan;
pub mod record;
pub mod setup;
pub mod state;
pub mod stimuli;
pub use config::{CONFIG_FILE, ExperimentConfig, TextConfig, TimingConfig, WindowConfig};
pub use error::{ExperimentError, Result};
pub use plan::{Block, BlockPlan};
pub use record::{RecordSink, ResultWriter, create_output};
pub use setup::{PreparedSession, SetupStep, apply_setup_key, prepare_session};
pub use state::{ExperimentEvent, ExperimentStateMachine, Outcome};
pub use stimuli::{ConditionGroups, read_trials, read_trials_from};

mod app;
mod keys;

use anyhow::Context;
use app::App;
use lexis_experiment::{CONFIG_FILE, ExperimentConfig};
use log::error;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ExperimentConfig::load(Path::new(CONFIG_FILE))
        .with_context(|| format!("loading {CONFIG_FILE}"))?;
    let app = App::new(config)?;
    if let Err(err) = app.run() {
        error!("{err:#}");
        return Err(err);
    }

    Ok(())
}

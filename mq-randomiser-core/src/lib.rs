use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod character;
pub mod config;
pub mod encounter;
pub mod engine;
pub mod items;
pub mod mutate;
pub mod pools;
pub mod rank;
pub mod records;
mod reward;
pub mod schedule;
pub mod store;
mod treasure;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Policy, RandomiserConfig};
pub use engine::{Randomiser, RunReport};
pub use items::{Catalog, Item, ItemCategory};
pub use store::{RecordStore, TableKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomiserSettings {
    pub seed: u64,
    pub randomize_treasures: bool,
    pub randomize_monsters: bool,
    pub randomize_formations: bool,
    pub randomize_bosses: bool,
    pub randomize_battlefields: bool,
    pub randomize_characters: bool,
    pub debug: bool,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default)]
    pub config_path: Option<PathBuf>,
}

impl RandomiserSettings {
    /// Table kinds the toggles switch on. Boss promotion rides on the boss
    /// toggle; battlefields cover both rounds and rewards.
    pub fn enabled_tables(&self) -> Vec<TableKind> {
        let toggles = [
            (self.randomize_treasures, TableKind::Treasure),
            (self.randomize_monsters, TableKind::Monster),
            (self.randomize_formations, TableKind::Formation),
            (self.randomize_bosses, TableKind::BattleFormation),
            (self.randomize_battlefields, TableKind::BattleRounds),
            (self.randomize_battlefields, TableKind::BattleReward),
            (self.randomize_characters, TableKind::Character),
        ];
        toggles
            .into_iter()
            .filter(|&(on, _)| on)
            .map(|(_, kind)| kind)
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum RandomiserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, RandomiserError>;

fn find_first_existing(base: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|path| path.exists())
}

/// A snapshot file, or a directory holding one under a conventional name.
fn locate_snapshot(input: &Path) -> Result<PathBuf> {
    if input.is_file() {
        return Ok(input.to_path_buf());
    }
    find_first_existing(
        input,
        &["snapshot.json", "snapshot.json.gz", "data/snapshot.json", "data/snapshot.json.gz"],
    )
    .ok_or_else(|| {
        RandomiserError::Config(format!(
            "Could not find snapshot.json or snapshot.json.gz under {}",
            input.display()
        ))
    })
}

pub fn run(settings: RandomiserSettings) -> Result<()> {
    if !settings.input_path.exists() {
        return Err(RandomiserError::Config(format!(
            "Input path does not exist: {}",
            settings.input_path.display()
        )));
    }

    let config = match &settings.config_path {
        Some(path) => RandomiserConfig::load(path)?,
        None => RandomiserConfig::builtin(),
    };

    let snapshot_src = locate_snapshot(&settings.input_path)?;
    let mut store = RecordStore::load(&snapshot_src)?;

    let randomiser = Randomiser::new(config, &settings.enabled_tables(), settings.randomize_bosses)?;
    let report = randomiser.run_all(&mut store, settings.seed)?;

    // Nothing is written until the whole run has succeeded. Each seed gets
    // its own folder so repeated runs never overwrite one another.
    let out_root = settings
        .output_path
        .join(format!("MysticQuest_{}", settings.seed));
    fs::create_dir_all(&out_root)?;

    let file_name = snapshot_src
        .file_name()
        .map_or_else(|| "snapshot.json".into(), |name| name.to_os_string());
    let snapshot_dest = out_root.join(file_name);
    store.save(&snapshot_dest)?;
    info!("wrote {}", snapshot_dest.display());

    if settings.debug {
        let mut log = format!(
            "snapshot: {} -> {}\n",
            snapshot_src.display(),
            snapshot_dest.display()
        );
        log.push_str(&report.spoiler_log(randomiser.config(), &store));
        fs::write(out_root.join("spoiler_log.txt"), log)?;
    }

    Ok(())
}

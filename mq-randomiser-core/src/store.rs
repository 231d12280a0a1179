use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::mutate::{Bounds, FieldPolicy};
use crate::records::{
    BattleFormation, BattleReward, BattleRounds, Character, Formation, Monster, TreasureSlot,
    EMPTY_SLOT,
};
use crate::{RandomiserError, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Treasure,
    Monster,
    Formation,
    BattleFormation,
    BattleRounds,
    BattleReward,
    Character,
}

const MONSTER_FIELDS: &[FieldPolicy] = &[
    FieldPolicy::new("hp", Bounds::Proportional, 0xFFFF),
    FieldPolicy::new("strength", Bounds::Proportional, 0xFF),
    FieldPolicy::new("defense", Bounds::Proportional, 0xFF),
    FieldPolicy::new("speed", Bounds::Proportional, 0xFF),
    FieldPolicy::new("magic", Bounds::Proportional, 0xFF),
];

const ROUNDS_FIELDS: &[FieldPolicy] = &[FieldPolicy::new("num_rounds", Bounds::Fixed(0, 0xFF), 0xFF)];

const CHARACTER_FIELDS: &[FieldPolicy] = &[
    FieldPolicy::new("max_hp", Bounds::Proportional, 9999),
    FieldPolicy::new("strength", Bounds::Fixed(1, 99), 0xFF),
    FieldPolicy::new("constitution", Bounds::Fixed(1, 99), 0xFF),
    FieldPolicy::new("speed", Bounds::Fixed(1, 99), 0xFF),
    FieldPolicy::new("magic", Bounds::Fixed(1, 99), 0xFF),
    FieldPolicy::new("accuracy", Bounds::Proportional, 0xFF),
    FieldPolicy::new("evade", Bounds::Proportional, 0xFF),
];

impl TableKind {
    pub const ALL: [TableKind; 7] = [
        TableKind::Treasure,
        TableKind::Monster,
        TableKind::Formation,
        TableKind::BattleFormation,
        TableKind::BattleRounds,
        TableKind::BattleReward,
        TableKind::Character,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TableKind::Treasure => "treasures",
            TableKind::Monster => "monsters",
            TableKind::Formation => "formations",
            TableKind::BattleFormation => "battle formations",
            TableKind::BattleRounds => "battle rounds",
            TableKind::BattleReward => "battle rewards",
            TableKind::Character => "characters",
        }
    }

    /// Field name -> bounds declared for the per-record numeric walk.
    pub fn mutate_attributes(self) -> &'static [FieldPolicy] {
        match self {
            TableKind::Monster => MONSTER_FIELDS,
            TableKind::BattleRounds => ROUNDS_FIELDS,
            TableKind::Character => CHARACTER_FIELDS,
            _ => &[],
        }
    }
}

/// Every typed record of a snapshot, keyed by table and position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStore {
    #[serde(default)]
    pub treasures: Vec<TreasureSlot>,
    #[serde(default)]
    pub monsters: Vec<Monster>,
    #[serde(default)]
    pub formations: Vec<Formation>,
    #[serde(default)]
    pub battle_formations: Vec<BattleFormation>,
    #[serde(default)]
    pub battle_rounds: Vec<BattleRounds>,
    #[serde(default)]
    pub battle_rewards: Vec<BattleReward>,
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl RecordStore {
    pub fn len(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::Treasure => self.treasures.len(),
            TableKind::Monster => self.monsters.len(),
            TableKind::Formation => self.formations.len(),
            TableKind::BattleFormation => self.battle_formations.len(),
            TableKind::BattleRounds => self.battle_rounds.len(),
            TableKind::BattleReward => self.battle_rewards.len(),
            TableKind::Character => self.characters.len(),
        }
    }

    pub fn is_mutated(&self, kind: TableKind, index: usize) -> bool {
        match kind {
            TableKind::Treasure => self.treasures[index].mutated,
            TableKind::Monster => self.monsters[index].mutated,
            TableKind::Formation => self.formations[index].mutated,
            TableKind::BattleFormation => self.battle_formations[index].mutated,
            TableKind::BattleRounds => self.battle_rounds[index].mutated,
            TableKind::BattleReward => self.battle_rewards[index].mutated,
            TableKind::Character => self.characters[index].mutated,
        }
    }

    pub fn mark_mutated(&mut self, kind: TableKind, index: usize) {
        match kind {
            TableKind::Treasure => self.treasures[index].mutated = true,
            TableKind::Monster => self.monsters[index].mutated = true,
            TableKind::Formation => self.formations[index].mutated = true,
            TableKind::BattleFormation => self.battle_formations[index].mutated = true,
            TableKind::BattleRounds => self.battle_rounds[index].mutated = true,
            TableKind::BattleReward => self.battle_rewards[index].mutated = true,
            TableKind::Character => self.characters[index].mutated = true,
        }
    }

    /// Cross-table reference checks run once after loading.
    pub fn check_shape(&self) -> Result<()> {
        let clusters = self.battle_formations.len();
        if self.battle_rounds.len() != clusters || self.battle_rewards.len() != clusters {
            return Err(RandomiserError::Config(format!(
                "battle formations ({}), rounds ({}) and rewards ({}) must line up",
                clusters,
                self.battle_rounds.len(),
                self.battle_rewards.len()
            )));
        }

        for (index, formation) in self.formations.iter().enumerate() {
            for &m in &formation.slots {
                if m != EMPTY_SLOT && m as usize >= self.monsters.len() {
                    return Err(RandomiserError::Config(format!(
                        "formation {} references missing monster 0x{:02X}",
                        index, m
                    )));
                }
            }
        }

        for (index, cluster) in self.battle_formations.iter().enumerate() {
            if cluster.groups.is_empty() || cluster.groups.len() > 3 {
                return Err(RandomiserError::Config(format!(
                    "battle formation {} has {} groups (expected 1-3)",
                    index,
                    cluster.groups.len()
                )));
            }
            if let Some(&g) = cluster
                .groups
                .iter()
                .find(|&&g| g as usize >= self.formations.len())
            {
                return Err(RandomiserError::Config(format!(
                    "battle formation {} references missing formation {}",
                    index, g
                )));
            }
        }

        Ok(())
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let store: RecordStore = serde_json::from_slice(bytes)?;
        store.check_shape()?;
        Ok(store)
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Reads a JSON snapshot; `.gz` paths are gunzipped first.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)?;
        if is_gzip_path(path) {
            let mut decoder = GzDecoder::new(raw.as_slice());
            let mut json = Vec::new();
            decoder.read_to_end(&mut json)?;
            Self::from_json_slice(&json)
        } else {
            Self::from_json_slice(&raw)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_vec()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if is_gzip_path(path) {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&json)?;
            fs::write(path, encoder.finish()?)?;
        } else {
            fs::write(path, json)?;
        }
        Ok(())
    }
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"))
}

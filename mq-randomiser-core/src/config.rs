use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::items::Catalog;
use crate::store::RecordStore;
use crate::{RandomiserError, Result};

/// Monsters at or past this index are bosses.
const BOSS_MONSTER_THRESHOLD: usize = 0x40;

// Scripted or glitchy monsters that must not show up in regular groups.
const FORMATION_BANNED_MONSTERS: &[u8] = &[0x3E, 0x3F];

// Final-tier bosses that stay where the story puts them.
const BOSS_BANNED_MONSTERS: &[u8] = &[0x50, 0x51, 0x52];

/// Per-table ban-lists and tuning knobs, supplied as static configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub boss_monster_threshold: usize,
    pub formation_banned_monsters: Vec<u8>,
    pub boss_banned_monsters: Vec<u8>,
    /// Treasure slot holding the bombs; never changed.
    pub bomb_treasure: Option<usize>,
    /// Reward slots fixed by the game script (the Exit spell reward).
    pub fixed_rewards: Vec<usize>,
    /// Item a reward draw must skip because a fixed slot already grants it.
    pub fixed_reward_item: Option<u8>,
    pub placeholder_character: Option<String>,
    pub hp_granularity: u16,
    pub boss_promotion_rate: f64,
    pub well_hidden_rate: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            boss_monster_threshold: BOSS_MONSTER_THRESHOLD,
            formation_banned_monsters: FORMATION_BANNED_MONSTERS.to_vec(),
            boss_banned_monsters: BOSS_BANNED_MONSTERS.to_vec(),
            bomb_treasure: Some(0x0E),
            fixed_rewards: vec![0],
            fixed_reward_item: Some(0x14),
            placeholder_character: Some("Dummy".to_string()),
            hp_granularity: 10,
            boss_promotion_rate: 0.125,
            well_hidden_rate: 0.25,
        }
    }
}

impl Policy {
    pub fn is_fixed_reward(&self, index: usize) -> bool {
        self.fixed_rewards.contains(&index)
    }

    pub fn is_placeholder(&self, name: &str) -> bool {
        self.placeholder_character.as_deref() == Some(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomiserConfig {
    pub catalog: Catalog,
    #[serde(default)]
    pub policy: Policy,
}

impl RandomiserConfig {
    pub fn builtin() -> Self {
        RandomiserConfig {
            catalog: Catalog::builtin(),
            policy: Policy::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Checks the catalog and every ban-list against the snapshot. Any
    /// failure here aborts the run before a single record changes.
    pub fn validate(&self, store: &RecordStore) -> Result<()> {
        self.catalog.validate()?;
        let policy = &self.policy;

        let banned = policy
            .formation_banned_monsters
            .iter()
            .chain(&policy.boss_banned_monsters);
        for &m in banned {
            if m as usize >= store.monsters.len() {
                return Err(RandomiserError::Config(format!(
                    "ban-list names monster 0x{:02X} but the snapshot has {} monsters",
                    m,
                    store.monsters.len()
                )));
            }
        }

        if let Some(&index) = policy
            .fixed_rewards
            .iter()
            .find(|&&i| i >= store.battle_rewards.len())
        {
            return Err(RandomiserError::Config(format!(
                "fixed reward slot {} is out of range",
                index
            )));
        }

        if let Some(index) = policy.bomb_treasure {
            if index >= store.treasures.len() {
                return Err(RandomiserError::Config(format!(
                    "bomb treasure slot {} is out of range",
                    index
                )));
            }
        }

        if let Some(id) = policy.fixed_reward_item {
            if self.catalog.get(id).is_none() {
                return Err(RandomiserError::Config(format!(
                    "fixed reward item 0x{:02X} is not in the catalog",
                    id
                )));
            }
        }

        if policy.hp_granularity == 0 {
            return Err(RandomiserError::Config(
                "hp_granularity must be at least 1".to_string(),
            ));
        }

        for (name, rate) in [
            ("boss_promotion_rate", policy.boss_promotion_rate),
            ("well_hidden_rate", policy.well_hidden_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(RandomiserError::Config(format!(
                    "{} must lie in [0, 1], got {}",
                    name, rate
                )));
            }
        }

        Ok(())
    }
}

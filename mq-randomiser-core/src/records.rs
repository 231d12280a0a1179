use serde::{Deserialize, Serialize};

/// Monster slot sentinel inside an encounter group.
pub const EMPTY_SLOT: u8 = 0xFF;

/// Weights applied to occupant ranks, hardest occupant first.
const GROUP_RANK_WEIGHTS: [f64; 3] = [1.0, 0.5, 0.25];

pub trait HasCatalogName {
    fn catalog_name(&self) -> &str;
}

/// Records that carry the five combat-relevant stats.
pub trait HasCombatFields {
    fn combat_stats(&self) -> CombatStats;

    fn rank(&self) -> f64 {
        self.combat_stats().rank()
    }
}

/// Named numeric fields that the field mutators may rewrite.
pub trait MutableFields {
    fn field(&self, name: &str) -> Option<u32>;
    fn set_field(&mut self, name: &str, value: u32) -> bool;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub hp: u16,
    pub strength: u8,
    pub defense: u8,
    pub speed: u8,
    pub magic: u8,
}

impl CombatStats {
    /// Product of the nonzero stats; a record with no stats ranks 0.
    pub fn rank(&self) -> f64 {
        let values = [
            f64::from(self.hp),
            f64::from(self.strength),
            f64::from(self.defense),
            f64::from(self.speed),
            f64::from(self.magic),
        ];
        let mut product = 1.0;
        let mut any = false;
        for v in values {
            if v > 0.0 {
                product *= v;
                any = true;
            }
        }
        if any {
            product
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureSlot {
    pub contents: u8,
    #[serde(skip)]
    pub mutated: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    #[serde(flatten)]
    pub stats: CombatStats,
    pub resistances: u8,
    pub weaknesses: u8,
    pub immunities: u8,
    #[serde(default)]
    pub counter: bool,
    #[serde(skip)]
    pub mutated: bool,
}

impl Monster {
    pub fn is_boss(index: usize, threshold: usize) -> bool {
        index >= threshold
    }
}

impl HasCatalogName for Monster {
    fn catalog_name(&self) -> &str {
        &self.name
    }
}

impl HasCombatFields for Monster {
    fn combat_stats(&self) -> CombatStats {
        self.stats
    }
}

impl MutableFields for Monster {
    fn field(&self, name: &str) -> Option<u32> {
        match name {
            "hp" => Some(u32::from(self.stats.hp)),
            "strength" => Some(u32::from(self.stats.strength)),
            "defense" => Some(u32::from(self.stats.defense)),
            "speed" => Some(u32::from(self.stats.speed)),
            "magic" => Some(u32::from(self.stats.magic)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: u32) -> bool {
        match name {
            "hp" => self.stats.hp = value.min(u32::from(u16::MAX)) as u16,
            "strength" => self.stats.strength = clamp_u8(value),
            "defense" => self.stats.defense = clamp_u8(value),
            "speed" => self.stats.speed = clamp_u8(value),
            "magic" => self.stats.magic = clamp_u8(value),
            _ => return false,
        }
        true
    }
}

/// An encounter group ("formation"): up to three monsters fought together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formation {
    pub slots: [u8; 3],
    #[serde(skip)]
    pub mutated: bool,
}

impl Default for Formation {
    fn default() -> Self {
        Formation {
            slots: [EMPTY_SLOT; 3],
            mutated: false,
        }
    }
}

impl Formation {
    pub fn occupants(&self) -> Vec<u8> {
        self.slots
            .iter()
            .copied()
            .filter(|&m| m != EMPTY_SLOT)
            .collect()
    }

    /// Middle slot once two or more slots are occupied, else the sole occupant.
    pub fn leader(&self) -> Option<u8> {
        let occupants = self.occupants();
        match occupants.len() {
            0 => None,
            1 => Some(occupants[0]),
            _ if self.slots[1] != EMPTY_SLOT => Some(self.slots[1]),
            _ => Some(occupants[occupants.len() / 2]),
        }
    }

    /// Occupants as an unordered multiset (sorted), used for uniqueness checks.
    pub fn occupant_key(&self) -> Vec<u8> {
        let mut key = self.occupants();
        key.sort_unstable();
        key
    }

    pub fn rank(&self, monsters: &[Monster]) -> f64 {
        let mut ranks: Vec<f64> = self
            .occupants()
            .into_iter()
            .filter_map(|m| monsters.get(m as usize))
            .map(|m| m.rank())
            .collect();
        ranks.sort_by(|a, b| b.total_cmp(a));
        ranks
            .iter()
            .zip(GROUP_RANK_WEIGHTS)
            .map(|(rank, weight)| rank * weight)
            .sum()
    }

    pub fn is_boss(&self, threshold: usize) -> bool {
        self.leader()
            .map_or(false, |m| Monster::is_boss(m as usize, threshold))
    }
}

/// An encounter cluster ("battle formation"): 1-3 groups fought in rounds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleFormation {
    pub groups: Vec<u8>,
    #[serde(skip)]
    pub mutated: bool,
}

impl BattleFormation {
    pub fn rank(&self, formations: &[Formation], monsters: &[Monster]) -> f64 {
        self.groups
            .iter()
            .filter_map(|&g| formations.get(g as usize))
            .map(|f| f.rank(monsters))
            .fold(0.0, f64::max)
    }

    /// Hardest single monster across every member group.
    pub fn strongest_occupant(&self, formations: &[Formation], monsters: &[Monster]) -> f64 {
        self.groups
            .iter()
            .filter_map(|&g| formations.get(g as usize))
            .flat_map(|f| f.occupants())
            .filter_map(|m| monsters.get(m as usize))
            .map(|m| m.rank())
            .fold(0.0, f64::max)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRounds {
    pub num_rounds: u8,
    #[serde(skip)]
    pub mutated: bool,
}

impl MutableFields for BattleRounds {
    fn field(&self, name: &str) -> Option<u32> {
        match name {
            "num_rounds" => Some(u32::from(self.num_rounds)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: u32) -> bool {
        match name {
            "num_rounds" => {
                self.num_rounds = clamp_u8(value);
                true
            }
            _ => false,
        }
    }
}

pub const REWARD_EXPERIENCE_FLAG: u16 = 0x8000;
pub const REWARD_ITEM_FLAG: u16 = 0x4000;
pub const REWARD_RESERVED_MASK: u16 = 0x3C00;
pub const REWARD_VALUE_MASK: u16 = 0x03FF;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardKind {
    Experience(u16),
    Item(u8),
    Currency(u16),
}

/// Packed 16-bit reward word: tag bits on top, a 10-bit value below.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardSlot(pub u16);

impl RewardSlot {
    pub fn pack(kind: RewardKind) -> Self {
        match kind {
            RewardKind::Experience(amount) => {
                RewardSlot(REWARD_EXPERIENCE_FLAG | (amount & REWARD_VALUE_MASK))
            }
            RewardKind::Item(id) => RewardSlot(REWARD_ITEM_FLAG | u16::from(id)),
            RewardKind::Currency(amount) => RewardSlot(amount & REWARD_VALUE_MASK),
        }
    }

    pub fn kind(self) -> RewardKind {
        let value = self.0 & REWARD_VALUE_MASK;
        if self.0 & REWARD_ITEM_FLAG != 0 {
            RewardKind::Item((value & 0xFF) as u8)
        } else if self.0 & REWARD_EXPERIENCE_FLAG != 0 {
            RewardKind::Experience(value)
        } else {
            RewardKind::Currency(value)
        }
    }

    pub fn item(self) -> Option<u8> {
        match self.kind() {
            RewardKind::Item(id) => Some(id),
            _ => None,
        }
    }

    pub fn amount(self) -> u16 {
        self.0 & REWARD_VALUE_MASK
    }

    /// Describes the first broken packing rule, if any.
    pub fn violation(self) -> Option<&'static str> {
        if self.0 & REWARD_EXPERIENCE_FLAG != 0 && self.0 & REWARD_ITEM_FLAG != 0 {
            return Some("experience and item tags both set");
        }
        if self.0 & REWARD_RESERVED_MASK != 0 {
            return Some("reserved bits set");
        }
        if self.0 & REWARD_ITEM_FLAG != 0 && self.0 & 0x0300 != 0 {
            return Some("item id wider than a byte");
        }
        None
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReward {
    pub reward: RewardSlot,
    #[serde(skip)]
    pub mutated: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStats {
    pub strength: u8,
    pub constitution: u8,
    pub speed: u8,
    pub magic: u8,
    pub accuracy: u8,
    pub evade: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub level: u8,
    pub max_hp: u16,
    pub current_hp: u16,
    pub stats: CoreStats,
    /// Copy of `stats` read by the status screen and level-up code.
    pub base_stats: CoreStats,
    pub white_level: u8,
    pub black_level: u8,
    pub wizard_level: u8,
    /// White spells in the high nibble, black spells in the low nibble.
    pub known_magic: u8,
    /// Wizard spells in the high nibble; the low nibble is left alone.
    pub known_wizard: u8,
    #[serde(skip)]
    pub mutated: bool,
}

impl Character {
    pub fn known_white(&self) -> u8 {
        self.known_magic >> 4
    }

    pub fn known_black(&self) -> u8 {
        self.known_magic & 0x0F
    }

    pub fn known_wizard(&self) -> u8 {
        self.known_wizard >> 4
    }

    pub fn discipline_levels(&self) -> [u8; 3] {
        [self.white_level, self.black_level, self.wizard_level]
    }

    pub fn knows(&self) -> [bool; 3] {
        [
            self.known_white() != 0,
            self.known_black() != 0,
            self.known_wizard() != 0,
        ]
    }
}

impl HasCatalogName for Character {
    fn catalog_name(&self) -> &str {
        &self.name
    }
}

impl MutableFields for Character {
    fn field(&self, name: &str) -> Option<u32> {
        let s = &self.stats;
        match name {
            "max_hp" => Some(u32::from(self.max_hp)),
            "strength" => Some(u32::from(s.strength)),
            "constitution" => Some(u32::from(s.constitution)),
            "speed" => Some(u32::from(s.speed)),
            "magic" => Some(u32::from(s.magic)),
            "accuracy" => Some(u32::from(s.accuracy)),
            "evade" => Some(u32::from(s.evade)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: u32) -> bool {
        let s = &mut self.stats;
        match name {
            "max_hp" => self.max_hp = value.min(u32::from(u16::MAX)) as u16,
            "strength" => s.strength = clamp_u8(value),
            "constitution" => s.constitution = clamp_u8(value),
            "speed" => s.speed = clamp_u8(value),
            "magic" => s.magic = clamp_u8(value),
            "accuracy" => s.accuracy = clamp_u8(value),
            "evade" => s.evade = clamp_u8(value),
            _ => return false,
        }
        true
    }
}

fn clamp_u8(value: u32) -> u8 {
    value.min(u32::from(u8::MAX)) as u8
}

//! Small synthetic snapshot shared by the unit tests.

use crate::config::{Policy, RandomiserConfig};
use crate::items::Catalog;
use crate::records::{
    BattleFormation, BattleReward, BattleRounds, Character, CombatStats, CoreStats, Formation,
    Monster, RewardKind, RewardSlot, TreasureSlot, EMPTY_SLOT,
};
use crate::store::RecordStore;

const E: u8 = EMPTY_SLOT;

/// Monsters 20.. are bosses.
pub(crate) const SAMPLE_BOSS_THRESHOLD: usize = 20;

pub(crate) fn sample_config() -> RandomiserConfig {
    RandomiserConfig {
        catalog: Catalog::builtin(),
        policy: Policy {
            boss_monster_threshold: SAMPLE_BOSS_THRESHOLD,
            formation_banned_monsters: vec![18, 19],
            boss_banned_monsters: vec![27],
            bomb_treasure: Some(3),
            fixed_rewards: vec![0],
            ..Policy::default()
        },
    }
}

fn monster(index: usize) -> Monster {
    let i = index as u16;
    let boss = index >= SAMPLE_BOSS_THRESHOLD;
    let stats = if boss {
        CombatStats {
            hp: 2000 + 400 * i,
            strength: 60 + index as u8,
            defense: 50 + index as u8,
            speed: 30 + index as u8,
            magic: 40 + index as u8,
        }
    } else {
        CombatStats {
            hp: 20 + 15 * i,
            strength: 5 + index as u8,
            defense: 3 + index as u8,
            speed: 4 + (index % 5) as u8,
            magic: (index % 3) as u8,
        }
    };
    Monster {
        name: format!("{}{:02}", if boss { "Boss" } else { "Mob" }, index),
        stats,
        resistances: (index as u8).wrapping_mul(17) & 0x0F,
        weaknesses: 1 << (index % 8),
        immunities: if boss { 0x03 } else { 0 },
        counter: index % 4 == 0,
        mutated: false,
    }
}

fn formation(slots: [u8; 3]) -> Formation {
    Formation {
        slots,
        mutated: false,
    }
}

fn cluster(groups: &[u8]) -> BattleFormation {
    BattleFormation {
        groups: groups.to_vec(),
        mutated: false,
    }
}

fn character(name: &str, level: u8, known_magic: u8, known_wizard: u8) -> Character {
    let stats = CoreStats {
        strength: 10 + level,
        constitution: 8 + level,
        speed: 12,
        magic: 5 + level / 2,
        accuracy: 80,
        evade: 5,
    };
    Character {
        name: name.to_string(),
        level,
        max_hp: 40 * u16::from(level) + 3,
        current_hp: 40,
        stats,
        base_stats: stats,
        white_level: level / 2,
        black_level: level / 3,
        wizard_level: 1,
        known_magic,
        known_wizard,
        mutated: false,
    }
}

/// 28 monsters (8 bosses), 17 groups of which 3 are unreferenced, 11
/// battles, 12 treasures and 3 characters.
pub(crate) fn sample_store() -> RecordStore {
    let formations = vec![
        formation([0, 1, 2]),
        formation([1, 3, E]),
        formation([4, 4, E]),
        formation([5, 6, 7]),
        formation([2, 8, E]),
        formation([9, 10, 11]),
        formation([12, E, E]),
        formation([13, 14, 15]),
        formation([16, 17, E]),
        formation([18, 11, 19]),
        // Boss groups: the leader sits in the middle slot.
        formation([3, 20, 5]),
        formation([6, 21, E]),
        formation([22, E, E]),
        formation([8, 23, 9]),
        // Unreferenced.
        formation([E, E, E]),
        formation([E, E, E]),
        formation([E, E, E]),
    ];

    let battle_formations = vec![
        cluster(&[0]),
        cluster(&[1, 2]),
        cluster(&[3, 3, 4]),
        cluster(&[5]),
        cluster(&[6, 7]),
        cluster(&[8, 9]),
        cluster(&[10]),
        cluster(&[11]),
        cluster(&[12]),
        cluster(&[13]),
        cluster(&[0, 4]),
    ];

    let battle_rounds = (0..battle_formations.len())
        .map(|i| BattleRounds {
            num_rounds: 2 + (i % 4) as u8,
            mutated: false,
        })
        .collect();

    let battle_rewards = (0..battle_formations.len())
        .map(|i| {
            let kind = match i {
                0 => RewardKind::Item(0x14),
                i if i % 3 == 0 => RewardKind::Item(0x20 + i as u8),
                i if i % 3 == 1 => RewardKind::Experience(40 * i as u16),
                _ => RewardKind::Currency(25 * i as u16),
            };
            BattleReward {
                reward: RewardSlot::pack(kind),
                mutated: false,
            }
        })
        .collect();

    let treasures = [0x01, 0x10, 0x11, 0x29, 0x22, 0x23, 0x15, 0x12, 0x33, 0x2F, 0x13, 0x0C]
        .into_iter()
        .map(|contents| TreasureSlot {
            contents,
            mutated: false,
        })
        .collect();

    RecordStore {
        treasures,
        monsters: (0..28).map(monster).collect(),
        formations,
        battle_formations,
        battle_rounds,
        battle_rewards,
        characters: vec![
            character("Benjamin", 10, 0b0100_0010, 0b0010_0000),
            character("Kaeli", 8, 0b1000_0000, 0),
            character("Dummy", 1, 0, 0),
        ],
    }
}

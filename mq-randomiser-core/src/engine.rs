use log::info;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::character;
use crate::config::RandomiserConfig;
use crate::encounter::{
    become_boss, mutate_boss_formation, mutate_formation, BossBuild, EncounterState, Promotion,
    PromotionRequest,
};
use crate::mutate::{mutate_fields, toggle_elements, ElementMasks};
use crate::pools::{ItemPools, PoolKind};
use crate::rank::RankIndex;
use crate::records::{Monster, RewardKind};
use crate::reward::assign_reward;
use crate::schedule::DependencyTable;
use crate::store::{RecordStore, TableKind};
use crate::treasure::mutate_treasure;
use crate::{RandomiserError, Result};

const SCHEDULE_SALT: u64 = 0x0D3F_5C4E_D01E_0001;
const MUTATION_SALT: u64 = 0x4D51_7A8E_0000_0002;

/// What a run did, for logging and the spoiler file.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub schedule: Vec<TableKind>,
    pub edits: BTreeMap<TableKind, usize>,
    pub rollbacks: usize,
    pub boss_builds: Vec<BossBuild>,
    pub promotions: Vec<Promotion>,
    pub rewards: Vec<(usize, RewardKind)>,
    /// Well-hidden items no boss reward claimed.
    pub unclaimed_hidden: Vec<u8>,
    pub pool_draws: BTreeMap<PoolKind, usize>,
}

impl RunReport {
    pub fn spoiler_log(&self, config: &RandomiserConfig, store: &RecordStore) -> String {
        let catalog = &config.catalog;
        let monster = |m: u8| {
            store
                .monsters
                .get(m as usize)
                .map_or("???", |monster| monster.name.as_str())
        };

        let mut log = String::new();
        log.push_str(&format!("Mystic Quest randomiser seed: {}\n", self.seed));

        let order: Vec<&str> = self.schedule.iter().map(|k| k.name()).collect();
        log.push_str(&format!("schedule: {}\n", order.join(" -> ")));
        for (kind, count) in &self.edits {
            log.push_str(&format!("  {}: {} edits\n", kind.name(), count));
        }
        log.push_str(&format!("rolled back (duplicate groups): {}\n", self.rollbacks));

        log.push_str("pool draws:\n");
        for (pool, count) in &self.pool_draws {
            log.push_str(&format!("  {:?}: {}\n", pool, count));
        }

        log.push_str("boss promotions:\n");
        for p in &self.promotions {
            let followers: Vec<&str> = p.build.followers.iter().map(|&m| monster(m)).collect();
            let reward = p.reward.map_or("-", |id| catalog.name(id));
            log.push_str(&format!(
                "  battle {:3} -> group {:3}: {} with [{}], reward {}\n",
                p.cluster,
                p.build.formation,
                monster(p.build.leader),
                followers.join(", "),
                reward
            ));
        }

        log.push_str("rebuilt boss groups:\n");
        for b in &self.boss_builds {
            let followers: Vec<&str> = b.followers.iter().map(|&m| monster(m)).collect();
            log.push_str(&format!(
                "  group {:3}: {} with [{}]\n",
                b.formation,
                monster(b.leader),
                followers.join(", ")
            ));
        }

        log.push_str("battle rewards:\n");
        for (index, kind) in &self.rewards {
            let text = match *kind {
                RewardKind::Item(id) => catalog.name(id).to_string(),
                RewardKind::Experience(n) => format!("{} exp", n),
                RewardKind::Currency(n) => format!("{} GP", n),
            };
            log.push_str(&format!("  battle {:3}: {}\n", index, text));
        }

        if !self.unclaimed_hidden.is_empty() {
            let names: Vec<&str> = self.unclaimed_hidden.iter().map(|&id| catalog.name(id)).collect();
            log.push_str(&format!("unclaimed well-hidden items: {}\n", names.join(", ")));
        }

        log
    }
}

/// Runs the mutation passes for a fixed set of table kinds.
pub struct Randomiser {
    config: RandomiserConfig,
    kinds: Vec<TableKind>,
    rebuild_bosses: bool,
    dependencies: DependencyTable,
}

impl Randomiser {
    /// Fails if the dependency table has a cycle.
    pub fn new(config: RandomiserConfig, kinds: &[TableKind], rebuild_bosses: bool) -> Result<Self> {
        let dependencies = DependencyTable::standard();
        dependencies.validate()?;
        Ok(Randomiser {
            config,
            kinds: kinds.to_vec(),
            rebuild_bosses,
            dependencies,
        })
    }

    pub fn config(&self) -> &RandomiserConfig {
        &self.config
    }

    /// Mutates every registered table in dependency order, then finalizes
    /// and checks post-conditions. The passes run on a copy; `store` is only
    /// replaced when the whole run succeeds.
    pub fn run_all(&self, store: &mut RecordStore, seed: u64) -> Result<RunReport> {
        store.check_shape()?;
        self.config.validate(store)?;

        let mut schedule_rng = StdRng::seed_from_u64(seed ^ SCHEDULE_SALT);
        let schedule = self.dependencies.order(&self.kinds, &mut schedule_rng)?;
        let names: Vec<&str> = schedule.iter().map(|k| k.name()).collect();
        info!("seed {}: schedule {}", seed, names.join(" -> "));

        let mut rng = StdRng::seed_from_u64(seed ^ MUTATION_SALT);
        let pools = ItemPools::populated(&self.config.catalog, &mut rng);
        let state = EncounterState::new(store, &self.config.policy);
        let mut pass = Pass {
            config: &self.config,
            rebuild_bosses: self.rebuild_bosses,
            store: store.clone(),
            pools,
            state,
            rng,
            report: RunReport {
                seed,
                schedule: schedule.clone(),
                ..RunReport::default()
            },
        };

        for &kind in &schedule {
            pass.mutate_kind(kind);
        }
        for &kind in &schedule {
            pass.finalize(kind);
        }

        let Pass {
            store: work,
            pools,
            state,
            mut report,
            ..
        } = pass;
        verify(&work, &self.config)?;

        report.rollbacks = state.rollbacks();
        report.unclaimed_hidden = pools.hidden().to_vec();
        for kind in PoolKind::ALL {
            report.pool_draws.insert(kind, pools.drawn(kind));
        }
        info!(
            "seed {}: {} edits, {} rollbacks",
            seed,
            report.edits.values().sum::<usize>(),
            report.rollbacks
        );

        *store = work;
        Ok(report)
    }
}

/// Rank tiers built once at the start of a pass.
#[derive(Default)]
struct Tiers {
    eligible: RankIndex,
    followers: RankIndex,
    leaders: RankIndex,
    clusters: RankIndex,
}

struct Pass<'a> {
    config: &'a RandomiserConfig,
    rebuild_bosses: bool,
    store: RecordStore,
    pools: ItemPools,
    state: EncounterState,
    rng: StdRng,
    report: RunReport,
}

impl Pass<'_> {
    fn tiers(&self, kind: TableKind) -> Tiers {
        let policy = &self.config.policy;
        let threshold = policy.boss_monster_threshold;
        let boss_ban = |i: usize| policy.boss_banned_monsters.contains(&(i as u8));
        let group_ban = |i: usize| policy.formation_banned_monsters.contains(&(i as u8));

        match kind {
            // Bosses that already lead a group stay eligible; the encounter
            // builder lets them through only rarely.
            TableKind::Formation => Tiers {
                eligible: RankIndex::monsters(&self.store, |i, _| {
                    let used = self.state.used_bosses().contains(&(i as u8));
                    (!Monster::is_boss(i, threshold) || (used && !boss_ban(i))) && !group_ban(i)
                }),
                followers: RankIndex::monsters(&self.store, |i, _| {
                    !Monster::is_boss(i, threshold) && !boss_ban(i)
                }),
                ..Tiers::default()
            },
            TableKind::BattleFormation => {
                let state = &self.state;
                let store = &self.store;
                Tiers {
                    followers: RankIndex::monsters(store, |i, _| {
                        !Monster::is_boss(i, threshold) && !boss_ban(i)
                    }),
                    leaders: RankIndex::monsters(store, |i, _| {
                        !boss_ban(i) && !group_ban(i) && !state.used_bosses().contains(&(i as u8))
                    }),
                    clusters: RankIndex::clusters(store, |c| {
                        !store.battle_formations[c]
                            .groups
                            .iter()
                            .any(|&g| state.is_boss_group(g as usize))
                    }),
                    ..Tiers::default()
                }
            }
            _ => Tiers::default(),
        }
    }

    fn mutate_kind(&mut self, kind: TableKind) {
        let tiers = self.tiers(kind);
        let mut order: Vec<usize> = (0..self.store.len(kind)).collect();
        order.shuffle(&mut self.rng);

        let mut edits = 0;
        for index in order {
            if self.store.is_mutated(kind, index) {
                continue;
            }
            if self.mutate_one(kind, index, &tiers) {
                edits += 1;
            }
            self.store.mark_mutated(kind, index);
        }
        info!("{}: {} edits", kind.name(), edits);
        *self.report.edits.entry(kind).or_insert(0) += edits;
    }

    fn mutate_one(&mut self, kind: TableKind, index: usize, tiers: &Tiers) -> bool {
        let config = self.config;
        let policy = &config.policy;
        let rng = &mut self.rng;

        match kind {
            TableKind::Treasure => mutate_treasure(
                &mut self.store,
                index,
                &config.catalog,
                policy,
                &mut self.pools,
                rng,
            )
            .is_some(),
            TableKind::Monster => {
                let monster = &mut self.store.monsters[index];
                mutate_fields(monster, kind.mutate_attributes(), rng);
                let mut masks = ElementMasks {
                    resistances: monster.resistances,
                    weaknesses: monster.weaknesses,
                    immunities: monster.immunities,
                };
                toggle_elements(&mut masks, rng);
                monster.resistances = masks.resistances;
                monster.weaknesses = masks.weaknesses;
                monster.immunities = masks.immunities;
                true
            }
            TableKind::Formation if self.state.is_boss_group(index) => {
                if !self.rebuild_bosses {
                    return false;
                }
                match mutate_boss_formation(
                    &mut self.store,
                    index,
                    &tiers.followers,
                    &mut self.state,
                    rng,
                ) {
                    Some(build) => {
                        self.report.boss_builds.push(build);
                        true
                    }
                    None => false,
                }
            }
            TableKind::Formation => {
                mutate_formation(&mut self.store, index, &tiers.eligible, &mut self.state, rng)
            }
            TableKind::BattleFormation => {
                if tiers.clusters.position(index).is_none()
                    || !rng.gen_bool(policy.boss_promotion_rate)
                {
                    return false;
                }
                let cluster = &self.store.battle_formations[index];
                let request = PromotionRequest {
                    cluster: index,
                    clusters: &tiers.clusters,
                    leaders: &tiers.leaders,
                    followers: &tiers.followers,
                    min_leader_rank: cluster
                        .strongest_occupant(&self.store.formations, &self.store.monsters),
                };
                match become_boss(
                    &mut self.store,
                    &request,
                    policy,
                    &mut self.state,
                    &mut self.pools,
                    rng,
                ) {
                    Some(promotion) => {
                        if let Some(id) = promotion.reward {
                            self.report.rewards.push((index, RewardKind::Item(id)));
                        }
                        self.report.promotions.push(promotion);
                        true
                    }
                    None => false,
                }
            }
            TableKind::BattleRounds => {
                mutate_fields(
                    &mut self.store.battle_rounds[index],
                    kind.mutate_attributes(),
                    rng,
                );
                true
            }
            TableKind::BattleReward => {
                if policy.is_fixed_reward(index) {
                    return false;
                }
                let reward = assign_reward(
                    &mut self.store,
                    index,
                    &config.catalog,
                    policy,
                    &mut self.pools,
                    rng,
                );
                self.report.rewards.push((index, reward));
                true
            }
            TableKind::Character => {
                character::redistribute(&mut self.store.characters[index], rng);
                true
            }
        }
    }

    /// Per-record cleanup hooks, run once after every mutation pass.
    fn finalize(&mut self, kind: TableKind) {
        if kind == TableKind::Character {
            let policy = &self.config.policy;
            for c in &mut self.store.characters {
                character::cleanup(c, policy);
            }
        }
    }
}

/// Post-conditions that only a logic error can break.
fn verify(store: &RecordStore, config: &RandomiserConfig) -> Result<()> {
    let mut granted = BTreeSet::new();
    for (index, slot) in store.battle_rewards.iter().enumerate() {
        if let Some(problem) = slot.reward.violation() {
            return Err(RandomiserError::Invariant(format!(
                "battle reward {} (0x{:04X}): {}",
                index, slot.reward.0, problem
            )));
        }
        if let Some(id) = slot.reward.item() {
            if !granted.insert(id) {
                return Err(RandomiserError::Invariant(format!(
                    "battle reward {} repeats {}",
                    index,
                    config.catalog.name(id)
                )));
            }
        }
    }

    Ok(())
}

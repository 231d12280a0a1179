use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

use crate::config::Policy;
use crate::items::{Catalog, ItemCategory};
use crate::mutate::{mutate_normal, Bounds};
use crate::pools::{ItemPools, PoolKind};
use crate::records::{RewardKind, RewardSlot, REWARD_VALUE_MASK};
use crate::store::RecordStore;

/// Extra draws allowed once both item pools are dry.
const FALLBACK_ATTEMPTS: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Fallback {
    Experience,
    Item,
    Currency,
}

// Experience is listed twice to double its weight.
const FALLBACK_TABLE: [Fallback; 4] = [
    Fallback::Experience,
    Fallback::Experience,
    Fallback::Item,
    Fallback::Currency,
];

/// Items held by every reward slot other than `index`, mutated or not.
pub(crate) fn granted_elsewhere(store: &RecordStore, index: usize) -> BTreeSet<u8> {
    store
        .battle_rewards
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .filter_map(|(_, slot)| slot.reward.item())
        .collect()
}

/// Items already granted by reward slots other than `index`.
fn committed_items(store: &RecordStore, index: usize, policy: &Policy) -> BTreeSet<u8> {
    store
        .battle_rewards
        .iter()
        .enumerate()
        .filter(|&(i, slot)| i != index && (slot.mutated || policy.is_fixed_reward(i)))
        .filter_map(|(_, slot)| slot.reward.item())
        .collect()
}

fn draw_desirable(pools: &mut ItemPools, sentinel: Option<u8>) -> Option<u8> {
    let id = pools.take(PoolKind::Desirable)?;
    if Some(id) != sentinel {
        return Some(id);
    }
    pools.take(PoolKind::Desirable).filter(|&id| Some(id) != sentinel)
}

fn draw_undesirable(pools: &mut ItemPools, catalog: &Catalog) -> Option<u8> {
    while let Some(id) = pools.take(PoolKind::Undesirable) {
        if !catalog.is(id, ItemCategory::Broken) {
            return Some(id);
        }
    }
    None
}

fn scaled_amount<R: Rng>(current: u16, rng: &mut R) -> u16 {
    let max = u32::from(REWARD_VALUE_MASK);
    mutate_normal(u32::from(current.max(1)), Bounds::Fixed(1, max), max, rng) as u16
}

fn draw_fallback<R: Rng>(
    current: RewardSlot,
    catalog: &Catalog,
    sentinel: Option<u8>,
    rng: &mut R,
) -> RewardKind {
    let amount = scaled_amount(current.amount(), rng);
    match FALLBACK_TABLE.choose(rng) {
        Some(Fallback::Item) => {
            let mut ids = catalog.ids_with(ItemCategory::Desirable);
            ids.extend(catalog.ids_with(ItemCategory::Undesirable));
            ids.retain(|&id| Some(id) != sentinel);
            match ids.choose(rng) {
                Some(&id) => RewardKind::Item(id),
                None => RewardKind::Experience(amount),
            }
        }
        Some(Fallback::Currency) => RewardKind::Currency(amount),
        _ => RewardKind::Experience(amount),
    }
}

/// Assigns a fresh payload to reward slot `index` and returns it.
///
/// Desirable items come first, then undesirable ones that still work, then
/// a weighted experience / item / currency roll. A draw that repeats an item
/// already granted elsewhere is discarded and the whole draw retried; the
/// retries are bounded by what the pools still hold, after which the slot
/// settles on experience.
pub fn assign_reward<R: Rng>(
    store: &mut RecordStore,
    index: usize,
    catalog: &Catalog,
    policy: &Policy,
    pools: &mut ItemPools,
    rng: &mut R,
) -> RewardKind {
    let committed = committed_items(store, index, policy);
    let current = store.battle_rewards[index].reward;
    let sentinel = policy.fixed_reward_item;

    let attempts = pools.remaining(PoolKind::Desirable)
        + pools.remaining(PoolKind::Undesirable)
        + FALLBACK_ATTEMPTS;

    let mut chosen = None;
    for _ in 0..attempts {
        let kind = match draw_desirable(pools, sentinel)
            .or_else(|| draw_undesirable(pools, catalog))
        {
            Some(id) => RewardKind::Item(id),
            None => draw_fallback(current, catalog, sentinel, rng),
        };
        match kind {
            RewardKind::Item(id) if committed.contains(&id) => {
                debug!("reward {}: {} already granted, retrying", index, catalog.name(id));
            }
            _ => {
                chosen = Some(kind);
                break;
            }
        }
    }

    let kind = chosen.unwrap_or_else(|| {
        warn!("reward {}: no unique item left, granting experience", index);
        RewardKind::Experience(scaled_amount(current.amount(), rng))
    });
    store.battle_rewards[index].reward = RewardSlot::pack(kind);
    kind
}

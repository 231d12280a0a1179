use log::debug;
use rand::Rng;

use crate::config::Policy;
use crate::items::{Catalog, ItemCategory};
use crate::pools::{ItemPools, PoolKind};
use crate::store::RecordStore;

/// Refills treasure slot `index` from the shared pools and returns the new
/// contents, or `None` when the slot must keep what it has.
///
/// Consumable slots stay consumable. Some of them quietly withhold a
/// desirable item into the well-hidden reservoir, where a boss reward will
/// pick it up later.
pub fn mutate_treasure<R: Rng>(
    store: &mut RecordStore,
    index: usize,
    catalog: &Catalog,
    policy: &Policy,
    pools: &mut ItemPools,
    rng: &mut R,
) -> Option<u8> {
    let current = store.treasures[index].contents;
    if policy.bomb_treasure == Some(index) || catalog.is(current, ItemCategory::Key) {
        return None;
    }

    let next = if catalog.is(current, ItemCategory::Consumable) {
        if rng.gen_bool(policy.well_hidden_rate) {
            if let Some(hidden) = pools.take(PoolKind::Desirable) {
                debug!("treasure {}: {} well hidden", index, catalog.name(hidden));
                pools.stash_hidden(hidden);
            }
        }
        pools.take_or_repopulate(PoolKind::Consumable, catalog, rng)?
    } else {
        pools
            .take(PoolKind::Desirable)
            .or_else(|| pools.take(PoolKind::Undesirable))
            .or_else(|| pools.take_or_repopulate(PoolKind::Consumable, catalog, rng))?
    };

    store.treasures[index].contents = next;
    Some(next)
}

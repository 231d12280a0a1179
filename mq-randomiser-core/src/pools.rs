use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::items::{Catalog, ItemCategory};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Desirable,
    Undesirable,
    Consumable,
}

impl PoolKind {
    pub const ALL: [PoolKind; 3] = [PoolKind::Desirable, PoolKind::Undesirable, PoolKind::Consumable];

    pub fn category(self) -> ItemCategory {
        match self {
            PoolKind::Desirable => ItemCategory::Desirable,
            PoolKind::Undesirable => ItemCategory::Undesirable,
            PoolKind::Consumable => ItemCategory::Consumable,
        }
    }
}

/// Depleting, shuffled item sequences shared by every table pass.
///
/// A pool never hands out the same id twice until it is explicitly
/// repopulated. An empty pool is a normal condition: callers either
/// repopulate or fall back to another policy.
#[derive(Clone, Debug, Default)]
pub struct ItemPools {
    pools: BTreeMap<PoolKind, Vec<u8>>,
    drawn: BTreeMap<PoolKind, usize>,
    /// Desirable items withheld from consumable treasure slots.
    hidden: Vec<u8>,
}

impl ItemPools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills every pool once from the catalog.
    pub fn populated<R: Rng>(catalog: &Catalog, rng: &mut R) -> Self {
        let mut pools = Self::new();
        for kind in PoolKind::ALL {
            pools.populate(kind, catalog, rng);
        }
        pools
    }

    /// Replaces `kind` with a freshly shuffled copy of its catalog ids.
    pub fn populate<R: Rng>(&mut self, kind: PoolKind, catalog: &Catalog, rng: &mut R) {
        let mut ids = catalog.ids_with(kind.category());
        ids.shuffle(rng);
        debug!("populated {:?} pool with {} ids", kind, ids.len());
        self.pools.insert(kind, ids);
    }

    pub fn take(&mut self, kind: PoolKind) -> Option<u8> {
        let id = self.pools.get_mut(&kind)?.pop()?;
        *self.drawn.entry(kind).or_insert(0) += 1;
        Some(id)
    }

    /// Takes from `kind`, repopulating once if it has run dry.
    pub fn take_or_repopulate<R: Rng>(
        &mut self,
        kind: PoolKind,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Option<u8> {
        if self.remaining(kind) == 0 {
            self.populate(kind, catalog, rng);
        }
        self.take(kind)
    }

    pub fn remaining(&self, kind: PoolKind) -> usize {
        self.pools.get(&kind).map_or(0, Vec::len)
    }

    pub fn drawn(&self, kind: PoolKind) -> usize {
        self.drawn.get(&kind).copied().unwrap_or(0)
    }

    pub fn stash_hidden(&mut self, id: u8) {
        self.hidden.push(id);
    }

    pub fn take_hidden(&mut self) -> Option<u8> {
        self.hidden.pop()
    }

    pub fn hidden(&self) -> &[u8] {
        &self.hidden
    }
}

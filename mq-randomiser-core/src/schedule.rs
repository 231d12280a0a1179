use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};

use crate::store::TableKind;
use crate::{RandomiserError, Result};

/// Static "mutate A only after B" table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyTable {
    after: BTreeMap<TableKind, BTreeSet<TableKind>>,
}

impl DependencyTable {
    /// Ranks need mutated monster stats, promotions need settled groups and
    /// the well-hidden reservoir, rewards must see every item already placed.
    pub fn standard() -> Self {
        let mut table = DependencyTable::default();
        table
            .declare(TableKind::Formation, &[TableKind::Monster])
            .declare(
                TableKind::BattleFormation,
                &[TableKind::Formation, TableKind::Treasure],
            )
            .declare(TableKind::BattleRounds, &[TableKind::BattleFormation])
            .declare(
                TableKind::BattleReward,
                &[TableKind::BattleFormation, TableKind::Treasure],
            );
        table
    }

    pub fn declare(&mut self, kind: TableKind, after: &[TableKind]) -> &mut Self {
        self.after
            .entry(kind)
            .or_default()
            .extend(after.iter().copied());
        self
    }

    pub fn prerequisites(&self, kind: TableKind) -> impl Iterator<Item = TableKind> + '_ {
        self.after.get(&kind).into_iter().flatten().copied()
    }

    /// Orders `kinds` so every kind runs after its registered prerequisites.
    /// Ties among ready kinds are broken by `rng`; prerequisites that are not
    /// registered count as satisfied.
    pub fn order<R: Rng>(&self, kinds: &[TableKind], rng: &mut R) -> Result<Vec<TableKind>> {
        let registered: BTreeSet<TableKind> = kinds.iter().copied().collect();
        let mut pending = registered.clone();
        let mut done: BTreeSet<TableKind> = BTreeSet::new();
        let mut order = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let ready: Vec<TableKind> = pending
                .iter()
                .copied()
                .filter(|&kind| {
                    self.prerequisites(kind)
                        .all(|p| done.contains(&p) || !registered.contains(&p))
                })
                .collect();

            if ready.is_empty() {
                let stuck: Vec<&str> = pending.iter().map(|k| k.name()).collect();
                return Err(RandomiserError::Config(format!(
                    "cyclic after_order among: {}",
                    stuck.join(", ")
                )));
            }

            let next = ready[rng.gen_range(0..ready.len())];
            pending.remove(&next);
            done.insert(next);
            order.push(next);
        }

        Ok(order)
    }

    /// Cycle check over every table kind. Tie-breaks cannot hide a cycle,
    /// so any fixed seed will do.
    pub fn validate(&self) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0);
        self.order(&TableKind::ALL, &mut rng).map(|_| ())
    }
}

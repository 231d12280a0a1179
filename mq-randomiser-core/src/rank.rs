use rand::Rng;

use crate::records::{HasCombatFields, Monster};
use crate::store::RecordStore;

/// Nested draws used when picking a similar-rank window.
const SIMILAR_WINDOW_DEPTH: u32 = 2;

/// Records of one table in ascending rank order, ties broken by index.
#[derive(Clone, Debug, Default)]
pub struct RankIndex {
    entries: Vec<(usize, f64)>,
}

impl RankIndex {
    pub fn new<I: IntoIterator<Item = (usize, f64)>>(ranks: I) -> Self {
        let mut entries: Vec<(usize, f64)> = ranks.into_iter().collect();
        entries.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        RankIndex { entries }
    }

    pub fn monsters<F>(store: &RecordStore, mut keep: F) -> Self
    where
        F: FnMut(usize, &Monster) -> bool,
    {
        Self::new(
            store
                .monsters
                .iter()
                .enumerate()
                .filter(|(i, m)| keep(*i, m))
                .map(|(i, m)| (i, m.rank())),
        )
    }

    pub fn clusters<F>(store: &RecordStore, mut keep: F) -> Self
    where
        F: FnMut(usize) -> bool,
    {
        Self::new(
            store
                .battle_formations
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(i, c)| (i, c.rank(&store.formations, &store.monsters))),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index_at(&self, pos: usize) -> usize {
        self.entries[pos].0
    }

    pub fn rank_at(&self, pos: usize) -> f64 {
        self.entries[pos].1
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|&(i, _)| i)
    }

    pub fn position(&self, index: usize) -> Option<usize> {
        self.entries.iter().position(|&(i, _)| i == index)
    }

    pub fn rank_of(&self, index: usize) -> Option<f64> {
        self.position(index).map(|pos| self.rank_at(pos))
    }

    /// Number of entries whose rank is strictly below `rank`.
    pub fn count_below(&self, rank: f64) -> usize {
        self.entries.partition_point(|&(_, r)| r < rank)
    }

    /// Number of entries whose rank is at most `rank`.
    pub fn count_at_most(&self, rank: f64) -> usize {
        self.entries.partition_point(|&(_, r)| r <= rank)
    }

    /// Picks an entry of comparable rank to `index`: a window of nested-random
    /// half-width centred on its position, then a uniform pick inside it.
    pub fn similar<R: Rng>(&self, index: usize, rng: &mut R) -> Option<usize> {
        let pos = self.position(index)?;
        let half = nested_width(rng, self.len(), SIMILAR_WINDOW_DEPTH);
        let lo = pos.saturating_sub(half);
        let hi = (pos + half).min(self.len() - 1);
        Some(self.index_at(rng.gen_range(lo..=hi)))
    }
}

/// Draws an upper bound in `0..=max`, then redraws inside it `depth - 1`
/// more times, biasing the result toward small values.
pub fn nested_width<R: Rng>(rng: &mut R, max: usize, depth: u32) -> usize {
    let mut width = max;
    for _ in 0..depth {
        if width == 0 {
            break;
        }
        width = rng.gen_range(0..=width);
    }
    width
}

use rand::seq::SliceRandom;
use rand::Rng;

use crate::records::MutableFields;

/// Declared range for a mutable field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bounds {
    Fixed(u32, u32),
    /// Perturb relative to the current value; only the type width clamps.
    Proportional,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldPolicy {
    pub field: &'static str,
    pub bounds: Bounds,
    pub type_max: u32,
}

impl FieldPolicy {
    pub const fn new(field: &'static str, bounds: Bounds, type_max: u32) -> Self {
        FieldPolicy {
            field,
            bounds,
            type_max,
        }
    }
}

const MAX_WALK_STEPS: usize = 8;
const MAX_TOGGLES: usize = 16;

/// Bounded random walk around `value`. The result always lies within the
/// resolved bounds and never exceeds `type_max`.
pub fn mutate_normal<R: Rng>(value: u32, bounds: Bounds, type_max: u32, rng: &mut R) -> u32 {
    let (lo, hi) = match bounds {
        Bounds::Fixed(lo, hi) => (lo.min(type_max), hi.min(type_max)),
        // A zero field (no spells, no counter) stays zero.
        Bounds::Proportional if value == 0 => return 0,
        Bounds::Proportional => {
            let spread = (value / 2).max(1);
            (
                value.saturating_sub(spread),
                value.saturating_add(spread).min(type_max),
            )
        }
    };
    if lo >= hi {
        return lo;
    }

    let value = value.clamp(lo, hi);
    let (lo_f, hi_f) = (f64::from(lo), f64::from(hi));
    let step = (f64::from(value) * 0.25).clamp(1.0, hi_f - lo_f);

    let mut current = f64::from(value);
    for _ in 0..MAX_WALK_STEPS {
        // Sum of two uniforms gives a centre-weighted step.
        let delta = (rng.gen_range(-1.0..=1.0) + rng.gen_range(-1.0..=1.0)) * step / 2.0;
        current += delta;
        if current < lo_f {
            current = (2.0 * lo_f - current).min(hi_f);
        } else if current > hi_f {
            current = (2.0 * hi_f - current).max(lo_f);
        }
        if !rng.gen_bool(0.5) {
            break;
        }
    }

    (current.round() as u32).clamp(lo, hi)
}

/// Applies every policy whose field the record exposes.
pub fn mutate_fields<T: MutableFields, R: Rng>(record: &mut T, policies: &[FieldPolicy], rng: &mut R) {
    for policy in policies {
        if let Some(value) = record.field(policy.field) {
            let new_value = mutate_normal(value, policy.bounds, policy.type_max, rng);
            record.set_field(policy.field, new_value);
        }
    }
}

/// Redistributes the set bits of the `size`-bit field that starts at bit
/// `shift`, keeping its population count. Bits outside the field are kept.
pub fn shuffle_bits<R: Rng>(value: u8, size: u32, shift: u32, rng: &mut R) -> u8 {
    debug_assert!(size >= 1 && size + shift <= 8);
    let mask: u8 = (((1u16 << size) - 1) as u8) << shift;
    let field = (value & mask) >> shift;
    let count = field.count_ones() as usize;

    let mut positions: Vec<u32> = (0..size).collect();
    positions.shuffle(rng);

    let shuffled = positions
        .iter()
        .take(count)
        .fold(0u8, |acc, &bit| acc | (1 << bit));

    (value & !mask) | (shuffled << shift)
}

/// Resistance / weakness / immunity bitmasks edited together.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementMasks {
    pub resistances: u8,
    pub weaknesses: u8,
    pub immunities: u8,
}

struct ToggleRule {
    cap: u32,
    sticky: bool,
}

const TOGGLE_RULES: [ToggleRule; 3] = [
    ToggleRule { cap: 6, sticky: false },
    ToggleRule { cap: 4, sticky: true },
    ToggleRule { cap: 4, sticky: false },
];

impl ElementMasks {
    fn get(&self, attr: usize) -> u8 {
        match attr {
            0 => self.resistances,
            1 => self.weaknesses,
            _ => self.immunities,
        }
    }

    fn set(&mut self, attr: usize, value: u8) {
        match attr {
            0 => self.resistances = value,
            1 => self.weaknesses = value,
            _ => self.immunities = value,
        }
    }
}

/// Small geometric-length edit: each round continues with probability 1/2,
/// flips one bit of one attribute, and refuses to push an attribute past its
/// population cap. Weaknesses only clear one time in ten. Returns the number
/// of bits actually changed.
pub fn toggle_elements<R: Rng>(masks: &mut ElementMasks, rng: &mut R) -> usize {
    let mut changed = 0;
    for _ in 0..MAX_TOGGLES {
        if !rng.gen_bool(0.5) {
            break;
        }
        let attr = rng.gen_range(0..TOGGLE_RULES.len());
        let rule = &TOGGLE_RULES[attr];
        let bit = 1u8 << rng.gen_range(0..8u32);
        let value = masks.get(attr);

        if value & bit != 0 {
            if rule.sticky && rng.gen_range(0..10) != 0 {
                continue;
            }
            masks.set(attr, value & !bit);
        } else {
            if (value | bit).count_ones() > rule.cap {
                continue;
            }
            masks.set(attr, value | bit);
        }
        changed += 1;
    }
    changed
}

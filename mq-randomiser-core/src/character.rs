use rand::Rng;

use crate::config::Policy;
use crate::mutate::{mutate_fields, shuffle_bits};
use crate::records::Character;
use crate::store::TableKind;

/// Walks the numeric stats, then reshuffles which spells are known. The
/// white/black byte is shuffled as a whole, so a character may trade one
/// discipline for the other; the wizard nibble is shuffled on its own.
pub fn redistribute<R: Rng>(character: &mut Character, rng: &mut R) {
    mutate_fields(character, TableKind::Character.mutate_attributes(), rng);
    character.known_magic = shuffle_bits(character.known_magic, 8, 0, rng);
    character.known_wizard = shuffle_bits(character.known_wizard, 4, 4, rng);
}

fn round_hp(hp: u16, granularity: u16) -> u16 {
    let g = u32::from(granularity.max(1));
    let ceiling = u32::from(u16::MAX) / g * g;
    let rounded = (u32::from(hp) + g / 2) / g * g;
    rounded.clamp(g, ceiling) as u16
}

/// Finalize hook: unknown disciplines drop to zero, known ones rise to the
/// average level (placeholders excepted), max HP is rounded, and the shadow
/// fields are refreshed.
pub fn cleanup(character: &mut Character, policy: &Policy) {
    let levels = character.discipline_levels();
    let sum: u32 = levels.iter().map(|&l| u32::from(l)).sum();
    let average = if policy.is_placeholder(&character.name) {
        0
    } else {
        (sum / 3).max(1) as u8
    };
    let mut adjusted = [0u8; 3];
    for (n, known) in character.knows().into_iter().enumerate() {
        if known {
            adjusted[n] = levels[n].max(average);
        }
    }
    character.white_level = adjusted[0];
    character.black_level = adjusted[1];
    character.wizard_level = adjusted[2];

    character.max_hp = round_hp(character.max_hp, policy.hp_granularity);
    character.current_hp = character.max_hp;
    character.base_stats = character.stats;
}

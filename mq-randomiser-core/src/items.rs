use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::records::HasCatalogName;
use crate::{RandomiserError, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Key,
    Consumable,
    Broken,
    Undesirable,
    Desirable,
    Banned,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct ItemEntry {
    pub id: u8,
    pub name: &'static str,
    pub categories: &'static [ItemCategory],
}

use ItemCategory::{Banned, Broken, Consumable, Desirable, Key, Undesirable};

pub(crate) const ITEM_TABLE: &[ItemEntry] = &[
    ItemEntry { id: 0x00, name: "Elixir", categories: &[Key] },
    ItemEntry { id: 0x01, name: "Tree Wither", categories: &[Key] },
    ItemEntry { id: 0x02, name: "Wakewater", categories: &[Key] },
    ItemEntry { id: 0x03, name: "Venus Key", categories: &[Key] },
    ItemEntry { id: 0x04, name: "Multi-Key", categories: &[Key] },
    ItemEntry { id: 0x05, name: "Mask", categories: &[Key] },
    ItemEntry { id: 0x06, name: "Magic Mirror", categories: &[Key] },
    ItemEntry { id: 0x07, name: "Thunder Rock", categories: &[Key] },
    ItemEntry { id: 0x08, name: "Captain's Cap", categories: &[Key] },
    ItemEntry { id: 0x09, name: "Libra Crest", categories: &[Key] },
    ItemEntry { id: 0x0A, name: "Gemini Crest", categories: &[Key] },
    ItemEntry { id: 0x0B, name: "Mobius Crest", categories: &[Key] },
    ItemEntry { id: 0x0C, name: "Sand Coin", categories: &[Key] },
    ItemEntry { id: 0x0D, name: "River Coin", categories: &[Key] },
    ItemEntry { id: 0x0E, name: "Sun Coin", categories: &[Key] },
    ItemEntry { id: 0x0F, name: "Sky Coin", categories: &[Key] },
    ItemEntry { id: 0x10, name: "Cure Potion", categories: &[Consumable] },
    ItemEntry { id: 0x11, name: "Heal Potion", categories: &[Consumable] },
    ItemEntry { id: 0x12, name: "Seed", categories: &[Consumable] },
    ItemEntry { id: 0x13, name: "Refresher", categories: &[Consumable] },
    // Exit is handed out by a fixed reward and doubles as the reward sentinel.
    ItemEntry { id: 0x14, name: "Exit", categories: &[Desirable] },
    ItemEntry { id: 0x15, name: "Cure", categories: &[Desirable] },
    ItemEntry { id: 0x16, name: "Heal", categories: &[Desirable] },
    ItemEntry { id: 0x17, name: "Life", categories: &[Desirable] },
    ItemEntry { id: 0x18, name: "Quake", categories: &[Desirable] },
    ItemEntry { id: 0x19, name: "Blizzard", categories: &[Desirable] },
    ItemEntry { id: 0x1A, name: "Fire", categories: &[Desirable] },
    ItemEntry { id: 0x1B, name: "Aero", categories: &[Desirable] },
    ItemEntry { id: 0x1C, name: "Thunder", categories: &[Desirable] },
    ItemEntry { id: 0x1D, name: "White", categories: &[Desirable] },
    ItemEntry { id: 0x1E, name: "Meteor", categories: &[Desirable] },
    ItemEntry { id: 0x1F, name: "Flare", categories: &[Desirable] },
    ItemEntry { id: 0x20, name: "Steel Sword", categories: &[Undesirable] },
    ItemEntry { id: 0x21, name: "Knight Sword", categories: &[Desirable] },
    ItemEntry { id: 0x22, name: "Excalibur", categories: &[Desirable] },
    ItemEntry { id: 0x23, name: "Axe", categories: &[Undesirable] },
    ItemEntry { id: 0x24, name: "Battle Axe", categories: &[Desirable] },
    ItemEntry { id: 0x25, name: "Giant's Axe", categories: &[Desirable] },
    ItemEntry { id: 0x26, name: "Cat Claw", categories: &[Undesirable] },
    ItemEntry { id: 0x27, name: "Charm Claw", categories: &[Desirable] },
    ItemEntry { id: 0x28, name: "Dragon Claw", categories: &[Desirable] },
    ItemEntry { id: 0x29, name: "Bomb", categories: &[Undesirable] },
    ItemEntry { id: 0x2A, name: "Jumbo Bomb", categories: &[Desirable] },
    ItemEntry { id: 0x2B, name: "Mega Grenade", categories: &[Desirable] },
    ItemEntry { id: 0x2C, name: "Morning Star", categories: &[Banned] },
    ItemEntry { id: 0x2D, name: "Bow of Grace", categories: &[Undesirable, Broken] },
    ItemEntry { id: 0x2E, name: "Ninja Star", categories: &[Undesirable, Broken] },
    ItemEntry { id: 0x2F, name: "Steel Helm", categories: &[Undesirable] },
    ItemEntry { id: 0x30, name: "Moon Helm", categories: &[Desirable] },
    ItemEntry { id: 0x31, name: "Apollo Helm", categories: &[Desirable] },
    ItemEntry { id: 0x32, name: "Steel Armor", categories: &[Undesirable] },
    ItemEntry { id: 0x33, name: "Noble Armor", categories: &[Desirable] },
    ItemEntry { id: 0x34, name: "Gaia's Armor", categories: &[Desirable] },
    ItemEntry { id: 0x35, name: "Replica Armor", categories: &[Undesirable] },
    ItemEntry { id: 0x36, name: "Mystic Robes", categories: &[Desirable] },
    ItemEntry { id: 0x37, name: "Flame Armor", categories: &[Desirable] },
    ItemEntry { id: 0x38, name: "Black Robe", categories: &[Desirable] },
    ItemEntry { id: 0x39, name: "Steel Shield", categories: &[Undesirable] },
    ItemEntry { id: 0x3A, name: "Venus Shield", categories: &[Desirable] },
    ItemEntry { id: 0x3B, name: "Aegis Shield", categories: &[Desirable] },
    ItemEntry { id: 0x3C, name: "Ether Shield", categories: &[Desirable] },
    ItemEntry { id: 0x3D, name: "Charm", categories: &[Undesirable] },
    ItemEntry { id: 0x3E, name: "Magic Ring", categories: &[Desirable] },
    ItemEntry { id: 0x3F, name: "Cupid Locket", categories: &[Desirable] },
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u8,
    pub name: String,
    #[serde(default)]
    pub categories: BTreeSet<ItemCategory>,
}

impl Item {
    pub fn has(&self, category: ItemCategory) -> bool {
        self.categories.contains(&category)
    }
}

impl HasCatalogName for Item {
    fn catalog_name(&self) -> &str {
        &self.name
    }
}

/// The immutable item catalog consulted by every pool and reward decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<Item>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let items = ITEM_TABLE
            .iter()
            .map(|entry| Item {
                id: entry.id,
                name: entry.name.to_string(),
                categories: entry.categories.iter().copied().collect(),
            })
            .collect();
        Catalog { items }
    }

    pub fn get(&self, id: u8) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn is(&self, id: u8, category: ItemCategory) -> bool {
        self.get(id).map_or(false, |item| item.has(category))
    }

    pub fn name(&self, id: u8) -> &str {
        self.get(id).map_or("???", |item| item.catalog_name())
    }

    /// Catalog ids carrying `category`, ascending, with banned ids removed.
    pub fn ids_with(&self, category: ItemCategory) -> Vec<u8> {
        let mut ids: Vec<u8> = self
            .items
            .iter()
            .filter(|item| item.has(category) && !item.has(ItemCategory::Banned))
            .map(|item| item.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn validate(&self) -> Result<()> {
        const EXCLUSIVE: &[(ItemCategory, ItemCategory)] = &[
            (Desirable, Undesirable),
            (Key, Desirable),
            (Key, Undesirable),
            (Key, Consumable),
        ];

        let mut seen = BTreeSet::new();
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(RandomiserError::Config(format!(
                    "item id 0x{:02X} appears more than once in the catalog",
                    item.id
                )));
            }

            for &(a, b) in EXCLUSIVE {
                if item.has(a) && item.has(b) {
                    return Err(RandomiserError::Config(format!(
                        "item 0x{:02X} ({}) is both {:?} and {:?}",
                        item.id, item.name, a, b
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_consistent() {
        let catalog = Catalog::builtin();
        catalog.validate().unwrap();
        assert_eq!(catalog.items.len(), ITEM_TABLE.len());
        assert_eq!(catalog.name(0x22), "Excalibur");
    }

    #[test]
    fn banned_items_never_listed() {
        let catalog = Catalog::builtin();
        let undesirable = catalog.ids_with(ItemCategory::Undesirable);
        assert!(!undesirable.contains(&0x2C));
        assert!(undesirable.contains(&0x2D));
        assert!(undesirable.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rejects_exclusive_categories() {
        let mut catalog = Catalog::builtin();
        catalog.items[0x21].categories.insert(ItemCategory::Undesirable);
        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("Knight Sword"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut catalog = Catalog::builtin();
        let dup = catalog.items[3].clone();
        catalog.items.push(dup);
        assert!(catalog.validate().is_err());
    }
}

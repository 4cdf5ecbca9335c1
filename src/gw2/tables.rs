use super::pricing::Discount;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialEntry {
    pub item_id: u32,
    pub name: &'static str,
    pub quantity: u64,
}

pub struct MaterialTable {
    pub title: &'static str,
    pub description: &'static str,
    pub discount: Discount,
    pub entries: &'static [MaterialEntry],
}

const STACK: u64 = 250;

const fn stack(item_id: u32, name: &'static str) -> MaterialEntry {
    MaterialEntry {
        item_id,
        name,
        quantity: STACK,
    }
}

pub const T6_FINE: MaterialTable = MaterialTable {
    title: "T6 fine materials",
    description: "One stack of every tier 6 fine material",
    discount: Discount::NINETY,
    entries: &[
        stack(24295, "Vial of Powerful Blood"),
        stack(24283, "Powerful Venom Sac"),
        stack(24300, "Elaborate Totem"),
        stack(24277, "Pile of Crystalline Dust"),
        stack(24289, "Armored Scale"),
        stack(24358, "Ancient Bone"),
        stack(24351, "Vicious Claw"),
        stack(24357, "Vicious Fang"),
    ],
};

pub const T5_FINE: MaterialTable = MaterialTable {
    title: "T5 fine materials",
    description: "One stack of every tier 5 fine material",
    discount: Discount::TRADING_POST,
    entries: &[
        stack(24294, "Vial of Potent Blood"),
        stack(24282, "Potent Venom Sac"),
        stack(24299, "Intricate Totem"),
        stack(24276, "Pile of Incandescent Dust"),
        stack(24288, "Smooth Scale"),
        stack(24341, "Large Bone"),
        stack(24350, "Large Claw"),
        stack(24356, "Large Fang"),
    ],
};

pub const T6_COMMON: MaterialTable = MaterialTable {
    title: "T6 common materials",
    description: "One stack of each tier 6 common crafting material",
    discount: Discount::TRADING_POST,
    entries: &[
        stack(19701, "Orichalcum Ore"),
        stack(19725, "Ancient Wood Log"),
        stack(19745, "Gossamer Scrap"),
        stack(19732, "Hardened Leather Section"),
    ],
};

pub const LEGENDARY_STAPLES: MaterialTable = MaterialTable {
    title: "Legendary crafting staples",
    description: "Mystic Coins, Ectoplasm and Gemstones for a Gift of Fortune and a Gift of Mastery",
    discount: Discount::NINETY_FIVE,
    entries: &[
        MaterialEntry {
            item_id: 19976,
            name: "Mystic Coin",
            quantity: 250,
        },
        MaterialEntry {
            item_id: 19721,
            name: "Glob of Ectoplasm",
            quantity: 250,
        },
        MaterialEntry {
            item_id: 68063,
            name: "Amalgamated Gemstone",
            quantity: 100,
        },
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, poise::ChoiceParameter)]
pub enum MaterialSet {
    #[name = "T6 fine materials"]
    T6Fine,
    #[name = "T5 fine materials"]
    T5Fine,
    #[name = "T6 common materials"]
    T6Common,
    #[name = "Legendary staples"]
    LegendaryStaples,
}

impl MaterialSet {
    pub fn table(self) -> &'static MaterialTable {
        match self {
            MaterialSet::T6Fine => &T6_FINE,
            MaterialSet::T5Fine => &T5_FINE,
            MaterialSet::T6Common => &T6_COMMON,
            MaterialSet::LegendaryStaples => &LEGENDARY_STAPLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: [MaterialSet; 4] = [
        MaterialSet::T6Fine,
        MaterialSet::T5Fine,
        MaterialSet::T6Common,
        MaterialSet::LegendaryStaples,
    ];

    #[test]
    fn test_tables_have_unique_ids() {
        for set in ALL {
            let table = set.table();
            let ids: HashSet<u32> = table.entries.iter().map(|e| e.item_id).collect();
            assert_eq!(ids.len(), table.entries.len(), "{} has duplicate ids", table.title);
        }
    }

    #[test]
    fn test_discounts_per_category() {
        assert_eq!(MaterialSet::T6Fine.table().discount.as_percent(), 90);
        assert_eq!(MaterialSet::T5Fine.table().discount.as_percent(), 85);
        assert_eq!(MaterialSet::LegendaryStaples.table().discount.as_percent(), 95);
    }

    #[test]
    fn test_stack_helper() {
        assert!(T6_FINE.entries.iter().all(|e| e.quantity == 250));
    }
}

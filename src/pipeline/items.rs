//! Item master join.

use super::keys::KeyedLookup;
use crate::models::ItemMasterRow;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDetails {
    pub description: Option<String>,
    pub group_description: Option<String>,
    pub registered_at: Option<String>,
}

/// Item master rows deduplicated by code, first occurrence wins.
#[derive(Debug, Default)]
pub struct ItemMaster {
    items: KeyedLookup<ItemDetails>,
}

impl ItemMaster {
    pub fn from_rows(rows: Vec<ItemMasterRow>) -> Self {
        let mut items = KeyedLookup::new();
        for row in rows {
            let Some(code) = row.item_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
                continue;
            };
            let code = code.to_string();
            items.insert_first(
                &code,
                ItemDetails {
                    description: row.description,
                    group_description: row.group_description,
                    registered_at: row.registered_at,
                },
            );
        }
        Self { items }
    }

    pub fn get(&self, item_code: &str) -> Option<&ItemDetails> {
        self.items.get(item_code)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

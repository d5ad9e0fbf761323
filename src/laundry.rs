use crate::entry::leading_int;
use crate::ids::IdGen;
use crate::kv::{KvStore, Slot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

pub const SLOT_KEY: &str = "laundryItems";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaundryItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRejected {
    MissingField,
    NegativeCount,
}

impl fmt::Display for ItemRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemRejected::MissingField => "please enter both cloth type and count",
            ItemRejected::NegativeCount => "count must not be negative",
        })
    }
}

impl std::error::Error for ItemRejected {}

/// Interprets the count as typed by the user. Only the leading integer is
/// read; zero or text that does not start with one counts as a single item.
fn parse_count(raw: &str) -> Result<u32, ItemRejected> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ItemRejected::MissingField);
    }
    match leading_int(raw) {
        Some(n) if n < 0 => Err(ItemRejected::NegativeCount),
        Some(0) | None => Ok(1),
        Some(n) => Ok(u32::try_from(n).unwrap_or(u32::MAX)),
    }
}

pub struct LaundryStore {
    items: Vec<LaundryItem>,
    ids: IdGen,
    slot: Slot,
}

impl LaundryStore {
    pub fn load(kv: Rc<dyn KvStore>) -> Self {
        let slot = Slot::new(kv, SLOT_KEY);
        let items: Vec<LaundryItem> = slot
            .load::<Vec<LaundryItem>>()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|mut item| {
                let kind = item.kind.trim();
                if kind.is_empty() {
                    return None;
                }
                item.kind = kind.to_string();
                Some(item)
            })
            .collect();
        tracing::info!(count = items.len(), "laundry items loaded");
        let ids = IdGen::above(items.iter().map(|i| i.id));
        Self { items, ids, slot }
    }

    pub fn items(&self) -> &[LaundryItem] {
        &self.items
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.count)).sum()
    }

    pub fn add(&mut self, kind: &str, count: &str) -> Result<&LaundryItem, ItemRejected> {
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(ItemRejected::MissingField);
        }
        let count = parse_count(count)?;
        self.items.push(LaundryItem {
            id: self.ids.next_id(),
            kind: kind.to_string(),
            count,
        });
        self.persist();
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return false;
        }
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.slot.clear();
    }

    fn persist(&self) {
        self.slot.save(&self.items);
    }
}

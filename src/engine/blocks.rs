//! Selection state as maximal contiguous blocks of half-hour slots.
//!
//! Every toggle returns a block set in normal form: no empty blocks, no two
//! blocks for the same court and day that touch, ordered by court, date and
//! start time.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::model::*;

use super::BookingError;

/// Same court, same day, and one window ends exactly where the other starts.
pub fn is_adjacent(a: &Slot, b: &Slot) -> bool {
    a.court_id == b.court_id && a.date == b.date && a.span().abuts(&b.span())
}

/// Build a block from same-court, same-day, contiguous slots. Returns `None`
/// for an empty set so callers never produce a zero-slot block.
pub fn block_from_slots(mut slots: Vec<Slot>, court_name: &str) -> Option<Block> {
    slots.sort_by_key(|s| s.starts_at);
    debug_assert!(
        slots.windows(2).all(|w| is_adjacent(&w[0], &w[1])),
        "block slots must be contiguous"
    );

    let first = slots.first()?;
    let last = slots.last()?;
    let court_id = first.court_id.clone();
    let date = first.date;
    let start = first.starts_at.time();
    let end = last.ends_at.time();
    let total_price: Decimal = slots.iter().filter_map(|s| s.price).sum();

    Some(Block {
        court_id,
        court_name: court_name.to_string(),
        date,
        start,
        end,
        slots,
        total_price: total_price.normalize(),
    })
}

/// Split slots into maximal contiguous runs, each sorted by start.
pub fn contiguous_runs(mut slots: Vec<Slot>) -> Vec<Vec<Slot>> {
    slots.sort_by_key(|s| s.starts_at);
    let mut runs: Vec<Vec<Slot>> = Vec::new();
    for slot in slots {
        if let Some(run) = runs.last_mut()
            && run.last().is_some_and(|prev| is_adjacent(prev, &slot))
        {
            run.push(slot);
            continue;
        }
        runs.push(vec![slot]);
    }
    runs
}

fn normalize(blocks: &mut [Block]) {
    blocks.sort_by(|a, b| {
        a.court_id
            .cmp(&b.court_id)
            .then(a.date.cmp(&b.date))
            .then(a.start.cmp(&b.start))
    });
}

/// Select or deselect `slot` against the current blocks.
///
/// Deselecting removes the slot from its block and re-splits what is left.
/// Selecting merges the slot with every adjacent block on the same court and
/// day, bridging two blocks when the slot sits between them. Unpriced and
/// occupied slots are rejected and the input is left as it was.
pub fn toggle_slot(blocks: &[Block], slot: &Slot, court_name: &str) -> Result<Vec<Block>, BookingError> {
    if slot.price.is_none() {
        return Err(BookingError::Unpriced(slot.key()));
    }
    if slot.is_busy {
        return Err(BookingError::Occupied(slot.key()));
    }

    let key = slot.key();
    let mut next = match blocks.iter().position(|b| b.contains(&key)) {
        Some(pos) => {
            let owner = &blocks[pos];
            let remaining: Vec<Slot> = owner
                .slots
                .iter()
                .filter(|s| !s.has_key(&key))
                .cloned()
                .collect();
            let mut next: Vec<Block> = blocks
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != pos)
                .map(|(_, b)| b.clone())
                .collect();
            next.extend(
                contiguous_runs(remaining)
                    .into_iter()
                    .filter_map(|run| block_from_slots(run, &owner.court_name)),
            );
            debug!(slot = %key, "deselected slot");
            next
        }
        None => {
            let (absorbed, mut next): (Vec<Block>, Vec<Block>) = blocks.iter().cloned().partition(|b| {
                b.is_on(&slot.court_id, slot.date) && b.slots.iter().any(|s| is_adjacent(s, slot))
            });
            let merged = absorbed.len();
            let mut union = vec![slot.clone()];
            for block in absorbed {
                union.extend(block.slots);
            }
            next.extend(block_from_slots(union, court_name));
            debug!(slot = %key, merged, "selected slot");
            next
        }
    };
    normalize(&mut next);
    Ok(next)
}

/// A session's selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BlockSet {
    blocks: Vec<Block>,
}

impl BlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn slot_count(&self) -> usize {
        self.blocks.iter().map(|b| b.slots.len()).sum()
    }

    pub fn total_price(&self) -> Decimal {
        self.blocks.iter().map(|b| b.total_price).sum::<Decimal>().normalize()
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.blocks.iter().any(|b| b.contains(key))
    }

    /// Apply a toggle. On rejection the selection is unchanged.
    pub fn toggle(&mut self, slot: &Slot, court_name: &str) -> Result<&[Block], BookingError> {
        self.blocks = toggle_slot(&self.blocks, slot, court_name)?;
        Ok(&self.blocks)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Re-check the selection against a freshly built calendar. Selected slots
    /// the calendar now reports as busy or unpriced are dropped and their
    /// blocks re-split; surviving slots take the fresh price. Slots outside
    /// the calendar are kept as they are. Returns how many slots were dropped.
    pub fn reconcile(&mut self, grid: &[Slot]) -> usize {
        let fresh: HashMap<SlotKey, &Slot> = grid.iter().map(|s| (s.key(), s)).collect();
        let mut dropped = 0;
        let mut next = Vec::with_capacity(self.blocks.len());

        for block in std::mem::take(&mut self.blocks) {
            let mut kept = Vec::with_capacity(block.slots.len());
            for slot in block.slots {
                match fresh.get(&slot.key()) {
                    Some(current) if !current.is_selectable() => dropped += 1,
                    Some(current) => kept.push((*current).clone()),
                    None => kept.push(slot),
                }
            }
            next.extend(
                contiguous_runs(kept)
                    .into_iter()
                    .filter_map(|run| block_from_slots(run, &block.court_name)),
            );
        }

        normalize(&mut next);
        self.blocks = next;
        dropped
    }
}

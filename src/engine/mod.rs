//! The booking core: occupancy, the slot calendar, block merge/split and
//! reservation assembly. Everything here is synchronous and pure.

mod availability;
mod blocks;
mod booking;
mod error;
mod grid;
#[cfg(test)]
mod tests;

pub use availability::{is_occupied, merge_overlapping, OccupancyIndex};
pub use blocks::{block_from_slots, contiguous_runs, is_adjacent, toggle_slot, BlockSet};
pub use booking::{assemble, ContactInfo};
pub use error::{BookingError, FieldError};
pub use grid::{build_grid, half_hour_starts};

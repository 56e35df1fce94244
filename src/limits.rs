use rust_decimal::Decimal;

/// First bookable half hour of the day (07:00), in minutes after midnight.
pub const OPENING_MINUTE: u32 = 7 * 60;

/// Last bookable half-hour start (21:30); the final slot ends at 22:00.
pub const LAST_SLOT_START_MINUTE: u32 = 21 * 60 + 30;

pub const SLOT_MINUTES: u32 = 30;

/// Morning pricing applies for clock hours in `[MORNING_START_HOUR, MORNING_END_HOUR)`.
pub const MORNING_START_HOUR: u32 = 7;
pub const MORNING_END_HOUR: u32 = 13;

/// 1.1
pub const EVENING_SURCHARGE: Decimal = Decimal::from_parts(11, 0, 0, false, 1);
/// 1.2
pub const NON_MEMBER_SURCHARGE: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

pub const MAX_GRID_DAYS: i64 = 31;
pub const MAX_SELECTED_SLOTS: usize = 64;
pub const MAX_SESSIONS: usize = 10_000;

/// Longest accepted checkout note, in characters.
pub const MAX_NOTES_LEN: u64 = 1024;

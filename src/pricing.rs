//! Half-hour price resolution from a court's seasonal price table.
//!
//! Tables hold hourly prices. An exact `season_period_type_tier` entry wins;
//! otherwise the `season_type` base rate is taken and the evening and
//! non-member surcharges are applied independently. Halving to the half-hour
//! price always happens last.

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, Timelike};
use rust_decimal::Decimal;

use crate::limits::*;
use crate::model::{Court, CourtType, Price};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Mar–May spring, Jun–Aug summer, Sep–Nov autumn, Dec–Feb winter.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    Morning,
    Evening,
}

impl TimePeriod {
    pub fn from_time(time: NaiveTime) -> Self {
        if (MORNING_START_HOUR..MORNING_END_HOUR).contains(&time.hour()) {
            TimePeriod::Morning
        } else {
            TimePeriod::Evening
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::Morning => "morning",
            TimePeriod::Evening => "evening",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipTier {
    Member,
    NonMember,
}

impl MembershipTier {
    pub fn from_member_flag(is_member: bool) -> Self {
        if is_member {
            MembershipTier::Member
        } else {
            MembershipTier::NonMember
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::Member => "member",
            MembershipTier::NonMember => "non_member",
        }
    }
}

pub fn price_key(season: Season, period: TimePeriod, court_type: CourtType, tier: MembershipTier) -> String {
    format!(
        "{}_{}_{}_{}",
        season.as_str(),
        period.as_str(),
        court_type.as_str(),
        tier.as_str()
    )
}

pub fn base_price_key(season: Season, court_type: CourtType) -> String {
    format!("{}_{}", season.as_str(), court_type.as_str())
}

/// Price of the half hour starting at `time`, or `None` when the court's
/// table has nothing that applies. `None` means "not bookable", never zero.
pub fn resolve_price(court: &Court, date: NaiveDate, time: NaiveTime, is_member: bool) -> Option<Price> {
    let rules = &court.seasonal_price_rules;
    if rules.is_empty() {
        return None;
    }

    let season = Season::from_date(date);
    let period = TimePeriod::from_time(time);
    let tier = MembershipTier::from_member_flag(is_member);

    if let Some(hourly) = rules.get(&price_key(season, period, court.court_type, tier)) {
        return to_half_hour(*hourly);
    }

    let mut hourly = *rules.get(&base_price_key(season, court.court_type))?;
    if period == TimePeriod::Evening {
        hourly *= EVENING_SURCHARGE;
    }
    if tier == MembershipTier::NonMember {
        hourly *= NON_MEMBER_SURCHARGE;
    }
    to_half_hour(hourly)
}

fn to_half_hour(hourly: Price) -> Option<Price> {
    if hourly.is_sign_negative() {
        return None;
    }
    Some((hourly / Decimal::TWO).normalize())
}

/// Sum of the independently resolved half-hour prices covering
/// `[start, end)`. The morning/evening boundary may fall inside the range,
/// so each half hour is priced on its own.
pub fn price_range(
    court: &Court,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    is_member: bool,
) -> Option<Price> {
    let step = TimeDelta::minutes(i64::from(SLOT_MINUTES));
    if start >= end || (end - start).num_minutes() % step.num_minutes() != 0 {
        return None;
    }

    let mut total = Decimal::ZERO;
    let mut t = start;
    while t < end {
        total += resolve_price(court, date, t, is_member)?;
        t += step;
    }
    Some(total.normalize())
}

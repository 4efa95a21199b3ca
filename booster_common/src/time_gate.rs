//! Crafting cooldown decision for yearless timestamps.
//!
//! The market stores the next instant a Booster Pack may be crafted as `"14 Sep @ 10:48PM"`:
//! day, month and time of day, but no year. The year of the reference instant is assumed,
//! and the result is interpreted as follows:
//!
//! - already in the past: the cooldown has ended;
//! - more than one cooldown ahead: the stored instant actually belonged to last year
//!   (e.g. stored `"31 Dec"` read on the 1st of January), so the cooldown ended too;
//! - otherwise the cooldown is still running.
//!
//! The second branch is exact as long as no cooldown can exceed `CRAFTING_COOLDOWN`.
use chrono::{Datelike, Duration, NaiveDateTime};

use crate::error::BoosterError;

/// Format of next-eligible timestamps, e.g. `"14 Sep @ 10:48PM"`.
pub const NEXT_ELIGIBLE_FORMAT: &str = "%d %b @ %I:%M%p";

/// A Booster Pack can be crafted once per day for every game.
pub const CRAFTING_COOLDOWN_DAYS: i64 = 1;

/// Cooldown between two crafts of the same Booster Pack.
pub const CRAFTING_COOLDOWN: Duration = Duration::days(CRAFTING_COOLDOWN_DAYS);

// Leap year used while parsing so that "29 Feb" is always a valid date.
const PARSE_YEAR: i32 = 2000;

/// Whether the crafting cooldown has elapsed at `now`.
///
/// `None` means the pack was never crafted and is eligible right away.
pub fn is_cooldown_elapsed(next_eligible: Option<&str>, now: NaiveDateTime) -> Result<bool, BoosterError> {
    let Some(next_eligible) = next_eligible else {
        return Ok(true);
    };

    let parsed = NaiveDateTime::parse_from_str(
        &format!("{} {}", next_eligible.trim(), PARSE_YEAR),
        &format!("{} %Y", NEXT_ELIGIBLE_FORMAT),
    )?;

    // 29 Feb does not exist this year, so it cannot lie within one cooldown of now.
    let Some(next_eligible) = parsed.with_year(now.year()) else {
        return Ok(true);
    };

    let delta = next_eligible - now;
    let cooldown_has_ended = delta < Duration::zero();
    let cooldown_ended_last_year = delta > CRAFTING_COOLDOWN;

    Ok(cooldown_has_ended || cooldown_ended_last_year)
}

/// Renders `instant` in the next-eligible format.
pub fn format_next_eligible(instant: NaiveDateTime) -> String {
    instant.format(NEXT_ELIGIBLE_FORMAT).to_string()
}

/// Next-eligible timestamp to store after crafting a pack at `now`.
pub fn next_eligible_after_craft(now: NaiveDateTime) -> String {
    format_next_eligible(now + CRAFTING_COOLDOWN)
}

//! Render-time formatting. Nothing here is ever stored.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

/// Shown in place of an absent follow-up date.
pub const NO_FOLLOW_UP: &str = "—";

/// Shown when a (filtered) collection has no rows.
pub const NO_PATIENTS: &str = "No patients found";

/// `dd/mm/yyyy` in the given zone.
pub fn short_date<Tz>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%d/%m/%Y").to_string()
}

/// `dd/mm/yyyy, HH:MM` in the given zone (visit date picker).
pub fn date_time<Tz>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%d/%m/%Y, %H:%M").to_string()
}

/// Follow-up column text: the short date, or the placeholder.
pub fn follow_up<Tz>(at: Option<&DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.map(|at| short_date(at, tz))
        .unwrap_or_else(|| NO_FOLLOW_UP.to_string())
}

use log::debug;
use time::format_description::well_known::Rfc3339;
use time::{macros::format_description, Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::feed::SaleEnd;
use crate::locale::Lang;

/// The reference point for countdowns.
///
/// Naive timestamps in the feed (no offset) are read in `local_offset`, bare
/// dates are midnight UTC.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    now: OffsetDateTime,
    local_offset: UtcOffset,
}

impl Clock {
    pub fn new(now: OffsetDateTime, local_offset: UtcOffset) -> Self {
        Self { now, local_offset }
    }

    pub fn system(local_offset: UtcOffset) -> Self {
        Self::new(OffsetDateTime::now_utc(), local_offset)
    }

    pub fn now(&self) -> OffsetDateTime {
        self.now
    }

    pub fn parse(&self, s: &str) -> Option<OffsetDateTime> {
        let s = s.trim();
        if let Ok(datetime) = OffsetDateTime::parse(s, &Rfc3339) {
            return Some(datetime);
        }
        if let Ok(date) = Date::parse(s, format_description!("[year]-[month]-[day]")) {
            return Some(date.midnight().assume_utc());
        }
        let naive_formats = [
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            format_description!("[year]-[month]-[day] [hour]:[minute]"),
        ];
        naive_formats
            .iter()
            .find_map(|format| PrimitiveDateTime::parse(s, *format).ok())
            .map(|datetime| datetime.assume_offset(self.local_offset))
    }

    pub fn resolve(&self, end: &SaleEnd) -> Option<OffsetDateTime> {
        match end {
            SaleEnd::Text(s) => self.parse(s),
            SaleEnd::EpochMillis(ms) if ms.is_finite() => {
                OffsetDateTime::from_unix_timestamp_nanos((ms * 1_000_000.0) as i128).ok()
            }
            SaleEnd::EpochMillis(_) => None,
        }
    }
}

/// Human readable time left until `sale_ends_at`, or `None` when the end is
/// missing or not a timestamp.
pub fn days_left(sale_ends_at: Option<&SaleEnd>, lang: Lang, clock: &Clock) -> Option<String> {
    let raw = sale_ends_at?;
    let end = match clock.resolve(raw) {
        Some(end) => end,
        None => {
            debug!("Unparseable sale end {raw}, skipping countdown");
            return None;
        }
    };
    let hours = (end - clock.now()).as_seconds_f64() / 3600.0;

    if hours < 0.0 {
        return Some(lang.ended().to_string());
    }
    if hours < 24.0 {
        return Some(lang.hours_left(hours.ceil() as i64));
    }
    Some(lang.days_left((hours / 24.0).ceil() as i64))
}

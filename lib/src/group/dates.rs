use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

use crate::value::Record;
use crate::walk::WHEN;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%B %d %Y %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%B %d %Y %H:%M",
    "%B %d, %Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%a %B %d %Y",
    "%m %d %Y",
];

/// Parses a date, with or without a time of day. Dates without a time are
/// at midnight. Offsets, if present, are dropped in favor of the local time
/// they name.
///
/// ```rust
/// use chrono::NaiveDate;
/// use trellis::group::parse_date;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(parse_date("March 5, 2024 7:00 PM"), day.and_hms_opt(19, 0, 0));
/// assert_eq!(parse_date("2024-03-05T19:00:00"), day.and_hms_opt(19, 0, 0));
/// assert_eq!(parse_date("Mar 5 2024"), day.and_hms_opt(0, 0, 0));
/// assert_eq!(parse_date("Smarch 5"), None);
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// The date strings `record` declares: its `when` field, a scalar or a list,
/// or else its `month`, `day` and `year` fields joined together.
pub fn date_strings(record: &Record) -> Vec<String> {
    if let Some(when) = record.get_either_case(WHEN) {
        return when.scalars().map(String::from).collect();
    }

    let field = |name: &str| record.get_either_case(name).and_then(|v| v.as_scalar());
    match (field("month"), field("day"), field("year")) {
        (Some(month), Some(day), Some(year)) => vec![format!("{month} {day} {year}")],
        _ => vec![],
    }
}

/// The event dates of `record`, in declaration order. Dates that don't parse
/// are logged and left out.
pub fn event_dates(record: &Record) -> Vec<NaiveDateTime> {
    date_strings(record)
        .into_iter()
        .filter(|text| !text.trim().is_empty())
        .filter_map(|text| {
            let date = parse_date(&text);
            if date.is_none() {
                warn!(date = %text, "dropping unparseable event date");
            }

            date
        })
        .collect()
}

/// A record paired with one of its event dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event<'a> {
    /// The record's position in its collection.
    pub index: usize,
    pub record: &'a Record,
    pub date: NaiveDateTime,
}

impl Event<'_> {
    /// The event's day, as in `Tue Jan 01 2030`.
    pub fn day_label(&self) -> String {
        day_label(self.date.date())
    }

    /// The event's time of day, as in `7:00 PM`.
    pub fn time_label(&self) -> String {
        self.date.format("%-I:%M %p").to_string()
    }
}

pub fn day_label(day: NaiveDate) -> String {
    day.format("%a %b %d %Y").to_string()
}

fn events(records: &[Record]) -> impl Iterator<Item = Event<'_>> {
    records.iter().enumerate().flat_map(|(index, record)| {
        event_dates(record).into_iter().map(move |date| Event { index, record, date })
    })
}

/// Every event after `now`, one per record and date, earliest first. Events
/// at the same instant keep collection order.
pub fn upcoming_events(records: &[Record], now: NaiveDateTime) -> Vec<Event<'_>> {
    let mut upcoming: Vec<_> = events(records).filter(|e| e.date > now).collect();
    upcoming.sort_by_key(|e| e.date);
    upcoming
}

/// Splits date-sorted `events` into runs that share a calendar day.
pub fn group_by_day<'a>(events: &[Event<'a>]) -> Vec<(NaiveDate, Vec<Event<'a>>)> {
    let mut days: Vec<(NaiveDate, Vec<Event<'a>>)> = vec![];
    for event in events {
        let day = event.date.date();
        match days.last_mut() {
            Some((last, group)) if *last == day => group.push(*event),
            _ => days.push((day, vec![*event])),
        }
    }

    days
}

/// The event closest to, but after, `now`. Of events at the same instant, the
/// one whose record comes first wins.
pub fn next_event(records: &[Record], now: NaiveDateTime) -> Option<Event<'_>> {
    events(records)
        .filter(|e| e.date > now)
        .fold(None, |next: Option<Event<'_>>, e| match next {
            Some(next) if next.date <= e.date => Some(next),
            _ => Some(e),
        })
}

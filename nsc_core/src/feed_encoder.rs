//! Serializes calendar events into an iCalendar (RFC 5545) document.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike, Property};

use crate::{
    error::{FeedError, FeedResult},
    event_assembler::{CalendarEvent, EventStatus},
};

static DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Encodes events into one calendar document.
#[derive(Debug, Clone)]
pub struct FeedEncoder {
    prod_id: String,
    default_calendar_name: String,
    stamp: DateTime<Utc>,
}

impl FeedEncoder {
    /// `stamp` is written as `DTSTAMP` of every event and should be the
    /// moment the feed is generated.
    pub fn new(
        prod_id: impl Into<String>,
        default_calendar_name: impl Into<String>,
        stamp: DateTime<Utc>,
    ) -> Self {
        Self {
            prod_id: prod_id.into(),
            default_calendar_name: default_calendar_name.into(),
            stamp,
        }
    }

    /// Encode the events in order.
    ///
    /// An empty list gives an empty but valid calendar.
    pub fn encode(&self, events: &[CalendarEvent]) -> FeedResult<String> {
        check_events(events)?;
        let calendar_name = events
            .first()
            .map_or(self.default_calendar_name.as_str(), |event| {
                event.feed_title.as_str()
            });
        let mut calendar = Calendar::new();
        calendar.name(calendar_name);
        calendar.append_property(Property::new("METHOD", "PUBLISH"));
        for event in events {
            calendar.push(self.build_event(event));
        }
        let calendar = calendar.done();
        Ok(self.replace_prod_id(&calendar.to_string()))
    }

    fn build_event(&self, event: &CalendarEvent) -> icalendar::Event {
        let mut ics_event = icalendar::Event::new();
        ics_event
            .uid(&event.uid)
            .add_property("DTSTAMP", format_date_time(&self.stamp))
            .starts(event.start)
            .ends(event.end)
            .summary(&event.title)
            .location(&event.location)
            .description(&event.description)
            .status(status(event.status))
            .add_property("TRANSP", event.transparency.as_str());
        ics_event.done()
    }

    /// The `icalendar` crate writes its own `PRODID`; name this product instead.
    fn replace_prod_id(&self, ics: &str) -> String {
        let mut result = String::with_capacity(ics.len() + self.prod_id.len());
        for line in ics.lines() {
            if line.starts_with("PRODID:") {
                result.push_str("PRODID:");
                result.push_str(&self.prod_id);
            } else {
                result.push_str(line);
            }
            result.push_str("\r\n");
        }
        result
    }
}

fn status(status: EventStatus) -> icalendar::EventStatus {
    match status {
        EventStatus::Confirmed => icalendar::EventStatus::Confirmed,
    }
}

/// Reject events a calendar application would misinterpret.
fn check_events(events: &[CalendarEvent]) -> FeedResult<()> {
    let mut uids = HashSet::new();
    for event in events {
        if event.start >= event.end {
            return Err(FeedError::encoding(format!(
                "event {} ends at {} before it starts at {}",
                event.uid, event.end, event.start
            )));
        }
        if !uids.insert(event.uid.as_str()) {
            return Err(FeedError::encoding(format!("duplicate event uid {}", event.uid)));
        }
    }
    Ok(())
}

fn format_date_time(date_time: &DateTime<Utc>) -> String {
    date_time.format(DATE_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufReader, Cursor},
        sync::Arc,
    };

    use chrono::TimeZone;
    use ical::{parser::ical::component::IcalCalendar, IcalParser};

    use super::*;
    use crate::{
        catalog::Catalog,
        date_time_resolver::DateTimeResolver,
        event_assembler::{EventAssembler, Transparency},
        period_timetable::PeriodTimetable,
    };

    /// Maximum line length in octets, not counting the CRLF.
    const MAX_LINE_OCTETS: usize = 75;

    fn encoder() -> FeedEncoder {
        FeedEncoder::new(
            "-//NAIST Syllabus App//syllabus.naist.yashikota.com",
            "NAIST Syllabus App",
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        )
    }

    fn assembler() -> EventAssembler {
        let resolver = DateTimeResolver::new(Arc::new(PeriodTimetable::default()), 9);
        EventAssembler::new(
            resolver,
            "NAIST Syllabus App",
            "https://syllabus.naist.yashikota.com",
            "syllabus.naist.yashikota.com",
        )
    }

    fn event(uid: &str, title: &str, day: u32) -> CalendarEvent {
        CalendarEvent {
            feed_title: String::from("Information Theory"),
            start: Utc.with_ymd_and_hms(2024, 5, day, 4, 30, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 5, day, 6, 0, 0).unwrap(),
            title: String::from(title),
            location: String::from("L1"),
            description: String::from("Entropy\nhttps://syllabus.naist.yashikota.com/4001"),
            status: EventStatus::Confirmed,
            transparency: Transparency::Opaque,
            uid: String::from(uid),
        }
    }

    fn parse(ics: &str) -> IcalCalendar {
        let calendars: Vec<_> = IcalParser::new(BufReader::new(Cursor::new(ics)))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(calendars.len(), 1);
        calendars.into_iter().next().unwrap()
    }

    /// Join folded lines back into content lines.
    fn unfold(ics: &str) -> Vec<String> {
        ics.replace("\r\n ", "")
            .split("\r\n")
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    fn property<'a>(event: &'a ical::parser::ical::component::IcalEvent, name: &str) -> &'a str {
        event
            .properties
            .iter()
            .find(|property| property.name == name)
            .and_then(|property| property.value.as_deref())
            .unwrap()
    }

    /// Undo RFC 5545 TEXT escaping, whether or not the reader already did.
    fn unescape(value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            match chars.next() {
                Some('n') | Some('N') => result.push('\n'),
                Some(escaped @ (',' | ';' | '\\')) => result.push(escaped),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        }
        result
    }

    #[test]
    fn test_encode_empty() {
        let ics = encoder().encode(&[]).unwrap();
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        let lines = unfold(&ics);
        for expected in [
            "VERSION:2.0",
            "PRODID:-//NAIST Syllabus App//syllabus.naist.yashikota.com",
            "METHOD:PUBLISH",
            "X-WR-CALNAME:NAIST Syllabus App",
        ] {
            assert!(lines.iter().any(|line| line == expected), "missing {expected}");
        }
        assert_eq!(lines.iter().filter(|line| line.starts_with("PRODID:")).count(), 1);
        assert!(parse(&ics).events.is_empty());
    }

    #[test]
    fn test_encode_event_properties() {
        let ics = encoder()
            .encode(&[event("a@x", "Information Theory | Entropy", 12)])
            .unwrap();
        let lines = unfold(&ics);
        for expected in [
            "X-WR-CALNAME:Information Theory",
            "BEGIN:VEVENT",
            "UID:a@x",
            "DTSTAMP:20240401T000000Z",
            "DTSTART:20240512T043000Z",
            "DTEND:20240512T060000Z",
            "SUMMARY:Information Theory | Entropy",
            "LOCATION:L1",
            "DESCRIPTION:Entropy\\nhttps://syllabus.naist.yashikota.com/4001",
            "STATUS:CONFIRMED",
            "TRANSP:OPAQUE",
            "END:VEVENT",
        ] {
            assert!(lines.iter().any(|line| line == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_encode_escapes_text() {
        let mut special = event("a@x", "Seminar | Q&A, part 1; C:\\course", 12);
        special.description = String::from("one, two; three\nfour");
        let ics = encoder().encode(&[special]).unwrap();
        let lines = unfold(&ics);
        assert!(lines.contains(&String::from("SUMMARY:Seminar | Q&A\\, part 1\\; C:\\\\course")));
        assert!(lines.contains(&String::from("DESCRIPTION:one\\, two\\; three\\nfour")));
    }

    #[test]
    fn test_encode_folds_long_lines() {
        let long = event("a@x", &format!("Information Theory | {}", "情報理論".repeat(20)), 12);
        let ics = encoder().encode(&[long]).unwrap();
        assert!(ics.contains("\r\n "));
        for line in ics.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS, "line too long: {line}");
        }
        // Folding must not split a multi-byte character.
        assert!(unfold(&ics)
            .iter()
            .any(|line| line == &format!("SUMMARY:Information Theory | {}", "情報理論".repeat(20))));
    }

    #[test]
    fn test_encode_round_trip() {
        let catalog =
            Catalog::from_json(include_str!("syllabus_client/tests/catalog.json")).unwrap();
        let mut information_theory = catalog.get("4001").unwrap().clone();
        information_theory.schedule[0].theme = String::from("Entropy, part 1; C:\\course");
        information_theory.schedule[1].theme = "符号化".repeat(30);
        let machine_learning = catalog.get("4002").unwrap();
        let events = assembler()
            .assemble(&[&information_theory, machine_learning], "2024")
            .unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().any(|event| event.title.contains('\\')));

        let ics = encoder().encode(&events).unwrap();
        let calendar = parse(&ics);
        let parsed: Vec<(String, String, String, String, String)> = calendar
            .events
            .iter()
            .map(|parsed| {
                (
                    property(parsed, "UID").to_string(),
                    unescape(property(parsed, "SUMMARY")),
                    property(parsed, "DTSTART").to_string(),
                    property(parsed, "DTEND").to_string(),
                    unescape(property(parsed, "LOCATION")),
                )
            })
            .collect();
        let expected: Vec<(String, String, String, String, String)> = events
            .iter()
            .map(|event| {
                (
                    event.uid.clone(),
                    event.title.clone(),
                    format_date_time(&event.start),
                    format_date_time(&event.end),
                    event.location.clone(),
                )
            })
            .collect();
        assert_eq!(parsed, expected);
        assert_eq!(parsed[0].1, "Information Theory | Entropy, part 1; C:\\course");
    }

    #[test]
    fn test_encode_rejects_duplicate_uid() {
        let events = vec![event("a@x", "One", 12), event("a@x", "Two", 19)];
        assert!(matches!(encoder().encode(&events), Err(FeedError::Encoding(_))));
    }

    #[test]
    fn test_encode_rejects_inverted_event() {
        let mut inverted = event("a@x", "One", 12);
        std::mem::swap(&mut inverted.start, &mut inverted.end);
        assert!(matches!(encoder().encode(&[inverted]), Err(FeedError::Encoding(_))));
    }
}

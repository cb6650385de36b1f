// ABOUTME: Decodes the fixed 29-character MEP2 timestamp with its 3-letter legacy zone code
// ABOUTME: Zone offsets are definitional to the protocol, not IANA-correct, and never shift

use chrono::NaiveDateTime;

use crate::error::{Mep2Error, Mep2Result};

/// The fixed on-the-wire length of a MEP2 timestamp.
const DATE_LEN: usize = 29;

/// Everything up to the zone code: `Sun Aug 11, 2024 12:00 AM`.
const DATE_FORMAT: &str = "%a %b %d, %Y %I:%M %p";

// The timezones defined by the MEP2 protocol. These do not match up very
// well with modern zone databases: old clients use each code to mean a
// particular fixed offset, so we honor that offset verbatim and hand GMT
// times back to the client. The codes after the MEP2 block come from the
// Sierra Solutions Mailroom TIMEZONES.TXT. The protocol documents define
// MST twice; the first definition (-7) wins.
const ZONE_TABLE: &[(&str, i32)] = &[
    // MEP2 timezones
    ("AHS", -10),
    ("AHD", -9),
    ("YST", -9),
    ("YDT", -8),
    ("PST", -8),
    ("PDT", -7),
    ("MST", -7),
    ("MDT", -6),
    ("CST", -6),
    ("CDT", -5),
    ("EST", -5),
    ("EDT", -4),
    ("AST", -4),
    ("GMT", 0),
    ("BST", 1),
    ("WES", 1),
    ("WED", 2),
    ("EMT", 2),
    ("MTS", 3),
    ("MTD", 4),
    ("JST", 9),
    ("EAD", 10),
    // Sierra Solutions Mailroom timezones (TIMEZONES.TXT)
    ("AKT", -9),
    ("HST", -10),
    ("SNG", 8),
];

fn zone_offset(zone: &str) -> Option<i32> {
    ZONE_TABLE
        .iter()
        .find(|(name, _)| *name == zone)
        .map(|(_, offset)| *offset)
}

/// A MEP2 timestamp, held both as the sender's local time and projected
/// to GMT.
///
/// The original zone code is preserved verbatim for rendering the
/// timestamp back the way it arrived. Resolution is one minute.
/// Equality compares the zone code and the GMT projection; the local
/// components carry no extra information.
#[derive(Debug, Clone)]
pub struct Date {
    orig_zone: String,
    offset_hours: i32,
    local_time: NaiveDateTime,
    gmt_time: NaiveDateTime,
}

impl Date {
    /// Parses a timestamp of exactly 29 bytes: `Sun Aug 11, 2024 12:00 AM PST`.
    pub fn parse(line: &str) -> Mep2Result<Self> {
        if line.len() != DATE_LEN || !line.is_ascii() {
            return Err(Mep2Error::MalformedData(
                "Failed to parse date and time".into(),
            ));
        }

        let stamp = &line[..25];
        let local_time = NaiveDateTime::parse_from_str(stamp, DATE_FORMAT).map_err(|_| {
            Mep2Error::MalformedData(format!("Failed to parse date and time, data: '{line}'"))
        })?;

        let zone = &line[26..];
        let offset_hours = zone_offset(zone).ok_or_else(|| {
            Mep2Error::MalformedData(format!("Invalid timezone specifier {zone}"))
        })?;

        let offset = chrono::Duration::try_hours(i64::from(offset_hours)).ok_or_else(|| {
            Mep2Error::MalformedData(format!("Invalid timezone specifier {zone}"))
        })?;

        Ok(Date {
            orig_zone: zone.to_string(),
            offset_hours,
            local_time,
            gmt_time: local_time - offset,
        })
    }

    /// The 3-letter zone code exactly as it arrived.
    pub fn orig_zone(&self) -> &str {
        &self.orig_zone
    }

    /// The fixed offset the zone code denotes, in hours east of GMT.
    pub fn offset_hours(&self) -> i32 {
        self.offset_hours
    }

    pub fn local_time(&self) -> NaiveDateTime {
        self.local_time
    }

    pub fn gmt_time(&self) -> NaiveDateTime {
        self.gmt_time
    }

    /// Renders the GMT projection, e.g. `Sun Aug 11, 2024 08:00 AM GMT`.
    pub fn to_gmt_string(&self) -> String {
        format!("{} GMT", self.gmt_time.format(DATE_FORMAT))
    }

    /// Renders the timestamp as it arrived, original zone code included.
    pub fn to_orig_string(&self) -> String {
        format!("{} {}", self.local_time.format(DATE_FORMAT), self.orig_zone)
    }
}

impl PartialEq for Date {
    fn eq(&self, rhs: &Self) -> bool {
        self.orig_zone == rhs.orig_zone && self.gmt_time == rhs.gmt_time
    }
}

impl Eq for Date {}

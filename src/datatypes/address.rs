// ABOUTME: MEP2 structured address grammar: identity line, org/loc routing, EMS/MBX directives
// ABOUTME: Includes MCI-ID surface-shape matching and canonicalization

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::codec::{rtrim_str, str_starts_with_ignore_case, trim_str};
use crate::error::{Mep2Error, Mep2Result};

/// Aggregate limit on the MBX routing strings of one address.
const MAX_MBX_LEN: usize = 305;

static MCIID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{3}-\d{4}|\d{3}-\d{3}-\d{4}|\d{7}|\d{10})$").unwrap()
});

/// True when the line has one of the four MCI-ID surface shapes:
/// `123-4567`, `123-456-7890`, `1234567`, `1234567890`.
pub fn is_mciid(line: &str) -> bool {
    MCIID_RE.is_match(line)
}

/// Recognizes an MCI-ID component, honoring the explicit `MCI ID:` prefix.
///
/// With the prefix present the remainder must be a valid ID; without it a
/// non-ID shape simply means the component is something else.
fn parse_mciid(line: &str) -> Mep2Result<Option<&str>> {
    let (line, explicit) = match line.strip_prefix("MCI ID:") {
        Some(rest) => (rest.trim_start_matches([' ', '\t']), true),
        None => (line, false),
    };

    if is_mciid(line) {
        return Ok(Some(line));
    }

    if explicit {
        return Err(Mep2Error::MalformedData(
            "Invalid MCI ID after MCI ID:".into(),
        ));
    }

    Ok(None)
}

/// Canonicalizes an MCI-ID into `123-4567` or `123-456-7890` form.
///
/// A leading `000` or `000-` on the long forms is stripped first; a
/// 12-character ID like `000-123-4567` is therefore not yet canonical.
pub fn canonicalize_mciid(line: &str) -> Mep2Result<String> {
    if !is_mciid(line) {
        return Err(Mep2Error::MalformedData("Invalid MCI ID format".into()));
    }

    if line.len() == 8 {
        return Ok(line.to_string());
    }

    let mut line = line;
    if line.len() >= 10 && line.starts_with("000") {
        line = if line.as_bytes()[3] == b'-' {
            &line[4..]
        } else {
            &line[3..]
        };
    }

    if line.len() == 8 || line.len() == 12 {
        return Ok(line.to_string());
    }

    // Digits only, add the dashes
    if line.len() == 7 {
        Ok(format!("{}-{}", &line[..3], &line[3..]))
    } else {
        Ok(format!("{}-{}-{}", &line[..3], &line[3..6], &line[6..]))
    }
}

/// One parsed MEP2 address as it appeared on the wire.
///
/// The identity line fills name/id/org/loc; continuation lines fill the
/// EMS routing backend and its MBX mailbox tokens. When an org/loc
/// position arrives without a `Loc:`/`Org:` tag it lands in one of the
/// unresolved slots for a later directory lookup to sort out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawAddress {
    pub name: String,
    pub id: String,
    pub organization: String,
    pub location: String,
    pub unresolved_org_loc_1: String,
    pub unresolved_org_loc_2: String,

    /// Reserved for alert routing
    pub alert: String,

    pub ems: String,
    pub mbx: Vec<String>,

    /// True iff an option list literally appeared in parentheses
    pub has_options: bool,
    pub board: bool,
    pub instant: bool,
    pub list: bool,
    pub owner: bool,
    pub onite: bool,
    pub print: bool,
    pub receipt: bool,
    pub no_receipt: bool,
}

impl RawAddress {
    /// Parses a trailing parenthesized option list and removes it from the
    /// line. Option keywords are literal and case-sensitive.
    fn parse_options(&mut self, line: &mut &str) -> Mep2Result<()> {
        // The line is right-stripped, so the last character is a ')' iff
        // options are present.
        let s = *line;
        if !s.ends_with(')') {
            return Ok(());
        }

        if s.matches('(').count() != 1 || s.matches(')').count() != 1 {
            return Err(Mep2Error::MalformedData(
                "Malformed options, too many parenthesis".into(),
            ));
        }

        let open = s.find('(').ok_or_else(|| {
            Mep2Error::MalformedData("Malformed options, too many parenthesis".into())
        })?;

        let mut options = trim_str(&s[open + 1..s.len() - 1]);

        // Further parsing steps must not see the options or any whitespace
        // separating them from the address.
        *line = rtrim_str(&s[..open]);

        while !options.is_empty() {
            let (option, rest) = match options.find(',') {
                Some(delim) if delim == options.len() - 1 => {
                    return Err(Mep2Error::MalformedData(
                        "Malformed options, trailing comma".into(),
                    ));
                }
                Some(delim) => (&options[..delim], &options[delim + 1..]),
                None => (options, ""),
            };
            options = rest;

            if option.is_empty() {
                return Err(Mep2Error::MalformedData(
                    "Malformed options, empty option".into(),
                ));
            }

            match trim_str(option) {
                "BOARD" => self.board = true,
                "INSTANT" => self.instant = true,
                "LIST" => self.list = true,
                "OWNER" => self.owner = true,
                "ONITE" => self.onite = true,
                "PRINT" => self.print = true,
                "RECEIPT" => self.receipt = true,
                "NO RECEIPT" => self.no_receipt = true,
                unknown => {
                    return Err(Mep2Error::MalformedData(format!(
                        "Malformed options, unknown option '{unknown}'"
                    )));
                }
            }
            self.has_options = true;
        }

        Ok(())
    }

    /// Routes one org/loc component. An MCI-ID shape is never legal here.
    fn parse_org_or_loc(&mut self, part: &str) -> Mep2Result<()> {
        if is_mciid(part) {
            return Err(Mep2Error::MalformedData(
                "Location/Organization cannot be an MCI ID".into(),
            ));
        }

        if let Some(rest) = part.strip_prefix("Loc:") {
            let rest = trim_str(rest);
            if rest.is_empty() {
                return Err(Mep2Error::MalformedData("Location cannot be empty".into()));
            }
            self.location = rest.to_string();
        } else if let Some(rest) = part.strip_prefix("Org:") {
            let rest = trim_str(rest);
            if rest.is_empty() {
                return Err(Mep2Error::MalformedData(
                    "Organization cannot be empty".into(),
                ));
            }
            self.organization = rest.to_string();
        } else {
            if part.is_empty() {
                return Err(Mep2Error::MalformedData(
                    "Organization/Location cannot be empty".into(),
                ));
            }

            if self.unresolved_org_loc_1.is_empty() {
                self.unresolved_org_loc_1 = part.to_string();
            } else {
                self.unresolved_org_loc_2 = part.to_string();
            }
        }

        Ok(())
    }

    /// Parses the identity line of an address: up to three `/`-separated
    /// fields (name or ID, then org/loc components) plus optional trailing
    /// recipient options in parentheses.
    pub fn parse_first_line(&mut self, line: &str) -> Mep2Result<()> {
        let num_slashes = line.matches('/').count();
        if num_slashes > 2 {
            return Err(Mep2Error::MalformedData("Too many fields".into()));
        }

        let mut line = rtrim_str(line);
        if line.is_empty() {
            return Err(Mep2Error::MalformedData("Empty address".into()));
        }

        // Check to see if we have recipient options
        self.parse_options(&mut line)?;

        // No slashes, must just be a name or id.
        if num_slashes == 0 {
            if let Some(mciid) = parse_mciid(line)? {
                self.id = canonicalize_mciid(mciid)?;
            } else {
                if line.is_empty() {
                    return Err(Mep2Error::MalformedData("Name cannot be empty".into()));
                }
                self.name = line.to_string();
            }

            return Ok(());
        }

        let Some(first_slash) = line.find('/') else {
            return Err(Mep2Error::MalformedData("Name/ID field invalid".into()));
        };

        let first_part = &line[..first_slash];
        if first_part.is_empty() {
            return Err(Mep2Error::MalformedData("Name/ID field invalid".into()));
        }
        let first_part = rtrim_str(first_part);

        if let Some(mciid) = parse_mciid(first_part)? {
            // Handle "MCIID / Org or Loc"
            self.id = canonicalize_mciid(mciid)?;
        } else {
            // Handle "Name / MCIid" or "Name / Org or Loc"
            self.name = first_part.to_string();
        }

        let rest = &line[first_slash + 1..];
        if rest.is_empty() {
            return Err(Mep2Error::MalformedData(
                "First Organization/Location field invalid".into(),
            ));
        }
        let rest = trim_str(rest);

        if num_slashes == 1 {
            if self.id.is_empty() {
                // Deal with "User name / MCIID"
                if let Some(mciid) = parse_mciid(rest)? {
                    self.id = canonicalize_mciid(mciid)?;
                    return Ok(());
                }
            }

            return self.parse_org_or_loc(rest);
        }

        // Deal with "Name or ID / Org or Loc / Org or Loc"
        let Some(second_slash) = rest.find('/') else {
            return Err(Mep2Error::MalformedData("Name/ID field invalid".into()));
        };
        let second_part = trim_str(&rest[..second_slash]);
        let third_part = trim_str(&rest[second_slash + 1..]);

        if is_mciid(second_part) || is_mciid(third_part) {
            return Err(Mep2Error::MalformedData(
                "Organization/Location cannot be an MCI ID".into(),
            ));
        }

        self.parse_org_or_loc(second_part)?;
        self.parse_org_or_loc(third_part)
    }

    /// Parses an address continuation field. Only EMS and MBX directives
    /// are accepted, and an MBX is only legal once an EMS has been set.
    pub fn parse_field(&mut self, field: &str, information: &str) -> Mep2Result<()> {
        // Shortest possible field is MBX:
        if field.len() < 4 {
            return Err(Mep2Error::MalformedData("Unknown field type".into()));
        }

        if str_starts_with_ignore_case(field, "ems:") {
            if !self.ems.is_empty() {
                return Err(Mep2Error::MalformedData(
                    "Multiple EMS directive in address".into(),
                ));
            }

            if information.is_empty() {
                return Err(Mep2Error::MalformedData("EMS cannot be empty".into()));
            }

            self.ems = information.to_string();
        } else if str_starts_with_ignore_case(field, "mbx:") {
            if self.ems.is_empty() {
                return Err(Mep2Error::MalformedData("MBX without EMS".into()));
            }

            if information.is_empty() {
                return Err(Mep2Error::MalformedData("MBX cannot be empty".into()));
            }

            self.mbx.push(information.to_string());

            let mbx_len: usize = self.mbx.iter().map(String::len).sum();
            if mbx_len > MAX_MBX_LEN {
                return Err(Mep2Error::MalformedData(
                    "MBX routing info larger than 305 characters".into(),
                ));
            }
        } else {
            return Err(Mep2Error::MalformedData(format!(
                "Unknown address field {field}"
            )));
        }

        Ok(())
    }
}

impl fmt::Display for RawAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.id)?;
        } else {
            f.write_str(&self.name)?;

            if !self.id.is_empty() {
                write!(f, " / {}", self.id)?;
            } else {
                if !self.location.is_empty() {
                    write!(f, " / Loc: {}", self.location)?;
                }
                if !self.organization.is_empty() {
                    write!(f, " / Org: {}", self.organization)?;
                }
                if !self.unresolved_org_loc_1.is_empty() {
                    write!(f, " / {}", self.unresolved_org_loc_1)?;
                }
                if !self.unresolved_org_loc_2.is_empty() {
                    write!(f, " / {}", self.unresolved_org_loc_2)?;
                }
            }
        }

        if self.has_options {
            let flags = [
                (self.board, "BOARD"),
                (self.instant, "INSTANT"),
                (self.list, "LIST"),
                (self.owner, "OWNER"),
                (self.onite, "ONITE"),
                (self.print, "PRINT"),
                (self.receipt, "RECEIPT"),
                (self.no_receipt, "NO RECEIPT"),
            ];

            f.write_str(" (")?;
            let mut first = true;
            for (set, label) in flags {
                if set {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    f.write_str(label)?;
                }
            }
            f.write_str(")")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> RawAddress {
        let mut address = RawAddress::default();
        address.parse_first_line(line).unwrap();
        address
    }

    #[test]
    fn test_is_mciid_invalid() {
        let cases = [
            "",
            "111-111-",
            "111-111-111",
            "111-1111111",
            "111--1111111",
            "1111-111",
            "NOT-REAL",
            "NOT-VAL-IDSE",
        ];
        for case in cases {
            assert!(!is_mciid(case), "{case:?} should not be an MCI ID");
        }
    }

    #[test]
    fn test_is_mciid_valid() {
        let cases = [
            "111-1111",
            "111-111-1111",
            "000-111-1111",
            "0001111111",
            "1111111",
            "1111111111",
        ];
        for case in cases {
            assert!(is_mciid(case), "{case:?} should be an MCI ID");
        }
    }

    #[test]
    fn test_canonicalize_mciid() {
        let cases = [
            ("111-1111", "111-1111"),
            ("1111111", "111-1111"),
            ("0001111111", "111-1111"),
            ("000-111-1111", "111-1111"),
            ("111-111-1111", "111-111-1111"),
            ("1111111111", "111-111-1111"),
            ("0011111111", "001-111-1111"),
        ];
        for (input, expected) in cases {
            assert_eq!(canonicalize_mciid(input).unwrap(), expected, "{input}");
        }

        assert!(canonicalize_mciid("not an id").is_err());
    }

    #[test]
    fn test_canonical_shape_invariant() {
        // Every accepted ID canonicalizes to 8 or 12 chars with 1 or 2 dashes
        let ids = [
            "111-1111",
            "111-111-1111",
            "000-111-1111",
            "0001111111",
            "1111111",
            "1111111111",
            "0011111111",
            "000-1111",
        ];
        for id in ids {
            let canonical = canonicalize_mciid(id).unwrap();
            let dashes = canonical.matches('-').count();
            assert!(
                (canonical.len() == 8 && dashes == 1)
                    || (canonical.len() == 12 && dashes == 2),
                "{id} canonicalized to {canonical}"
            );
        }
    }

    #[test]
    fn test_first_line_malformed() {
        let cases = [
            "",
            "NAME/",
            "NAME/ORG/",
            "NAME/ORG/LOC/",
            "NAME/Org:/Loc:",
            "NAME/Org:ORG/Loc:",
            "NAME/Org:/Loc:LOC",
            "NAME/Org:org/Loc:loc/",
            "111-1111/222-2222",
            "NAME/222-2222/stuff",
            "NAME/stuff/222-2222",
            "///",
            "       /     /     /      ",
            "NAME (CRAP)",
            "NAME (BOARD,)",
            "NAME (BOARD,,PRINT)",
            "NAME (,)",
            "NAME (,BOARD)",
        ];

        for case in cases {
            let mut address = RawAddress::default();
            assert!(
                matches!(
                    address.parse_first_line(case),
                    Err(Mep2Error::MalformedData(_))
                ),
                "{case:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_first_line_ids() {
        let cases = [
            ("111-1111 ", "111-1111"),
            ("1111111 ", "111-1111"),
            ("0001111111 ", "111-1111"),
            ("000-111-1111 ", "111-1111"),
            ("000-1111 ", "000-1111"),
            ("111-111-1111 ", "111-111-1111"),
            ("1111111111 ", "111-111-1111"),
            ("0011111111 ", "001-111-1111"),
            ("MCI ID: 111-1111", "111-1111"),
        ];

        for (line, id) in cases {
            assert_eq!(parsed(line).id, id, "{line:?}");
        }
    }

    #[test]
    fn test_first_line_forms() {
        let gandalf = "Gandalf the Gray";

        assert_eq!(
            parsed("Gandalf the Gray  "),
            RawAddress {
                name: gandalf.into(),
                ..Default::default()
            }
        );
        assert_eq!(
            parsed("Gandalf the Gray/111-1111"),
            RawAddress {
                name: gandalf.into(),
                id: "111-1111".into(),
                ..Default::default()
            }
        );
        assert_eq!(
            parsed("Gandalf the Gray / 111-1111 "),
            RawAddress {
                name: gandalf.into(),
                id: "111-1111".into(),
                ..Default::default()
            }
        );
        assert_eq!(
            parsed("Gandalf the Gray / MCI ID: 111-1111"),
            RawAddress {
                name: gandalf.into(),
                id: "111-1111".into(),
                ..Default::default()
            }
        );
        assert_eq!(
            parsed("Gandalf the Gray / Org: The Good Guys "),
            RawAddress {
                name: gandalf.into(),
                organization: "The Good Guys".into(),
                ..Default::default()
            }
        );
        assert_eq!(
            parsed("Gandalf the Gray / Org: The Good Guys / Loc: Hobbiton "),
            RawAddress {
                name: gandalf.into(),
                organization: "The Good Guys".into(),
                location: "Hobbiton".into(),
                ..Default::default()
            }
        );
        assert_eq!(
            parsed("Gandalf the Gray / The Good Guys / Loc: Hobbiton "),
            RawAddress {
                name: gandalf.into(),
                location: "Hobbiton".into(),
                unresolved_org_loc_1: "The Good Guys".into(),
                ..Default::default()
            }
        );
        assert_eq!(
            parsed("Gandalf the Gray / Org: The Good Guys / Hobbiton "),
            RawAddress {
                name: gandalf.into(),
                organization: "The Good Guys".into(),
                unresolved_org_loc_1: "Hobbiton".into(),
                ..Default::default()
            }
        );
        assert_eq!(
            parsed("Gandalf the Gray / The Good Guys / Hobbiton "),
            RawAddress {
                name: gandalf.into(),
                unresolved_org_loc_1: "The Good Guys".into(),
                unresolved_org_loc_2: "Hobbiton".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_first_line_options() {
        let flag_cases: [(&str, fn(&RawAddress) -> bool); 8] = [
            ("Gandalf the Gray (BOARD)", |a| a.board),
            ("Gandalf the Gray (INSTANT)", |a| a.instant),
            ("Gandalf the Gray (LIST)", |a| a.list),
            ("Gandalf the Gray (OWNER)", |a| a.owner),
            ("Gandalf the Gray (ONITE)", |a| a.onite),
            ("Gandalf the Gray (PRINT)", |a| a.print),
            ("Gandalf the Gray (RECEIPT)", |a| a.receipt),
            ("Gandalf the Gray (NO RECEIPT)", |a| a.no_receipt),
        ];

        for (line, flag) in flag_cases {
            let address = parsed(line);
            assert_eq!(address.name, "Gandalf the Gray", "{line:?}");
            assert!(flag(&address), "{line:?}");
            assert!(address.has_options, "{line:?}");
        }

        // Whitespace around option keywords is ignored
        assert!(parsed("Gandalf the Gray ( BOARD )").board);
        assert!(parsed("Gandalf the Gray (       BOARD)").board);

        let all = parsed(
            "Gandalf the Gray (BOARD, INSTANT, LIST, OWNER, ONITE, PRINT, RECEIPT, NO RECEIPT)",
        );
        assert!(
            all.board
                && all.instant
                && all.list
                && all.owner
                && all.onite
                && all.print
                && all.receipt
                && all.no_receipt
        );
    }

    #[test]
    fn test_options_flag_only_set_when_present() {
        assert!(!parsed("Gandalf the Gray").has_options);
        assert!(parsed("Gandalf the Gray (BOARD, INSTANT)").has_options);
    }

    #[test]
    fn test_continuation_fields() {
        let mut address = parsed("Gandalf the Gray");
        address.parse_field("EMS:", "INTERNET").unwrap();
        address.parse_field("MBX:", "gandalf@hobbiton.org").unwrap();
        assert_eq!(address.ems, "INTERNET");
        assert_eq!(address.mbx[0], "gandalf@hobbiton.org");

        let mut address = parsed("Gandalf the Gray");
        address.parse_field("EMS:", "CompuServe").unwrap();
        address.parse_field("MBX:", "CSI:GANDALF").unwrap();
        assert_eq!(address.ems, "CompuServe");
        assert_eq!(address.mbx[0], "CSI:GANDALF");

        let mut address = parsed("Gandalf the Gray");
        address.parse_field("EMS:", "HOBBITONMAIL").unwrap();
        address.parse_field("MBX:", "OR=Hobbiton").unwrap();
        address.parse_field("MBX:", "UN=DT").unwrap();
        address.parse_field("MBX:", "GI=Gandalf").unwrap();
        assert_eq!(address.mbx, vec!["OR=Hobbiton", "UN=DT", "GI=Gandalf"]);
    }

    #[test]
    fn test_continuation_fields_invalid() {
        // EMS cannot be empty
        let mut address = parsed("Gandalf the Gray");
        assert!(address.parse_field("ems:", "").is_err());

        // MBX before EMS
        let mut address = parsed("Gandalf the Gray");
        assert!(address.parse_field("MBX:", "lama").is_err());

        // MBX cannot be empty
        let mut address = parsed("Gandalf the Gray");
        address.parse_field("EMS:", "Some EMS").unwrap();
        assert!(address.parse_field("MBX:", "").is_err());

        // EMS is single-assignment
        let mut address = parsed("Gandalf the Gray");
        address.parse_field("EMS:", "Some EMS").unwrap();
        assert!(address.parse_field("EMS:", "Another EMS").is_err());

        // Field names shorter than "MBX:" are unknown
        let mut address = parsed("Gandalf the Gray");
        assert!(address.parse_field("ems", "").is_err());
        assert!(address.parse_field("MBX", "lama").is_err());
    }

    #[test]
    fn test_mbx_aggregate_length_bound() {
        let mut address = parsed("Gandalf the Gray");
        address.parse_field("EMS:", "INTERNET").unwrap();

        // Three 100-char entries plus one 5-char entry is exactly 305
        let hundred = "m".repeat(100);
        for _ in 0..3 {
            address.parse_field("MBX:", &hundred).unwrap();
        }
        address.parse_field("MBX:", "12345").unwrap();

        // One more byte crosses the limit
        assert!(matches!(
            address.parse_field("MBX:", "x"),
            Err(Mep2Error::MalformedData(_))
        ));
    }

    #[test]
    fn test_display_render() {
        assert_eq!(parsed("111-1111 ").to_string(), "111-1111");
        assert_eq!(
            parsed("Gandalf the Gray/111-1111").to_string(),
            "Gandalf the Gray / 111-1111"
        );
        assert_eq!(
            parsed("Gandalf the Gray / Org: The Good Guys / Loc: Hobbiton").to_string(),
            "Gandalf the Gray / Loc: Hobbiton / Org: The Good Guys"
        );
        assert_eq!(
            parsed("Gandalf the Gray (BOARD, PRINT)").to_string(),
            "Gandalf the Gray (BOARD, PRINT)"
        );
    }
}

// ABOUTME: Shared body for the SCAN and TURN query PDUs
// ABOUTME: Parses the comma-separated KEYWORD and KEYWORD=(value) option grammar

use crate::codec::{decode_string, is_printable};
use crate::error::{Mep2Error, Mep2Result};

/// The mailbox folder a query operates on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Folder {
    Outbox,
    #[default]
    Inbox,
    Desk,
    Trash,
}

/// Body of a SCAN or TURN PDU.
///
/// Both types carry the same option grammar: a comma-separated list of
/// `KEYWORD` or `KEYWORD=(value)` entries. Option keywords and folder
/// names are literal and case-sensitive; subject and from filters arrive
/// percent-encoded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryPdu {
    folder: Folder,
    subject: String,
    from: String,
    priority: bool,
}

impl QueryPdu {
    pub fn folder(&self) -> Folder {
        self.folder
    }

    /// Decoded subject filter; empty when none was given.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Decoded sender filter; empty when none was given.
    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn priority(&self) -> bool {
        self.priority
    }

    pub(crate) fn parse_options(&mut self, options: &[u8]) -> Mep2Result<()> {
        let mut options = options;

        while !options.is_empty() {
            let option = match options.iter().position(|&b| b == b',') {
                Some(delim) => {
                    let option = &options[..delim];
                    options = &options[delim + 1..];
                    option
                }
                None => {
                    let option = options;
                    options = &[];
                    option
                }
            };

            let (keyword, value) = match option.iter().position(|&b| b == b'=') {
                Some(equals) => {
                    let value = &option[equals + 1..];
                    // The minimal value is '(x)'. A zero length is valid,
                    // but only when there was no '=' at all.
                    if value.len() <= 3 {
                        return Err(Mep2Error::Syntax("Value length invalid".into()));
                    }
                    (&option[..equals], value)
                }
                None => (option, &[][..]),
            };

            if value.is_empty() {
                if keyword == b"PRIORITY" {
                    self.priority = true;
                    continue;
                }
                return Err(Mep2Error::Syntax("Missing value".into()));
            }

            // Values must be enclosed in '()'
            let value = if value.first() == Some(&b'(') && value.last() == Some(&b')') {
                &value[1..value.len() - 1]
            } else {
                return Err(Mep2Error::Syntax(
                    "Value must be enclosed in parenthesis".into(),
                ));
            };

            if value.contains(&b'(') || value.contains(&b')') {
                return Err(Mep2Error::Syntax("Value cannot contain parenthesis".into()));
            }

            if keyword == b"FOLDER" {
                self.folder = if value == b"OUTBOX" {
                    Folder::Outbox
                } else if value == b"INBOX" {
                    Folder::Inbox
                } else if value == b"DESK" {
                    Folder::Desk
                } else if value == b"TRASH" {
                    Folder::Trash
                } else {
                    return Err(Mep2Error::MalformedData(
                        "Unknown folder type in folder query".into(),
                    ));
                };
            } else if keyword == b"SUBJECT" {
                let decoded = decode_string(value).map_err(|_| {
                    Mep2Error::MalformedData("Invalid % code in subject query".into())
                })?;
                if !is_printable(&decoded) {
                    return Err(Mep2Error::MalformedData(
                        "Invalid characters in subject query".into(),
                    ));
                }
                self.subject = decoded;
            } else if keyword == b"FROM" {
                let decoded = decode_string(value).map_err(|_| {
                    Mep2Error::MalformedData("Invalid % code in from query".into())
                })?;
                if !is_printable(&decoded) {
                    return Err(Mep2Error::MalformedData(
                        "Invalid characters in from query".into(),
                    ));
                }
                self.from = decoded;
            } else if keyword == b"MAXSIZE"
                || keyword == b"MINSIZE"
                || keyword == b"BEFORE"
                || keyword == b"AFTER"
            {
                // Accepted for compatibility, not acted on
            } else {
                return Err(Mep2Error::Syntax("Unknown keyword".into()));
            }
        }

        Ok(())
    }
}

// ABOUTME: Shared body for the VERIFY and ENV PDUs: the envelope-header sub-grammar
// ABOUTME: Aggregates addresses, dates, subject and id fields; folding lines continue an address

use crate::codec::{
    decode_string, is_printable, ltrim, starts_with_ignore_case, strip_pdu_crlf, trim,
};
use crate::datatypes::address::RawAddress;
use crate::datatypes::date::Date;
use crate::error::{Mep2Error, Mep2Result};

const MAX_SUBJECT_LEN: usize = 255;
const MAX_MESSAGE_ID_LEN: usize = 100;
const MAX_SOURCE_MESSAGE_IDS: usize = 5;
const MAX_SOURCE_MESSAGE_ID_LEN: usize = 78;
const MAX_U_FIELDS: usize = 5;
const MAX_U_NAME_LEN: usize = 20;
const MAX_U_VALUE_LEN: usize = 78;

/// Delivery priority carried in the PDU option word.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Priority {
    #[default]
    None,
    Postal,
    Onite,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum HeaderField {
    From,
    To,
    Cc,
    Date,
    SourceDate,
    MessageId,
    SourceMessageId,
    Subject,
    Handling,
    U,
    AddressCont,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum AddressParseState {
    #[default]
    Idle,
    ParsingTo,
    ParsingCc,
    ParsingFrom,
}

fn truncated(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Body shared by the VERIFY and ENV PDUs.
///
/// VERIFY runs the same grammar in address-only mode, where just `To:`,
/// `Cc:` and address continuation lines are legal.
#[derive(Debug, Default, Clone)]
pub struct EnvelopeHeaderPdu {
    envelope_data: bool,
    parse_state: AddressParseState,

    priority: Priority,
    current_address: RawAddress,
    from_address: Option<RawAddress>,
    to_addresses: Vec<RawAddress>,
    cc_addresses: Vec<RawAddress>,

    date: Option<Date>,
    source_date: Option<Date>,
    subject: Option<String>,
    message_id: Option<String>,
    source_message_ids: Vec<String>,
    u_fields: Vec<(String, String)>,
}

/// Splits one envelope line into its field tag and information part.
///
/// The tag runs up to and including the first `:`. A line starting with
/// space or tab is an address continuation; its sub-field name is the
/// whitespace-stripped tag.
fn split_envelope_line(line: &[u8]) -> Mep2Result<(HeaderField, &[u8], &[u8])> {
    let line = strip_pdu_crlf(line)?;

    if line.is_empty() {
        return Err(Mep2Error::MalformedData("Empty envelope line".into()));
    }

    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or_else(|| Mep2Error::MalformedData("Missing : in envelope line".into()))?;

    let mut field = &line[..colon + 1];
    let information = trim(&line[colon + 1..]);

    let field_type = if starts_with_ignore_case(line, "from:") {
        HeaderField::From
    } else if starts_with_ignore_case(line, "to:") {
        HeaderField::To
    } else if starts_with_ignore_case(line, "cc:") {
        HeaderField::Cc
    } else if starts_with_ignore_case(line, "date:") {
        HeaderField::Date
    } else if starts_with_ignore_case(line, "source-date:") {
        HeaderField::SourceDate
    } else if starts_with_ignore_case(line, "message-id:") {
        HeaderField::MessageId
    } else if starts_with_ignore_case(line, "source-message-id:") {
        HeaderField::SourceMessageId
    } else if starts_with_ignore_case(line, "subject:") {
        HeaderField::Subject
    } else if starts_with_ignore_case(line, "handling:") {
        HeaderField::Handling
    } else if starts_with_ignore_case(line, "u-") {
        HeaderField::U
    } else if line[0] == b' ' || line[0] == b'\t' {
        field = ltrim(field);
        HeaderField::AddressCont
    } else {
        return Err(Mep2Error::MalformedData("Invalid header type".into()));
    };

    Ok((field_type, field, information))
}

impl EnvelopeHeaderPdu {
    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn to_addresses(&self) -> &[RawAddress] {
        &self.to_addresses
    }

    pub fn cc_addresses(&self) -> &[RawAddress] {
        &self.cc_addresses
    }

    pub fn from_address(&self) -> Option<&RawAddress> {
        self.from_address.as_ref()
    }

    pub fn date(&self) -> Option<&Date> {
        self.date.as_ref()
    }

    pub fn source_date(&self) -> Option<&Date> {
        self.source_date.as_ref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn source_message_ids(&self) -> &[String] {
        &self.source_message_ids
    }

    /// The retained `U-` custom fields as (name, value) pairs. The name
    /// keeps its original case with the trailing `:` removed.
    pub fn u_fields(&self) -> &[(String, String)] {
        &self.u_fields
    }

    /// Parses the PDU option word: empty, POSTAL, or ONITE.
    pub(crate) fn parse_options(&mut self, options: &[u8]) -> Mep2Result<()> {
        // This is fine, no priority given
        if options.is_empty() {
            return Ok(());
        }

        if options == b"POSTAL" {
            self.priority = Priority::Postal;
        } else if options == b"ONITE" {
            self.priority = Priority::Onite;
        } else {
            return Err(Mep2Error::MalformedData("Unknown priority".into()));
        }

        Ok(())
    }

    /// Flushes the address being assembled into its destination list.
    fn finish_current_address(&mut self) {
        let address = std::mem::take(&mut self.current_address);

        match self.parse_state {
            AddressParseState::Idle => return,
            AddressParseState::ParsingTo => self.to_addresses.push(address),
            AddressParseState::ParsingCc => self.cc_addresses.push(address),
            AddressParseState::ParsingFrom => self.from_address = Some(address),
        }

        self.parse_state = AddressParseState::Idle;
    }

    /// Parses one envelope line. In address-only mode (VERIFY) only `To:`,
    /// `Cc:` and continuation lines are accepted.
    pub(crate) fn parse_envelope_line(&mut self, line: &[u8], address_only: bool) -> Mep2Result<()> {
        if line.is_empty() {
            return Err(Mep2Error::MalformedData("Empty address line".into()));
        }

        let (field_type, field, information) = split_envelope_line(line)?;

        let information_decoded =
            decode_string(information).map_err(|e| Mep2Error::MalformedData(e.to_string()))?;

        if address_only
            && !matches!(
                field_type,
                HeaderField::AddressCont | HeaderField::To | HeaderField::Cc
            )
        {
            return Err(Mep2Error::MalformedData("Invalid addressing type".into()));
        }

        // Any field but a continuation terminates the address in progress.
        if field_type != HeaderField::AddressCont {
            self.finish_current_address();
        }

        match field_type {
            HeaderField::AddressCont => {
                if self.parse_state == AddressParseState::Idle {
                    return Err(Mep2Error::MalformedData("Invalid start of address".into()));
                }

                if !is_printable(&information_decoded) {
                    return Err(Mep2Error::MalformedData(
                        "Invalid characters in address".into(),
                    ));
                }

                let field_name = String::from_utf8_lossy(field);
                self.current_address
                    .parse_field(&field_name, &information_decoded)?;
            }

            // A To:, Cc: or From: is the start of a new address
            HeaderField::To | HeaderField::Cc | HeaderField::From => {
                match field_type {
                    HeaderField::To => self.parse_state = AddressParseState::ParsingTo,
                    HeaderField::Cc => self.parse_state = AddressParseState::ParsingCc,
                    HeaderField::From => {
                        if self.from_address.is_some() {
                            return Err(Mep2Error::Envelope("Multiple FROM: addresses".into()));
                        }
                        self.parse_state = AddressParseState::ParsingFrom;
                    }
                    _ => {
                        return Err(Mep2Error::UnableToPerform(
                            "Unknown error parsing envelope data".into(),
                        ));
                    }
                }

                if !is_printable(&information_decoded) {
                    return Err(Mep2Error::MalformedData(
                        "Invalid characters in address".into(),
                    ));
                }

                self.current_address.parse_first_line(&information_decoded)?;
            }

            HeaderField::Date => self.date = Some(Date::parse(&information_decoded)?),
            HeaderField::SourceDate => {
                self.source_date = Some(Date::parse(&information_decoded)?);
            }

            HeaderField::Subject => {
                self.subject = Some(truncated(&information_decoded, MAX_SUBJECT_LEN));
            }

            HeaderField::MessageId => {
                self.message_id = Some(truncated(&information_decoded, MAX_MESSAGE_ID_LEN));
            }

            HeaderField::SourceMessageId => {
                if self.source_message_ids.len() == MAX_SOURCE_MESSAGE_IDS {
                    self.source_message_ids.remove(0);
                }
                self.source_message_ids
                    .push(truncated(&information_decoded, MAX_SOURCE_MESSAGE_ID_LEN));
            }

            HeaderField::U => {
                if self.u_fields.len() == MAX_U_FIELDS {
                    self.u_fields.remove(0);
                }

                // remove ":"
                let name = String::from_utf8_lossy(&field[..field.len() - 1]);
                self.u_fields.push((
                    truncated(&name, MAX_U_NAME_LEN),
                    truncated(&information_decoded, MAX_U_VALUE_LEN),
                ));
            }

            HeaderField::Handling => {}
        }

        // We saw *something* valid
        self.envelope_data = true;

        Ok(())
    }

    /// Body-level semantic check at `/END`: an envelope must have carried
    /// data and at least one To: recipient.
    pub(crate) fn finalize(&mut self) -> Mep2Result<()> {
        self.finish_current_address();

        #[cfg(not(feature = "fuzzing"))]
        {
            if !self.envelope_data {
                return Err(Mep2Error::NoEnvelopeData);
            }

            if self.to_addresses.is_empty() {
                return Err(Mep2Error::ToRequired);
            }
        }

        Ok(())
    }
}

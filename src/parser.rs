//! The line-by-line PDU state machine.
//!
//! A caller delivers one logical wire line per `parse_line` call, exactly
//! as received, terminators included. The parser accumulates the running
//! checksum over the raw bytes, routes information lines to the active
//! body, validates the checksum at the terminator, and surrenders the
//! finished body through `extract_pdu`.
//!
//! Errors raised by the body while the PDU is still open are parked in a
//! sticky slot and re-raised at `/END`, so the checksum can still be
//! verified over the full message. Dropping the parser aborts the PDU in
//! progress with no side effects.

use tracing::{debug, warn};

use crate::codec::{ltrim, rtrim, starts_with_ignore_case, strip_pdu_crlf};
use crate::datatypes::{PduChecksum, PduType};
use crate::error::{Mep2Error, Mep2Result};
use crate::frame::PduVariant;
use crate::trie::PDU_TRIE;

/// Byte count of `*XXXX`: the star plus four checksum digits.
const CHECKSUM_TAIL_LEN: usize = 5;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    Parsing,
    Complete,
}

/// Structural checks every PDU line must pass before deeper parsing.
fn validate_pdu_line(line: &[u8]) -> Mep2Result<()> {
    // Shortest possible valid PDU line is /ENV\r, and all PDU lines must
    // start with a /
    if line.len() < 5 {
        return Err(Mep2Error::Syntax("PDU invalid: too short".into()));
    }

    if line[0] != b'/' {
        return Err(Mep2Error::Syntax(
            "PDU invalid: doesn't start with a '/'".into(),
        ));
    }

    if line.iter().filter(|&&b| b == b'*').count() > 1 {
        return Err(Mep2Error::Syntax("Stray '*' in PDU".into()));
    }

    if line.iter().filter(|&&b| b == b'/').count() > 1 {
        return Err(Mep2Error::Syntax("Stray '/' in PDU".into()));
    }

    Ok(())
}

/// Compares the computed checksum against the transmitted digits.
fn compare_text_checksum(computed: PduChecksum, digits: &[u8]) -> Mep2Result<()> {
    // The "ZZZZ" checksum is to be ignored by the server. It is intended
    // for manual testing.
    if starts_with_ignore_case(digits, "zzzz") {
        return Ok(());
    }

    let sender = PduChecksum::parse(digits)?;
    if sender != computed {
        warn!(wanted = %sender, actual = %computed, "PDU checksum mismatch");
        return Err(Mep2Error::Checksum {
            wanted: sender.value(),
            actual: computed.value(),
        });
    }

    Ok(())
}

/// The receive-side PDU parser.
///
/// States advance from idle through parsing to complete, driven solely by
/// `parse_line`.
/// The parser owns the in-progress body exclusively between the opening
/// line and `extract_pdu`.
#[derive(Debug, Default)]
pub struct PduParser {
    state: State,
    current_type: Option<PduType>,
    pending_error: Option<Mep2Error>,
    checksum: PduChecksum,
    current_pdu: Option<PduVariant>,
}

impl PduParser {
    pub fn new() -> Self {
        PduParser::default()
    }

    /// Feeds one wire line, terminators included.
    pub fn parse_line(&mut self, line: &[u8]) -> Mep2Result<()> {
        match self.state {
            State::Idle => self.parse_first_line(line),
            State::Parsing => self.parse_information_line(line),
            State::Complete => {
                #[cfg(not(feature = "fuzzing"))]
                {
                    Err(Mep2Error::Protocol("Unexpected data after PDU".into()))
                }
                #[cfg(feature = "fuzzing")]
                {
                    let _ = line;
                    Ok(())
                }
            }
        }
    }

    /// True once the current PDU is fully parsed and validated.
    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// True when an information-line error is parked for re-raise at /END.
    pub fn has_error(&self) -> bool {
        self.pending_error.is_some()
    }

    /// The type of the PDU in progress, if an opening line was accepted.
    pub fn current_type(&self) -> Option<PduType> {
        self.current_type
    }

    /// Yields the completed PDU and returns the parser to idle.
    pub fn extract_pdu(&mut self) -> Mep2Result<PduVariant> {
        if self.state != State::Complete {
            return Err(Mep2Error::UnableToPerform(
                "extract_pdu called in invalid state".into(),
            ));
        }

        let pdu = self.current_pdu.take().ok_or_else(|| {
            Mep2Error::UnableToPerform("extract_pdu called with no PDU".into())
        })?;
        self.reset();
        Ok(pdu)
    }

    /// Returns to idle unconditionally, discarding any PDU in progress.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.current_type = None;
        self.pending_error = None;
        self.checksum = PduChecksum::new();
        self.current_pdu = None;
    }

    /// Validates the `*XXXX` tail of a CR-stripped line, accumulating the
    /// bytes up to and including the `*` first.
    fn validate_checksum(&mut self, line: &[u8]) -> Mep2Result<()> {
        #[cfg(feature = "fuzzing")]
        {
            let _ = line;
            return Ok(());
        }

        #[cfg(not(feature = "fuzzing"))]
        {
            let star = line
                .iter()
                .position(|&b| b == b'*')
                .ok_or_else(|| Mep2Error::Syntax("PDU line does not have a *".into()))?;

            // The * must appear here, or there's no space for a checksum
            if star != line.len() - CHECKSUM_TAIL_LEN {
                return Err(Mep2Error::Syntax("Checksum too short".into()));
            }

            self.checksum.add_line(&line[..star + 1]);
            compare_text_checksum(self.checksum, &line[star + 1..])
        }
    }

    /// Parses the opening line of a PDU, in one of two forms:
    /// `/<type>[ <options>]*XXXX\r\n` for single-line PDUs, or
    /// `/<type>[ <options>]\r\n` for multi-line PDUs.
    fn parse_first_line(&mut self, line: &[u8]) -> Mep2Result<()> {
        validate_pdu_line(line)?;
        let line_strip = strip_pdu_crlf(line)?;

        // Eat the leading '/', then match the type word
        let after_type = &line_strip[1..];
        let (ty, consumed) = PDU_TRIE
            .find(after_type)
            .ok_or_else(|| Mep2Error::Syntax("Unknown PDU type".into()))?;

        // Eat optional whitespace between the type and options or checksum
        let mut line_parse = ltrim(&after_type[consumed..]);

        let mut pdu = PduVariant::for_type(ty)?;
        self.current_type = Some(ty);

        if ty.is_single_line() {
            self.validate_checksum(line_strip)?;

            // Done with the checksum
            let star = line_parse
                .iter()
                .position(|&b| b == b'*')
                .unwrap_or(line_parse.len());
            line_parse = &line_parse[..star];
        } else {
            // Multi-line PDUs must not have a '*' at all on the first line
            if line.contains(&b'*') {
                return Err(Mep2Error::Syntax(
                    "Unexpected checksum for multi-line PDU".into(),
                ));
            }

            // For a multi-line PDU any trailing whitespace or newlines are
            // part of the checksum
            self.checksum.add_line(line);
        }

        // Trailing whitespace after the options is legal
        let line_parse = rtrim(line_parse);

        pdu.parse_options(line_parse)?;
        self.current_pdu = Some(pdu);

        if ty.is_single_line() {
            self.state = State::Complete;
            debug!(pdu_type = %ty, "single-line PDU complete");
        } else {
            self.state = State::Parsing;
        }

        Ok(())
    }

    /// Handles a line between the opening line and `/END`.
    fn parse_information_line(&mut self, line: &[u8]) -> Mep2Result<()> {
        if line.is_empty() {
            return Ok(());
        }

        if line[0] == b'/' {
            self.parse_end_line(line)?;

            // Re-raise any parked information-line error now that the
            // checksum has been verified over the whole message.
            #[cfg(not(feature = "fuzzing"))]
            if let Some(error) = self.pending_error.clone() {
                return Err(error);
            }

            // Let the body do a semantic check, if necessary
            let pdu = self.current_pdu.as_mut().ok_or_else(|| {
                Mep2Error::UnableToPerform("No PDU in progress".into())
            })?;
            return pdu.finalize();
        }

        self.checksum.add_line(line);

        let pdu = self.current_pdu.as_mut().ok_or_else(|| {
            Mep2Error::UnableToPerform("No PDU in progress".into())
        })?;

        // Once an error is parked, no further body parsing happens; the
        // fuzz build keeps dispatching to reach deeper paths.
        #[cfg(not(feature = "fuzzing"))]
        {
            if self.pending_error.is_none() {
                if let Err(error) = pdu.parse_line(line) {
                    self.pending_error = Some(error);
                }
            }
        }
        #[cfg(feature = "fuzzing")]
        {
            if let Err(error) = pdu.parse_line(line) {
                self.pending_error = Some(error);
            }
        }

        Ok(())
    }

    /// Parses the terminator line: `/end <type>*XXXX\r`.
    fn parse_end_line(&mut self, line: &[u8]) -> Mep2Result<()> {
        validate_pdu_line(line)?;
        let line_strip = strip_pdu_crlf(line)?;

        let after_type = &line_strip[1..];
        let (ty, consumed) = PDU_TRIE
            .find(after_type)
            .ok_or_else(|| Mep2Error::Syntax("Unknown PDU type".into()))?;

        if ty != PduType::End {
            return Err(Mep2Error::Syntax("Unexpected PDU, expected end".into()));
        }

        self.validate_checksum(line_strip)?;

        // Done with the checksum; what is left is the type word of the end
        let mut line_parse = &after_type[consumed..];
        let star = line_parse
            .iter()
            .position(|&b| b == b'*')
            .unwrap_or(line_parse.len());
        line_parse = ltrim(&line_parse[..star]);

        let current_type = self
            .current_type
            .ok_or_else(|| Mep2Error::UnableToPerform("No PDU in progress".into()))?;

        let (end_type, end_consumed) = PDU_TRIE
            .find(line_parse)
            .ok_or_else(|| Mep2Error::Syntax("Unknown PDU type".into()))?;
        if end_type != current_type {
            return Err(Mep2Error::Syntax(format!(
                "Unexpected PDU, expected end {}",
                current_type.name()
            )));
        }

        // There should be no more data left except optional whitespace
        let line_parse = ltrim(&line_parse[end_consumed..]);

        #[cfg(not(feature = "fuzzing"))]
        if !line_parse.is_empty() {
            return Err(Mep2Error::Syntax(format!(
                "Unexpected data after end type: '{}'",
                String::from_utf8_lossy(line_parse)
            )));
        }
        #[cfg(feature = "fuzzing")]
        let _ = line_parse;

        self.state = State::Complete;
        debug!(pdu_type = %current_type, "multi-line PDU complete");

        Ok(())
    }
}

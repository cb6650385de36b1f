//! The tagged union over realized PDU bodies.
//!
//! The parser constructs one variant from the opening line's type word and
//! routes every subsequent call through explicit match arms, so ownership
//! of the in-progress body is always clear. VERIFY and ENV share a body
//! type; the variant tag selects address-only parsing.

use crate::datatypes::{CommentPdu, EnvelopeHeaderPdu, PduType, QueryPdu, TextPdu};
use crate::error::{Mep2Error, Mep2Result};

/// One parsed (or in-progress) PDU.
#[derive(Debug, Clone)]
pub enum PduVariant {
    Busy,
    Create,
    Term,
    Send,
    Scan(QueryPdu),
    Turn(QueryPdu),
    Comment(CommentPdu),
    Verify(EnvelopeHeaderPdu),
    Env(EnvelopeHeaderPdu),
    Text(TextPdu),
}

impl PduVariant {
    /// Constructs the empty body for a PDU type. The HDR, INIT, REPLY and
    /// RESET receive paths are not implemented, and END never opens a PDU.
    pub(crate) fn for_type(ty: PduType) -> Mep2Result<Self> {
        match ty {
            PduType::Busy => Ok(PduVariant::Busy),
            PduType::Create => Ok(PduVariant::Create),
            PduType::Term => Ok(PduVariant::Term),
            PduType::Send => Ok(PduVariant::Send),
            PduType::Scan => Ok(PduVariant::Scan(QueryPdu::default())),
            PduType::Turn => Ok(PduVariant::Turn(QueryPdu::default())),
            PduType::Comment => Ok(PduVariant::Comment(CommentPdu)),
            PduType::Verify => Ok(PduVariant::Verify(EnvelopeHeaderPdu::default())),
            PduType::Env => Ok(PduVariant::Env(EnvelopeHeaderPdu::default())),
            PduType::Text => Ok(PduVariant::Text(TextPdu::default())),
            PduType::End | PduType::Hdr | PduType::Init | PduType::Reply | PduType::Reset => {
                Err(Mep2Error::Syntax("Unhandled PDU type".into()))
            }
        }
    }

    pub fn pdu_type(&self) -> PduType {
        match self {
            PduVariant::Busy => PduType::Busy,
            PduVariant::Create => PduType::Create,
            PduVariant::Term => PduType::Term,
            PduVariant::Send => PduType::Send,
            PduVariant::Scan(_) => PduType::Scan,
            PduVariant::Turn(_) => PduType::Turn,
            PduVariant::Comment(_) => PduType::Comment,
            PduVariant::Verify(_) => PduType::Verify,
            PduVariant::Env(_) => PduType::Env,
            PduVariant::Text(_) => PduType::Text,
        }
    }

    /// Feeds the options substring of the opening line to the body.
    pub(crate) fn parse_options(&mut self, options: &[u8]) -> Mep2Result<()> {
        match self {
            PduVariant::Busy
            | PduVariant::Create
            | PduVariant::Term
            | PduVariant::Send
            | PduVariant::Comment(_) => {
                if options.is_empty() {
                    Ok(())
                } else {
                    Err(Mep2Error::Syntax("Option for non-option PDU".into()))
                }
            }
            PduVariant::Scan(query) | PduVariant::Turn(query) => query.parse_options(options),
            PduVariant::Verify(envelope) | PduVariant::Env(envelope) => {
                envelope.parse_options(options)
            }
            PduVariant::Text(text) => text.parse_options(options),
        }
    }

    /// Feeds one raw information line to the body.
    pub(crate) fn parse_line(&mut self, line: &[u8]) -> Mep2Result<()> {
        match self {
            PduVariant::Busy
            | PduVariant::Create
            | PduVariant::Term
            | PduVariant::Send
            | PduVariant::Scan(_)
            | PduVariant::Turn(_) => Err(Mep2Error::Syntax(
                "Parse line called on single-line PDU".into(),
            )),
            PduVariant::Comment(comment) => comment.parse_line(line),
            PduVariant::Verify(envelope) => envelope.parse_envelope_line(line, true),
            PduVariant::Env(envelope) => envelope.parse_envelope_line(line, false),
            PduVariant::Text(text) => text.parse_line(line),
        }
    }

    /// Runs the body-level semantic check at `/END`.
    pub(crate) fn finalize(&mut self) -> Mep2Result<()> {
        match self {
            PduVariant::Busy
            | PduVariant::Create
            | PduVariant::Term
            | PduVariant::Send
            | PduVariant::Scan(_)
            | PduVariant::Turn(_) => Err(Mep2Error::Syntax(
                "Finalize called on single-line PDU".into(),
            )),
            PduVariant::Comment(_) | PduVariant::Text(_) => Ok(()),
            PduVariant::Verify(envelope) | PduVariant::Env(envelope) => envelope.finalize(),
        }
    }
}

//! Receive-side protocol processor for the MCI Mail MEP2 dialect.
//!
//! MEP2 is a line-oriented store-and-forward mail protocol. This crate
//! implements the receiving half: it takes logical wire lines one at a
//! time and produces validated, strongly-typed PDUs for downstream
//! dispatch. Every byte is treated as adversarial; every rejection maps to
//! a numeric MEP2 status code.
//!
//! The pipeline decomposes into the percent-codec ([`codec`]), the
//! compile-time command trie, the 7-bit additive checksum, the date and
//! address grammars ([`datatypes`]), the per-type PDU bodies
//! ([`frame::PduVariant`]), and the line-by-line framer
//! ([`parser::PduParser`]).
//!
//! # Example
//!
//! ```
//! use mep2::{PduParser, PduVariant};
//!
//! let mut parser = PduParser::new();
//! parser.parse_line(b"/verify\r\n")?;
//! parser.parse_line(b"To: Gandalf\r\n")?;
//! parser.parse_line(b"/end verify*0B01\r\n")?;
//!
//! assert!(parser.is_complete());
//! match parser.extract_pdu()? {
//!     PduVariant::Verify(envelope) => {
//!         assert_eq!(envelope.to_addresses()[0].name, "Gandalf");
//!     }
//!     _ => unreachable!(),
//! }
//! # Ok::<(), mep2::Mep2Error>(())
//! ```
//!
//! # Concurrency
//!
//! The parser and all sub-parsers are single-threaded, synchronous state
//! machines. Each `parse_line` call runs to completion before the caller
//! can issue the next; suspension and timeouts belong to the transport
//! layer driving the parser. Dropping the parser aborts the PDU in
//! progress with no side effects.

pub mod codec;
pub mod datatypes;
pub mod error;
pub mod frame;
pub mod parser;

mod trie;


pub use codec::{decode_string, encode_string, CodecError};
pub use datatypes::{
    canonicalize_mciid, is_mciid, CommentPdu, ContentHandling, ContentType, Date,
    EnvelopeHeaderPdu, Folder, PduChecksum, PduType, Priority, QueryPdu, RawAddress, TextPdu,
};
pub use error::{Mep2Error, Mep2Result, StatusCode};
pub use frame::PduVariant;
pub use parser::PduParser;

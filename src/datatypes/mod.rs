mod address;
mod checksum;
mod comment;
mod date;
mod envelope;
mod pdu_type;
mod query;
mod text;

pub use address::{canonicalize_mciid, is_mciid, RawAddress};
pub use checksum::PduChecksum;
pub use comment::CommentPdu;
pub use date::Date;
pub use envelope::{EnvelopeHeaderPdu, Priority};
pub use pdu_type::PduType;
pub use query::{Folder, QueryPdu};
pub use text::{ContentHandling, ContentType, TextPdu};

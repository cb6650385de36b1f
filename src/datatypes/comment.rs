// ABOUTME: Body of the COMMENT PDU: content is validated and discarded

use crate::codec::{decode_string, strip_pdu_crlf_str};
use crate::error::{Mep2Error, Mep2Result};

/// Body of a COMMENT PDU.
///
/// Comment content is not kept; each line is decoded purely to reject
/// illegal characters and percent codes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommentPdu;

impl CommentPdu {
    pub(crate) fn parse_line(&mut self, line: &[u8]) -> Mep2Result<()> {
        let decoded =
            decode_string(line).map_err(|e| Mep2Error::MalformedData(e.to_string()))?;
        strip_pdu_crlf_str(&decoded)?;
        Ok(())
    }
}

// ABOUTME: Body of the TEXT PDU: content type, optional description, and the body channel
// ABOUTME: ascii/env handling decodes each line; binary handling bypasses the codec

use bytes::{Bytes, BytesMut};

use crate::codec::{decode_string, ltrim, starts_with_ignore_case, trim};
use crate::error::{Mep2Error, Mep2Result};

/// The declared content type of a TEXT PDU.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ContentType {
    #[default]
    Ascii,
    Printable,
    Env,
    Binary,
    G3fax,
    Tlx,
    Voice,
    Tif0,
    Tif1,
    Ttx,
    Videotex,
    Encrypted,
    Sfd,
    Racal,
}

/// How body lines of a content type are handled on receipt.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ContentHandling {
    #[default]
    Ascii,
    Env,
    Binary,
}

/// Content type keywords in match order, with their handling category.
const CONTENT_TYPES: &[(&str, ContentType, ContentHandling)] = &[
    ("ascii", ContentType::Ascii, ContentHandling::Ascii),
    ("printable", ContentType::Printable, ContentHandling::Ascii),
    ("env", ContentType::Env, ContentHandling::Env),
    ("binary", ContentType::Binary, ContentHandling::Binary),
    ("g3fax", ContentType::G3fax, ContentHandling::Binary),
    ("tlx", ContentType::Tlx, ContentHandling::Binary),
    ("voice", ContentType::Voice, ContentHandling::Binary),
    ("tif0", ContentType::Tif0, ContentHandling::Binary),
    ("tif1", ContentType::Tif1, ContentHandling::Binary),
    ("ttx", ContentType::Ttx, ContentHandling::Binary),
    ("videotex", ContentType::Videotex, ContentHandling::Binary),
    ("encrypted", ContentType::Encrypted, ContentHandling::Binary),
    ("sfd", ContentType::Sfd, ContentHandling::Binary),
    ("racal", ContentType::Racal, ContentHandling::Binary),
];

/// Body of a TEXT PDU.
///
/// Lines accumulate into the body buffer according to the handling
/// category: ascii and env content is decoded line by line, binary content
/// is passed through untouched. The buffer is surrendered to the storage
/// collaborator with `take_body()`; the bytes it receives are already
/// normalized by the codec.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextPdu {
    content_type: ContentType,
    handling: ContentHandling,
    description: Option<String>,
    body: BytesMut,
}

impl TextPdu {
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn handling(&self) -> ContentHandling {
        self.handling
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn has_description(&self) -> bool {
        self.description.is_some()
    }

    /// The body bytes accumulated so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Surrenders the accumulated body for the storage handoff.
    pub fn take_body(&mut self) -> Bytes {
        self.body.split().freeze()
    }

    /// Parses `TYPE[:description]`. An empty option list means ASCII.
    pub(crate) fn parse_options(&mut self, options: &[u8]) -> Mep2Result<()> {
        if options.is_empty() {
            return Ok(());
        }

        let options = ltrim(options);

        let matched = CONTENT_TYPES
            .iter()
            .find(|(keyword, _, _)| starts_with_ignore_case(options, keyword));
        let Some(&(_, content_type, handling)) = matched else {
            return Err(Mep2Error::MalformedData("Unknown text type".into()));
        };
        self.content_type = content_type;
        self.handling = handling;

        // Parse description
        let Some(delim) = options.iter().position(|&b| b == b':') else {
            return Ok(());
        };

        let description = trim(&options[delim + 1..]);
        if description.is_empty() {
            return Ok(());
        }

        self.description = Some(
            decode_string(description).map_err(|e| Mep2Error::MalformedData(e.to_string()))?,
        );

        Ok(())
    }

    pub(crate) fn parse_line(&mut self, line: &[u8]) -> Mep2Result<()> {
        match self.handling {
            ContentHandling::Binary => self.body.extend_from_slice(line),
            ContentHandling::Ascii | ContentHandling::Env => {
                let decoded =
                    decode_string(line).map_err(|e| Mep2Error::MalformedData(e.to_string()))?;
                self.body.extend_from_slice(decoded.as_bytes());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(options: &str) -> Mep2Result<TextPdu> {
        let mut pdu = TextPdu::default();
        pdu.parse_options(options.as_bytes())?;
        Ok(pdu)
    }

    #[test]
    fn test_content_types() {
        let cases = [
            ("", ContentType::Ascii, ContentHandling::Ascii),
            ("ASCII", ContentType::Ascii, ContentHandling::Ascii),
            ("PRINTABLE", ContentType::Printable, ContentHandling::Ascii),
            ("ENV", ContentType::Env, ContentHandling::Env),
            ("BINARY", ContentType::Binary, ContentHandling::Binary),
            ("G3FAX", ContentType::G3fax, ContentHandling::Binary),
            ("TLX", ContentType::Tlx, ContentHandling::Binary),
            ("VOICE", ContentType::Voice, ContentHandling::Binary),
            ("TIF0", ContentType::Tif0, ContentHandling::Binary),
            ("TIF1", ContentType::Tif1, ContentHandling::Binary),
            ("TTX", ContentType::Ttx, ContentHandling::Binary),
            ("VIDEOTEX", ContentType::Videotex, ContentHandling::Binary),
            ("ENCRYPTED", ContentType::Encrypted, ContentHandling::Binary),
            ("SFD", ContentType::Sfd, ContentHandling::Binary),
            ("RACAL", ContentType::Racal, ContentHandling::Binary),
        ];

        for (options, content_type, handling) in cases {
            let pdu = text(options).unwrap();
            assert_eq!(pdu.content_type(), content_type, "{options:?}");
            assert_eq!(pdu.handling(), handling, "{options:?}");
        }
    }

    #[test]
    fn test_unknown_content_type() {
        assert!(matches!(
            text("FLOPPY"),
            Err(Mep2Error::MalformedData(_))
        ));
    }

    #[test]
    fn test_descriptions() {
        let cases = [
            ("description", "description"),
            (" description ", "description"),
            ("\tdescription\t", "description"),
            ("text%2Fplain", "text/plain"),
            ("sfj4dc.BOB", "sfj4dc.BOB"),
            (" description with spaces", "description with spaces"),
        ];

        for (raw, expected) in cases {
            let pdu = text(&format!("ASCII:{raw}")).unwrap();
            assert!(pdu.has_description(), "{raw:?}");
            assert_eq!(pdu.description(), Some(expected), "{raw:?}");
        }
    }

    #[test]
    fn test_missing_description() {
        assert!(!text("ASCII").unwrap().has_description());
        assert!(!text("ASCII:").unwrap().has_description());
        assert!(!text("ASCII:   ").unwrap().has_description());
    }

    #[test]
    fn test_ascii_lines_are_decoded() {
        let mut pdu = text("ASCII").unwrap();
        pdu.parse_line(b"Hello %25 world\r\n").unwrap();
        assert_eq!(pdu.body(), b"Hello % world\r\n");

        assert!(matches!(
            pdu.parse_line(b"stray / slash\r\n"),
            Err(Mep2Error::MalformedData(_))
        ));
    }

    #[test]
    fn test_binary_lines_bypass_decoder() {
        let mut pdu = text("BINARY").unwrap();
        pdu.parse_line(b"raw %ZZ / bytes\r\n").unwrap();
        assert_eq!(pdu.body(), b"raw %ZZ / bytes\r\n");
    }

    #[test]
    fn test_take_body() {
        let mut pdu = text("ASCII").unwrap();
        pdu.parse_line(b"line one\r\n").unwrap();
        pdu.parse_line(b"line two\r\n").unwrap();
        let body = pdu.take_body();
        assert_eq!(&body[..], b"line one\r\nline two\r\n");
        assert!(pdu.body().is_empty());
    }
}

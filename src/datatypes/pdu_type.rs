// ABOUTME: Defines the fifteen MEP2 PDU type names and their intrinsic predicates
// ABOUTME: Single-line PDUs carry their checksum on the opening line; the rest end with /END

use num_enum::TryFromPrimitive;

/// The closed set of MEP2 PDU type names.
///
/// Every PDU opens with `/<TYPE>`, matched case-insensitively. Three
/// intrinsic predicates partition the set:
///
/// - **single-line**: the whole PDU is the opening line terminated by
///   `*XXXX` and a carriage return; no `/END` follows.
/// - **has-options**: the type word may be followed by a comma-separated
///   option list.
/// - everything else is multi-line and requires a matching `/END <TYPE>`
///   terminator carrying the checksum.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PduType {
    Busy = 0,
    Comment,
    Create,
    End,
    Env,
    Hdr,
    Init,
    Reply,
    Reset,
    Scan,
    Send,
    Term,
    Text,
    Turn,
    Verify,
}

impl PduType {
    /// True when the entire PDU is one line terminated by its checksum.
    pub const fn is_single_line(&self) -> bool {
        matches!(
            self,
            PduType::Create
                | PduType::Send
                | PduType::Scan
                | PduType::Busy
                | PduType::Turn
                | PduType::Term
        )
    }

    /// True when the type word admits a comma-separated option list.
    pub const fn has_options(&self) -> bool {
        matches!(
            self,
            PduType::Verify | PduType::Text | PduType::Scan | PduType::Turn | PduType::Reply
        )
    }

    /// The canonical uppercase wire name.
    pub const fn name(&self) -> &'static str {
        match self {
            PduType::Busy => "BUSY",
            PduType::Comment => "COMMENT",
            PduType::Create => "CREATE",
            PduType::End => "END",
            PduType::Env => "ENV",
            PduType::Hdr => "HDR",
            PduType::Init => "INIT",
            PduType::Reply => "REPLY",
            PduType::Reset => "RESET",
            PduType::Scan => "SCAN",
            PduType::Send => "SEND",
            PduType::Term => "TERM",
            PduType::Text => "TEXT",
            PduType::Turn => "TURN",
            PduType::Verify => "VERIFY",
        }
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

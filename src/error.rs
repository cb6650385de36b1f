// ABOUTME: MEP2 error types and the numeric status code table
// ABOUTME: Maps every parse failure to the wire status a responder would send

use num_enum::TryFromPrimitive;
use thiserror::Error;

/// MEP2 status codes as they appear on the wire in `/REPLY` lines.
///
/// The positive band (100/101/200) reports success; the 3xx band reports
/// request-level failures the master can correct and retry; the 4xx band
/// reports session-level conditions.
#[derive(TryFromPrimitive)]
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Request performed successfully
    Ok = 100,

    /// Request performed, response data follows
    OkResponse = 101,

    /// Slave should turn the line around
    SlaveShouldTurn = 200,

    /// Unable to perform
    UnableToPerform = 300,

    /// PDU syntax error
    PduSyntaxError = 301,

    /// Protocol violation
    ProtocolViolation = 302,

    /// Malformed data
    MalformedData = 303,

    /// Unimplemented function
    UnimplementedFunction = 304,

    /// At least one problem within envelope
    EnvelopeProblem = 310,

    /// No envelope data received
    EnvelopeNoData = 311,

    /// At least one To: recipient required
    EnvelopeNoTo = 312,

    /// Master must terminate, permanent condition
    MasterMustTermPermanent = 399,

    /// System error
    SystemError = 400,

    /// Insufficient space
    InsufficientSpace = 401,

    /// Master should turn the line around
    MasterShouldTurn = 402,

    /// Checksum error
    ChecksumError = 403,

    /// System unavailable
    SystemUnavailable = 404,

    /// Batch mode unavailable
    BatchModeUnavailable = 405,

    /// Account unknown
    AccountUnknown = 406,

    /// Account in use
    AccountInUse = 407,

    /// Connections busy
    ConnectionsBusy = 408,

    /// Timeout
    Timeout = 409,

    /// Too many checksum errors
    TooManyChecksumErrors = 498,

    /// Master must terminate, temporary condition
    MasterMustTermTemporary = 499,
}

impl StatusCode {
    /// The canonical human-readable message for this status.
    pub const fn message(&self) -> &'static str {
        match self {
            StatusCode::Ok => "Request performed successfully",
            StatusCode::OkResponse => "Request performed, response follows",
            StatusCode::SlaveShouldTurn => "Slave should turn",
            StatusCode::UnableToPerform => "Unable to perform",
            StatusCode::PduSyntaxError => "PDU syntax error",
            StatusCode::ProtocolViolation => "Protocol violation",
            StatusCode::MalformedData => "Malformed data",
            StatusCode::UnimplementedFunction => "Unimplemented function",
            StatusCode::EnvelopeProblem => "At least one problem within envelope",
            StatusCode::EnvelopeNoData => "No envelope data received",
            StatusCode::EnvelopeNoTo => "At least one To: recipient required",
            StatusCode::MasterMustTermPermanent => "Master must terminate, permanent",
            StatusCode::SystemError => "System error",
            StatusCode::InsufficientSpace => "Insufficient space",
            StatusCode::MasterShouldTurn => "Master should turn",
            StatusCode::ChecksumError => "Checksum error",
            StatusCode::SystemUnavailable => "System unavailable",
            StatusCode::BatchModeUnavailable => "Batch mode unavailable",
            StatusCode::AccountUnknown => "Account unknown",
            StatusCode::AccountInUse => "Account in use",
            StatusCode::ConnectionsBusy => "Connections busy",
            StatusCode::Timeout => "Timeout",
            StatusCode::TooManyChecksumErrors => "Too many checksum errors",
            StatusCode::MasterMustTermTemporary => "Master must terminate, temporary",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", *self as u16, self.message())
    }
}

/// Error type for every failure the PDU parser pipeline can surface.
///
/// Each variant corresponds to one MEP2 status code; `status()` recovers the
/// numeric code for the responder. Context strings describe the specific
/// violation for logging, they are not part of the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mep2Error {
    /// Request cannot be carried out in the current state (300)
    #[error("Unable to perform: {0}")]
    UnableToPerform(String),

    /// Framing violation: malformed line, bad checksum shape, unknown type (301)
    #[error("PDU syntax error: {0}")]
    Syntax(String),

    /// Out-of-sequence data, e.g. a line after the PDU completed (302)
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// Content-level violation inside an otherwise well-framed PDU (303)
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Envelope-level inconsistency such as a duplicate From: (310)
    #[error("At least one problem within envelope: {0}")]
    Envelope(String),

    /// Envelope or verify PDU carried no data at all (311)
    #[error("No envelope data received")]
    NoEnvelopeData,

    /// Envelope or verify PDU had no To: recipient (312)
    #[error("At least one To: recipient required")]
    ToRequired,

    /// Sender checksum parsed but disagrees with the running sum (403)
    #[error("Checksum error: wanted {wanted:04X}, actual {actual:04X}")]
    Checksum { wanted: u16, actual: u16 },
}

impl Mep2Error {
    /// The wire status code for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Mep2Error::UnableToPerform(_) => StatusCode::UnableToPerform,
            Mep2Error::Syntax(_) => StatusCode::PduSyntaxError,
            Mep2Error::Protocol(_) => StatusCode::ProtocolViolation,
            Mep2Error::MalformedData(_) => StatusCode::MalformedData,
            Mep2Error::Envelope(_) => StatusCode::EnvelopeProblem,
            Mep2Error::NoEnvelopeData => StatusCode::EnvelopeNoData,
            Mep2Error::ToRequired => StatusCode::EnvelopeNoTo,
            Mep2Error::Checksum { .. } => StatusCode::ChecksumError,
        }
    }

    /// The numeric wire code for this error.
    pub const fn code(&self) -> u16 {
        self.status() as u16
    }
}

/// Result alias used throughout the crate.
pub type Mep2Result<T> = std::result::Result<T, Mep2Error>;

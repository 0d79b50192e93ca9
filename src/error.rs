use crate::types::ObjectId;
use thiserror::Error;

/// Everything the reader can fail with.
///
/// Lexical and structural errors abort a parse. Resolution errors are
/// per-call and recoverable. Page-structure errors abort the page list but
/// leave the raw object graph usable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfError {
    #[error("lexical error at byte {offset}: {kind}")]
    Lexical { kind: LexicalErrorKind, offset: u64 },

    #[error("structural error: {kind}{}", object_suffix(.object))]
    Structural {
        kind: StructuralErrorKind,
        object: Option<ObjectId>,
    },

    #[error("unknown reference: {0} R")]
    UnknownReference(ObjectId),

    #[error("circular reference: {0} R")]
    CircularReference(ObjectId),

    #[error("page structure error: {0}")]
    PageStructure(String),
}

fn object_suffix(object: &Option<ObjectId>) -> String {
    match object {
        Some(id) => format!(" (object {})", id),
        None => String::new(),
    }
}

impl PdfError {
    pub(crate) fn lexical(kind: LexicalErrorKind, offset: u64) -> Self {
        PdfError::Lexical { kind, offset }
    }

    pub(crate) fn structural(kind: StructuralErrorKind) -> Self {
        PdfError::Structural { kind, object: None }
    }

    pub(crate) fn structural_at(kind: StructuralErrorKind, object: ObjectId) -> Self {
        PdfError::Structural {
            kind,
            object: Some(object),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalErrorKind {
    #[error("no %PDF- header found")]
    MissingHeader,

    #[error("invalid byte 0x{0:02x}")]
    InvalidByte(u8),

    #[error("unterminated literal string")]
    UnterminatedString,

    #[error("unterminated hex string")]
    UnterminatedHexString,

    #[error("stream without endstream sentinel")]
    MissingEndstream,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralErrorKind {
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid indirect object header")]
    InvalidObjectHeader,

    #[error("invalid indirect reference")]
    InvalidReference,

    #[error("dictionary key is not a name: {0}")]
    InvalidDictionaryKey(String),

    #[error("malformed xref section")]
    InvalidXrefSection,

    #[error("malformed xref entry")]
    InvalidXrefEntry,

    #[error("no trailer found")]
    MissingTrailer,

    #[error("trailer is missing required key /{0}")]
    MissingTrailerKey(&'static str),

    #[error("trailer is not a dictionary")]
    InvalidTrailer,

    #[error("nesting depth exceeds {0}")]
    DepthExceeded(usize),
}

pub type PdfResult<T> = Result<T, PdfError>;

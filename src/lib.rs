//! pdf-spine: an eager reader for the logical structure of PDF files.
//!
//! The crate turns a contiguous byte buffer into a navigable in-memory
//! document: a typed object graph, the cross-reference table, the trailer
//! chain and the page tree with inherited attributes. It offers:
//! - A byte-level tokenizer covering every PDF lexical form, including
//!   escape-heavy literal strings and raw binary stream payloads
//! - A file-structure parser tolerant of incremental-update files with
//!   stacked cross-reference sections and trailers
//! - On-demand reference resolution with shallow and deep modes, cycle
//!   detection and memoization
//! - Page records with resources, boxes and rotation walked up the
//!   inheritance chain
//!
//! Out of scope: content-stream interpretation, filters, encryption,
//! rendering and any writing support. Logging goes through
//! the `log` facade and is silent unless a consumer installs a sink.

/// Project-wide constants and limits.
pub mod constants;
/// The parsed document, trailers and page records.
pub mod document;
/// The error taxonomy.
pub mod error;
/// File-structure parsing and reference resolution.
pub mod parser;
/// The byte-level tokenizer.
pub mod tokenizer;
/// The PDF object model.
pub mod types;

pub use document::{
    Contents, ObjectTable, Page, PageTreeBuilder, PdfDocument, PdfVersion, Rect, Resources,
    Trailer,
};
pub use error::{LexicalErrorKind, PdfError, PdfResult, StructuralErrorKind};
pub use parser::resolver::{ObjectResolver, OnCycle, ResolveMode};
pub use parser::xref::{XRefEntry, XRefTable};
pub use parser::{ParseOptions, PdfParser};
pub use tokenizer::{tokenize, Token, Tokenizer};
pub use types::{
    IndirectObject, ObjectId, PdfArray, PdfDictionary, PdfName, PdfReference, PdfStream,
    PdfString, PdfValue, ValueKind,
};

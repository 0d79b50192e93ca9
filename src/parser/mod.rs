pub mod document_parser;
pub mod lexer;
pub mod object_parser;
pub mod resolver;
pub mod xref;

use crate::constants::limits;
use crate::document::PdfDocument;
use crate::error::PdfResult;
use crate::types::PdfValue;

/// Knobs for a parse run.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum nesting depth for arrays and dictionaries.
    pub max_depth: usize,
    /// Whether a direct `/Length` bounds stream payload scans. When off,
    /// every payload runs to the `endstream` sentinel.
    pub prefer_length: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: limits::MAX_NESTING_DEPTH,
            prefer_length: true,
        }
    }
}

/// Entry point for parsing whole documents and value fragments.
pub struct PdfParser {
    options: ParseOptions,
}

impl PdfParser {
    pub fn new() -> Self {
        PdfParser {
            options: ParseOptions::default(),
        }
    }

    /// Sets the maximum nesting depth for PDF structures.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Controls whether declared stream lengths bound the payload scan.
    /// Off means every stream is read by `endstream` sentinel scan.
    pub fn with_length_preference(mut self, prefer: bool) -> Self {
        self.options.prefer_length = prefer;
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses a whole PDF file from a byte buffer.
    pub fn parse_bytes(&self, data: &[u8]) -> PdfResult<PdfDocument> {
        document_parser::DocumentParser::new(data, self.options.clone()).parse()
    }

    /// Parses a single value from a fragment with no file header.
    pub fn parse_value(&self, input: &[u8]) -> PdfResult<PdfValue> {
        object_parser::ObjectParser::from_fragment(input, self.options.clone()).parse_value()
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

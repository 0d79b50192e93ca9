//! File-level structure: header, bodies, xref sections and trailers.
//!
//! The whole buffer is parsed eagerly, front to back. Incremental-update
//! files simply repeat the `body xref trailer` triple; every trailer is
//! recorded in file order and later definitions shadow earlier ones.

use crate::document::{ObjectTable, PdfDocument, PdfVersion, Trailer};
use crate::error::{PdfError, PdfResult, StructuralErrorKind};
use crate::parser::object_parser::ObjectParser;
use crate::parser::xref::{XRefEntry, XRefTable};
use crate::parser::ParseOptions;
use crate::tokenizer::{Token, Tokenizer};
use crate::types::ObjectId;
use log::{debug, warn};

pub struct DocumentParser<'a> {
    objects: ObjectParser<'a>,
}

impl<'a> DocumentParser<'a> {
    pub fn new(input: &'a [u8], options: ParseOptions) -> Self {
        Self::from_tokenizer(Tokenizer::new(input), options)
    }

    /// Parses from an existing token cursor, e.g. one whose position has
    /// already been moved.
    pub fn from_tokenizer(tokens: Tokenizer<'a>, options: ParseOptions) -> Self {
        DocumentParser {
            objects: ObjectParser::new(tokens, options),
        }
    }

    pub fn parse(mut self) -> PdfResult<PdfDocument> {
        let version = self.parse_version()?;
        let mut table = ObjectTable::new();
        let mut xref = XRefTable::new();
        let mut trailers: Vec<Trailer> = Vec::new();

        loop {
            let token = self.objects.next_token()?;
            match token {
                Token::Eof => break,
                Token::Integer(_) => {
                    self.objects.push_front(token);
                    let object = self.objects.parse_indirect_object()?;
                    debug!("parsed object {}", object.id);
                    table.insert(object);
                }
                Token::Keyword(ref word) if word == "xref" => {
                    self.parse_xref_section(&mut xref)?;
                }
                Token::Keyword(ref word) if word == "trailer" => {
                    trailers.push(self.parse_trailer()?);
                }
                Token::Keyword(ref word) if word == "startxref" => {
                    // Reachable only when no trailer keyword preceded it;
                    // consume the offset and keep going.
                    let offset = self.expect_integer()?;
                    warn!("startxref {} with no preceding trailer", offset);
                }
                other => {
                    return Err(PdfError::structural(StructuralErrorKind::UnexpectedToken(
                        other.describe(),
                    )));
                }
            }
        }

        if trailers.is_empty() {
            return Err(PdfError::structural(StructuralErrorKind::MissingTrailer));
        }
        if !self.objects.eof_marker_seen() {
            warn!("file carries no %%EOF marker");
        }

        debug!(
            "parsed {} objects, {} xref entries, {} trailer(s)",
            table.len(),
            xref.len(),
            trailers.len()
        );
        Ok(PdfDocument::new(version, table, xref, trailers))
    }

    fn parse_version(&mut self) -> PdfResult<PdfVersion> {
        match self.objects.next_token()? {
            Token::Header(version) => Ok(PdfVersion::parse(&version)),
            other => Err(PdfError::structural(StructuralErrorKind::UnexpectedToken(
                other.describe(),
            ))),
        }
    }

    fn expect_integer(&mut self) -> PdfResult<i64> {
        match self.objects.next_token()? {
            Token::Integer(value) => Ok(value),
            other => Err(PdfError::structural(StructuralErrorKind::UnexpectedToken(
                other.describe(),
            ))),
        }
    }

    /// One or more subsections, each `start count` followed by `count`
    /// rows of `offset generation flag`.
    fn parse_xref_section(&mut self, xref: &mut XRefTable) -> PdfResult<()> {
        let mut subsections = 0usize;

        while matches!(self.objects.peek(0)?, Token::Integer(_)) {
            let start = self.expect_xref_number()?;
            let count = self.expect_xref_number()?;
            for i in 0..count {
                let object_number = start + i;
                let entry = self
                    .parse_xref_entry()
                    .map_err(|_| {
                        PdfError::structural_at(
                            StructuralErrorKind::InvalidXrefEntry,
                            ObjectId::new(object_number, 0),
                        )
                    })?;
                xref.insert(object_number, entry);
            }
            subsections += 1;
        }

        if subsections == 0 {
            return Err(PdfError::structural(StructuralErrorKind::InvalidXrefSection));
        }
        Ok(())
    }

    fn expect_xref_number(&mut self) -> PdfResult<u32> {
        match self.objects.next_token()? {
            Token::Integer(value) => u32::try_from(value)
                .map_err(|_| PdfError::structural(StructuralErrorKind::InvalidXrefSection)),
            _ => Err(PdfError::structural(StructuralErrorKind::InvalidXrefSection)),
        }
    }

    fn parse_xref_entry(&mut self) -> PdfResult<XRefEntry> {
        let Token::Integer(offset) = self.objects.next_token()? else {
            return Err(PdfError::structural(StructuralErrorKind::InvalidXrefEntry));
        };
        let Token::Integer(generation) = self.objects.next_token()? else {
            return Err(PdfError::structural(StructuralErrorKind::InvalidXrefEntry));
        };
        let in_use = match self.objects.next_token()? {
            Token::Keyword(ref flag) if flag == "n" => true,
            Token::Keyword(ref flag) if flag == "f" => false,
            _ => return Err(PdfError::structural(StructuralErrorKind::InvalidXrefEntry)),
        };
        let offset = u64::try_from(offset)
            .map_err(|_| PdfError::structural(StructuralErrorKind::InvalidXrefEntry))?;
        let generation = u16::try_from(generation)
            .map_err(|_| PdfError::structural(StructuralErrorKind::InvalidXrefEntry))?;
        Ok(XRefEntry {
            offset,
            generation,
            in_use,
        })
    }

    /// `trailer dict startxref int`. The offset is retained for
    /// diagnostics; the eager parse never seeks to it.
    fn parse_trailer(&mut self) -> PdfResult<Trailer> {
        let value = self.objects.parse_value()?;
        let Some(dict) = value.as_dict() else {
            return Err(PdfError::structural(StructuralErrorKind::InvalidTrailer));
        };
        let dict = dict.clone();

        let startxref = match self.objects.next_token()? {
            Token::Keyword(ref word) if word == "startxref" => {
                let offset = self.expect_integer()?;
                u64::try_from(offset).ok()
            }
            other => {
                warn!("trailer without startxref offset");
                self.objects.push_front(other);
                None
            }
        };

        Trailer::from_dict(dict, startxref)
    }
}

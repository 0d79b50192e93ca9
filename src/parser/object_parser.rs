//! Token-level recursive descent for PDF values.
//!
//! One value per call, with a small pushback queue for the integer
//! lookahead: the window `k g R` collapses to a reference, `k g obj`
//! opens an indirect object, and in any other context an integer stands
//! for itself.

use crate::error::{PdfError, PdfResult, StructuralErrorKind};
use crate::parser::ParseOptions;
use crate::tokenizer::{Token, Tokenizer};
use crate::types::{
    IndirectObject, ObjectId, PdfArray, PdfDictionary, PdfName, PdfReference, PdfStream,
    PdfString, PdfValue,
};
use std::collections::VecDeque;

pub struct ObjectParser<'a> {
    tokens: Tokenizer<'a>,
    lookahead: VecDeque<Token>,
    options: ParseOptions,
}

impl<'a> ObjectParser<'a> {
    pub fn new(tokens: Tokenizer<'a>, options: ParseOptions) -> Self {
        ObjectParser {
            tokens,
            lookahead: VecDeque::new(),
            options,
        }
    }

    /// Parses standalone value fragments with no file header.
    pub fn from_fragment(input: &'a [u8], options: ParseOptions) -> Self {
        Self::new(Tokenizer::fragment(input), options)
    }

    pub(crate) fn next_token(&mut self) -> PdfResult<Token> {
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => self.tokens.next_token(),
        }
    }

    pub(crate) fn peek(&mut self, n: usize) -> PdfResult<&Token> {
        while self.lookahead.len() <= n {
            let token = self.tokens.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(&self.lookahead[n])
    }

    pub(crate) fn push_front(&mut self, token: Token) {
        self.lookahead.push_front(token);
    }

    pub fn position(&self) -> u64 {
        self.tokens.position()
    }

    pub(crate) fn eof_marker_seen(&self) -> bool {
        self.tokens.eof_marker_seen()
    }

    pub fn parse_value(&mut self) -> PdfResult<PdfValue> {
        self.parse_value_at(0)
    }

    fn parse_value_at(&mut self, depth: usize) -> PdfResult<PdfValue> {
        if depth > self.options.max_depth {
            return Err(PdfError::structural(StructuralErrorKind::DepthExceeded(
                self.options.max_depth,
            )));
        }

        match self.next_token()? {
            Token::Null => Ok(PdfValue::Null),
            Token::Boolean(b) => Ok(PdfValue::Boolean(b)),
            Token::Real(r) => Ok(PdfValue::Real(r)),
            Token::Integer(i) => self.parse_integer_or_reference(i),
            Token::LiteralString(bytes) => Ok(PdfValue::String(PdfString::new_literal(bytes))),
            Token::HexString(bytes) => Ok(PdfValue::String(PdfString::new_hex(bytes))),
            Token::Name(name) => Ok(PdfValue::Name(PdfName::new(name))),
            Token::ArrayStart => self.parse_array(depth),
            Token::DictStart => self.parse_dictionary(depth),
            Token::Eof => Err(PdfError::structural(StructuralErrorKind::UnexpectedEof)),
            other => Err(PdfError::structural(StructuralErrorKind::UnexpectedToken(
                other.describe(),
            ))),
        }
    }

    /// Only peeks the second slot when the first is an integer, so a
    /// following `stream` keyword is never lexed ahead of its length hint.
    fn parse_integer_or_reference(&mut self, value: i64) -> PdfResult<PdfValue> {
        if matches!(self.peek(0)?, Token::Integer(_))
            && matches!(self.peek(1)?, Token::IndirectRefMarker)
        {
            let Some(Token::Integer(generation)) = self.lookahead.pop_front() else {
                unreachable!()
            };
            self.lookahead.pop_front();
            let number = u32::try_from(value)
                .map_err(|_| PdfError::structural(StructuralErrorKind::InvalidReference))?;
            let generation = u16::try_from(generation)
                .map_err(|_| PdfError::structural(StructuralErrorKind::InvalidReference))?;
            return Ok(PdfValue::Reference(PdfReference::new(number, generation)));
        }
        Ok(PdfValue::Integer(value))
    }

    fn parse_array(&mut self, depth: usize) -> PdfResult<PdfValue> {
        let mut array = PdfArray::new();
        loop {
            match self.peek(0)? {
                Token::ArrayEnd => {
                    self.next_token()?;
                    break;
                }
                Token::Eof => {
                    return Err(PdfError::structural(StructuralErrorKind::UnexpectedEof))
                }
                _ => array.push(self.parse_value_at(depth + 1)?),
            }
        }
        Ok(PdfValue::Array(array))
    }

    fn parse_dictionary(&mut self, depth: usize) -> PdfResult<PdfValue> {
        let mut dict = PdfDictionary::new();
        loop {
            match self.next_token()? {
                Token::DictEnd => break,
                Token::Name(key) => {
                    let value = self.parse_value_at(depth + 1)?;
                    dict.insert(key, value);
                }
                Token::Eof => {
                    return Err(PdfError::structural(StructuralErrorKind::UnexpectedEof))
                }
                other => {
                    return Err(PdfError::structural(
                        StructuralErrorKind::InvalidDictionaryKey(other.describe()),
                    ))
                }
            }
        }
        self.finish_dictionary_or_stream(dict)
    }

    /// After `>>`: a following `stream` keyword turns the dictionary into
    /// a stream object. A direct, sane `/Length` bounds the payload scan;
    /// anything else (absent, indirect, negative) leaves the tokenizer on
    /// its `endstream` sentinel scan.
    fn finish_dictionary_or_stream(&mut self, dict: PdfDictionary) -> PdfResult<PdfValue> {
        if self.lookahead.is_empty() && self.options.prefer_length {
            let hint = dict
                .get("Length")
                .and_then(PdfValue::as_integer)
                .and_then(|len| usize::try_from(len).ok());
            self.tokens.hint_stream_length(hint);
        }
        let is_stream = matches!(self.peek(0)?, Token::Stream(_));
        self.tokens.hint_stream_length(None);

        if is_stream {
            let Some(Token::Stream(data)) = self.lookahead.pop_front() else {
                unreachable!()
            };
            Ok(PdfValue::Stream(PdfStream::new(dict, data)))
        } else {
            Ok(PdfValue::Dictionary(dict))
        }
    }

    /// `N G obj value [endobj]`. Some producers drop the `endobj`.
    pub fn parse_indirect_object(&mut self) -> PdfResult<IndirectObject> {
        let id = self.parse_object_header()?;
        let value = self.parse_value()?;
        if matches!(self.peek(0)?, Token::ObjEnd) {
            self.next_token()?;
        }
        Ok(IndirectObject::new(id, value))
    }

    fn parse_object_header(&mut self) -> PdfResult<ObjectId> {
        let Token::Integer(number) = self.next_token()? else {
            return Err(PdfError::structural(StructuralErrorKind::InvalidObjectHeader));
        };
        let Token::Integer(generation) = self.next_token()? else {
            return Err(PdfError::structural(StructuralErrorKind::InvalidObjectHeader));
        };
        if !matches!(self.next_token()?, Token::ObjStart) {
            return Err(PdfError::structural(StructuralErrorKind::InvalidObjectHeader));
        }
        let number = u32::try_from(number)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| PdfError::structural(StructuralErrorKind::InvalidObjectHeader))?;
        let generation = u16::try_from(generation)
            .map_err(|_| PdfError::structural(StructuralErrorKind::InvalidObjectHeader))?;
        Ok(ObjectId::new(number, generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> PdfResult<PdfValue> {
        ObjectParser::from_fragment(input, ParseOptions::default()).parse_value()
    }

    #[test]
    fn test_primitives() {
        assert_eq!(parse(b"null").unwrap(), PdfValue::Null);
        assert_eq!(parse(b"true").unwrap(), PdfValue::Boolean(true));
        assert_eq!(parse(b"42").unwrap(), PdfValue::Integer(42));
        assert_eq!(parse(b"-1.5").unwrap(), PdfValue::Real(-1.5));
        assert_eq!(
            parse(b"/Name").unwrap(),
            PdfValue::Name(PdfName::new("Name"))
        );
    }

    #[test]
    fn test_reference_window() {
        assert_eq!(
            parse(b"5 0 R").unwrap(),
            PdfValue::Reference(PdfReference::new(5, 0))
        );
        // Two integers without the marker stay integers.
        let value = parse(b"[5 0 7]").unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array[0], PdfValue::Integer(5));
    }

    #[test]
    fn test_mixed_array() {
        let value = parse(b"[1 /Name (str) true 5 0 R]").unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 5);
        assert_eq!(
            array[4],
            PdfValue::Reference(PdfReference::new(5, 0))
        );
    }

    #[test]
    fn test_dictionary_duplicate_key_last_wins() {
        let value = parse(b"<< /K 1 /K 2 >>").unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("K"), Some(&PdfValue::Integer(2)));
    }

    #[test]
    fn test_stream_with_length() {
        let value = parse(b"<< /Length 5 >>\nstream\nhello\nendstream").unwrap();
        let stream = value.as_stream().unwrap();
        assert_eq!(stream.data(), b"hello");
        assert_eq!(stream.declared_length(), Some(5));
    }

    #[test]
    fn test_stream_indirect_length_falls_back_to_scan() {
        let value = parse(b"<< /Length 9 0 R >>\nstream\nhello\nendstream").unwrap();
        let stream = value.as_stream().unwrap();
        assert_eq!(stream.data(), b"hello");
        assert_eq!(stream.declared_length(), None);
    }

    #[test]
    fn test_depth_limit() {
        let mut input = Vec::new();
        input.extend(std::iter::repeat(b'[').take(300));
        input.extend(std::iter::repeat(b']').take(300));
        let err = parse(&input).unwrap_err();
        assert!(matches!(
            err,
            PdfError::Structural {
                kind: StructuralErrorKind::DepthExceeded(_),
                ..
            }
        ));
    }

    #[test]
    fn test_indirect_object() {
        let mut parser =
            ObjectParser::from_fragment(b"7 0 obj << /A 1 >> endobj", ParseOptions::default());
        let object = parser.parse_indirect_object().unwrap();
        assert_eq!(object.id, ObjectId::new(7, 0));
        assert!(object.value.as_dict().is_some());
    }

    #[test]
    fn test_object_number_zero_rejected() {
        let mut parser =
            ObjectParser::from_fragment(b"0 0 obj null endobj", ParseOptions::default());
        assert!(parser.parse_indirect_object().is_err());
    }
}

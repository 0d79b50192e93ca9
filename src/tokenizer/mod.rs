//! Byte-level tokenizer.
//!
//! A cursor over a contiguous byte buffer that yields one typed token per
//! call. The individual lexeme recognizers live in [`crate::parser::lexer`];
//! this module adds position tracking, header detection, comment skipping
//! and stream payload extraction on top of them.

use crate::constants::markers;
use crate::error::{LexicalErrorKind, PdfError, PdfResult};
use crate::parser::lexer::{self, Number};
use log::{debug, warn};

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// The `%PDF-M.N` header, carrying `"M.N"`.
    Header(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Null,
    /// A name, without the leading slash.
    Name(String),
    LiteralString(Vec<u8>),
    HexString(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
    /// The `obj` keyword.
    ObjStart,
    /// The `endobj` keyword.
    ObjEnd,
    /// The literal `R`.
    IndirectRefMarker,
    /// A raw stream payload, cursor positioned past `endstream`.
    Stream(Vec<u8>),
    /// Any other bare identifier (`xref`, `trailer`, `startxref`, ...).
    Keyword(String),
    Eof,
}

impl Token {
    /// Short rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Header(v) => format!("header {}", v),
            Token::Integer(i) => format!("integer {}", i),
            Token::Real(r) => format!("real {}", r),
            Token::Boolean(b) => format!("boolean {}", b),
            Token::Null => "null".to_string(),
            Token::Name(n) => format!("name /{}", n),
            Token::LiteralString(_) => "literal string".to_string(),
            Token::HexString(_) => "hex string".to_string(),
            Token::ArrayStart => "[".to_string(),
            Token::ArrayEnd => "]".to_string(),
            Token::DictStart => "<<".to_string(),
            Token::DictEnd => ">>".to_string(),
            Token::ObjStart => "obj".to_string(),
            Token::ObjEnd => "endobj".to_string(),
            Token::IndirectRefMarker => "R".to_string(),
            Token::Stream(_) => "stream".to_string(),
            Token::Keyword(k) => format!("keyword {}", k),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// Cursor over a byte buffer.
///
/// The first call to [`next_token`](Tokenizer::next_token) scans forward
/// for the `%PDF-` header (some producers emit a binary preamble before
/// it) and yields [`Token::Header`]. Every later call skips whitespace and
/// comments, then lexes one token.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    header_pending: bool,
    stream_length_hint: Option<usize>,
    eof_marker_seen: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            input,
            pos: 0,
            header_pending: true,
            stream_length_hint: None,
            eof_marker_seen: false,
        }
    }

    /// A tokenizer over a buffer that is not a whole file and carries no
    /// `%PDF-` header, e.g. a single object in isolation.
    pub fn fragment(input: &'a [u8]) -> Self {
        Tokenizer {
            input,
            pos: 0,
            header_pending: false,
            stream_length_hint: None,
            eof_marker_seen: false,
        }
    }

    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    /// Moves the cursor. Random access skips header detection.
    pub fn set_position(&mut self, offset: u64) {
        self.pos = (offset as usize).min(self.input.len());
        self.header_pending = false;
        self.stream_length_hint = None;
    }

    /// Whether a `%%EOF` marker has been passed so far.
    pub fn eof_marker_seen(&self) -> bool {
        self.eof_marker_seen
    }

    /// Bounds the next stream payload scan. Set by the structure parser
    /// from a direct, sane `/Length`; the hint is dropped if the declared
    /// length does not land on an `endstream` sentinel.
    pub(crate) fn hint_stream_length(&mut self, hint: Option<usize>) {
        self.stream_length_hint = hint;
    }

    pub fn next_token(&mut self) -> PdfResult<Token> {
        if self.header_pending {
            self.header_pending = false;
            return self.read_header();
        }

        self.skip_trivia();

        let Some(&byte) = self.input.get(self.pos) else {
            return Ok(Token::Eof);
        };

        match byte {
            b'[' => {
                self.pos += 1;
                Ok(Token::ArrayStart)
            }
            b']' => {
                self.pos += 1;
                Ok(Token::ArrayEnd)
            }
            b'<' => {
                if self.input.get(self.pos + 1) == Some(&b'<') {
                    self.pos += 2;
                    Ok(Token::DictStart)
                } else {
                    self.read_hex_string()
                }
            }
            b'>' => {
                if self.input.get(self.pos + 1) == Some(&b'>') {
                    self.pos += 2;
                    Ok(Token::DictEnd)
                } else {
                    Err(PdfError::lexical(
                        LexicalErrorKind::InvalidByte(b'>'),
                        self.pos as u64,
                    ))
                }
            }
            b'(' => self.read_literal_string(),
            b'/' => self.read_name(),
            b')' | b'{' | b'}' => Err(PdfError::lexical(
                LexicalErrorKind::InvalidByte(byte),
                self.pos as u64,
            )),
            _ => self.read_regular(),
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            while self
                .input
                .get(self.pos)
                .copied()
                .map_or(false, lexer::is_whitespace)
            {
                self.pos += 1;
            }
            if self.input.get(self.pos) == Some(&b'%') {
                if self.input[self.pos..].starts_with(markers::EOF) {
                    self.eof_marker_seen = true;
                }
                let remaining = &self.input[self.pos..];
                if let Ok((rest, _)) = lexer::comment(remaining) {
                    self.pos = self.input.len() - rest.len();
                } else {
                    // A lone '%' at end of input.
                    self.pos = self.input.len();
                }
                continue;
            }
            break;
        }
    }

    fn read_header(&mut self) -> PdfResult<Token> {
        let start = self.pos;
        let Some(idx) = find_subsequence(&self.input[start..], markers::HEADER) else {
            return Err(PdfError::lexical(
                LexicalErrorKind::MissingHeader,
                start as u64,
            ));
        };
        if idx > 0 {
            debug!("skipped {} preamble bytes before %PDF- header", idx);
        }
        let header_pos = start + idx;
        match lexer::pdf_header(&self.input[header_pos..]) {
            Ok((rest, (major, minor))) => {
                self.pos = self.input.len() - rest.len();
                Ok(Token::Header(format!("{}.{}", major, minor)))
            }
            Err(_) => Err(PdfError::lexical(
                LexicalErrorKind::MissingHeader,
                header_pos as u64,
            )),
        }
    }

    fn read_literal_string(&mut self) -> PdfResult<Token> {
        let start = self.pos;
        match lexer::literal_string(&self.input[self.pos..]) {
            Ok((rest, bytes)) => {
                self.pos = self.input.len() - rest.len();
                Ok(Token::LiteralString(bytes))
            }
            Err(_) => Err(PdfError::lexical(
                LexicalErrorKind::UnterminatedString,
                start as u64,
            )),
        }
    }

    fn read_hex_string(&mut self) -> PdfResult<Token> {
        let start = self.pos;
        match lexer::hex_string(&self.input[self.pos..]) {
            Ok((rest, bytes)) => {
                self.pos = self.input.len() - rest.len();
                Ok(Token::HexString(bytes))
            }
            Err(nom::Err::Failure(e)) if e.code == nom::error::ErrorKind::HexDigit => {
                let offset = self.input.len() - e.input.len();
                Err(PdfError::lexical(
                    LexicalErrorKind::InvalidByte(e.input[0]),
                    offset as u64,
                ))
            }
            Err(_) => Err(PdfError::lexical(
                LexicalErrorKind::UnterminatedHexString,
                start as u64,
            )),
        }
    }

    fn read_name(&mut self) -> PdfResult<Token> {
        match lexer::name(&self.input[self.pos..]) {
            Ok((rest, name)) => {
                self.pos = self.input.len() - rest.len();
                Ok(Token::Name(name))
            }
            Err(_) => Err(PdfError::lexical(
                LexicalErrorKind::InvalidByte(b'/'),
                self.pos as u64,
            )),
        }
    }

    fn read_regular(&mut self) -> PdfResult<Token> {
        let start = self.pos;
        let run = match lexer::regular_chars(&self.input[self.pos..]) {
            Ok((rest, run)) => {
                self.pos = self.input.len() - rest.len();
                run
            }
            Err(_) => {
                return Err(PdfError::lexical(
                    LexicalErrorKind::InvalidByte(self.input[start]),
                    start as u64,
                ))
            }
        };

        if let Ok((_, num)) = nom::combinator::all_consuming(lexer::number)(run) {
            return Ok(match num {
                Number::Integer(i) => Token::Integer(i),
                Number::Real(r) => Token::Real(r),
            });
        }

        match run {
            b"true" => Ok(Token::Boolean(true)),
            b"false" => Ok(Token::Boolean(false)),
            b"null" => Ok(Token::Null),
            b"obj" => Ok(Token::ObjStart),
            b"endobj" => Ok(Token::ObjEnd),
            b"R" => Ok(Token::IndirectRefMarker),
            b"stream" => self.read_stream_payload(),
            other => Ok(Token::Keyword(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    /// Reads the payload after a `stream` keyword and leaves the cursor
    /// past `endstream`.
    ///
    /// A length hint from the dictionary is preferred; it is trusted only
    /// when the byte after the declared payload is (optional whitespace
    /// then) the `endstream` sentinel. Otherwise the payload runs to the
    /// first `endstream`, with the separating end-of-line not counted as
    /// data.
    fn read_stream_payload(&mut self) -> PdfResult<Token> {
        match self.input.get(self.pos) {
            Some(&b'\r') => {
                self.pos += 1;
                if self.input.get(self.pos) == Some(&b'\n') {
                    self.pos += 1;
                }
            }
            Some(&b'\n') => {
                self.pos += 1;
            }
            _ => {}
        }
        let start = self.pos;

        if let Some(len) = self.stream_length_hint.take() {
            match start.checked_add(len) {
                Some(end) if end <= self.input.len() => {
                    if let Some(sentinel) = self.endstream_at(end) {
                        let data = self.input[start..end].to_vec();
                        self.pos = sentinel + markers::ENDSTREAM.len();
                        return Ok(Token::Stream(data));
                    }
                    warn!(
                        "declared stream length {} does not end at an endstream sentinel, rescanning",
                        len
                    );
                }
                _ => {
                    warn!("declared stream length {} exceeds the buffer, rescanning", len);
                }
            }
        }

        let Some(idx) = find_subsequence(&self.input[start..], markers::ENDSTREAM) else {
            return Err(PdfError::lexical(
                LexicalErrorKind::MissingEndstream,
                start as u64,
            ));
        };
        let mut end = start + idx;
        if end > start && self.input[end - 1] == b'\n' {
            end -= 1;
            if end > start && self.input[end - 1] == b'\r' {
                end -= 1;
            }
        } else if end > start && self.input[end - 1] == b'\r' {
            end -= 1;
        }
        let data = self.input[start..end].to_vec();
        self.pos = start + idx + markers::ENDSTREAM.len();
        Ok(Token::Stream(data))
    }

    /// Offset of the `endstream` sentinel expected right after a stream
    /// payload ending at `end`, allowing intervening whitespace.
    fn endstream_at(&self, end: usize) -> Option<usize> {
        let mut at = end;
        while self
            .input
            .get(at)
            .copied()
            .map_or(false, lexer::is_whitespace)
        {
            at += 1;
        }
        if self.input[at..].starts_with(markers::ENDSTREAM) {
            Some(at)
        } else {
            None
        }
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Tokenizes a whole buffer. The iterator yields the header first, then
/// every token up to and including a single [`Token::Eof`], and stops after
/// the first error.
pub fn tokenize(buffer: &[u8]) -> Tokens<'_> {
    Tokens {
        tokenizer: Tokenizer::new(buffer),
        done: false,
    }
}

pub struct Tokens<'a> {
    tokenizer: Tokenizer<'a>,
    done: bool,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = PdfResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.tokenizer.next_token() {
            Ok(Token::Eof) => {
                self.done = true;
                Some(Ok(Token::Eof))
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

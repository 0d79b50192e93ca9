//! Lexeme recognizers for the PDF character set.
//!
//! Every recognizer is a nom combinator over raw bytes. The tokenizer
//! drives these over the buffer; nothing here tracks positions or emits
//! tokens.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize, rest},
    sequence::{pair, preceded, tuple},
    IResult,
};

/// The six PDF whitespace bytes.
pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b'\0' | b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

pub fn is_delimiter(c: u8) -> bool {
    matches!(
        c,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

pub fn is_regular_char(c: u8) -> bool {
    !is_whitespace(c) && !is_delimiter(c)
}

/// A maximal run of regular characters: the raw material of keywords and
/// numbers.
pub fn regular_chars(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(is_regular_char)(input)
}

/// A `%` comment, excluding the end-of-line.
pub fn comment(input: &[u8]) -> IResult<&[u8], &[u8]> {
    preceded(
        char('%'),
        alt((take_until("\n"), take_until("\r"), rest)),
    )(input)
}

/// The `%PDF-M.N` header.
pub fn pdf_header(input: &[u8]) -> IResult<&[u8], (u8, u8)> {
    let (input, _) = tag(b"%PDF-")(input)?;
    let (input, major) = map_res(digit1, parse_decimal::<u8>)(input)?;
    let (input, _) = char('.')(input)?;
    let (input, minor) = map_res(digit1, parse_decimal::<u8>)(input)?;
    Ok((input, (major, minor)))
}

fn parse_decimal<T: std::str::FromStr>(s: &[u8]) -> Result<T, ()> {
    std::str::from_utf8(s).map_err(|_| ())?.parse().map_err(|_| ())
}

/// A numeric literal. The presence of a decimal point selects `Real`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

pub fn integer(input: &[u8]) -> IResult<&[u8], i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), parse_decimal)(input)
}

pub fn real(input: &[u8]) -> IResult<&[u8], f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((
                recognize(tuple((digit1, char('.'), opt(digit1)))),
                recognize(tuple((opt(digit1), char('.'), digit1))),
            )),
        ))),
        parse_decimal,
    )(input)
}

/// `real` before `integer` so the digits before a decimal point are not
/// claimed as a standalone integer. A digit run too large for `i64` falls
/// through to `f64`.
pub fn number(input: &[u8]) -> IResult<&[u8], Number> {
    alt((
        map(real, Number::Real),
        map(integer, Number::Integer),
        map(
            map_res(recognize(pair(opt(one_of("+-")), digit1)), parse_decimal),
            Number::Real,
        ),
    ))(input)
}

/// A name object. The leading slash is consumed, not returned; `#xx`
/// escapes decode to the byte with that hex value. A `#` not followed by
/// two hex digits stays literal.
pub fn name(input: &[u8]) -> IResult<&[u8], String> {
    preceded(char('/'), map(take_while(is_regular_char), decode_name))(input)
}

fn decode_name(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len());
    let mut iter = bytes.iter().enumerate();

    while let Some((i, &c)) = iter.next() {
        if c == b'#' {
            let pair = (bytes.get(i + 1), bytes.get(i + 2));
            if let (Some(&h), Some(&l)) = pair {
                if h.is_ascii_hexdigit() && l.is_ascii_hexdigit() {
                    let value = (hex_value(h) << 4) | hex_value(l);
                    result.push(value as char);
                    iter.next();
                    iter.next();
                    continue;
                }
            }
            result.push('#');
        } else {
            result.push(c as char);
        }
    }

    result
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

/// A literal string, balanced-paren form.
///
/// The outermost parentheses are consumed. Parenthesis balance is honored
/// before escapes: `(a(b\)c))` keeps the inner pair as payload bytes.
/// Escapes decode per the string escape table; an escaped end-of-line is a
/// line continuation and produces nothing; `\ddd` is one to three octal
/// digits taken mod 256; any other escaped byte is emitted as itself.
/// Malformed escapes never fail, only an unbalanced string does.
pub fn literal_string(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    if input.first() != Some(&b'(') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut out = Vec::new();
    let mut depth = 1usize;
    let mut i = 1usize;

    while i < input.len() {
        match input[i] {
            b'\\' => {
                i += 1;
                let Some(&escaped) = input.get(i) else { break };
                match escaped {
                    b'n' => {
                        out.push(b'\n');
                        i += 1;
                    }
                    b'r' => {
                        out.push(b'\r');
                        i += 1;
                    }
                    b't' => {
                        out.push(b'\t');
                        i += 1;
                    }
                    b'b' => {
                        out.push(0x08);
                        i += 1;
                    }
                    b'f' => {
                        out.push(0x0C);
                        i += 1;
                    }
                    b'(' | b')' | b'\\' => {
                        out.push(escaped);
                        i += 1;
                    }
                    b'\r' => {
                        i += 1;
                        if input.get(i) == Some(&b'\n') {
                            i += 1;
                        }
                    }
                    b'\n' => {
                        i += 1;
                    }
                    b'0'..=b'7' => {
                        let mut value = 0u16;
                        let mut digits = 0;
                        while digits < 3 {
                            match input.get(i) {
                                Some(&d @ b'0'..=b'7') => {
                                    value = value * 8 + u16::from(d - b'0');
                                    i += 1;
                                    digits += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push((value % 256) as u8);
                    }
                    other => {
                        out.push(other);
                        i += 1;
                    }
                }
            }
            b'(' => {
                depth += 1;
                out.push(b'(');
                i += 1;
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[i + 1..], out));
                }
                out.push(b')');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::TakeUntil,
    )))
}

/// A hex string. Interior whitespace is skipped; an odd number of digits
/// is padded with a trailing `0` before conversion. A byte that is neither
/// a hex digit, whitespace nor `>` fails with `HexDigit` positioned at the
/// offending byte; a missing `>` fails with `TakeUntil`.
pub fn hex_string(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    if input.first() != Some(&b'<') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut digits = Vec::new();
    let mut i = 1usize;

    while i < input.len() {
        let b = input[i];
        if b == b'>' {
            let mut out = Vec::with_capacity(digits.len() / 2 + 1);
            for chunk in digits.chunks(2) {
                let hi = hex_value(chunk[0]);
                let lo = if chunk.len() == 2 { hex_value(chunk[1]) } else { 0 };
                out.push((hi << 4) | lo);
            }
            return Ok((&input[i + 1..], out));
        } else if is_whitespace(b) {
            i += 1;
        } else if b.is_ascii_hexdigit() {
            digits.push(b);
            i += 1;
        } else {
            return Err(nom::Err::Failure(nom::error::Error::new(
                &input[i..],
                nom::error::ErrorKind::HexDigit,
            )));
        }
    }

    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::TakeUntil,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_dichotomy() {
        assert_eq!(number(b"42 ").unwrap().1, Number::Integer(42));
        assert_eq!(number(b"+1 ").unwrap().1, Number::Integer(1));
        assert_eq!(number(b"4. ").unwrap().1, Number::Real(4.0));
        assert_eq!(number(b"-.5 ").unwrap().1, Number::Real(-0.5));
        assert_eq!(number(b"3.14 ").unwrap().1, Number::Real(3.14));
    }

    #[test]
    fn test_name_hex_escape() {
        let (_, n) = name(b"/A#20B ").unwrap();
        assert_eq!(n, "A B");
        let (_, n) = name(b"/Lime#20Green ").unwrap();
        assert_eq!(n, "Lime Green");
        // Bad escape degrades to a literal '#'.
        let (_, n) = name(b"/A#zz ").unwrap();
        assert_eq!(n, "A#zz");
    }

    #[test]
    fn test_literal_string_balance_before_escape() {
        let (rest, s) = literal_string(b"(a(b\\)c)\\n)x").unwrap();
        assert_eq!(s, b"a(b)c)\n");
        assert_eq!(rest, b"x");
    }

    #[test]
    fn test_literal_string_octal_mod_256() {
        let (_, s) = literal_string(b"(\\053)").unwrap();
        assert_eq!(s, b"+");
        let (_, s) = literal_string(b"(\\53)").unwrap();
        assert_eq!(s, b"+");
        // 0o453 = 299; 299 mod 256 = 43 = '+'
        let (_, s) = literal_string(b"(\\453)").unwrap();
        assert_eq!(s, b"+");
    }

    #[test]
    fn test_literal_string_line_continuation() {
        let (_, s) = literal_string(b"(ab\\\r\ncd)").unwrap();
        assert_eq!(s, b"abcd");
    }

    #[test]
    fn test_hex_string_odd_padding() {
        let (_, a) = hex_string(b"<ABC>").unwrap();
        let (_, b) = hex_string(b"<ABC0>").unwrap();
        assert_eq!(a, b);
        let (_, ws) = hex_string(b"<41 4 2>").unwrap();
        assert_eq!(ws, b"AB");
    }

    #[test]
    fn test_header() {
        let (_, (major, minor)) = pdf_header(b"%PDF-1.7\n").unwrap();
        assert_eq!((major, minor), (1, 7));
    }
}

//! Reader: source text to `Value` trees.
//!
//! The grammar is tiny: integers, decimals, strings with C-style escapes,
//! symbols over a fixed character set, `( )` S-expressions and `{ }`
//! Q-expressions, with `;` line comments. Decimals require digits on both
//! sides of the point, so `1.` and `.5` are not numbers.
//!
//! An integer literal that does not fit in `i64` still *parses*; it reads
//! as an error value, so overflow surfaces through the normal
//! errors-as-values channel instead of aborting the read.

use nom::{
    IResult, Needed, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, multispace1},
    combinator::{all_consuming, cut, opt, recognize},
    error::ErrorKind,
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};

use crate::ast::Value;
use crate::{LispError, ParseError, ParseErrorKind};

/// Non-alphanumeric characters allowed in symbols
const SYMBOL_SPECIAL_CHARS: &str = "+-*/\\=<>!&%^|_";

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || SYMBOL_SPECIAL_CHARS.contains(c)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char(';'), take_while(|c| c != '\n'))).parse(input)
}

/// Zero or more whitespace runs and line comments
fn ws(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((multispace1, line_comment)))).parse(input)
}

/// Decimal literal, digits required on both sides of the point
fn parse_decimal(input: &str) -> IResult<&str, Value> {
    let (rest, text) =
        recognize((opt(char('-')), digit1, char('.'), digit1)).parse(input)?;
    match text.parse::<f64>() {
        Ok(d) => Ok((rest, Value::Decimal(d))),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Float,
        ))),
    }
}

fn parse_integer(input: &str) -> IResult<&str, Value> {
    let (rest, text) = recognize(pair(opt(char('-')), digit1)).parse(input)?;
    // Out-of-range literals read as error values
    let value = match text.parse::<i64>() {
        Ok(n) => Value::Integer(n),
        Err(_) => Value::Error(LispError::Message("invalid number".into())),
    };
    Ok((rest, value))
}

/// String literal with `\n` `\t` `\r` `\"` `\\` escapes
fn parse_string(input: &str) -> IResult<&str, Value> {
    let (body, _) = char('"').parse(input)?;

    let mut unescaped = String::new();
    let mut chars = body.char_indices();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => return Ok((&body[offset + 1..], Value::String(unescaped))),
            '\\' => match chars.next() {
                Some((_, 'n')) => unescaped.push('\n'),
                Some((_, 't')) => unescaped.push('\t'),
                Some((_, 'r')) => unescaped.push('\r'),
                Some((_, '"')) => unescaped.push('"'),
                Some((_, '\\')) => unescaped.push('\\'),
                Some((escape_at, _)) => {
                    return Err(nom::Err::Failure(nom::error::Error::new(
                        &body[escape_at..],
                        ErrorKind::Escaped,
                    )));
                }
                None => break,
            },
            _ => unescaped.push(c),
        }
    }
    // No closing quote before end of input
    Err(nom::Err::Incomplete(Needed::Unknown))
}

fn parse_symbol(input: &str) -> IResult<&str, Value> {
    let (rest, name) = take_while1(is_symbol_char).parse(input)?;
    Ok((rest, Value::Symbol(name.to_owned())))
}

// The closing delimiter is mandatory once the opener has matched, so its
// absence is a hard failure rather than a reason to try other alternatives

fn parse_sexpr(input: &str) -> IResult<&str, Value> {
    let (rest, items) = delimited(
        char('('),
        many0(preceded(ws, parse_value)),
        preceded(ws, cut(char(')'))),
    )
    .parse(input)?;
    Ok((rest, Value::Sexpr(items)))
}

fn parse_qexpr(input: &str) -> IResult<&str, Value> {
    let (rest, items) = delimited(
        char('{'),
        many0(preceded(ws, parse_value)),
        preceded(ws, cut(char('}'))),
    )
    .parse(input)?;
    Ok((rest, Value::Qexpr(items)))
}

/// Parse any single expression. Number parsers come before the symbol
/// parser because a leading `-` or digit is also a valid symbol character.
fn parse_value(input: &str) -> IResult<&str, Value> {
    alt((
        parse_decimal,
        parse_integer,
        parse_string,
        parse_sexpr,
        parse_qexpr,
        parse_symbol,
    ))
    .parse(input)
}

/// Parse exactly one expression, surrounded by optional whitespace and
/// comments.
pub fn parse_expr(input: &str) -> Result<Value, ParseError> {
    match all_consuming(delimited(ws, parse_value, ws)).parse(input) {
        Ok((_, value)) => Ok(value),
        Err(err) => Err(parse_error(input, err)),
    }
}

/// Parse a whole program: zero or more expressions in sequence. Used by
/// `load` and by hosts feeding whole lines or files.
pub fn parse_program(input: &str) -> Result<Vec<Value>, ParseError> {
    match all_consuming(terminated(many0(preceded(ws, parse_value)), ws)).parse(input) {
        Ok((_, forms)) => Ok(forms),
        Err(err) => Err(parse_error(input, err)),
    }
}

/// Convert nom errors to the structured reader error
fn parse_error(input: &str, error: nom::Err<nom::error::Error<&str>>) -> ParseError {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = input.len().saturating_sub(e.input.len());
            if offset >= input.len() {
                return ParseError::new(ParseErrorKind::Incomplete, "Unexpected end of input");
            }
            match e.code {
                // all_consuming found leftovers after a complete expression
                ErrorKind::Eof => ParseError::with_context(
                    ParseErrorKind::TrailingContent,
                    "Unexpected trailing content",
                    input,
                    offset,
                ),
                ErrorKind::Escaped => ParseError::with_context(
                    ParseErrorKind::InvalidSyntax,
                    "Unknown string escape",
                    input,
                    offset,
                ),
                _ => ParseError::with_context(
                    ParseErrorKind::InvalidSyntax,
                    "Invalid syntax",
                    input,
                    offset,
                ),
            }
        }
        nom::Err::Incomplete(_) => {
            ParseError::new(ParseErrorKind::Incomplete, "Incomplete input")
        }
    }
}

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{opt, recognize, value},
    error::ErrorKind,
    multi::separated_list0,
    sequence::{pair, preceded, terminated},
};

use crate::ast::{Expr, NumberType, SYMBOL_SPECIAL_CHARS, is_valid_symbol, quoted};
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

/// Convert nom parsing errors to a structured ParseError
fn convert_parse_error(input: &str, error: nom::Err<nom::error::Error<&str>>) -> ParseError {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let position = input.len().saturating_sub(e.input.len());
            match e.code {
                ErrorKind::TooLarge => ParseError::with_context(
                    ParseErrorKind::TooDeeplyNested,
                    format!("Expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
                    input,
                    position,
                ),
                _ if position >= input.len() => ParseError::from_message(
                    ParseErrorKind::Incomplete,
                    "Unexpected end of input",
                ),
                _ => {
                    let near: String = input.chars().skip(position).take(10).collect();
                    ParseError::with_context(
                        ParseErrorKind::InvalidSyntax,
                        format!("Invalid syntax near '{near}'"),
                        input,
                        position,
                    )
                }
            }
        }
        nom::Err::Incomplete(_) => {
            ParseError::from_message(ParseErrorKind::Incomplete, "Incomplete input")
        }
    }
}

/// Parse a number (integer only, decimal or hexadecimal)
fn parse_number(input: &str) -> IResult<&str, Expr> {
    alt((parse_hexadecimal, parse_decimal)).parse(input)
}

fn parse_decimal(input: &str) -> IResult<&str, Expr> {
    let (input, number_str) = recognize(pair(
        opt(char('-')),
        take_while1(|c: char| c.is_ascii_digit()),
    ))
    .parse(input)?;

    match number_str.parse::<NumberType>() {
        Ok(n) => Ok((input, Expr::Number(n))),
        // Overflow or stray digits; symbol parsing rejects these too
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Digit,
        ))),
    }
}

/// Parse a hexadecimal number (#x or #X prefix)
fn parse_hexadecimal(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('#').parse(input)?;
    let (input, _) = alt((char('x'), char('X'))).parse(input)?;
    let (input, hex_digits) = take_while1(|c: char| c.is_ascii_hexdigit()).parse(input)?;

    match NumberType::from_str_radix(hex_digits, 16) {
        Ok(n) => Ok((input, Expr::Number(n))),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::HexDigit,
        ))),
    }
}

/// Parse a boolean (#t or #f)
fn parse_bool(input: &str) -> IResult<&str, Expr> {
    alt((
        value(Expr::Bool(true), tag("#t")),
        value(Expr::Bool(false), tag("#f")),
    ))
    .parse(input)
}

/// Parse a symbol (identifier)
fn parse_symbol(input: &str) -> IResult<&str, Expr> {
    let (remaining, candidate) =
        take_while1(|c: char| c.is_alphanumeric() || SYMBOL_SPECIAL_CHARS.contains(c))
            .parse(input)?;

    if is_valid_symbol(candidate) {
        Ok((remaining, Expr::Symbol(candidate.into())))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Alpha,
        )))
    }
}

/// Parse a string literal with escape sequences
fn parse_string(input: &str) -> IResult<&str, Expr> {
    let (mut remaining, _) = char('"').parse(input)?;
    let mut chars = String::new();

    loop {
        let mut iter = remaining.chars();
        match iter.next() {
            Some('"') => return Ok((iter.as_str(), Expr::String(chars))),
            Some('\\') => {
                match iter.next() {
                    Some('n') => chars.push('\n'),
                    Some('t') => chars.push('\t'),
                    Some('r') => chars.push('\r'),
                    Some('\\') => chars.push('\\'),
                    Some('"') => chars.push('"'),
                    // Unknown or incomplete escape sequence
                    _ => {
                        return Err(nom::Err::Error(nom::error::Error::new(
                            remaining,
                            ErrorKind::Char,
                        )));
                    }
                }
                remaining = iter.as_str();
            }
            Some(ch) => {
                chars.push(ch);
                remaining = iter.as_str();
            }
            // End of input without a closing quote
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    remaining,
                    ErrorKind::Char,
                )));
            }
        }
    }
}

/// Parse a parenthesized list
fn parse_list(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = char('(').parse(input)?;
    let (input, _) = multispace0.parse(input)?;
    let (input, elements) =
        separated_list0(multispace1, |input| parse_sexpr(input, depth + 1)).parse(input)?;
    let (input, _) = multispace0.parse(input)?;
    let (input, _) = char(')').parse(input)?;

    Ok((input, Expr::List(elements)))
}

/// Parse the quote shorthand ('expr -> (quote expr))
fn parse_quote_shorthand(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = char('\'').parse(input)?;
    let (input, expr) = parse_sexpr(input, depth + 1)?;
    Ok((input, quoted(expr)))
}

/// Parse one S-expression, tracking nesting depth
fn parse_sexpr(input: &str, depth: usize) -> IResult<&str, Expr> {
    if depth >= MAX_PARSE_DEPTH {
        // Failure, not Error: the depth limit must abort parsing outright
        // rather than let alternatives backtrack over it
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::TooLarge,
        )));
    }
    preceded(
        multispace0,
        alt((
            |input| parse_quote_shorthand(input, depth),
            |input| parse_list(input, depth),
            parse_number,
            parse_bool,
            parse_string,
            parse_symbol,
        )),
    )
    .parse(input)
}

/// Parse a complete expression from input.
///
/// The whole input must be one S-expression; trailing content is an error.
pub fn parse_expression(input: &str) -> Result<Expr, Error> {
    match terminated(|input| parse_sexpr(input, 0), multispace0).parse(input) {
        Ok(("", expr)) => Ok(expr),
        Ok((remaining, _)) => Err(Error::ParseError(ParseError::with_context(
            ParseErrorKind::TrailingContent,
            format!("Unexpected remaining input: '{remaining}'"),
            input,
            input.len() - remaining.len(),
        ))),
        Err(e) => Err(Error::ParseError(convert_parse_error(input, e))),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::Error;
    use crate::ast::{nil, sym, val};

    /// Test result variants for parsing tests
    #[derive(Debug)]
    enum ParseTestResult {
        Success(Expr),                   // Parsing should succeed with this value
        SpecificKind(ParseErrorKind),    // Parsing should fail with this error kind
        Error,                           // Parsing should fail (any error)
    }
    use ParseTestResult::*;

    fn success<T: Into<Expr>>(value: T) -> ParseTestResult {
        Success(value.into())
    }

    /// Run parse tests with round-trip validation on successes
    fn run_parse_tests(test_cases: Vec<(&str, ParseTestResult)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("Parse test #{}", i + 1);
            let result = parse_expression(input);

            match (result, expected) {
                (Ok(actual), Success(expected_val)) => {
                    assert_eq!(actual, *expected_val, "{test_id}: value mismatch");

                    // Round-trip: display -> parse -> display should be identical
                    let displayed = format!("{actual}");
                    let reparsed = parse_expression(&displayed).unwrap_or_else(|e| {
                        panic!("{test_id}: round-trip parse failed for '{displayed}': {e:?}")
                    });
                    assert_eq!(
                        displayed,
                        format!("{reparsed}"),
                        "{test_id}: round-trip display mismatch for '{input}'"
                    );
                }
                (Err(_), Error) => {}
                (Err(Error::ParseError(err)), SpecificKind(expected_kind)) => {
                    assert_eq!(
                        err.kind, *expected_kind,
                        "{test_id}: error kind mismatch ({})",
                        err.message
                    );
                }
                (Err(err), SpecificKind(_)) => {
                    panic!("{test_id}: expected ParseError, got {err:?}");
                }
                (Ok(actual), Error | SpecificKind(_)) => {
                    panic!("{test_id}: expected error, got {actual:?}");
                }
                (Err(err), Success(_)) => {
                    panic!("{test_id}: expected success, got error {err:?}");
                }
            }
        }
    }

    #[test]
    #[expect(clippy::too_many_lines)] // Comprehensive test coverage is intentionally thorough
    fn test_parser_comprehensive() {
        let test_cases = vec![
            // ===== NUMBERS =====
            ("42", success(42)),
            ("-5", success(-5)),
            ("0", success(0)),
            ("#x1A", success(26)),
            ("#X1a", success(26)),
            ("#xff", success(255)),
            ("9223372036854775807", success(i64::MAX)),
            ("-9223372036854775808", success(i64::MIN)),
            ("3.14", Error),                 // No floating point
            ("#xG", Error),                  // Invalid hex digit
            ("#x", Error),                   // Incomplete hex
            ("123abc", Error),               // Mixed digits and letters
            ("99999999999999999999", Error), // Too large for NumberType
            // ===== SYMBOLS =====
            ("foo", success(sym("foo"))),
            ("+", success(sym("+"))),
            (">=", success(sym(">="))),
            ("null?", success(sym("null?"))),
            ("test-name", success(sym("test-name"))),
            ("var123", success(sym("var123"))),
            ("-", success(sym("-"))),
            ("-abc", success(sym("-abc"))),
            ("lambda", success(sym("lambda"))),
            ("123var", Error),
            ("test space", Error),
            ("test@home", Error),
            // ===== BOOLEANS =====
            ("#t", success(true)),
            ("#f", success(false)),
            ("#T", Error),
            ("#true", Error),
            // ===== STRINGS =====
            ("\"hello\"", success("hello")),
            ("\"hello world\"", success("hello world")),
            ("\"\"", success("")),
            (r#""line\nbreak""#, success("line\nbreak")),
            (r#""tab\there""#, success("tab\there")),
            (r#""quote\"test""#, success("quote\"test")),
            (r#""backslash\\test""#, success("backslash\\test")),
            (r#""bad\xescape""#, Error),
            (r#""unterminated"#, Error),
            (r#""ends-in-backslash\"#, Error),
            // ===== LISTS =====
            ("()", success(nil())),
            ("(42)", success([42])),
            ("(1 2 3)", success([1, 2, 3])),
            (
                "(1 hello \"world\" #t)",
                success(vec![val(1), sym("hello"), val("world"), val(true)]),
            ),
            (
                "(+ 1 2)",
                success(vec![sym("+"), val(1), val(2)]),
            ),
            (
                "(if #t 1 2)",
                success(vec![sym("if"), val(true), val(1), val(2)]),
            ),
            (
                "(lambda (x) x)",
                success(vec![sym("lambda"), val(vec![sym("x")]), sym("x")]),
            ),
            ("((1 2) (3 4))", success([[1, 2], [3, 4]])),
            ("(((1)))", success([val([val([val(1)])])])),
            // An application of a lambda parses as a plain nested list
            (
                "((lambda (x) x) 42)",
                success(vec![
                    val(vec![sym("lambda"), val(vec![sym("x")]), sym("x")]),
                    val(42),
                ]),
            ),
            // ===== QUOTE =====
            ("'foo", success(vec![sym("quote"), sym("foo")])),
            (
                "'(1 2 3)",
                success(vec![sym("quote"), val([1, 2, 3])]),
            ),
            ("'()", success(vec![sym("quote"), nil()])),
            (
                "(quote foo)",
                success(vec![sym("quote"), sym("foo")]),
            ),
            (
                "''x",
                success(vec![
                    sym("quote"),
                    val(vec![sym("quote"), sym("x")]),
                ]),
            ),
            // ===== WHITESPACE =====
            ("  42  ", success(42)),
            ("\t#t\n", success(true)),
            ("( 1   2\t\n3 )", success([1, 2, 3])),
            ("(   )", success(nil())),
            // ===== ERROR CASES =====
            ("(1 2 3", Error), // Missing closing paren
            ("((1 2)", Error),
            ("", Error),
            ("   ", Error),
            (")", Error),
            ("@invalid", Error),
            (
                "1 2",
                SpecificKind(ParseErrorKind::TrailingContent),
            ),
            (
                "(+ 1 2) (+ 3 4)",
                SpecificKind(ParseErrorKind::TrailingContent),
            ),
            ("1 2 3)", SpecificKind(ParseErrorKind::TrailingContent)),
        ];

        run_parse_tests(test_cases);
    }

    #[test]
    fn test_parser_depth_limits() {
        let parens_under_limit = format!(
            "{}unbound{}",
            "(".repeat(MAX_PARSE_DEPTH - 1),
            ")".repeat(MAX_PARSE_DEPTH - 1)
        );
        let quotes_under_limit = format!("{}unbound", "'".repeat(MAX_PARSE_DEPTH - 1));
        let deep_parens_at_limit = format!(
            "{}1{}",
            "(".repeat(MAX_PARSE_DEPTH),
            ")".repeat(MAX_PARSE_DEPTH)
        );
        let deep_quotes_at_limit = format!("{}a", "'".repeat(MAX_PARSE_DEPTH));

        run_parse_tests(vec![
            (
                deep_parens_at_limit.as_str(),
                SpecificKind(ParseErrorKind::TooDeeplyNested),
            ),
            (
                deep_quotes_at_limit.as_str(),
                SpecificKind(ParseErrorKind::TooDeeplyNested),
            ),
        ]);

        assert!(
            parse_expression(&parens_under_limit).is_ok(),
            "Parens just under depth limit should parse successfully"
        );
        assert!(
            parse_expression(&quotes_under_limit).is_ok(),
            "Quotes just under depth limit should parse successfully"
        );
    }
}

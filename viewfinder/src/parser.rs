//! This module defines [parse_select], the front end for the SELECT dialect.

pub mod ast;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag_no_case},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, opt, verify},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, separated_pair, tuple},
    IResult,
};

use crate::error::Error;

use ast::{AttributeRef, EqualityPredicate, SelectStatement, TableRef};

/// Output of a nom parser function
pub type ParserResult<'a, Output> = IResult<&'a str, Output>;

/// Keywords of the dialect; case-insensitive, never valid as table names or aliases
const KEYWORDS: &[&str] = &["select", "from", "where", "and", "as"];

fn is_keyword(token: &str) -> bool {
    KEYWORDS
        .iter()
        .any(|keyword| token.eq_ignore_ascii_case(keyword))
}

/// Parse a single token.
///
/// Tokens are liberal: anything up to whitespace, a comma, a dot,
/// or an equals sign. Identifiers are not validated against a schema.
fn token(input: &str) -> ParserResult<&str> {
    is_not(" \t\r\n,.=")(input)
}

/// Parse a token that is not a keyword.
fn name_token(input: &str) -> ParserResult<&str> {
    verify(token, |parsed: &str| !is_keyword(parsed))(input)
}

/// Parse an attribute reference, `column` or `qualifier.column`.
fn attribute(input: &str) -> ParserResult<AttributeRef> {
    pair(token, opt(preceded(char('.'), token)))(input).map(|(rest, (first, second))| {
        let reference = match second {
            Some(column) => AttributeRef::qualified(first, column),
            None => AttributeRef::bare(first),
        };

        (rest, reference)
    })
}

/// Parse a table reference, `Table`, `Table alias`, or `Table AS alias`.
fn table(input: &str) -> ParserResult<TableRef> {
    pair(
        name_token,
        opt(preceded(
            multispace1,
            alt((
                preceded(pair(tag_no_case("as"), multispace1), name_token),
                name_token,
            )),
        )),
    )(input)
    .map(|(rest, (name, alias))| (rest, TableRef::new(name, alias)))
}

/// Parse an equality between two attributes.
fn equality(input: &str) -> ParserResult<EqualityPredicate> {
    separated_pair(
        attribute,
        delimited(multispace0, char('='), multispace0),
        attribute,
    )(input)
    .map(|(rest, (left, right))| (rest, EqualityPredicate::new(left, right)))
}

/// Parse a comma surrounded by optional whitespace.
fn comma(input: &str) -> ParserResult<char> {
    delimited(multispace0, char(','), multispace0)(input)
}

/// Parse a full statement of the dialect.
fn select_statement(input: &str) -> ParserResult<SelectStatement> {
    tuple((
        preceded(multispace0, tag_no_case("select")),
        preceded(multispace1, separated_list1(comma, attribute)),
        preceded(multispace1, tag_no_case("from")),
        preceded(multispace1, separated_list1(comma, table)),
        opt(preceded(
            tuple((multispace1, tag_no_case("where"), multispace1)),
            separated_list1(
                delimited(multispace1, tag_no_case("and"), multispace1),
                equality,
            ),
        )),
        multispace0,
    ))(input)
    .map(|(rest, (_, projection, _, tables, predicates, _))| {
        (
            rest,
            SelectStatement::new(projection, tables, predicates.unwrap_or_default()),
        )
    })
}

/// Parse a statement of the supported dialect.
///
/// # Error
/// Returns [Error::MalformedQuery] if the input does not belong
/// to the dialect.
pub fn parse_select(input: &str) -> Result<SelectStatement, Error> {
    match all_consuming(select_statement)(input) {
        Ok((_, statement)) => Ok(statement),
        Err(nom::Err::Error(error) | nom::Err::Failure(error)) => {
            Err(Error::malformed_query(if error.input.is_empty() {
                String::from("unexpected end of input")
            } else {
                format!(
                    "unexpected input near \"{}\"",
                    error.input.chars().take(24).collect::<String>()
                )
            }))
        }
        Err(nom::Err::Incomplete(_)) => Err(Error::malformed_query("incomplete input")),
    }
}

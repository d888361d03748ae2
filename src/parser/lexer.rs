// Lexer utilities for the mapping expression language

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::recognize,
    sequence::delimited,
    IResult,
};

/// Parse and consume whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse an identifier (column name, aggregation name)
/// Format: [a-zA-Z_][a-zA-Z0-9_]*
pub fn identifier(input: &str) -> IResult<&str, String> {
    let (rest, ident) = recognize(take_while1(|c: char| c.is_alphanumeric() || c == '_'))(input)?;

    if let Some(first) = ident.chars().next() {
        if !first.is_alphabetic() && first != '_' {
            return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Alpha)));
        }
    }

    Ok((rest, ident.to_string()))
}

/// Parse a string literal
/// Format: "..."
pub fn string_literal(input: &str) -> IResult<&str, String> {
    let (input, content) = delimited(char('"'), take_while(|c| c != '"'), char('"'))(input)?;

    Ok((input, content.to_string()))
}

/// A column reference: a bare identifier or a quoted name for headers with spaces.
pub fn column_name(input: &str) -> IResult<&str, String> {
    alt((string_literal, identifier))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::bytes::complete::tag;

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("foo"), Ok(("", "foo".to_string())));
        assert_eq!(identifier("gdp_2020"), Ok(("", "gdp_2020".to_string())));
        assert_eq!(identifier("_bar rest"), Ok((" rest", "_bar".to_string())));
    }

    #[test]
    fn test_identifier_invalid_start_with_number() {
        assert!(identifier("2020").is_err());
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal(r#""GDP per capita""#), Ok(("", "GDP per capita".to_string())));
        assert!(string_literal(r#""unclosed"#).is_err());
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name("country;"), Ok((";", "country".to_string())));
        assert_eq!(column_name(r#""2020 total""#), Ok(("", "2020 total".to_string())));
    }

    #[test]
    fn test_ws() {
        let mut parser = ws(tag("stacks"));
        assert_eq!(parser("  stacks  "), Ok(("", "stacks")));
        assert_eq!(parser("\n\tstacks"), Ok(("", "stacks")));
    }
}

// Mapping expression parser
//
// Format: stacks: <column>; bars: <column>[(<aggregation>)], ...; [series: <column>]
// Clauses may appear in any order.

use super::lexer::{column_name, identifier, ws};
use crate::aggregate::Aggregation;
use crate::mapping::{Mapping, MeasureMapping};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, map_opt, opt},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
    IResult,
};

enum Clause {
    Stacks(String),
    Bars(Vec<MeasureMapping>),
    Series(String),
}

fn aggregation(input: &str) -> IResult<&str, Aggregation> {
    map_opt(identifier, |name| Aggregation::from_name(&name))(input)
}

/// Parse a measure: `column` or `column(aggregation)`
fn measure(input: &str) -> IResult<&str, MeasureMapping> {
    map(
        tuple((
            ws(column_name),
            opt(delimited(ws(char('(')), ws(aggregation), ws(char(')')))),
        )),
        |(column, aggregation)| MeasureMapping { column, aggregation },
    )(input)
}

fn clause(input: &str) -> IResult<&str, Clause> {
    alt((
        map(
            preceded(tuple((ws(tag("stacks")), char(':'))), ws(column_name)),
            Clause::Stacks,
        ),
        map(
            preceded(
                tuple((ws(tag("bars")), char(':'))),
                separated_list1(ws(char(',')), measure),
            ),
            Clause::Bars,
        ),
        map(
            preceded(tuple((ws(tag("series")), char(':'))), ws(column_name)),
            Clause::Series,
        ),
    ))(input)
}

/// Parse a complete mapping expression. `stacks` and `bars` are mandatory.
pub fn parse_mapping(input: &str) -> IResult<&str, Mapping> {
    let start = input;
    let (input, clauses) = separated_list1(ws(char(';')), clause)(input)?;
    let (input, _) = opt(ws(char(';')))(input)?;

    let mut stacks = None;
    let mut bars = Vec::new();
    let mut series = None;
    for clause in clauses {
        match clause {
            Clause::Stacks(column) => stacks = Some(column),
            Clause::Bars(measures) => bars.extend(measures),
            Clause::Series(column) => series = Some(column),
        }
    }

    match stacks {
        Some(stacks) if !bars.is_empty() => Ok((input, Mapping { stacks, bars, series })),
        _ => Err(nom::Err::Failure(nom::error::Error::new(
            start,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_mapping() {
        let (rest, mapping) = parse_mapping("stacks: cat; bars: v(sum), w(mean); series: grp").unwrap();
        assert_eq!(rest, "");
        assert_eq!(mapping.stacks, "cat");
        assert_eq!(mapping.series.as_deref(), Some("grp"));
        assert_eq!(mapping.bars.len(), 2);
        assert_eq!(mapping.bars[0].column, "v");
        assert_eq!(mapping.bars[0].aggregation, Some(Aggregation::Sum));
        assert_eq!(mapping.bars[1].aggregation, Some(Aggregation::Mean));
    }

    #[test]
    fn test_parse_without_series_or_aggregation() {
        let (_, mapping) = parse_mapping("stacks: month; bars: rain").unwrap();
        assert_eq!(mapping.series, None);
        assert_eq!(mapping.bars[0].aggregation, None);
    }

    #[test]
    fn test_clauses_in_any_order_with_quotes() {
        let (_, mapping) =
            parse_mapping(r#"bars: "Sales 2020"(max); series: region; stacks: "Product line";"#).unwrap();
        assert_eq!(mapping.stacks, "Product line");
        assert_eq!(mapping.bars[0].column, "Sales 2020");
        assert_eq!(mapping.bars[0].aggregation, Some(Aggregation::Max));
    }

    #[test]
    fn test_missing_required_clause_fails() {
        assert!(parse_mapping("bars: v").is_err());
        assert!(parse_mapping("stacks: cat").is_err());
    }

    #[test]
    fn test_unknown_aggregation_leaves_input() {
        // `total` is not an aggregation, so the measure stops before the parenthesis
        let (rest, _) = parse_mapping("stacks: cat; bars: v(total)").unwrap();
        assert_eq!(rest, "(total)");
    }
}

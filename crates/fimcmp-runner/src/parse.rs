//! Parser for FIMI-style transaction text.
//!
//! One transaction per line, items separated by spaces or tabs. Blank lines
//! are skipped. Item labels are any run of non-whitespace characters.

use nom::{
    bytes::complete::take_while1,
    character::complete::{space0, space1},
    combinator::all_consuming,
    multi::separated_list1,
    sequence::delimited,
    IResult,
};

use crate::error::{RunnerError, RunnerResult};

/// Parses transaction text into per-line item labels.
///
/// Labels borrow from `input`. Duplicate labels within a line are kept;
/// rank encoding removes them.
///
/// # Errors
///
/// Returns [`RunnerError::Parse`] for a line containing whitespace other than
/// spaces and tabs between items.
///
/// # Example
///
/// ```rust
/// use fimcmp_runner::parse_transactions;
///
/// let txs = parse_transactions("bread milk\n\nbread  beer\t eggs\n").unwrap();
/// assert_eq!(txs, vec![vec!["bread", "milk"], vec!["bread", "beer", "eggs"]]);
/// ```
pub fn parse_transactions(input: &str) -> RunnerResult<Vec<Vec<&str>>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}

fn parse_line(line: &str, line_no: usize) -> RunnerResult<Vec<&str>> {
    match all_consuming(transaction)(line) {
        Ok((_, items)) => Ok(items),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(RunnerError::Parse {
            line: line_no,
            message: format!(
                "unexpected input at column {}",
                line.len() - e.input.len() + 1
            ),
        }),
        Err(nom::Err::Incomplete(_)) => Err(RunnerError::Parse {
            line: line_no,
            message: "incomplete input".to_string(),
        }),
    }
}

/// Items separated by blanks, with optional leading and trailing blanks.
fn transaction(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(space0, separated_list1(space1, item), space0)(input)
}

fn item(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_items() {
        let txs = parse_transactions("1 2 3\n2 3\n").unwrap();
        assert_eq!(txs, vec![vec!["1", "2", "3"], vec!["2", "3"]]);
    }

    #[test]
    fn test_parse_tabs_and_padding() {
        let txs = parse_transactions("  a\tb  \n").unwrap();
        assert_eq!(txs, vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_parse_crlf() {
        let txs = parse_transactions("a b\r\nc\r\n").unwrap();
        assert_eq!(txs, vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let txs = parse_transactions("\n\na\n   \nb\n").unwrap();
        assert_eq!(txs, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_duplicates_kept() {
        let txs = parse_transactions("x x y").unwrap();
        assert_eq!(txs, vec![vec!["x", "x", "y"]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_transactions("").unwrap().is_empty());
    }

    #[test]
    fn test_unexpected_whitespace_reports_line() {
        let err = parse_transactions("a b\nc\u{000B}d\n").unwrap_err();
        match err {
            RunnerError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("column 2"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}

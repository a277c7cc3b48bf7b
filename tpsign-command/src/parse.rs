//! Argument grammar for `<x> <y> <z> <dimension> <remark>`.
//!
//! Every node takes the unconsumed rest of the input and returns its value together with the
//! number of bytes it consumed. Error offsets returned by [`parse_command`] are relative to the
//! start of the whole argument string.

use std::fmt::{
    self,
    Display,
};

use crate::{
    BlockPos,
    Dimension,
    ParsedCommand,
};

pub const DIVIDER: char = ' ';

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Invalid point")]
    IllegalPoint(usize),

    #[error("Invalid dimension, only 'overworld', 'the_nether' and 'the_end' are supported")]
    DimensionError(usize),

    #[error("Incomplete command")]
    IncompleteError(usize),
}

impl SyntaxError {
    pub fn offset(&self) -> usize {
        match self {
            Self::IllegalPoint(offset)
            | Self::DimensionError(offset)
            | Self::IncompleteError(offset) => *offset,
        }
    }

    fn shifted(self, by: usize) -> Self {
        match self {
            Self::IllegalPoint(offset) => Self::IllegalPoint(offset + by),
            Self::DimensionError(offset) => Self::DimensionError(offset + by),
            Self::IncompleteError(offset) => Self::IncompleteError(offset + by),
        }
    }

    /// Renders the error together with the input read so far, e.g.
    /// `Invalid point: 1 2<--[HERE]`.
    pub fn excerpt<'a>(&self, input: &'a str) -> Excerpt<'a> {
        Excerpt {
            error: *self,
            read: input.get(..self.offset()).unwrap_or(input),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Excerpt<'a> {
    error: SyntaxError,
    read: &'a str,
}

impl Display for Excerpt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}<--[HERE]", self.error, self.read)
    }
}

/// Number of bytes taken up by leading dividers.
pub fn skip_dividers(text: &str) -> usize {
    text.len() - text.trim_start_matches(DIVIDER).len()
}

/// The text up to the next divider.
pub fn element(text: &str) -> &str {
    text.find(DIVIDER).map_or(text, |end| &text[..end])
}

pub fn parse_point(text: &str) -> Result<(BlockPos, usize), SyntaxError> {
    let mut read = 0;
    let mut coords = [0; 3];

    for coord in &mut coords {
        let skipped = skip_dividers(&text[read..]);
        let token = element(&text[read + skipped..]);
        *coord = token
            .parse()
            .map_err(|_| SyntaxError::IllegalPoint(read))?;
        read += skipped + token.len();
    }

    Ok((BlockPos::from(coords), read))
}

pub fn parse_dimension(text: &str) -> Result<(Dimension, usize), SyntaxError> {
    let skipped = skip_dividers(text);
    let token = element(&text[skipped..]);

    if token.is_empty() {
        return Err(SyntaxError::IncompleteError(skipped));
    }

    let dimension = token
        .parse()
        .map_err(|_| SyntaxError::DimensionError(skipped))?;

    Ok((dimension, skipped + token.len()))
}

/// Takes everything that is left. Leading dividers are not part of the remark.
///
/// The consumed count is in bytes, like every count and offset in this module.
pub fn parse_remark(text: &str) -> (&str, usize) {
    let skipped = skip_dividers(text);
    (&text[skipped..], text.len())
}

/// Parses a whole argument string. Returns the command and the number of bytes consumed, which is
/// always `text.len()` on success.
pub fn parse_command(text: &str) -> Result<(ParsedCommand, usize), SyntaxError> {
    let (destination, mut read) = parse_point(text)?;

    let (dimension, n) = parse_dimension(&text[read..]).map_err(|error| error.shifted(read))?;
    read += n;

    let (remark, n) = parse_remark(&text[read..]);
    read += n;

    Ok((
        ParsedCommand {
            destination,
            dimension,
            remark: remark.to_owned(),
        },
        read,
    ))
}

#[cfg(test)]
mod tests {
    use crate::{
        BlockPos,
        Dimension,
        parse::{
            SyntaxError,
            parse_command,
            parse_dimension,
            parse_point,
            parse_remark,
        },
    };

    #[test]
    fn parses_full_command() {
        let input = "1 2 3 overworld hello there";
        let (command, read) = parse_command(input).unwrap();

        assert_eq!(command.destination, BlockPos::new(1, 2, 3));
        assert_eq!(command.dimension, Dimension::Overworld);
        assert_eq!(command.remark, "hello there");
        assert_eq!(read, input.len());
    }

    #[test]
    fn parses_negative_coordinates() {
        let (command, _) = parse_command("100 64 -200 the_nether Home base").unwrap();
        assert_eq!(command.destination, BlockPos::new(100, 64, -200));
        assert_eq!(command.dimension, Dimension::TheNether);
        assert_eq!(command.remark, "Home base");
    }

    #[test]
    fn point_reports_offset_after_last_integer() {
        assert_eq!(
            parse_command("1 2 overworld x").unwrap_err(),
            SyntaxError::IllegalPoint(3)
        );
    }

    #[test]
    fn point_fails_when_input_runs_out() {
        assert_eq!(parse_point("").unwrap_err(), SyntaxError::IllegalPoint(0));
        assert_eq!(parse_point("7 8").unwrap_err(), SyntaxError::IllegalPoint(3));
    }

    #[test]
    fn point_skips_repeated_dividers() {
        let (point, read) = parse_point("  1   2 3 rest").unwrap();
        assert_eq!(point, BlockPos::new(1, 2, 3));
        assert_eq!(read, 9);
    }

    #[test]
    fn point_rejects_fractional_coordinates() {
        assert_eq!(
            parse_point("1.5 2 3").unwrap_err(),
            SyntaxError::IllegalPoint(0)
        );
    }

    #[test]
    fn unknown_dimension_reports_token_start() {
        assert_eq!(
            parse_command("1 2 3 atlantis x").unwrap_err(),
            SyntaxError::DimensionError(6)
        );
    }

    #[test]
    fn missing_dimension_is_incomplete() {
        let error = parse_command("1 2 3 ").unwrap_err();
        assert_eq!(error, SyntaxError::IncompleteError(6));
        assert_eq!(parse_dimension("").unwrap_err(), SyntaxError::IncompleteError(0));
    }

    #[test]
    fn remark_may_be_empty() {
        let (command, read) = parse_command("1 2 3 the_end").unwrap();
        assert_eq!(command.remark, "");
        assert_eq!(read, 13);
        assert_eq!(parse_remark("   "), ("", 3));
    }

    #[test]
    fn counts_consumed_bytes() {
        let input = "1 2 3 overworld 主城";
        let (command, read) = parse_command(input).unwrap();

        assert_eq!(command.remark, "主城");
        assert_eq!(read, input.len());
        assert_eq!(read, 22);
    }

    #[test]
    fn remark_is_taken_verbatim() {
        let (command, _) = parse_command("0 0 0 overworld  spaced   out ").unwrap();
        assert_eq!(command.remark, "spaced   out ");
    }

    #[test]
    fn excerpt_marks_offset() {
        let input = "1 2 overworld x";
        let error = parse_command(input).unwrap_err();
        assert_eq!(
            error.excerpt(input).to_string(),
            "Invalid point: 1 2<--[HERE]"
        );
    }
}

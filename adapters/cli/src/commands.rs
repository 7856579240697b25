use dotlink_core::CellCoord;
use thiserror::Error;

/// Single line of player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LineCommand {
    /// Blank line.
    Nothing,
    /// Draws a path through the listed cells and releases it.
    Path(Vec<CellCoord>),
    /// Taps a special tile.
    Tap(CellCoord),
    /// Cycles the color of an ordinary tile.
    Cycle(CellCoord),
    /// Highlights the first available match.
    Hint,
    /// Redraws every ordinary tile.
    Shuffle,
    /// Prints the board.
    Show,
    /// Leaves the game.
    Quit,
}

/// Errors raised while parsing a line of input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum ParseError {
    /// The first word is not a known command.
    #[error("unrecognized command '{0}' (try path, tap, cycle, hint, shuffle, show, quit)")]
    UnknownCommand(String),
    /// The command needs at least one cell argument.
    #[error("'{0}' expects a cell written as column,row")]
    MissingCell(&'static str),
    /// A cell argument could not be parsed.
    #[error("could not parse cell '{0}'; expected column,row")]
    InvalidCell(String),
    /// The command received more arguments than it accepts.
    #[error("'{0}' takes a single cell")]
    TooManyCells(&'static str),
}

impl LineCommand {
    /// Parses one line of input.
    pub(crate) fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Self::Nothing);
        };
        let cells = words.map(parse_cell).collect::<Result<Vec<_>, _>>()?;

        match command.to_ascii_lowercase().as_str() {
            "path" | "p" => {
                if cells.is_empty() {
                    return Err(ParseError::MissingCell("path"));
                }
                Ok(Self::Path(cells))
            }
            "tap" | "t" => single_cell("tap", &cells).map(Self::Tap),
            "cycle" | "c" => single_cell("cycle", &cells).map(Self::Cycle),
            "hint" | "h" => Ok(Self::Hint),
            "shuffle" | "s" => Ok(Self::Shuffle),
            "show" => Ok(Self::Show),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(ParseError::UnknownCommand(command.to_owned())),
        }
    }
}

fn single_cell(command: &'static str, cells: &[CellCoord]) -> Result<CellCoord, ParseError> {
    match cells {
        [] => Err(ParseError::MissingCell(command)),
        [cell] => Ok(*cell),
        _ => Err(ParseError::TooManyCells(command)),
    }
}

fn parse_cell(value: &str) -> Result<CellCoord, ParseError> {
    let invalid = || ParseError::InvalidCell(value.to_owned());
    let (column, row) = value.split_once(',').ok_or_else(invalid)?;
    let column = column.trim().parse::<u32>().map_err(|_| invalid())?;
    let row = row.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok(CellCoord::new(column, row))
}

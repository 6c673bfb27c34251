use std::{fmt, str::FromStr};

use regex::Regex;

use crate::{
    board::Board,
    piece::Unit,
    square::Square,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected 8 ranks but found {0}")]
    RankCount(usize),
    #[error("Rank {rank} is malformed: {row:?}")]
    BadRank { rank: usize, row: String },
    #[error("Unrecognised unit token: {0:?}")]
    BadToken(String),
    #[error("Square {0} is listed twice")]
    Occupied(Square),
    #[error("Bad pattern: {0}")]
    Pattern(String),
}

/// Parses either a diagram (8 ranks, rank 8 first, separated by `/` or
/// newlines, `.` or `x` for empty squares) or a list of unit tokens such as
/// `Ed4 rc7`. Traps are left as written, without resolving captures.
pub fn parse_board(input: &str) -> Result<Board, ParseError> {
    let trimmed = input.trim();
    let rows: Vec<&str> = trimmed
        .split(|c: char| c == '/' || c == '\n')
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .collect();

    let diagram = Regex::new(r"^[.xXRCDHMErcdhme]{8}$")
        .map_err(|e| ParseError::Pattern(e.to_string()))?;
    if rows.len() > 1 || rows.first().is_some_and(|row| diagram.is_match(row)) {
        return parse_diagram(&rows, &diagram);
    }
    parse_tokens(trimmed)
}

fn parse_diagram(rows: &[&str], diagram: &Regex) -> Result<Board, ParseError> {
    if rows.len() != 8 {
        return Err(ParseError::RankCount(rows.len()));
    }
    let mut board = Board::empty();
    for (idx, row) in rows.iter().enumerate() {
        let rank = 7 - idx;
        if !diagram.is_match(row) {
            return Err(ParseError::BadRank {
                rank: rank + 1,
                row: row.to_string(),
            });
        }
        for (file, letter) in row.chars().enumerate() {
            if let Some(unit) = Unit::from_letter(letter) {
                let square = Square::from_file_rank(file, rank);
                board
                    .place(square, unit)
                    .map_err(|_| ParseError::Occupied(square))?;
            }
        }
    }
    Ok(board)
}

fn parse_tokens(input: &str) -> Result<Board, ParseError> {
    let token = Regex::new(r"^([RCDHMErcdhme])([a-h][1-8])$")
        .map_err(|e| ParseError::Pattern(e.to_string()))?;
    let mut board = Board::empty();
    for part in input.split_whitespace() {
        let captures = token
            .captures(part)
            .ok_or_else(|| ParseError::BadToken(part.to_owned()))?;
        let unit = captures[1]
            .chars()
            .next()
            .and_then(Unit::from_letter)
            .ok_or_else(|| ParseError::BadToken(part.to_owned()))?;
        let square =
            Square::from_str(&captures[2]).map_err(|_| ParseError::BadToken(part.to_owned()))?;
        board
            .place(square, unit)
            .map_err(|_| ParseError::Occupied(square))?;
    }
    Ok(board)
}

impl FromStr for Board {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_board(s)
    }
}

impl Board {
    /// Diagram notation, rank 8 first, ranks separated by `/`.
    pub fn to_notation(&self) -> String {
        let mut ranks = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let row: String = (0..8)
                .map(|file| {
                    let square = Square::from_file_rank(file, rank);
                    match self.occupant(square) {
                        Some(unit) => unit.letter(),
                        None if square.is_trap() => 'x',
                        None => '.',
                    }
                })
                .collect();
            ranks.push(row);
        }
        ranks.join("/")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{piece::Piece, side::Side};

    #[test]
    fn test_diagram_round_trip() {
        let text = "\
            r.......
            ........
            ..x..x..
            ...E....
            ........
            ..x..x..
            ........
            .......R";
        let board: Board = text.parse().unwrap();
        assert_eq!(
            board.occupant(Square::A8),
            Some(Unit::new(Side::Silver, Piece::Rabbit))
        );
        assert_eq!(
            board.occupant(Square::D5),
            Some(Unit::new(Side::Gold, Piece::Elephant))
        );
        assert_eq!(board.occupant(Square::C6), None);

        let notation = board.to_notation();
        assert_eq!(notation.parse::<Board>().unwrap(), board);
        assert_eq!(notation.split('/').count(), 8);
    }

    #[test]
    fn test_tokens() {
        let board: Board = "Ed4 rc7 Ra2".parse().unwrap();
        assert_eq!(board.occupied().count_ones(), 3);
        assert_eq!(
            board.occupant(Square::C7),
            Some(Unit::new(Side::Silver, Piece::Rabbit))
        );
        assert_eq!(Board::from_str("").unwrap(), Board::empty());
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Board::from_str("Ed4 Qa1"),
            Err(ParseError::BadToken("Qa1".to_owned()))
        );
        assert_eq!(
            Board::from_str("Ed4 Ma1 rd4"),
            Err(ParseError::Occupied(Square::D4))
        );
        assert_eq!(
            Board::from_str("......../......../........"),
            Err(ParseError::RankCount(3))
        );
        let bad = "......../......../......../.....Z../......../......../......../........";
        assert!(matches!(
            Board::from_str(bad),
            Err(ParseError::BadRank { rank: 5, .. })
        ));
    }
}

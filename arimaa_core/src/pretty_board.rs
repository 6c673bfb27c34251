use colored::Colorize;
use serde::Serialize;

use crate::{board::Board, side::Side, square::Square};

/// Plain board summary, printed as JSON by the tools.
#[derive(Clone, PartialEq, Eq, Serialize, Debug)]
pub struct PrettyBoard {
    notation: String,
    gold: Vec<Square>,
    silver: Vec<Square>,
    frozen: Vec<Square>,
}

pub fn board_to_pretty_board(board: &Board) -> PrettyBoard {
    PrettyBoard {
        notation: board.to_notation(),
        gold: board.side_map(Side::Gold).all_squares(),
        silver: board.side_map(Side::Silver).all_squares(),
        frozen: board
            .occupied()
            .filter(|square| board.is_frozen(*square))
            .collect(),
    }
}

impl Board {
    pub fn print_to_console(&self) {
        for rank in (0..8).rev() {
            let mut row_str = format!("{} ", rank + 1);
            for file in 0..8 {
                let square = Square::from_file_rank(file, rank);
                let cell = match self.occupant(square) {
                    Some(unit) => {
                        let letter = format!("{}", unit.letter());
                        match unit.side {
                            Side::Gold => letter.yellow().bold(),
                            Side::Silver => letter.white().bold(),
                        }
                    }
                    None => " ".normal(),
                };
                let cell = if square.is_trap() {
                    cell.on_red()
                } else if self.is_frozen(square) {
                    cell.on_blue()
                } else if (rank + file) % 2 == 0 {
                    cell.on_black()
                } else {
                    cell.on_bright_black()
                };
                row_str = format!("{row_str}{cell}");
            }
            eprint!("{}", row_str);
            eprintln!()
        }
        eprintln!("  abcdefgh");
    }
}

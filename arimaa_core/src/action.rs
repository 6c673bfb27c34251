use std::fmt;

use arrayvec::ArrayVec;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    bitboard::BitBoard,
    board::{Board, UndoToken},
    direction::squares_to_direction,
    piece::Unit,
    side::Side,
    square::Square,
};

pub const MAX_STEPS: u8 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Step { from: Square, to: Square },
    /// Push or pull: the unit on `mid` steps to `dst`, then the unit on
    /// `src` follows into `mid`.
    Pair { src: Square, mid: Square, dst: Square },
}

impl Action {
    pub const fn cost(self) -> u8 {
        match self {
            Action::Step { .. } => 1,
            Action::Pair { .. } => 2,
        }
    }

    /// Where the unit standing on `square` before this action stands after it.
    pub const fn track(self, square: Square) -> Square {
        match self {
            Action::Step { from, to } => {
                if from as u8 == square as u8 {
                    to
                } else {
                    square
                }
            }
            Action::Pair { src, mid, dst } => {
                if mid as u8 == square as u8 {
                    dst
                } else if src as u8 == square as u8 {
                    mid
                } else {
                    square
                }
            }
        }
    }

    pub const fn moves(self, square: Square) -> bool {
        self.track(square) as u8 != square as u8
    }

    /// Squares whose occupant this action changes, captures aside.
    pub const fn footprint(self) -> BitBoard {
        match self {
            Action::Step { from, to } => BitBoard(from.to_board().0 | to.to_board().0),
            Action::Pair { src, mid, dst } => {
                BitBoard(src.to_board().0 | mid.to_board().0 | dst.to_board().0)
            }
        }
    }

    /// Standard step notation (`Ed4n`), using the unit letters of `board`
    /// before the action is applied.
    pub fn to_notation(self, board: &Board) -> String {
        let letter = |square: Square| board.occupant(square).map_or('?', Unit::letter);
        match self {
            Action::Step { from, to } => format!(
                "{}{}{}",
                letter(from),
                from,
                squares_to_direction(from, to).letter()
            ),
            Action::Pair { src, mid, dst } => format!(
                "{}{}{} {}{}{}",
                letter(mid),
                mid,
                squares_to_direction(mid, dst).letter(),
                letter(src),
                src,
                squares_to_direction(src, mid).letter()
            ),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Action::Step { from, to } => {
                write!(f, "{}{}", from, squares_to_direction(from, to).letter())
            }
            Action::Pair { src, mid, dst } => write!(
                f,
                "{}{} {}{}",
                mid,
                squares_to_direction(mid, dst).letter(),
                src,
                squares_to_direction(src, mid).letter()
            ),
        }
    }
}

/// A witnessing action sequence of at most four steps.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Witness {
    actions: ArrayVec<Action, 4>,
}

/// Final position reached by replaying a witness.
#[derive(Clone, Debug)]
pub struct Replay {
    pub board: Board,
    pub captures: Vec<(Square, Unit)>,
}

impl Witness {
    pub const fn new() -> Self {
        Self {
            actions: ArrayVec::new_const(),
        }
    }

    pub fn single(action: Action) -> Self {
        let mut result = Self::new();
        result.actions.push(action);
        result
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn steps(&self) -> u8 {
        self.actions.iter().map(|a| a.cost()).sum()
    }

    pub fn last(&self) -> Option<Action> {
        self.actions.last().copied()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn pop(&mut self) -> Option<Action> {
        self.actions.pop()
    }

    /// `action` followed by `rest`.
    pub fn load_from(action: Action, rest: &Self) -> Self {
        let mut result = Self::single(action);
        result.extend(rest);
        result
    }

    pub fn extend(&mut self, rest: &Self) {
        self.actions
            .try_extend_from_slice(&rest.actions)
            .expect("attempted to construct a witness longer than 4 actions.");
    }

    /// Where the unit on `square` ends up after the whole sequence.
    pub fn track(&self, square: Square) -> Square {
        self.actions
            .iter()
            .fold(square, |square, action| action.track(square))
    }

    /// Squares the unit on `square` occupies along the sequence, start included.
    pub fn path(&self, square: Square) -> BitBoard {
        let mut current = square;
        let mut result = square.to_board();
        for action in self.actions.iter() {
            current = action.track(current);
            result |= current.to_board();
        }
        result
    }

    /// Applies every action to a copy of `board`, checking legality for `side`.
    pub fn replay(&self, board: &Board, side: Side) -> Result<Replay, String> {
        let mut board = board.clone();
        let mut captures = Vec::new();
        for action in self.actions.iter() {
            if !board.is_legal(side, *action) {
                return Err(format!("Illegal action {} in {}", action, self));
            }
            let token: UndoToken = board.make_action(*action);
            captures.extend_from_slice(token.captures());
        }
        Ok(Replay { board, captures })
    }

    pub fn to_notation(&self, board: &Board) -> String {
        let mut board = board.clone();
        let mut parts = Vec::with_capacity(self.actions.len());
        for action in self.actions.iter() {
            parts.push(action.to_notation(&board));
            board.make_action(*action);
        }
        parts.join(" ")
    }
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.actions.is_empty() {
            return write!(f, "-");
        }
        write!(f, "{}", self.actions.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    #[test]
    fn test_track_follows_pushes_and_pulls() {
        let push = Action::Pair {
            src: Square::D4,
            mid: Square::D5,
            dst: Square::D6,
        };
        assert_eq!(push.track(Square::D5), Square::D6);
        assert_eq!(push.track(Square::D4), Square::D5);
        assert_eq!(push.track(Square::A1), Square::A1);
        assert_eq!(push.cost(), 2);
        assert!(!push.moves(Square::H8));
        assert_eq!(push.footprint().count_ones(), 3);
        assert!(push.footprint().get_bit(Square::D6));
    }

    #[test]
    fn test_witness_composition() {
        let first = Action::Step {
            from: Square::A2,
            to: Square::A3,
        };
        let second = Action::Step {
            from: Square::A3,
            to: Square::A4,
        };
        let witness = Witness::load_from(first, &Witness::single(second));
        assert_eq!(witness.steps(), 2);
        assert_eq!(witness.track(Square::A2), Square::A4);
        assert_eq!(witness.path(Square::A2).count_ones(), 3);
        assert_eq!(witness.to_string(), "a2n a3n");
    }

    #[test]
    fn test_replay_rejects_illegal_actions() {
        let mut board = Board::empty();
        board
            .place(Square::A2, Unit::new(Side::Gold, Piece::Rabbit))
            .unwrap();
        let backward = Witness::single(Action::Step {
            from: Square::A2,
            to: Square::A1,
        });
        assert!(backward.replay(&board, Side::Gold).is_err());

        let forward = Witness::single(Action::Step {
            from: Square::A2,
            to: Square::A3,
        });
        let replay = forward.replay(&board, Side::Gold).unwrap();
        assert_eq!(
            replay.board.occupant(Square::A3),
            Some(Unit::new(Side::Gold, Piece::Rabbit))
        );
        assert_eq!(forward.to_notation(&board), "Ra2n");
    }

    #[test]
    fn test_serde_witness() {
        let witness = Witness::single(Action::Pair {
            src: Square::D4,
            mid: Square::D5,
            dst: Square::E5,
        });
        let json = serde_json::to_string(&witness).unwrap();
        let parsed: Witness = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, witness);
    }
}

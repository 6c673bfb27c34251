use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};

use crate::{
    action::Action,
    board::Board,
    piece::{Piece, Unit},
    side::Side,
    square::{NUM_SQUARES, Square},
};

/// Piece mix drawn from when placing random units, weighted like a real army.
const ARMY: [Piece; 16] = [
    Piece::Rabbit,
    Piece::Rabbit,
    Piece::Rabbit,
    Piece::Rabbit,
    Piece::Rabbit,
    Piece::Rabbit,
    Piece::Rabbit,
    Piece::Rabbit,
    Piece::Cat,
    Piece::Cat,
    Piece::Dog,
    Piece::Dog,
    Piece::Horse,
    Piece::Horse,
    Piece::Camel,
    Piece::Elephant,
];

/// Random position with `units_per_side` units for each side and trap
/// captures already resolved.
pub fn get_random_board(rng: &mut impl Rng, units_per_side: usize) -> Board {
    let mut squares: Vec<usize> = (0..NUM_SQUARES).collect();
    squares.shuffle(rng);
    let mut squares = squares.into_iter();

    let mut board = Board::empty();
    for side in [Side::Gold, Side::Silver] {
        let mut army = ARMY.to_vec();
        army.shuffle(rng);
        for piece in army.into_iter().take(units_per_side.min(ARMY.len())) {
            let Some(square) = squares.next() else {
                break;
            };
            // Squares are distinct, so placing cannot collide.
            let _ = board.place(Square::from(square), Unit::new(side, piece));
        }
    }
    board.resolve_captures();
    board
}

pub fn get_random_action(board: &Board, side: Side, rng: &mut impl Rng) -> Option<Action> {
    let mut actions = Vec::with_capacity(64);
    board.gen_actions(side, 2, &mut actions);
    actions.choose(rng).copied()
}

/// Plays random actions for alternating sides starting from a random board,
/// yielding every position along the way.
pub struct BoardFuzzer<R: Rng> {
    rng: R,
    units_per_side: usize,
    actions_per_board: usize,
    remaining: usize,
    current: Option<(Board, Side, usize)>,
}

impl<R: Rng> BoardFuzzer<R> {
    pub fn new(rng: R, units_per_side: usize, num_boards: usize) -> Self {
        Self {
            rng,
            units_per_side,
            actions_per_board: 8,
            remaining: num_boards,
            current: None,
        }
    }
}

impl<R: Rng> Iterator for BoardFuzzer<R> {
    type Item = (Board, Side);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let (mut board, side, played) = match self.current.take() {
            Some(current) => current,
            None => {
                let side = if self.rng.random_bool(0.5) {
                    Side::Gold
                } else {
                    Side::Silver
                };
                (get_random_board(&mut self.rng, self.units_per_side), side, 0)
            }
        };

        let result = (board.clone(), side);
        if played + 1 < self.actions_per_board {
            if let Some(action) = get_random_action(&board, side, &mut self.rng) {
                board.make_action(action);
                self.current = Some((board, !side, played + 1));
            }
        }
        Some(result)
    }
}

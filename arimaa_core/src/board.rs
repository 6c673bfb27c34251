use std::ops::{Deref, DerefMut};

use arrayvec::ArrayVec;

use crate::{
    action::Action,
    bitboard::{BitBoard, GUARDED_TRAP, NEIGHBOR_MAP, TRAP_NEIGHBORS},
    direction::Direction,
    piece::{NUM_PIECES, Piece, Unit},
    side::Side,
    square::{NUM_SQUARES, Square, TRAP_SQUARES},
};

/*
 * Square indexing, rank 8 on top:
 * 56 57 58 59 60 61 62 63
 * ...
 * 16 17 18 19 20 21 22 23   <- c3 = 18, f3 = 21
 * 8  9  10 11 12 13 14 15
 * 0  1  2  3  4  5  6  7
 *
 * Gold starts on ranks 1-2 and moves north, silver the opposite.
 */
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Board {
    squares: [Option<Unit>; NUM_SQUARES],
    pieces: [[BitBoard; NUM_PIECES]; 2],
    side_map: [BitBoard; 2],
    occupied: BitBoard,
    // guards[side][trap] = units of `side` adjacent to TRAP_SQUARES[trap]
    guards: [[u8; 4]; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

/// Everything needed to reverse one action: prior occupants of every touched
/// square in the order they were changed.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct UndoToken {
    touched: ArrayVec<(Square, Option<Unit>), 6>,
    captures: ArrayVec<(Square, Unit), 2>,
}

impl UndoToken {
    /// Units removed by trap captures while applying the action.
    pub fn captures(&self) -> &[(Square, Unit)] {
        &self.captures
    }

    /// Every square whose occupant changed, captures included.
    pub fn touched(&self) -> BitBoard {
        self.touched
            .iter()
            .fold(BitBoard::EMPTY, |acc, (sq, _)| acc | BitBoard::as_mask(*sq))
    }

    pub fn captured_at(&self, square: Square, side: Side) -> Option<Unit> {
        self.captures
            .iter()
            .find(|(sq, unit)| *sq == square && unit.side == side)
            .map(|(_, unit)| *unit)
    }
}

/// An applied action that is undone when dropped.
///
/// Nested actions borrow the guard mutably, so undo order always mirrors
/// apply order.
pub struct Scoped<'a> {
    board: &'a mut Board,
    token: UndoToken,
}

impl Scoped<'_> {
    pub fn token(&self) -> &UndoToken {
        &self.token
    }
}

impl Deref for Scoped<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Scoped<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Scoped<'_> {
    fn drop(&mut self) {
        self.board.unmake(&self.token);
    }
}

impl Board {
    pub const fn empty() -> Self {
        Self {
            squares: [None; NUM_SQUARES],
            pieces: [[BitBoard::EMPTY; NUM_PIECES]; 2],
            side_map: [BitBoard::EMPTY; 2],
            occupied: BitBoard::EMPTY,
            guards: [[0; 4]; 2],
        }
    }

    pub fn occupant(&self, square: Square) -> Option<Unit> {
        self.squares[square as usize]
    }

    pub fn piece_map(&self, side: Side, piece: Piece) -> BitBoard {
        self.pieces[side as usize][piece as usize]
    }

    pub fn rabbits(&self, side: Side) -> BitBoard {
        self.piece_map(side, Piece::Rabbit)
    }

    pub fn side_map(&self, side: Side) -> BitBoard {
        self.side_map[side as usize]
    }

    pub fn occupied(&self) -> BitBoard {
        self.occupied
    }

    pub fn empty_squares(&self) -> BitBoard {
        !self.occupied
    }

    /// Units of `side` adjacent to `TRAP_SQUARES[trap]`.
    pub fn guards(&self, side: Side, trap: usize) -> u8 {
        self.guards[side as usize][trap]
    }

    /// Units of `side` strictly stronger than `piece`.
    pub fn stronger_than(&self, side: Side, piece: Piece) -> BitBoard {
        let mut result = BitBoard::EMPTY;
        for stronger in (piece as usize + 1)..NUM_PIECES {
            result |= self.pieces[side as usize][stronger];
        }
        result
    }

    /// Units of `side` strictly weaker than `piece`.
    pub fn weaker_than(&self, side: Side, piece: Piece) -> BitBoard {
        let mut result = BitBoard::EMPTY;
        for weaker in 0..piece as usize {
            result |= self.pieces[side as usize][weaker];
        }
        result
    }

    /// Places a unit on an empty square. Traps are not resolved.
    pub fn place(&mut self, square: Square, unit: Unit) -> Result<(), String> {
        if let Some(existing) = self.occupant(square) {
            return Err(format!(
                "Cannot place {} on {}: occupied by {}",
                unit.letter(),
                square,
                existing.letter()
            ));
        }
        self.put(square, unit);
        Ok(())
    }

    /// Removes every trap occupant without a same-side guard.
    pub fn resolve_captures(&mut self) -> Vec<(Square, Unit)> {
        let mut removed = Vec::new();
        for (trap_idx, trap) in TRAP_SQUARES.iter().enumerate() {
            if let Some(unit) = self.occupant(*trap) {
                if self.guards(unit.side, trap_idx) == 0 {
                    self.take(*trap);
                    removed.push((*trap, unit));
                }
            }
        }
        removed
    }

    fn put(&mut self, square: Square, unit: Unit) {
        debug_assert!(self.squares[square as usize].is_none());
        let mask = BitBoard::as_mask(square);
        self.squares[square as usize] = Some(unit);
        self.pieces[unit.side as usize][unit.piece as usize] |= mask;
        self.side_map[unit.side as usize] |= mask;
        self.occupied |= mask;
        if let Some(trap) = GUARDED_TRAP[square as usize] {
            self.guards[unit.side as usize][trap] += 1;
        }
    }

    fn take(&mut self, square: Square) -> Unit {
        let unit = self.squares[square as usize]
            .take()
            .unwrap_or_else(|| panic!("No unit to take from {}", square));
        let mask = BitBoard::as_mask(square);
        self.pieces[unit.side as usize][unit.piece as usize] ^= mask;
        self.side_map[unit.side as usize] ^= mask;
        self.occupied ^= mask;
        if let Some(trap) = GUARDED_TRAP[square as usize] {
            self.guards[unit.side as usize][trap] -= 1;
        }
        unit
    }

    fn set(&mut self, square: Square, unit: Option<Unit>) {
        if self.squares[square as usize].is_some() {
            self.take(square);
        }
        if let Some(unit) = unit {
            self.put(square, unit);
        }
    }

    /// Single step with trap resolution, recorded into `token`.
    fn step_into(&mut self, token: &mut UndoToken, from: Square, to: Square) {
        let unit = self.take(from);
        token.touched.push((from, Some(unit)));
        token.touched.push((to, None));
        self.put(to, unit);

        if let Some(trap) = to.trap_index() {
            if self.guards[unit.side as usize][trap] == 0 {
                token.touched.push((to, Some(unit)));
                token.captures.push((to, unit));
                self.take(to);
            }
        }

        if let Some(trap) = GUARDED_TRAP[from as usize] {
            let trap_square = TRAP_SQUARES[trap];
            if let Some(victim) = self.occupant(trap_square) {
                if victim.side == unit.side && self.guards[unit.side as usize][trap] == 0 {
                    token.touched.push((trap_square, Some(victim)));
                    token.captures.push((trap_square, victim));
                    self.take(trap_square);
                }
            }
        }
    }

    pub fn make_step(&mut self, from: Square, to: Square) -> UndoToken {
        let mut token = UndoToken::default();
        self.step_into(&mut token, from, to);
        token
    }

    /// Push or pull: the unit on `mid` steps to `dst`, then the unit on
    /// `src` follows into `mid`.
    pub fn make_pair(&mut self, src: Square, mid: Square, dst: Square) -> UndoToken {
        let mut token = UndoToken::default();
        self.step_into(&mut token, mid, dst);
        self.step_into(&mut token, src, mid);
        token
    }

    pub fn make_action(&mut self, action: Action) -> UndoToken {
        match action {
            Action::Step { from, to } => self.make_step(from, to),
            Action::Pair { src, mid, dst } => self.make_pair(src, mid, dst),
        }
    }

    pub fn unmake(&mut self, token: &UndoToken) {
        for (square, unit) in token.touched.iter().rev() {
            self.set(*square, *unit);
        }
    }

    /// Applies `action` until the returned guard is dropped.
    pub fn apply(&mut self, action: Action) -> Scoped<'_> {
        let token = self.make_action(action);
        Scoped { board: self, token }
    }

    pub fn is_frozen(&self, square: Square) -> bool {
        let Some(unit) = self.occupant(square) else {
            return false;
        };
        let neighbors = NEIGHBOR_MAP[square as usize];
        (neighbors & self.side_map(unit.side)).is_empty()
            && (neighbors & self.stronger_than(!unit.side, unit.piece)).is_not_empty()
    }

    /// Frozen status of the unit on `square` if `vacated` were empty and
    /// `friend` held a friendly unit.
    pub fn is_frozen_with(&self, square: Square, vacated: BitBoard, friend: BitBoard) -> bool {
        let Some(unit) = self.occupant(square) else {
            return false;
        };
        let neighbors = NEIGHBOR_MAP[square as usize];
        let friends = (self.side_map(unit.side) & !vacated) | friend;
        let enemies = self.stronger_than(!unit.side, unit.piece) & !vacated & !friend;
        (neighbors & friends).is_empty() && (neighbors & enemies).is_not_empty()
    }

    /// Whether a `side` unit standing on `trap` would survive there, not
    /// counting a guard on `ignoring`.
    pub fn is_trap_safe(&self, side: Side, trap: Square, ignoring: BitBoard) -> bool {
        let Some(idx) = trap.trap_index() else {
            return true;
        };
        (TRAP_NEIGHBORS[idx] & self.side_map(side) & !ignoring).is_not_empty()
    }

    /// Squares the unit on `square` could step to, ignoring freezing.
    pub fn step_targets(&self, square: Square) -> BitBoard {
        let Some(unit) = self.occupant(square) else {
            return BitBoard::EMPTY;
        };
        let mut targets = NEIGHBOR_MAP[square as usize] & self.empty_squares();
        if unit.piece == Piece::Rabbit {
            let backward = Direction::forward(unit.side).opposite();
            targets &= !BitBoard::as_mask(square).shift(backward);
        }
        targets
    }

    /// Every legal action for `side` costing at most `max_steps`.
    pub fn gen_actions(&self, side: Side, max_steps: u8, out: &mut Vec<Action>) {
        self.gen_actions_from(side, max_steps, BitBoard::FULL, out);
    }

    /// Legal actions for `side` whose moving friendly unit stands in `movers`.
    pub fn gen_actions_from(
        &self,
        side: Side,
        max_steps: u8,
        movers: BitBoard,
        out: &mut Vec<Action>,
    ) {
        if max_steps == 0 {
            return;
        }
        for from in self.side_map(side) & movers {
            if self.is_frozen(from) {
                continue;
            }
            for to in self.step_targets(from) {
                out.push(Action::Step { from, to });
            }

            let Some(unit) = self.occupant(from) else {
                continue;
            };
            if max_steps < 2 || unit.piece == Piece::Rabbit {
                continue;
            }

            let free = NEIGHBOR_MAP[from as usize] & self.empty_squares();
            let victims = NEIGHBOR_MAP[from as usize] & self.weaker_than(!side, unit.piece);
            for victim in victims {
                for dst in NEIGHBOR_MAP[victim as usize] & self.empty_squares() {
                    out.push(Action::Pair {
                        src: from,
                        mid: victim,
                        dst,
                    });
                }
                for dst in free {
                    out.push(Action::Pair {
                        src: victim,
                        mid: from,
                        dst,
                    });
                }
            }
        }
    }

    /// Pushes and pulls by `side` that move the opponent unit on `victim`.
    pub fn gen_pairs_on(&self, side: Side, victim: Square, out: &mut Vec<Action>) {
        let Some(target) = self.occupant(victim) else {
            return;
        };
        if target.side == side {
            return;
        }
        let pushers = NEIGHBOR_MAP[victim as usize] & self.stronger_than(side, target.piece);
        for from in pushers {
            if self.is_frozen(from) {
                continue;
            }
            for dst in NEIGHBOR_MAP[victim as usize] & self.empty_squares() {
                out.push(Action::Pair {
                    src: from,
                    mid: victim,
                    dst,
                });
            }
            for dst in NEIGHBOR_MAP[from as usize] & self.empty_squares() {
                out.push(Action::Pair {
                    src: victim,
                    mid: from,
                    dst,
                });
            }
        }
    }

    pub fn is_legal(&self, side: Side, action: Action) -> bool {
        let mut actions = Vec::with_capacity(64);
        self.gen_actions(side, action.cost(), &mut actions);
        actions.contains(&action)
    }

    /// Ranks the unit on `square` still has to travel to `side`'s goal.
    pub fn goal_distance(side: Side, square: Square) -> u8 {
        side.rank_distance(square.rank()) as u8
    }

    pub fn validation_err(&self) -> Result<(), String> {
        let mut union = BitBoard::EMPTY;
        for side in [Side::Gold, Side::Silver] {
            let mut side_union = BitBoard::EMPTY;
            for piece in Piece::ALL {
                let map = self.piece_map(side, piece);
                if (map & union).is_not_empty() {
                    return Err(format!("{} {} overlaps another bitboard", side, piece));
                }
                union |= map;
                side_union |= map;
                for square in map {
                    if self.occupant(square) != Some(Unit::new(side, piece)) {
                        return Err(format!(
                            "Square {} disagrees with the {} {} bitboard",
                            square, side, piece
                        ));
                    }
                }
            }
            if side_union != self.side_map(side) {
                return Err(format!("{} side map is out of sync", side));
            }
            for (trap, neighbors) in TRAP_NEIGHBORS.iter().enumerate() {
                let count = (*neighbors & side_union).count_ones() as u8;
                if count != self.guards(side, trap) {
                    return Err(format!(
                        "{} guard count for {} is {} but should be {}",
                        side,
                        TRAP_SQUARES[trap],
                        self.guards(side, trap),
                        count
                    ));
                }
            }
        }
        if union != self.occupied {
            return Err("Occupancy map is out of sync".to_owned());
        }
        for (idx, occupant) in self.squares.iter().enumerate() {
            if occupant.is_some() != union.get_bit(Square::from(idx)) {
                return Err(format!("Square {} has no matching bitboard", Square::from(idx)));
            }
        }
        Ok(())
    }

    /// Mirror ranks and swap colours; the result is the same position seen
    /// from the other side.
    pub fn flip_sides(&self) -> Board {
        let mut result = Board::empty();
        for (idx, occupant) in self.squares.iter().enumerate() {
            if let Some(unit) = occupant {
                let square = Square::from(idx).flip_vertical();
                result.put(square, Unit::new(!unit.side, unit.piece));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold(piece: Piece) -> Unit {
        Unit::new(Side::Gold, piece)
    }

    fn silver(piece: Piece) -> Unit {
        Unit::new(Side::Silver, piece)
    }

    #[test]
    fn test_step_and_undo_restore_board() {
        let mut board = Board::empty();
        board.place(Square::D4, gold(Piece::Dog)).unwrap();
        let before = board.clone();

        let token = board.make_step(Square::D4, Square::D5);
        assert_eq!(board.occupant(Square::D5), Some(gold(Piece::Dog)));
        assert_eq!(board.occupant(Square::D4), None);
        board.validation_err().unwrap();

        board.unmake(&token);
        assert_eq!(board, before);
    }

    #[test]
    fn test_step_onto_unguarded_trap_captures() {
        let mut board = Board::empty();
        board.place(Square::C4, gold(Piece::Cat)).unwrap();
        let before = board.clone();

        {
            let scoped = board.apply(Action::Step {
                from: Square::C4,
                to: Square::C3,
            });
            assert_eq!(scoped.occupant(Square::C3), None);
            assert_eq!(scoped.token().captures(), &[(Square::C3, gold(Piece::Cat))]);
            scoped.validation_err().unwrap();
        }

        assert_eq!(board, before);
    }

    #[test]
    fn test_leaving_guard_captures_trap_occupant() {
        let mut board = Board::empty();
        board.place(Square::F3, gold(Piece::Horse)).unwrap();
        board.place(Square::F2, gold(Piece::Rabbit)).unwrap();
        let before = board.clone();

        let token = board.make_step(Square::F2, Square::E2);
        assert_eq!(board.occupant(Square::F3), None);
        assert_eq!(token.captures(), &[(Square::F3, gold(Piece::Horse))]);
        board.validation_err().unwrap();

        board.unmake(&token);
        assert_eq!(board, before);
    }

    #[test]
    fn test_push_and_pull() {
        let mut board = Board::empty();
        board.place(Square::D4, gold(Piece::Elephant)).unwrap();
        board.place(Square::D5, silver(Piece::Camel)).unwrap();
        let before = board.clone();

        let mut actions = Vec::new();
        board.gen_actions(Side::Gold, 4, &mut actions);
        let push = Action::Pair {
            src: Square::D4,
            mid: Square::D5,
            dst: Square::D6,
        };
        let pull = Action::Pair {
            src: Square::D5,
            mid: Square::D4,
            dst: Square::D3,
        };
        assert!(actions.contains(&push));
        assert!(actions.contains(&pull));

        {
            let scoped = board.apply(push);
            assert_eq!(scoped.occupant(Square::D6), Some(silver(Piece::Camel)));
            assert_eq!(scoped.occupant(Square::D5), Some(gold(Piece::Elephant)));
        }
        {
            let scoped = board.apply(pull);
            assert_eq!(scoped.occupant(Square::D3), Some(gold(Piece::Elephant)));
            assert_eq!(scoped.occupant(Square::D4), Some(silver(Piece::Camel)));
        }
        assert_eq!(board, before);
    }

    #[test]
    fn test_push_into_trap_captures_victim() {
        let mut board = Board::empty();
        board.place(Square::C5, gold(Piece::Elephant)).unwrap();
        board.place(Square::C4, silver(Piece::Dog)).unwrap();
        let before = board.clone();

        let token = board.make_pair(Square::C5, Square::C4, Square::C3);
        assert_eq!(token.captures(), &[(Square::C3, silver(Piece::Dog))]);
        assert_eq!(token.captured_at(Square::C3, Side::Silver), Some(silver(Piece::Dog)));
        assert_eq!(board.occupant(Square::C4), Some(gold(Piece::Elephant)));
        board.validation_err().unwrap();

        board.unmake(&token);
        assert_eq!(board, before);
    }

    #[test]
    fn test_pull_completes_after_puller_is_captured() {
        let mut board = Board::empty();
        board.place(Square::C4, gold(Piece::Cat)).unwrap();
        board.place(Square::C5, silver(Piece::Rabbit)).unwrap();
        let before = board.clone();

        let pull = Action::Pair {
            src: Square::C5,
            mid: Square::C4,
            dst: Square::C3,
        };
        assert!(board.is_legal(Side::Gold, pull));
        {
            let scoped = board.apply(pull);
            assert_eq!(scoped.token().captures(), &[(Square::C3, gold(Piece::Cat))]);
            assert_eq!(scoped.occupant(Square::C4), Some(silver(Piece::Rabbit)));
            assert_eq!(scoped.occupant(Square::C3), None);
            scoped.validation_err().unwrap();
        }
        assert_eq!(board, before);
    }

    #[test]
    fn test_frozen() {
        let mut board = Board::empty();
        board.place(Square::D4, gold(Piece::Rabbit)).unwrap();
        board.place(Square::D5, silver(Piece::Cat)).unwrap();
        assert!(board.is_frozen(Square::D4));
        assert!(!board.is_frozen(Square::D5));
        assert!(!board.is_frozen_with(
            Square::D4,
            BitBoard::EMPTY,
            BitBoard::as_mask(Square::C4)
        ));
        assert!(!board.is_frozen_with(
            Square::D4,
            BitBoard::as_mask(Square::D5),
            BitBoard::EMPTY
        ));

        board.place(Square::E4, gold(Piece::Rabbit)).unwrap();
        assert!(!board.is_frozen(Square::D4));

        let mut actions = Vec::new();
        board.gen_actions(Side::Gold, 1, &mut actions);
        assert!(actions.contains(&Action::Step {
            from: Square::D4,
            to: Square::C4
        }));
        // rabbits never step backward on their own
        assert!(!actions.contains(&Action::Step {
            from: Square::D4,
            to: Square::D3
        }));

        assert!(!board.is_trap_safe(Side::Gold, Square::C3, BitBoard::EMPTY));
        board.place(Square::C4, gold(Piece::Cat)).unwrap();
        assert!(board.is_trap_safe(Side::Gold, Square::C3, BitBoard::EMPTY));
        assert!(!board.is_trap_safe(Side::Gold, Square::C3, BitBoard::as_mask(Square::C4)));
        assert!(!board.is_trap_safe(Side::Silver, Square::C3, BitBoard::EMPTY));
    }

    #[test]
    fn test_flip_sides_keeps_invariants() {
        let mut board = Board::empty();
        board.place(Square::C3, gold(Piece::Rabbit)).unwrap();
        board.place(Square::C2, gold(Piece::Cat)).unwrap();
        board.place(Square::H8, silver(Piece::Elephant)).unwrap();
        let flipped = board.flip_sides();
        flipped.validation_err().unwrap();
        assert_eq!(flipped.occupant(Square::C6), Some(silver(Piece::Rabbit)));
        assert_eq!(flipped.occupant(Square::H1), Some(gold(Piece::Elephant)));
        assert_eq!(flipped.flip_sides(), board);
    }
}

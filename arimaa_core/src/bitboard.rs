use std::fmt;

use const_for::const_for;

use crate::{
    direction::Direction,
    square::{NUM_SQUARES, Square, TRAP_SQUARES},
};

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Hash)]
pub struct BitBoard(pub u64);

impl Ord for BitBoard {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for BitBoard {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Idea for ops implementation is from https://github.com/analog-hors/tantabus
/// Implement math standard operations
macro_rules! impl_math_ops {
    ($($trait:ident::$fn:ident),*) => {
        $(impl std::ops::$trait for BitBoard {
            type Output = Self;

            fn $fn(self, other: Self) -> Self::Output {
                Self(std::ops::$trait::$fn(self.0, other.0))
            }
        })*
    };
}

impl_math_ops! {
    BitAnd::bitand,
    BitOr::bitor,
    BitXor::bitxor
}

/// Implement math assignment operations
macro_rules! impl_math_assign_ops {
    ($($trait:ident::$fn:ident),*) => {
        $(impl std::ops::$trait for BitBoard {

            fn $fn(&mut self, other: Self) {
                std::ops::$trait::$fn(&mut self.0, other.0)
            }
        })*
    };
}

impl_math_assign_ops! {
    BitAndAssign::bitand_assign,
    BitOrAssign::bitor_assign,
    BitXorAssign::bitxor_assign
}

impl std::ops::Not for BitBoard {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.bit_not()
    }
}

impl fmt::Display for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = format!("\n      Bitboard: {:#018x}\n", self.0);

        for rank in (0..8).rev() {
            s.push_str(format!("\n{}   ", rank + 1).as_str());
            for file in 0..8 {
                if self.get_bit(Square::from_file_rank(file, rank)) {
                    s.push_str("X ");
                } else {
                    s.push_str("- ");
                }
            }
        }
        s.push_str("\n\n    a b c d e f g h");
        write!(f, "{s}")
    }
}

impl BitBoard {
    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(u64::MAX);

    pub const FILE_A: Self = Self(0x0101_0101_0101_0101);
    pub const FILE_H: Self = Self(0x8080_8080_8080_8080);
    pub const NOT_FILE_A: Self = Self(!Self::FILE_A.0);
    pub const NOT_FILE_H: Self = Self(!Self::FILE_H.0);

    pub const TRAPS: Self = Self(
        (1 << Square::C3 as u8)
            | (1 << Square::F3 as u8)
            | (1 << Square::C6 as u8)
            | (1 << Square::F6 as u8),
    );

    pub const fn as_mask(square: Square) -> Self {
        Self(1u64 << square as u8)
    }

    pub const fn rank_mask(rank: usize) -> Self {
        Self(0xff << (8 * rank))
    }

    pub const fn file_mask(file: usize) -> Self {
        Self(Self::FILE_A.0 << file)
    }

    pub const fn get_bit(self, square: Square) -> bool {
        self.0 & (1 << square as u8) != 0
    }

    pub const fn set_bit(self, square: Square) -> Self {
        Self(self.0 | 1 << square as u8)
    }

    pub const fn clear_bit(self, square: Square) -> Self {
        Self(self.0 & !(1 << square as u8))
    }

    pub const fn toggle_bit(self, square: Square) -> Self {
        Self(self.0 ^ 1 << square as u8)
    }

    pub const fn lsb(self) -> Square {
        Square::const_from_u8(self.0.trailing_zeros() as u8)
    }

    /// Removes and returns the lowest set square. The board must be non-empty.
    pub fn pop_lsb(&mut self) -> Square {
        debug_assert!(self.is_not_empty());
        let sq = self.lsb();
        self.0 &= self.0 - 1;
        sq
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    pub const fn count_ones(self) -> u32 {
        self.0.count_ones()
    }

    pub fn all_squares(&self) -> Vec<Square> {
        let mut res = Vec::with_capacity(self.count_ones() as usize);
        for square in *self {
            res.push(square);
        }
        res
    }

    pub const fn shift_north(self) -> Self {
        Self(self.0 << 8)
    }

    pub const fn shift_south(self) -> Self {
        Self(self.0 >> 8)
    }

    pub const fn shift_east(self) -> Self {
        Self((self.0 & Self::NOT_FILE_H.0) << 1)
    }

    pub const fn shift_west(self) -> Self {
        Self((self.0 & Self::NOT_FILE_A.0) >> 1)
    }

    pub const fn shift(self, direction: Direction) -> Self {
        match direction {
            Direction::North => self.shift_north(),
            Direction::East => self.shift_east(),
            Direction::South => self.shift_south(),
            Direction::West => self.shift_west(),
        }
    }

    /// Every square orthogonally adjacent to some square of `self`.
    pub const fn adjacent(self) -> Self {
        Self(self.adjacent_vertical().0 | self.adjacent_horizontal().0)
    }

    pub const fn adjacent_vertical(self) -> Self {
        Self(self.shift_north().0 | self.shift_south().0)
    }

    pub const fn adjacent_horizontal(self) -> Self {
        Self(self.shift_east().0 | self.shift_west().0)
    }

    /// `self` grown by one square in every direction.
    pub const fn expand(self) -> Self {
        Self(self.0 | self.adjacent().0)
    }

    /// Squares at most `radius` orthogonal steps from `square`.
    pub const fn within(square: Square, radius: u8) -> Self {
        let mut result = Self::as_mask(square);
        let mut i = 0;
        while i < radius {
            result = result.expand();
            i += 1;
        }
        result
    }

    /// Mirror ranks: a1 <-> a8.
    pub const fn flip_vertical(self) -> Self {
        Self(self.0.swap_bytes())
    }

    /// Mirror files: a1 <-> h1.
    pub const fn flip_horizontal(self) -> Self {
        const K1: u64 = 0x5555_5555_5555_5555;
        const K2: u64 = 0x3333_3333_3333_3333;
        const K4: u64 = 0x0f0f_0f0f_0f0f_0f0f;
        let mut x = self.0;
        x = ((x >> 1) & K1) | ((x & K1) << 1);
        x = ((x >> 2) & K2) | ((x & K2) << 2);
        x = ((x >> 4) & K4) | ((x & K4) << 4);
        Self(x)
    }

    // const bit operations, since the trait is non-const
    pub const fn bit_and(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn bit_or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn bit_not(self) -> Self {
        Self(!self.0)
    }
}

impl Iterator for BitBoard {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if *self == Self::EMPTY {
            None
        } else {
            Some(self.pop_lsb())
        }
    }
}

pub const NEIGHBOR_MAP: [BitBoard; NUM_SQUARES] = {
    let mut result = [BitBoard::EMPTY; NUM_SQUARES];
    const_for!(sq in 0..64 => {
        result[sq as usize] = BitBoard(1u64 << sq).adjacent();
    });
    result
};

pub const TRAP_NEIGHBORS: [BitBoard; 4] = {
    let mut result = [BitBoard::EMPTY; 4];
    const_for!(i in 0..4 => {
        result[i] = NEIGHBOR_MAP[TRAP_SQUARES[i] as usize];
    });
    result
};

/// For each square, the index of the trap it guards, if any.
pub const GUARDED_TRAP: [Option<usize>; NUM_SQUARES] = {
    let mut result = [None; NUM_SQUARES];
    const_for!(i in 0..4 => {
        let mut neighbors = TRAP_NEIGHBORS[i].0;
        while neighbors != 0 {
            let sq = neighbors.trailing_zeros() as usize;
            result[sq] = Some(i);
            neighbors &= neighbors - 1;
        }
    });
    result
};

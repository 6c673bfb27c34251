use std::{fmt, str::FromStr};

use crate::bitboard::BitBoard;
use crate::direction::Direction;
use crate::transmute_enum;

#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, EnumIter)]
#[rustfmt::skip]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}
use serde::{Deserialize, Serialize};
use strum::EnumIter;

pub const NUM_SQUARES: usize = 64;

pub const TRAP_SQUARES: [Square; 4] = [Square::C3, Square::F3, Square::C6, Square::F6];

impl Square {
    pub const COUNT: usize = NUM_SQUARES;

    pub const fn const_from_u8(index: u8) -> Square {
        debug_assert!(index < 64);
        transmute_enum!(index)
    }

    pub const fn from_file_rank(file: usize, rank: usize) -> Square {
        transmute_enum!((file + 8 * rank) as u8)
    }

    pub const fn file(self) -> usize {
        self as usize & 7
    }

    pub const fn rank(self) -> usize {
        self as usize >> 3
    }

    pub const fn to_board(self) -> BitBoard {
        BitBoard(1u64 << self as u8)
    }

    /// Neighbouring square in `direction`, or `None` off the edge.
    pub const fn offset(self, direction: Direction) -> Option<Square> {
        let file = self.file() as i32 + direction.file_delta();
        let rank = self.rank() as i32 + direction.rank_delta();
        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            None
        } else {
            Some(Square::from_file_rank(file as usize, rank as usize))
        }
    }

    pub const fn manhattan(self, other: Square) -> usize {
        self.file().abs_diff(other.file()) + self.rank().abs_diff(other.rank())
    }

    pub const fn chebyshev(self, other: Square) -> usize {
        let df = self.file().abs_diff(other.file());
        let dr = self.rank().abs_diff(other.rank());
        if df > dr { df } else { dr }
    }

    pub const fn is_trap(self) -> bool {
        matches!(self, Square::C3 | Square::F3 | Square::C6 | Square::F6)
    }

    /// Index into `TRAP_SQUARES` for a trap square.
    pub const fn trap_index(self) -> Option<usize> {
        match self {
            Square::C3 => Some(0),
            Square::F3 => Some(1),
            Square::C6 => Some(2),
            Square::F6 => Some(3),
            _ => None,
        }
    }

    /// Closest trap by manhattan distance. Each quadrant owns exactly one trap.
    pub const fn nearest_trap(self) -> Square {
        match (self.file() >= 4, self.rank() >= 4) {
            (false, false) => Square::C3,
            (true, false) => Square::F3,
            (false, true) => Square::C6,
            (true, true) => Square::F6,
        }
    }

    pub const fn flip_vertical(self) -> Square {
        transmute_enum!(self as u8 ^ 56)
    }

    pub const fn flip_horizontal(self) -> Square {
        transmute_enum!(self as u8 ^ 7)
    }

    #[rustfmt::skip]
    const STR: [&str; Self::COUNT] = [
        "a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1",
        "a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2",
        "a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3",
        "a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4",
        "a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5",
        "a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6",
        "a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7",
        "a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8",
    ];
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::STR[*self as usize])
    }
}

impl FromStr for Square {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(pos) = s.parse::<usize>() {
            if pos < Self::COUNT {
                return Ok(Square::from(pos));
            }
        }

        if s.len() != 2 {
            return Err("Invalid square!");
        };

        let index = Self::STR
            .iter()
            .position(|&tgt| tgt == s.to_lowercase())
            .ok_or("Invalid square!")?;

        Ok(Square::from(index))
    }
}

impl From<usize> for Square {
    fn from(index: usize) -> Self {
        transmute_enum!(index as u8)
    }
}

impl From<u8> for Square {
    fn from(index: u8) -> Self {
        transmute_enum!(index)
    }
}

impl Serialize for Square {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Square::from_str(&s).map_err(serde::de::Error::custom)
    }
}

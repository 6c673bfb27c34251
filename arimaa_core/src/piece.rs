use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{side::Side, transmute_enum};

#[repr(u8)]
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    Rabbit,
    Cat,
    Dog,
    Horse,
    Camel,
    Elephant,
}

pub const NUM_PIECES: usize = 6;

impl Piece {
    pub const ALL: [Piece; NUM_PIECES] = [
        Piece::Rabbit,
        Piece::Cat,
        Piece::Dog,
        Piece::Horse,
        Piece::Camel,
        Piece::Elephant,
    ];

    pub const fn from_u8(value: u8) -> Piece {
        debug_assert!(value < NUM_PIECES as u8);
        transmute_enum!(value)
    }

    /// Gold letter; silver uses the lowercase form.
    pub const fn letter(self) -> char {
        match self {
            Piece::Rabbit => 'R',
            Piece::Cat => 'C',
            Piece::Dog => 'D',
            Piece::Horse => 'H',
            Piece::Camel => 'M',
            Piece::Elephant => 'E',
        }
    }

    pub const fn from_letter(letter: char) -> Option<Piece> {
        match letter.to_ascii_uppercase() {
            'R' => Some(Piece::Rabbit),
            'C' => Some(Piece::Cat),
            'D' => Some(Piece::Dog),
            'H' => Some(Piece::Horse),
            'M' => Some(Piece::Camel),
            'E' => Some(Piece::Elephant),
            _ => None,
        }
    }
}

/// A piece together with its owner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Unit {
    pub side: Side,
    pub piece: Piece,
}

impl Unit {
    pub const fn new(side: Side, piece: Piece) -> Self {
        Self { side, piece }
    }

    pub const fn letter(self) -> char {
        let letter = self.piece.letter();
        match self.side {
            Side::Gold => letter,
            Side::Silver => letter.to_ascii_lowercase(),
        }
    }

    pub const fn from_letter(letter: char) -> Option<Unit> {
        let Some(piece) = Piece::from_letter(letter) else {
            return None;
        };
        let side = if letter.is_ascii_uppercase() {
            Side::Gold
        } else {
            Side::Silver
        };
        Some(Unit::new(side, piece))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_strength_order() {
        assert!(Piece::Elephant > Piece::Camel);
        assert!(Piece::Cat > Piece::Rabbit);
        assert_eq!(Piece::from_u8(3), Piece::Horse);
    }

    #[test]
    fn test_letters() {
        for piece in Piece::ALL {
            let gold = Unit::new(Side::Gold, piece);
            let silver = Unit::new(Side::Silver, piece);
            assert_eq!(Unit::from_letter(gold.letter()), Some(gold));
            assert_eq!(Unit::from_letter(silver.letter()), Some(silver));
        }
        assert_eq!(Unit::from_letter('x'), None);
        assert_eq!(Piece::from_str("camel"), Ok(Piece::Camel));
    }
}

use crate::{side::Side, square::Square};

#[repr(u8)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn file_delta(self) -> i32 {
        match self {
            Direction::East => 1,
            Direction::West => -1,
            _ => 0,
        }
    }

    pub const fn rank_delta(self) -> i32 {
        match self {
            Direction::North => 1,
            Direction::South => -1,
            _ => 0,
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Direction toward `side`'s goal rank.
    pub const fn forward(side: Side) -> Direction {
        match side {
            Side::Gold => Direction::North,
            Side::Silver => Direction::South,
        }
    }

    /// Single letter used in step notation.
    pub const fn letter(self) -> char {
        match self {
            Direction::North => 'n',
            Direction::East => 'e',
            Direction::South => 's',
            Direction::West => 'w',
        }
    }
}

pub fn squares_to_direction(start: Square, end: Square) -> Direction {
    let delta = end as i32 - start as i32;

    match delta {
        8 => Direction::North,
        1 => Direction::East,
        -8 => Direction::South,
        -1 => Direction::West,
        _ => panic!("Squares are not adjacent: {} {}", start, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_round_trip() {
        for direction in Direction::ALL {
            let there = Square::D4.offset(direction).unwrap();
            assert_eq!(squares_to_direction(Square::D4, there), direction);
            assert_eq!(there.offset(direction.opposite()), Some(Square::D4));
        }
    }
}

pub mod action;
pub mod bitboard;
pub mod board;
pub mod capture;
pub mod consistency_checker;
pub mod direction;
pub mod elim;
pub mod goal;
pub mod notation;
pub mod piece;
pub mod pretty_board;
pub mod random_utils;
pub mod retro;
pub mod side;
pub mod square;
pub mod tactics;

/// Macro used to transmute enums to their binary representation.
/// This is needed to make most enum functions compile-time constants (c++ constexpr).
///
/// ```text
///     x  --> enum value in correct binary representation
///   mask --> bitmask to get only the relevant bits for the representation
/// ```
///
/// UB: as long as the enum in use is #[repr(mask)] this cannot fail
macro_rules! transmute_enum_masked {
    ($x:expr, $mask:expr) => {
        unsafe { std::mem::transmute($x & $mask) }
    };
}

macro_rules! transmute_enum {
    ($x:expr) => {
        unsafe { std::mem::transmute($x) }
    };
}

pub(crate) use transmute_enum_masked;
pub(crate) use transmute_enum;

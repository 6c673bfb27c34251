use crate::{
    action::{MAX_STEPS, Witness},
    bitboard::TRAP_NEIGHBORS,
    board::Board,
    capture::{INCLUDE_HINTS, capture_value, find_capture, gen_caps},
    piece::{Piece, Unit},
    side::Side,
    square::{Square, TRAP_SQUARES},
};

/// Fewest steps `!side` needs to capture the `side` unit on `square` on
/// `trap`: two per square it is dragged, two per other guard chased off.
fn trap_cost(board: &Board, side: Side, square: Square, idx: usize) -> u8 {
    let trap = TRAP_SQUARES[idx];
    let guards = TRAP_NEIGHBORS[idx] & board.side_map(side) & !square.to_board();
    2 * square.manhattan(trap) as u8 + 2 * guards.count_ones() as u8
}

/// Fewest steps `!side` could need to capture the `side` unit on `square`
/// on any trap.
pub fn capture_cost(board: &Board, side: Side, square: Square) -> u8 {
    (0..TRAP_SQUARES.len())
        .map(|idx| trap_cost(board, side, square, idx))
        .min()
        .unwrap_or(u8::MAX)
}

/// Summed drag distance of every rabbit of `side` to its nearest trap.
fn drag_cost(board: &Board, side: Side) -> u8 {
    board
        .rabbits(side)
        .map(|rabbit| 2 * rabbit.manhattan(rabbit.nearest_trap()) as u8)
        .sum()
}

fn is_rabbit(unit: Unit) -> bool {
    unit.piece == Piece::Rabbit
}

/// Captures the last opponent rabbit on `rabbit`, trying the traps it can
/// reach cheapest first.
fn capture_last_rabbit(
    board: &mut Board,
    side: Side,
    rabbit: Square,
    max_steps: u8,
) -> Option<Witness> {
    let enemy = !side;
    let mut traps: Vec<(u8, usize)> = (0..TRAP_SQUARES.len())
        .map(|idx| (trap_cost(board, enemy, rabbit, idx), idx))
        .filter(|(cost, _)| *cost <= max_steps)
        .collect();
    traps.sort();
    traps
        .into_iter()
        .find_map(|(_, idx)| find_capture(board, side, max_steps, TRAP_SQUARES[idx], &is_rabbit))
}

/// Two rabbits fall to two pushes or pulls, one each: capture one with a
/// single pair, then the other with the steps left.
fn capture_two_rabbits(board: &mut Board, side: Side, max_steps: u8) -> Option<Witness> {
    let enemy = !side;
    for trap in TRAP_SQUARES {
        let mut first = Vec::new();
        let mut hints = Vec::new();
        if !gen_caps::<INCLUDE_HINTS>(board, side, 2, 2, trap, &mut first, &mut hints) {
            continue;
        }
        for (witness, hint) in first.iter().zip(hints) {
            if hint != capture_value(Piece::Rabbit) {
                continue;
            }
            let mut scoped = board.apply(witness.actions()[0]);
            let left = scoped.rabbits(enemy);
            assert_eq!(
                left.count_ones(),
                1,
                "a single pair captured both {} rabbits",
                enemy
            );
            let rest = capture_last_rabbit(&mut scoped, side, left.lsb(), max_steps - 2);
            if let Some(rest) = rest {
                let mut result = witness.clone();
                result.extend(&rest);
                return Some(result);
            }
        }
    }
    None
}

/// Can `side` remove every remaining opponent rabbit within `max_steps`.
///
/// Every capture of an opponent unit takes a push or pull, and one push or
/// pull captures at most one unit, so three or more rabbits never fall
/// within four steps.
pub fn can_elim(board: &mut Board, side: Side, max_steps: u8) -> Option<Witness> {
    debug_assert!(max_steps <= MAX_STEPS);
    let enemy = !side;
    let rabbits = board.rabbits(enemy);

    let result = match rabbits.count_ones() {
        0 => return Some(Witness::new()),
        1 => {
            let rabbit = rabbits.lsb();
            if rabbit
                .trap_index()
                .is_some_and(|idx| board.guards(enemy, idx) == 0)
            {
                return Some(Witness::new());
            }
            if max_steps < 2 || capture_cost(board, enemy, rabbit) > max_steps {
                return None;
            }
            capture_last_rabbit(board, side, rabbit, max_steps)
        }
        2 => {
            if max_steps < 4 || drag_cost(board, enemy) > max_steps {
                return None;
            }
            capture_two_rabbits(board, side, max_steps)
        }
        _ => return None,
    };
    if let Some(witness) = &result {
        log::trace!("{} eliminates {} rabbits: {}", side, enemy, witness);
    }
    result
}

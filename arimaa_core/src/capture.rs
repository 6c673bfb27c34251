use crate::{
    action::{MAX_STEPS, Witness},
    bitboard::{BitBoard, TRAP_NEIGHBORS},
    board::Board,
    piece::{Piece, Unit},
    side::Side,
    square::{Square, TRAP_SQUARES},
};

pub type CaptureGenFlags = u8;
pub const STOP_ON_FIRST: CaptureGenFlags = 1 << 0;
pub const INCLUDE_HINTS: CaptureGenFlags = 1 << 1;

/// Move ordering hint for capturing `piece`.
pub const fn capture_value(piece: Piece) -> i32 {
    match piece {
        Piece::Rabbit => 100,
        Piece::Cat => 150,
        Piece::Dog => 200,
        Piece::Horse => 300,
        Piece::Camel => 500,
        Piece::Elephant => 800,
    }
}

/// Fewest steps `side` could need to capture any opponent unit on `trap`.
fn trap_bound(board: &Board, side: Side, trap: Square) -> u8 {
    let enemy = !side;
    let Some(idx) = trap.trap_index() else {
        return u8::MAX;
    };
    let guards = TRAP_NEIGHBORS[idx] & board.side_map(enemy);
    let mut best = u8::MAX;
    for unit in board.side_map(enemy) {
        let others = (guards & !BitBoard::as_mask(unit)).count_ones() as u8;
        let cost = 2 * unit.manhattan(trap) as u8 + 2 * others;
        best = best.min(cost);
    }
    best
}

/// Zone a setup action has to touch when `after` steps are left behind it.
///
/// The finishing push or pull lies within three squares of the trap, so a
/// setup action right before it must change something within four. One
/// step earlier it only has to enable that action, which reaches two
/// squares further out.
fn setup_zone(trap: Square, after: u8) -> BitBoard {
    if after >= 3 {
        BitBoard::within(trap, 6)
    } else {
        BitBoard::within(trap, 4)
    }
}

/// Depth-first over capture patterns on `trap` for `side`.
///
/// At every node the finishing pushes and pulls come first: every opponent
/// unit beside the trap is pushed or pulled, which covers dragging a unit
/// in and chasing its last guard off. With steps left over, one setup
/// action near the trap is tried first and the search recurses: a pusher
/// stepping up, a friend unfreezing it, a landing square being cleared, or
/// a victim or guard being shifted by an earlier push or pull.
///
/// `target` picks which captured units count. Setup actions that capture a
/// unit `target` rejects are allowed, the others are finishing actions.
/// `found` gets the whole sequence and the captured unit and returns true to
/// stop.
fn capture_patterns<T, F>(
    board: &mut Board,
    side: Side,
    trap: Square,
    steps: u8,
    target: &T,
    prefix: &mut Witness,
    found: &mut F,
) -> bool
where
    T: Fn(Unit) -> bool,
    F: FnMut(&Witness, Unit) -> bool,
{
    let enemy = !side;
    let Some(idx) = trap.trap_index() else {
        return false;
    };
    if steps < 2 || trap_bound(board, side, trap) > steps {
        return false;
    }

    let mut finishing = Vec::with_capacity(16);
    for victim in TRAP_NEIGHBORS[idx] & board.side_map(enemy) {
        board.gen_pairs_on(side, victim, &mut finishing);
    }
    for action in finishing {
        let captured = board.apply(action).token().captured_at(trap, enemy);
        let Some(unit) = captured.filter(|unit| target(*unit)) else {
            continue;
        };
        prefix.push(action);
        let stop = found(prefix, unit);
        prefix.pop();
        if stop {
            return true;
        }
    }
    if steps < 3 {
        return false;
    }

    let mut setup = Vec::with_capacity(64);
    let movers = BitBoard::within(trap, 8) & board.side_map(side);
    board.gen_actions_from(side, steps - 2, movers, &mut setup);
    for action in setup {
        let after = steps - action.cost();
        if (action.footprint() & setup_zone(trap, after)).is_empty() {
            continue;
        }
        let mut scoped = board.apply(action);
        if scoped
            .token()
            .captured_at(trap, enemy)
            .is_some_and(|unit| target(unit))
        {
            continue;
        }
        prefix.push(action);
        let stop = capture_patterns(&mut scoped, side, trap, after, target, prefix, found);
        prefix.pop();
        if stop {
            return true;
        }
    }
    false
}

/// First sequence of at most `steps` that captures a unit accepted by
/// `target` on `trap`.
pub(crate) fn find_capture<T>(
    board: &mut Board,
    side: Side,
    steps: u8,
    trap: Square,
    target: &T,
) -> Option<Witness>
where
    T: Fn(Unit) -> bool,
{
    let mut result = None;
    capture_patterns(
        board,
        side,
        trap,
        steps,
        target,
        &mut Witness::new(),
        &mut |witness, _| {
            result = Some(witness.clone());
            true
        },
    );
    result
}

/// Whether dropping one setup action from `witness` still captures an
/// opponent unit on `trap`.
fn is_padded(root: &Board, side: Side, trap: Square, witness: &Witness) -> bool {
    let actions = witness.actions();
    (0..actions.len().saturating_sub(1)).any(|skip| {
        let mut shorter = Witness::new();
        for (idx, action) in actions.iter().enumerate() {
            if idx != skip {
                shorter.push(*action);
            }
        }
        shorter.replay(root, side).is_ok_and(|replay| {
            replay
                .captures
                .iter()
                .any(|(square, unit)| *square == trap && unit.side != side)
        })
    })
}

/// Can `side` capture an opponent unit on `trap` within `steps`.
pub fn can_caps(board: &mut Board, side: Side, steps: u8, trap: Square) -> Option<Witness> {
    debug_assert!(steps <= MAX_STEPS);
    debug_assert!(trap.is_trap());
    find_capture(board, side, steps, trap, &|_| true)
}

/// First trap, in board order, where `side` captures within `steps`.
pub fn can_caps_any(board: &mut Board, side: Side, steps: u8) -> Option<(Square, Witness)> {
    TRAP_SQUARES
        .iter()
        .find_map(|trap| can_caps(board, side, steps, *trap).map(|witness| (*trap, witness)))
}

/// Collects the sequences of `min_steps..=steps` steps that capture an
/// opponent unit on `trap` on their last action and on no earlier one. With
/// `INCLUDE_HINTS`, `hints` gets the value of each captured unit alongside.
///
/// Sequences with an action that could be dropped are skipped, as are
/// sequences ending in the same position as a shorter or earlier one.
///
/// Returns whether anything was found.
pub fn gen_caps<const F: CaptureGenFlags>(
    board: &mut Board,
    side: Side,
    steps: u8,
    min_steps: u8,
    trap: Square,
    out: &mut Vec<Witness>,
    hints: &mut Vec<i32>,
) -> bool {
    debug_assert!(steps <= MAX_STEPS);
    debug_assert!(trap.is_trap());
    if steps < 2 || steps < min_steps {
        return false;
    }

    let root = board.clone();
    let mut candidates: Vec<(Witness, Piece, Board)> = Vec::new();
    capture_patterns(
        board,
        side,
        trap,
        steps,
        &|_| true,
        &mut Witness::new(),
        &mut |witness, unit| {
            if witness.steps() < min_steps || is_padded(&root, side, trap, witness) {
                return false;
            }
            let Ok(replay) = witness.replay(&root, side) else {
                return false;
            };
            candidates.push((witness.clone(), unit.piece, replay.board));
            F & STOP_ON_FIRST != 0
        },
    );

    let before = out.len();
    for (idx, (witness, piece, result)) in candidates.iter().enumerate() {
        let shadowed = candidates.iter().enumerate().any(|(other, (w, _, r))| {
            let shorter = w.steps() < witness.steps();
            let earlier = w.steps() == witness.steps() && other < idx;
            r == result && (shorter || earlier)
        });
        if shadowed {
            continue;
        }
        out.push(witness.clone());
        if F & INCLUDE_HINTS != 0 {
            hints.push(capture_value(*piece));
        }
    }
    out.len() > before
}

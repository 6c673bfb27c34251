//! Goal oracle.
//!
//! [`goal_dist`] climbs the ladder `can_goal_1s` .. `can_goal_4s` and stops at
//! the first budget that admits a witness, so the reported distance is the
//! exact minimum number of steps. Each rung tries its cases cheapest first:
//!
//! * a straight run up the file,
//! * the rabbit stepping first, sideways or forward, then the rung below,
//! * clearing the square ahead: a friend steps off it or an opponent
//!   blocker is pushed or pulled away,
//! * unfreezing the rabbit by a friendly arrival, a push or pull of the
//!   freezer, or a capture of it,
//! * any other support action near enough to the rabbit to matter.
//!
//! A support action only matters if it changes a square the rabbit will
//! stand on or beside, or enables another action that does. With `s` steps
//! left that keeps it within `2s - 2` squares of the rabbit.

use crate::{
    action::{Action, MAX_STEPS, Witness},
    bitboard::{BitBoard, NEIGHBOR_MAP},
    board::Board,
    capture::gen_caps,
    direction::Direction,
    piece::{Piece, Unit},
    side::Side,
    square::{Square, TRAP_SQUARES},
    tactics::{Continuation, Visit, then_action, then_witness, walk},
};

/// Distance reported when no goal exists within the budget.
pub const NOT_GOAL: u8 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalDist {
    pub dist: u8,
    /// Rabbit the witness belongs to, when a goal was found.
    pub rabbit: Option<Square>,
    pub witness: Witness,
}

impl GoalDist {
    pub const fn none() -> Self {
        Self {
            dist: NOT_GOAL,
            rabbit: None,
            witness: Witness::new(),
        }
    }

    pub const fn is_goal(&self) -> bool {
        self.dist < NOT_GOAL
    }
}

/// Minimum steps for the `side` rabbit on `rabbit` to reach goal, or
/// [`NOT_GOAL`] if it needs more than `max_steps`.
pub fn goal_dist(board: &mut Board, side: Side, max_steps: u8, rabbit: Square) -> GoalDist {
    debug_assert!(max_steps <= MAX_STEPS);
    if board.occupant(rabbit) != Some(Unit::new(side, Piece::Rabbit)) {
        return GoalDist::none();
    }
    if Board::goal_distance(side, rabbit) == 0 {
        return GoalDist {
            dist: 0,
            rabbit: Some(rabbit),
            witness: Witness::new(),
        };
    }

    for steps in 1..=max_steps {
        if let Some(witness) = can_goal(board, side, rabbit, steps) {
            log::trace!("{} rabbit on {} goals in {}: {}", side, rabbit, steps, witness);
            return GoalDist {
                dist: steps,
                rabbit: Some(rabbit),
                witness,
            };
        }
    }
    GoalDist::none()
}

/// Closest goal over every rabbit of `side`.
pub fn goal_dist_any(board: &mut Board, side: Side, max_steps: u8) -> GoalDist {
    goal_dist_for_rabbits(board, side, max_steps, BitBoard::FULL)
}

/// Closest goal over the rabbits of `side` standing in `subset`.
///
/// Rabbits are tried budget by budget, so the first hit is the minimum.
pub fn goal_dist_for_rabbits(
    board: &mut Board,
    side: Side,
    max_steps: u8,
    subset: BitBoard,
) -> GoalDist {
    debug_assert!(max_steps <= MAX_STEPS);
    let rabbits = board.rabbits(side) & subset;

    if let Some(rabbit) = rabbits.into_iter().find(|sq| Board::goal_distance(side, *sq) == 0) {
        return GoalDist {
            dist: 0,
            rabbit: Some(rabbit),
            witness: Witness::new(),
        };
    }

    for steps in 1..=max_steps {
        for rabbit in rabbits {
            if Board::goal_distance(side, rabbit) > steps {
                continue;
            }
            if let Some(witness) = can_goal(board, side, rabbit, steps) {
                log::trace!("{} goals in {} with {}: {}", side, steps, rabbit, witness);
                return GoalDist {
                    dist: steps,
                    rabbit: Some(rabbit),
                    witness,
                };
            }
        }
    }
    GoalDist::none()
}

/// Rabbits of `side` that reach goal within `max_steps`.
pub fn goal_threat_map(board: &mut Board, side: Side, max_steps: u8) -> BitBoard {
    let mut result = BitBoard::EMPTY;
    for rabbit in board.rabbits(side) {
        if Board::goal_distance(side, rabbit) > max_steps {
            continue;
        }
        if goal_dist(board, side, max_steps, rabbit).is_goal() {
            result |= BitBoard::as_mask(rabbit);
        }
    }
    result
}

fn can_goal(board: &mut Board, side: Side, rabbit: Square, steps: u8) -> Option<Witness> {
    if Board::goal_distance(side, rabbit) == 0 {
        return Some(Witness::new());
    }
    match steps {
        1 => can_goal_1s(board, side, rabbit),
        2 => can_goal_2s(board, side, rabbit),
        3 => can_goal_3s(board, side, rabbit),
        4 => can_goal_4s(board, side, rabbit),
        _ => None,
    }
}

/// One step: the rabbit is a rank away, free and unblocked.
pub fn can_goal_1s(board: &mut Board, side: Side, rabbit: Square) -> Option<Witness> {
    straight_run(board, side, rabbit, 1)
}

/// Two steps. With one to spare the rabbit may sidestep, a friend may step
/// off the square ahead, or a friend may arrive to unfreeze it. Nothing
/// else fits: a push or pull would use both steps.
pub fn can_goal_2s(board: &mut Board, side: Side, rabbit: Square) -> Option<Witness> {
    let steps = 2;
    if lower_bound(board, side, rabbit) > steps {
        return None;
    }
    straight_run(board, side, rabbit, steps)
        .or_else(|| rabbit_first(board, side, rabbit, steps))
        .or_else(|| clear_forward_first(board, side, rabbit, steps))
        .or_else(|| unfreeze_first(board, side, rabbit, steps))
}

/// Three steps. On top of the two step cases a blocker or freezer may be
/// pushed or pulled away, a freezer on a trap captured, or one support step
/// may free the way for later.
pub fn can_goal_3s(board: &mut Board, side: Side, rabbit: Square) -> Option<Witness> {
    let steps = 3;
    if lower_bound(board, side, rabbit) > steps {
        return None;
    }
    if Board::goal_distance(side, rabbit) == steps {
        return straight_run(board, side, rabbit, steps);
    }
    straight_run(board, side, rabbit, steps)
        .or_else(|| rabbit_first(board, side, rabbit, steps))
        .or_else(|| clear_forward_first(board, side, rabbit, steps))
        .or_else(|| unfreeze_first(board, side, rabbit, steps))
        .or_else(|| support_first(board, side, rabbit, steps))
}

/// Four steps. A rabbit a rank away has three to spare, enough for a
/// friend to walk over or for a setup step before a push or pull.
pub fn can_goal_4s(board: &mut Board, side: Side, rabbit: Square) -> Option<Witness> {
    let steps = 4;
    if lower_bound(board, side, rabbit) > steps {
        return None;
    }
    if Board::goal_distance(side, rabbit) == steps {
        return straight_run(board, side, rabbit, steps);
    }
    straight_run(board, side, rabbit, steps)
        .or_else(|| rabbit_first(board, side, rabbit, steps))
        .or_else(|| clear_forward_first(board, side, rabbit, steps))
        .or_else(|| unfreeze_first(board, side, rabbit, steps))
        .or_else(|| support_first(board, side, rabbit, steps))
}

fn forward_square(side: Side, rabbit: Square) -> Option<Square> {
    rabbit.offset(Direction::forward(side))
}

fn is_blocked(board: &Board, side: Side, rabbit: Square) -> bool {
    forward_square(side, rabbit).is_some_and(|sq| board.occupant(sq).is_some())
}

/// Fewest steps the rabbit could possibly need: one per rank, plus one if it
/// must wait to be unfrozen or unblocked.
fn lower_bound(board: &Board, side: Side, rabbit: Square) -> u8 {
    let dist = Board::goal_distance(side, rabbit);
    if dist == 0 {
        return 0;
    }
    let delayed = board.is_frozen(rabbit) || is_blocked(board, side, rabbit);
    dist + delayed as u8
}

/// Every forward step in a row, nothing else.
fn straight_run(board: &mut Board, side: Side, rabbit: Square, steps: u8) -> Option<Witness> {
    let dist = Board::goal_distance(side, rabbit);
    if dist == 0 {
        return Some(Witness::new());
    }
    if steps < dist || board.is_frozen(rabbit) || is_blocked(board, side, rabbit) {
        return None;
    }
    let to = forward_square(side, rabbit)?;
    let unit = board.occupant(rabbit);
    then_action(board, Action::Step { from: rabbit, to }, |board, _| {
        if board.occupant(to) != unit {
            return None;
        }
        straight_run(board, side, to, steps - 1)
    })
}

/// The rabbit moves first, then the rung below takes over.
fn rabbit_first(board: &mut Board, side: Side, rabbit: Square, steps: u8) -> Option<Witness> {
    if board.is_frozen(rabbit) {
        return None;
    }
    let unit = board.occupant(rabbit);
    for to in board.step_targets(rabbit) {
        let found = then_action(board, Action::Step { from: rabbit, to }, |board, _| {
            if board.occupant(to) != unit || steps - 1 < lower_bound(board, side, to) {
                return None;
            }
            can_goal(board, side, to, steps - 1)
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// The square ahead is cleared first: a friend moves off it, or an opponent
/// blocker is pushed or pulled away.
fn clear_forward_first(
    board: &mut Board,
    side: Side,
    rabbit: Square,
    steps: u8,
) -> Option<Witness> {
    let forward = forward_square(side, rabbit)?;
    let blocker = board.occupant(forward)?;
    let spare = steps.saturating_sub(Board::goal_distance(side, rabbit));

    let mut actions = Vec::with_capacity(16);
    if blocker.side == side {
        board.gen_actions_from(side, spare, forward.to_board(), &mut actions);
    } else if spare >= 2 {
        board.gen_pairs_on(side, forward, &mut actions);
    }
    support_then_goal(board, side, rabbit, steps, actions)
}

/// A frozen rabbit is freed first, spending at most the spare steps.
fn unfreeze_first(board: &mut Board, side: Side, rabbit: Square, steps: u8) -> Option<Witness> {
    if !board.is_frozen(rabbit) {
        return None;
    }
    let spare = steps.saturating_sub(Board::goal_distance(side, rabbit));
    let mut rung = can_goal;
    match spare {
        0 => None,
        1 => can_unfreeze_1s(board, side, rabbit, steps, &mut rung),
        2 => can_unfreeze_2s(board, side, rabbit, steps, &mut rung),
        _ => can_unfreeze_3s(board, side, rabbit, steps, &mut rung),
    }
}

/// Any action by another unit that touches the rabbit's reach, then the
/// rung below.
fn support_first(board: &mut Board, side: Side, rabbit: Square, steps: u8) -> Option<Witness> {
    let spare = steps.saturating_sub(Board::goal_distance(side, rabbit));
    if spare == 0 {
        return None;
    }
    let zone = BitBoard::within(rabbit, 2 * steps - 2);
    let movers = BitBoard::within(rabbit, 2 * steps) & !rabbit.to_board();

    let mut actions = Vec::with_capacity(64);
    board.gen_actions_from(side, spare, movers, &mut actions);
    actions.retain(|action| (action.footprint() & zone).is_not_empty());
    support_then_goal(board, side, rabbit, steps, actions)
}

/// Tries each action in turn with the rabbit left where it is, then the rung
/// for the steps left.
fn support_then_goal(
    board: &mut Board,
    side: Side,
    rabbit: Square,
    steps: u8,
    actions: Vec<Action>,
) -> Option<Witness> {
    let unit = board.occupant(rabbit);
    for action in actions {
        let Some(remaining) = steps.checked_sub(action.cost()) else {
            continue;
        };
        let found = then_action(board, action, |board, _| {
            if board.occupant(rabbit) != unit || remaining < lower_bound(board, side, rabbit) {
                return None;
            }
            can_goal(board, side, rabbit, remaining)
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Opponent units beside `square` strong enough to freeze the unit on it.
fn freezers(board: &Board, square: Square) -> BitBoard {
    let Some(unit) = board.occupant(square) else {
        return BitBoard::EMPTY;
    };
    NEIGHBOR_MAP[square as usize] & board.stronger_than(!unit.side, unit.piece)
}

/// Runs `cont` if the unit on `square` is still there and free to move.
fn check_unfrozen<C: Continuation>(
    board: &mut Board,
    side: Side,
    square: Square,
    unit: Option<Unit>,
    steps: u8,
    cont: &mut C,
) -> Option<Witness> {
    if board.occupant(square) != unit || board.is_frozen(square) {
        return None;
    }
    cont.check(board, side, square, steps)
}

/// One step that leaves the frozen unit on `square` free to move, followed by
/// `cont` with the steps left over.
pub fn can_unfreeze_1s<C: Continuation>(
    board: &mut Board,
    side: Side,
    square: Square,
    steps: u8,
    cont: &mut C,
) -> Option<Witness> {
    if steps < 1 {
        return None;
    }
    let unit = board.occupant(square);
    // A single step can only unfreeze by bringing a friend alongside.
    let landing = board.empty_squares() & NEIGHBOR_MAP[square as usize];
    let movers = landing.adjacent() & !square.to_board();

    let mut actions = Vec::with_capacity(16);
    board.gen_actions_from(side, 1, movers, &mut actions);
    for action in actions {
        let Action::Step { to, .. } = action else {
            continue;
        };
        if !landing.get_bit(to) {
            continue;
        }
        let found = then_action(board, action, |board, _| {
            check_unfrozen(board, side, square, unit, steps - 1, &mut *cont)
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Unfreezes the unit on `square` within two steps, then runs `cont`.
///
/// Beyond the single step case: a friend two squares out walks over, a
/// push or pull nearby moves a freezer off or brings a friend alongside, or
/// a freezer standing on a trap is captured by chasing off its guard.
pub fn can_unfreeze_2s<C: Continuation>(
    board: &mut Board,
    side: Side,
    square: Square,
    steps: u8,
    cont: &mut C,
) -> Option<Witness> {
    if let Some(found) = can_unfreeze_1s(board, side, square, steps, cont) {
        return Some(found);
    }
    if steps < 2 {
        return None;
    }
    let unit = board.occupant(square);
    let landing = board.empty_squares() & NEIGHBOR_MAP[square as usize];

    // friendly approach, one square at a time
    let mut actions = Vec::with_capacity(32);
    let movers = landing.adjacent().adjacent() & !square.to_board();
    board.gen_actions_from(side, 1, movers, &mut actions);
    for action in actions {
        let Action::Step { to, .. } = action else {
            continue;
        };
        if !landing.adjacent().get_bit(to) {
            continue;
        }
        let found = then_action(board, action, |board, _| {
            if board.occupant(square) != unit {
                return None;
            }
            can_unfreeze_1s(board, side, square, steps - 1, &mut *cont)
        });
        if found.is_some() {
            return found;
        }
    }

    // pushes and pulls around the unit
    let mut pairs = Vec::with_capacity(32);
    let movers = BitBoard::within(square, 2) & !square.to_board();
    board.gen_actions_from(side, 2, movers, &mut pairs);
    for action in pairs {
        if action.cost() != 2 {
            continue;
        }
        let found = then_action(board, action, |board, _| {
            check_unfrozen(board, side, square, unit, steps - 2, &mut *cont)
        });
        if found.is_some() {
            return found;
        }
    }

    capture_freezer(board, side, square, 2, steps, cont)
}

/// Unfreezes the unit on `square` within three steps, then runs `cont`.
///
/// Beyond the two step cases: a setup step nearby followed by any two step
/// unfreeze, a push or pull that removes one of two freezers before a
/// friend steps up, or a three step capture of a freezer.
pub fn can_unfreeze_3s<C: Continuation>(
    board: &mut Board,
    side: Side,
    square: Square,
    steps: u8,
    cont: &mut C,
) -> Option<Witness> {
    if let Some(found) = can_unfreeze_2s(board, side, square, steps, cont) {
        return Some(found);
    }
    if steps < 3 {
        return None;
    }
    let unit = board.occupant(square);

    let mut actions = Vec::with_capacity(64);
    let movers = BitBoard::within(square, 5) & !square.to_board();
    board.gen_actions_from(side, 2, movers, &mut actions);
    for action in actions {
        let zone = BitBoard::within(square, if action.cost() == 1 { 4 } else { 3 });
        if (action.footprint() & zone).is_empty() {
            continue;
        }
        let remaining = steps - action.cost();
        let found = then_action(board, action, |board, _| {
            if board.occupant(square) != unit || !board.is_frozen(square) {
                return None;
            }
            if action.cost() == 1 {
                can_unfreeze_2s(board, side, square, remaining, &mut *cont)
            } else {
                can_unfreeze_1s(board, side, square, remaining, &mut *cont)
            }
        });
        if found.is_some() {
            return found;
        }
    }

    capture_freezer(board, side, square, 3, steps, cont)
}

/// Captures of a freezer of `square` that stands on a trap or next to one,
/// using at most `budget` steps, followed by `cont` once the unit is free.
fn capture_freezer<C: Continuation>(
    board: &mut Board,
    side: Side,
    square: Square,
    budget: u8,
    steps: u8,
    cont: &mut C,
) -> Option<Witness> {
    let budget = budget.min(steps);
    let unit = board.occupant(square);
    let near = freezers(board, square).expand();
    for trap in TRAP_SQUARES {
        if !near.get_bit(trap) {
            continue;
        }
        let mut caps = Vec::new();
        let mut hints = Vec::new();
        gen_caps::<0>(board, side, budget, 2, trap, &mut caps, &mut hints);
        for witness in caps {
            let remaining = steps - witness.steps();
            let found = then_witness(board, &witness, |board| {
                check_unfrozen(board, side, square, unit, remaining, &mut *cont)
            });
            if found.is_some() {
                return found;
            }
        }
    }
    None
}

/// Plain tracked walk for the goal of the rabbit on `rabbit`; slower than the
/// ladder but with no case analysis at all.
pub fn goal_walk(board: &mut Board, side: Side, rabbit: Square, steps: u8) -> Option<Witness> {
    walk(board, side, Some(rabbit), steps, &mut |board, node| {
        let Some(rabbit) = node.tracked else {
            return Visit::Prune;
        };
        if Board::goal_distance(side, rabbit) == 0 {
            Visit::Found(Witness::new())
        } else if node.remaining < lower_bound(board, side, rabbit) {
            Visit::Prune
        } else {
            Visit::Expand
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random_utils::get_random_board;
    use rand::{SeedableRng, rngs::StdRng};

    fn board_with(units: &[(Square, Side, Piece)]) -> Board {
        let mut board = Board::empty();
        for (square, side, piece) in units {
            board.place(*square, Unit::new(*side, *piece)).unwrap();
        }
        board
    }

    #[test]
    fn test_open_file_goal() {
        let mut board = board_with(&[(Square::D5, Side::Gold, Piece::Rabbit)]);
        let result = goal_dist(&mut board, Side::Gold, 4, Square::D5);
        assert_eq!(result.dist, 3);
        assert_eq!(result.witness.steps(), 3);
        assert_eq!(result.witness.track(Square::D5), Square::D8);

        assert_eq!(goal_dist(&mut board, Side::Gold, 2, Square::D5).dist, NOT_GOAL);
    }

    #[test]
    fn test_frozen_rabbit_needs_a_pull_first() {
        let mut board = board_with(&[
            (Square::D7, Side::Gold, Piece::Rabbit),
            (Square::B7, Side::Gold, Piece::Dog),
            (Square::C7, Side::Silver, Piece::Cat),
        ]);
        assert!(board.is_frozen(Square::D7));
        let before = board.clone();

        assert_eq!(goal_dist(&mut board, Side::Gold, 1, Square::D7).dist, NOT_GOAL);
        assert_eq!(goal_dist(&mut board, Side::Gold, 2, Square::D7).dist, NOT_GOAL);

        let result = goal_dist(&mut board, Side::Gold, 3, Square::D7);
        assert_eq!(result.dist, 3);
        assert_eq!(result.witness.len(), 2);
        assert!(matches!(result.witness.actions()[0], Action::Pair { .. }));
        assert_eq!(
            result.witness.last(),
            Some(Action::Step {
                from: Square::D7,
                to: Square::D8
            })
        );
        let replay = result.witness.replay(&before, Side::Gold).unwrap();
        assert_eq!(
            replay.board.occupant(Square::D8),
            Some(Unit::new(Side::Gold, Piece::Rabbit))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_blocker_pulled_off_the_goal_square() {
        let mut board = board_with(&[
            (Square::A7, Side::Gold, Piece::Rabbit),
            (Square::B7, Side::Gold, Piece::Cat),
            (Square::B8, Side::Gold, Piece::Dog),
            (Square::A8, Side::Silver, Piece::Cat),
        ]);
        let before = board.clone();

        assert_eq!(can_goal_2s(&mut board, Side::Gold, Square::A7), None);
        let witness = can_goal_3s(&mut board, Side::Gold, Square::A7).unwrap();
        assert_eq!(
            witness.actions(),
            &[
                Action::Pair {
                    src: Square::A8,
                    mid: Square::B8,
                    dst: Square::C8
                },
                Action::Step {
                    from: Square::A7,
                    to: Square::A8
                }
            ]
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_freezer_on_trap_captured_first() {
        // the cat on c6 freezes the rabbit and lives on the dog beside it
        let mut board = board_with(&[
            (Square::B6, Side::Gold, Piece::Rabbit),
            (Square::C6, Side::Silver, Piece::Cat),
            (Square::D6, Side::Silver, Piece::Dog),
            (Square::E6, Side::Gold, Piece::Elephant),
        ]);
        assert!(board.is_frozen(Square::B6));
        let before = board.clone();

        let mut free = |board: &mut Board, _: Side, square: Square, steps: u8| {
            (steps == 0 && !board.is_frozen(square)).then(Witness::new)
        };
        assert_eq!(
            can_unfreeze_1s(&mut board, Side::Gold, Square::B6, 1, &mut free),
            None
        );
        let witness = can_unfreeze_2s(&mut board, Side::Gold, Square::B6, 2, &mut free).unwrap();
        let replay = witness.replay(&before, Side::Gold).unwrap();
        assert!(
            replay
                .captures
                .contains(&(Square::C6, Unit::new(Side::Silver, Piece::Cat)))
        );
        assert!(!replay.board.is_frozen(Square::B6));
        assert_eq!(board, before);

        let result = goal_dist(&mut board, Side::Gold, 4, Square::B6);
        assert_eq!(result.dist, 4);
        let replay = result.witness.replay(&before, Side::Gold).unwrap();
        assert_eq!(
            replay.board.occupant(Square::B8),
            Some(Unit::new(Side::Gold, Piece::Rabbit))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_silver_goals_south() {
        let mut board = board_with(&[
            (Square::E2, Side::Silver, Piece::Rabbit),
            (Square::E1, Side::Gold, Piece::Rabbit),
        ]);
        // blocked, so a sidestep comes first
        let result = goal_dist(&mut board, Side::Silver, 4, Square::E2);
        assert_eq!(result.dist, 2);
        let end = result.witness.track(Square::E2);
        assert_eq!(end.rank(), 0);
        let replay = result.witness.replay(&board, Side::Silver).unwrap();
        assert_eq!(
            replay.board.occupant(end),
            Some(Unit::new(Side::Silver, Piece::Rabbit))
        );
    }

    #[test]
    fn test_rabbit_on_goal_and_threat_map() {
        let mut board = board_with(&[
            (Square::A8, Side::Gold, Piece::Rabbit),
            (Square::H6, Side::Gold, Piece::Rabbit),
            (Square::C2, Side::Gold, Piece::Rabbit),
        ]);
        let any = goal_dist_any(&mut board, Side::Gold, 4);
        assert_eq!(any.dist, 0);
        assert_eq!(any.rabbit, Some(Square::A8));

        let subset = goal_dist_for_rabbits(
            &mut board,
            Side::Gold,
            4,
            BitBoard::as_mask(Square::H6) | BitBoard::as_mask(Square::C2),
        );
        assert_eq!(subset.dist, 2);
        assert_eq!(subset.rabbit, Some(Square::H6));

        let threats = goal_threat_map(&mut board, Side::Gold, 2);
        assert_eq!(
            threats,
            BitBoard::as_mask(Square::A8) | BitBoard::as_mask(Square::H6)
        );
    }

    #[test]
    fn test_trap_on_path_kills_straight_run() {
        // c6 is unguarded, so the rabbit dies on the way up the c file
        let mut board = board_with(&[
            (Square::C5, Side::Gold, Piece::Rabbit),
            (Square::A1, Side::Silver, Piece::Elephant),
        ]);
        let result = goal_dist(&mut board, Side::Gold, 4, Square::C5);
        assert_eq!(result.dist, 4);
        assert!(!result.witness.path(Square::C5).get_bit(Square::C6));
    }

    #[test]
    fn test_monotone_and_matches_walk() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..40 {
            let mut board = get_random_board(&mut rng, 5);
            for side in [Side::Gold, Side::Silver] {
                for rabbit in board.rabbits(side) {
                    let mut previous = NOT_GOAL;
                    for steps in 0..=MAX_STEPS {
                        let dist = goal_dist(&mut board, side, steps, rabbit).dist;
                        if previous <= steps {
                            assert_eq!(dist, previous);
                        }
                        let walked = goal_walk(&mut board, side, rabbit, steps);
                        assert_eq!(
                            dist <= steps,
                            walked.is_some(),
                            "{} {} {}",
                            side,
                            rabbit,
                            steps
                        );
                        previous = dist;
                    }
                }
            }
        }
    }
}

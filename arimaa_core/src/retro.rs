//! Retrograde generators: given where an opponent unit should end up, list
//! the moves that put it there with a push or pull as the final action.

use crate::{
    action::{Action, MAX_STEPS, Witness},
    board::Board,
    goal::{GoalDist, goal_dist, goal_dist_any},
    side::Side,
    square::Square,
    tactics::{Visit, walk_into},
};

/// Single pushes and pulls moving the opponent unit on `victim` onto `target`.
pub fn gen_push_pull_to_2step(
    board: &mut Board,
    side: Side,
    victim: Square,
    target: Square,
    out: &mut Vec<Witness>,
) {
    let Some(unit) = board.occupant(victim) else {
        return;
    };
    if unit.side == side || victim.manhattan(target) != 1 {
        return;
    }
    let mut pairs = Vec::with_capacity(16);
    board.gen_pairs_on(side, victim, &mut pairs);
    for action in pairs {
        if action.track(victim) == target {
            out.push(Witness::single(action));
        }
    }
}

/// One setup step, then a push or pull moving `victim` onto `target` that
/// was not available before the setup.
pub fn gen_push_pull_to_3step(
    board: &mut Board,
    side: Side,
    victim: Square,
    target: Square,
    out: &mut Vec<Witness>,
) {
    gen_push_pull_to(board, side, victim, target, 3, out);
}

/// Four steps ending in a push or pull that lands `victim` on `target`,
/// where that final push or pull was not available at the start.
pub fn gen_push_pull_to_4step(
    board: &mut Board,
    side: Side,
    victim: Square,
    target: Square,
    out: &mut Vec<Witness>,
) {
    gen_push_pull_to(board, side, victim, target, 4, out);
}

fn gen_push_pull_to(
    board: &mut Board,
    side: Side,
    victim: Square,
    target: Square,
    steps: u8,
    out: &mut Vec<Witness>,
) {
    debug_assert!(steps <= MAX_STEPS);
    let Some(unit) = board.occupant(victim) else {
        return;
    };
    if unit.side == side || 2 * victim.manhattan(target) as u8 > steps {
        return;
    }

    let mut root_actions = Vec::with_capacity(64);
    board.gen_actions(side, 2, &mut root_actions);

    walk_into(
        board,
        side,
        Some(victim),
        steps,
        &mut |_, node| {
            let Some(tracked) = node.tracked else {
                return Visit::Prune;
            };
            let used = steps - node.remaining;
            if used == steps {
                // after a pair the victim sits on `mid` or `dst` only if the
                // pair moved it
                let moved = matches!(
                    node.last,
                    Some(Action::Pair { mid, dst, .. }) if tracked == mid || tracked == dst
                );
                return if moved && tracked == target {
                    Visit::Found(Witness::new())
                } else {
                    Visit::Prune
                };
            }
            if 2 * tracked.manhattan(target) as u8 > node.remaining {
                Visit::Prune
            } else {
                Visit::Expand
            }
        },
        &mut |witness| {
            let fresh = witness.last().is_some_and(|last| !root_actions.contains(&last));
            if fresh {
                out.push(witness);
            }
            false
        },
    );
}

/// Single steps by `side` onto the path of the opponent's quickest goal that
/// push that rabbit's goal further away.
pub fn gen_goal_blocks_1step(board: &mut Board, side: Side, out: &mut Vec<Witness>) {
    let enemy = !side;
    let threat = goal_dist_any(board, enemy, MAX_STEPS);
    let GoalDist {
        dist,
        rabbit: Some(rabbit),
        witness,
    } = threat
    else {
        return;
    };
    let path = witness.path(rabbit) & !rabbit.to_board();
    if path.is_empty() {
        return;
    }

    let mut actions = Vec::with_capacity(64);
    board.gen_actions(side, 1, &mut actions);
    for action in actions {
        let Action::Step { to, .. } = action else {
            continue;
        };
        if !path.get_bit(to) {
            continue;
        }
        let mut scoped = board.apply(action);
        if goal_dist(&mut scoped, enemy, MAX_STEPS, rabbit).dist > dist {
            out.push(Witness::single(action));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Piece, Unit};

    fn board_with(units: &[(Square, Side, Piece)]) -> Board {
        let mut board = Board::empty();
        for (square, side, piece) in units {
            board.place(*square, Unit::new(*side, *piece)).unwrap();
        }
        board
    }

    #[test]
    fn test_two_step_pushes_and_pulls() {
        let mut board = board_with(&[
            (Square::D4, Side::Gold, Piece::Elephant),
            (Square::D5, Side::Silver, Piece::Cat),
        ]);
        let mut out = Vec::new();
        gen_push_pull_to_2step(&mut board, Side::Gold, Square::D5, Square::D6, &mut out);
        assert_eq!(
            out,
            vec![Witness::single(Action::Pair {
                src: Square::D4,
                mid: Square::D5,
                dst: Square::D6
            })]
        );

        out.clear();
        gen_push_pull_to_2step(&mut board, Side::Gold, Square::D5, Square::D4, &mut out);
        // the elephant backs off to c4, e4 or d3
        assert_eq!(out.len(), 3);
        for witness in &out {
            assert_eq!(witness.track(Square::D5), Square::D4);
        }
    }

    #[test]
    fn test_only_opponent_units_are_dragged() {
        let mut board = board_with(&[
            (Square::D4, Side::Gold, Piece::Elephant),
            (Square::D5, Side::Gold, Piece::Cat),
            (Square::E4, Side::Silver, Piece::Dog),
        ]);
        let mut out = Vec::new();
        gen_push_pull_to_2step(&mut board, Side::Gold, Square::D5, Square::D6, &mut out);
        gen_push_pull_to_2step(&mut board, Side::Gold, Square::A1, Square::A2, &mut out);
        assert!(out.is_empty());

        gen_push_pull_to_2step(&mut board, Side::Gold, Square::E4, Square::E5, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].track(Square::E4), Square::E5);
    }

    #[test]
    fn test_three_and_four_step_approaches() {
        let mut board = board_with(&[
            (Square::D3, Side::Gold, Piece::Elephant),
            (Square::D5, Side::Silver, Piece::Cat),
        ]);
        let before = board.clone();
        let mut out = Vec::new();
        gen_push_pull_to_3step(&mut board, Side::Gold, Square::D5, Square::D6, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].steps(), 3);
        assert_eq!(out[0].track(Square::D5), Square::D6);
        out[0].replay(&before, Side::Gold).unwrap();

        let mut board = board_with(&[
            (Square::D2, Side::Gold, Piece::Elephant),
            (Square::D5, Side::Silver, Piece::Cat),
        ]);
        let before = board.clone();
        let mut out = Vec::new();
        gen_push_pull_to_4step(&mut board, Side::Gold, Square::D5, Square::D6, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].steps(), 4);
        out[0].replay(&before, Side::Gold).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_goal_block() {
        let mut board = board_with(&[
            (Square::B2, Side::Silver, Piece::Rabbit),
            (Square::A1, Side::Gold, Piece::Dog),
        ]);
        let before = board.clone();
        let mut out = Vec::new();
        gen_goal_blocks_1step(&mut board, Side::Gold, &mut out);
        assert_eq!(
            out,
            vec![Witness::single(Action::Step {
                from: Square::A1,
                to: Square::B1
            })]
        );
        assert_eq!(board, before);
    }
}

//! Bounded walks over action sequences.
//!
//! Every oracle in this crate is a depth-limited walk over the actions of one
//! side, cut by an admissible lower bound on the steps still needed. The walk
//! applies each action through [`Board::apply`], so the board is restored on
//! every return path.

use crate::{
    action::{Action, Witness},
    board::{Board, UndoToken},
    piece::Unit,
    side::Side,
    square::Square,
};

/// A check run on a mutated board, composing "do X, then does Y hold".
///
/// Implementations must leave the board as they found it.
pub trait Continuation {
    fn check(&mut self, board: &mut Board, side: Side, square: Square, steps: u8)
    -> Option<Witness>;
}

impl<F> Continuation for F
where
    F: FnMut(&mut Board, Side, Square, u8) -> Option<Witness>,
{
    fn check(
        &mut self,
        board: &mut Board,
        side: Side,
        square: Square,
        steps: u8,
    ) -> Option<Witness> {
        self(board, side, square, steps)
    }
}

/// State handed to a visitor at each node of a walk.
pub struct Node<'a> {
    /// Square of the followed unit, `None` once it has been captured.
    pub tracked: Option<Square>,
    /// Action that led here, `None` at the root.
    pub last: Option<Action>,
    /// Units captured by that action.
    pub captures: &'a [(Square, Unit)],
    pub remaining: u8,
}

pub enum Visit {
    /// Target reached; the witness holds any actions the visitor added itself.
    Found(Witness),
    Expand,
    Prune,
}

/// Depth-first walk returning the first witness found.
pub fn walk<V>(
    board: &mut Board,
    side: Side,
    tracked: Option<Square>,
    steps: u8,
    visit: &mut V,
) -> Option<Witness>
where
    V: FnMut(&mut Board, &Node<'_>) -> Visit,
{
    let mut result = None;
    walk_into(board, side, tracked, steps, visit, &mut |witness| {
        result = Some(witness);
        true
    });
    result
}

/// Depth-first walk reporting every witness to `found`. Nodes that reach the
/// target are not expanded further. `found` returns true to stop the walk.
pub fn walk_into<V, F>(
    board: &mut Board,
    side: Side,
    tracked: Option<Square>,
    steps: u8,
    visit: &mut V,
    found: &mut F,
) where
    V: FnMut(&mut Board, &Node<'_>) -> Visit,
    F: FnMut(Witness) -> bool,
{
    let root = Node {
        tracked,
        last: None,
        captures: &[],
        remaining: steps,
    };
    match visit(board, &root) {
        Visit::Found(witness) => {
            found(witness);
        }
        Visit::Prune => {}
        Visit::Expand => {
            let mut prefix = Witness::new();
            descend(board, side, tracked, steps, &mut prefix, visit, found);
        }
    }
}

fn descend<V, F>(
    board: &mut Board,
    side: Side,
    tracked: Option<Square>,
    steps: u8,
    prefix: &mut Witness,
    visit: &mut V,
    found: &mut F,
) -> bool
where
    V: FnMut(&mut Board, &Node<'_>) -> Visit,
    F: FnMut(Witness) -> bool,
{
    if steps == 0 {
        return false;
    }

    let mut actions = Vec::with_capacity(64);
    board.gen_actions(side, steps, &mut actions);

    for action in actions {
        let unit = tracked.and_then(|sq| board.occupant(sq));
        let remaining = steps - action.cost();

        let mut scoped = board.apply(action);
        let next = tracked
            .map(|sq| action.track(sq))
            .filter(|sq| unit.is_some() && scoped.occupant(*sq) == unit);
        let captures = scoped.token().captures().to_vec();
        let node = Node {
            tracked: next,
            last: Some(action),
            captures: &captures,
            remaining,
        };

        prefix.push(action);
        let stop = match visit(&mut *scoped, &node) {
            Visit::Found(rest) => {
                let mut witness = prefix.clone();
                witness.extend(&rest);
                found(witness)
            }
            Visit::Prune => false,
            Visit::Expand => descend(&mut scoped, side, next, remaining, prefix, visit, found),
        };
        prefix.pop();

        if stop {
            return true;
        }
    }
    false
}

/// Applies `action`, runs `then` on the result, and prepends `action` to
/// whatever witness comes back.
pub fn then_action<T>(board: &mut Board, action: Action, then: T) -> Option<Witness>
where
    T: FnOnce(&mut Board, &UndoToken) -> Option<Witness>,
{
    let mut scoped = board.apply(action);
    let token = scoped.token().clone();
    let rest = then(&mut *scoped, &token)?;
    Some(Witness::load_from(action, &rest))
}

/// Applies every action of `witness` in turn, runs `then` on the result, and
/// prepends the witness to whatever comes back.
pub fn then_witness<T>(board: &mut Board, witness: &Witness, then: T) -> Option<Witness>
where
    T: FnOnce(&mut Board) -> Option<Witness>,
{
    fn replay_then<T>(board: &mut Board, actions: &[Action], then: T) -> Option<Witness>
    where
        T: FnOnce(&mut Board) -> Option<Witness>,
    {
        match actions.split_first() {
            None => then(board),
            Some((first, rest)) => {
                let mut scoped = board.apply(*first);
                replay_then(&mut scoped, rest, then)
            }
        }
    }

    let rest = replay_then(board, witness.actions(), then)?;
    let mut result = witness.clone();
    result.extend(&rest);
    Some(result)
}

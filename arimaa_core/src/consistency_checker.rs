use crate::{
    action::{Action, MAX_STEPS, Witness},
    bitboard::BitBoard,
    board::Board,
    capture::{INCLUDE_HINTS, can_caps, gen_caps},
    elim::can_elim,
    goal::{NOT_GOAL, goal_dist, goal_dist_any, goal_threat_map},
    piece::{Piece, Unit},
    side::Side,
    square::{NUM_SQUARES, Square, TRAP_SQUARES},
};

pub fn consistency_check(board: &Board, side: Side, max_steps: u8) -> Result<(), Vec<String>> {
    let mut checker = ConsistencyChecker::new(board, side, max_steps);
    checker.perform_all_validations()
}

/// Exhaustive goal distances: for every rabbit of `side`, the fewest steps
/// after which it stands on its goal rank, or `NOT_GOAL` past `max_steps`.
pub fn brute_goal_dists(board: &mut Board, side: Side, max_steps: u8) -> [u8; NUM_SQUARES] {
    let mut best = [NOT_GOAL; NUM_SQUARES];
    let tracked: Vec<(Square, Option<Square>)> = board
        .rabbits(side)
        .map(|rabbit| (rabbit, Some(rabbit)))
        .collect();
    for (rabbit, _) in &tracked {
        if Board::goal_distance(side, *rabbit) == 0 {
            best[*rabbit as usize] = 0;
        }
    }
    _brute_goal_into(board, side, max_steps, 0, &tracked, &mut best);
    best
}

fn _brute_goal_into(
    board: &mut Board,
    side: Side,
    steps_left: u8,
    used: u8,
    tracked: &[(Square, Option<Square>)],
    best: &mut [u8; NUM_SQUARES],
) {
    let rabbit = Some(Unit::new(side, Piece::Rabbit));
    let mut actions = Vec::new();
    board.gen_actions(side, steps_left, &mut actions);
    for action in actions {
        let cost = action.cost();
        let token = board.make_action(action);

        let next: Vec<(Square, Option<Square>)> = tracked
            .iter()
            .map(|(origin, current)| {
                let moved = current
                    .map(|sq| action.track(sq))
                    .filter(|sq| board.occupant(*sq) == rabbit);
                (*origin, moved)
            })
            .collect();
        for (origin, current) in &next {
            if let Some(square) = current {
                if Board::goal_distance(side, *square) == 0 {
                    let slot = &mut best[*origin as usize];
                    *slot = (*slot).min(used + cost);
                }
            }
        }
        if steps_left > cost {
            _brute_goal_into(board, side, steps_left - cost, used + cost, &next, best);
        }

        board.unmake(&token);
    }
}

/// Exhaustive elimination test.
pub fn brute_elim(board: &mut Board, side: Side, max_steps: u8) -> bool {
    let enemy = !side;
    let rabbits = board.rabbits(enemy);
    if rabbits.is_empty() {
        return true;
    }
    if rabbits.count_ones() == 1 {
        let rabbit = rabbits.lsb();
        if rabbit.trap_index().is_some_and(|idx| board.guards(enemy, idx) == 0) {
            return true;
        }
    }
    _brute_any(board, side, max_steps, &mut |board, _, _| {
        board.rabbits(enemy).is_empty()
    })
}

/// Exhaustive test for capturing an opponent unit on `trap`.
pub fn brute_capture(board: &mut Board, side: Side, max_steps: u8, trap: Square) -> bool {
    _brute_any(board, side, max_steps, &mut |_, _, captures| {
        captures
            .iter()
            .any(|(square, unit)| *square == trap && unit.side != side)
    })
}

fn _brute_any<F>(board: &mut Board, side: Side, steps_left: u8, done: &mut F) -> bool
where
    F: FnMut(&Board, Action, &[(Square, Unit)]) -> bool,
{
    let mut actions = Vec::new();
    board.gen_actions(side, steps_left, &mut actions);
    for action in actions {
        let token = board.make_action(action);
        let found = done(board, action, token.captures())
            || (steps_left > action.cost()
                && _brute_any(board, side, steps_left - action.cost(), done));
        board.unmake(&token);
        if found {
            return true;
        }
    }
    false
}

/// Runs every oracle on a position and checks each answer against an
/// exhaustive search, each witness against a replay, and the board against
/// a snapshot.
pub(crate) struct ConsistencyChecker {
    board: Board,
    side: Side,
    max_steps: u8,
    errors: Vec<String>,
}

impl ConsistencyChecker {
    pub fn new(board: &Board, side: Side, max_steps: u8) -> Self {
        Self {
            board: board.clone(),
            side,
            max_steps: max_steps.min(MAX_STEPS),
            errors: Default::default(),
        }
    }

    pub fn perform_all_validations(&mut self) -> Result<(), Vec<String>> {
        if let Err(err) = self.board.validation_err() {
            self.errors
                .push(format!("Root board has validation errors: {}", err));
        } else {
            self.validate_goal();
            self.validate_goal_aggregates();
            self.validate_elim();
            self.validate_captures();
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            for error in &self.errors {
                log::debug!("{}: {}", self.board, error);
            }
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn check_restored(&mut self, label: &str, board: &Board) {
        if *board != self.board {
            self.errors.push(format!(
                "{} did not restore the board. Before: {} After: {}",
                label, self.board, board
            ));
        } else if let Err(err) = board.validation_err() {
            self.errors
                .push(format!("{} left an invalid board: {}", label, err));
        }
    }

    fn validate_goal(&mut self) {
        let side = self.side;
        let mut board = self.board.clone();
        let brute = brute_goal_dists(&mut board, side, self.max_steps);

        for rabbit in self.board.rabbits(side) {
            let mut previous = NOT_GOAL;
            for steps in 0..=self.max_steps {
                let expected = if brute[rabbit as usize] <= steps {
                    brute[rabbit as usize]
                } else {
                    NOT_GOAL
                };
                let result = goal_dist(&mut board, side, steps, rabbit);
                self.check_restored("goal_dist", &board);

                if result.dist != expected {
                    self.errors.push(format!(
                        "goal_dist mismatch for {} rabbit {} at {} steps. Oracle: {} Brute: {}",
                        side, rabbit, steps, result.dist, expected
                    ));
                    continue;
                }
                if previous <= steps && result.dist != previous {
                    self.errors.push(format!(
                        "goal_dist not monotone for {}: {} then {}",
                        rabbit, previous, result.dist
                    ));
                }
                previous = result.dist;

                let again = goal_dist(&mut board, side, steps, rabbit);
                if again != result {
                    self.errors.push(format!(
                        "goal_dist not idempotent for {}: {} vs {}",
                        rabbit, result.witness, again.witness
                    ));
                }

                if result.is_goal() {
                    self.validate_goal_witness(rabbit, result.dist, &result.witness);
                }
            }
        }
    }

    fn validate_goal_witness(&mut self, rabbit: Square, dist: u8, witness: &Witness) {
        if witness.steps() != dist {
            self.errors.push(format!(
                "Goal witness {} for {} has {} steps but distance {}",
                witness,
                rabbit,
                witness.steps(),
                dist
            ));
        }
        match witness.replay(&self.board, self.side) {
            Err(err) => self.errors.push(err),
            Ok(replay) => {
                let end = witness.track(rabbit);
                let arrived = replay.board.occupant(end)
                    == Some(Unit::new(self.side, Piece::Rabbit))
                    && Board::goal_distance(self.side, end) == 0;
                if !arrived {
                    self.errors.push(format!(
                        "Goal witness {} does not bring {} to goal",
                        witness.to_notation(&self.board),
                        rabbit
                    ));
                }
            }
        }
    }

    fn validate_goal_aggregates(&mut self) {
        let side = self.side;
        let mut board = self.board.clone();
        let brute = brute_goal_dists(&mut board, side, self.max_steps);

        let best = self
            .board
            .rabbits(side)
            .map(|rabbit| brute[rabbit as usize])
            .min()
            .unwrap_or(NOT_GOAL);
        let any = goal_dist_any(&mut board, side, self.max_steps);
        self.check_restored("goal_dist_any", &board);
        if any.dist != best {
            self.errors.push(format!(
                "goal_dist_any mismatch. Oracle: {} Brute: {}",
                any.dist, best
            ));
        }

        let expected = self
            .board
            .rabbits(side)
            .filter(|rabbit| brute[*rabbit as usize] <= self.max_steps)
            .fold(BitBoard::EMPTY, |acc, rabbit| acc | rabbit.to_board());
        let threats = goal_threat_map(&mut board, side, self.max_steps);
        self.check_restored("goal_threat_map", &board);
        if threats != expected {
            self.errors.push(format!(
                "goal_threat_map mismatch. Oracle: {:?} Brute: {:?}",
                threats.all_squares(),
                expected.all_squares()
            ));
        }
    }

    fn validate_elim(&mut self) {
        let side = self.side;
        let mut board = self.board.clone();
        for steps in 0..=self.max_steps {
            let expected = brute_elim(&mut board, side, steps);
            let result = can_elim(&mut board, side, steps);
            self.check_restored("can_elim", &board);
            if result.is_some() != expected {
                self.errors.push(format!(
                    "can_elim mismatch at {} steps. Oracle: {:?} Brute: {}",
                    steps,
                    result.map(|w| w.to_string()),
                    expected
                ));
                continue;
            }
            let Some(witness) = result else {
                continue;
            };
            if witness.is_empty() {
                continue;
            }
            match witness.replay(&self.board, side) {
                Err(err) => self.errors.push(err),
                Ok(replay) => {
                    if replay.board.rabbits(!side).is_not_empty() || witness.steps() > steps {
                        self.errors.push(format!(
                            "Elimination witness {} is wrong",
                            witness.to_notation(&self.board)
                        ));
                    }
                }
            }
        }
    }

    fn validate_captures(&mut self) {
        let side = self.side;
        let mut board = self.board.clone();
        for trap in TRAP_SQUARES {
            let expected = brute_capture(&mut board, side, self.max_steps, trap);
            let result = can_caps(&mut board, side, self.max_steps, trap);
            self.check_restored("can_caps", &board);
            if result.is_some() != expected {
                self.errors.push(format!(
                    "can_caps mismatch on {}. Oracle: {:?} Brute: {}",
                    trap,
                    result.as_ref().map(|w| w.to_string()),
                    expected
                ));
            }
            if let Some(witness) = result {
                self.validate_capture_witness(trap, &witness);
            }

            let mut out = Vec::new();
            let mut hints = Vec::new();
            let any = gen_caps::<INCLUDE_HINTS>(
                &mut board,
                side,
                self.max_steps,
                0,
                trap,
                &mut out,
                &mut hints,
            );
            self.check_restored("gen_caps", &board);
            if any != expected || out.len() != hints.len() {
                self.errors.push(format!(
                    "gen_caps on {} found {} moves with {} hints. Brute: {}",
                    trap,
                    out.len(),
                    hints.len(),
                    expected
                ));
            }
            for witness in &out {
                self.validate_capture_witness(trap, witness);
            }
        }
    }

    fn validate_capture_witness(&mut self, trap: Square, witness: &Witness) {
        match witness.replay(&self.board, self.side) {
            Err(err) => self.errors.push(err),
            Ok(replay) => {
                let captured = replay
                    .captures
                    .iter()
                    .any(|(square, unit)| *square == trap && unit.side != self.side);
                if !captured || witness.steps() > self.max_steps {
                    self.errors.push(format!(
                        "Capture witness {} does not capture on {}",
                        witness.to_notation(&self.board),
                        trap
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random_utils::{BoardFuzzer, get_random_board};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_brute_goal_open_file() {
        let mut board: Board = "Rd5 Ra2".parse().unwrap();
        let dists = brute_goal_dists(&mut board, Side::Gold, 4);
        assert_eq!(dists[Square::D5 as usize], 3);
        assert_eq!(dists[Square::A2 as usize], NOT_GOAL);
    }

    #[test]
    fn test_frozen_rabbit_position() {
        let board: Board = "Rd7 Db7 cc7".parse().unwrap();
        consistency_check(&board, Side::Gold, 4).unwrap();
    }

    #[test]
    fn test_sparse_random_positions() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..30 {
            let board = get_random_board(&mut rng, 4);
            for side in [Side::Gold, Side::Silver] {
                if let Err(errors) = consistency_check(&board, side, 3) {
                    board.print_to_console();
                    panic!("{}", errors.join("\n"));
                }
            }
        }
    }

    #[test]
    fn test_fuzzed_positions_full_budget() {
        for (board, side) in BoardFuzzer::new(StdRng::seed_from_u64(5), 3, 12) {
            if let Err(errors) = consistency_check(&board, side, MAX_STEPS) {
                board.print_to_console();
                panic!("{}", errors.join("\n"));
            }
        }
    }
}

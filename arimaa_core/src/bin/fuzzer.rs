use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use rand::{SeedableRng, rngs::StdRng};

use arimaa_core::{
    action::MAX_STEPS,
    consistency_checker::consistency_check,
    pretty_board::board_to_pretty_board,
    random_utils::BoardFuzzer,
};

#[derive(Parser, Debug, Clone, Copy)]
struct FuzzerArgs {
    #[arg(short = 's', long)]
    #[clap(default_value_t = 0)]
    seed: u64,

    #[arg(short = 'n', long)]
    #[clap(default_value_t = 1000)]
    positions: usize,

    #[arg(short = 'm', long)]
    #[clap(default_value_t = MAX_STEPS)]
    max_steps: u8,

    #[arg(short = 'u', long)]
    #[clap(default_value_t = 5)]
    units: usize,

    #[arg(short = 'k', long)]
    #[clap(default_value_t = false)]
    keep_going: bool,
}

pub fn main() {
    let args = FuzzerArgs::parse();
    let start = Instant::now();
    let mut failures = 0;

    let fuzzer = BoardFuzzer::new(StdRng::seed_from_u64(args.seed), args.units, args.positions);
    for (idx, (board, side)) in fuzzer.enumerate() {
        if let Err(errors) = consistency_check(&board, side, args.max_steps) {
            failures += 1;
            eprintln!("{}", format!("Position {} failed for {}:", idx, side).red());
            board.print_to_console();
            match serde_json::to_string(&board_to_pretty_board(&board)) {
                Ok(json) => eprintln!("{}", json),
                Err(err) => eprintln!("Could not serialize board: {}", err),
            }
            for error in errors {
                eprintln!("  {}", error);
            }
            if !args.keep_going {
                break;
            }
        }

        if (idx + 1) % 100 == 0 {
            eprintln!(
                "{} positions checked in {:.2}s",
                idx + 1,
                start.elapsed().as_secs_f32()
            );
        }
    }

    if failures == 0 {
        eprintln!("{}", "All positions consistent".green());
    } else {
        eprintln!("{}", format!("{} inconsistent positions", failures).red());
        std::process::exit(1);
    }
}

// cargo run -p arimaa_core --bin fuzzer --release -- -s 1 -n 5000 -u 6

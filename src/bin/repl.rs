use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use rust_dicebot::dicebot::{DiceBot, GameSystem};
use rust_dicebot::notation::command_notation;
use rust_dicebot::parse::ast::Expr;
use rust_dicebot::{EvalOptions, Evaluator};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Roll dice notation the way a chat bot would
#[derive(Parser, Debug)]
#[command(name = "dicebot")]
struct Args {
    /// Game system id
    #[arg(long, default_value = "DiceBot")]
    game: String,

    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Most dice a single command may roll
    #[arg(long, default_value_t = 1000)]
    max_rolls: usize,

    /// Print the canonical notation instead of rolling
    #[arg(long)]
    notation: bool,

    /// Print the game system's usage and exit
    #[arg(long)]
    usage: bool,

    /// Command to run (if not provided, reads lines from stdin)
    command: Option<String>,
}

struct Session {
    game: GameSystem,
    evaluator: Evaluator<StdRng>,
    notation: bool,
}

impl Session {
    fn run_line(&mut self, line: &str) {
        if self.notation {
            match rust_dicebot::parse("stdin", line.trim()) {
                Ok(command) => {
                    debug!(sexp = %command.sexp(), "parsed");
                    println!("{}", command_notation(&command, false));
                }
                Err(err) => eprintln!("Error: {}", err),
            }
            return;
        }

        match self.game.execute(line, &mut self.evaluator) {
            Some(result) => println!("{}", result),
            None => eprintln!("not a command: {:?}", line),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    use tracing_subscriber::{fmt, EnvFilter};

    // RUST_LOG overrides the default of warn
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let game = GameSystem::find(&args.game)
        .ok_or_else(|| format!("unknown game system: {}", args.game))?;
    if args.usage {
        println!("{} ({})\n{}", game.game_name(), game.game_id(), game.usage());
        return Ok(());
    }

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let options = EvalOptions {
        max_rolls: Some(args.max_rolls),
    };
    let mut session = Session {
        game,
        evaluator: Evaluator::with_options(options, rng),
        notation: args.notation,
    };

    if let Some(command) = args.command {
        session.run_line(&command);
        return Ok(());
    }

    let stdin = io::stdin();
    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            session.run_line(&line);
        }
        print!("> ");
        io::stdout().flush()?;
    }
    println!();
    Ok(())
}

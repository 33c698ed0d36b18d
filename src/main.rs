use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};

use sketchsynth::dsl::arith::{Arith, Num};
use sketchsynth::dsl::query;
use sketchsynth::{Example, SearchBudget, SearchOutcome, SynthError, Synthesizer, DEFAULT_SKETCH_LIMIT};

#[derive(Debug, Parser)]
#[command(name = "sketchsynth", about = "Synthesize DSL programs from an input/output example")]
struct Cli {
    /// More output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Maximum number of sketches to dequeue.
    #[arg(long, default_value_t = DEFAULT_SKETCH_LIMIT)]
    budget: usize,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search an arithmetic expression producing OUTPUT from the inputs.
    Arith {
        #[arg(long, allow_hyphen_values = true)]
        output: Num,
        /// Input value, may be repeated. Inputs enable `param` leaves.
        #[arg(long = "input", allow_hyphen_values = true)]
        inputs: Vec<Num>,
        /// Constant candidate, may be repeated.
        #[arg(long = "constant", allow_hyphen_values = true, default_values_t = [0, 1, 2])]
        constants: Vec<Num>,
        /// Only list the first N candidates, without evaluating them.
        #[arg(long, value_name = "N")]
        enumerate: Option<usize>,
    },
    /// Print the query pipeline grammar.
    Query,
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(cli: Cli) -> Result<ExitCode, SynthError> {
    let budget = SearchBudget::new(cli.budget);

    match cli.command {
        Command::Arith {
            output,
            inputs,
            constants,
            enumerate,
        } => {
            let arith = Arith::new(constants, !inputs.is_empty());
            let example = Example::new(output, inputs);
            let synth = Synthesizer::new(arith.grammar(), &arith, &arith)?.with_budget(budget);

            info!("Grammar:\n{}", arith.grammar());

            if let Some(n) = enumerate {
                for (idx, cand) in synth.enumerate(&example).take(n).enumerate() {
                    println!("{idx:>6}  {}", cand.display(arith.grammar()));
                }
                return Ok(ExitCode::SUCCESS);
            }

            match synth.synthesize(&example)? {
                SearchOutcome::Found { program, explored } => {
                    println!("{}", program.display(arith.grammar()).indented());
                    println!("inputs   = {:?}", example.inputs());
                    println!("output   = {}", example.output());
                    println!("explored = {explored}");
                    Ok(ExitCode::SUCCESS)
                }
                SearchOutcome::Exhausted { explored, reason } => {
                    println!("no program found after {explored} sketch(es) ({reason:?})");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Query => {
            println!("{}", query::grammar());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    colog::default_builder()
        .filter_level(level(cli.verbose))
        .init();

    info!("Started");

    run(cli).unwrap_or_else(|e| {
        error!("{e}");
        ExitCode::FAILURE
    })
}

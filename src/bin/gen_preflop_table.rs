//! Preflop equity table generator.
//!
//! Usage:
//!   cargo run --release --bin gen_preflop_table -- [OPTIONS]
//!
//! Simulates every starting-hand class against a random opponent and writes
//! the table in the format loaded by `PreflopEquityTable::from_file`.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use headsup_bot::cards::card::NUM_CLASSES;
use headsup_bot::equity::{write_table, TableGenerator};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Generate the preflop equity table

USAGE:
  gen_preflop_table [OPTIONS]

OPTIONS:
  --samples    N           Simulated deals per hand class  [default: 100000]
  --seed       N           Base random seed                [default: 1592590697]
  --threads    N           Worker threads, 0 for auto      [default: 0]
  --output     FILE        Output file                     [default: stdout]

FLAGS:
  -q, --quiet              Hide the progress bar
  -h, --help               Print help information
";

struct Args {
    samples: usize,
    seed: u64,
    threads: usize,
    output: Option<PathBuf>,
    quiet: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_target(false).init();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let defaults = TableGenerator::default();
    let args = Args {
        samples: pargs
            .opt_value_from_str("--samples")?
            .unwrap_or(defaults.samples_per_class),
        seed: pargs.opt_value_from_str("--seed")?.unwrap_or(defaults.seed),
        threads: pargs.opt_value_from_str("--threads")?.unwrap_or(0),
        output: pargs.opt_value_from_os_str("--output", |s| {
            Ok::<PathBuf, &'static str>(PathBuf::from(s))
        })?,
        quiet: pargs.contains(["-q", "--quiet"]),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        eprintln!("Unknown arguments: {remaining:?}");
        eprint!("{HELP}");
        std::process::exit(2);
    }

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()?;
    }

    info!(
        "generating {} classes x {} samples (seed {}, {} threads)",
        NUM_CLASSES,
        args.samples,
        args.seed,
        rayon::current_num_threads()
    );

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(NUM_CLASSES as u64)
    };
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} classes ({eta})",
        )?
        .progress_chars("#>-"),
    );

    let start = Instant::now();
    let generator = TableGenerator::new(args.samples, args.seed);
    let rates = generator.generate(Some(&pb));
    pb.finish_with_message("done");

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_table(&mut out, &rates)?;
            out.flush()?;
            info!("wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_table(&mut out, &rates)?;
        }
    }

    info!("finished in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

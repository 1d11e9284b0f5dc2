use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use meta_ii::compiler::Compiler;
use meta_ii::error::RunError;
use meta_ii::loader::load;
use meta_ii::vm::VM;

/// META-II virtual machine.
///
/// With no PROGRAM, compiles a META-II grammar from stdin into VM assembly.
/// With a PROGRAM, runs that assembly against stdin.
#[derive(Parser, Debug)]
#[command(name = "m2", version, about)]
struct Cli {
    /// VM assembly (.m2) to execute
    program: Option<PathBuf>,

    /// Log every executed instruction to stderr
    #[arg(long)]
    trace: bool,

    /// Print the loaded program listing to stderr before running
    #[arg(long)]
    dump: bool,
}

fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("meta_ii=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();

    match &cli.program {
        None => Compiler::new(stdin, stdout).compile()?,
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            let program = load(BufReader::new(file))
                .with_context(|| format!("failed to load `{}`", path.display()))?;
            if cli.dump {
                eprint!("{}", program.listing());
            }
            VM::new(program).run(stdin, stdout)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.trace);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<RunError>() {
                Some(RunError::Fault(fault)) => {
                    if let Err(err) = fault.report(&mut io::stderr().lock()) {
                        error!(%err, "could not write fault report");
                    }
                }
                _ => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

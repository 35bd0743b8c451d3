#[cfg(target_os = "linux")]
use std::os::linux::fs::MetadataExt;

use std::{
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use thiserror::Error;

use clap::Parser;
use ringtape::{
    execute,
    settings::{Engine, Settings, DEFAULT_CELLS},
    tape::{TapeError, VecTape},
    ExecuteCallbackData, ExecuteCallbackResult, ExecutionError, TapeAddr,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("Failed to read program: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to allocate tape: {0}")]
    TapeError(#[from] TapeError),
    #[error("{0}")]
    ExecutionError(#[from] ExecutionError),
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Brainfuck source file (standard input if not given)
    input_file: Option<PathBuf>,

    /// Number of cells on the tape
    #[arg(short = 'n', long, value_name = "N", default_value_t = DEFAULT_CELLS, value_parser = parse_cells)]
    cells: usize,

    /// Select how loops are executed
    #[arg(short, long, value_name = "ENGINE", default_value_t = Engine::default(), value_enum)]
    engine: Engine,

    /// Log every executed instruction to stderr
    #[arg(long, default_value_t = false)]
    trace: bool,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            cells: self.cells,
            engine: self.engine,
        }
    }
}

fn parse_cells(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("the tape needs at least one cell".into()),
        Ok(n) => Ok(n),
        Err(err) => Err(format!("invalid number of cells: {err}")),
    }
}

fn init_logging(trace: bool) {
    let default = if trace { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_source(args: &Args) -> Result<Vec<u8>, io::Error> {
    let Some(ref path) = args.input_file else {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        return Ok(buf);
    };
    let mut file = std::fs::File::open(path)?;

    #[cfg(target_os = "linux")]
    let mut buf = Vec::with_capacity(file.metadata()?.st_size() as usize);
    #[cfg(not(target_os = "linux"))]
    let mut buf = Vec::new();

    file.read_to_end(&mut buf)?;
    Ok(buf)
}

fn run(args: &Args) -> Result<(), ProgramError> {
    let code = read_source(args)?;
    let settings = args.settings();
    let mut tape = VecTape::new(settings.cells)?;
    let mut tape_ptr = TapeAddr::new(0);

    let trace = args.trace;
    execute(
        &code,
        settings.engine,
        &mut tape,
        &mut tape_ptr,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut |data, tape, tp| {
            if trace {
                match data {
                    ExecuteCallbackData::Instruction { position, token } => {
                        let cell = tape.get(tp);
                        tracing::trace!(position, ?token, cursor = %tp, %cell);
                    }
                    ExecuteCallbackData::LoopIteration { start } => {
                        tracing::trace!(start, cursor = %tp, "next iteration");
                    }
                };
            }
            ExecuteCallbackResult::Continue
        },
    )?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.trace);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

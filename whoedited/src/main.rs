use clap::Parser;
use human_panic::setup_panic;

mod commands;
use commands::*;

#[derive(Parser, Debug)]
#[clap(version, author, about)]
pub struct Opts {
    /// Log more (-v for progress, -vv for debugging). RUST_LOG takes precedence.
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Parser, Debug)]
pub enum SubCommand {
    /// Lists the edits other users made after the target user
    Trace(Trace),
    /// Generates shell completion scripts
    #[clap(name = "completions")]
    Completion(Completion),
}

fn main() {
    setup_panic!();

    let opts = Opts::parse();
    let level = match opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match opts.subcmd {
        SubCommand::Trace(trace) => trace.run(),
        SubCommand::Completion(completion) => completion.run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// Exit status for a failed run, by error class.
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<libwhoedited::Error>() {
        Some(libwhoedited::Error::Config(_)) => exitcode::CONFIG,
        Some(libwhoedited::Error::Source(_)) => exitcode::DATAERR,
        Some(libwhoedited::Error::Output(_)) => exitcode::IOERR,
        None => exitcode::SOFTWARE,
    }
}

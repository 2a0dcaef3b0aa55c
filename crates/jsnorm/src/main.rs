use clap::Parser;
use jsnorm::commands::normalize::{self, NormalizeArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Normalize minified and machine-generated JavaScript into readable source.
#[derive(Parser)]
#[command(name = "jsnorm", version)]
struct Cli {
    #[command(flatten)]
    args: NormalizeArgs,

    /// Log rewrites to stderr (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Reset SIGPIPE to default behavior so piping to `head` etc. doesn't panic.
#[cfg(unix)]
fn reset_sigpipe() {
    // SAFETY: libc::signal is a standard POSIX function. We reset SIGPIPE to default
    // behavior (terminate on broken pipe) instead of Rust's default (ignore, causing
    // write errors). No memory safety concerns - just changes signal disposition.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}

/// RUST_LOG wins when set; otherwise warnings only unless -v is given.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    reset_sigpipe();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if let Err(e) = normalize::run(&cli.args, &root) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

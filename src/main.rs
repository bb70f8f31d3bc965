use clap::{CommandFactory, Parser};
use colored::*;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod properties;
mod provision;
mod stl;
mod util;

use config::Config;
use error::Result;

/// Point the gradle projects of a source tree at the NDK shipped with the
/// V8 tools checkout, cloning the checkout first if it is missing.
#[derive(Parser, Debug)]
#[command(long_about = None, disable_help_flag = true)]
struct Args {
    /// Root of the source tree to prepare.
    #[arg(long)]
    root_path: PathBuf,

    /// Location of the V8 tools checkout.
    #[arg(long)]
    v8_tools_path: PathBuf,
}

fn main() {
    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => std::process::exit(code),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "error".red(), e);
        std::process::exit(1);
    }
}

/// Parse the command line. Both options must be given as separate
/// `--flag value` tokens. On failure the usage is printed to stdout and the
/// exit code is returned.
fn parse_args<I, T>(argv: I) -> std::result::Result<Args, i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    // program name plus two flags and two values
    if argv.len() < 5 {
        println!("{}", Args::command().render_usage());
        return Err(1);
    }
    Args::try_parse_from(argv).map_err(|e| {
        println!("{}", e);
        1
    })
}

fn run(args: &Args) -> Result<()> {
    let settings = config::read_settings(&args.root_path)?;
    let config = Config::new(&args.root_path, &args.v8_tools_path, settings)?;

    let vendor_path = &config.settings.vendor_path;
    let dirs = util::find_project_dirs(&config.root_path, vendor_path)?;
    tracing::debug!(
        "found {} gradle and {} ndk directories",
        dirs.gradle.len(),
        dirs.ndk.len()
    );

    let git = provision::Git::new(&config.settings.git);
    provision::ensure_checkout(&git, &config)?;

    stl::validate_all(&dirs.ndk)?;

    let ndk_dir = config.ndk_dir();
    for dir in &dirs.gradle {
        properties::update_local_properties(dir, &ndk_dir)?;
    }

    Ok(())
}

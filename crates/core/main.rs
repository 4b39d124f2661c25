/*!
`rg`: a line-oriented search tool that recursively searches a set of
paths for a regex pattern while respecting gitignore rules.

This binary wires together the three pieces documented in their own
modules: the pattern/flag parser ([`args`]), the Ignore Stack-aware
Worker Pool driver ([`search`] and [`workers`]), and process-wide
concerns (logging, Ctrl-C cancellation) that don't belong to either.
*/

mod args;
mod cancel;
mod logger;
mod search;
mod workers;

use std::process::ExitCode;

use cancel::Cancelled;

/// Process exit codes, per the CLI contract: `0` on at least one match,
/// `1` on no match, `2` on invalid usage or a pattern that fails to
/// compile.
const EXIT_MATCH: u8 = 0;
const EXIT_NO_MATCH: u8 = 1;
const EXIT_USAGE_ERROR: u8 = 2;

fn main() -> ExitCode {
    let args = match args::parse(lexopt::Parser::from_env()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("rg: {err}");
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    logger::init(args.verbose);

    let cancel = Cancelled::new();
    if let Err(err) = cancel::install_handler(cancel.clone()) {
        log::warn!("failed to install Ctrl-C handler: {err}");
    }

    match search::run(args, cancel) {
        Ok(true) => ExitCode::from(EXIT_MATCH),
        Ok(false) => ExitCode::from(EXIT_NO_MATCH),
        Err(err) => {
            eprintln!("rg: {err:#}");
            ExitCode::from(EXIT_USAGE_ERROR)
        }
    }
}

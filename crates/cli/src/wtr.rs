use std::io;

use termcolor::{ColorChoice, StandardStream, StandardStreamLock};

/// Whether stdout is connected to a terminal, for resolving
/// `--color=auto`.
#[cfg(unix)]
pub fn is_tty_stdout() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}

/// Whether stdout is connected to a terminal, for resolving
/// `--color=auto`.
#[cfg(windows)]
pub fn is_tty_stdout() -> bool {
    winapi_util::console::is_console(winapi_util::HandleRef::stdout())
}

#[cfg(not(any(unix, windows)))]
pub fn is_tty_stdout() -> bool {
    false
}

/// Resolve the user-facing `auto`/`always`/`never` color policy (already
/// downgraded to `never` by the caller if `NO_COLOR` is set) against
/// whether stdout is actually a terminal.
pub fn resolve_color_choice(choice: ColorChoice) -> ColorChoice {
    match choice {
        ColorChoice::Auto if !is_tty_stdout() => ColorChoice::Never,
        other => other,
    }
}

/// Build the process's stdout writer with the given color policy already
/// resolved against terminal detection.
pub fn stdout(choice: ColorChoice) -> StandardStream {
    StandardStream::stdout(resolve_color_choice(choice))
}

/// Lock `wtr` for the lifetime of a single search run. A thin wrapper to
/// keep call sites symmetric with [`stdout`].
pub fn stdout_locked(wtr: &StandardStream) -> StandardStreamLock<'_> {
    wtr.lock()
}

/// Flush `wtr` and map any I/O failure into the caller's error type at the
/// boundary where the process is about to exit.
pub fn flush(wtr: &mut impl io::Write) -> io::Result<()> {
    wtr.flush()
}

/*!
Logger initialization. Diagnostic messages (skipped paths, ignore file
parse errors, worker-local I/O failures) are logged at `warn`/`debug`
and controlled the usual way, via `RUST_LOG`.
*/

/// Initialize the global logger. `verbose` raises the default filter
/// from `warn` to `debug` when no `RUST_LOG` override is present (stacks
/// with repeated `-v`/`-vv` the same way `env_logger`'s default filter
/// does).
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_module_path(false)
        .init();
}

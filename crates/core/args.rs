/*!
Parses the CLI surface: `PATTERN PATH...` plus the pattern/context/
traversal/limit/output/color/control flags, via `lexopt`.
*/

use std::path::PathBuf;

use lexopt::{Arg, ValueExt};

/// How matches should be colorized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColorMode {
    /// Color only when stdout is a terminal.
    Auto,
    /// Always emit ANSI color codes.
    Always,
    /// Never emit ANSI color codes.
    Never,
}

/// Which output format the Formatter should use.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    /// The default grouped/no-heading human-readable format.
    Standard,
    /// `-l`/`--files-with-matches`.
    FilesWithMatches,
    /// `-c`/`--count`.
    Count,
    /// `--json`: one document at the end of the run.
    Json,
    /// `--json-stream`: NDJSON events as the run progresses.
    JsonStream,
}

/// Every flag and positional argument accepted by the search subcommand.
#[derive(Clone, Debug)]
pub struct Args {
    pub pattern: String,
    pub paths: Vec<PathBuf>,

    pub fixed_strings: bool,
    pub word_regexp: bool,
    pub ignore_case: bool,
    pub smart_case: bool,
    pub invert_match: bool,

    pub before_context: usize,
    pub after_context: usize,

    pub hidden: bool,
    pub no_ignore: bool,
    pub follow: bool,
    pub max_depth: Option<usize>,
    pub type_select: Vec<String>,
    pub type_negate: Vec<String>,
    pub globs: Vec<String>,

    pub max_count: Option<u64>,
    pub threads: Option<usize>,

    pub line_number: bool,
    pub column: bool,
    pub only_matching: bool,
    pub no_heading: bool,
    pub replace: Option<String>,
    pub trim: bool,
    pub quiet: bool,

    pub color: ColorMode,
    pub color_specs: Vec<String>,

    pub format: OutputFormat,
    pub verbose: bool,
}

impl Default for Args {
    fn default() -> Args {
        Args {
            pattern: String::new(),
            paths: Vec::new(),
            fixed_strings: false,
            word_regexp: false,
            ignore_case: false,
            smart_case: false,
            invert_match: false,
            before_context: 0,
            after_context: 0,
            hidden: false,
            no_ignore: false,
            follow: false,
            max_depth: None,
            type_select: Vec::new(),
            type_negate: Vec::new(),
            globs: Vec::new(),
            max_count: None,
            threads: None,
            line_number: true,
            column: false,
            only_matching: false,
            no_heading: false,
            replace: None,
            trim: false,
            quiet: false,
            color: ColorMode::Auto,
            color_specs: Vec::new(),
            format: OutputFormat::Standard,
            verbose: false,
        }
    }
}

/// A command-line usage error, reported to the user and mapped to exit
/// code 2.
#[derive(Debug)]
pub struct UsageError(pub String);

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UsageError {}

impl From<lexopt::Error> for UsageError {
    fn from(err: lexopt::Error) -> UsageError {
        UsageError(err.to_string())
    }
}

/// Parse `argv` (excluding the program name) into [`Args`].
pub fn parse(raw: lexopt::Parser) -> Result<Args, UsageError> {
    let mut parser = raw;
    let mut args = Args::default();
    let mut context: Option<usize> = None;
    let mut files_with_matches = false;
    let mut count = false;
    let mut json = false;
    let mut json_stream = false;
    let mut positionals: Vec<String> = Vec::new();

    while let Some(arg) = parser.next()? {
        match arg {
            Arg::Short('F') | Arg::Long("fixed-strings") => args.fixed_strings = true,
            Arg::Short('w') | Arg::Long("word-regexp") => args.word_regexp = true,
            Arg::Short('i') | Arg::Long("ignore-case") => args.ignore_case = true,
            Arg::Short('S') | Arg::Long("smart-case") => args.smart_case = true,
            Arg::Short('v') | Arg::Long("invert-match") => args.invert_match = true,

            Arg::Short('A') => args.after_context = parser.value()?.parse()?,
            Arg::Short('B') => args.before_context = parser.value()?.parse()?,
            Arg::Short('C') => context = Some(parser.value()?.parse()?),

            Arg::Long("hidden") => args.hidden = true,
            Arg::Long("no-ignore") => args.no_ignore = true,
            Arg::Short('L') | Arg::Long("follow") => args.follow = true,
            Arg::Long("max-depth") => args.max_depth = Some(parser.value()?.parse()?),
            Arg::Short('t') => args.type_select.push(parser.value()?.string()?),
            Arg::Short('T') => args.type_negate.push(parser.value()?.string()?),
            Arg::Short('g') => args.globs.push(parser.value()?.string()?),

            Arg::Short('m') | Arg::Long("max-count") => {
                args.max_count = Some(parser.value()?.parse()?)
            }
            Arg::Long("threads") => args.threads = Some(parser.value()?.parse()?),

            Arg::Short('n') | Arg::Long("line-number") => args.line_number = true,
            Arg::Long("column") => args.column = true,
            Arg::Short('l') | Arg::Long("files-with-matches") => files_with_matches = true,
            Arg::Short('c') | Arg::Long("count") => count = true,
            Arg::Short('o') | Arg::Long("only-matching") => args.only_matching = true,
            Arg::Long("no-heading") => args.no_heading = true,
            Arg::Long("json") => json = true,
            Arg::Long("json-stream") => json_stream = true,
            Arg::Short('r') | Arg::Long("replace") => {
                args.replace = Some(parser.value()?.string()?)
            }
            Arg::Long("trim") => args.trim = true,

            Arg::Long("color") => {
                args.color = match parser.value()?.string()?.as_str() {
                    "auto" => ColorMode::Auto,
                    "always" => ColorMode::Always,
                    "never" => ColorMode::Never,
                    other => {
                        return Err(UsageError(format!(
                            "invalid --color value: {other}"
                        )))
                    }
                };
            }
            Arg::Long("colors") => args.color_specs.push(parser.value()?.string()?),

            Arg::Short('q') | Arg::Long("quiet") => args.quiet = true,
            Arg::Long("verbose") => args.verbose = true,

            Arg::Value(val) => positionals.push(val.string()?),
            _ => return Err(UsageError(format!("unrecognized argument: {arg:?}"))),
        }
    }

    if let Some(n) = context {
        args.before_context = n;
        args.after_context = n;
    }

    args.format = if json_stream {
        OutputFormat::JsonStream
    } else if json {
        OutputFormat::Json
    } else if count {
        OutputFormat::Count
    } else if files_with_matches {
        OutputFormat::FilesWithMatches
    } else {
        OutputFormat::Standard
    };

    if positionals.is_empty() {
        return Err(UsageError("no pattern given".to_string()));
    }
    args.pattern = positionals.remove(0);
    args.paths = if positionals.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        positionals.into_iter().map(PathBuf::from).collect()
    };

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(argv: &[&str]) -> Result<Args, UsageError> {
        let parser = lexopt::Parser::from_args(argv.iter().map(|s| s.to_string()));
        parse(parser)
    }

    #[test]
    fn minimal_pattern_and_default_path() {
        let args = parse_str(&["needle"]).unwrap();
        assert_eq!(args.pattern, "needle");
        assert_eq!(args.paths, vec![PathBuf::from(".")]);
        assert!(args.line_number);
    }

    #[test]
    fn context_flag_sets_both_before_and_after() {
        let args = parse_str(&["-C", "2", "needle"]).unwrap();
        assert_eq!(args.before_context, 2);
        assert_eq!(args.after_context, 2);
    }

    #[test]
    fn json_stream_wins_over_json() {
        let args = parse_str(&["--json", "--json-stream", "needle"]).unwrap();
        assert_eq!(args.format, OutputFormat::JsonStream);
    }

    #[test]
    fn missing_pattern_is_a_usage_error() {
        assert!(parse_str(&[]).is_err());
    }

    #[test]
    fn multiple_paths_and_type_filters() {
        let args =
            parse_str(&["-t", "rust", "-T", "py", "needle", "src", "lib"]).unwrap();
        assert_eq!(args.type_select, vec!["rust".to_string()]);
        assert_eq!(args.type_negate, vec!["py".to_string()]);
        assert_eq!(args.paths, vec![PathBuf::from("src"), PathBuf::from("lib")]);
    }
}

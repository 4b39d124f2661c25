/*!
The Driver: compiles the pattern, builds the Ignore Stack-aware Walker
for every root, picks a thread count (1 worker is the serial strategy,
more is the parallel one; the collector code path is identical either
way), and drives the chosen Formatter to completion.
*/

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use grep::cli;
use grep::printer::{
    ColorSpecs, JsonBuilder, JsonStreamBuilder, Stats, StandardBuilder, SummaryBuilder,
    SummaryKind, UserColorSpec,
};
use grep::regex::{RegexMatcher, RegexMatcherBuilder};
use grep::searcher::SearcherBuilder;
use ignore::overrides::{OverrideBuilder, Overrides};
use ignore::types::{Types, TypesBuilder};
use ignore::{WalkBuilder, WalkState};
use termcolor::{Ansi, ColorChoice, NoColor, WriteColor};

use crate::args::{Args, ColorMode, OutputFormat};
use crate::cancel::Cancelled;
use crate::workers::{spawn, FileOutput, Render};

/// Run one search end to end and return whether anything matched.
pub fn run(args: Args, cancel: Cancelled) -> Result<bool> {
    let matcher = Arc::new(compile_matcher(&args)?);
    let searcher_cfg = build_searcher(&args);
    let color_choice = resolve_color(&args);
    let colors = build_colors(&args)?;

    let types = build_types(&args)?;
    let negate = build_negate_types(&args)?;
    let overrides = build_overrides(&args)?;

    let paths = collect_paths(&args, &types, &negate, &overrides);

    let threads = args
        .threads
        .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
        .max(1);

    match args.format {
        OutputFormat::Standard => {
            run_standard(&args, matcher, searcher_cfg, color_choice, colors, paths, threads, cancel)
        }
        OutputFormat::FilesWithMatches => run_summary(
            SummaryKind::PathOnly,
            &args,
            matcher,
            searcher_cfg,
            color_choice,
            colors,
            paths,
            threads,
            cancel,
        ),
        OutputFormat::Count => run_summary(
            SummaryKind::PathAndCount,
            &args,
            matcher,
            searcher_cfg,
            color_choice,
            colors,
            paths,
            threads,
            cancel,
        ),
        OutputFormat::Json => run_json(&args, matcher, searcher_cfg, paths, threads, cancel),
        OutputFormat::JsonStream => {
            run_json_stream(&args, matcher, searcher_cfg, paths, threads, cancel)
        }
    }
}

fn compile_matcher(args: &Args) -> Result<RegexMatcher> {
    RegexMatcherBuilder::new()
        .case_insensitive(args.ignore_case)
        .case_smart(args.smart_case)
        .whole_word(args.word_regexp)
        .fixed_strings(args.fixed_strings)
        .build(&args.pattern)
        .with_context(|| format!("invalid pattern: {}", cli::escape(args.pattern.as_bytes())))
}

fn build_searcher(args: &Args) -> SearcherBuilder {
    let mut builder = SearcherBuilder::new();
    builder
        .before_context(args.before_context)
        .after_context(args.after_context)
        .invert_match(args.invert_match)
        .max_matches(args.max_count);
    builder
}

fn resolve_color(args: &Args) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    let choice = match args.color {
        ColorMode::Auto => ColorChoice::Auto,
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
    };
    cli::resolve_color_choice(choice)
}

fn build_colors(args: &Args) -> Result<ColorSpecs> {
    let mut specs = grep::printer::default_color_specs();
    for raw in &args.color_specs {
        let spec: UserColorSpec =
            raw.parse().map_err(|e| anyhow!("invalid --colors spec '{raw}': {e}"))?;
        specs.push(spec);
    }
    Ok(ColorSpecs::new(&specs))
}

fn build_types(args: &Args) -> Result<Types> {
    let mut builder = TypesBuilder::new();
    for name in &args.type_select {
        builder.select(name);
    }
    Ok(builder.build())
}

fn build_negate_types(args: &Args) -> Result<Types> {
    let mut builder = TypesBuilder::new();
    for name in &args.type_negate {
        builder.select(name);
    }
    Ok(builder.build())
}

fn build_overrides(args: &Args) -> Result<Overrides> {
    let mut builder = OverrideBuilder::new();
    for glob in &args.globs {
        builder.add(glob).map_err(|e| anyhow!("invalid -g glob '{glob}': {e}"))?;
    }
    Ok(builder.build())
}

/// Walk every root and collect the admitted file paths up front. The
/// Walker itself already applies hidden/ignore/depth/type/glob policy;
/// `negate` (from `-T`) has no positive-selection counterpart in
/// [`ignore::types::Types`], so it's applied here as a post-filter.
fn collect_paths(
    args: &Args,
    types: &Types,
    negate: &Types,
    overrides: &Overrides,
) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(&args.paths[0]);
    for extra in &args.paths[1..] {
        builder.add(extra);
    }
    builder
        .hidden(!args.hidden)
        .follow_links(args.follow)
        .max_depth(args.max_depth)
        .respect_ignore(!args.no_ignore)
        .types(types.clone())
        .overrides(overrides.clone());
    let walker = builder.build();

    let mut paths = Vec::new();
    walker.run(
        |entry| {
            if !entry.is_dir() {
                if negate.is_empty() || !negate.is_match(entry.path()) {
                    paths.push(entry.path().to_path_buf());
                }
            }
            WalkState::Continue
        },
        |err| log::warn!("{}", err),
    );
    paths
}

fn wrap_writer(choice: ColorChoice, f: impl FnOnce(&mut dyn WriteColor)) -> Vec<u8> {
    match choice {
        ColorChoice::Never => {
            let mut wtr = NoColor::new(Vec::new());
            f(&mut wtr);
            wtr.into_inner()
        }
        _ => {
            let mut wtr = Ansi::new(Vec::new());
            f(&mut wtr);
            wtr.into_inner()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_standard(
    args: &Args,
    matcher: Arc<RegexMatcher>,
    searcher_cfg: SearcherBuilder,
    color_choice: ColorChoice,
    colors: ColorSpecs,
    paths: Vec<PathBuf>,
    threads: usize,
    cancel: Cancelled,
) -> Result<bool> {
    let mut builder = StandardBuilder::new();
    builder
        .heading(!args.no_heading)
        .with_filename(true)
        .line_number(args.line_number)
        .column(args.column)
        .only_matching(args.only_matching)
        .trim(args.trim)
        .replacement(args.replace.as_ref().map(|s| s.as_bytes().to_vec()))
        .color_specs(colors.clone());
    let cfg = Arc::new(builder);

    let render: Arc<Render> = {
        let matcher = Arc::clone(&matcher);
        let searcher_cfg = searcher_cfg.clone();
        let cfg = Arc::clone(&cfg);
        Arc::new(move |path: &Path| -> io::Result<FileOutput> {
            let file = std::fs::File::open(path)?;
            let mut match_count = 0u64;
            let mut search_err = None;
            let bytes = wrap_writer(color_choice, |wtr| {
                let mut printer = cfg.build(BoxWriteColor(wtr));
                let mut sink = printer.sink(matcher.as_ref(), path);
                if let Err(err) = searcher_cfg.build().search_reader(matcher.as_ref(), &file, &mut sink) {
                    search_err = Some(err);
                }
                match_count = sink.match_count();
            });
            if let Some(err) = search_err {
                return Err(err);
            }
            Ok(FileOutput { path: path.to_path_buf(), bytes, match_count, json_file: None })
        })
    };

    let quiet = args.quiet;
    let stdout = cli::stdout(color_choice);
    let mut wtr = stdout.lock();
    let total = AtomicU64::new(0);
    let rx = spawn(threads, paths, render, cancel.clone());
    for out in rx {
        if out.match_count > 0 {
            total.fetch_add(out.match_count, Ordering::Relaxed);
            if quiet {
                cancel.set();
                continue;
            }
            wtr.write_all(&out.bytes)?;
        }
    }
    wtr.flush()?;
    Ok(total.load(Ordering::Relaxed) > 0)
}

#[allow(clippy::too_many_arguments)]
fn run_summary(
    kind: SummaryKind,
    args: &Args,
    matcher: Arc<RegexMatcher>,
    searcher_cfg: SearcherBuilder,
    color_choice: ColorChoice,
    colors: ColorSpecs,
    paths: Vec<PathBuf>,
    threads: usize,
    cancel: Cancelled,
) -> Result<bool> {
    let mut builder = SummaryBuilder::new(kind);
    builder.with_filename(true).color_specs(colors);
    let cfg = Arc::new(builder);
    let quiet = args.quiet;

    let render: Arc<Render> = {
        let matcher = Arc::clone(&matcher);
        let searcher_cfg = searcher_cfg.clone();
        let cfg = Arc::clone(&cfg);
        Arc::new(move |path: &Path| -> io::Result<FileOutput> {
            let file = std::fs::File::open(path)?;
            let mut match_count = 0u64;
            let mut search_err = None;
            let bytes = wrap_writer(color_choice, |wtr| {
                let mut printer = cfg.build(BoxWriteColor(wtr));
                {
                    let mut sink = printer.sink(path);
                    if let Err(err) =
                        searcher_cfg.build().search_reader(matcher.as_ref(), &file, &mut sink)
                    {
                        search_err = Some(err);
                    }
                }
                match_count = printer.stats().matches();
            });
            if let Some(err) = search_err {
                return Err(err);
            }
            Ok(FileOutput { path: path.to_path_buf(), bytes, match_count, json_file: None })
        })
    };

    let stdout = cli::stdout(color_choice);
    let mut wtr = stdout.lock();
    let mut any_match = false;
    let rx = spawn(threads, paths, render, cancel.clone());
    for out in rx {
        if out.match_count > 0 {
            any_match = true;
            if quiet {
                cancel.set();
                continue;
            }
            wtr.write_all(&out.bytes)?;
        }
    }
    wtr.flush()?;
    Ok(any_match)
}

fn run_json(
    args: &Args,
    matcher: Arc<RegexMatcher>,
    searcher_cfg: SearcherBuilder,
    paths: Vec<PathBuf>,
    threads: usize,
    cancel: Cancelled,
) -> Result<bool> {
    let mut builder = JsonBuilder::new();
    builder.only_matching(args.only_matching).column(args.column);
    let cfg = Arc::new(builder);

    let render: Arc<Render> = {
        let matcher = Arc::clone(&matcher);
        let searcher_cfg = searcher_cfg.clone();
        let cfg = Arc::clone(&cfg);
        Arc::new(move |path: &Path| -> io::Result<FileOutput> {
            let file = std::fs::File::open(path)?;
            let mut accumulator = cfg.build();
            {
                let mut sink = accumulator.sink(matcher.as_ref(), path);
                searcher_cfg.build().search_reader(matcher.as_ref(), &file, &mut sink)?;
            }
            let match_count = accumulator.stats().matches();
            let json_file = accumulator.into_files().into_iter().next();
            Ok(FileOutput { path: path.to_path_buf(), bytes: Vec::new(), match_count, json_file })
        })
    };

    let quiet = args.quiet;
    let mut stats = Stats::new();
    let mut files = Vec::new();
    let rx = spawn(threads, paths, render, cancel.clone());
    for out in rx {
        stats.add(out.match_count);
        if out.match_count > 0 && quiet {
            cancel.set();
            continue;
        }
        if let Some(jf) = out.json_file {
            files.push(jf);
        }
    }

    if !quiet {
        let stdout_handle = io::stdout();
        let mut wtr = stdout_handle.lock();
        serde_json::to_writer(
            &mut wtr,
            &serde_json::json!({
                "files": files,
                "total_files": stats.files_with_matches(),
                "total_matches": stats.matches(),
            }),
        )?;
        wtr.write_all(b"\n")?;
    }
    Ok(stats.matches() > 0)
}

fn run_json_stream(
    args: &Args,
    matcher: Arc<RegexMatcher>,
    searcher_cfg: SearcherBuilder,
    paths: Vec<PathBuf>,
    threads: usize,
    cancel: Cancelled,
) -> Result<bool> {
    let mut builder = JsonStreamBuilder::new();
    builder.only_matching(args.only_matching).column(args.column);
    let cfg = Arc::new(builder);

    let render: Arc<Render> = {
        let matcher = Arc::clone(&matcher);
        let searcher_cfg = searcher_cfg.clone();
        let cfg = Arc::clone(&cfg);
        Arc::new(move |path: &Path| -> io::Result<FileOutput> {
            let file = std::fs::File::open(path)?;
            let mut stream = cfg.build(Vec::new());
            {
                let mut sink = stream.sink(matcher.as_ref(), path)?;
                searcher_cfg.build().search_reader(matcher.as_ref(), &file, &mut sink)?;
            }
            let match_count = stream.stats().matches();
            let bytes = stream.into_writer();
            Ok(FileOutput { path: path.to_path_buf(), bytes, match_count, json_file: None })
        })
    };

    let quiet = args.quiet;
    let stdout_handle = io::stdout();
    let mut wtr = stdout_handle.lock();
    let mut stats = Stats::new();
    let rx = spawn(threads, paths, render, cancel.clone());
    for out in rx {
        stats.add(out.match_count);
        if out.match_count > 0 && quiet {
            cancel.set();
            continue;
        }
        if !quiet {
            wtr.write_all(&out.bytes)?;
        }
    }
    if !quiet {
        serde_json::to_writer(
            &mut wtr,
            &serde_json::json!({
                "type": "summary",
                "data": {
                    "total_files": stats.files_with_matches(),
                    "total_matches": stats.matches(),
                },
            }),
        )?;
        wtr.write_all(b"\n")?;
    }
    Ok(stats.matches() > 0)
}

/// A `&mut dyn WriteColor` adapter so the per-file render closures can be
/// generic over a trait object instead of over a concrete writer type.
struct BoxWriteColor<'a>(&'a mut dyn WriteColor);

impl<'a> io::Write for BoxWriteColor<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> WriteColor for BoxWriteColor<'a> {
    fn supports_color(&self) -> bool {
        self.0.supports_color()
    }
    fn set_color(&mut self, spec: &termcolor::ColorSpec) -> io::Result<()> {
        self.0.set_color(spec)
    }
    fn reset(&mut self) -> io::Result<()> {
        self.0.reset()
    }
}

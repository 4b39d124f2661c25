/*!
The dir module implements an Ignore Stack: the layered collection of
Ignore Sets consulted while walking a single root, combining built-in
defaults, the global user ignore file, `.git/info/exclude` and the
hierarchy of `.gitignore`/`.ignore` files from the repository root down
to the search directory.
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::gitignore::{Gitignore, GitignoreBuilder};
use crate::{Error, Match, PartialErrorBuilder};

const IGNORE_FILE_NAMES: &[&str] = &[".gitignore", ".ignore"];

/// A single layer of the Ignore Stack.
#[derive(Clone, Debug)]
struct Layer {
    matcher: Gitignore,
}

impl Layer {
    fn matched<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> Match<()> {
        self.matcher.matched(path, is_dir).map(|_| ())
    }
}

/// An Ignore Stack: every layer of ignore rules that applies to paths
/// underneath a single root, evaluated earliest-layer-first with
/// later layers overriding earlier ones.
#[derive(Clone, Debug)]
pub struct Ignore(Arc<IgnoreInner>);

#[derive(Debug)]
struct IgnoreInner {
    root: PathBuf,
    layers: Vec<Layer>,
}

impl Ignore {
    /// The base directory that paths passed to [`Ignore::matched`] are
    /// relative to.
    pub fn root(&self) -> &Path {
        &self.0.root
    }

    /// Evaluate `path` (which may be absolute or relative to the
    /// process's current directory) against every layer of this stack,
    /// earliest first, folding each layer's verdict into an
    /// accumulator so that later layers override earlier ones.
    pub fn matched<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> Match<()> {
        let path = path.as_ref();
        let rel = self.relative_to_root(path);
        let mut result = Match::None;
        for layer in &self.0.layers {
            result = result.then(layer.matched(rel, is_dir));
        }
        result
    }

    /// Convenience for `matched(path, is_dir) == Ignore`.
    pub fn should_ignore<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> bool {
        self.matched(path, is_dir).is_ignore()
    }

    fn relative_to_root<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.0.root).unwrap_or(path)
    }
}

/// Builds an [`Ignore`] stack for a single search root.
#[derive(Clone, Debug, Default)]
pub struct IgnoreBuilder {
    no_ignore_global: bool,
    no_ignore_exclude: bool,
    no_ignore_dot: bool,
    case_insensitive: bool,
}

impl IgnoreBuilder {
    /// Create a new builder with every layer enabled by default.
    pub fn new() -> IgnoreBuilder {
        IgnoreBuilder::default()
    }

    /// Disable the `.gitignore`/`.ignore` hierarchy layer.
    pub fn ignore_dot(&mut self, yes: bool) -> &mut IgnoreBuilder {
        self.no_ignore_dot = !yes;
        self
    }

    /// Disable the global user ignore file layer.
    pub fn ignore_global(&mut self, yes: bool) -> &mut IgnoreBuilder {
        self.no_ignore_global = !yes;
        self
    }

    /// Disable the `.git/info/exclude` layer.
    pub fn ignore_vcs_exclude(&mut self, yes: bool) -> &mut IgnoreBuilder {
        self.no_ignore_exclude = !yes;
        self
    }

    /// Toggle case-insensitive pattern matching for every layer.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut IgnoreBuilder {
        self.case_insensitive = yes;
        self
    }

    /// Build the stack rooted at `dir`, the directory that a walk is
    /// about to begin searching from.
    ///
    /// Errors encountered loading optional layers are non-fatal: a
    /// missing or malformed ignore file simply contributes no patterns.
    /// They're collected and returned alongside the built stack so
    /// callers can report them without aborting.
    pub fn build<P: AsRef<Path>>(&self, dir: P) -> (Ignore, Option<Error>) {
        let dir = dir.as_ref();
        let mut errs = PartialErrorBuilder::default();
        let mut layers = Vec::new();

        layers.push(Layer { matcher: common_ignores() });

        if !self.no_ignore_global {
            let (gi, err) = Gitignore::global();
            errs.maybe_push_ignore_io(err);
            if !gi.is_empty() {
                layers.push(Layer { matcher: gi });
            }
        }

        let repo_root = find_repo_root(dir);

        if !self.no_ignore_exclude {
            if let Some(ref root) = repo_root {
                let exclude = root.join(".git").join("info").join("exclude");
                if exclude.is_file() {
                    let (gi, err) = Gitignore::new(&exclude);
                    errs.maybe_push_ignore_io(err);
                    if !gi.is_empty() {
                        layers.push(Layer { matcher: gi });
                    }
                }
            }
        }

        if !self.no_ignore_dot {
            let top = repo_root.clone().unwrap_or_else(|| filesystem_root(dir));
            for ancestor in ancestors_root_first(&top, dir) {
                for name in IGNORE_FILE_NAMES {
                    let path = ancestor.join(name);
                    if !path.is_file() {
                        continue;
                    }
                    let mut builder = GitignoreBuilder::new(&ancestor);
                    builder.case_insensitive(self.case_insensitive);
                    errs.maybe_push_ignore_io(builder.add(&path));
                    match builder.build() {
                        Ok(gi) => {
                            if !gi.is_empty() {
                                layers.push(Layer { matcher: gi });
                            }
                        }
                        Err(err) => errs.push(err),
                    }
                }
            }
        }

        let stack = Ignore(Arc::new(IgnoreInner { root: dir.to_path_buf(), layers }));
        (stack, errs.into_error_option())
    }
}

/// The built-in default ignores applied at the bottom of every stack.
fn common_ignores() -> Gitignore {
    let mut builder = GitignoreBuilder::new("/");
    for pat in [".git", "node_modules", "__pycache__", ".idea", ".vscode"] {
        builder.add_line(None, pat).expect("built-in ignore pattern is valid");
    }
    builder.build().expect("built-in ignore patterns compile")
}

/// Walk parents of `dir` looking for a directory containing a `.git`
/// entry, returning it if found.
fn find_repo_root(dir: &Path) -> Option<PathBuf> {
    let mut cur = Some(dir);
    while let Some(d) = cur {
        if d.join(".git").exists() {
            return Some(d.to_path_buf());
        }
        cur = d.parent();
    }
    None
}

fn filesystem_root(dir: &Path) -> PathBuf {
    dir.ancestors().last().unwrap_or(dir).to_path_buf()
}

/// Every directory from `top` down to and including `target`, root
/// first, suitable for loading ignore files top-down so that deeper
/// files are added (and thus evaluated) after shallower ones.
fn ancestors_root_first(top: &Path, target: &Path) -> Vec<PathBuf> {
    let mut chain = vec![];
    let mut cur = Some(target);
    while let Some(d) = cur {
        chain.push(d.to_path_buf());
        if d == top {
            break;
        }
        cur = d.parent();
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn common_ignores_exclude_git_dir() {
        let ig = common_ignores();
        assert!(ig.matched(".git", true).is_ignore());
        assert!(ig.matched("node_modules", true).is_ignore());
        assert!(!ig.matched("src", true).is_ignore());
    }

    #[test]
    fn stack_layers_hierarchy_root_to_leaf() {
        let tmp = std::env::temp_dir().join(format!(
            "rgrep-ignore-test-{}-{}",
            std::process::id(),
            "stack_layers_hierarchy_root_to_leaf"
        ));
        let sub = tmp.join("sub");
        fs::create_dir_all(&sub).unwrap();
        write(&tmp.join(".gitignore"), "*.log\n");
        write(&sub.join(".gitignore"), "!keep.log\n");

        let (stack, _err) = IgnoreBuilder::new()
            .ignore_global(false)
            .ignore_vcs_exclude(false)
            .build(&sub);

        assert!(stack.matched(sub.join("debug.log"), false).is_ignore());
        assert!(stack.matched(sub.join("keep.log"), false).is_include());

        fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn no_ignore_dot_disables_hierarchy() {
        let tmp = std::env::temp_dir().join(format!(
            "rgrep-ignore-test-{}-{}",
            std::process::id(),
            "no_ignore_dot_disables_hierarchy"
        ));
        fs::create_dir_all(&tmp).unwrap();
        write(&tmp.join(".gitignore"), "*.log\n");

        let (stack, _err) = IgnoreBuilder::new()
            .ignore_dot(false)
            .ignore_global(false)
            .ignore_vcs_exclude(false)
            .build(&tmp);

        assert!(!stack.matched(tmp.join("debug.log"), false).is_ignore());

        fs::remove_dir_all(&tmp).ok();
    }
}

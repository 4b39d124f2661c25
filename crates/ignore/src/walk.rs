/*!
The walk module implements the Walker: recursive directory traversal
that consults the Ignore Stack, applies the hidden-file and symlink
policy, enforces a depth cap, and filters entries by file type and
glob override before handing them to the caller.
*/

use std::fs::{self, DirEntry as FsDirEntry};
use std::path::{Path, PathBuf};

use crate::dir::{Ignore, IgnoreBuilder};
use crate::overrides::Overrides;
use crate::types::Types;
use crate::Error;

/// A single entry produced by a [`Walk`].
#[derive(Clone, Debug)]
pub struct DirEntry {
    path: PathBuf,
    is_dir: bool,
    depth: usize,
}

impl DirEntry {
    /// The path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if and only if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// The depth of this entry relative to the root the walk started
    /// from (the root itself is depth 0).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Controls how a [`Walk`] continues after visiting each entry,
/// returned from a sink closure passed to [`Walk::run`].
pub enum WalkState {
    /// Keep walking.
    Continue,
    /// Stop the walk entirely.
    Quit,
}

/// Builds a [`Walk`] over one or more roots.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    roots: Vec<PathBuf>,
    hidden: bool,
    follow_symlinks: bool,
    max_depth: Option<usize>,
    respect_ignore: bool,
    ignore_builder: IgnoreBuilder,
    types: Types,
    overrides: Overrides,
}

impl WalkBuilder {
    /// Create a builder for a walk starting at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> WalkBuilder {
        WalkBuilder {
            roots: vec![root.as_ref().to_path_buf()],
            hidden: false,
            follow_symlinks: false,
            max_depth: None,
            respect_ignore: true,
            ignore_builder: IgnoreBuilder::new(),
            types: Types::empty(),
            overrides: Overrides::empty(),
        }
    }

    /// Add another root to walk after the first.
    pub fn add<P: AsRef<Path>>(&mut self, root: P) -> &mut WalkBuilder {
        self.roots.push(root.as_ref().to_path_buf());
        self
    }

    /// Whether to descend into hidden entries (those whose name starts
    /// with `.`). Disabled by default.
    pub fn hidden(&mut self, yes: bool) -> &mut WalkBuilder {
        self.hidden = yes;
        self
    }

    /// Whether to follow symlinked directories. Disabled by default.
    pub fn follow_links(&mut self, yes: bool) -> &mut WalkBuilder {
        self.follow_symlinks = yes;
        self
    }

    /// Cap recursion at the given depth (the root is depth 0).
    pub fn max_depth(&mut self, depth: Option<usize>) -> &mut WalkBuilder {
        self.max_depth = depth;
        self
    }

    /// Whether to consult the Ignore Stack at all. Enabled by default.
    pub fn respect_ignore(&mut self, yes: bool) -> &mut WalkBuilder {
        self.respect_ignore = yes;
        self
    }

    /// Disable the global user ignore file layer.
    pub fn ignore_global(&mut self, yes: bool) -> &mut WalkBuilder {
        self.ignore_builder.ignore_global(yes);
        self
    }

    /// Disable the `.gitignore`/`.ignore` hierarchy layer.
    pub fn ignore_dot(&mut self, yes: bool) -> &mut WalkBuilder {
        self.ignore_builder.ignore_dot(yes);
        self
    }

    /// Set the type filter applied to files.
    pub fn types(&mut self, types: Types) -> &mut WalkBuilder {
        self.types = types;
        self
    }

    /// Set the glob override filter applied to files.
    pub fn overrides(&mut self, overrides: Overrides) -> &mut WalkBuilder {
        self.overrides = overrides;
        self
    }

    /// Build the walk, ready to be driven with [`Walk::run`].
    pub fn build(&self) -> Walk {
        Walk {
            roots: self.roots.clone(),
            hidden: self.hidden,
            follow_symlinks: self.follow_symlinks,
            max_depth: self.max_depth,
            respect_ignore: self.respect_ignore,
            ignore_builder: self.ignore_builder.clone(),
            types: self.types.clone(),
            overrides: self.overrides.clone(),
        }
    }
}

/// A recursive directory walk over one or more roots, configured by
/// [`WalkBuilder`].
#[derive(Clone, Debug)]
pub struct Walk {
    roots: Vec<PathBuf>,
    hidden: bool,
    follow_symlinks: bool,
    max_depth: Option<usize>,
    respect_ignore: bool,
    ignore_builder: IgnoreBuilder,
    types: Types,
    overrides: Overrides,
}

impl Walk {
    /// Drive the walk, calling `visit` for every admitted file entry.
    /// Directory reads that fail are reported via `on_error` (not
    /// fatal) and the subtree is skipped.
    ///
    /// `visit` returning [`WalkState::Quit`] stops the walk
    /// immediately, even with roots or subtrees left unvisited.
    pub fn run(
        &self,
        mut visit: impl FnMut(DirEntry) -> WalkState,
        mut on_error: impl FnMut(Error),
    ) {
        for root in &self.roots {
            let meta = match fs::symlink_metadata(root) {
                Ok(meta) => meta,
                Err(err) => {
                    on_error(Error::Io(err).with_path(root));
                    continue;
                }
            };
            let is_dir = meta.is_dir()
                || (meta.is_symlink() && self.follow_symlinks && root.is_dir());
            if !is_dir {
                let entry = DirEntry { path: root.clone(), is_dir: false, depth: 0 };
                if let WalkState::Quit = visit(entry) {
                    return;
                }
                continue;
            }

            let (ignore, err) = self.ignore_builder.build(root);
            if let Some(err) = err {
                on_error(err);
            }

            let mut stack: Vec<(PathBuf, usize)> = vec![(root.clone(), 0)];
            while let Some((dir, depth)) = stack.pop() {
                let entries = match fs::read_dir(&dir) {
                    Ok(entries) => entries,
                    Err(err) => {
                        on_error(Error::Io(err).with_path(&dir).with_depth(depth));
                        continue;
                    }
                };
                for entry in entries {
                    let entry = match entry {
                        Ok(entry) => entry,
                        Err(err) => {
                            on_error(Error::Io(err).with_path(&dir).with_depth(depth));
                            continue;
                        }
                    };
                    match self.visit_entry(&ignore, &entry, depth + 1, &mut stack) {
                        Ok(Some(de)) => {
                            if let WalkState::Quit = visit(de) {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(err) => on_error(err),
                    }
            }
        }
    }

    fn visit_entry(
        &self,
        ignore: &Ignore,
        entry: &FsDirEntry,
        depth: usize,
        stack: &mut Vec<(PathBuf, usize)>,
    ) -> Result<Option<DirEntry>, Error> {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if !self.hidden && name.starts_with('.') {
            return Ok(None);
        }

        let file_type = entry
            .file_type()
            .map_err(|err| Error::Io(err).with_path(&path).with_depth(depth))?;
        let is_symlink = file_type.is_symlink();
        let is_dir = if is_symlink {
            self.follow_symlinks && path.is_dir()
        } else {
            file_type.is_dir()
        };

        if self.respect_ignore && ignore.should_ignore(&path, is_dir) {
            return Ok(None);
        }

        if let Some(max) = self.max_depth {
            if depth > max {
                return Ok(None);
            }
        }

        if is_dir {
            if is_symlink && !self.follow_symlinks {
                return Ok(None);
            }
            stack.push((path.clone(), depth));
            return Ok(Some(DirEntry { path, is_dir: true, depth }));
        }

        if !self.types.is_empty() && !self.types.is_match(&path) {
            return Ok(None);
        }
        if !self.overrides.is_empty() && !self.overrides.matched(&path) {
            return Ok(None);
        }

        Ok(Some(DirEntry { path, is_dir: false, depth }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};

    fn tmp(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "rgrep-walk-test-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn walks_files_and_skips_hidden() {
        let root = tmp("walks_files_and_skips_hidden");
        fs::write(root.join("a.txt"), "x").unwrap();
        fs::write(root.join(".hidden"), "x").unwrap();

        let walk = WalkBuilder::new(&root).build();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        walk.run(
            move |de| {
                if !de.is_dir() {
                    seen2.lock().unwrap().push(de.path().to_path_buf());
                }
                WalkState::Continue
            },
            |_| {},
        );
        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|p| p.ends_with("a.txt")));
        assert!(!seen.iter().any(|p| p.ends_with(".hidden")));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn respects_gitignore() {
        let root = tmp("respects_gitignore");
        fs::write(root.join(".gitignore"), "*.log\n").unwrap();
        fs::write(root.join("keep.txt"), "x").unwrap();
        fs::write(root.join("drop.log"), "x").unwrap();

        let walk = WalkBuilder::new(&root)
            .ignore_global(false)
            .build();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        walk.run(
            move |de| {
                if !de.is_dir() {
                    seen2.lock().unwrap().push(de.path().to_path_buf());
                }
                WalkState::Continue
            },
            |_| {},
        );
        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|p| p.ends_with("keep.txt")));
        assert!(!seen.iter().any(|p| p.ends_with("drop.log")));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn max_depth_prunes_subdirectories() {
        let root = tmp("max_depth_prunes_subdirectories");
        let sub = root.join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("deep.txt"), "x").unwrap();
        fs::write(root.join("shallow.txt"), "x").unwrap();

        let walk = WalkBuilder::new(&root).max_depth(Some(1)).build();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        walk.run(
            move |de| {
                if !de.is_dir() {
                    seen2.lock().unwrap().push(de.path().to_path_buf());
                }
                WalkState::Continue
            },
            |_| {},
        );
        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|p| p.ends_with("shallow.txt")));
        assert!(!seen.iter().any(|p| p.ends_with("deep.txt")));

        fs::remove_dir_all(&root).ok();
    }
}

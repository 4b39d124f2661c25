/*!
Fixed mapping from symbolic file-type names (e.g. "go", "py") to the
extensions and basenames they cover, used by the Walker's `-t`/`-T`
filters.
*/

use std::collections::HashSet;
use std::path::Path;

/// A definition: a symbolic type name and the glob-like suffixes it
/// covers. Entries starting with `.` are matched as the whole
/// lowercase file name; other entries are matched as an extension.
struct Def {
    name: &'static str,
    globs: &'static [&'static str],
}

const DEFS: &[Def] = &[
    Def { name: "rust", globs: &["rs"] },
    Def { name: "go", globs: &["go"] },
    Def { name: "py", globs: &["py", "pyi"] },
    Def { name: "python", globs: &["py", "pyi"] },
    Def { name: "js", globs: &["js", "mjs", "cjs"] },
    Def { name: "ts", globs: &["ts", "tsx"] },
    Def { name: "c", globs: &["c", "h"] },
    Def { name: "cpp", globs: &["cpp", "cc", "cxx", "hpp", "hh", "hxx"] },
    Def { name: "java", globs: &["java"] },
    Def { name: "html", globs: &["html", "htm"] },
    Def { name: "css", globs: &["css"] },
    Def { name: "json", globs: &["json"] },
    Def { name: "yaml", globs: &["yaml", "yml"] },
    Def { name: "toml", globs: &["toml"] },
    Def { name: "md", globs: &["md", "markdown"] },
    Def { name: "sh", globs: &["sh", "bash", "zsh"] },
    Def { name: "make", globs: &[".makefile", ".gnumakefile"] },
];

/// A set of type selections, mapping symbolic names to the extensions
/// and basenames they resolve to.
#[derive(Clone, Debug, Default)]
pub struct Types {
    extensions: HashSet<String>,
    basenames: HashSet<String>,
    selected: bool,
}

impl Types {
    /// An empty selection, which matches nothing and is considered
    /// inactive (see [`Types::is_empty`]).
    pub fn empty() -> Types {
        Types::default()
    }

    /// Returns true if no type names have been added.
    pub fn is_empty(&self) -> bool {
        !self.selected
    }

    /// Returns true if `path`'s extension or basename is covered by
    /// any of the type names added to this set.
    pub fn is_match<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            let lower = name.to_lowercase();
            if self.basenames.contains(&lower) {
                return true;
            }
        }
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            return self.extensions.contains(&ext.to_lowercase());
        }
        false
    }
}

/// Builds a [`Types`] selection from symbolic type names.
#[derive(Clone, Debug, Default)]
pub struct TypesBuilder {
    types: Types,
}

impl TypesBuilder {
    /// Create an empty builder.
    pub fn new() -> TypesBuilder {
        TypesBuilder::default()
    }

    /// Add every extension/basename covered by the type named `name`.
    ///
    /// Unrecognized names are a no-op; callers that want to surface
    /// that as an error should check [`TypesBuilder::is_known`] first.
    pub fn select(&mut self, name: &str) -> &mut TypesBuilder {
        self.types.selected = true;
        if let Some(def) = DEFS.iter().find(|d| d.name == name) {
            for glob in def.globs {
                if let Some(basename) = glob.strip_prefix('.') {
                    self.types.basenames.insert(basename.to_string());
                } else {
                    self.types.extensions.insert(glob.to_string());
                }
            }
        }
        self
    }

    /// Returns true if `name` resolves to a known type definition.
    pub fn is_known(&self, name: &str) -> bool {
        DEFS.iter().any(|d| d.name == name)
    }

    /// Build the final [`Types`] selection.
    pub fn build(&self) -> Types {
        self.types.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_go() {
        let mut b = TypesBuilder::new();
        b.select("go");
        let t = b.build();
        assert!(t.is_match("main.go"));
        assert!(!t.is_match("main.py"));
    }

    #[test]
    fn unknown_name_is_noop_but_active() {
        let mut b = TypesBuilder::new();
        b.select("bogus");
        let t = b.build();
        assert!(!t.is_empty());
        assert!(!t.is_match("main.go"));
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let t = Types::empty();
        assert!(t.is_empty());
        assert!(!t.is_match("main.go"));
    }
}

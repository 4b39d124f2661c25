/*!
Process-level integration tests: each one builds a small temporary
directory tree, runs the real `rg` binary against it, and checks exact
stdout bytes. These exercise the Driver end to end — Ignore Engine,
Worker Pool, and Formatter wired together — which no single crate's unit
tests can do on their own.
*/

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

struct Dir(PathBuf);

impl Dir {
    fn new(name: &str) -> Dir {
        let path = std::env::temp_dir()
            .join(format!("rgrep-integration-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        Dir(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }

    fn write(&self, name: &str, contents: &str) {
        let full = self.0.join(name);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, contents).unwrap();
    }
}

impl Drop for Dir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn rg(dir: &Dir, args: &[&str]) -> (String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_rg"))
        .args(args)
        .current_dir(dir.path())
        .output()
        .expect("failed to run rg");
    (String::from_utf8_lossy(&output.stdout).into_owned(), output.status.code().unwrap_or(-1))
}

#[test]
fn simple_regex_one_file() {
    let dir = Dir::new("simple-regex");
    dir.write("a.txt", "hello\nworld\n");

    let (stdout, code) = rg(&dir, &["-n", "world", "a.txt"]);
    assert_eq!(stdout, "2:world\n");
    assert_eq!(code, 0);
}

#[test]
fn case_insensitive_smart_case() {
    let dir = Dir::new("smart-case");
    dir.write("a.txt", "Hello\nhello\n");

    let (stdout, code) = rg(&dir, &["-S", "hello", "a.txt"]);
    let mut lines: Vec<&str> = stdout.lines().collect();
    lines.sort();
    assert_eq!(lines, vec!["1:Hello", "2:hello"]);
    assert_eq!(code, 0);
}

#[test]
fn gitignore_negation_with_files_with_matches() {
    let dir = Dir::new("gitignore-negation");
    dir.write(".gitignore", "*.log\n!important.log\n");
    dir.write("debug.log", "noise\n");
    dir.write("important.log", "keep\n");
    dir.write("main.go", "package main\n");

    let (stdout, code) = rg(&dir, &["-l", "."]);
    let mut files: Vec<&str> = stdout.lines().collect();
    files.sort();
    assert_eq!(files, vec!["important.log", "main.go"]);
    assert_eq!(code, 0);
}

#[test]
fn context_separator() {
    let dir = Dir::new("context-separator");
    let lines: Vec<String> = (1..=10)
        .map(|n| if n == 3 || n == 8 { format!("L{n} M") } else { format!("L{n}") })
        .collect();
    dir.write("t.txt", &(lines.join("\n") + "\n"));

    let (stdout, code) = rg(&dir, &["-C", "1", "-n", "M", "t.txt"]);
    let expected = "2-L2\n3:L3 M\n4-L4\n--\n7-L7\n8:L8 M\n9-L9\n";
    assert_eq!(stdout, expected);
    assert_eq!(code, 0);
}

#[test]
fn fixed_string_with_special_chars() {
    let dir = Dir::new("fixed-string");
    dir.write("a.go", "x := foo()\n");

    let (stdout, code) = rg(&dir, &["-F", "-n", "foo()", "a.go"]);
    assert_eq!(stdout, "1:x := foo()\n");
    assert_eq!(code, 0);
}

#[test]
fn ndjson_stream() {
    let dir = Dir::new("ndjson-stream");
    dir.write("a.txt", "hit\n");

    let (stdout, code) = rg(&dir, &["--json-stream", "hit", "a.txt"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("\"type\":\"begin\""));
    assert!(lines[1].contains("\"type\":\"match\""));
    assert!(lines[2].contains("\"type\":\"end\""));
    assert!(lines[3].contains("\"type\":\"summary\""));

    let summary: serde_json::Value = serde_json::from_str(lines[3]).unwrap();
    assert_eq!(summary["data"]["total_matches"], 1);
    assert_eq!(code, 0);
}

#[test]
fn no_match_exits_one() {
    let dir = Dir::new("no-match");
    dir.write("a.txt", "hello\n");

    let (stdout, code) = rg(&dir, &["zzz", "a.txt"]);
    assert_eq!(stdout, "");
    assert_eq!(code, 1);
}

#[test]
fn missing_pattern_exits_two() {
    let dir = Dir::new("usage-error");
    let output = Command::new(env!("CARGO_BIN_EXE_rg"))
        .current_dir(dir.path())
        .output()
        .expect("failed to run rg");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn binary_file_is_silently_skipped() {
    let dir = Dir::new("binary-skip");
    fs::write(dir.path().join("bin.dat"), [b'h', b'i', 0u8, b'!']).unwrap();

    let (stdout, code) = rg(&dir, &["hi", "bin.dat"]);
    assert_eq!(stdout, "");
    assert_eq!(code, 1);
}

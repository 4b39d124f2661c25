/*!
The Worker Pool: N threads pull file paths off a shared channel, search
each file into a private in-memory buffer (or, for batch JSON, a private
accumulator), and hand the finished unit to a single collector thread
that owns the real output writer and the running totals. Workers never
touch the writer or the aggregate directly, so output for one file is
never interleaved with another's.
*/

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use grep::printer::JsonFileResult;

use crate::cancel::Cancelled;

/// What one worker produced for a single file.
pub struct FileOutput {
    /// The file that was searched.
    pub path: PathBuf,
    /// Already-formatted bytes ready to write verbatim to the output
    /// writer (empty for the batch-JSON format, which instead populates
    /// `json_file`).
    pub bytes: Vec<u8>,
    /// The number of matching lines found in this file.
    pub match_count: u64,
    /// Set only in batch-JSON mode: this file's entry in the final
    /// document, if it had any matches.
    pub json_file: Option<JsonFileResult>,
}

/// Renders one file to a [`FileOutput`]. Built by the Driver once per run,
/// closing over the compiled matcher and the chosen Formatter's
/// configuration, and shared read-only across every worker thread.
pub type Render = dyn Fn(&Path) -> io::Result<FileOutput> + Send + Sync;

/// Distributes `paths` across `threads` worker threads and returns the
/// receiving end of a channel of [`FileOutput`]s, bounded at `2 * threads`
/// so that a slow collector applies backpressure to the workers instead of
/// letting memory grow unbounded.
///
/// Returns immediately; the caller drives the returned receiver (typically
/// on the calling thread, acting as the collector) until it is exhausted.
pub fn spawn(
    threads: usize,
    paths: Vec<PathBuf>,
    render: Arc<Render>,
    cancel: Cancelled,
) -> Receiver<FileOutput> {
    let threads = threads.max(1);
    let (work_tx, work_rx) = bounded::<PathBuf>(2 * threads);
    let (out_tx, out_rx) = bounded::<FileOutput>(2 * threads);

    thread::spawn(move || {
        for path in paths {
            if work_tx.send(path).is_err() {
                break;
            }
        }
    });

    for _ in 0..threads {
        let work_rx = work_rx.clone();
        let out_tx: Sender<FileOutput> = out_tx.clone();
        let render = Arc::clone(&render);
        let cancel = cancel.clone();
        thread::spawn(move || {
            while let Ok(path) = work_rx.recv() {
                if cancel.is_set() {
                    break;
                }
                match render(&path) {
                    Ok(output) => {
                        if out_tx.send(output).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        log::warn!("{}: {}", path.display(), err);
                    }
                }
            }
        });
    }
    drop(out_tx);

    out_rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_path_produces_one_output_in_some_order() {
        let paths: Vec<PathBuf> =
            (0..20).map(|i| PathBuf::from(format!("f{i}.txt"))).collect();
        let render: Arc<Render> = Arc::new(|path: &Path| {
            Ok(FileOutput {
                path: path.to_path_buf(),
                bytes: path.display().to_string().into_bytes(),
                match_count: 1,
                json_file: None,
            })
        });
        let rx = spawn(4, paths.clone(), render, Cancelled::new());
        let mut seen: Vec<PathBuf> = rx.iter().map(|o| o.path).collect();
        seen.sort();
        let mut expected = paths;
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn cancellation_stops_new_work_from_starting() {
        let paths: Vec<PathBuf> = (0..1000).map(|i| PathBuf::from(format!("f{i}"))).collect();
        let cancel = Cancelled::new();
        cancel.set();
        let render: Arc<Render> = Arc::new(|path: &Path| {
            Ok(FileOutput {
                path: path.to_path_buf(),
                bytes: Vec::new(),
                match_count: 0,
                json_file: None,
            })
        });
        let rx = spawn(4, paths, render, cancel);
        let count = rx.iter().count();
        assert!(count < 1000);
    }
}

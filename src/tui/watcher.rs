use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use issue_store::ISSUE_FILE_SUFFIX;
use notify::{RecursiveMode, Watcher};

/// Debounce tuning for the issue-directory watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    /// Quiet period required after the last qualifying event before a change
    /// signal is emitted.
    pub debounce: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
        }
    }
}

/// Terminal outcome of one watch invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Changed,
    Error(String),
}

enum RawSignal {
    Paths(Vec<PathBuf>),
    Failed(String),
}

/// Watches `dir` until one debounced batch of issue-file changes (or an
/// error) occurs, then returns. Each invocation services exactly one signal;
/// the caller re-arms by calling again.
pub fn watch_once(dir: &Path, config: WatchConfig) -> WatchOutcome {
    let (tx, rx) = mpsc::channel();

    let mut watcher = match notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
        let signal = match result {
            Ok(event) => RawSignal::Paths(event.paths),
            Err(error) => RawSignal::Failed(error.to_string()),
        };
        let _ = tx.send(signal);
    }) {
        Ok(watcher) => watcher,
        Err(error) => return WatchOutcome::Error(error.to_string()),
    };

    if let Err(error) = watcher.watch(dir, RecursiveMode::NonRecursive) {
        return WatchOutcome::Error(error.to_string());
    }

    debounce_signals(&rx, config.debounce)
}

/// Core debounce loop, separated from the kernel watcher for testability.
///
/// The first qualifying signal arms a quiet-timer; later qualifying signals
/// reset it; non-qualifying signals neither arm nor reset. When the timer
/// expires, exactly one `Changed` is returned.
fn debounce_signals(rx: &Receiver<RawSignal>, quiet: Duration) -> WatchOutcome {
    let mut deadline: Option<Instant> = None;

    loop {
        let signal = match deadline {
            None => match rx.recv() {
                Ok(signal) => signal,
                Err(_) => return WatchOutcome::Error("watch channel closed".to_string()),
            },
            Some(at) => {
                let now = Instant::now();
                if at <= now {
                    return WatchOutcome::Changed;
                }
                match rx.recv_timeout(at - now) {
                    Ok(signal) => signal,
                    Err(RecvTimeoutError::Timeout) => return WatchOutcome::Changed,
                    Err(RecvTimeoutError::Disconnected) => {
                        return WatchOutcome::Error("watch channel closed".to_string())
                    }
                }
            }
        };

        match signal {
            RawSignal::Paths(paths) => {
                if paths.iter().any(|path| is_issue_path(path)) {
                    deadline = Some(Instant::now() + quiet);
                }
            }
            RawSignal::Failed(error) => return WatchOutcome::Error(error),
        }
    }
}

fn is_issue_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(ISSUE_FILE_SUFFIX))
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::{debounce_signals, RawSignal, WatchOutcome};

    const QUIET: Duration = Duration::from_millis(30);

    #[test]
    fn burst_of_issue_changes_collapses_into_one_signal() {
        let (tx, rx) = mpsc::channel();
        let producer = thread::spawn(move || {
            for _ in 0..3 {
                tx.send(RawSignal::Paths(vec!["a/LDS-1.md".into()]))
                    .expect("send change");
                thread::sleep(Duration::from_millis(5));
            }
            // Quiet period follows; sender stays alive past the deadline.
            thread::sleep(QUIET * 3);
        });

        assert_eq!(debounce_signals(&rx, QUIET), WatchOutcome::Changed);
        producer.join().expect("join producer");
    }

    #[test]
    fn non_issue_files_never_arm_the_timer() {
        let (tx, rx) = mpsc::channel();
        tx.send(RawSignal::Paths(vec!["a/notes.txt".into()]))
            .expect("send stray change");
        drop(tx);

        assert!(matches!(debounce_signals(&rx, QUIET), WatchOutcome::Error(_)));
    }

    #[test]
    fn watcher_errors_short_circuit() {
        let (tx, rx) = mpsc::channel();
        tx.send(RawSignal::Failed("inotify limit".to_string()))
            .expect("send failure");

        assert_eq!(
            debounce_signals(&rx, QUIET),
            WatchOutcome::Error("inotify limit".to_string())
        );
    }

    #[test]
    fn mixed_batch_with_one_issue_path_qualifies() {
        let (tx, rx) = mpsc::channel();
        tx.send(RawSignal::Paths(vec![
            "a/notes.txt".into(),
            "a/LDS-2.md".into(),
        ]))
        .expect("send mixed change");
        let keep_alive = tx;

        assert_eq!(debounce_signals(&rx, QUIET), WatchOutcome::Changed);
        drop(keep_alive);
    }
}

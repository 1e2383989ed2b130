use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

use crate::error::AgentError;
use crate::events::AgentEvent;
use crate::parser::{parse_events, DEFAULT_QUEUE_CAPACITY};

/// Environment variables the agent program uses to detect that it is running
/// inside one of its own sessions. They must be stripped so the child does not
/// refuse to start when launched from within such a session.
pub const DEFAULT_ENV_DENY_LIST: &[&str] =
    &["CLAUDECODE", "CLAUDE_SESSION_ID", "CLAUDE_CODE_ENTRYPOINT"];

/// Configuration for launching the agent subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Program to execute.
    pub program: String,
    /// Variable names removed from the child environment.
    pub env_deny_list: Vec<String>,
    /// Bound of the parsed-event queue.
    pub queue_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            program: "claude".to_string(),
            env_deny_list: DEFAULT_ENV_DENY_LIST
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Removes denied variable names from an environment listing, preserving the
/// order and content of everything else.
#[must_use]
pub fn filter_env<I>(vars: I, deny_list: &[String]) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter(|(name, _)| !deny_list.iter().any(|denied| denied == name))
        .collect()
}

#[derive(Debug, Default)]
struct ExitSignal {
    exited: Mutex<bool>,
    cond: Condvar,
}

impl ExitSignal {
    fn notify(&self) {
        *lock_unpoisoned(&self.exited) = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut exited = lock_unpoisoned(&self.exited);
        while !*exited {
            exited = match self.cond.wait(exited) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    fn is_set(&self) -> bool {
        *lock_unpoisoned(&self.exited)
    }
}

#[derive(Debug)]
struct AgentInner {
    stdin: Mutex<Option<ChildStdin>>,
    events: Mutex<Receiver<AgentEvent>>,
    exit: Arc<ExitSignal>,
}

/// Handle to a running agent subprocess.
///
/// Clones share the same child. The event stream is a single bounded queue;
/// concurrent `next_event` callers race for events, so keep one listener.
#[derive(Clone, Debug)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

impl Agent {
    /// Spawns the agent in headless streaming mode with `initial_prompt` as a
    /// positional argument and the deny-listed variables removed from its
    /// environment. Spawn failure surfaces before any handle exists.
    pub fn start(config: &AgentConfig, initial_prompt: &str) -> Result<Self, AgentError> {
        let env = filter_env(std::env::vars(), &config.env_deny_list);

        let mut child = Command::new(&config.program)
            .arg("-p")
            .arg(initial_prompt)
            .arg("--output-format")
            .arg("stream-json")
            .arg("--verbose")
            .env_clear()
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AgentError::Spawn {
                program: config.program.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or(AgentError::MissingPipe { pipe: "stdin" })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(AgentError::MissingPipe { pipe: "stdout" })?;

        let events = parse_events(stdout, config.queue_capacity);
        let exit = Arc::new(ExitSignal::default());
        spawn_exit_waiter(child, Arc::clone(&exit));

        Ok(Self {
            inner: Arc::new(AgentInner {
                stdin: Mutex::new(Some(stdin)),
                events: Mutex::new(events),
                exit,
            }),
        })
    }

    /// Writes one line to the agent's input pipe.
    pub fn send(&self, text: &str) -> Result<(), AgentError> {
        let mut stdin = lock_unpoisoned(&self.inner.stdin);
        let pipe = stdin.as_mut().ok_or(AgentError::InputClosed)?;
        writeln!(pipe, "{text}").map_err(AgentError::Write)?;
        pipe.flush().map_err(AgentError::Write)
    }

    /// Blocks on the bounded event queue for the next parsed event. Returns
    /// `None` once the output stream closes.
    #[must_use]
    pub fn next_event(&self) -> Option<AgentEvent> {
        lock_unpoisoned(&self.inner.events).recv().ok()
    }

    /// Closes the input pipe and waits for the process to exit. There is no
    /// forced kill; a child that ignores the closed pipe blocks this call.
    pub fn stop(&self) {
        lock_unpoisoned(&self.inner.stdin).take();
        self.inner.exit.wait();
    }

    /// Blocks until the process has exited.
    pub fn wait_exited(&self) {
        self.inner.exit.wait();
    }

    /// Returns true once the exit waiter has observed process exit.
    #[must_use]
    pub fn is_exited(&self) -> bool {
        self.inner.exit.is_set()
    }
}

fn spawn_exit_waiter(mut child: Child, exit: Arc<ExitSignal>) {
    let waiter_exit = Arc::clone(&exit);
    let spawned = thread::Builder::new()
        .name("agent-exit-waiter".to_string())
        .spawn(move || {
            let _ = child.wait();
            waiter_exit.notify();
        });

    // Without a waiter the exit signal would never fire and stop() would
    // block forever; the unreaped child is collected at process exit.
    if spawned.is_err() {
        exit.notify();
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

//! Parent side: spawn a reflection process and collect its outcome.

mod command;

pub use command::ChildCommand;

use crate::{
    config::{CHANNEL_ENV, CHANNEL_TOKEN_ENV, DEFAULT_TIMEOUT_SECS, LAYOUT_ENV, STAGE_ENV},
    error::{Error, Result},
    layout::Layout,
    protocol::{ChannelListener, Message, SerializedError},
    stage::ReflectionStage,
    types::PluginDescriptor,
};
use std::io::Read;
use std::process::{Child, ChildStderr, Stdio};
use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// How long a child may linger after delivering its message or closing its channel.
const EXIT_GRACE: Duration = Duration::from_secs(2);
/// How long to keep collecting stderr once the process is gone. A helper
/// process that inherited the pipe can hold it open indefinitely.
const STDERR_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ReflectOptions {
    pub command: ChildCommand,
    /// Covers connecting, delivering the message and exiting.
    pub timeout: Duration,
    pub capture_stderr: bool,
}

impl ReflectOptions {
    pub fn new(command: ChildCommand) -> Self {
        Self {
            command,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_stderr: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_capture_stderr(mut self, capture: bool) -> Self {
        self.capture_stderr = capture;
        self
    }
}

/// What a reflection run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectionOutcome {
    Plugins(Vec<PluginDescriptor>),
    TypegenComplete,
    /// The application or a stage failed and reported it.
    Failed(SerializedError),
    /// The process ended without sending anything: a fatal precondition, a
    /// crash, or no recognized stage.
    NoMessage { exit_code: Option<i32> },
    TimedOut,
}

impl ReflectionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ReflectionOutcome::Plugins(_) | ReflectionOutcome::TypegenComplete
        )
    }
}

#[derive(Debug, Clone)]
pub struct Reflection {
    pub stage: ReflectionStage,
    pub outcome: ReflectionOutcome,
    /// `None` if the process was killed or ended by a signal.
    pub exit_code: Option<i32>,
    pub duration: Duration,
    pub stderr: Option<String>,
}

enum Received {
    Message(Message),
    Closed,
    NotConnected,
    TimedOut,
}

/// Run `stage` against the application in a fresh child process.
pub fn reflect(
    layout: &Layout,
    stage: ReflectionStage,
    options: &ReflectOptions,
) -> Result<Reflection> {
    let start = Instant::now();
    let deadline = start + options.timeout;

    let listener = ChannelListener::bind()?;
    let protocol_env = [
        (LAYOUT_ENV, layout.to_json()?),
        (STAGE_ENV, stage.as_str().to_string()),
        (CHANNEL_ENV, listener.address().to_string()),
        (CHANNEL_TOKEN_ENV, listener.token().to_string()),
    ];

    let mut cmd = options.command.build(&protocol_env);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    if options.capture_stderr {
        cmd.stderr(Stdio::piped());
    } else {
        cmd.stderr(Stdio::inherit());
    }

    info!(
        "Reflecting ({}) with: {}",
        stage,
        options.command.to_shell_command()
    );
    let mut child = cmd.spawn().map_err(|e| Error::SpawnFailed {
        program: options.command.program.display().to_string(),
        reason: e.to_string(),
    })?;

    // Drain stderr so a chatty child never blocks on a full pipe.
    let stderr_capture = child.stderr.take().map(StderrCapture::spawn);

    let received = match receive(&listener, &mut child, deadline) {
        Ok(received) => received,
        Err(e) => {
            kill_quietly(&mut child);
            return Err(e);
        }
    };

    let (outcome, exit_code) = match received {
        Received::Message(message) => {
            let outcome = outcome_for(stage, message);
            let limit = deadline.min(Instant::now() + EXIT_GRACE);
            let (exit_code, killed) = wait_for_exit(&mut child, limit)?;
            if killed {
                debug!("Reflection process lingered after reporting; killed it");
            }
            (outcome?, exit_code)
        }
        Received::Closed | Received::NotConnected => {
            let limit = deadline.min(Instant::now() + EXIT_GRACE);
            let (exit_code, killed) = wait_for_exit(&mut child, limit)?;
            if killed {
                debug!("Reflection process lingered after closing its channel; killed it");
            }
            warn!(
                "Reflection process exited with {:?} without sending a message",
                exit_code
            );
            (ReflectionOutcome::NoMessage { exit_code }, exit_code)
        }
        Received::TimedOut => {
            kill_quietly(&mut child);
            (ReflectionOutcome::TimedOut, None)
        }
    };

    let stderr = stderr_capture.map(|capture| capture.collect(STDERR_GRACE));
    let duration = start.elapsed();
    debug!("Reflection ({}) finished in {:?}", stage, duration);

    Ok(Reflection {
        stage,
        outcome,
        exit_code,
        duration,
        stderr,
    })
}

fn receive(listener: &ChannelListener, child: &mut Child, deadline: Instant) -> Result<Received> {
    let mut reader = loop {
        if let Some(reader) = listener.try_accept()? {
            break reader;
        }
        if child.try_wait()?.is_some() {
            // It may have connected and written everything before exiting.
            match listener.try_accept()? {
                Some(reader) => break reader,
                None => return Ok(Received::NotConnected),
            }
        }
        if Instant::now() >= deadline {
            return Ok(Received::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    };

    match reader.read_message(remaining(deadline)) {
        Ok(Some(message)) => Ok(Received::Message(message)),
        Ok(None) => Ok(Received::Closed),
        Err(Error::Timeout(_)) => Ok(Received::TimedOut),
        Err(e) => Err(e),
    }
}

fn outcome_for(stage: ReflectionStage, message: Message) -> Result<ReflectionOutcome> {
    match (stage, message) {
        (ReflectionStage::Plugin, Message::SuccessPlugin { plugins }) => {
            Ok(ReflectionOutcome::Plugins(plugins))
        }
        (ReflectionStage::Typegen, Message::SuccessTypegen) => {
            Ok(ReflectionOutcome::TypegenComplete)
        }
        (_, Message::Error { serialized_error }) => Ok(ReflectionOutcome::Failed(serialized_error)),
        (stage, message @ (Message::SuccessPlugin { .. } | Message::SuccessTypegen)) => {
            Err(Error::ProtocolError(format!(
                "received {} while reflecting stage {}",
                message.kind(),
                stage
            )))
        }
    }
}

/// Wait until `limit`, then kill. Returns the exit code and whether a kill was needed.
fn wait_for_exit(child: &mut Child, limit: Instant) -> Result<(Option<i32>, bool)> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status.code(), false));
        }
        if Instant::now() >= limit {
            kill_quietly(child);
            return Ok((None, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Stderr collected on a background thread.
struct StderrCapture {
    buf: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl StderrCapture {
    fn spawn(mut pipe: ChildStderr) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        let sink = Arc::clone(&buf);
        thread::spawn(move || {
            let mut chunk = [0u8; 4096];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(_) => break,
                }
            }
            let _ = tx.send(());
        });
        Self { buf, done }
    }

    /// Whatever was read by the end of stream, or by `limit` if the pipe stays open.
    fn collect(self, limit: Duration) -> String {
        if self.done.recv_timeout(limit).is_err() {
            debug!("Stderr still open after the reflection process ended; keeping partial output");
        }
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn kill_quietly(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("Failed to kill reflection process: {}", e);
    }
    let _ = child.wait();
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

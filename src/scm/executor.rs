//! Child process plumbing for SCM clients

use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use scopeguard::ScopeGuard;

use super::{Backend, LogCommand, LogParser, ScmError};
use crate::model::ChangeLogEntry;

/// Run `command` in `working_dir` and parse its stdout
///
/// stderr is drained on a separate thread so a chatty client cannot block
/// on a full pipe. Its filtered content is logged at error level; a non-zero
/// exit status is logged as a warning. Neither is fatal.
pub fn run_log_command(
    command: &LogCommand,
    working_dir: &Path,
    backend: Backend,
    parser: &mut dyn LogParser,
) -> Result<Vec<ChangeLogEntry>, ScmError> {
    tracing::info!("SCM Working Directory: {}", working_dir.display());
    for element in command.command_line() {
        tracing::info!("Command line element: {}", element);
    }

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ScmError::ExecutableNotFound {
                    program: command.program.clone(),
                }
            } else {
                ScmError::IoError(e)
            }
        })?;

    let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;
    let stderr_reader = thread::spawn(move || drain_stderr(stderr, backend));

    // Don't leave the client running if parsing bails out
    let child = scopeguard::guard(child, |mut child| {
        let _ = child.kill();
        let _ = child.wait();
    });

    let entries = parser.parse(&mut BufReader::new(stdout))?;
    let status = ScopeGuard::into_inner(child).wait()?;

    match stderr_reader.join() {
        Ok(text) => {
            let text = text.trim();
            if !text.is_empty() {
                tracing::error!("{}", text);
            }
        }
        Err(_) => tracing::warn!("stderr reader for {} panicked", command.program),
    }

    if !status.success() {
        tracing::warn!("{} exited with {}", command.program, status);
    }

    Ok(entries)
}

fn missing_pipe(name: &str) -> ScmError {
    ScmError::IoError(io::Error::other(format!("child {name} was not captured")))
}

fn drain_stderr(stderr: impl Read, backend: Backend) -> String {
    let mut text = String::new();
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if backend.accepts_stderr_line(&line) {
                    text.push_str(&line);
                }
            }
        }
    }
    text
}

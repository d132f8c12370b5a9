//! Compiler process handling
//!
//! Spawns the compiler, forwards every line of its merged stdout/stderr to
//! the diagnostic sink and waits for it to exit. The wait races against the
//! build's cancellation token; on cancellation the process is killed and
//! reaped before returning.

use std::io::{BufRead, BufReader, PipeReader};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::classify::{OutcomeStatus, OutputClassifier};
use crate::core::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::UnitError;

/// A fully assembled compiler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerProcess {
    /// Program to execute
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory
    pub work_dir: PathBuf,
}

impl CompilerProcess {
    /// Split a command line into program and arguments
    pub fn from_command_line(mut command: Vec<String>, work_dir: PathBuf) -> Option<Self> {
        if command.is_empty() {
            return None;
        }
        let program = command.remove(0);
        Some(Self {
            program,
            args: command,
            work_dir,
        })
    }

    /// Command line as one string, for logging
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to a terminal state
    ///
    /// Returns `Err` only when the process could not be started.
    pub async fn run(
        &self,
        label: &str,
        sink: &dyn DiagnosticSink,
        cancel: &CancellationToken,
    ) -> Result<OutcomeStatus, UnitError> {
        tracing::debug!("{label}: {}", self.display());

        let spawn_error = |e: std::io::Error| UnitError::ProcessSpawn {
            program: self.program.clone(),
            error: e.to_string(),
        };

        // stdout and stderr share one pipe so lines arrive in write order
        let (reader, writer) = std::io::pipe().map_err(spawn_error)?;
        let stderr = writer.try_clone().map_err(spawn_error)?;

        // The command owns the write ends and must be dropped after spawning,
        // otherwise the reader never sees end of stream
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::task::spawn_blocking(move || forward_lines(reader, &tx));

        let mut classifier = OutputClassifier::new();
        let mut cancelled = false;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                line = rx.recv() => match line {
                    Some(line) => {
                        let level = classifier.inspect(&line);
                        sink.report(Diagnostic {
                            label: label.to_string(),
                            level,
                            message: line,
                        });
                    }
                    None => break,
                },
            }
        }

        if !cancelled {
            tokio::select! {
                biased;
                () = cancel.cancelled() => cancelled = true,
                status = child.wait() => match status {
                    Ok(status) => tracing::debug!("{label}: compiler exited with {status}"),
                    Err(e) => tracing::warn!("{label}: failed to wait for compiler: {e}"),
                },
            }
        }

        if cancelled {
            terminate(&mut child, label).await;
        }

        Ok(classifier.finish(cancelled))
    }
}

fn forward_lines(reader: PipeReader, tx: &mpsc::UnboundedSender<String>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!("Compiler output stream closed: {e}");
                break;
            }
        }
    }
}

async fn terminate(child: &mut Child, label: &str) {
    tracing::info!("{label}: cancelling, killing compiler process {:?}", child.id());
    if let Err(e) = child.kill().await {
        tracing::warn!("{label}: failed to kill compiler process: {e}");
    }
}

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::process::Command;

use miette::Diagnostic;
use thiserror::Error;

/// Captured result of a finished external command.
///
/// Standard output and standard error are kept line-by-line so callers can
/// attach them to failure traces or pick single-line results (e.g. a revision
/// printed by `git rev-parse`).
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// The rendered command line, for display in traces.
    pub command: String,
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandOutput {
    /// First line of standard output, trimmed.
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.first().map(|l| l.trim())
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "$ {} [exit {}]", self.command, self.exit_code)?;
        for line in &self.stdout {
            writeln!(f, "  {line}")?;
        }
        for line in &self.stderr {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

/// Failure modes of [`CommandBuilder::run`].
#[derive(Debug, Error, Diagnostic)]
pub enum ProcessError {
    /// The program could not be spawned at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The program ran but exited non-zero; its captured output is attached.
    #[error("`{command}` exited with code {code}")]
    NonZeroExit {
        command: String,
        code: i32,
        output: CommandOutput,
    },
}

/// Builder for constructing and executing external processes.
///
/// Provides a fluent API for setting program, arguments, environment variables,
/// and working directory.
pub struct CommandBuilder {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<String>,
}

impl CommandBuilder {
    /// Create a new builder for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory for the child process.
    pub fn cwd(mut self, dir: impl Into<String>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn rendered(&self) -> String {
        let mut s = self.program.clone();
        for arg in &self.args {
            s.push(' ');
            s.push_str(arg);
        }
        s
    }

    /// Execute the command, capturing stdout and stderr line-by-line.
    ///
    /// A non-zero exit code is an error with the captured output and exit
    /// code attached, so callers can surface the full trace of a failed
    /// command sequence.
    pub fn run(&self) -> Result<CommandOutput, ProcessError> {
        let rendered = self.rendered();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(Path::new(dir));
        }

        let raw = cmd.output().map_err(|source| ProcessError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        let output = CommandOutput {
            command: rendered.clone(),
            // Exit-by-signal has no code; report -1 in traces.
            exit_code: raw.status.code().unwrap_or(-1),
            stdout: capture_lines(&raw.stdout),
            stderr: capture_lines(&raw.stderr),
        };

        if raw.status.success() {
            Ok(output)
        } else {
            let code = output.exit_code;
            Err(ProcessError::NonZeroExit {
                command: rendered,
                code,
                output,
            })
        }
    }
}

fn capture_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_captures_lines() {
        let output = CommandBuilder::new("sh")
            .arg("-c")
            .arg("echo one; echo two")
            .run()
            .unwrap();
        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout, vec!["one", "two"]);
        assert_eq!(output.first_line(), Some("one"));
    }

    #[test]
    fn run_nonzero_exit_attaches_output() {
        let err = CommandBuilder::new("sh")
            .arg("-c")
            .arg("echo oops >&2; exit 3")
            .run()
            .unwrap_err();
        match err {
            ProcessError::NonZeroExit { code, output, .. } => {
                assert_eq!(code, 3);
                assert_eq!(output.stderr, vec!["oops"]);
            }
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }
}

//! Two-stage process pipelines: `producer | consumer [> file]`.
//!
//! [`Pipeline`] spawns both processes itself and wires the producer's stdout straight into
//! the consumer's stdin, so bytes stream between the external tools without passing
//! through this process and without a shell interpreting any argument.
//!
//! Each stage writes its stderr to an anonymous temporary file. Spooling to disk instead of
//! a pipe means a chatty stage can never stall on a full buffer while we wait on the other
//! one, and the text is still available for the error report afterwards.
//!
//! A run succeeds only if **both** stages exit with status zero. Otherwise the returned
//! error lists every failed stage with its exit status and trimmed stderr.

use anyhow::{anyhow, Context, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// A program and its arguments, passed to the OS without shell interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Output of a successful run. `stdout` is empty when the consumer wrote to a file.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub stdout: String,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    producer: CommandSpec,
    consumer: CommandSpec,
    output: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(producer: CommandSpec, consumer: CommandSpec) -> Self {
        Self {
            producer,
            consumer,
            output: None,
        }
    }

    /// Redirects the consumer's stdout into `path`, truncating it.
    pub fn to_file(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Runs both stages to completion.
    pub fn run(&self) -> Result<PipelineOutput> {
        let producer_stderr = spool_file()?;
        let consumer_stderr = spool_file()?;

        // The file (or capture spool) is opened before anything is spawned so a bad path
        // never leaves an orphaned producer behind.
        let (consumer_stdout, mut captured) = match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                (Stdio::from(file), None)
            }
            None => {
                let spool = spool_file()?;
                (Stdio::from(spool.try_clone()?), Some(spool))
            }
        };

        let mut producer = self
            .producer
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(producer_stderr.try_clone()?))
            .spawn()
            .with_context(|| format!("Failed to start `{}`", self.producer))?;

        let producer_stdout = match producer.stdout.take() {
            Some(stdout) => stdout,
            None => {
                reap(&mut producer);
                return Err(anyhow!("`{}` has no stdout handle", self.producer));
            }
        };

        let consumer = self
            .consumer
            .to_command()
            .stdin(Stdio::from(producer_stdout))
            .stdout(consumer_stdout)
            .stderr(Stdio::from(consumer_stderr.try_clone()?))
            .spawn();

        let mut consumer = match consumer {
            Ok(child) => child,
            Err(e) => {
                reap(&mut producer);
                return Err(e).with_context(|| format!("Failed to start `{}`", self.consumer));
            }
        };

        let consumer_status = match consumer.wait() {
            Ok(status) => status,
            Err(e) => {
                reap(&mut producer);
                return Err(e).with_context(|| format!("Failed to wait for `{}`", self.consumer));
            }
        };
        let producer_status = producer
            .wait()
            .with_context(|| format!("Failed to wait for `{}`", self.producer))?;

        let mut failures = Vec::new();
        if !producer_status.success() {
            failures.push(describe_failure(&self.producer, producer_status, producer_stderr)?);
        }
        if !consumer_status.success() {
            failures.push(describe_failure(&self.consumer, consumer_status, consumer_stderr)?);
        }
        if !failures.is_empty() {
            return Err(anyhow!("{}", failures.join("; ")));
        }

        let stdout = match captured.as_mut() {
            Some(spool) => read_spool(spool)?,
            None => String::new(),
        };
        Ok(PipelineOutput { stdout })
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.producer, self.consumer)?;
        if let Some(path) = &self.output {
            write!(f, " > {}", path.display())?;
        }
        Ok(())
    }
}

fn spool_file() -> Result<File> {
    tempfile::tempfile().context("Failed to create temporary file for process output")
}

fn read_spool(file: &mut File) -> Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).trim().to_string())
}

fn describe_failure(command: &CommandSpec, status: ExitStatus, mut stderr: File) -> Result<String> {
    let text = read_spool(&mut stderr)?;
    if text.is_empty() {
        Ok(format!("`{}` failed ({})", command, status))
    } else {
        Ok(format!("`{}` failed ({}): {}", command, status, text))
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").args(["-c", script])
    }

    #[test]
    fn test_command_spec_display() {
        let spec = CommandSpec::new("pigz").arg("-dc").arg("app_1.0.2v.tag.gz");
        assert_eq!(spec.to_string(), "pigz -dc app_1.0.2v.tag.gz");
        assert_eq!(spec.program(), "pigz");
        assert_eq!(spec.arguments(), ["-dc", "app_1.0.2v.tag.gz"]);
    }

    #[test]
    fn test_pipeline_display() {
        let pipeline = Pipeline::new(
            CommandSpec::new("docker").args(["save", "app:1.0.2v"]),
            CommandSpec::new("pigz"),
        )
        .to_file("out/app_1.0.2v.tag.gz");
        assert_eq!(
            pipeline.to_string(),
            "docker save app:1.0.2v | pigz > out/app_1.0.2v.tag.gz"
        );
    }

    #[test]
    fn test_streams_producer_into_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");

        let output = Pipeline::new(
            CommandSpec::new("echo").arg("hello pipeline"),
            CommandSpec::new("cat"),
        )
        .to_file(&out)
        .run()
        .unwrap();

        assert_eq!(output.stdout, "");
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello pipeline\n");
    }

    #[test]
    fn test_captures_consumer_stdout_without_file() {
        let output = Pipeline::new(CommandSpec::new("echo").arg("abc"), CommandSpec::new("cat"))
            .run()
            .unwrap();
        assert_eq!(output.stdout, "abc");
    }

    #[test]
    fn test_arguments_are_not_shell_interpreted() {
        let output = Pipeline::new(
            CommandSpec::new("echo").arg("a; echo injected | $(whoami)"),
            CommandSpec::new("cat"),
        )
        .run()
        .unwrap();
        assert_eq!(output.stdout, "a; echo injected | $(whoami)");
    }

    #[test]
    fn test_non_utf8_arguments_reach_the_process() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let nested = dir.path().join(OsStr::from_bytes(b"arch\xffives"));
        fs::create_dir(&nested).unwrap();
        let input = nested.join("app_v1.tag.gz");
        fs::write(&input, "app:v1\n").unwrap();

        let output = Pipeline::new(CommandSpec::new("cat").arg(&input), CommandSpec::new("cat"))
            .run()
            .unwrap();
        assert_eq!(output.stdout, "app:v1");
    }

    #[test]
    fn test_producer_failure_is_reported_with_stderr() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.tag.gz");

        let err = Pipeline::new(
            sh("echo 'No such image: ghost:1.0' >&2; exit 3"),
            CommandSpec::new("cat"),
        )
        .to_file(&out)
        .run()
        .unwrap_err()
        .to_string();

        assert!(err.contains("No such image: ghost:1.0"), "{err}");
        assert!(err.contains("exit status: 3"), "{err}");
        // The consumer succeeded, only the producer is blamed
        assert!(!err.contains("`cat`"), "{err}");
        // Partial output is left in place
        assert!(out.exists());
    }

    #[test]
    fn test_consumer_failure_is_reported_with_stderr() {
        let err = Pipeline::new(
            CommandSpec::new("echo").arg("data"),
            sh("cat >/dev/null; echo 'invalid tar header' >&2; exit 1"),
        )
        .run()
        .unwrap_err()
        .to_string();

        assert!(err.contains("invalid tar header"), "{err}");
        assert!(err.contains("exit status: 1"), "{err}");
    }

    #[test]
    fn test_both_failures_are_reported() {
        let err = Pipeline::new(
            sh("echo producer-broke >&2; exit 2"),
            sh("cat >/dev/null; echo consumer-broke >&2; exit 4"),
        )
        .run()
        .unwrap_err()
        .to_string();

        assert!(err.contains("producer-broke"), "{err}");
        assert!(err.contains("consumer-broke"), "{err}");
    }

    #[test]
    fn test_failure_without_stderr() {
        let err = Pipeline::new(CommandSpec::new("false"), CommandSpec::new("cat"))
            .run()
            .unwrap_err()
            .to_string();
        assert_eq!(err, "`false` failed (exit status: 1)");
    }

    #[test]
    fn test_missing_producer_program() {
        let err = Pipeline::new(
            CommandSpec::new("definitely-not-a-real-tool"),
            CommandSpec::new("cat"),
        )
        .run()
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to start `definitely-not-a-real-tool`"));
    }

    #[test]
    fn test_missing_consumer_program() {
        let err = Pipeline::new(
            CommandSpec::new("sleep").arg("5"),
            CommandSpec::new("definitely-not-a-real-tool"),
        )
        .run()
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to start `definitely-not-a-real-tool`"));
    }

    #[test]
    fn test_reap_kills_and_collects_running_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();

        reap(&mut child);

        let status = child.try_wait().unwrap().expect("child should be collected");
        assert!(!status.success());
    }

    #[test]
    fn test_uncreatable_output_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("missing-dir").join("out.tag.gz");

        let err = Pipeline::new(CommandSpec::new("echo"), CommandSpec::new("cat"))
            .to_file(&out)
            .run()
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to create"));
    }

    #[test]
    fn test_large_stream_does_not_block() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("big.bin");

        // Well past any pipe buffer, plus stderr noise on both sides
        Pipeline::new(
            sh("head -c 4194304 /dev/zero; seq 1 20000 >&2"),
            sh("cat; seq 1 20000 >&2"),
        )
        .to_file(&out)
        .run()
        .unwrap();

        assert_eq!(fs::metadata(&out).unwrap().len(), 4 * 1024 * 1024);
    }
}

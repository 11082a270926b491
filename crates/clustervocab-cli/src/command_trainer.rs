//! Subprocess adapter for an external subword trainer executable.
//!
//! The trainer program is invoked as:
//! `<program> --corpus <path> --vocab-size <n> --output <model path>`
//! and must write a serialized model to the output path on success.

use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use clustervocab::{SubwordModel, SubwordTrainer, TrainerFailure};

static INVOCATION: AtomicU64 = AtomicU64::new(0);

/// Poll interval while waiting on the trainer process.
const WAIT_POLL: Duration = Duration::from_millis(200);

/// A [`SubwordTrainer`] backed by an external executable.
#[derive(Debug, Clone)]
pub struct CommandTrainer {
    program: PathBuf,
    timeout: Duration,
}

impl CommandTrainer {
    /// Create a trainer adapter.
    ///
    /// ## Arguments
    /// * `program` - the trainer executable.
    /// * `timeout` - the wall-clock limit per invocation.
    pub fn new<P: AsRef<Path>>(
        program: P,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            timeout,
        }
    }

    fn scratch_model_path() -> PathBuf {
        std::env::temp_dir().join(format!(
            "clustervocab-train-{}-{}.model",
            std::process::id(),
            INVOCATION.fetch_add(1, Ordering::Relaxed),
        ))
    }
}

impl SubwordTrainer for CommandTrainer {
    fn train(
        &self,
        corpus: &Path,
        vocab_size: usize,
    ) -> Result<SubwordModel, TrainerFailure> {
        let output = Self::scratch_model_path();

        let mut child = Command::new(&self.program)
            .arg("--corpus")
            .arg(corpus)
            .arg("--vocab-size")
            .arg(vocab_size.to_string())
            .arg("--output")
            .arg(&output)
            .spawn()
            .map_err(|e| TrainerFailure::Fatal(format!("spawn failed: {e}")))?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = std::fs::remove_file(&output);
                        return Err(TrainerFailure::Timeout);
                    }
                    std::thread::sleep(WAIT_POLL);
                }
                Err(e) => {
                    return Err(TrainerFailure::Fatal(format!("wait failed: {e}")));
                }
            }
        };

        if !status.success() {
            let _ = std::fs::remove_file(&output);

            // SIGKILL is how the kernel OOM killer terminates the trainer.
            #[cfg(unix)]
            {
                use std::os::unix::process::ExitStatusExt;
                if status.signal() == Some(9) {
                    return Err(TrainerFailure::OutOfMemory);
                }
            }

            return Err(TrainerFailure::Fatal(format!(
                "trainer exited with {status}"
            )));
        }

        let model = SubwordModel::load_path(&output)
            .map_err(|e| TrainerFailure::Fatal(format!("unreadable model output: {e}")))?;
        let _ = std::fs::remove_file(&output);
        Ok(model)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    fn write_script(
        dir: &Path,
        body: &str,
    ) -> PathBuf {
        let path = dir.join("trainer.sh");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "#!/bin/sh").unwrap();
        writeln!(f, "{body}").unwrap();
        drop(f);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_command_trainer_reads_model_output() {
        tempdir::TempDir::new("cmd_trainer_test")
            .and_then(|dir| {
                // A trainer that writes a fixed two-piece model; "$6" is
                // the --output value.
                let script = write_script(
                    dir.path(),
                    r#"printf '{"pieces":[{"piece":"<unk>","score":0.0},{"piece":"<s>","score":0.0},{"piece":"</s>","score":0.0},{"piece":"ab","score":-1.0}],"special_count":3}' > "$6""#,
                );
                let corpus = dir.path().join("corpus.txt");
                std::fs::write(&corpus, "ab\n")?;

                let trainer = CommandTrainer::new(&script, Duration::from_secs(10));
                let model = trainer.train(&corpus, 4000).expect("training failed");
                assert_eq!(model.regular_pieces().len(), 1);
                assert_eq!(model.regular_pieces()[0].piece, "ab");
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_command_trainer_times_out() {
        tempdir::TempDir::new("cmd_trainer_test")
            .and_then(|dir| {
                let script = write_script(dir.path(), "sleep 30");
                let corpus = dir.path().join("corpus.txt");
                std::fs::write(&corpus, "ab\n")?;

                let trainer = CommandTrainer::new(&script, Duration::from_millis(300));
                assert_eq!(
                    trainer.train(&corpus, 4000).unwrap_err(),
                    TrainerFailure::Timeout
                );
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_command_trainer_reports_fatal_exit() {
        tempdir::TempDir::new("cmd_trainer_test")
            .and_then(|dir| {
                let script = write_script(dir.path(), "exit 3");
                let corpus = dir.path().join("corpus.txt");
                std::fs::write(&corpus, "ab\n")?;

                let trainer = CommandTrainer::new(&script, Duration::from_secs(10));
                assert!(matches!(
                    trainer.train(&corpus, 4000).unwrap_err(),
                    TrainerFailure::Fatal(_)
                ));
                Ok(())
            })
            .unwrap();
    }
}

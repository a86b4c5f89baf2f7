//! Running the compiler under test.
//!
//! The compiler is a black box: we hand it a command line and a working
//! directory and collect what it prints.  The only thing we insist on is
//! that it finishes within a time limit.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::RunConfig;
use crate::error::{Error, Result};

/// How often a running compiler is checked on.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Selects "test" mode, only compiling, no linking or running.
const MODE_ARGS: [&str; 2] = ["--test", "compile-only"];

/// What one compiler run left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOutput {
    /// `None` if the process died from a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CompilerOutput {
    /// Exit codes 0 and 1 both mean the compiler ran normally, and
    /// maybe reported some diagnostics.  Anything else is a crash.
    pub fn ran(&self) -> bool {
        matches!(self.code, Some(0) | Some(1))
    }
}

#[derive(Debug, Clone)]
pub struct Compiler {
    path: PathBuf,
    timeout: Duration,
}

impl Compiler {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Compiler {
            path: path.into(),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Everything after the program name.
    pub fn args(cfg: &RunConfig, targets: &[PathBuf]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![];
        if let Some(arch) = &cfg.target_arch {
            args.push("--target".into());
            args.push(arch.into());
        }
        args.push("-O0".into());
        // These used to go through a shell, so `opt: --a --b` is two arguments.
        for opt in &cfg.extra_options {
            args.extend(opt.split_whitespace().map(OsString::from));
        }
        if cfg.silence_deprecation {
            args.push("--silence-deprecation".into());
        }
        args.push(if cfg.safe { "--safe=yes" } else { "--safe=no" }.into());
        args.push(if cfg.debug_info { "-g" } else { "-g0" }.into());
        args.extend(MODE_ARGS.iter().map(OsString::from));
        args.extend(targets.iter().map(|t| t.as_os_str().to_owned()));
        args
    }

    /// Compiles `targets` from within `cwd`, where any output files will land.
    pub fn run(&self, cfg: &RunConfig, targets: &[PathBuf], cwd: &Path) -> Result<CompilerOutput> {
        let args = Compiler::args(cfg, targets);
        debug!(
            "running {} {}",
            self.path.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let mut child = Command::new(&self.path)
            .args(&args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Both pipes get drained on their own threads so a chatty compiler
        // can't block on a full pipe while we wait for it.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let start = Instant::now();
        let status = wait_with_timeout(&mut child, self.timeout).map_err(|e| self.spawn_error(e))?;
        let status = match status {
            Some(status) => status,
            None => {
                // Anything the compiler started may still hold the pipes open,
                // so the readers are left detached rather than joined.
                return Err(Error::CompilerTimeout {
                    compiler: self.path.clone(),
                    limit: self.timeout,
                });
            }
        };
        let stdout = join(stdout).map_err(|e| self.spawn_error(e))?;
        let stderr = join(stderr).map_err(|e| self.spawn_error(e))?;
        info!(
            "{} exited with {:?} after {:.2?}",
            self.path.display(),
            status.code(),
            start.elapsed()
        );
        Ok(CompilerOutput {
            code: status.code(),
            stdout,
            stderr,
        })
    }

    fn spawn_error(&self, source: io::Error) -> Error {
        Error::Spawn {
            compiler: self.path.clone(),
            source,
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = vec![];
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join(handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<String> {
    let bytes = match handle {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "reader panicked")))?,
        None => vec![],
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Waits for `child` to exit.  Returns `None` if it had to be killed for
/// running past `limit`.
fn wait_with_timeout(
    child: &mut std::process::Child,
    limit: Duration,
) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now().checked_add(limit);
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.map_or(false, |d| Instant::now() >= d) {
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

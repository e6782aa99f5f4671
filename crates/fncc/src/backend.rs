//! Turning emitted llvm ir into native executables

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::{debug, trace};

/// Something that can assemble an llvm ir file into a native executable
pub trait NativeBackend {
    /// Assembles the ir at `ir` into an executable at `output`
    fn assemble(&self, ir: &Path, output: &Path) -> Result<(), BackendError>;
}

/// Uses clang to compile ir
#[derive(Debug, Clone)]
pub struct Clang {
    program: OsString,
    extra_args: Vec<OsString>,
}

impl Clang {
    /// Environment variable that overrides the default clang program
    pub const PROGRAM_ENV: &'static str = "FNCC_CC";

    /// Uses a specific clang executable
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            extra_args: vec![],
        }
    }

    /// Adds an extra argument passed to clang before the input file
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.extra_args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    fn command(&self, ir: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-Wno-override-module")
            .args(&self.extra_args)
            .arg(ir)
            .arg("-o")
            .arg(output);
        command
    }
}

impl Default for Clang {
    fn default() -> Self {
        Self::new("clang")
    }
}

impl NativeBackend for Clang {
    fn assemble(&self, ir: &Path, output: &Path) -> Result<(), BackendError> {
        let mut command = self.command(ir, output);
        debug!("running {command:?}");
        let result = command.output().map_err(|source| BackendError::Spawn {
            program: self.program.to_string_lossy().into_owned(),
            source,
        })?;
        let mut diagnostics = String::from_utf8_lossy(&result.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&result.stderr));
        trace!("{:?} exited with {}", self.program, result.status);
        // any output at all means clang had something to complain about
        if !result.status.success() || !diagnostics.trim().is_empty() {
            return Err(BackendError::Failed {
                status: result.status,
                output: diagnostics,
            });
        }
        Ok(())
    }
}

/// An error occurred while running a native backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("native compilation failed ({status}):\n{output}")]
    Failed { status: ExitStatus, output: String },
}

//! Responsible with compiling fnc files into executables

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cfg_if::cfg_if;
use fnc_ir::Module;
use thiserror::Error;
use tracing::{debug, info, info_span};

use crate::backend::{Clang, NativeBackend};
use crate::error::FnccResult;

cfg_if! {
    if #[cfg(windows)] {
        /// Where the executable is written to if no output is set
        pub const DEFAULT_OUTPUT: &str = "output.exe";
    } else {
        /// Where the executable is written to if no output is set
        pub const DEFAULT_OUTPUT: &str = "output";
    }
}

/// Name of the intermediate llvm ir file
pub const IR_FILE_NAME: &str = "main.ll";

/// What a compilation produces
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EmitKind {
    /// Only write the llvm ir to the output path
    Ir,
    /// Assemble a native executable
    #[default]
    Executable,
}

/// Responsible with compiling fnc files.
///
/// Must be configured using an [FnccBuilder].
pub struct Fncc {
    output: PathBuf,
    emit: EmitKind,
    backend: Box<dyn NativeBackend>,
    keep_ir: bool,
}

impl std::fmt::Debug for Fncc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fncc")
            .field("output", &self.output)
            .field("emit", &self.emit)
            .field("keep_ir", &self.keep_ir)
            .finish_non_exhaustive()
    }
}

impl Fncc {
    /// Creates the default FnccBuilder
    #[inline]
    pub fn builder() -> FnccBuilder {
        FnccBuilder::new()
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Compile a file at a given path, returning the path of what was written
    pub fn compile(&self, path: impl AsRef<Path>) -> FnccResult<PathBuf> {
        let path = path.as_ref();
        let _span = info_span!("compile", path = ?path).entered();
        let source = fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let module = crate::compile_module(&source, filename)?;
        self.emit(&module)
    }

    /// Writes a lowered module according to this configuration
    pub fn emit(&self, module: &Module) -> FnccResult<PathBuf> {
        let ir = module.to_string();
        match self.emit {
            EmitKind::Ir => {
                fs::write(&self.output, ir)?;
                info!("wrote ir to {:?}", self.output);
            }
            EmitKind::Executable => {
                let build_dir = tempfile::Builder::new().prefix(".build").tempdir()?;
                let ir_path = build_dir.path().join(IR_FILE_NAME);
                fs::write(&ir_path, ir)?;
                debug!("wrote ir to {ir_path:?}");
                self.backend.assemble(&ir_path, &self.output)?;
                if self.keep_ir {
                    let kept = self.output.with_extension("ll");
                    fs::copy(&ir_path, &kept)?;
                    info!("kept ir at {kept:?}");
                }
                info!("wrote executable to {:?}", self.output);
            }
        }
        Ok(self.output.clone())
    }
}

/// Builder for creating a [Fncc] instance.
pub struct FnccBuilder {
    pub output: PathBuf,
    pub emit: EmitKind,
    pub backend: Box<dyn NativeBackend>,
    pub keep_ir: bool,
}

impl FnccBuilder {
    /// Creates an FnccBuilder with default settings
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets where the compiled output is written
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output = path.as_ref().to_path_buf();
        self
    }

    pub fn emit(mut self, emit: EmitKind) -> Self {
        self.emit = emit;
        self
    }

    /// Sets the backend used to assemble executables
    pub fn backend<B: NativeBackend + 'static>(mut self, backend: B) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// Whether to keep the intermediate ir next to the executable
    pub fn keep_ir(mut self, keep_ir: bool) -> Self {
        self.keep_ir = keep_ir;
        self
    }

    /// Builds an [Fncc] instance from this builder
    pub fn build(self) -> Result<Fncc, BuildFnccError> {
        if self.output.is_dir() {
            return Err(BuildFnccError::OutputIsADirectory(self.output));
        }
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            let meta = fs::metadata(parent)
                .map_err(|e| BuildFnccError::OutputParentDoesNotExist(parent.to_path_buf(), e))?;
            if !meta.is_dir() {
                return Err(BuildFnccError::OutputParentIsNotADirectory(
                    parent.to_path_buf(),
                ));
            }
        }
        Ok(Fncc {
            output: self.output,
            emit: self.emit,
            backend: self.backend,
            keep_ir: self.keep_ir,
        })
    }
}

impl Default for FnccBuilder {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            emit: EmitKind::default(),
            backend: Box::new(Clang::default()),
            keep_ir: false,
        }
    }
}

/// An error occurred while building an [Fncc] instance
#[derive(Debug, Error)]
pub enum BuildFnccError {
    #[error("{0:?} is a directory")]
    OutputIsADirectory(PathBuf),
    #[error("{0:?} does not exist: {1}")]
    OutputParentDoesNotExist(PathBuf, io::Error),
    #[error("{0:?} is not a directory")]
    OutputParentIsNotADirectory(PathBuf),
}

use std::io;
use std::io::{stderr, stdout, Stderr, StderrLock, Stdout, StdoutLock};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use eyre::WrapErr;
use fncc::backend::Clang;
use fncc::error::FnccError;
use fncc::{EmitKind, Fncc};
use owo_colors::{OwoColorize, Stream};
use tracing::metadata::LevelFilter;
use tracing::{debug, trace, Level, Metadata};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::{format, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

use crate::args::Args;

mod args;

fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.logging().log_level_filter())?;
    trace!("starting fncc with args: {args:?}");
    debug!("fncc version: {}", env!("CARGO_PKG_VERSION"));

    let emit = if args.emit_ir {
        EmitKind::Ir
    } else {
        EmitKind::Executable
    };
    let mut builder = Fncc::builder()
        .emit(emit)
        .keep_ir(args.keep_ir)
        .backend(Clang::new(&args.cc));
    if let Some(output) = &args.output {
        builder = builder.output(output);
    } else if args.emit_ir {
        builder = builder.output(Path::new(fncc::DEFAULT_OUTPUT).with_extension("ll"));
    }
    let fncc = builder.build()?;

    match fncc.compile(&args.file) {
        Ok(written) => {
            debug!("compiled {:?} into {written:?}", args.file);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) if error.location().is_some() => {
            report(&args.file, &error)?;
            Ok(ExitCode::FAILURE)
        }
        Err(error) => {
            Err(error).wrap_err_with(|| format!("could not compile {:?}", args.file))
        }
    }
}

/// Prints an error from the source file with the lines around it
fn report(file: &Path, error: &FnccError) -> eyre::Result<()> {
    let source = std::fs::read_to_string(file)?;
    let rendered = error.render(&file.to_string_lossy(), &source);
    eprint!(
        "{}: {}",
        "error".if_supports_color(Stream::Stderr, |text| text.red()),
        rendered
    );
    Ok(())
}

struct MyWriter {
    stdout: Stdout,
    stderr: Stderr,
}

enum StdioLock<'a> {
    Stdout(StdoutLock<'a>),
    Stderr(StderrLock<'a>),
}

impl<'a> io::Write for StdioLock<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            StdioLock::Stdout(stdout) => stdout.write(buf),
            StdioLock::Stderr(stderr) => stderr.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            StdioLock::Stdout(stdout) => stdout.flush(),
            StdioLock::Stderr(stderr) => stderr.flush(),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            StdioLock::Stdout(stdout) => stdout.write_all(buf),
            StdioLock::Stderr(stderr) => stderr.write_all(buf),
        }
    }
}

impl<'a> MakeWriter<'a> for MyWriter {
    type Writer = StdioLock<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        StdioLock::Stdout(self.stdout.lock())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        // warnings and errors go to stderr
        if meta.level() <= &Level::WARN {
            StdioLock::Stderr(self.stderr.lock())
        } else {
            StdioLock::Stdout(self.stdout.lock())
        }
    }
}

fn init_logging(level_filter: LevelFilter) -> eyre::Result<()> {
    let registry = Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format().without_time())
                .with_writer(MyWriter {
                    stdout: stdout(),
                    stderr: stderr(),
                })
                .with_filter(level_filter),
        )
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(registry)?;

    Ok(())
}

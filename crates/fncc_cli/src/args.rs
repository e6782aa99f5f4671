//! the args for running fncc

use std::path::PathBuf;

use fnc_cli_common::LoggingArgs;

/// The args struct
#[derive(Debug, clap::Parser)]
#[clap(author, version, about = "Compiles fnc code into native executables")]
pub struct Args {
    #[command(flatten)]
    logging: LoggingArgs,

    /// The source file to compile
    #[clap(value_name = "source file", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,
    /// Where to write the output, defaults to `output` for executables and `output.ll` for ir
    #[clap(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Only emit llvm ir instead of an executable
    #[clap(long = "emit-ir")]
    pub emit_ir: bool,
    /// Keep the intermediate llvm ir next to the executable
    #[clap(long = "keep-ir", conflicts_with = "emit_ir")]
    pub keep_ir: bool,
    /// The clang executable used to assemble
    #[clap(long = "cc", env = "FNCC_CC", default_value = "clang")]
    pub cc: String,
}

impl Args {
    pub fn logging(&self) -> &LoggingArgs {
        &self.logging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn test_args_parsing() {
        let test = "fncc main.fnc";
        let args = Args::try_parse_from(test.split(' ')).expect("could not parse test string");
        assert_eq!(args.file, Path::new("main.fnc"));
        assert_eq!(args.output, None);
        assert!(!args.emit_ir);
        assert_eq!(args.logging().verbosity(), 0);
    }

    #[test]
    fn test_emit_ir_with_output() {
        let test = "fncc -vv --emit-ir -o out.ll main.fnc";
        let args = Args::try_parse_from(test.split(' ')).expect("could not parse test string");
        assert!(args.emit_ir);
        assert_eq!(args.output.as_deref(), Some(Path::new("out.ll")));
        assert_eq!(args.logging().verbosity(), 2);
    }

    #[test]
    fn test_cc_flag() {
        let test = "fncc --cc clang-18 main.fnc";
        let args = Args::try_parse_from(test.split(' ')).expect("could not parse test string");
        assert_eq!(args.cc, "clang-18");
    }

    #[test]
    fn test_file_is_required() {
        assert!(Args::try_parse_from(["fncc"]).is_err());
    }

    #[test]
    fn test_keep_ir_conflicts_with_emit_ir() {
        assert!(Args::try_parse_from(["fncc", "--emit-ir", "--keep-ir", "main.fnc"]).is_err());
    }
}

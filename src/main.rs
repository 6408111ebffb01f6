use std::env;
use std::path::PathBuf;

use color_eyre::eyre::{bail, Result, WrapErr};
use cpu8::memory::{Byte, StdMem};
use cpu8::processor::observer::{Observer, Trace};
use cpu8::processor::Processor;
use log::LevelFilter;
use simple_logger::SimpleLogger;

const USAGE: &str = "usage: cpu8 [--trace] [--legacy-jmp] [--verbose] [--dump] <program>";

/// Options taken from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Config {
    program: PathBuf,
    /// Print a trace line after every instruction
    trace: bool,
    legacy_jump: bool,
    /// Log a hex dump of memory after loading
    dump: bool,
    level: LevelFilter,
}

impl Config {
    fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut program = None;
        let mut trace = false;
        let mut legacy_jump = false;
        let mut dump = false;
        let mut level = LevelFilter::Warn;

        for arg in args {
            match arg.as_str() {
                "--trace" => trace = true,
                "--legacy-jmp" => legacy_jump = true,
                "--dump" => dump = true,
                "--verbose" | "-v" => level = LevelFilter::Debug,
                flag if flag.starts_with('-') => bail!("unknown option `{}`\n{}", flag, USAGE),
                path => {
                    if program.replace(PathBuf::from(path)).is_some() {
                        bail!("only one program can be run at a time\n{}", USAGE);
                    }
                }
            }
        }

        let program = match program {
            Some(program) => program,
            None => bail!("no program given\n{}", USAGE),
        };

        Ok(Self {
            program,
            trace,
            legacy_jump,
            dump,
            level,
        })
    }
}

/// Writes printed values to stdout
struct Console {
    trace: bool,
}

impl Observer for Console {
    fn print(&mut self, value: Byte) {
        println!("{}", value);
    }

    fn trace(&mut self, trace: &Trace) {
        if self.trace {
            println!("{}", trace);
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling

    let config = Config::from_args(env::args().skip(1))?;
    SimpleLogger::new()
        .with_level(config.level)
        .init()
        .wrap_err("Failed to initialize logging")?;

    let mut mem = StdMem::from_file(&config.program)?;
    if config.dump {
        mem.dump();
    }

    let mut cpu = Processor::new().with_legacy_jump(config.legacy_jump);
    let mut console = Console {
        trace: config.trace,
    };

    cpu.run(&mut mem, &mut console)
        .wrap_err_with(|| format!("Failed to run `{}`", config.program.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::from_args(args(&["demos/programs/print8.ls8"]))?;

        assert_eq!(
            config,
            Config {
                program: PathBuf::from("demos/programs/print8.ls8"),
                trace: false,
                legacy_jump: false,
                dump: false,
                level: LevelFilter::Warn,
            }
        );

        Ok(())
    }

    #[test]
    fn test_flags() -> Result<()> {
        let config = Config::from_args(args(&["--legacy-jmp", "--trace", "-v", "call.ls8"]))?;

        assert!(config.trace);
        assert!(config.legacy_jump);
        assert_eq!(config.level, LevelFilter::Debug);
        assert_eq!(config.program, PathBuf::from("call.ls8"));

        Ok(())
    }

    #[test]
    fn test_trace_keeps_log_level() -> Result<()> {
        let config = Config::from_args(args(&["--trace", "call.ls8"]))?;

        assert!(config.trace);
        assert_eq!(config.level, LevelFilter::Warn);

        Ok(())
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Config::from_args(args(&[])).is_err());
        assert!(Config::from_args(args(&["--fast", "a.ls8"])).is_err());
        assert!(Config::from_args(args(&["a.ls8", "b.ls8"])).is_err());
    }
}

//! The test runner driver program.

use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use argh::FromArgs;

use conftest::config::RunnerConfig;
use conftest::report;
use conftest::runner::Runner;

/// Runs directive-annotated compiler tests
#[derive(Debug, FromArgs)]
struct Opt {
    /// only run the tests marked as skipped
    #[argh(switch, short = 's')]
    skipped: bool,

    /// seconds a single compiler run may take before the run is aborted
    #[argh(option, short = 't', default = "60")]
    timeout: u64,

    /// extension of single-file tests
    #[argh(option, default = "String::from(\"c3\")")]
    ext: String,

    /// extension of template tests
    #[argh(option, default = "String::from(\"c3t\")")]
    template_ext: String,

    /// path to the compiler
    #[argh(positional)]
    compiler: PathBuf,

    /// test file, or directory to search for tests
    #[argh(positional)]
    tests: PathBuf,
}

fn run(opt: Opt) -> conftest::Result<bool> {
    let cfg = RunnerConfig {
        compiler: opt.compiler,
        run_skipped: opt.skipped,
        timeout: Duration::from_secs(opt.timeout),
        single_ext: opt.ext,
        template_ext: opt.template_ext,
    };
    let mut runner = Runner::new(cfg, io::stdout())?;
    runner.run_path(&opt.tests)?;
    println!("{}", runner.stats.summary());
    Ok(runner.stats.all_passed())
}

fn main() {
    pretty_env_logger::init();
    let opt: Opt = argh::from_env();
    match run(opt) {
        Ok(true) => (),
        Ok(false) => process::exit(1),
        Err(e) => {
            report::emit(&e);
            process::exit(2);
        }
    }
}

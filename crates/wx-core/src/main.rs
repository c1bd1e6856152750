//! wx-core binary entry point.

use clap::Parser;
use tracing::debug;
use wx_core::cli::{report_error, run, Cli};
use wx_core::exit_codes::ExitCode;
use wx_core::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    debug!(command = ?cli.command, "starting");

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err, cli.format);
            ExitCode::from(&err)
        }
    };
    std::process::exit(code.as_i32());
}

use pbuffer::cli::Cli;
use pbuffer::{Completion, Config, Endpoint, Error, PumpBuilder, Result, Shutdown};

use clap::Parser;
use log::{error, warn};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    let code = match run(&cli.into_config()) {
        Ok(completion) => {
            if let Completion::InputFailed(error) = &completion {
                warn!("input ended with an error: {error}");
            }
            completion.exit_code()
        }
        Err(err) => {
            error!("{err}");
            1
        }
    };

    process::exit(code);
}

fn run(config: &Config) -> Result<Completion> {
    config.validate()?;

    let shutdown = Shutdown::new()?;
    shutdown.install()?;

    let mut input = Endpoint::stdin();
    let mut output = Endpoint::stdout();
    input.set_nonblocking().map_err(|source| Error::Setup {
        what: "set STDIN non-blocking",
        source,
    })?;
    output.set_nonblocking().map_err(|source| Error::Setup {
        what: "set STDOUT non-blocking",
        source,
    })?;

    let mut pump = PumpBuilder::from_config(config).build()?;
    pump.run(&mut input, &mut output, &shutdown)
}

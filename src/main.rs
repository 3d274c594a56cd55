use std::{
    env,
    io::{self, Write},
    process::ExitCode,
};

use colored::Colorize;
use hotel_core::{Config, ConfigError, ExecutorError, StdinInput, StdoutOutput};
use hotel_desk::Desk;
use hotel_impls::PgExecutor;
use log::{error, info};
use thiserror::Error;
use tokio::runtime;

mod logging;

const USAGE: &str = "Usage: hotel <dbname> <port> <user>";

const GREETING: &str = concat!(
    "\n\n*******************************************************\n",
    "                     User Interface\n",
    "*******************************************************\n",
);

#[derive(Debug, Error)]
enum StartupError {
    #[error("{0}")]
    Usage(#[from] ConfigError),

    #[error("Unable to connect to the database: {0}")]
    Connection(#[from] ExecutorError),

    #[error("Could not build the async runtime: {0}")]
    Runtime(#[from] io::Error),
}

impl StartupError {
    fn hint(&self) -> String {
        match self {
            StartupError::Usage(_) => USAGE.to_string(),
            StartupError::Connection(_) => "Make sure you started postgres on this machine, and that the database, port and user are correct.".to_string(),
            StartupError::Runtime(_) => "This error is fatal, and should not happen.".to_string(),
        }
    }
}

fn main() -> ExitCode {
    if let Err(e) = logging::init_logger() {
        eprintln!("Could not initialize logging: {}", e);
    }

    let config = match configure() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            eprintln!("{}", error.hint());
            return ExitCode::SUCCESS;
        }
    };

    println!("{}", GREETING);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{}", "Hotel failed to start!".bold().red());
            error!("{}", error);
            error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
            ExitCode::FAILURE
        }
    }
}

/// Reads `<dbname> <port> <user>` from the command line, then the environment overrides
fn configure() -> Result<Config, StartupError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_args(&args)?.with_env(|var| env::var(var).ok())?;

    Ok(config)
}

fn run(config: Config) -> Result<(), StartupError> {
    let runtime = runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        println!("Connecting to database...");
        println!("Connection URL: {}\n", config.display_url());

        let executor = PgExecutor::connect(&config).await?;
        println!("Done");

        let mut desk = Desk::new(executor, StdinInput::new(), StdoutOutput);
        desk.run().await;

        print!("Disconnecting from database...");
        let _ = io::stdout().flush();

        if let Err(e) = desk.into_executor().close().await {
            error!("Could not close the connection cleanly: {}", e);
        }
        println!("Done\n\nBye !");

        info!("Session over");
        Ok::<(), StartupError>(())
    })
}

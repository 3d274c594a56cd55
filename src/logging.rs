use std::{env, fmt::Display};

use colored::Colorize;
use log::Level;

/// Setting this to `debug` makes the local crates log every statement they run
pub const LOG_VAR: &str = "HOTEL_LOG";

/// External crates only need to log warnings and errors
const ALLOWED_EXTERNAL_LEVELS: [Level; 2] = [Level::Warn, Level::Error];
const ALLOWED_LEVELS: [Level; 3] = [Level::Info, Level::Warn, Level::Error];

/// Logs go to stderr, stdout belongs to the menu
pub fn init_logger() -> Result<(), log::SetLoggerError> {
    let verbose = env::var(LOG_VAR).is_ok_and(|level| level.eq_ignore_ascii_case("debug"));

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let target = Target::from_str(record.target());
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^8} {}",
                level_to_string(&record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                target,
                message
            ))
        })
        .filter(move |meta| {
            let target = Target::from_str(meta.target());

            let is_allowed = ALLOWED_LEVELS.contains(&meta.level())
                || verbose && meta.level() == Level::Debug;
            let is_severe = ALLOWED_EXTERNAL_LEVELS.contains(&meta.level());

            target.is_local() && is_allowed || is_severe
        })
        .chain(std::io::stderr())
        .apply()
}

enum Target {
    External(String),
    Binary,
    Core,
    Impls,
    Desk,
}

impl Target {
    fn from_str(str: &str) -> Self {
        let module = str.split("::").next().unwrap_or_default();

        match module {
            "hotel" => Self::Binary,
            "hotel_core" => Self::Core,
            "hotel_impls" => Self::Impls,
            "hotel_desk" => Self::Desk,
            other => Target::External(other.to_string()),
        }
    }

    fn is_local(&self) -> bool {
        !matches!(self, Self::External(_))
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            Target::External(x) => x.as_str().clear(),
            Target::Binary => "HOTEL".bright_green(),
            Target::Core => "CORE".blue(),
            Target::Impls => "PG".bright_cyan(),
            Target::Desk => "DESK".bright_purple(),
        };

        Display::fmt(&result, f)
    }
}

fn level_to_string(level: &Level) -> String {
    match level {
        Level::Error => " ERR ".black().on_red().bold().to_string(),
        Level::Warn => " WRN ".black().on_yellow().bold().to_string(),
        Level::Info => " INF ".black().on_blue().bold().to_string(),
        Level::Debug => " DBG ".white().on_black().to_string(),
        Level::Trace => " TRC ".to_string(),
    }
}

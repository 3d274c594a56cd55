use thiserror::Error;

/// Where and how to reach the hotel database
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// The name of the database
    pub database: String,
    pub user: String,
    pub password: String,
    /// Abort any statement running longer than this, if set
    pub statement_timeout_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Expected 3 arguments, got {0}")]
    ArgumentCount(usize),
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    #[error("Invalid statement timeout: {0}")]
    InvalidTimeout(String),
}

impl Config {
    pub const DEFAULT_HOST: &'static str = "localhost";

    pub const HOST_VAR: &'static str = "HOTEL_DB_HOST";
    pub const PASSWORD_VAR: &'static str = "HOTEL_DB_PASSWORD";
    pub const TIMEOUT_VAR: &'static str = "HOTEL_STATEMENT_TIMEOUT";

    /// Builds a config from the positional `<dbname> <port> <user>` arguments
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let [database, port, user] = args else {
            return Err(ConfigError::ArgumentCount(args.len()));
        };

        let port = port
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port.clone()))?;

        Ok(Self {
            host: Self::DEFAULT_HOST.to_string(),
            port,
            database: database.clone(),
            user: user.clone(),
            password: String::new(),
            statement_timeout_secs: None,
        })
    }

    /// Applies overrides from the environment, looked up through `var`
    pub fn with_env<F>(mut self, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var(Self::HOST_VAR) {
            self.host = host;
        }

        if let Some(password) = var(Self::PASSWORD_VAR) {
            self.password = password;
        }

        if let Some(timeout) = var(Self::TIMEOUT_VAR) {
            let secs = timeout
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(timeout.clone()))?;

            self.statement_timeout_secs = Some(secs);
        }

        Ok(self)
    }

    /// The connection URL without credentials, safe to log
    pub fn display_url(&self) -> String {
        format!("postgres://{}:{}/{}", self.host, self.port, self.database)
    }
}

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{DatabaseSettings, LoggingSettings, ServerSettings, Settings};

/// Looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "bookshelf.toml";
/// Prefix for environment overrides, e.g. `BOOKSHELF__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "BOOKSHELF";

/// Command-line flag shared by every subcommand that needs settings.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Path to a TOML settings file (defaults to ./bookshelf.toml if present).
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

/// Loads the application settings.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file,
/// `BOOKSHELF__*` environment variables, and finally `DATABASE_URL` (which
/// may come from a `.env` file). An explicitly given file must exist; the
/// default one is optional.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    build_settings(path, std::env::var("DATABASE_URL").ok())
}

fn build_settings(
    path: Option<&Path>,
    database_url: Option<String>,
) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::from(PathBuf::from(DEFAULT_CONFIG_FILE)).required(false),
    };

    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000_i64)?
        .set_default("database.url", "sqlite://bookshelf.db?mode=rwc")?
        .set_default("database.max_connections", 5_i64)?
        .set_default("database.acquire_timeout_secs", 5_i64)?
        .set_default("logging.filter", "info,tower_http=debug,sqlx=warn")?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", database_url)?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

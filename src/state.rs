use crate::config::Config;
use crate::db::connection::establish_connection;
use crate::parser::extractor::SwapExtractor;
use crate::parser::whitelist::TokenWhitelist;
use sqlx::SqlitePool;

/// Everything a pipeline stage needs, built once per process and passed down.
pub struct AppState {
    pub db_pool: SqlitePool,
    pub whitelist: TokenWhitelist,
    pub extractor: SwapExtractor,
}

impl AppState {
    pub fn new(config: &Config, db_pool: SqlitePool) -> Self {
        let whitelist = match &config.token_whitelist {
            Some(tokens) => TokenWhitelist::new(tokens.iter().cloned()),
            None => TokenWhitelist::default(),
        };
        let extractor = SwapExtractor::new(config.extraction_mode);

        Self {
            db_pool,
            whitelist,
            extractor,
        }
    }

    /// Connect to the configured database and build the state around it.
    pub async fn initialize(config: &Config) -> Result<Self, sqlx::Error> {
        let db_pool = establish_connection(&config.database_url, config.database_max_connections).await?;
        Ok(Self::new(config, db_pool))
    }
}

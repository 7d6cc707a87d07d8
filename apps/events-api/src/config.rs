use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse, server::ServerConfig};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Startup connection attempts after the first (`MONGODB_CONNECT_RETRIES`)
    pub connect_retries: u32,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        let app = app_info!();
        let mongodb = MongoConfig::from_env()?;
        let mongodb = match mongodb.app_name {
            Some(_) => mongodb,
            None => mongodb.with_app_name(app.name),
        };

        Ok(Self {
            app,
            mongodb,
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
            connect_retries: env_parse("MONGODB_CONNECT_RETRIES", 5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_APP_NAME", None),
                ("MONGODB_CONNECT_RETRIES", None),
                ("PORT", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mongodb.app_name.as_deref(), Some("events_api"));
                assert_eq!(config.connect_retries, 5);
                assert_eq!(config.server.addr.port(), 8080);
            },
        );
    }

    #[test]
    fn test_config_keeps_explicit_app_name() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_APP_NAME", Some("events-worker")),
                ("MONGODB_CONNECT_RETRIES", Some("1")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mongodb.app_name.as_deref(), Some("events-worker"));
                assert_eq!(config.connect_retries, 1);
            },
        );
    }

    #[test]
    fn test_config_requires_mongodb_url() {
        temp_env::with_vars(
            [("MONGODB_URL", None::<&str>), ("MONGO_URL", None)],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}

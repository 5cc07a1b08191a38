use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use raffle::{DrawConfig, RedisConfig};
use std::path::PathBuf;

/// Backend holding draw sequences.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// In-process store. Draws do not survive restarts and are not shared
    /// between replicas.
    Memory,
    /// Shared Redis lists. Any replica can serve any draw.
    Redis,
}

/// Runtime configuration for the `raffle-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is honored).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "raffle-server",
    version,
    about = "An HTTP service for randomized, exhaustible draws"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:80"))]
    pub server_addr: String,

    /// Draw store backend.
    ///
    /// Environment variable: `STORE`
    #[arg(long, env = "STORE", value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    /// Environment variable: `REDIS_HOST`
    #[arg(long, env = "REDIS_HOST", default_value_t = String::from("127.0.0.1"))]
    pub redis_host: String,

    /// Environment variable: `REDIS_PORT`
    #[arg(long, env = "REDIS_PORT", default_value_t = 6379)]
    pub redis_port: u16,

    /// Environment variable: `REDIS_USERNAME`
    #[arg(long, env = "REDIS_USERNAME")]
    pub redis_username: Option<String>,

    /// Environment variable: `REDIS_PASSWORD`
    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    pub redis_password: Option<String>,

    /// Environment variable: `REDIS_DB`
    #[arg(long, env = "REDIS_DB", default_value_t = 0)]
    pub redis_db: i64,

    /// Upper bound on a single store round trip, in milliseconds.
    ///
    /// A request whose store call exceeds this fails with `StoreUnavailable`;
    /// the write may or may not have been applied.
    ///
    /// Environment variable: `STORE_TIMEOUT_MS`
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 5_000)]
    pub store_timeout_ms: u64,

    /// Optional expiry for draws, in seconds, refreshed on every create or
    /// replace. Unset keeps draws until they are deleted.
    ///
    /// Environment variable: `DRAW_TTL_SECS`
    #[arg(long, env = "DRAW_TTL_SECS")]
    pub draw_ttl_secs: Option<u64>,

    /// Maximum number of names accepted in a single create or replace.
    ///
    /// Environment variable: `MAX_ENTRIES`
    #[arg(long, env = "MAX_ENTRIES", default_value_t = 10_000)]
    pub max_entries: usize,

    /// JSON file holding an array of catalog entries. Without it the catalog
    /// is empty and catalog draws fail with `CatalogEmpty`.
    ///
    /// Environment variable: `CATALOG_PATH`
    #[arg(long, env = "CATALOG_PATH")]
    pub catalog_path: Option<PathBuf>,

    /// Number of catalog candidates used when a request does not specify one.
    ///
    /// Environment variable: `CATALOG_SELECTION`
    #[arg(long, env = "CATALOG_SELECTION", default_value_t = 3)]
    pub catalog_selection: usize,

    /// Seconds to wait for in-flight requests after a shutdown signal.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 5)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Memory { ttl: Option<Duration> },
    Redis(RedisConfig),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub store: StoreConfig,
    pub draw: DrawConfig,
    pub max_entries: usize,
    pub catalog_path: Option<PathBuf>,
    pub shutdown_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.store_timeout_ms == 0 {
            bail!("STORE_TIMEOUT_MS must be greater than 0");
        }

        if args.max_entries == 0 {
            bail!("MAX_ENTRIES must be greater than 0");
        }

        if args.catalog_selection == 0 {
            bail!("CATALOG_SELECTION must be greater than 0");
        }

        if args.draw_ttl_secs == Some(0) {
            bail!("DRAW_TTL_SECS must be greater than 0 when set");
        }

        let ttl = args.draw_ttl_secs.map(Duration::from_secs);
        let store = match args.store {
            StoreKind::Memory => StoreConfig::Memory { ttl },
            StoreKind::Redis => {
                if args.redis_host.trim().is_empty() {
                    bail!("REDIS_HOST must not be empty when STORE=redis");
                }
                StoreConfig::Redis(RedisConfig {
                    host: args.redis_host,
                    port: args.redis_port,
                    username: args.redis_username.filter(|s| !s.is_empty()),
                    password: args.redis_password.filter(|s| !s.is_empty()),
                    db: args.redis_db,
                    ttl,
                })
            }
        };

        Ok(Self {
            server_addr: args.server_addr,
            store,
            draw: DrawConfig {
                store_timeout: Duration::from_millis(args.store_timeout_ms),
                catalog_selection: args.catalog_selection,
            },
            max_entries: args.max_entries,
            catalog_path: args.catalog_path,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> anyhow::Result<ServerConfig> {
        let argv = std::iter::once("raffle-server").chain(extra.iter().copied());
        ServerConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn explicit_flags_are_carried_over() {
        let config = parse(&[
            "--server-addr",
            "127.0.0.1:8080",
            "--store-timeout-ms",
            "250",
            "--max-entries",
            "12",
            "--catalog-selection",
            "5",
            "--draw-ttl-secs",
            "60",
            "--store",
            "memory",
        ])
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.draw.store_timeout, Duration::from_millis(250));
        assert_eq!(config.draw.catalog_selection, 5);
        assert_eq!(config.max_entries, 12);
        assert!(matches!(
            config.store,
            StoreConfig::Memory { ttl: Some(ttl) } if ttl == Duration::from_secs(60)
        ));
    }

    #[test]
    fn redis_settings_are_collected() {
        let config = parse(&[
            "--store",
            "redis",
            "--redis-host",
            "cache",
            "--redis-port",
            "6380",
            "--redis-username",
            "svc",
            "--redis-password",
            "",
        ])
        .unwrap();

        let StoreConfig::Redis(redis) = config.store else {
            panic!("expected redis store config");
        };
        assert_eq!(redis.host, "cache");
        assert_eq!(redis.port, 6380);
        assert_eq!(redis.username.as_deref(), Some("svc"));
        assert_eq!(redis.password, None);
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(parse(&["--store-timeout-ms", "0"]).is_err());
        assert!(parse(&["--max-entries", "0"]).is_err());
        assert!(parse(&["--catalog-selection", "0"]).is_err());
        assert!(parse(&["--draw-ttl-secs", "0"]).is_err());
    }

    #[test]
    fn blank_redis_host_is_rejected() {
        assert!(parse(&["--store", "redis", "--redis-host", " "]).is_err());
    }

    #[test]
    fn unknown_store_is_rejected() {
        assert!(parse(&["--store", "postgres"]).is_err());
    }
}

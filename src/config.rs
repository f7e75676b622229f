use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

use crate::storage::StorageConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub page_size: u64,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let page_size: u64 =
            std::env::var("PAGE_SIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        let defaults = StorageConfig::default();

        let db_port: u16 = match std::env::var("CINEMA_DB_PORT") {
            Ok(raw) => raw.parse().context("CINEMA_DB_PORT")?,
            Err(_) => defaults.port,
        };

        let storage = StorageConfig {
            port: db_port,
            home: std::env::var("CINEMA_DB_HOME").map(PathBuf::from).unwrap_or(defaults.home),
            file: std::env::var("CINEMA_DB_FILE").unwrap_or(defaults.file),
            username: std::env::var("CINEMA_DB_USERNAME").unwrap_or(defaults.username),
            password: std::env::var("CINEMA_DB_PASSWORD").unwrap_or(defaults.password),
        };

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            page_size: page_size.max(1),
            storage,
        })
    }
}

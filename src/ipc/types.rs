use crate::config::Config;
use crate::registrar::Registrar;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub registrar: Registrar,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let registrar = Registrar::new(&config);
        Self {
            config,
            registrar,
            started_at: Utc::now(),
        }
    }
}

//! Startup configuration, read from `ROSTERD_*` environment variables over
//! built-in defaults.

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::Verbosity;

const ENV_PREFIX: &str = "ROSTERD_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace opened before the first request, as if the UI had sent
    /// `workspace.select`.
    pub workspace: Option<PathBuf>,
    pub verbosity: Verbosity,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        figment
            .extract()
            .map_err(|e| anyhow::anyhow!("invalid rosterd configuration: {e}"))
    }
}

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::Cli;

/// Run configuration, merged from defaults, then `VPC_SWEEP_*` environment
/// variables, then the command line (highest precedence).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub profile: Option<String>,
    pub no_verify_ssl: bool,
}

/// Only flags the user actually passed; absent fields keep whatever the
/// environment provided.
#[derive(Debug, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_verify_ssl: Option<bool>,
}

impl AppConfig {
    pub fn load(cli: &Cli) -> Result<Self, figment::Error> {
        let overrides = CliOverrides {
            profile: cli.profile.clone(),
            no_verify_ssl: cli.no_verify_ssl.then_some(true),
        };

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Env::prefixed("VPC_SWEEP_"))
            .merge(Serialized::defaults(overrides))
            .extract()
    }
}

use log::{debug, warn};
use reqwest::Url;
use serde::Serialize;

use super::config::ClientConfig;
use super::Client;

/// Environment override, highest-precedence api-base source.
pub const ENV_API_BASE: &str = "DISTROGATE_API_BASE";

/// Development front-end port and the api port conventionally paired
/// with it on the same host.
const DEV_ORIGIN_PORT: u16 = 3000;
const DEV_API_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiBaseSource {
    Env,
    ConfigOverride,
    RemoteConfig,
    Inferred,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedBase {
    pub base: String,
    pub source: ApiBaseSource,
}

enum BaseStrategy {
    Env,
    ConfigOverride,
    RemoteConfig,
    Inference,
}

/// Resolves the api base: environment override, then the config-file
/// override, then the public remote config, then origin inference. The
/// chain cannot fail, inference always produces an answer so callers
/// are never blocked on configuration.
pub async fn resolve_api_base(cfg: &ClientConfig) -> ResolvedBase {
    let chain = [
        BaseStrategy::Env,
        BaseStrategy::ConfigOverride,
        BaseStrategy::RemoteConfig,
        BaseStrategy::Inference,
    ];
    for strategy in chain {
        if let Some(resolved) = strategy.resolve(cfg).await {
            debug!(
                "Resolved api base '{}' from {:?}",
                resolved.base, resolved.source
            );
            return resolved;
        }
    }
    // Inference always resolves
    unreachable!("api base resolution chain is exhaustive");
}

impl BaseStrategy {
    async fn resolve(&self, cfg: &ClientConfig) -> Option<ResolvedBase> {
        match self {
            BaseStrategy::Env => {
                let base = std::env::var(ENV_API_BASE).ok()?;
                if base.trim().is_empty() {
                    return None;
                }
                Some(ResolvedBase {
                    base: strip_base(&base),
                    source: ApiBaseSource::Env,
                })
            }
            BaseStrategy::ConfigOverride => {
                if cfg.server.trim().is_empty() {
                    return None;
                }
                Some(ResolvedBase {
                    base: strip_base(&cfg.server),
                    source: ApiBaseSource::ConfigOverride,
                })
            }
            BaseStrategy::RemoteConfig => {
                let base = remote_config_base(cfg).await?;
                Some(ResolvedBase {
                    base,
                    source: ApiBaseSource::RemoteConfig,
                })
            }
            BaseStrategy::Inference => Some(ResolvedBase {
                base: infer_base(&cfg.origin),
                source: ApiBaseSource::Inferred,
            }),
        }
    }
}

async fn remote_config_base(cfg: &ClientConfig) -> Option<String> {
    let origin = strip_base(&cfg.origin);
    if origin.is_empty() {
        return None;
    }

    let client = match Client::new(&origin, cfg.timeout_secs) {
        Ok(client) => client,
        Err(err) => {
            warn!("Origin '{origin}' is not usable for remote config: {err:#}");
            return None;
        }
    };

    match client.website_config().await {
        Ok(config) => config.api_candidate().map(strip_base),
        Err(err) => {
            warn!("Fetch remote website config failed: {err:#}, falling back to origin inference");
            None
        }
    }
}

/// Same-origin inference: the dev front-end port maps to the fixed api
/// port on the same host, any other origin is assumed to serve the api
/// itself.
fn infer_base(origin: &str) -> String {
    let origin = strip_base(origin);
    let mut url = match Url::parse(&origin) {
        Ok(url) => url,
        Err(_) => return origin,
    };

    if url.port() == Some(DEV_ORIGIN_PORT) && url.set_port(Some(DEV_API_PORT)).is_err() {
        return origin;
    }
    strip_base(url.as_str())
}

fn strip_base<S: AsRef<str>>(base: S) -> String {
    base.as_ref().trim().trim_end_matches('/').to_string()
}

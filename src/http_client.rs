//! Shared HTTP client construction policy.
//!
//! One client is built per run and shared by the DOI resolver and the
//! landing-page prober, so connection pooling, user-agent, compression, and
//! redirect policy stay consistent. Per-call deadlines are set on each request.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Proxy};
use thiserror::Error;
use tracing::warn;

use crate::user_agent;

/// Connect timeout applied to every request made with the shared client.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Maximum redirect hops followed before a request fails.
pub const MAX_REDIRECTS: usize = 10;

/// Errors building the shared HTTP client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The builder rejected the configuration
    #[error("HTTP client construction failed: {0}")]
    Build(#[source] reqwest::Error),

    /// The builder panicked on both the default and the env-proxy path
    #[error("HTTP client construction panicked while initializing networking")]
    Panic,
}

/// Builds the shared HTTP client.
///
/// # Errors
///
/// Returns [`HttpClientError`] when client construction fails.
pub fn build_http_client() -> Result<Client, HttpClientError> {
    let user_agent = user_agent::default_user_agent();

    match try_build_client(&user_agent, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some restricted sandboxes panic when querying system proxy
            // settings. The fallback keeps env-proxy support without the lookup.
            warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
            match try_build_client(&user_agent, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(HttpClientError::Panic),
                Err(BuildClientFailure::Build(error)) => Err(HttpClientError::Build(error)),
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(HttpClientError::Build(error)),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    user_agent: &str,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let user_agent = user_agent.to_string();
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(user_agent);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(user_agent: String) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .user_agent(user_agent)
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

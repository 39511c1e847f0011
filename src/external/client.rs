use std::time::Duration;

/// User-Agent sent to every provider API
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all messengers.
///
/// One client is created at startup and cloned into each messenger, so
/// connections to a provider are pooled across requests.
///
/// # Features
/// - **Compression**: Supports gzip, deflate, brotli, and zstd compression
/// - **HTTP/2**: Adaptive window sizing and keep-alive
/// - **Timeouts**: 10s connect timeout only. A slow provider call is bounded
///   by the server write timeout, not by the client
/// - **Security**: Uses Rustls for TLS (no OpenSSL dependency)
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        .use_rustls_tls()
        .user_agent(USER_AGENT)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_initialization() {
        assert!(build_client().is_ok());
    }

    #[test]
    fn test_user_agent_names_the_crate() {
        assert!(USER_AGENT.starts_with("postback-relay/"));
    }
}

use anyhow::anyhow;

/// Map a reqwest transport failure to a message that tells the user
/// what to check, instead of surfacing the raw error chain.
pub(crate) fn api_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> anyhow::Error {
    if err.is_timeout() {
        return anyhow!(
            "Request to '{}' timed out after {}s. \
             Increase GROQ_TIMEOUT_SECS or try again later.",
            api_url,
            timeout_secs
        );
    }

    if err.is_connect() {
        return anyhow!(
            "Failed to connect to '{}'. \
             Check GROQ_BASE_URL and network connectivity.",
            api_url
        );
    }

    anyhow!("Request to '{}' failed: {}", api_url, err)
}

use std::env;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_HISTORY_MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub history_max_entries: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            api_key: get_var("GROQ_API_KEY")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            base_url: parse_base_url(get_var("GROQ_BASE_URL").as_deref()),
            max_tokens: parse_max_tokens(get_var("GROQ_MAX_TOKENS").as_deref()),
            request_timeout_secs: parse_timeout_secs(get_var("GROQ_TIMEOUT_SECS").as_deref()),
            history_max_entries: parse_history_size(get_var("GROQSH_HISTORY_SIZE").as_deref()),
        }
    }
}

fn parse_base_url(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

fn parse_max_tokens(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_TOKENS)
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn parse_history_size(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_HISTORY_MAX_ENTRIES)
}

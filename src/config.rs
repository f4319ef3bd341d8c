use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_USER_AGENT: &str = "user-console";

pub struct Config {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn try_parse() -> Result<Config, &'static str> {
        let _ = dotenv();

        let timeout = match var("USERS_API_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(raw.trim().parse::<u64>().map_err(
                |_| "An error occured while parsing USERS_API_TIMEOUT_SECS env param",
            )?)),
            Err(_) => None,
        };

        Ok(Config {
            api_url: var("USERS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            user_agent: var("USERS_API_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            timeout,
        })
    }
}

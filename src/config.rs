use crate::error::Error;
use crate::Result;
use reqwest::Url;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Config {
    // -- Server
    pub APP_PORT: u16,
    // -- AmoCRM
    pub AMOCRM_API_URL: String,
    pub AMOCRM_API_TOKEN: String,
    pub AMOCRM_TIMEOUT: Option<Duration>,
    // -- AmoCRM OAuth, all or nothing
    pub OAUTH: Option<OAuthConfig>,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Config {
    pub fn load_from_env() -> Result<Config> {
        Self::load_from(|name| env::var(name).ok())
    }

    pub fn load_from<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = get_env(&lookup, "AMOCRM_API_URL")?;
        match Url::parse(&api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(Error::ConfigWrongFormat("AMOCRM_API_URL")),
        }

        let timeout = get_opt_env_as_parse::<u64, _>(&lookup, "AMOCRM_TIMEOUT_SECS")?;
        if timeout == Some(0) {
            return Err(Error::ConfigWrongFormat("AMOCRM_TIMEOUT_SECS"));
        }

        Ok(Config {
            APP_PORT: get_opt_env_as_parse(&lookup, "APP_PORT")?.unwrap_or(3000),
            AMOCRM_API_URL: api_url.trim_end_matches('/').to_string(),
            AMOCRM_API_TOKEN: get_env(&lookup, "AMOCRM_API_TOKEN")?,
            AMOCRM_TIMEOUT: timeout.map(Duration::from_secs),
            OAUTH: load_oauth(&lookup)?,
        })
    }
}

fn load_oauth<F>(lookup: &F) -> Result<Option<OAuthConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let client_id = get_opt_env(lookup, "AMOCRM_CLIENT_ID");
    let client_secret = get_opt_env(lookup, "AMOCRM_CLIENT_SECRET");
    let redirect_uri = get_opt_env(lookup, "AMOCRM_REDIRECT_URI");

    match (client_id, client_secret, redirect_uri) {
        (None, None, None) => Ok(None),
        (Some(client_id), Some(client_secret), Some(redirect_uri)) => Ok(Some(OAuthConfig {
            client_id,
            client_secret,
            redirect_uri,
        })),
        (None, _, _) => Err(Error::ConfigMissingEnv("AMOCRM_CLIENT_ID")),
        (_, None, _) => Err(Error::ConfigMissingEnv("AMOCRM_CLIENT_SECRET")),
        (_, _, None) => Err(Error::ConfigMissingEnv("AMOCRM_REDIRECT_URI")),
    }
}

fn get_opt_env<F>(lookup: &F, name: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn get_env<F>(lookup: &F, name: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    get_opt_env(lookup, name).ok_or(Error::ConfigMissingEnv(name))
}

fn get_opt_env_as_parse<T: FromStr, F>(lookup: &F, name: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
{
    get_opt_env(lookup, name)
        .map(|val| val.trim().parse::<T>().map_err(|_| Error::ConfigWrongFormat(name)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const BASE: [(&str, &str); 2] = [
        ("AMOCRM_API_URL", "https://acme.amocrm.ru/api/v4/"),
        ("AMOCRM_API_TOKEN", "secret"),
    ];

    #[test]
    fn loads_required_values_with_defaults() {
        let config = Config::load_from(lookup(&BASE)).unwrap();
        assert_eq!(config.AMOCRM_API_URL, "https://acme.amocrm.ru/api/v4");
        assert_eq!(config.AMOCRM_API_TOKEN, "secret");
        assert_eq!(config.APP_PORT, 3000);
        assert!(config.AMOCRM_TIMEOUT.is_none());
        assert!(config.OAUTH.is_none());
    }

    #[test]
    fn missing_token_fails() {
        let err = Config::load_from(lookup(&BASE[..1])).unwrap_err();
        assert!(matches!(err, Error::ConfigMissingEnv("AMOCRM_API_TOKEN")));
    }

    #[test]
    fn blank_url_counts_as_missing() {
        let err = Config::load_from(lookup(&[
            ("AMOCRM_API_URL", "  "),
            ("AMOCRM_API_TOKEN", "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::ConfigMissingEnv("AMOCRM_API_URL")));
    }

    #[test]
    fn relative_url_is_rejected() {
        let err = Config::load_from(lookup(&[
            ("AMOCRM_API_URL", "acme.amocrm.ru"),
            ("AMOCRM_API_TOKEN", "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::ConfigWrongFormat("AMOCRM_API_URL")));
    }

    #[test]
    fn bad_port_and_timeout_are_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("APP_PORT", "http"));
        let err = Config::load_from(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, Error::ConfigWrongFormat("APP_PORT")));

        let mut pairs = BASE.to_vec();
        pairs.push(("AMOCRM_TIMEOUT_SECS", "0"));
        let err = Config::load_from(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, Error::ConfigWrongFormat("AMOCRM_TIMEOUT_SECS")));
    }

    #[test]
    fn oauth_is_all_or_nothing() {
        let mut pairs = BASE.to_vec();
        pairs.push(("AMOCRM_CLIENT_ID", "id"));
        pairs.push(("AMOCRM_CLIENT_SECRET", "s3cr3t"));
        let err = Config::load_from(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, Error::ConfigMissingEnv("AMOCRM_REDIRECT_URI")));

        pairs.push(("AMOCRM_REDIRECT_URI", "https://example.org/cb"));
        let oauth = Config::load_from(lookup(&pairs)).unwrap().OAUTH.unwrap();
        assert_eq!(oauth.client_id, "id");
        assert_eq!(oauth.redirect_uri, "https://example.org/cb");
    }
}

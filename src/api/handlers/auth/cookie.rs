//! The `token` cookie: building, clearing and reading it.

use axum::http::{header::InvalidHeaderValue, header::COOKIE, HeaderMap, HeaderValue};

use super::state::{AuthConfig, Environment};

pub const TOKEN_COOKIE_NAME: &str = "token";

/// Cross-site in production (the web client is served from another origin).
fn cookie_attributes(config: &AuthConfig) -> &'static str {
    match config.environment() {
        Environment::Production => "; Secure; SameSite=None",
        Environment::Development => "; SameSite=Strict",
    }
}

/// Build the `HttpOnly` cookie carrying a freshly issued token.
pub fn token_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.token_ttl_seconds();
    let mut cookie = format!("{TOKEN_COOKIE_NAME}={token}; Path=/; HttpOnly; Max-Age={ttl_seconds}");
    cookie.push_str(cookie_attributes(config));
    HeaderValue::from_str(&cookie)
}

pub fn clear_token_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{TOKEN_COOKIE_NAME}=; Path=/; HttpOnly; Max-Age=0");
    cookie.push_str(cookie_attributes(config));
    HeaderValue::from_str(&cookie)
}

/// Value of the `token` cookie; an empty value counts as missing.
#[must_use]
pub fn extract_token_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == TOKEN_COOKIE_NAME).then(|| val.trim().to_string())
        })
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config(environment: Environment) -> AuthConfig {
        AuthConfig::new(SecretString::from("secret".to_string()))
            .with_token_ttl_seconds(600)
            .with_environment(environment)
    }

    #[test]
    fn development_cookie_is_strict() -> anyhow::Result<()> {
        let cookie = token_cookie(&config(Environment::Development), "abc")?;
        assert_eq!(
            cookie.to_str()?,
            "token=abc; Path=/; HttpOnly; Max-Age=600; SameSite=Strict"
        );
        Ok(())
    }

    #[test]
    fn production_cookie_is_secure_cross_site() -> anyhow::Result<()> {
        let cookie = token_cookie(&config(Environment::Production), "abc")?;
        let value = cookie.to_str()?;
        assert!(value.ends_with("; Secure; SameSite=None"));

        let cleared = clear_token_cookie(&config(Environment::Production))?;
        assert_eq!(
            cleared.to_str()?,
            "token=; Path=/; HttpOnly; Max-Age=0; Secure; SameSite=None"
        );
        Ok(())
    }

    #[test]
    fn extracts_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=abc.def ; x=1"));
        assert_eq!(extract_token_cookie(&headers).as_deref(), Some("abc.def"));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("tokens=zzz; token="));
        assert_eq!(extract_token_cookie(&headers), None);
        assert_eq!(extract_token_cookie(&HeaderMap::new()), None);
    }
}

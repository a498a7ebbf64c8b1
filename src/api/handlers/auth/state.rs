//! Token configuration and the signing/verification keys derived from it.

use jsonwebtoken::{errors::Error as JwtError, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 60 * 60;

/// Deployment environment; decides the cookie attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    token_secret: SecretString,
    token_ttl_seconds: u64,
    environment: Environment,
}

impl AuthConfig {
    #[must_use]
    pub fn new(token_secret: SecretString) -> Self {
        Self {
            token_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            environment: Environment::default(),
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }
}

/// Decoded token payload, attached to the request by the token middleware.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

pub struct AuthState {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let secret = config.token_secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Sign a token for `email` that expires after the configured TTL.
    ///
    /// # Errors
    /// Returns an error if the token cannot be encoded.
    pub fn issue(&self, email: &str) -> Result<String, JwtError> {
        let iat = unix_now();
        let claims = Claims {
            email: email.to_string(),
            iat,
            exp: iat.saturating_add(self.config.token_ttl_seconds),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Check the signature and expiry of `token`.
    ///
    /// # Errors
    /// Returns an error if the token is malformed, forged, or expired.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(secret: &str) -> AuthState {
        AuthState::new(AuthConfig::new(SecretString::from(secret.to_string())))
    }

    #[test]
    fn issued_token_verifies() -> anyhow::Result<()> {
        let auth = state("s3cret");
        let token = auth.issue("a@x.com")?;
        let claims = auth.verify(&token)?;
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, 3600);
        Ok(())
    }

    #[test]
    fn token_from_other_secret_is_rejected() -> anyhow::Result<()> {
        let token = state("one").issue("a@x.com")?;
        assert!(state("two").verify(&token).is_err());
        assert!(state("one").verify("not.a.token").is_err());
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> anyhow::Result<()> {
        let auth = state("s3cret");
        let claims = Claims {
            email: "a@x.com".to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &auth.encoding_key)?;
        assert!(auth.verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn environment_parses_names() {
        assert_eq!("production".parse(), Ok(Environment::Production));
        assert_eq!("Development".parse(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }
}

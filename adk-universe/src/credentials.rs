//! Credential naming and the in-memory bearer token.

use std::fmt;

use reqwest::header::HeaderValue;

use crate::error::{Result, UniverseError};

const CREDENTIAL_PREFIX: &str = "universe_token_";

/// Derive the name under which the host stores the bearer token for `server_url`.
///
/// Every character of `"universe_token_" + server_url` that is not an ASCII
/// letter or digit is replaced by `_`.
///
/// ```
/// use adk_universe::credentials::credential_name;
///
/// assert_eq!(
///     credential_name("https://store.example:8080"),
///     "universe_token_https___store_example_8080"
/// );
/// ```
pub fn credential_name(server_url: &str) -> String {
    CREDENTIAL_PREFIX
        .chars()
        .chain(server_url.chars())
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Human readable instructions shown to the operator when the host asks for
/// the token.
pub fn credential_description(server_url: &str) -> String {
    format!(
        "Bearer token for the universe server at {server_url}. \
         Request one from the server's administrator; it is sent as \
         `Authorization: Bearer <token>` on every request."
    )
}

/// A bearer token that never appears in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `Authorization` header value, marked sensitive so it is redacted
    /// when a request is debug-printed.
    pub fn authorization_header(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0)).map_err(|_| {
            UniverseError::CredentialError(
                "token contains characters not allowed in an HTTP header".to_string(),
            )
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_non_alphanumeric() {
        assert_eq!(
            credential_name("https://store.example"),
            "universe_token_https___store_example"
        );
        assert_eq!(
            credential_name("http://10.0.0.1/api/v2"),
            "universe_token_http___10_0_0_1_api_v2"
        );
    }

    #[test]
    fn description_mentions_server() {
        assert!(credential_description("https://store.example").contains("https://store.example"));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = BearerToken::new("s3cr3t");
        assert_eq!(format!("{token:?}"), "BearerToken(***)");
        assert_eq!(token.expose(), "s3cr3t");
    }

    #[test]
    fn authorization_header_is_sensitive() {
        let header = BearerToken::new("abc").authorization_header().unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer abc");
        assert!(header.is_sensitive());

        let err = BearerToken::new("bad\ntoken").authorization_header().unwrap_err();
        assert!(matches!(err, UniverseError::CredentialError(_)));
    }
}

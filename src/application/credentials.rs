// Tenant credentials with an explicit per-call fallback to the default secret
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("key {key} was not found in secret '{secret}'")]
    MissingKey { secret: String, key: String },
}

pub trait SecretReader: Send + Sync {
    fn read_secret(&self, secret_name: &str, key: &str) -> Result<String, CredentialError>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct DynatraceCredentials {
    /// Always starts with `https://` or `http://`, no trailing slash.
    pub tenant: String,
    pub api_token: String,
}

impl fmt::Debug for DynatraceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynatraceCredentials")
            .field("tenant", &self.tenant)
            .field("api_token", &"***")
            .finish()
    }
}

/// Reads the requested secret and, when that fails, the default one.
/// Built per request; holds no state of its own.
pub struct CredentialFallback<'a> {
    reader: &'a dyn SecretReader,
    default_secret: &'a str,
}

impl<'a> CredentialFallback<'a> {
    pub fn new(reader: &'a dyn SecretReader, default_secret: &'a str) -> Self {
        Self {
            reader,
            default_secret,
        }
    }

    /// Returns the credentials and the name of the secret they came from.
    pub fn dynatrace_credentials(&self, secret_name: &str) -> Result<(DynatraceCredentials, String), CredentialError> {
        let secret_name = if secret_name.trim().is_empty() {
            self.default_secret
        } else {
            secret_name
        };

        match self.read(secret_name) {
            Ok(credentials) => Ok((credentials, secret_name.to_string())),
            Err(e) if secret_name != self.default_secret => {
                tracing::warn!(
                    secret = secret_name,
                    fallback = self.default_secret,
                    error = %e,
                    "Falling back to default credentials"
                );
                let credentials = self.read(self.default_secret)?;
                Ok((credentials, self.default_secret.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn read(&self, secret_name: &str) -> Result<DynatraceCredentials, CredentialError> {
        let tenant = self.reader.read_secret(secret_name, "DT_TENANT")?;
        let api_token = self.reader.read_secret(secret_name, "DT_API_TOKEN")?;
        Ok(DynatraceCredentials {
            tenant: clean_url(&tenant),
            api_token: clean_token(&api_token),
        })
    }
}

/// Trims newlines and trailing slashes; https unless http is explicit.
pub fn clean_url(url: &str) -> String {
    let url = url.trim_matches('\n').trim_end_matches('/');
    if url.starts_with("http://") {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches("https://"))
    }
}

pub fn clean_token(token: &str) -> String {
    token.trim_matches('\n').to_string()
}

// Secrets read from process environment variables
use crate::application::credentials::{CredentialError, SecretReader};

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Maps secret `dynatrace-prod`, key `DT_TENANT` to `DYNATRACE_PROD_DT_TENANT`.
pub struct EnvSecretReader {
    lookup: Box<Lookup>,
}

impl EnvSecretReader {
    pub fn from_env() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }
}

pub fn variable_name(secret_name: &str, key: &str) -> String {
    let secret: String = secret_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{}_{}", secret, key)
}

impl SecretReader for EnvSecretReader {
    fn read_secret(&self, secret_name: &str, key: &str) -> Result<String, CredentialError> {
        let name = variable_name(secret_name, key);
        (self.lookup)(&name)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| CredentialError::MissingKey {
                secret: secret_name.to_string(),
                key: key.to_string(),
            })
    }
}

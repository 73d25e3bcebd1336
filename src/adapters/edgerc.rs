use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// API client credentials from one `.edgerc` section.
#[derive(Clone, PartialEq, Eq)]
pub struct EdgeGridCredentials {
    pub host: String,
    pub client_token: String,
    pub client_secret: String,
    pub access_token: String,
}

impl fmt::Debug for EdgeGridCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeGridCredentials")
            .field("host", &self.host)
            .field("client_token", &self.client_token)
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl EdgeGridCredentials {
    pub fn from_edgerc<P: AsRef<Path>>(path: P, section: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EtlError::AuthError {
            message: format!("cannot read credentials file {}: {}", path.display(), e),
        })?;
        Self::from_edgerc_str(&content, section)
    }

    pub fn from_edgerc_str(content: &str, section: &str) -> Result<Self> {
        let sections = parse_ini(content);
        let values = sections.get(section).ok_or_else(|| EtlError::AuthError {
            message: format!("section [{}] not found in .edgerc", section),
        })?;

        let field = |key: &str| -> Result<String> {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| EtlError::AuthError {
                    message: format!("'{}' missing from section [{}]", key, section),
                })
        };

        Ok(Self {
            host: normalize_host(&field("host")?),
            client_token: field("client_token")?,
            client_secret: field("client_secret")?,
            access_token: field("access_token")?,
        })
    }
}

fn normalize_host(host: &str) -> String {
    host.trim_start_matches("https://")
        .trim_end_matches('/')
        .to_string()
}

/// Minimal INI reader: `[section]` headers, `key = value` or `key: value`
/// pairs, `#`/`;` comment lines. Keys are case-insensitive.
fn parse_ini(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let Some(section) = &current else {
            continue;
        };
        let Some(split_at) = line.find(['=', ':']) else {
            continue;
        };
        let key = line[..split_at].trim().to_lowercase();
        let value = line[split_at + 1..].trim().to_string();
        if let Some(values) = sections.get_mut(section) {
            values.insert(key, value);
        }
    }

    sections
}

use std::fmt;

use crate::error::StoreError;

const DEFAULT_REGION: &str = "us-east-1";

/// Parsed storage connection string.
///
/// The format is semicolon-separated `Key=Value` pairs with case-insensitive
/// keys, for example:
///
/// ```text
/// Endpoint=https://s3.eu-north-1.amazonaws.com;Region=eu-north-1;AccessKeyId=AKIA...;SecretAccessKey=...
/// ```
///
/// Without `AccessKeyId`/`SecretAccessKey` the ambient AWS credential chain is used.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConnection {
    pub endpoint: Option<String>,
    pub region: String,
    pub credentials: Option<StaticCredentials>,
    pub force_path_style: bool,
}

#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StorageConnection {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let mut endpoint = None;
        let mut region = None;
        let mut access_key_id = None;
        let mut secret_access_key = None;
        let mut force_path_style = false;

        for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                StoreError::InvalidConnectionString(format!("segment '{}' is not Key=Value", redact(segment)))
            })?;
            let value = value.trim();
            if value.is_empty() {
                return Err(StoreError::InvalidConnectionString(format!(
                    "empty value for '{}'",
                    key.trim()
                )));
            }

            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.to_string()),
                "region" => region = Some(value.to_string()),
                "accesskeyid" => access_key_id = Some(value.to_string()),
                "secretaccesskey" => secret_access_key = Some(value.to_string()),
                "forcepathstyle" => {
                    force_path_style = value.parse().map_err(|_| {
                        StoreError::InvalidConnectionString(format!(
                            "ForcePathStyle must be true or false, got '{value}'"
                        ))
                    })?
                }
                other => {
                    return Err(StoreError::InvalidConnectionString(format!(
                        "unknown key '{other}'"
                    )));
                }
            }
        }

        let credentials = match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            _ => {
                return Err(StoreError::InvalidConnectionString(
                    "AccessKeyId and SecretAccessKey must be given together".to_string(),
                ));
            }
        };

        Ok(Self {
            endpoint,
            region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            credentials,
            force_path_style,
        })
    }
}

// Never print the secret key, not even in debug logs.
impl fmt::Debug for StorageConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConnection")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field(
                "access_key_id",
                &self.credentials.as_ref().map(|c| c.access_key_id.as_str()),
            )
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

fn redact(segment: &str) -> String {
    segment.chars().take(12).collect::<String>() + "..."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_connection_string() {
        let conn = StorageConnection::parse(
            "Endpoint=http://localhost:9000;Region=eu-north-1;AccessKeyId=AKID;SecretAccessKey=s3cr3t;ForcePathStyle=true;",
        )
        .unwrap();

        assert_eq!(conn.endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(conn.region, "eu-north-1");
        assert!(conn.force_path_style);
        let creds = conn.credentials.unwrap();
        assert_eq!(creds.access_key_id, "AKID");
        assert_eq!(creds.secret_access_key, "s3cr3t");
    }

    #[test]
    fn test_parse_keys_are_case_insensitive_and_defaults_apply() {
        let conn = StorageConnection::parse("endpoint=https://s3.example.com").unwrap();
        assert_eq!(conn.endpoint.as_deref(), Some("https://s3.example.com"));
        assert_eq!(conn.region, DEFAULT_REGION);
        assert!(conn.credentials.is_none());
        assert!(!conn.force_path_style);
    }

    #[test]
    fn test_parse_empty_string_uses_ambient_settings() {
        let conn = StorageConnection::parse("").unwrap();
        assert!(conn.endpoint.is_none());
        assert!(conn.credentials.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_key() {
        let err = StorageConnection::parse("AccountName=foo").unwrap_err();
        assert!(err.to_string().contains("unknown key 'accountname'"));
    }

    #[test]
    fn test_parse_rejects_half_credentials() {
        let err = StorageConnection::parse("AccessKeyId=AKID").unwrap_err();
        assert!(matches!(err, StoreError::InvalidConnectionString(_)));
    }

    #[test]
    fn test_parse_rejects_segment_without_equals() {
        assert!(StorageConnection::parse("Region").is_err());
        assert!(StorageConnection::parse("ForcePathStyle=yes").is_err());
    }

    #[test]
    fn test_debug_hides_secret_key() {
        let conn = StorageConnection::parse("AccessKeyId=AKID;SecretAccessKey=s3cr3t").unwrap();
        let printed = format!("{conn:?}");
        assert!(printed.contains("AKID"));
        assert!(!printed.contains("s3cr3t"));
    }
}

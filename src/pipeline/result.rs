//! Per-source outcomes and the aggregate result of one run.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::SourceError;

/// Outcome for a single source.
#[derive(Debug)]
pub enum SourceOutcome {
    Uploaded { object_name: String },
    Failed(SourceError),
}

impl SourceOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, SourceOutcome::Uploaded { .. })
    }

    pub fn object_name(&self) -> Option<&str> {
        match self {
            SourceOutcome::Uploaded { object_name } => Some(object_name),
            SourceOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SourceError> {
        match self {
            SourceOutcome::Uploaded { .. } => None,
            SourceOutcome::Failed(err) => Some(err),
        }
    }
}

impl From<Result<String, SourceError>> for SourceOutcome {
    fn from(result: Result<String, SourceError>) -> Self {
        match result {
            Ok(object_name) => SourceOutcome::Uploaded { object_name },
            Err(err) => SourceOutcome::Failed(err),
        }
    }
}

impl Serialize for SourceOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            SourceOutcome::Uploaded { object_name } => {
                map.serialize_entry("status", "ok")?;
                map.serialize_entry("objectName", object_name)?;
            }
            SourceOutcome::Failed(err) => {
                map.serialize_entry("status", "error")?;
                map.serialize_entry("message", &err.to_string())?;
            }
        }
        map.end()
    }
}

/// Outcomes of one run in registry order. Serializes as a flat JSON object
/// keyed by source name.
#[derive(Debug, Default)]
pub struct RunResult {
    entries: Vec<(String, SourceOutcome)>,
}

impl RunResult {
    pub(crate) fn push(&mut self, source: String, outcome: SourceOutcome) {
        self.entries.push((source, outcome));
    }

    pub fn get(&self, source: &str) -> Option<&SourceOutcome> {
        self.entries
            .iter()
            .find(|(name, _)| name == source)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceOutcome)> {
        self.entries.iter().map(|(name, outcome)| (name.as_str(), outcome))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ok_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_ok()).count()
    }

    pub fn error_count(&self) -> usize {
        self.len() - self.ok_count()
    }

    /// Compact JSON with non-ASCII characters left as is.
    pub fn to_json(&self) -> String {
        // Keys are strings and values serialize infallibly.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for RunResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, outcome) in &self.entries {
            map.serialize_entry(name, outcome)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, StoreError};

    #[test]
    fn test_run_result_serializes_in_order() {
        let mut result = RunResult::default();
        result.push(
            "products".to_string(),
            SourceOutcome::Uploaded {
                object_name: "products_2025-06-01_101500.json".to_string(),
            },
        );
        result.push(
            "carts".to_string(),
            SourceOutcome::Failed(SourceError::Fetch(FetchError::Status {
                url: "https://dummyjson.com/carts".to_string(),
                status: reqwest::StatusCode::BAD_GATEWAY,
            })),
        );

        assert_eq!(
            result.to_json(),
            r#"{"products":{"status":"ok","objectName":"products_2025-06-01_101500.json"},"carts":{"status":"error","message":"https://dummyjson.com/carts responded with status 502 Bad Gateway"}}"#
        );
        assert_eq!(result.ok_count(), 1);
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn test_outcome_accessors() {
        let failed = SourceOutcome::from(Err::<String, _>(SourceError::Upload(
            StoreError::Upload {
                container: "raw".to_string(),
                name: "users_x.json".to_string(),
                message: "denied".to_string(),
            },
        )));
        assert!(!failed.is_ok());
        assert!(failed.object_name().is_none());
        assert_eq!(failed.error().unwrap().kind(), "upload");

        let ok = SourceOutcome::from(Ok::<_, SourceError>("users_x.json".to_string()));
        assert_eq!(ok.object_name(), Some("users_x.json"));
    }

    #[test]
    fn test_non_ascii_message_is_not_escaped() {
        let mut result = RunResult::default();
        result.push(
            "brukere".to_string(),
            SourceOutcome::Failed(SourceError::Upload(StoreError::Upload {
                container: "raw".to_string(),
                name: "brukere.json".to_string(),
                message: "nektet tilgang – ugyldig nøkkel".to_string(),
            })),
        );
        assert!(result.to_json().contains("nektet tilgang – ugyldig nøkkel"));
    }
}

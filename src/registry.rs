//! Endpoint registry: the ordered set of sources fetched on every run.

use serde_json::{Map, Value};

use crate::error::ConfigError;

const DEFAULT_ENDPOINTS: &[(&str, &str)] = &[
    ("products", "https://dummyjson.com/products"),
    ("carts", "https://dummyjson.com/carts"),
    ("users", "https://dummyjson.com/users"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
}

/// Ordered mapping of source name to URL. Immutable once built.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    entries: Vec<Endpoint>,
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENDPOINTS
                .iter()
                .map(|(name, url)| Endpoint {
                    name: name.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        }
    }
}

impl EndpointRegistry {
    /// Builds a registry from `(name, url)` pairs, validating each entry.
    pub fn new<I, N, U>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (N, U)>,
        N: Into<String>,
        U: Into<String>,
    {
        let mut entries: Vec<Endpoint> = Vec::new();
        for (name, url) in pairs {
            let endpoint = Endpoint {
                name: name.into(),
                url: url.into(),
            };
            validate(&endpoint)?;
            if entries.iter().any(|e| e.name == endpoint.name) {
                return Err(ConfigError::Registry(format!(
                    "duplicate source '{}'",
                    endpoint.name
                )));
            }
            entries.push(endpoint);
        }

        if entries.is_empty() {
            return Err(ConfigError::Registry("no endpoints configured".to_string()));
        }
        Ok(Self { entries })
    }

    /// Loads the registry from a JSON file holding one object of `name: url`
    /// pairs. File order becomes registry order.
    ///
    /// ```json
    /// {
    ///   "products": "https://dummyjson.com/products",
    ///   "carts": "https://dummyjson.com/carts"
    /// }
    /// ```
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::EndpointsIo {
            path: path.to_string(),
            source,
        })?;
        let raw: Map<String, Value> =
            serde_json::from_str(&content).map_err(|source| ConfigError::EndpointsParse {
                path: path.to_string(),
                source,
            })?;

        let mut pairs = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            match value {
                Value::String(url) => pairs.push((name, url)),
                other => {
                    return Err(ConfigError::Registry(format!(
                        "url for '{name}' must be a string, got {other}"
                    )));
                }
            }
        }
        Self::new(pairs)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate(endpoint: &Endpoint) -> Result<(), ConfigError> {
    let name = &endpoint.name;
    if name.is_empty() || name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(ConfigError::Registry(format!("invalid source name '{name}'")));
    }

    let url = reqwest::Url::parse(&endpoint.url)
        .map_err(|e| ConfigError::Registry(format!("invalid url for '{name}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Registry(format!(
            "url for '{name}' must use http or https"
        )));
    }
    Ok(())
}

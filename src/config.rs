//! Configuration types for the SOAP service.

use crate::xml::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

/// Main configuration for the SOAP service binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Config version
    pub version: String,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Web service settings
    pub service: ServiceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            server: ServerConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Web service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name, used for the WSDL definitions, portType and service
    pub name: String,

    /// Mount path for the WSDL and operation routes
    pub prefix: String,

    /// Free text placed in `wsdl:documentation`
    pub documentation: String,

    /// How schema validation failures reach the client
    pub validation_faults: ValidationFaultPolicy,

    /// Maximum request body size (bytes)
    pub max_body_size: usize,

    /// Maximum element nesting depth in a request, Envelope included
    pub max_depth: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "Calculator".to_string(),
            prefix: "/Calculator".to_string(),
            documentation: String::new(),
            validation_faults: ValidationFaultPolicy::Raise,
            max_body_size: 1_048_576, // 1MB
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    pub fn with_validation_faults(mut self, policy: ValidationFaultPolicy) -> Self {
        self.validation_faults = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Prefix with a leading slash and no trailing slash; empty for the root.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

/// Delivery of schema validation faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationFaultPolicy {
    /// Fail the request through the route boundary (HTTP 500)
    #[default]
    Raise,
    /// Answer with the client fault directly (HTTP 200)
    Inline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.listen, "127.0.0.1:8000");
        assert_eq!(config.service.validation_faults, ValidationFaultPolicy::Raise);
        assert_eq!(config.service.max_body_size, 1_048_576);
        assert_eq!(config.service.max_depth, 64);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.service.name, config.service.name);
        assert_eq!(parsed.service.validation_faults, config.service.validation_faults);
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
version: "1"
server:
  listen: "0.0.0.0:9000"
service:
  name: Bank
  prefix: /bank/
  documentation: Account operations
  validation_faults: inline
  max_depth: 12
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert_eq!(config.service.name, "Bank");
        assert_eq!(config.service.normalized_prefix(), "/bank");
        assert_eq!(config.service.documentation, "Account operations");
        assert_eq!(config.service.validation_faults, ValidationFaultPolicy::Inline);
        assert_eq!(config.service.max_body_size, 1_048_576);
        assert_eq!(config.service.max_depth, 12);
    }

    #[test]
    fn test_normalized_prefix() {
        assert_eq!(ServiceConfig::new("S", "Calculator").normalized_prefix(), "/Calculator");
        assert_eq!(ServiceConfig::new("S", "/a/b/").normalized_prefix(), "/a/b");
        assert_eq!(ServiceConfig::new("S", "/").normalized_prefix(), "");
        assert_eq!(ServiceConfig::new("S", "").normalized_prefix(), "");
    }
}

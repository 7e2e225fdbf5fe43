//! Operation registry.

use crate::config::ServiceConfig;
use crate::schema::{SchemaDescriptor, XmlSchema};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::info;

/// One named operation and the schemas of its messages.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub name: String,
    pub request: Option<SchemaDescriptor>,
    pub response: Option<SchemaDescriptor>,
}

impl OperationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request: None,
            response: None,
        }
    }

    pub fn request<T: XmlSchema>(mut self) -> Self {
        self.request = Some(T::descriptor());
        self
    }

    pub fn response<T: XmlSchema>(mut self) -> Self {
        self.response = Some(T::descriptor());
        self
    }
}

/// Snapshot of a service for reflection.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub prefix: String,
    pub documentation: String,
    pub operations: Vec<OperationRecord>,
}

/// Name-keyed operation records, kept in registration order.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: RwLock<IndexMap<String, OperationRecord>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation, returning the record it replaced.
    pub fn register(&self, record: OperationRecord) -> Option<OperationRecord> {
        info!(
            operation = %record.name,
            request = ?record.request.as_ref().map(|d| d.tag),
            response = ?record.response.as_ref().map(|d| d.tag),
            "Registering SOAP operation"
        );
        self.operations.write().insert(record.name.clone(), record)
    }

    pub fn get(&self, name: &str) -> Option<OperationRecord> {
        self.operations.read().get(name).cloned()
    }

    pub fn list(&self) -> Vec<OperationRecord> {
        self.operations.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.operations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.read().is_empty()
    }

    pub fn describe(&self, config: &ServiceConfig) -> ServiceDescriptor {
        ServiceDescriptor {
            name: config.name.clone(),
            prefix: config.normalized_prefix(),
            documentation: config.documentation.clone(),
            operations: self.list(),
        }
    }
}

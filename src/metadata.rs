//! Pre-built entity mapping tables.
//!
//! Each entity describes how its logical (class-shaped) field names map to
//! the attribute names the database stores. Tables are immutable once
//! registered, so resolvers may cache lookups against them forever.
//!
//! Registries can be loaded from JSON:
//!
//! ```json
//! [
//!   {
//!     "name": "person",
//!     "class_name": "Person",
//!     "fields": [
//!       { "field_name": "name", "name": "native_name" },
//!       { "field_name": "address", "name": "address", "kind": "embedded" }
//!     ]
//!   }
//! ]
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Default,
    /// Fields of the nested type are flattened into the parent
    Embedded,
    /// Nested entity stored as a sub-document
    Entity,
    Collection,
    Map,
    Array,
}

/// Mapping of one logical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Logical name, as written in queries
    pub field_name: String,
    /// Native attribute name
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldMetadata {
    pub fn new(field_name: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        FieldMetadata {
            field_name: field_name.into(),
            name: name.into(),
            kind,
        }
    }

    pub fn is_embeddable(&self) -> bool {
        matches!(self.kind, FieldKind::Embedded | FieldKind::Entity)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct EntityDefinition {
    name: String,
    #[serde(default)]
    class_name: Option<String>,
    #[serde(default)]
    fields: Vec<FieldMetadata>,
}

/// Mapping table of one entity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "EntityDefinition")]
pub struct EntityMetadata {
    name: String,
    class_name: String,
    fields: Vec<FieldMetadata>,
    by_field: HashMap<String, usize>,
}

impl From<EntityDefinition> for EntityMetadata {
    fn from(definition: EntityDefinition) -> Self {
        let class_name = definition
            .class_name
            .unwrap_or_else(|| definition.name.clone());
        let mut metadata = EntityMetadata {
            name: definition.name,
            class_name,
            fields: vec![],
            by_field: HashMap::new(),
        };
        for field in definition.fields {
            metadata.push(field);
        }
        metadata
    }
}

impl EntityMetadata {
    pub fn builder(class_name: impl Into<String>) -> EntityMetadataBuilder {
        let class_name = class_name.into();
        EntityMetadataBuilder {
            definition: EntityDefinition {
                name: class_name.clone(),
                class_name: Some(class_name),
                fields: vec![],
            },
        }
    }

    fn push(&mut self, field: FieldMetadata) {
        self.by_field
            .insert(field.field_name.clone(), self.fields.len());
        self.fields.push(field);
    }

    /// Native entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical entity name, as written in queries.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    /// Direct mapping of a logical field name.
    pub fn field_mapping(&self, field_name: &str) -> Option<&FieldMetadata> {
        self.by_field.get(field_name).map(|&i| &self.fields[i])
    }

    /// Native name of a logical field, or the name itself when unmapped.
    pub fn column_field(&self, field_name: &str) -> String {
        self.field_mapping(field_name)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| field_name.to_string())
    }
}

pub struct EntityMetadataBuilder {
    definition: EntityDefinition,
}

impl EntityMetadataBuilder {
    /// Native entity name; defaults to the class name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.definition.name = name.into();
        self
    }

    pub fn field(mut self, field_name: &str, name: &str) -> Self {
        self.definition
            .fields
            .push(FieldMetadata::new(field_name, name, FieldKind::Default));
        self
    }

    pub fn embedded(mut self, field_name: &str, name: &str) -> Self {
        self.definition
            .fields
            .push(FieldMetadata::new(field_name, name, FieldKind::Embedded));
        self
    }

    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.definition.fields.push(field);
        self
    }

    pub fn build(self) -> EntityMetadata {
        EntityMetadata::from(self.definition)
    }
}

/// Registered entities, looked up by logical or native name.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: HashMap<String, Arc<EntityMetadata>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON array of entity definitions.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entities: Vec<EntityMetadata> = serde_json::from_str(json)?;
        let mut registry = EntityRegistry::new();
        for entity in entities {
            registry.register(entity);
        }
        Ok(registry)
    }

    pub fn register(&mut self, metadata: EntityMetadata) -> Arc<EntityMetadata> {
        let metadata = Arc::new(metadata);
        self.entities
            .insert(metadata.class_name().to_string(), Arc::clone(&metadata));
        metadata
    }

    pub fn get(&self, name: &str) -> Option<Arc<EntityMetadata>> {
        self.entities.get(name).cloned().or_else(|| {
            self.entities
                .values()
                .find(|m| m.name() == name)
                .cloned()
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_mappings() {
        let metadata = EntityMetadata::builder("Person")
            .name("person")
            .field("userName", "user_name")
            .embedded("address", "address")
            .build();

        assert_eq!(metadata.name(), "person");
        assert_eq!(metadata.class_name(), "Person");
        assert_eq!(metadata.column_field("userName"), "user_name");
        assert_eq!(metadata.column_field("unknown"), "unknown");
        assert!(metadata.field_mapping("address").unwrap().is_embeddable());
    }

    #[test]
    fn test_registry_from_json() {
        let registry = EntityRegistry::from_json(
            r#"[{"name": "person", "class_name": "Person",
                 "fields": [{"field_name": "id", "name": "_id"},
                            {"field_name": "address", "name": "addr", "kind": "embedded"}]}]"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 1);
        let person = registry.get("Person").unwrap();
        assert_eq!(person.column_field("id"), "_id");
        assert_eq!(person.field_mapping("address").unwrap().kind, FieldKind::Embedded);
        assert!(registry.get("person").is_some());
        assert!(registry.get("Animal").is_none());
    }
}

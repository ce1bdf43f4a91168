//! Translation of logical field paths into native attribute paths.
//!
//! A [`FieldResolver`] answers for one entity. Lookups first try a direct
//! mapping; otherwise the name is split on camelCase boundaries and growing
//! prefixes are tried as embedded fields, so `addressCity` becomes
//! `address.city` when `address` is a mapped field. Anything unmatched
//! passes through unchanged: resolution never fails.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::metadata::{EntityMetadata, EntityRegistry};

/// Maps entity and field names for the executor.
pub trait ObserverParser: Send + Sync {
    /// Native name of an entity.
    fn entity(&self, name: &str) -> String;

    /// Native path of a field of `entity` (the logical entity name).
    fn field(&self, entity: &str, field: &str) -> String;
}

/// Leaves every name as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityObserver;

impl ObserverParser for IdentityObserver {
    fn entity(&self, name: &str) -> String {
        name.to_string()
    }

    fn field(&self, _entity: &str, field: &str) -> String {
        field.to_string()
    }
}

/// Splits on lower→Upper and Upper→Upper-lower boundaries.
///
/// `userName` → `[user, Name]`, `ID` → `[ID]`,
/// `addressZIPCode` → `[address, ZIP, Code]`.
pub fn split_camel_case(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = vec![];
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 && !current.is_empty() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let lower_to_upper = prev.is_ascii_lowercase() && ch.is_ascii_uppercase();
            let acronym_end = prev.is_ascii_uppercase()
                && ch.is_ascii_uppercase()
                && next.is_some_and(|c| c.is_ascii_lowercase());
            if lower_to_upper || acronym_end {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Changes the case of the first char only.
fn capitalize(text: &str, upper: bool) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Field resolution for one entity, with a lazily filled cache.
#[derive(Debug)]
pub struct FieldResolver {
    metadata: Arc<EntityMetadata>,
    cache: DashMap<String, String>,
}

impl FieldResolver {
    pub fn new(metadata: Arc<EntityMetadata>) -> Self {
        FieldResolver {
            metadata,
            cache: DashMap::new(),
        }
    }

    /// Native name of the entity.
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    /// Native path of a logical field; the input itself when nothing maps.
    pub fn field(&self, logical: &str) -> String {
        if let Some(hit) = self.cache.get(logical) {
            return hit.value().clone();
        }

        // Concurrent misses may compute the same entry twice; both results are equal.
        let native = self.resolve(logical);
        trace!(entity = self.name(), logical, native = %native, "resolved field");
        self.cache.insert(logical.to_string(), native.clone());
        native
    }

    fn resolve(&self, logical: &str) -> String {
        if self.metadata.field_mapping(logical).is_some() {
            return self.metadata.column_field(logical);
        }

        let parts = split_camel_case(logical);
        let mut current = String::new();

        for (index, part) in parts.iter().enumerate() {
            let segment = capitalize(part, !current.is_empty());
            current.push_str(&segment);

            if let Some(mapped) = self.metadata.field_mapping(&current) {
                return format!("{}{}", mapped.name, Self::nested_path(index, &parts));
            }
        }

        logical.to_string()
    }

    /// `.` + next segment with its first char lower-cased + the remaining
    /// segments verbatim. Empty when the match consumed every segment.
    fn nested_path(index: usize, parts: &[String]) -> String {
        let Some(next) = parts.get(index + 1) else {
            return String::new();
        };
        let mut path = String::from(".");
        path.push_str(&capitalize(next, false));
        for rest in &parts[index + 2..] {
            path.push_str(rest);
        }
        path
    }

    /// Number of cached lookups.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl ObserverParser for FieldResolver {
    fn entity(&self, name: &str) -> String {
        if name == self.metadata.class_name() {
            self.metadata.name().to_string()
        } else {
            name.to_string()
        }
    }

    fn field(&self, entity: &str, field: &str) -> String {
        if entity == self.metadata.class_name() || entity == self.metadata.name() {
            FieldResolver::field(self, field)
        } else {
            field.to_string()
        }
    }
}

/// Resolves names through an [`EntityRegistry`], one cached
/// [`FieldResolver`] per entity. Unregistered entities pass through.
#[derive(Debug)]
pub struct MetadataObserver {
    registry: Arc<EntityRegistry>,
    resolvers: DashMap<String, Arc<FieldResolver>>,
}

impl MetadataObserver {
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        MetadataObserver {
            registry,
            resolvers: DashMap::new(),
        }
    }

    pub fn resolver(&self, entity: &str) -> Option<Arc<FieldResolver>> {
        if let Some(hit) = self.resolvers.get(entity) {
            return Some(Arc::clone(hit.value()));
        }

        let metadata = self.registry.get(entity)?;
        let resolver = self
            .resolvers
            .entry(entity.to_string())
            .or_insert_with(|| Arc::new(FieldResolver::new(metadata)));
        Some(Arc::clone(resolver.value()))
    }
}

impl ObserverParser for MetadataObserver {
    fn entity(&self, name: &str) -> String {
        match self.registry.get(name) {
            Some(metadata) => metadata.name().to_string(),
            None => name.to_string(),
        }
    }

    fn field(&self, entity: &str, field: &str) -> String {
        match self.resolver(entity) {
            Some(resolver) => resolver.field(field),
            None => field.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_camel_case() {
        let cases = vec![
            ("userName", vec!["user", "Name"]),
            ("ID", vec!["ID"]),
            ("name", vec!["name"]),
            ("addressZIPCode", vec!["address", "ZIP", "Code"]),
            ("address2City", vec!["address2City"]),
            ("", vec![]),
        ];

        for (input, expected) in cases {
            assert_eq!(split_camel_case(input), expected, "Failed for input: {}", input);
        }
    }

    #[test]
    fn test_capitalize_only_touches_first_char() {
        assert_eq!(capitalize("zipCode", true), "ZipCode");
        assert_eq!(capitalize("ZIP", false), "zIP");
        assert_eq!(capitalize("", true), "");
    }

    #[test]
    fn test_cache_fills_on_miss() {
        let metadata = EntityMetadata::builder("Person").field("name", "_name").build();
        let resolver = FieldResolver::new(Arc::new(metadata));

        assert_eq!(resolver.cached(), 0);
        assert_eq!(resolver.field("name"), "_name");
        assert_eq!(resolver.field("name"), "_name");
        assert_eq!(resolver.cached(), 1);
    }
}

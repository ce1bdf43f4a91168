// tests/observer_tests.rs

use std::sync::Arc;

use artemis_query::metadata::FieldMetadata;
use artemis_query::observer::split_camel_case;
use artemis_query::{
    EntityMetadata, EntityRegistry, FieldKind, FieldResolver, IdentityObserver, MetadataObserver,
    ObserverParser,
};
use pretty_assertions::assert_eq;

fn person() -> EntityMetadata {
    EntityMetadata::builder("Person")
        .name("person")
        .field("id", "_id")
        .field("userName", "user_name")
        .embedded("address", "addr")
        .embedded("homeAddress", "home")
        .with_field(FieldMetadata::new("phones", "phones", FieldKind::Collection))
        .build()
}

fn resolver() -> FieldResolver {
    FieldResolver::new(Arc::new(person()))
}

// ============================================================================
// Segmentation
// ============================================================================

#[test]
fn test_split_camel_case() {
    let test_cases = vec![
        ("userName", vec!["user", "Name"]),
        ("ID", vec!["ID"]),
        ("addressZIPCode", vec!["address", "ZIP", "Code"]),
        ("homeAddressCity", vec!["home", "Address", "City"]),
        ("URLValue", vec!["URL", "Value"]),
        ("a", vec!["a"]),
    ];

    for (input, expected) in test_cases {
        assert_eq!(split_camel_case(input), expected, "Failed for input: {}", input);
    }
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_direct_mapping_wins() {
    let resolver = resolver();
    assert_eq!(resolver.name(), "person");
    assert_eq!(resolver.field("id"), "_id");
    assert_eq!(resolver.field("userName"), "user_name");
    assert_eq!(resolver.field("address"), "addr");
}

#[test]
fn test_embedded_paths() {
    let test_cases = vec![
        ("addressCity", "addr.city"),
        ("addressZipCode", "addr.zipCode"),
        ("addressZIPCode", "addr.zIPCode"),
        ("homeAddressCity", "home.city"),
        ("homeAddressStreetName", "home.streetName"),
    ];

    let resolver = resolver();
    for (input, expected) in test_cases {
        assert_eq!(resolver.field(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_first_matching_prefix_is_used() {
    let metadata = EntityMetadata::builder("Person")
        .embedded("home", "h")
        .embedded("homeAddress", "home_address")
        .build();
    let resolver = FieldResolver::new(Arc::new(metadata));

    assert_eq!(resolver.field("homeAddressCity"), "h.addressCity");
}

#[test]
fn test_unmatched_names_pass_through() {
    let resolver = resolver();
    for input in ["age", "cityOfBirth", "ID", "", "address.city"] {
        assert_eq!(resolver.field(input), input, "Failed for input: {}", input);
    }
}

#[test]
fn test_results_are_cached() {
    let resolver = resolver();
    resolver.field("addressCity");
    resolver.field("addressCity");
    resolver.field("age");
    assert_eq!(resolver.cached(), 2);
}

#[test]
fn test_concurrent_resolution_agrees() {
    let resolver = Arc::new(resolver());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            std::thread::spawn(move || resolver.field("homeAddressStreetName"))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "home.streetName");
    }
    assert_eq!(resolver.cached(), 1);
}

// ============================================================================
// Observers
// ============================================================================

#[test]
fn test_identity_observer() {
    assert_eq!(IdentityObserver.entity("Person"), "Person");
    assert_eq!(IdentityObserver.field("Person", "addressCity"), "addressCity");
}

#[test]
fn test_resolver_as_observer() {
    let resolver = resolver();
    assert_eq!(ObserverParser::entity(&resolver, "Person"), "person");
    assert_eq!(ObserverParser::field(&resolver, "Person", "addressCity"), "addr.city");
    assert_eq!(ObserverParser::field(&resolver, "Animal", "addressCity"), "addressCity");
}

#[test]
fn test_metadata_observer() {
    let mut registry = EntityRegistry::new();
    registry.register(person());
    let observer = MetadataObserver::new(Arc::new(registry));

    assert_eq!(observer.entity("Person"), "person");
    assert_eq!(observer.entity("Animal"), "Animal");
    assert_eq!(observer.field("Person", "userName"), "user_name");
    assert_eq!(observer.field("person", "addressCity"), "addr.city");
    assert_eq!(observer.field("Animal", "userName"), "userName");

    let first = observer.resolver("Person").unwrap();
    let second = observer.resolver("Person").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_registry_loaded_from_json() {
    let registry = EntityRegistry::from_json(
        r#"[{"name": "person", "class_name": "Person",
             "fields": [{"field_name": "address", "name": "addr", "kind": "embedded"}]}]"#,
    )
    .unwrap();
    let observer = MetadataObserver::new(Arc::new(registry));
    assert_eq!(observer.field("Person", "addressCity"), "addr.city");
}

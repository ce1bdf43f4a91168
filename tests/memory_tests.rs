// tests/memory_tests.rs

use std::sync::Arc;

use artemis_query::{
    DatabaseFamily, Entity, IdentityObserver, InMemoryManager, ObserverParser, QueryParser, Value,
};
use pretty_assertions::assert_eq;

fn people() -> InMemoryManager {
    let manager = InMemoryManager::new();
    let rows = [
        ("Ada", 36, "London", true),
        ("Bob", 20, "Paris", false),
        ("Cy", 50, "London", true),
        ("Dora", 41, "Lisbon", false),
    ];
    for (name, age, city, active) in rows {
        manager.add(
            Entity::new("Person")
                .with("name", name)
                .with("age", age as i64)
                .with("address.city", city)
                .with("active", active),
        );
    }
    manager
}

fn names(manager: &InMemoryManager, text: &str) -> Vec<String> {
    QueryParser::new(DatabaseFamily::Document)
        .query(text, manager, &IdentityObserver)
        .unwrap()
        .iter()
        .filter_map(|e| e.get("name").and_then(Value::as_str).map(str::to_string))
        .collect()
}

// ============================================================================
// Select
// ============================================================================

#[test]
fn test_conditions() {
    let manager = people();
    let test_cases = vec![
        ("age > 40", vec!["Cy", "Dora"]),
        ("age >= 41", vec!["Cy", "Dora"]),
        ("age = 36.0", vec!["Ada"]),
        ("name like \"_o%\"", vec!["Bob", "Dora"]),
        ("address.city = \"London\"", vec!["Ada", "Cy"]),
        ("name in (\"Ada\", \"Bob\")", vec!["Ada", "Bob"]),
        ("age between 20 and 36", vec!["Ada", "Bob"]),
        ("not active = true", vec!["Bob", "Dora"]),
        ("active = true and age < 40 or name = \"Bob\"", vec!["Ada", "Bob"]),
        ("active = true and (age < 40 or name = \"Bob\")", vec!["Ada"]),
        ("age > convert(\"45\", java.lang.Integer)", vec!["Cy"]),
        ("missing = null", vec!["Ada", "Bob", "Cy", "Dora"]),
    ];

    for (condition, expected) in test_cases {
        let text = format!("select * from Person where {} order by name", condition);
        assert_eq!(names(&manager, &text), expected, "Failed for condition: {}", condition);
    }
}

#[test]
fn test_order_skip_limit() {
    let manager = people();
    assert_eq!(
        names(&manager, "select * from Person order by age desc skip 1 limit 2"),
        vec!["Dora", "Ada"]
    );
    assert_eq!(
        names(&manager, "select * from Person order by address.city, name desc"),
        vec!["Dora", "Cy", "Ada", "Bob"]
    );
}

#[test]
fn test_projection() {
    let manager = people();
    let result = QueryParser::new(DatabaseFamily::Document)
        .query(
            "select name, address.city from Person where name = \"Ada\"",
            &manager,
            &IdentityObserver,
        )
        .unwrap();
    assert_eq!(
        result,
        vec![Entity::new("Person").with("name", "Ada").with("address.city", "London")]
    );
}

#[test]
fn test_unknown_collection_is_empty() {
    assert_eq!(names(&people(), "select * from Animal"), Vec::<String>::new());
}

// ============================================================================
// Update and Insert
// ============================================================================

#[test]
fn test_update_then_select() {
    let manager = people();
    let parser = QueryParser::new(DatabaseFamily::Column);

    let updated = parser
        .query(
            "update Person set active = false, address.zip = \"E1\" where address.city = \"London\"",
            &manager,
            &IdentityObserver,
        )
        .unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0].get("address.zip"), Some(&Value::from("E1")));
    assert_eq!(updated[0].get("address.city"), Some(&Value::from("London")));

    assert_eq!(
        names(&manager, "select * from Person where active = true"),
        Vec::<String>::new()
    );
}

#[test]
fn test_insert_then_select() {
    let manager = InMemoryManager::new();
    let parser = QueryParser::new(DatabaseFamily::Document);

    let inserted = parser
        .query(
            "insert Person (name = \"Eve\", age = 29, address.city = \"Rome\")",
            &manager,
            &IdentityObserver,
        )
        .unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(manager.entities("Person"), inserted);
    assert_eq!(
        names(&manager, "select * from Person where address.city = \"Rome\""),
        vec!["Eve"]
    );
}

// ============================================================================
// Key-Value
// ============================================================================

#[test]
fn test_prepared_get_and_delete() {
    let manager = Arc::new(InMemoryManager::new());
    manager.put("Diana", Entity::new("Diana").with("relation", "Sister"));
    manager.put(10, Entity::new("Ten"));

    let parser = QueryParser::new(DatabaseFamily::KeyValue);
    let observer: Arc<dyn ObserverParser> = Arc::new(IdentityObserver);

    let mut get = parser
        .prepare("get @key", Arc::clone(&manager), Arc::clone(&observer))
        .unwrap();
    get.bind("key", "Diana").unwrap();
    assert_eq!(
        get.single_result().unwrap().and_then(|e| e.get("relation").cloned()),
        Some(Value::from("Sister"))
    );
    get.bind("key", 10.0).unwrap();
    assert_eq!(get.result_list().unwrap().len(), 1);

    let mut delete = parser
        .prepare("delete @key", Arc::clone(&manager), observer)
        .unwrap();
    delete.bind("key", "Diana").unwrap();
    assert_eq!(delete.result_list().unwrap(), vec![]);
    assert_eq!(manager.bucket_len(), 1);

    get.bind("key", "Diana").unwrap();
    assert_eq!(get.single_result().unwrap(), None);
}

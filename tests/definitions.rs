use admin_resource::config::{parse_definitions, validate};
use admin_resource::{build_registry, build_resource, load_from_path, AdminError, ConfigError, FormPostEntry, PageElement};
use serde_json::json;
use std::path::PathBuf;

const USERS: &str = r#"
{
    "table": "users",
    "per_page": 50,
    "columns": [
        { "name": "id", "type": "integer", "key": true },
        { "name": "email", "type": "string" },
        { "name": "role", "type": "string" },
        { "name": "active", "type": "boolean" },
        { "name": "born_on", "type": "date" },
        { "name": "created_at", "type": "datetime" }
    ],
    "index": [
        "id",
        "email",
        { "column": "active", "display": { "kind": "yes_no" } },
        { "column": "created_at", "display": { "kind": "date_format", "format": "%d %b %Y" } }
    ],
    "form": [
        { "paragraph": "Account settings" },
        { "group": {
            "header": "Account",
            "inputs": [
                { "column": "email", "transform": { "kind": "lowercase" } },
                { "select": "role", "options": [["admin", "Administrator"], ["viewer", "Viewer"]] },
                "active",
                { "column": "born_on", "transform": { "kind": "date", "format": "%d/%m/%Y" } }
            ]
        } }
    ],
    "validation": {
        "email": { "required": true, "format": "email" },
        "role": { "allowed": ["admin", "viewer"] }
    }
}
"#;

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("admin-resource-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn definition_builds_a_resource() {
    let defs = parse_definitions(USERS).unwrap();
    let resource = build_resource(&defs[0], None).await.unwrap();

    assert_eq!(resource.per_page_count(), 50);
    assert_eq!(resource.index_columns(), ["id", "email", "active", "created_at"]);
    assert_eq!(resource.primary_keys(), ["id"]);
    let mut editable: Vec<_> = resource.editable_columns().into_iter().collect();
    editable.sort();
    assert_eq!(editable, ["active", "born_on", "email", "role"]);

    let created = resource.find_column_definition_by_name("created_at").unwrap();
    assert_eq!(created.display(&json!("2024-03-01T08:00:00")), "01 Mar 2024");

    let PageElement::FormInputGroup(group) = &resource.form_page()[1] else {
        panic!("expected a group");
    };
    let view = PageElement::FormInputGroup(group.clone()).view();
    assert_eq!(view["inputs"][1]["options"][0], json!({ "value": "admin", "label": "Administrator" }));

    let entry = FormPostEntry::new()
        .with_value("email", "Ann@Example.COM")
        .with_value("role", "viewer")
        .with_value("born_on", "05/06/1990");
    let row = admin_resource::process_submission(&resource, &entry).unwrap();
    assert_eq!(row["email"], json!("ann@example.com"));
    assert_eq!(row["born_on"], json!("1990-06-05"));
    assert_eq!(row["active"], json!(false));

    let bad = FormPostEntry::new().with_value("role", "root");
    let errors = admin_resource::process_submission(&resource, &bad).unwrap_err();
    let columns: Vec<_> = errors.iter().map(|e| e.column.as_str()).collect();
    assert_eq!(columns, ["email", "role"]);
}

#[tokio::test]
async fn unknown_form_column_fails_to_apply() {
    let defs = parse_definitions(
        r#"{ "table": "tags", "columns": [{ "name": "id", "type": "integer", "key": true }],
             "form": [{ "group": { "inputs": ["label"] } }] }"#,
    )
    .unwrap();
    let err = build_resource(&defs[0], None).await.unwrap_err();
    assert!(matches!(
        err,
        AdminError::Config(ConfigError::UnknownColumn { ref column, ref table }) if column == "label" && table == "tags"
    ));
}

#[tokio::test]
async fn missing_columns_without_data_source_is_an_error() {
    let defs = parse_definitions(r#"{ "table": "tags" }"#).unwrap();
    let err = build_resource(&defs[0], None).await.unwrap_err();
    assert!(matches!(err, AdminError::Config(ConfigError::Load(_))));
}

#[test]
fn validate_rejects_duplicates_and_bad_rules() {
    let defs = parse_definitions(r#"[{ "table": "a" }, { "table": "a" }]"#).unwrap();
    assert!(matches!(validate(&defs), Err(ConfigError::DuplicateResource(ref t)) if t == "a"));

    let defs = parse_definitions(
        r#"{ "table": "a", "columns": [{ "name": "x", "type": "text" }, { "name": "x", "type": "integer" }] }"#,
    )
    .unwrap();
    assert!(matches!(validate(&defs), Err(ConfigError::DuplicateColumn { .. })));

    let defs = parse_definitions(r#"{ "table": "a", "validation": { "x": { "pattern": "[" } } }"#).unwrap();
    assert!(matches!(validate(&defs), Err(ConfigError::InvalidRule { .. })));

    assert!(matches!(parse_definitions("{ \"nope\": 1 }"), Err(ConfigError::Load(_))));
}

#[tokio::test]
async fn loads_directory_in_name_order() {
    let dir = scratch_dir();
    std::fs::write(dir.join("b_users.json"), USERS).unwrap();
    std::fs::write(
        dir.join("a_tags.json"),
        r#"[{ "table": "tags", "columns": [{ "name": "id", "type": "integer", "key": true }], "index": ["id"] }]"#,
    )
    .unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let defs = load_from_path(&dir).await.unwrap();
    let tables: Vec<_> = defs.iter().map(|d| d.table.as_str()).collect();
    assert_eq!(tables, ["tags", "users"]);

    let registry = build_registry(&defs, |_| None).await.unwrap().freeze();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get("users").map(|r| r.per_page_count()), Some(50));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn load_reports_the_failing_file() {
    let dir = scratch_dir();
    std::fs::write(dir.join("broken.json"), "{").unwrap();
    let err = load_from_path(&dir).await.unwrap_err();
    assert!(err.to_string().contains("broken.json"), "{err}");
    std::fs::remove_dir_all(&dir).unwrap();
}

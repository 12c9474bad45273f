use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load a JSON schema from a file
pub fn load_schema(schema_path: &Path) -> JSONSchema {
    let schema_content = fs::read_to_string(schema_path)
        .unwrap_or_else(|_| panic!("Failed to read schema file: {}", schema_path.display()));

    let schema_json: Value = serde_json::from_str(&schema_content)
        .unwrap_or_else(|_| panic!("Failed to parse schema JSON: {}", schema_path.display()));

    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema_json)
        .expect("Failed to compile schema")
}

/// Validate a JSON value against a schema
pub fn validate_against_schema(data: &Value, schema: &JSONSchema) -> Result<(), Vec<String>> {
    match schema.validate(data) {
        Ok(_) => Ok(()),
        Err(errors) => Err(errors
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect()),
    }
}

/// Load schema from tests/schemas directory
pub fn load_test_schema(schema_name: &str) -> JSONSchema {
    let schema_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/schemas")
        .join(format!("{schema_name}.json"));
    load_schema(&schema_path)
}

/// Assert `data` matches the named schema, listing every violation
pub fn assert_matches_schema(data: &Value, schema_name: &str) {
    let schema = load_test_schema(schema_name);
    if let Err(errors) = validate_against_schema(data, &schema) {
        panic!(
            "response does not match {schema_name}:\n{}\n{data:#}",
            errors.join("\n")
        );
    }
}

//! Project manifest (`package.json`, `deno.json`) version field.

use super::ManifestError;
use serde_json::{Map, Value};

/// Reads the top-level `version` field.
///
/// # Errors
///
/// Returns [`ManifestError::Decode`] for invalid JSON and
/// [`ManifestError::InvalidProjectManifest`] when the document is not an
/// object.
pub fn project_version(content: &str, path: &str) -> Result<Option<String>, ManifestError> {
    let document = parse_object(content, path)?;
    Ok(document
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string))
}

/// Replaces the top-level `version` field, keeping every other key in its
/// original position. A missing field is appended.
///
/// # Errors
///
/// Same as [`project_version`], plus [`ManifestError::Encode`].
pub fn set_project_version(content: &str, path: &str, version: &str) -> Result<String, ManifestError> {
    let mut document = parse_object(content, path)?;
    document.insert("version".to_string(), Value::String(version.to_string()));

    let mut output = serde_json::to_string_pretty(&Value::Object(document)).map_err(|source| {
        ManifestError::Encode {
            path: path.to_string(),
            source,
        }
    })?;
    if content.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn parse_object(content: &str, path: &str) -> Result<Map<String, Value>, ManifestError> {
    let value: Value = serde_json::from_str(content).map_err(|source| ManifestError::Decode {
        path: path.to_string(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ManifestError::InvalidProjectManifest {
            path: path.to_string(),
            message: format!("expected a JSON object, found {}", kind(&other)),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE_JSON: &str = "{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\",\n  \"scripts\": {\n    \"test\": \"vitest\"\n  }\n}\n";

    #[test]
    fn reads_version() {
        assert_eq!(
            project_version(PACKAGE_JSON, "package.json").unwrap(),
            Some("1.0.0".to_string())
        );
        assert_eq!(project_version("{}", "deno.json").unwrap(), None);
    }

    #[test]
    fn replaces_version_in_place() {
        let updated = set_project_version(PACKAGE_JSON, "package.json", "1.1.0").unwrap();

        assert_eq!(updated, PACKAGE_JSON.replace("1.0.0", "1.1.0"));
    }

    #[test]
    fn appends_missing_version() {
        let updated = set_project_version("{\"name\":\"demo\"}", "deno.json", "0.1.0").unwrap();

        assert_eq!(updated, "{\n  \"name\": \"demo\",\n  \"version\": \"0.1.0\"\n}");
    }

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(
            project_version("[1, 2]", "package.json"),
            Err(ManifestError::InvalidProjectManifest { .. })
        ));
        assert!(matches!(
            set_project_version("{", "package.json", "1.0.0"),
            Err(ManifestError::Decode { .. })
        ));
    }
}

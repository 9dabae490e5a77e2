//! Load a [`ConfigElement`] tree from disk.
//!
//! The document format is picked from the file extension: `.toml` files are
//! parsed as TOML, everything else as JSON. Both encode the same shape:
//!
//! ```toml
//! name = "rv:robot_config"
//!
//! [[children]]
//! name = "rv:update_rate"
//! value = "8"
//! ```

use std::fs;
use std::path::Path;

use revolve_types::RevolveError;
use tracing::debug;

use crate::element::ConfigElement;

/// Parse a configuration tree from a JSON document.
pub fn from_json_str(raw: &str) -> Result<ConfigElement, RevolveError> {
    serde_json::from_str(raw)
        .map_err(|e| RevolveError::Serialization(format!("Failed to parse JSON config: {e}")))
}

/// Parse a configuration tree from a TOML document.
pub fn from_toml_str(raw: &str) -> Result<ConfigElement, RevolveError> {
    toml::from_str(raw)
        .map_err(|e| RevolveError::Serialization(format!("Failed to parse TOML config: {e}")))
}

/// Read and parse the configuration tree stored at `path`.
pub fn load_from(path: &Path) -> Result<ConfigElement, RevolveError> {
    let raw = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    debug!(path = %path.display(), toml = is_toml, "loading robot configuration");
    if is_toml {
        from_toml_str(&raw)
    } else {
        from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_DOC: &str = r#"
name = "rv:robot_config"

[[children]]
name = "rv:update_rate"
value = "8"

[[children]]
name = "rv:brain"

[[children.children]]
name = "rv:controller"
attributes = { type = "cpg" }

[[children.children]]
name = "rv:learner"
attributes = { type = "offline" }
"#;

    #[test]
    fn parses_toml_tree() {
        let root = from_toml_str(TOML_DOC).unwrap();
        assert_eq!(root.name(), "rv:robot_config");
        let brain = root.element("rv:brain").unwrap();
        assert_eq!(
            brain.element("rv:controller").unwrap().attribute_str("type").unwrap(),
            "cpg"
        );
    }

    #[test]
    fn parses_json_tree() {
        let raw = r#"{
            "name": "rv:robot_config",
            "children": [
                { "name": "rv:battery", "children": [ { "name": "rv:level", "value": "0.5" } ] }
            ]
        }"#;
        let root = from_json_str(raw).unwrap();
        let level: f64 = root
            .element("rv:battery")
            .unwrap()
            .element("rv:level")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(level, 0.5);
    }

    #[test]
    fn malformed_document_is_serialization_error() {
        assert!(matches!(
            from_json_str("{ not json"),
            Err(RevolveError::Serialization(_))
        ));
    }

    #[test]
    fn load_from_picks_format_by_extension() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let toml_path = dir.path().join("robot.toml");
        std::fs::write(&toml_path, TOML_DOC).unwrap();
        assert!(load_from(&toml_path).unwrap().has_element("rv:brain"));

        let json_path = dir.path().join("robot.json");
        std::fs::write(&json_path, r#"{ "name": "rv:robot_config" }"#).unwrap();
        assert!(load_from(&json_path).unwrap().children.is_empty());
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = load_from(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(RevolveError::Io(_))));
    }
}

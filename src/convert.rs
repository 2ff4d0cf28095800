//! Order-preserving conversion between YAML and JSON template text.
//!
//! Both directions pass through [`Document`], so a converted template keeps
//! its mapping keys in the order the author wrote them. JSON output uses the
//! serde_json pretty printer (2-space indent, `": "` after keys); YAML output
//! is block style only, which is all serde_yaml emits for non-empty nodes.

use std::fmt;

use base64::Engine;

use crate::document::{Document, Number};

/// Error produced while converting a template.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The source text is not a well-formed document.
    Parse(String),
    /// A binary scalar could not be decoded into text.
    Encoding(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Parse(msg) => write!(f, "parse error: {msg}"),
            ConvertError::Encoding(msg) => write!(f, "encoding error: {msg}"),
        }
    }
}

impl std::error::Error for ConvertError {}

/// Parse YAML text into an ordered document.
///
/// `!!binary` scalars are base64-decoded and re-read as UTF-8 text; either
/// step failing is an [`ConvertError::Encoding`]. Duplicate mapping keys are
/// rejected by the YAML grammar itself.
pub fn parse_yaml(text: &str) -> Result<Document, ConvertError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| ConvertError::Parse(e.to_string()))?;
    from_yaml_value(value)
}

/// Parse JSON text into an ordered document.
pub fn parse_json(text: &str) -> Result<Document, ConvertError> {
    serde_json::from_str(text).map_err(|e| ConvertError::Parse(e.to_string()))
}

/// Serialize a document as pretty-printed JSON.
pub fn to_json(doc: &Document) -> Result<String, ConvertError> {
    serde_json::to_string_pretty(doc).map_err(|e| ConvertError::Encoding(e.to_string()))
}

/// Serialize a document as block-style YAML.
pub fn to_yaml(doc: &Document) -> Result<String, ConvertError> {
    serde_yaml::to_string(doc).map_err(|e| ConvertError::Encoding(e.to_string()))
}

/// YAML text in, JSON text out.
pub fn yaml_to_json(text: &str) -> Result<String, ConvertError> {
    to_json(&parse_yaml(text)?)
}

/// JSON text in, YAML text out.
pub fn json_to_yaml(text: &str) -> Result<String, ConvertError> {
    to_yaml(&parse_json(text)?)
}

fn from_yaml_value(value: serde_yaml::Value) -> Result<Document, ConvertError> {
    match value {
        serde_yaml::Value::Null => Ok(Document::Null),
        serde_yaml::Value::Bool(v) => Ok(Document::Bool(v)),
        serde_yaml::Value::Number(n) => Ok(Document::Number(number_from_yaml(&n))),
        serde_yaml::Value::String(s) => Ok(Document::String(s)),
        serde_yaml::Value::Sequence(items) => {
            let items = items
                .into_iter()
                .map(from_yaml_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Document::Sequence(items))
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut entries = indexmap::IndexMap::with_capacity(mapping.len());
            for (key, value) in mapping {
                entries.insert(key_string(&key)?, from_yaml_value(value)?);
            }
            Ok(Document::Mapping(entries))
        }
        serde_yaml::Value::Tagged(tagged) => {
            if is_binary_tag(&tagged.tag) {
                decode_binary(&tagged.value)
            } else {
                // Any other tag is carried as its plain value.
                from_yaml_value(tagged.value)
            }
        }
    }
}

fn number_from_yaml(n: &serde_yaml::Number) -> Number {
    if let Some(v) = n.as_u64() {
        Number::PosInt(v)
    } else if let Some(v) = n.as_i64() {
        Number::NegInt(v)
    } else {
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// JSON keys must be strings; render non-string YAML keys with their scalar
/// spelling.
fn key_string(key: &serde_yaml::Value) -> Result<String, ConvertError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Bool(v) => Ok(v.to_string()),
        serde_yaml::Value::Number(n) => Ok(number_from_yaml(n).to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        other => Err(ConvertError::Parse(format!(
            "unsupported mapping key: {other:?}"
        ))),
    }
}

fn is_binary_tag(tag: &serde_yaml::value::Tag) -> bool {
    let tag = tag.to_string();
    let name = tag.trim_start_matches('!');
    name == "binary" || name == "tag:yaml.org,2002:binary"
}

fn decode_binary(value: &serde_yaml::Value) -> Result<Document, ConvertError> {
    let serde_yaml::Value::String(encoded) = value else {
        return Err(ConvertError::Encoding(
            "binary scalar is not base64 text".to_string(),
        ));
    };
    // Base64 in YAML may be wrapped across lines.
    let compact: String = encoded.split_whitespace().collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ConvertError::Encoding(format!("invalid base64 in binary scalar: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| ConvertError::Encoding(format!("binary scalar is not UTF-8 text: {e}")))?;
    Ok(Document::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn converts_nested_template_with_two_space_indent() {
        let json = yaml_to_json("a: 1\nb:\n  - x\n  - y\n").unwrap();
        assert_eq!(
            json,
            "{\n  \"a\": 1,\n  \"b\": [\n    \"x\",\n    \"y\"\n  ]\n}"
        );
    }

    #[test]
    fn key_order_survives_yaml_to_json() {
        let json = yaml_to_json("zebra: 1\napple: 2\nmango: 3\n").unwrap();
        let z = json.find("zebra").unwrap();
        let a = json.find("apple").unwrap();
        let m = json.find("mango").unwrap();
        assert!(z < a && a < m);
    }

    #[test]
    fn key_order_survives_full_round_trip() {
        let yaml = "zebra: 1\napple:\n  inner_z: true\n  inner_a: false\nmango: 3\n";
        let doc = parse_yaml(yaml).unwrap();
        let back = parse_json(&to_json(&doc).unwrap()).unwrap();
        assert_eq!(back, doc);
        assert_eq!(json_to_yaml(&yaml_to_json(yaml).unwrap()).unwrap(), yaml);
    }

    #[test]
    fn serialization_is_deterministic() {
        let doc = parse_yaml("a: 1\nb: [1, 2]\nc: {d: e}\n").unwrap();
        assert_eq!(to_json(&doc).unwrap(), to_json(&doc).unwrap());
        assert_eq!(to_yaml(&doc).unwrap(), to_yaml(&doc).unwrap());
    }

    #[test]
    fn yaml_output_is_block_style() {
        let yaml = json_to_yaml("{\"a\": [1, 2], \"b\": {\"c\": \"d\"}}").unwrap();
        assert_eq!(yaml, "a:\n- 1\n- 2\nb:\n  c: d\n");
    }

    #[test]
    fn binary_scalar_decodes_to_text() {
        let json = yaml_to_json("data: !!binary aGVsbG8=\n").unwrap();
        assert!(json.contains("\"data\": \"hello\""));
    }

    #[test]
    fn undecodable_binary_scalar_is_encoding_error() {
        let err = yaml_to_json("data: !!binary /w==\n").unwrap_err();
        assert!(matches!(err, ConvertError::Encoding(_)), "{err}");
    }

    #[test]
    fn garbage_base64_is_encoding_error() {
        let err = yaml_to_json("data: !!binary '%%%'\n").unwrap_err();
        assert!(matches!(err, ConvertError::Encoding(_)), "{err}");
    }

    #[rstest]
    #[case("a: [unclosed\n")]
    #[case("a: 1\n  bad indent: 2\n")]
    #[case("key: value\nkey: again\n")]
    fn malformed_yaml_is_parse_error(#[case] source: &str) {
        let err = parse_yaml(source).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)), "{err}");
    }

    #[rstest]
    #[case("{\"a\": }")]
    #[case("[1, 2")]
    #[case("")]
    fn malformed_json_is_parse_error(#[case] source: &str) {
        let err = parse_json(source).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)), "{err}");
    }

    #[test]
    fn non_string_yaml_keys_get_scalar_spelling() {
        let json = yaml_to_json("1: one\ntrue: two\n").unwrap();
        assert!(json.contains("\"1\": \"one\""));
        assert!(json.contains("\"true\": \"two\""));
    }

    #[test]
    fn scalar_document_round_trips() {
        assert_eq!(yaml_to_json("42\n").unwrap(), "42");
        assert_eq!(yaml_to_json("hello\n").unwrap(), "\"hello\"");
        assert_eq!(json_to_yaml("null").unwrap(), "null\n");
    }
}

//! In-memory document tree shared by the YAML and JSON codecs.
//!
//! Both formats deserialize into [`Document`] and serialize back out of it.
//! Mapping entries are kept in insertion order, so a template converted from
//! YAML to JSON (or back) keeps its keys exactly where the author wrote them.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A parsed template: the common subset of YAML and JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Document>),
    /// Key/value entries in insertion order.
    Mapping(IndexMap<String, Document>),
}

/// Numeric scalar, split the way serde_json splits its numbers so that
/// integers survive conversion without drifting through f64.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    PosInt(u64),
    NegInt(i64),
    Float(f64),
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        if v < 0 {
            Number::NegInt(v)
        } else {
            Number::PosInt(v as u64)
        }
    }
}

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        Number::PosInt(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::PosInt(v) => write!(f, "{v}"),
            Number::NegInt(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(v) => serializer.serialize_bool(*v),
            Document::Number(n) => n.serialize(serializer),
            Document::String(v) => serializer.serialize_str(v),
            Document::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Document::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Number::PosInt(v) => serializer.serialize_u64(v),
            Number::NegInt(v) => serializer.serialize_i64(v),
            Number::Float(v) => serializer.serialize_f64(v),
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = Document;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("any valid document value")
            }

            fn visit_unit<E>(self) -> Result<Document, E> {
                Ok(Document::Null)
            }

            fn visit_none<E>(self) -> Result<Document, E> {
                Ok(Document::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Document, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_bool<E>(self, v: bool) -> Result<Document, E> {
                Ok(Document::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Document, E> {
                Ok(Document::Number(Number::from(v)))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Document, E> {
                Ok(Document::Number(Number::PosInt(v)))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Document, E> {
                Ok(Document::Number(Number::Float(v)))
            }

            fn visit_str<E>(self, v: &str) -> Result<Document, E>
            where
                E: de::Error,
            {
                Ok(Document::String(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Document, E> {
                Ok(Document::String(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Document, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Document::Sequence(items))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Document, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = IndexMap::new();
                while let Some((key, value)) = map.next_entry::<String, Document>()? {
                    entries.insert(key, value);
                }
                Ok(Document::Mapping(entries))
            }
        }

        deserializer.deserialize_any(DocumentVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_normalize_non_negative_to_pos_int() {
        assert_eq!(Number::from(5i64), Number::PosInt(5));
        assert_eq!(Number::from(0i64), Number::PosInt(0));
        assert_eq!(Number::from(-5i64), Number::NegInt(-5));
    }

    #[test]
    fn mapping_keeps_insertion_order() {
        let mut entries = IndexMap::new();
        entries.insert("z".to_string(), Document::Null);
        entries.insert("a".to_string(), Document::Bool(true));
        entries.insert("m".to_string(), Document::String("x".into()));
        let doc = Document::Mapping(entries);

        if let Document::Mapping(entries) = &doc {
            let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
            assert_eq!(keys, ["z", "a", "m"]);
        } else {
            unreachable!()
        }
    }
}

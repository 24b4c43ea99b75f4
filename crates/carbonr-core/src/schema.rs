//! Table schema as seen from the native side. Pure data; no JNI here.
//!
//! The writer takes its input-record shape as a JSON schema:
//! ```text
//! [{"stringField":"string"},{"intField":"int"},{"arrayField":"array<string>"}]
//! ```
//! The managed parser is lenient and also accepts bare words
//! (`[{stringField:string},{intField:int}]`); `Schema::parse_json_schema`
//! accepts both spellings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::DataType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    /// Element type for `ARRAY` columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<DataType>,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            element_type: None,
        }
    }

    pub fn array(name: impl Into<String>, element_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::Array,
            element_type: Some(element_type),
        }
    }

    /// Type spelling inside a JSON schema (`int`, `array<string>`, ...).
    pub fn schema_type(&self) -> String {
        match (self.data_type, self.element_type) {
            (DataType::Array, Some(elem)) => format!("array<{}>", elem.schema_name()),
            (t, _) => t.schema_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Sub-schema in the order of `columns`; duplicates are kept.
    pub fn project(&self, columns: &[String]) -> Result<Schema> {
        let fields = columns
            .iter()
            .map(|c| {
                self.index_of(c)
                    .map(|i| self.fields[i].clone())
                    .ok_or_else(|| Error::Schema(format!("column: {} does not exist", c)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema::new(fields))
    }

    /// Render the writer's CSV-input JSON schema.
    pub fn to_json_schema(&self) -> String {
        let items: Vec<serde_json::Value> = self
            .fields
            .iter()
            .map(|f| {
                let mut obj = serde_json::Map::new();
                obj.insert(f.name.clone(), serde_json::Value::String(f.schema_type()));
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::Value::Array(items).to_string()
    }

    /// Parse a JSON schema in either the strict or the bare-word spelling.
    pub fn parse_json_schema(text: &str) -> Result<Schema> {
        let pairs = match serde_json::from_str::<Vec<serde_json::Map<String, serde_json::Value>>>(text) {
            Ok(objects) => {
                let mut pairs = Vec::with_capacity(objects.len());
                for obj in objects {
                    for (name, ty) in obj {
                        let ty = ty.as_str().ok_or_else(|| {
                            Error::Schema(format!("type of column '{}' must be a string", name))
                        })?;
                        pairs.push((name, ty.to_string()));
                    }
                }
                pairs
            }
            Err(_) => parse_bare_pairs(text)?,
        };
        if pairs.is_empty() {
            return Err(Error::Schema("schema has no columns".into()));
        }
        let fields = pairs
            .into_iter()
            .map(|(name, ty)| parse_field(name, &ty))
            .collect::<Result<Vec<_>>>()?;
        let schema = Schema::new(fields);
        for (i, f) in schema.fields.iter().enumerate() {
            if schema.index_of(&f.name) != Some(i) {
                return Err(Error::Schema(format!("duplicate column '{}'", f.name)));
            }
        }
        Ok(schema)
    }
}

fn parse_field(name: String, ty: &str) -> Result<Field> {
    let ty = ty.trim();
    let lower = ty.to_ascii_lowercase();
    if let Some(inner) = lower.strip_prefix("array<").and_then(|r| r.strip_suffix('>')) {
        let elem: DataType = inner.parse()?;
        if elem == DataType::Array {
            return Err(Error::Schema(format!("nested array in column '{}'", name)));
        }
        return Ok(Field::array(name, elem));
    }
    // decimal(10,2): precision and scale are the managed side's business
    let base = lower.split('(').next().unwrap_or("");
    let data_type: DataType = base.parse()?;
    if data_type == DataType::Array {
        return Ok(Field::array(name, DataType::String));
    }
    Ok(Field::new(name, data_type))
}

/// `[{a:int},{b:string}]` with optional quotes around either side.
fn parse_bare_pairs(text: &str) -> Result<Vec<(String, String)>> {
    let body = text
        .trim()
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .ok_or_else(|| Error::Schema("JSON schema must be an array of {name:type} objects".into()))?;

    let mut pairs = Vec::new();
    let mut rest = body;
    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|c| open + c)
            .ok_or_else(|| Error::Schema("unterminated '{' in JSON schema".into()))?;
        let entry = &rest[open + 1..close];
        let (name, ty) = entry
            .split_once(':')
            .ok_or_else(|| Error::Schema(format!("expected name:type, got '{}'", entry.trim())))?;
        let unquote = |s: &str| s.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string();
        let name = unquote(name);
        if name.is_empty() {
            return Err(Error::Schema("empty column name in JSON schema".into()));
        }
        pairs.push((name, unquote(ty)));
        rest = &rest[close + 1..];
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_word_schema_is_accepted() {
        let s = Schema::parse_json_schema("[{stringField:string},{shortField:short},{intField:int}]")
            .unwrap();
        assert_eq!(s.names(), vec!["stringField", "shortField", "intField"]);
        assert_eq!(s.fields[1].data_type, DataType::Short);
    }

    #[test]
    fn rendered_schema_parses_back() {
        let s = Schema::new(vec![
            Field::new("name", DataType::String),
            Field::new("price", DataType::Decimal),
            Field::array("tags", DataType::Varchar),
        ]);
        let json = s.to_json_schema();
        assert!(json.contains("\"array<varchar>\""));
        assert_eq!(Schema::parse_json_schema(&json).unwrap(), s);
    }

    #[test]
    fn decimal_precision_is_tolerated() {
        let s = Schema::parse_json_schema("[{d:'decimal(10,2)'}]").unwrap();
        assert_eq!(s.fields[0].data_type, DataType::Decimal);
    }

    #[test]
    fn duplicates_and_unknown_types_are_rejected() {
        assert!(Schema::parse_json_schema("[{a:int},{A:int}]").is_err());
        assert!(Schema::parse_json_schema("[{a:struct}]").is_err());
        assert!(Schema::parse_json_schema("[]").is_err());
    }

    #[test]
    fn projection_keeps_order_and_duplicates() {
        let s = Schema::new(vec![
            Field::new("a", DataType::Int),
            Field::new("b", DataType::Long),
        ]);
        let p = s.project(&["b".into(), "a".into(), "b".into()]).unwrap();
        assert_eq!(p.names(), vec!["b", "a", "b"]);
        assert!(matches!(s.project(&["c".into()]), Err(Error::Schema(m)) if m.contains("c does not exist")));
    }
}

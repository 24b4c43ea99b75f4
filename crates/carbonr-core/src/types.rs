//! Logical column types as the managed SDK names them.
//!
//! `getDataTypeName` on a row returns one of these upper-case names; the
//! writer's JSON schema uses the lower-case spellings (plus a few aliases).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Int,
    Date,
    Long,
    Timestamp,
    String,
    Double,
    Short,
    Boolean,
    Varchar,
    Decimal,
    Float,
    Array,
}

impl DataType {
    /// Every name `getDataTypeName` may return.
    pub const ALL: [DataType; 12] = [
        DataType::Int,
        DataType::Date,
        DataType::Long,
        DataType::Timestamp,
        DataType::String,
        DataType::Double,
        DataType::Short,
        DataType::Boolean,
        DataType::Varchar,
        DataType::Decimal,
        DataType::Float,
        DataType::Array,
    ];

    /// Upper-case managed name (`INT`, `DATE`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Date => "DATE",
            DataType::Long => "LONG",
            DataType::Timestamp => "TIMESTAMP",
            DataType::String => "STRING",
            DataType::Double => "DOUBLE",
            DataType::Short => "SHORT",
            DataType::Boolean => "BOOLEAN",
            DataType::Varchar => "VARCHAR",
            DataType::Decimal => "DECIMAL",
            DataType::Float => "FLOAT",
            DataType::Array => "ARRAY",
        }
    }

    /// Lower-case spelling used inside a writer JSON schema.
    pub fn schema_name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Date => "date",
            DataType::Long => "long",
            DataType::Timestamp => "timestamp",
            DataType::String => "string",
            DataType::Double => "double",
            DataType::Short => "short",
            DataType::Boolean => "boolean",
            DataType::Varchar => "varchar",
            DataType::Decimal => "decimal",
            DataType::Float => "float",
            DataType::Array => "array",
        }
    }

    /// Types whose values cross the bridge as text (no native decimal/varchar).
    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::String | DataType::Varchar | DataType::Decimal)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    /// Accepts the managed names and the JSON-schema spellings, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => DataType::Int,
            "date" => DataType::Date,
            "long" | "bigint" => DataType::Long,
            "timestamp" => DataType::Timestamp,
            "string" => DataType::String,
            "double" => DataType::Double,
            "short" | "smallint" => DataType::Short,
            "boolean" | "bool" => DataType::Boolean,
            "varchar" => DataType::Varchar,
            "decimal" => DataType::Decimal,
            "float" => DataType::Float,
            "array" => DataType::Array,
            other => {
                return Err(Error::Schema(format!("unknown data type '{}'", other)));
            }
        };
        Ok(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for t in DataType::ALL {
            assert_eq!(t.name().parse::<DataType>().unwrap(), t);
            assert_eq!(t.schema_name().parse::<DataType>().unwrap(), t);
        }
    }

    #[test]
    fn aliases_are_accepted() {
        assert_eq!("bigint".parse::<DataType>().unwrap(), DataType::Long);
        assert_eq!("SmallInt".parse::<DataType>().unwrap(), DataType::Short);
        assert!("struct".parse::<DataType>().is_err());
    }
}

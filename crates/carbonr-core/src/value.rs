//! Native representation of one field value.
//!
//! Decimal and varchar travel as text because the bridge has no native
//! decimal or variable-text type. Dates are days since the epoch and
//! timestamps are milliseconds since the epoch, matching what the row
//! getters hand back (`getInt` / `getLong`).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::DataType;

/// Separator between array elements inside one CSV cell (complex delimiter level 1).
pub const ARRAY_DELIMITER: char = '\u{1}';

/// Cell text for a null value (the SDK's default `serialization_null_format`).
pub const NULL_MARKER: &str = "\\N";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Varchar(String),
    Decimal(String),
    Date(i32),
    Timestamp(i64),
    Array(Vec<Value>),
}

impl Value {
    /// Logical type of this value; `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        let t = match self {
            Value::Null => return None,
            Value::Short(_) => DataType::Short,
            Value::Int(_) => DataType::Int,
            Value::Long(_) => DataType::Long,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Boolean(_) => DataType::Boolean,
            Value::String(_) => DataType::String,
            Value::Varchar(_) => DataType::Varchar,
            Value::Decimal(_) => DataType::Decimal,
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Array(_) => DataType::Array,
        };
        Some(t)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Parse one CSV cell into a value of `data_type`.
    ///
    /// `NULL_MARKER` is `Null` for every type, and so is an empty cell for
    /// every type except text and arrays. An empty ARRAY cell is the empty
    /// array. `element` is the array element type and defaults to STRING.
    pub fn parse(text: &str, data_type: DataType, element: Option<DataType>) -> Result<Value> {
        let raw = text;
        if raw == NULL_MARKER {
            return Ok(Value::Null);
        }
        let text = text.trim();
        if text.is_empty() && !matches!(data_type, DataType::String | DataType::Varchar | DataType::Array) {
            return Ok(Value::Null);
        }
        let bad = |what: &str| Error::Schema(format!("cannot parse '{}' as {}", raw, what));
        let v = match data_type {
            DataType::Short => Value::Short(text.parse().map_err(|_| bad("SHORT"))?),
            DataType::Int => Value::Int(text.parse().map_err(|_| bad("INT"))?),
            DataType::Long => Value::Long(text.parse().map_err(|_| bad("LONG"))?),
            DataType::Float => Value::Float(text.parse().map_err(|_| bad("FLOAT"))?),
            DataType::Double => Value::Double(text.parse().map_err(|_| bad("DOUBLE"))?),
            DataType::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                _ => return Err(bad("BOOLEAN")),
            },
            DataType::String => Value::String(raw.to_string()),
            DataType::Varchar => Value::Varchar(raw.to_string()),
            DataType::Decimal => {
                if !is_decimal_literal(text) {
                    return Err(bad("DECIMAL"));
                }
                Value::Decimal(text.to_string())
            }
            DataType::Date => match text.parse::<i32>() {
                Ok(days) => Value::Date(days),
                Err(_) => Value::Date(parse_date(text).ok_or_else(|| bad("DATE"))?),
            },
            DataType::Timestamp => match text.parse::<i64>() {
                Ok(ms) => Value::Timestamp(ms),
                Err(_) => Value::Timestamp(parse_timestamp(text).ok_or_else(|| bad("TIMESTAMP"))?),
            },
            DataType::Array => {
                let element = element.unwrap_or(DataType::String);
                if element == DataType::Array {
                    return Err(Error::Schema("nested arrays are not supported".into()));
                }
                if raw.is_empty() {
                    return Ok(Value::Array(Vec::new()));
                }
                let items = raw
                    .split(ARRAY_DELIMITER)
                    .map(|item| Value::parse(item, element, None))
                    .collect::<Result<Vec<_>>>()?;
                Value::Array(items)
            }
        };
        Ok(v)
    }

    /// Render as a CSV cell that `parse` reads back to an equal value.
    pub fn to_cell(&self) -> String {
        match self {
            Value::Null => NULL_MARKER.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Array(items) => items
                .iter()
                .map(Value::to_cell)
                .collect::<Vec<_>>()
                .join(&ARRAY_DELIMITER.to_string()),
            other => other.to_string(),
        }
    }
}

/// Printed form: doubles/floats with six decimals, arrays tab-separated.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:.6}", v),
            Value::Double(v) => write!(f, "{:.6}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::String(s) | Value::Varchar(s) | Value::Decimal(s) => f.write_str(s),
            Value::Date(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\t")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

fn is_decimal_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut parts = digits.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next();
    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    match frac_part {
        Some(frac) => {
            (!int_part.is_empty() || !frac.is_empty()) && all_digits(int_part) && all_digits(frac)
        }
        None => !int_part.is_empty() && all_digits(int_part),
    }
}

/// `YYYY-MM-DD` to days since 1970-01-01.
pub fn parse_date(s: &str) -> Option<i32> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let days = (date - NaiveDate::from_ymd_opt(1970, 1, 1)?).num_days();
    i32::try_from(days).ok()
}

/// `YYYY-MM-DD HH:MM:SS[.fff]` (or with `T`) to epoch milliseconds.
pub fn parse_timestamp(s: &str) -> Option<i64> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|ts| ts.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cells_are_null_except_text() {
        assert_eq!(Value::parse("", DataType::Int, None).unwrap(), Value::Null);
        assert_eq!(
            Value::parse("", DataType::String, None).unwrap(),
            Value::String(String::new())
        );
    }

    #[test]
    fn dates_and_timestamps() {
        assert_eq!(parse_date("1970-01-01"), Some(0));
        assert_eq!(parse_date("2019-03-02"), Some(17957));
        assert_eq!(parse_date("2019-02-30"), None);
        assert_eq!(parse_date("2000-02-29"), Some(11_016));
        assert_eq!(parse_date("1969-12-31"), Some(-1));
        assert_eq!(parse_date("-0001-01-01"), Some(-719_893));
        assert_eq!(parse_timestamp("1970-01-02 00:00:01"), Some(86_401_000));
        assert_eq!(parse_timestamp("1970-01-01T00:00:00.5"), Some(500));
        assert_eq!(parse_timestamp("2019-03-02 10:20:30.123"), Some(1_551_522_030_123));
        assert_eq!(parse_timestamp("2019-03-02 25:00:00"), None);
        assert_eq!(
            Value::parse("2019-03-02", DataType::Date, None).unwrap(),
            Value::Date(17957)
        );
    }

    #[test]
    fn decimal_literals_are_validated() {
        assert!(Value::parse("12.345", DataType::Decimal, None).is_ok());
        assert!(Value::parse("-.5", DataType::Decimal, None).is_ok());
        assert!(Value::parse("1.2.3", DataType::Decimal, None).is_err());
        assert!(Value::parse("abc", DataType::Decimal, None).is_err());
    }

    #[test]
    fn arrays_split_on_delimiter() {
        let cell = format!("a{}b{}c", ARRAY_DELIMITER, ARRAY_DELIMITER);
        let v = Value::parse(&cell, DataType::Array, Some(DataType::String)).unwrap();
        assert_eq!(v.to_string(), "a\tb\tc");
        assert_eq!(v.to_cell(), cell);
    }

    #[test]
    fn array_cells_keep_element_text() {
        let padded = Value::Array(vec![Value::String(" a".into()), Value::String("b ".into())]);
        let read = Value::parse(&padded.to_cell(), DataType::Array, Some(DataType::String)).unwrap();
        assert_eq!(read, padded);

        let ints = format!(" 1{} 2 ", ARRAY_DELIMITER);
        assert_eq!(
            Value::parse(&ints, DataType::Array, Some(DataType::Int)).unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn empty_array_and_null_have_distinct_cells() {
        let empty = Value::Array(Vec::new());
        assert_eq!(empty.to_cell(), "");
        assert_eq!(Value::parse("", DataType::Array, None).unwrap(), empty);
        assert_eq!(Value::Null.to_cell(), NULL_MARKER);
        for t in DataType::ALL {
            assert_eq!(Value::parse(NULL_MARKER, t, None).unwrap(), Value::Null, "{:?}", t);
        }

        let with_null = Value::Array(vec![Value::Int(3), Value::Null]);
        assert_eq!(
            Value::parse(&with_null.to_cell(), DataType::Array, Some(DataType::Int)).unwrap(),
            with_null
        );
        let null_string = Value::parse(&Value::Null.to_cell(), DataType::String, None).unwrap();
        assert_eq!(null_string, Value::Null);
    }

    #[test]
    fn printed_form_uses_six_decimals() {
        assert_eq!(Value::Double(1.5).to_string(), "1.500000");
        assert_eq!(Value::Float(0.25).to_string(), "0.250000");
        assert_eq!(Value::Boolean(false).to_string(), "false");
    }
}

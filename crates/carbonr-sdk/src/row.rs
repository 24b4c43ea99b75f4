//! Row handles and the typed row accessor.
//!
//! A `RowHandle` owns one pinned managed row and releases it on drop. A
//! `RowAccessor` is a reusable, non-owning view: bind it with `set_row`
//! and every getter re-enters the managed side for that row. Using an
//! accessor whose row has been dropped fails with `Error::Bridge`.

use carbonr_bridge::carbon::row as m;
use carbonr_bridge::{Arg, BridgeError, Method, ObjectRef, Returned};
use carbonr_core::{DataType, Error, Result, Value};

use crate::exception::{is_null_pointer, translate, Call};
use crate::runtime::{Pinned, Runtime};

pub struct RowHandle<'rt> {
    pinned: Pinned<'rt>,
}

impl<'rt> RowHandle<'rt> {
    pub(crate) fn new(pinned: Pinned<'rt>) -> Self {
        Self { pinned }
    }

    pub fn object_ref(&self) -> ObjectRef {
        self.pinned.obj()
    }

    /// Accessor already bound to this row.
    pub fn accessor(&self) -> RowAccessor<'rt> {
        let mut acc = RowAccessor::new(self.pinned.runtime());
        acc.set_row(self);
        acc
    }
}

pub struct RowAccessor<'rt> {
    rt: &'rt Runtime,
    row: Option<ObjectRef>,
}

impl<'rt> RowAccessor<'rt> {
    pub fn new(rt: &'rt Runtime) -> Self {
        Self { rt, row: None }
    }

    /// Rebind to another row.
    pub fn set_row(&mut self, row: &RowHandle<'rt>) {
        self.row = Some(row.object_ref());
    }

    fn call(&self, method: &Method, ordinal: Option<usize>) -> Result<Returned> {
        let row = self
            .row
            .ok_or_else(|| Error::Bridge(format!("{}: no row bound, call set_row first", method.name)))?;
        let (call, result) = match ordinal {
            Some(ordinal) => {
                let Ok(ordinal_arg) = i32::try_from(ordinal) else {
                    return Err(Error::Index {
                        ordinal,
                        message: "ordinal does not fit a Java int".into(),
                    });
                };
                (
                    Call::Field(ordinal),
                    self.rt.call(row, method, &[Arg::Int(ordinal_arg)]),
                )
            }
            None => (Call::Plain, self.rt.call(row, method, &[])),
        };
        result.map_err(|e| {
            let op = match ordinal {
                Some(o) => format!("{}({})", method.name, o),
                None => method.name.to_string(),
            };
            translate(&op, call, e)
        })
    }

    fn typed<T>(
        &self,
        method: &Method,
        ordinal: usize,
        unwrap: fn(Returned, &Method) -> std::result::Result<T, BridgeError>,
    ) -> Result<T> {
        unwrap(self.call(method, Some(ordinal))?, method)
            .map_err(|e| translate(method.name, Call::Field(ordinal), e))
    }

    /// Number of fields in the bound row.
    pub fn length(&self) -> Result<usize> {
        let n = self
            .call(&m::GET_LENGTH, None)?
            .into_int(&m::GET_LENGTH)
            .map_err(|e| translate("getLength", Call::Plain, e))?;
        usize::try_from(n).map_err(|_| Error::Managed {
            operation: "getLength".into(),
            class: "java.lang.IllegalStateException".into(),
            message: format!("negative row length {}", n),
        })
    }

    pub fn data_type_name(&self, ordinal: usize) -> Result<String> {
        self.typed(&m::GET_DATA_TYPE_NAME, ordinal, Returned::into_text)?
            .ok_or_else(|| Error::Managed {
                operation: format!("getDataTypeName({})", ordinal),
                class: "java.lang.NullPointerException".into(),
                message: "no data type".into(),
            })
    }

    pub fn data_type(&self, ordinal: usize) -> Result<DataType> {
        self.data_type_name(ordinal)?.parse()
    }

    /// Element type name of an ARRAY column; `TypeMismatch` otherwise.
    pub fn array_element_type_name(&self, ordinal: usize) -> Result<String> {
        self.typed(&m::GET_ARRAY_ELEMENT_TYPE_NAME, ordinal, Returned::into_text)?
            .ok_or_else(|| Error::TypeMismatch {
                ordinal,
                message: "no element type".into(),
            })
    }

    pub fn array_element_type(&self, ordinal: usize) -> Result<DataType> {
        self.array_element_type_name(ordinal)?.parse()
    }

    pub fn get_short(&self, ordinal: usize) -> Result<i16> {
        self.typed(&m::GET_SHORT, ordinal, Returned::into_short)
    }

    /// INT columns, and DATE columns as days since the epoch.
    pub fn get_int(&self, ordinal: usize) -> Result<i32> {
        self.typed(&m::GET_INT, ordinal, Returned::into_int)
    }

    /// LONG columns, and TIMESTAMP columns as epoch milliseconds.
    pub fn get_long(&self, ordinal: usize) -> Result<i64> {
        self.typed(&m::GET_LONG, ordinal, Returned::into_long)
    }

    pub fn get_double(&self, ordinal: usize) -> Result<f64> {
        self.typed(&m::GET_DOUBLE, ordinal, Returned::into_double)
    }

    pub fn get_float(&self, ordinal: usize) -> Result<f32> {
        self.typed(&m::GET_FLOAT, ordinal, Returned::into_float)
    }

    pub fn get_boolean(&self, ordinal: usize) -> Result<bool> {
        self.typed(&m::GET_BOOLEAN, ordinal, Returned::into_bool)
    }

    /// `None` for a null cell.
    pub fn get_string(&self, ordinal: usize) -> Result<Option<String>> {
        self.typed(&m::GET_STRING, ordinal, Returned::into_text)
    }

    /// Decimal rendered as text by the managed side.
    pub fn get_decimal(&self, ordinal: usize) -> Result<Option<String>> {
        self.typed(&m::GET_DECIMAL, ordinal, Returned::into_text)
    }

    pub fn get_varchar(&self, ordinal: usize) -> Result<Option<String>> {
        self.typed(&m::GET_VARCHAR, ordinal, Returned::into_text)
    }

    /// Array elements as text; type them with `array_element_type`.
    pub fn get_array(&self, ordinal: usize) -> Result<Vec<Option<String>>> {
        self.typed(&m::GET_ARRAY, ordinal, Returned::into_text_array)
    }

    /// The field as a `Value`, dispatched on `getDataTypeName`. Null cells
    /// come back as `Value::Null`.
    pub fn get_value(&self, ordinal: usize) -> Result<Value> {
        let data_type = self.data_type(ordinal)?;
        let value = match data_type {
            DataType::Short => self.get_short(ordinal).map(Value::Short),
            DataType::Int => self.get_int(ordinal).map(Value::Int),
            DataType::Date => self.get_int(ordinal).map(Value::Date),
            DataType::Long => self.get_long(ordinal).map(Value::Long),
            DataType::Timestamp => self.get_long(ordinal).map(Value::Timestamp),
            DataType::Double => self.get_double(ordinal).map(Value::Double),
            DataType::Float => self.get_float(ordinal).map(Value::Float),
            DataType::Boolean => self.get_boolean(ordinal).map(Value::Boolean),
            DataType::String => self
                .get_string(ordinal)
                .map(|s| s.map_or(Value::Null, Value::String)),
            DataType::Varchar => self
                .get_varchar(ordinal)
                .map(|s| s.map_or(Value::Null, Value::Varchar)),
            DataType::Decimal => self
                .get_decimal(ordinal)
                .map(|s| s.map_or(Value::Null, Value::Decimal)),
            DataType::Array => self.get_array_value(ordinal),
        };
        match value {
            Err(e) if is_null_pointer(&e) => Ok(Value::Null),
            other => other,
        }
    }

    fn get_array_value(&self, ordinal: usize) -> Result<Value> {
        let element = self.array_element_type(ordinal)?;
        let items = self
            .get_array(ordinal)?
            .into_iter()
            .map(|item| match item {
                None => Ok(Value::Null),
                Some(text) => Value::parse(&text, element, None).map_err(|e| Error::TypeMismatch {
                    ordinal,
                    message: e.to_string(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(items))
    }

    /// Printed form of one field: floats with six decimals, arrays tab-joined.
    pub fn format(&self, ordinal: usize) -> Result<String> {
        Ok(self.get_value(ordinal)?.to_string())
    }

    /// Every field, tab-separated.
    pub fn format_row(&self) -> Result<String> {
        let fields = (0..self.length()?)
            .map(|i| self.format(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(fields.join("\t"))
    }

    /// Write `format(ordinal)` plus a tab to stdout.
    pub fn print(&self, ordinal: usize) -> Result<()> {
        print!("{}\t", self.format(ordinal)?);
        Ok(())
    }

    /// Whole row as values.
    pub fn values(&self) -> Result<Vec<Value>> {
        (0..self.length()?).map(|i| self.get_value(i)).collect()
    }
}

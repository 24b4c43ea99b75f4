//! Marshaling types for one cross-runtime call.
//!
//! Arguments are borrowed native values; the backend copies them into
//! managed objects for the duration of the call. Results are copied back
//! into owned native values before the call returns, so nothing handed out
//! here points into managed memory. Managed objects that must survive the
//! call are pinned by the backend and addressed through `ObjectRef`.

use crate::error::{BridgeError, Result};

/// Opaque handle to a managed object pinned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(u64);

impl ObjectRef {
    pub fn from_raw(raw: u64) -> Self {
        ObjectRef(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Str(&'a str),
    StrArray(&'a [String]),
    Int(i32),
    Long(i64),
    Bool(bool),
    Object(ObjectRef),
}

impl Arg<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Arg::Str(_) => "String",
            Arg::StrArray(_) => "String[]",
            Arg::Int(_) => "int",
            Arg::Long(_) => "long",
            Arg::Bool(_) => "boolean",
            Arg::Object(_) => "Object",
        }
    }
}

/// What the caller expects back; drives the JNI return type and conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetKind {
    Void,
    Boolean,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// `java.lang.String`, copied out eagerly.
    Text,
    /// Any object, pinned and returned as an `ObjectRef`.
    Object,
    /// `Object[]`, each element pinned separately.
    ObjectArray,
    /// `Object[]`, each element rendered with `toString()`.
    TextArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Static,
    Instance,
    Constructor,
}

/// One managed method, resolved by class, name and JNI signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Method {
    pub class: &'static str,
    pub name: &'static str,
    pub sig: &'static str,
    pub ret: RetKind,
    pub kind: MethodKind,
}

impl Method {
    pub const fn instance(class: &'static str, name: &'static str, sig: &'static str, ret: RetKind) -> Self {
        Method {
            class,
            name,
            sig,
            ret,
            kind: MethodKind::Instance,
        }
    }

    pub const fn static_(class: &'static str, name: &'static str, sig: &'static str, ret: RetKind) -> Self {
        Method {
            class,
            name,
            sig,
            ret,
            kind: MethodKind::Static,
        }
    }

    pub const fn constructor(class: &'static str, sig: &'static str) -> Self {
        Method {
            class,
            name: "<init>",
            sig,
            ret: RetKind::Object,
            kind: MethodKind::Constructor,
        }
    }

    pub(crate) fn no_such_method(&self) -> BridgeError {
        BridgeError::NoSuchMethod {
            class: self.class,
            name: self.name,
            sig: self.sig,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Returned {
    Void,
    Boolean(bool),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(Option<String>),
    Object(Option<ObjectRef>),
    ObjectArray(Vec<ObjectRef>),
    TextArray(Vec<Option<String>>),
}

impl Returned {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Returned::Void => "void",
            Returned::Boolean(_) => "boolean",
            Returned::Short(_) => "short",
            Returned::Int(_) => "int",
            Returned::Long(_) => "long",
            Returned::Float(_) => "float",
            Returned::Double(_) => "double",
            Returned::Text(_) => "String",
            Returned::Object(_) => "Object",
            Returned::ObjectArray(_) => "Object[]",
            Returned::TextArray(_) => "String[]",
        }
    }

    fn unexpected(&self, method: &Method, expected: &'static str) -> BridgeError {
        BridgeError::UnexpectedReturn {
            method: method.name,
            expected,
            got: self.kind_name(),
        }
    }

    pub fn into_bool(self, method: &Method) -> Result<bool> {
        match self {
            Returned::Boolean(v) => Ok(v),
            other => Err(other.unexpected(method, "boolean")),
        }
    }

    pub fn into_short(self, method: &Method) -> Result<i16> {
        match self {
            Returned::Short(v) => Ok(v),
            other => Err(other.unexpected(method, "short")),
        }
    }

    pub fn into_int(self, method: &Method) -> Result<i32> {
        match self {
            Returned::Int(v) => Ok(v),
            other => Err(other.unexpected(method, "int")),
        }
    }

    pub fn into_long(self, method: &Method) -> Result<i64> {
        match self {
            Returned::Long(v) => Ok(v),
            other => Err(other.unexpected(method, "long")),
        }
    }

    pub fn into_float(self, method: &Method) -> Result<f32> {
        match self {
            Returned::Float(v) => Ok(v),
            other => Err(other.unexpected(method, "float")),
        }
    }

    pub fn into_double(self, method: &Method) -> Result<f64> {
        match self {
            Returned::Double(v) => Ok(v),
            other => Err(other.unexpected(method, "double")),
        }
    }

    pub fn into_text(self, method: &Method) -> Result<Option<String>> {
        match self {
            Returned::Text(v) => Ok(v),
            other => Err(other.unexpected(method, "String")),
        }
    }

    /// Non-null object; a `null` return is reported as a managed NPE.
    pub fn into_object(self, method: &Method) -> Result<ObjectRef> {
        match self {
            Returned::Object(Some(obj)) => Ok(obj),
            Returned::Object(None) => Err(BridgeError::exception(
                "java.lang.NullPointerException",
                format!("{} returned null", method.name),
            )),
            other => Err(other.unexpected(method, "Object")),
        }
    }

    pub fn into_object_array(self, method: &Method) -> Result<Vec<ObjectRef>> {
        match self {
            Returned::ObjectArray(v) => Ok(v),
            other => Err(other.unexpected(method, "Object[]")),
        }
    }

    pub fn into_text_array(self, method: &Method) -> Result<Vec<Option<String>>> {
        match self {
            Returned::TextArray(v) => Ok(v),
            other => Err(other.unexpected(method, "String[]")),
        }
    }

    pub fn into_void(self, method: &Method) -> Result<()> {
        match self {
            Returned::Void => Ok(()),
            other => Err(other.unexpected(method, "void")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: Method = Method::instance("x/Y", "get", "()I", RetKind::Int);

    #[test]
    fn typed_unwrap_reports_mismatch() {
        assert_eq!(Returned::Int(7).into_int(&M).unwrap(), 7);
        let err = Returned::Text(None).into_int(&M).unwrap_err();
        assert!(matches!(err, BridgeError::UnexpectedReturn { got: "String", .. }));
    }

    #[test]
    fn null_object_is_a_managed_npe() {
        let err = Returned::Object(None).into_object(&M).unwrap_err();
        assert!(err.is_exception("NullPointerException"));
    }
}

//! Mapping of managed exceptions onto the typed `Error` taxonomy.

use carbonr_bridge::BridgeError;
use carbonr_core::Error;

/// What the façade was doing when the managed side failed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Call<'a> {
    /// Finalizing a reader/writer builder over `path`.
    Build(&'a str),
    /// Advancing a reader; `NoSuchElementException` means end of data.
    Read,
    /// A row getter at this ordinal.
    Field(usize),
    Plain,
}

fn simple_name(class: &str) -> &str {
    class.rsplit(['.', '/', '$']).next().unwrap_or(class)
}

pub(crate) fn translate(operation: &str, call: Call<'_>, err: BridgeError) -> Error {
    let (class, message) = match err {
        BridgeError::Exception { class, message } => (class, message),
        other => return Error::Bridge(format!("{}: {}", operation, other)),
    };
    let simple = simple_name(&class);
    match call {
        Call::Build(path) => Error::Build {
            path: path.to_string(),
            message: format!("{}: {}", simple, message),
        },
        Call::Read if simple == "NoSuchElementException" => Error::Exhausted,
        Call::Field(ordinal) if simple.ends_with("IndexOutOfBoundsException") => {
            Error::Index { ordinal, message }
        }
        Call::Field(ordinal)
            if simple == "ClassCastException"
                || (simple == "RuntimeException" && message.contains("Only support Array type")) =>
        {
            Error::TypeMismatch { ordinal, message }
        }
        _ => Error::Managed {
            operation: operation.to_string(),
            class,
            message,
        },
    }
}

/// True for a managed `NullPointerException` surfaced as `Error::Managed`.
pub(crate) fn is_null_pointer(err: &Error) -> bool {
    matches!(err, Error::Managed { class, .. } if simple_name(class) == "NullPointerException")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exc(class: &str, message: &str) -> BridgeError {
        BridgeError::Exception {
            class: class.into(),
            message: message.into(),
        }
    }

    #[test]
    fn build_failures_carry_the_path() {
        let e = translate(
            "build",
            Call::Build("s3a://sdk/t"),
            exc("java.nio.file.AccessDeniedException", "no credentials"),
        );
        match e {
            Error::Build { path, message } => {
                assert_eq!(path, "s3a://sdk/t");
                assert!(message.starts_with("AccessDeniedException"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn no_such_element_is_exhaustion_only_while_reading() {
        let read = translate("readNextCarbonRow", Call::Read, exc("java.util.NoSuchElementException", ""));
        assert!(read.is_end_of_data());
        let other = translate("get", Call::Plain, exc("java.util.NoSuchElementException", ""));
        assert!(matches!(other, Error::Managed { .. }));
    }

    #[test]
    fn row_getter_failures() {
        let oob = translate(
            "getInt",
            Call::Field(12),
            exc("java.lang.ArrayIndexOutOfBoundsException", "Index 12 out of bounds for length 12"),
        );
        assert!(matches!(oob, Error::Index { ordinal: 12, .. }));
        let cast = translate("getInt", Call::Field(0), exc("java.lang.ClassCastException", "x"));
        assert!(matches!(cast, Error::TypeMismatch { ordinal: 0, .. }));
        let elem = translate(
            "getArrayElementTypeName",
            Call::Field(1),
            exc("java.lang.RuntimeException", "Only support Array type."),
        );
        assert!(matches!(elem, Error::TypeMismatch { ordinal: 1, .. }));
        let npe = translate("getInt", Call::Field(1), exc("java.lang.NullPointerException", ""));
        assert!(is_null_pointer(&npe));
    }

    #[test]
    fn bridge_failures_are_not_managed() {
        let e = translate("hasNext", Call::Read, BridgeError::InvalidHandle(7));
        assert!(matches!(e, Error::Bridge(msg) if msg.contains("#7")));
    }
}

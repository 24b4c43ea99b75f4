use thiserror::Error;

/// Canonical result for the bindings.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The managed runtime could not be started (bad classpath, already running).
    #[error("runtime startup failed: {0}")]
    Startup(String),

    /// A reader/writer builder could not be finalized.
    #[error("build failed for '{path}': {message}")]
    Build { path: String, message: String },

    /// A read was issued with no rows remaining.
    #[error("no more rows to read")]
    Exhausted,

    /// Field ordinal out of range for the bound row.
    #[error("index error at ordinal {ordinal}: {message}")]
    Index { ordinal: usize, message: String },

    /// Typed getter does not match the column's logical type.
    #[error("type mismatch at ordinal {ordinal}: {message}")]
    TypeMismatch { ordinal: usize, message: String },

    /// Operation on a reader/writer after `close()`.
    #[error("{0} is closed")]
    Closed(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("schema error: {0}")]
    Schema(String),

    /// Any other exception raised on the managed side.
    #[error("{operation} failed with {class}: {message}")]
    Managed {
        operation: String,
        class: String,
        message: String,
    },

    /// The embedding bridge itself failed (stale handle, missing method, JNI).
    #[error("bridge error: {0}")]
    Bridge(String),

    /// `source` wrapped with the operation that was running, e.g. the record
    /// a writer rejected.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap with a description of the failing operation.
    ///
    /// ```rust,no_run
    /// use carbonr_core::error::Error;
    /// let err = Error::Build {
    ///     path: "s3a://sdk/WriterOutput/carbondata".into(),
    ///     message: "AccessDeniedException: no credentials".into(),
    /// }
    /// .with_context("reader for table 'test'");
    /// assert_eq!(err.suggestions().len(), 2);
    /// ```
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True for the end-of-data signal, looking through context layers.
    pub fn is_end_of_data(&self) -> bool {
        match self {
            Error::Exhausted => true,
            Error::Context { source, .. } => source.is_end_of_data(),
            _ => false,
        }
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::Startup(msg) => {
                let mut out = vec!["Check that the SDK jar is on the classpath (CARBONR_CLASSPATH)".into()];
                if msg.contains("already") {
                    out.push("Only one runtime may be started per process; reuse the existing handle".into());
                }
                out
            }
            Error::Build { path, message } => {
                if message.contains("Access") || message.contains("access.key") {
                    vec![
                        "Set fs.s3a.access.key, fs.s3a.secret.key and fs.s3a.endpoint".into(),
                        format!("Verify the credentials can read '{}'", path),
                    ]
                } else if message.contains("column") || message.contains("projection") {
                    vec![
                        "Check that the column name is spelled correctly".into(),
                        "Verify the column exists in the table schema".into(),
                    ]
                } else {
                    vec![format!("Verify that '{}' exists and contains carbondata files", path)]
                }
            }
            Error::Index { .. } => vec!["Use getLength() to find the number of fields in the row".into()],
            Error::TypeMismatch { .. } => {
                vec!["Check getDataTypeName(ordinal) before calling a typed getter".into()]
            }
            Error::Closed(_) => vec!["Build a new reader/writer; closed handles cannot be reused".into()],
            Error::Context { source, .. } => source.suggestions(),
            _ => vec![],
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Schema(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_data_is_visible_through_context() {
        let err = Error::Exhausted.with_context("reading table");
        assert!(err.is_end_of_data());
        assert!(!Error::Closed("reader").is_end_of_data());
    }

    #[test]
    fn build_error_suggests_credentials() {
        let err = Error::Build {
            path: "s3a://sdk/table".into(),
            message: "AccessDeniedException: missing fs.s3a.access.key".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("fs.s3a.access.key")));
    }

    #[test]
    fn context_keeps_the_wrapped_suggestions() {
        let err = Error::Build {
            path: "/missing".into(),
            message: "FileNotFoundException: /missing".into(),
        }
        .with_context("reader for table 'test'");
        assert_eq!(
            err.to_string(),
            "reader for table 'test': build failed for '/missing': FileNotFoundException: /missing"
        );
        assert_eq!(
            err.suggestions(),
            vec!["Verify that '/missing' exists and contains carbondata files".to_string()]
        );
    }
}

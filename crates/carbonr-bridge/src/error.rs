use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// A managed-side throwable. Already cleared from the runtime.
    #[error("{class}: {message}")]
    Exception { class: String, message: String },

    #[error("invalid object reference #{0}")]
    InvalidHandle(u64),

    #[error("no such method {class}.{name}{sig}")]
    NoSuchMethod {
        class: &'static str,
        name: &'static str,
        sig: &'static str,
    },

    #[error("bad arguments for {method}: {message}")]
    BadArguments { method: &'static str, message: String },

    #[error("{method} returned {got}, expected {expected}")]
    UnexpectedReturn {
        method: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    #[error("runtime startup failed: {0}")]
    Startup(String),

    #[error("runtime is shut down")]
    ShutDown,

    #[cfg(feature = "jvm")]
    #[error("jni error: {0}")]
    Jni(#[from] jni::errors::Error),
}

impl BridgeError {
    pub(crate) fn exception(class: &str, message: impl Into<String>) -> Self {
        BridgeError::Exception {
            class: class.to_string(),
            message: message.into(),
        }
    }

    /// Fully qualified class of a managed exception, if this is one.
    pub fn exception_class(&self) -> Option<&str> {
        match self {
            BridgeError::Exception { class, .. } => Some(class.as_str()),
            _ => None,
        }
    }

    /// True when the managed exception's simple class name ends with `suffix`.
    pub fn is_exception(&self, suffix: &str) -> bool {
        self.exception_class()
            .map(|c| c.rsplit(['.', '/', '$']).next().unwrap_or(c).ends_with(suffix))
            .unwrap_or(false)
    }
}

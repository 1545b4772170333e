//! Purpose: Error types shared by decoding, transport, and throwing coercions.
//! Exports: `Error`, `ErrorKind`, `CoercionError`, `Target`, `to_exit_code`.
//! Role: One builder-style error for fallible I/O paths plus a tagged coercion failure.
//! Invariants: Navigation never produces an error; only throwing coercions and I/O do.
//! Invariants: `CoercionError` messages are fixed per target type.
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    NotFound,
    Permission,
    Decode,
    Coercion,
    Io,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    url: Option<String>,
    status: Option<u16>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            url: None,
            status: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(url) = &self.url {
            write!(f, " (url: {url})")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Target type named by a failed throwing coercion.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Target {
    String,
    Double,
    Int,
    Float,
    Date,
    Bool,
    Dictionary,
    /// A caller type reached through `cast` or the object builder.
    Custom(&'static str),
}

impl Target {
    pub fn name(&self) -> &'static str {
        match self {
            Target::String => "String",
            Target::Double => "Double",
            Target::Int => "Int",
            Target::Float => "Float",
            Target::Date => "Date",
            Target::Bool => "Bool",
            Target::Dictionary => "Dictionary",
            Target::Custom(name) => name,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoercionError {
    target: Target,
    message: String,
}

impl CoercionError {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            message: format!("failed to convert value to type {target}"),
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for CoercionError {}

impl From<CoercionError> for Error {
    fn from(err: CoercionError) -> Self {
        Error::new(ErrorKind::Coercion)
            .with_message(err.message().to_string())
            .with_source(err)
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Permission => 4,
        ErrorKind::Decode => 5,
        ErrorKind::Coercion => 6,
        ErrorKind::Io => 7,
    }
}

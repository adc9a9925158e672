//! Two-tier error model.
//!
//! `HvmlError` is the recoverable-error tier: set on a coroutine-local slot,
//! surfaceable to HVML via `$ERR`. `Exception` is the named-exception tier:
//! it propagates up the frame stack until caught by `<catch>` or a matching
//! `<except>` template. The two tiers are linked by
//! [`ErrorKind::default_exception`].

use crate::atom::Atom;
use thiserror::Error;

/// The full error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid value")]
    InvalidValue,
    #[error("wrong data type")]
    WrongDataType,
    #[error("argument missed")]
    ArgumentMissed,
    #[error("duplicated")]
    Duplicated,
    #[error("not implemented")]
    NotImplemented,
    #[error("not supported")]
    NotSupported,
    #[error("not allowed")]
    NotAllowed,
    #[error("not exists")]
    NotExists,
    #[error("access denied")]
    AccessDenied,
    #[error("entity not found")]
    EntityNotFound,
    #[error("internal failure")]
    InternalFailure,
    #[error("request failed")]
    RequestFailed,
    #[error("bad name")]
    BadName,
    #[error("no data")]
    NoData,
    #[error("too many")]
    TooMany,
    #[error("again")]
    Again,
    #[error("overflow")]
    Overflow,
    #[error("incomplete")]
    Incomplete,
}

impl ErrorKind {
    /// Whether this error distinguishes itself from the others by *not*
    /// unwinding the frame: `again` causes the current frame to re-enter
    /// `select_child` once data is available, rather than unwinding.
    pub fn is_again(&self) -> bool {
        matches!(self, ErrorKind::Again)
    }

    /// The default exception atom raised when an error of this kind is
    /// not handled `silently`.
    pub fn default_exception(&self) -> Atom {
        let name = match self {
            ErrorKind::OutOfMemory => "NoMemory",
            ErrorKind::InvalidValue => "InvalidValue",
            ErrorKind::WrongDataType => "WrongDataType",
            ErrorKind::ArgumentMissed => "ArgumentMissed",
            ErrorKind::Duplicated => "Duplicated",
            ErrorKind::NotImplemented => "NotImplemented",
            ErrorKind::NotSupported => "NotSupported",
            ErrorKind::NotAllowed => "NotAllowed",
            ErrorKind::NotExists => "NotExists",
            ErrorKind::AccessDenied => "AccessDenied",
            ErrorKind::EntityNotFound => "EntityNotFound",
            ErrorKind::InternalFailure => "InternalFailure",
            ErrorKind::RequestFailed => "RequestFailed",
            ErrorKind::BadName => "BadName",
            ErrorKind::NoData => "NoData",
            ErrorKind::TooMany => "TooMany",
            ErrorKind::Again => "Again",
            ErrorKind::Overflow => "Overflow",
            ErrorKind::Incomplete => "Incomplete",
        };
        Atom::new(name)
    }
}

/// A recoverable error, with the kind plus optional free-form context for
/// diagnostics (not part of the taxonomy proper, just a human-readable hint).
#[derive(Debug, Clone, Error)]
#[error("{kind}{}", context.as_deref().map(|c| format!(": {c}")).unwrap_or_default())]
pub struct HvmlError {
    pub kind: ErrorKind,
    pub context: Option<String>,
}

impl HvmlError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    pub fn with_context(kind: ErrorKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: Some(context.into()),
        }
    }
}

impl From<ErrorKind> for HvmlError {
    fn from(kind: ErrorKind) -> Self {
        HvmlError::new(kind)
    }
}

/// An interned, user-extensible exception name: purely atomic, domain
/// defined.
pub type Exception = Atom;

pub type Result<T> = std::result::Result<T, HvmlError>;

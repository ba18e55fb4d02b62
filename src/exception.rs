//! Exception types and the crate-wide fallible result alias.
//!
//! The non-local raise mechanism itself (unwinding a call stack to the
//! nearest handler) is an external collaborator's job; this crate models
//! "an exception is in flight" the idiomatic Rust way, with `Result` and
//! `?`, exactly as the object model's own design notes sanction.

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

/// The closed set of exception kinds this runtime core can raise.
///
/// A small subset of the original's exception hierarchy: just what the
/// operations in this crate actually produce.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
pub enum ExcType {
    AttributeError,
    IndexError,
    KeyError,
    NameError,
    TypeError,
    SyntaxError,
    StopIteration,
    ZeroDivisionError,
}

/// An argument substituted into an exception message template at a `{}`
/// slot.
///
/// Stands in for the original's printf-style vararg substitution
/// (`mp_obj_new_exception_msg_vlist`), which this crate has no varargs
/// mechanism to replicate literally.
#[derive(Debug, Clone)]
pub enum ExcArg {
    Str(String),
    Int(i64),
}

impl fmt::Display for ExcArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

/// A raised exception: a kind plus a fully-formatted message.
#[derive(Debug, Clone)]
pub struct SimpleException {
    pub kind: ExcType,
    pub message: String,
}

impl SimpleException {
    #[must_use]
    pub fn new_msg(kind: ExcType, message: String) -> Self {
        Self { kind, message }
    }

    /// Builds a message from a `{}`-slotted template and positional
    /// arguments, mirroring the original's printf-style substitution.
    #[must_use]
    pub fn new_fmt(kind: ExcType, template: &str, args: &[ExcArg]) -> Self {
        let mut message = String::with_capacity(template.len());
        let mut arg_iter = args.iter();
        let mut chars = template.char_indices().peekable();
        while let Some((_, c)) = chars.next() {
            if c == '{' && chars.peek().map(|&(_, c)| c) == Some('}') {
                chars.next();
                if let Some(arg) = arg_iter.next() {
                    message.push_str(&arg.to_string());
                }
            } else {
                message.push(c);
            }
        }
        Self { kind, message }
    }
}

impl fmt::Display for SimpleException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SimpleException {}

/// A raised runtime error: either a Python-visible exception or a
/// resource-limit violation from the embedding host.
#[derive(Debug, Clone)]
pub enum RunError {
    Exception(SimpleException),
    Resource(crate::resource::ResourceError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exception(exc) => write!(f, "{exc}"),
            Self::Resource(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<SimpleException> for RunError {
    fn from(exc: SimpleException) -> Self {
        Self::Exception(exc)
    }
}

impl From<crate::resource::ResourceError> for RunError {
    fn from(err: crate::resource::ResourceError) -> Self {
        Self::Resource(err)
    }
}

/// Crate-wide fallible result alias.
pub type RunResult<T> = Result<T, RunError>;

impl ExcType {
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> RunError {
        RunError::Exception(SimpleException::new_msg(Self::TypeError, message.into()))
    }

    #[must_use]
    pub fn attribute_error(message: impl Into<String>) -> RunError {
        RunError::Exception(SimpleException::new_msg(Self::AttributeError, message.into()))
    }

    #[must_use]
    pub fn index_error(message: impl Into<String>) -> RunError {
        RunError::Exception(SimpleException::new_msg(Self::IndexError, message.into()))
    }

    #[must_use]
    pub fn key_error(message: impl Into<String>) -> RunError {
        RunError::Exception(SimpleException::new_msg(Self::KeyError, message.into()))
    }

    #[must_use]
    pub fn name_error(message: impl Into<String>) -> RunError {
        RunError::Exception(SimpleException::new_msg(Self::NameError, message.into()))
    }

    #[must_use]
    pub fn zero_division_error(message: impl Into<String>) -> RunError {
        RunError::Exception(SimpleException::new_msg(Self::ZeroDivisionError, message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_substitutes_positional_args() {
        let exc = SimpleException::new_fmt(
            ExcType::TypeError,
            "bad operand type for abs(): '{}'",
            &[ExcArg::Str("NoneType".to_string())],
        );
        assert_eq!(exc.message, "bad operand type for abs(): 'NoneType'");
    }

    #[test]
    fn display_includes_kind_and_message() {
        let exc = SimpleException::new_msg(ExcType::KeyError, "'missing'".to_string());
        assert_eq!(exc.to_string(), "KeyError: 'missing'");
    }
}

use std::{error::Error as StdError, fmt, ops::Range};

#[cfg(feature = "miette")]
use miette::Diagnostic;
use prost::DecodeError;

/// An error that may occur while building, converting or parsing a [`DynamicMessage`](crate::DynamicMessage).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "miette", derive(Diagnostic), diagnostic(transparent))]
pub struct Error {
    kind: ErrorKind,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
#[non_exhaustive]
pub enum ErrorKind {
    /// A value does not fit the declared shape of the field it was assigned to.
    TypeMismatch {
        /// The full name of the field.
        field: String,
        /// A description of the accepted value.
        expected: String,
        /// A description of the value that was supplied.
        found: String,
    },
    /// An integer is outside of the range of the field's declared type.
    #[cfg_attr(
        feature = "miette",
        diagnostic(help("the value must fit in the declared field type"))
    )]
    NumericOverflow {
        /// The value that was supplied, as text.
        value: String,
        /// The name of the declared type.
        expected: String,
    },
    /// An enum value name could not be found in its enum type.
    UnresolvedEnumValue {
        /// The name that was looked up.
        name: String,
        /// The full name of the enum type.
        enum_name: String,
    },
    /// The protobuf binary input is invalid.
    MalformedWireData(DecodeError),
    /// The JSON input does not have the structure expected at this point.
    MalformedJson {
        /// A description of the expected token.
        expected: String,
        /// The token that was found instead.
        found: String,
        /// The location of the unexpected token in the input.
        #[cfg_attr(feature = "miette", label("found here"))]
        span: Range<usize>,
    },
    /// The JSON input contains data after the end of the top-level value.
    TrailingData {
        /// The text remaining after the top-level value.
        remainder: String,
        /// The location of the remaining text in the input.
        #[cfg_attr(feature = "miette", label("unexpected data"))]
        span: Range<usize>,
    },
    /// A required field is not set.
    MissingRequiredField {
        /// The dotted path to the field, relative to the message being validated.
        path: String,
    },
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Error { kind }
    }

    /// Gets the category of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn type_mismatch(
        field: impl ToString,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        Error::new(ErrorKind::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }

    pub(crate) fn numeric_overflow(value: impl ToString, expected: impl ToString) -> Self {
        Error::new(ErrorKind::NumericOverflow {
            value: value.to_string(),
            expected: expected.to_string(),
        })
    }

    pub(crate) fn unresolved_enum_value(name: impl ToString, enum_name: impl ToString) -> Self {
        Error::new(ErrorKind::UnresolvedEnumValue {
            name: name.to_string(),
            enum_name: enum_name.to_string(),
        })
    }

    pub(crate) fn malformed_json(
        expected: impl ToString,
        found: impl ToString,
        span: Range<usize>,
    ) -> Self {
        Error::new(ErrorKind::MalformedJson {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        })
    }

    pub(crate) fn trailing_data(remainder: impl ToString, span: Range<usize>) -> Self {
        Error::new(ErrorKind::TrailingData {
            remainder: remainder.to_string(),
            span,
        })
    }

    pub(crate) fn missing_required_field(path: impl ToString) -> Self {
        Error::new(ErrorKind::MissingRequiredField {
            path: path.to_string(),
        })
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::new(ErrorKind::MalformedWireData(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.kind.source()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "invalid value for field '{}': expected {}, but found {}",
                field, expected, found
            ),
            ErrorKind::NumericOverflow { value, expected } => {
                write!(f, "value {} is out of range for type {}", value, expected)
            }
            ErrorKind::UnresolvedEnumValue { name, enum_name } => {
                write!(f, "'{}' is not a value of enum '{}'", name, enum_name)
            }
            ErrorKind::MalformedWireData(_) => write!(f, "failed to decode protobuf message"),
            ErrorKind::MalformedJson {
                expected, found, ..
            } => write!(f, "expected {}, but found {}", expected, found),
            ErrorKind::TrailingData { remainder, .. } => {
                write!(f, "superfluous data found after JSON value: {:?}", remainder)
            }
            ErrorKind::MissingRequiredField { path } => {
                write!(f, "required field '{}' is not set", path)
            }
        }
    }
}

impl StdError for ErrorKind {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ErrorKind::MalformedWireData(err) => Some(err),
            _ => None,
        }
    }
}

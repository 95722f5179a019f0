use std::{error::Error, fmt};

/// An error that may occur while creating a [`DescriptorPool`](crate::DescriptorPool) or
/// populating an [`ExtensionRegistry`](crate::ExtensionRegistry).
#[derive(Debug)]
pub struct DescriptorError {
    kind: DescriptorErrorKind,
}

#[derive(Debug)]
enum DescriptorErrorKind {
    TypeNotFound { name: String, referenced_by: String },
    DuplicateName { name: String },
    DuplicateFieldNumber { message: String, number: u32 },
    UnknownSyntax { syntax: String },
    InvalidOneofIndex { field: String },
    InvalidMapEntry { message: String },
    InvalidDefaultValue { field: String, value: String },
    EmptyEnum { name: String },
    NotAnExtension { name: String },
    Decode { err: prost::DecodeError },
}

impl DescriptorError {
    pub(super) fn type_not_found(name: impl ToString, referenced_by: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::TypeNotFound {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            },
        }
    }

    pub(super) fn duplicate_name(name: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::DuplicateName {
                name: name.to_string(),
            },
        }
    }

    pub(super) fn duplicate_field_number(message: impl ToString, number: u32) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::DuplicateFieldNumber {
                message: message.to_string(),
                number,
            },
        }
    }

    pub(super) fn unknown_syntax(syntax: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::UnknownSyntax {
                syntax: syntax.to_string(),
            },
        }
    }

    pub(super) fn invalid_oneof_index(field: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::InvalidOneofIndex {
                field: field.to_string(),
            },
        }
    }

    pub(super) fn invalid_map_entry(message: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::InvalidMapEntry {
                message: message.to_string(),
            },
        }
    }

    pub(super) fn invalid_default_value(field: impl ToString, value: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::InvalidDefaultValue {
                field: field.to_string(),
                value: value.to_string(),
            },
        }
    }

    pub(super) fn empty_enum(name: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::EmptyEnum {
                name: name.to_string(),
            },
        }
    }

    pub(super) fn not_an_extension(name: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::NotAnExtension {
                name: name.to_string(),
            },
        }
    }

    pub(super) fn decode(err: prost::DecodeError) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::Decode { err },
        }
    }
}

impl Error for DescriptorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            DescriptorErrorKind::Decode { err } => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DescriptorErrorKind::TypeNotFound {
                name,
                referenced_by,
            } => write!(
                f,
                "the message or enum type '{}' referenced by '{}' was not found",
                name, referenced_by
            ),
            DescriptorErrorKind::DuplicateName { name } => {
                write!(f, "the name '{}' is defined multiple times", name)
            }
            DescriptorErrorKind::DuplicateFieldNumber { message, number } => write!(
                f,
                "the field number {} is used multiple times in message '{}'",
                number, message
            ),
            DescriptorErrorKind::UnknownSyntax { syntax } => {
                write!(f, "the syntax '{}' is not recognized", syntax)
            }
            DescriptorErrorKind::InvalidOneofIndex { field } => {
                write!(f, "the field '{}' has an invalid oneof index", field)
            }
            DescriptorErrorKind::InvalidMapEntry { message } => write!(
                f,
                "the map entry message '{}' must have a key field numbered 1 and a value field numbered 2",
                message
            ),
            DescriptorErrorKind::InvalidDefaultValue { field, value } => write!(
                f,
                "the default value '{}' is invalid for field '{}'",
                value, field
            ),
            DescriptorErrorKind::EmptyEnum { name } => {
                write!(f, "the enum '{}' has no values", name)
            }
            DescriptorErrorKind::NotAnExtension { name } => {
                write!(f, "the field '{}' is not an extension", name)
            }
            DescriptorErrorKind::Decode { .. } => {
                write!(f, "failed to decode file descriptor set")
            }
        }
    }
}

mod de;
mod lex;
mod reader;
mod ser;

use serde::ser::{Serialize, Serializer};

use crate::{DynamicMessage, Error, MessageDescriptor};

use self::reader::JsonReader;

/// Options to control encoding of messages as JSON.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    stringify_64_bit_integers: bool,
    use_enum_numbers: bool,
    use_proto_field_name: bool,
    emit_unpopulated_fields: bool,
    sort_map_keys: bool,
    pretty: bool,
}

/// Options to control decoding of messages from JSON.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    deny_unknown_fields: bool,
}

impl Serialize for DynamicMessage {
    /// Serialize this message into `serializer` using the [canonical JSON encoding](https://protobuf.dev/programming-guides/proto3/#json).
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.serialize_with_options(serializer, &Default::default())
    }
}

impl DynamicMessage {
    /// Serialize this message into `serializer` using the encoding specified by `options`.
    pub fn serialize_with_options<S>(
        &self,
        serializer: S,
        options: &EncodeOptions,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser::serialize_message(self, serializer, options)
    }

    /// Encodes this message as a JSON string using the default options.
    pub fn to_json(&self) -> serde_json::Result<String> {
        self.to_json_with_options(&EncodeOptions::default())
    }

    /// Encodes this message as a JSON string using the encoding specified by `options`.
    pub fn to_json_with_options(&self, options: &EncodeOptions) -> serde_json::Result<String> {
        let wrapper = ser::SerializeWrapper {
            value: self,
            options,
        };
        if options.pretty {
            serde_json::to_string_pretty(&wrapper)
        } else {
            serde_json::to_string(&wrapper)
        }
    }

    /// Decodes a message of type `desc` from JSON and checks its required fields.
    ///
    /// See [`parse_json`](Self::parse_json) for details.
    pub fn from_json(desc: MessageDescriptor, json: &str) -> Result<Self, Error> {
        let mut message = DynamicMessage::new(desc);
        message.parse_json(json)?;
        Ok(message)
    }

    /// Replaces the contents of this message with the message encoded in `json`, then checks
    /// that all required fields are set.
    ///
    /// Extension fields, written as `"[full.name]"` keys, are resolved through this message's
    /// [`registry`](Self::registry). A top-level `null` leaves the message empty. Anything but
    /// whitespace after the top-level value fails with
    /// [`ErrorKind::TrailingData`](crate::ErrorKind::TrailingData).
    pub fn parse_json(&mut self, json: &str) -> Result<(), Error> {
        prost::Message::clear(self);
        self.merge_json(json)?;
        self.validate()
    }

    /// Merges the message encoded in `json` into this message, without checking required fields.
    ///
    /// Fields present in `json` replace the current value of the field. On error, fields decoded
    /// before the error was found are kept.
    pub fn merge_json(&mut self, json: &str) -> Result<(), Error> {
        self.merge_json_with_options(json, &DecodeOptions::default())
    }

    /// Merges the message encoded in `json` into this message using the options in `options`.
    pub fn merge_json_with_options(
        &mut self,
        json: &str,
        options: &DecodeOptions,
    ) -> Result<(), Error> {
        let mut reader = JsonReader::new(json);
        de::merge_top_level(&mut reader, self, options)?;
        reader.finish()
    }
}

impl DecodeOptions {
    /// Creates a new instance of [`DecodeOptions`], with the default options.
    pub const fn new() -> Self {
        DecodeOptions {
            deny_unknown_fields: false,
        }
    }

    /// Whether to error during decoding when encountering unknown message fields.
    ///
    /// The default value is `false`, in which case unknown fields are skipped.
    pub const fn deny_unknown_fields(mut self, yes: bool) -> Self {
        self.deny_unknown_fields = yes;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeOptions {
    /// Creates a new instance of [`EncodeOptions`], with the default options chosen to conform to
    /// the standard JSON mapping.
    pub const fn new() -> Self {
        EncodeOptions {
            stringify_64_bit_integers: true,
            use_enum_numbers: false,
            use_proto_field_name: false,
            emit_unpopulated_fields: false,
            sort_map_keys: false,
            pretty: false,
        }
    }

    /// Whether to encode 64-bit integral types as strings.
    ///
    /// The JSON mapping encodes 64-bit integers as strings, to prevent loss of precision when the
    /// value cannot be represented exactly by a double. If this option is disabled, they are
    /// written as JSON numbers.
    ///
    /// The default value is `true`.
    pub const fn stringify_64_bit_integers(mut self, yes: bool) -> Self {
        self.stringify_64_bit_integers = yes;
        self
    }

    /// Whether to encode enum values as their numeric value.
    ///
    /// If `false`, enum values are written as the name of the value, unless the number is not
    /// declared in the enum type.
    ///
    /// The default value is `false`.
    pub const fn use_enum_numbers(mut self, yes: bool) -> Self {
        self.use_enum_numbers = yes;
        self
    }

    /// Whether to use the proto field name instead of the lowerCamelCase name in JSON field names.
    ///
    /// The default value is `false`.
    pub const fn use_proto_field_name(mut self, yes: bool) -> Self {
        self.use_proto_field_name = yes;
        self
    }

    /// Whether to include fields which do not track presence and hold their default value.
    ///
    /// Unset fields which track presence, such as message fields, are still omitted.
    ///
    /// The default value is `false`.
    pub const fn emit_unpopulated_fields(mut self, yes: bool) -> Self {
        self.emit_unpopulated_fields = yes;
        self
    }

    /// Whether to write map entries in key order, making the output deterministic.
    ///
    /// The default value is `false`.
    pub const fn sort_map_keys(mut self, yes: bool) -> Self {
        self.sort_map_keys = yes;
        self
    }

    /// Whether [`to_json_with_options`](DynamicMessage::to_json_with_options) indents its
    /// output. Has no effect on [`serialize_with_options`](DynamicMessage::serialize_with_options).
    ///
    /// The default value is `false`.
    pub const fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

//! Argument binding for dynamically shaped work items.
//!
//! A queue built with [`DispatchQueue::bound`](crate::DispatchQueue::bound)
//! carries [`serde_json::Value`] items and hands each one to the callback as
//! [`Args`], shaped by an [`ArgsMode`]:
//!
//! | Mode | Item shape | Callback receives |
//! |------|------------|-------------------|
//! | [`ArgsMode::Item`] | anything | [`Args::Item`] with the value untouched |
//! | [`ArgsMode::Positional`] | JSON array | [`Args::Positional`] with the elements |
//! | [`ArgsMode::Keyed`] | JSON object | [`Args::Keyed`] with the members |
//!
//! An item of the wrong shape is rejected with [`Error::InvalidArgument`]
//! rather than being passed through under a different binding.

use core::fmt;
use core::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::Error;

/// How a dequeued item is presented to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "ModeRepr")]
pub enum ArgsMode {
    /// The item is passed as a single argument.
    #[default]
    Item,
    /// The item must be a sequence and is unpacked positionally.
    Positional,
    /// The item must be a mapping and is unpacked by name.
    Keyed,
}

/// Arguments produced by binding an item under an [`ArgsMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    /// Single-argument binding.
    Item(Value),
    /// Positional arguments, in order.
    Positional(Vec<Value>),
    /// Named arguments.
    Keyed(Map<String, Value>),
}

impl ArgsMode {
    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            ArgsMode::Item => "item",
            ArgsMode::Positional => "positional",
            ArgsMode::Keyed => "keyed",
        }
    }

    /// Binds `item` according to this mode.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the item's shape does not fit the mode.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use sutils_dispatch::{Args, ArgsMode};
    ///
    /// let args = ArgsMode::Positional.bind(json!([1, "x"])).unwrap();
    /// assert_eq!(args, Args::Positional(vec![json!(1), json!("x")]));
    ///
    /// assert!(ArgsMode::Keyed.bind(json!([1, "x"])).is_err());
    /// ```
    pub fn bind(self, item: Value) -> Result<Args, Error> {
        match (self, item) {
            (ArgsMode::Item, value) => Ok(Args::Item(value)),
            (ArgsMode::Positional, Value::Array(values)) => Ok(Args::Positional(values)),
            (ArgsMode::Keyed, Value::Object(members)) => Ok(Args::Keyed(members)),
            (mode, other) => Err(Error::InvalidArgument(format!(
                "{mode} binding expects {}, got {}",
                mode.expected_shape(),
                shape_of(&other)
            ))),
        }
    }

    /// Returns `true` if [`bind`](Self::bind) would accept `item`.
    ///
    /// Bound queues only check shape on the consumer thread. This lets a
    /// producer refuse a malformed item before enqueuing it.
    pub fn accepts(self, item: &Value) -> bool {
        match self {
            ArgsMode::Item => true,
            ArgsMode::Positional => item.is_array(),
            ArgsMode::Keyed => item.is_object(),
        }
    }

    fn expected_shape(self) -> &'static str {
        match self {
            ArgsMode::Item => "any value",
            ArgsMode::Positional => "an array",
            ArgsMode::Keyed => "an object",
        }
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl fmt::Display for ArgsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArgsMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "item" => Ok(ArgsMode::Item),
            "positional" | "args" => Ok(ArgsMode::Positional),
            "keyed" | "kwargs" => Ok(ArgsMode::Keyed),
            _ => Err(Error::InvalidArgument(format!("unknown binding mode {s:?}"))),
        }
    }
}

impl TryFrom<u8> for ArgsMode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ArgsMode::Item),
            1 => Ok(ArgsMode::Positional),
            2 => Ok(ArgsMode::Keyed),
            _ => Err(Error::InvalidArgument(format!("unknown binding mode code {code}"))),
        }
    }
}

/// Wire form accepted when deserializing a mode: a name or a numeric code.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModeRepr {
    Name(String),
    Code(u8),
}

impl TryFrom<ModeRepr> for ArgsMode {
    type Error = Error;

    fn try_from(repr: ModeRepr) -> Result<Self, Self::Error> {
        match repr {
            ModeRepr::Name(name) => name.parse(),
            ModeRepr::Code(code) => ArgsMode::try_from(code),
        }
    }
}

impl Args {
    /// The mode that produced these arguments.
    pub fn mode(&self) -> ArgsMode {
        match self {
            Args::Item(_) => ArgsMode::Item,
            Args::Positional(_) => ArgsMode::Positional,
            Args::Keyed(_) => ArgsMode::Keyed,
        }
    }

    /// Number of arguments. A single item counts as one.
    pub fn len(&self) -> usize {
        match self {
            Args::Item(_) => 1,
            Args::Positional(values) => values.len(),
            Args::Keyed(members) => members.len(),
        }
    }

    /// Returns `true` for an empty positional or keyed binding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

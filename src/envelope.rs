//! Result Envelope
//!
//! Every array response, and every transport failure, is normalized into
//! an [`Envelope`]: `{"error": {"code", "description"}, "data": ...}`.
//! `code == 0` means the array accepted the call; any other code is
//! authoritative.
//!
//! Callers that tolerate a specific code must inspect it with
//! [`Envelope::code`] or [`Envelope::outcome`] *before* calling
//! [`Envelope::assert_success`].

use crate::constants::ERROR_CONNECT_TO_SERVER;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `error` member of an envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: i64,
    #[serde(default)]
    pub description: String,
}

/// Uniform response wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub error: ErrorInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Tagged view of an envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<'a> {
    Success { data: Option<&'a Value> },
    Failure { code: i64, description: &'a str },
}

impl Envelope {
    pub fn success(data: Option<Value>) -> Self {
        Self {
            error: ErrorInfo {
                code: 0,
                description: "0".to_string(),
            },
            data,
        }
    }

    pub fn failure(code: i64, description: impl Into<String>) -> Self {
        Self {
            error: ErrorInfo {
                code,
                description: description.into(),
            },
            data: None,
        }
    }

    pub fn code(&self) -> i64 {
        self.error.code
    }

    pub fn is_success(&self) -> bool {
        self.error.code == 0
    }

    pub fn outcome(&self) -> Outcome<'_> {
        match self.error.code {
            0 => Outcome::Success {
                data: self.data.as_ref(),
            },
            code => Outcome::Failure {
                code,
                description: &self.error.description,
            },
        }
    }

    /// Raise a domain error unless the array reported success
    pub fn assert_success(self, context: &str) -> Result<Envelope> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_error(context))
        }
    }

    /// Raise unless the envelope carries a `data` member
    pub fn assert_data(self, context: &str) -> Result<Value> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(Error::MissingData {
                message: context.to_string(),
                envelope: Box::new(self),
            }),
        }
    }

    /// Success assertion followed by data assertion and deserialization
    pub fn into_data<T: DeserializeOwned>(self, context: &str) -> Result<T> {
        let data = self.assert_success(context)?.assert_data(context)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Success assertion followed by list extraction; absent data is empty
    pub fn into_list<T: DeserializeOwned>(self, context: &str) -> Result<Vec<T>> {
        match self.assert_success(context)?.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => Ok(serde_json::from_value(data)?),
        }
    }

    /// Convert a failure envelope into the error matching its origin
    pub fn into_error(self, context: &str) -> Error {
        let code = self.error.code;
        let description = self.error.description.clone();
        tracing::error!("{}\nresult: {:?}.", context, self);

        if code == ERROR_CONNECT_TO_SERVER {
            return Error::Transport {
                message: context.to_string(),
                code,
                description,
            };
        }
        if let Ok(status) = u16::try_from(code) {
            if (400..600).contains(&status) {
                return Error::Protocol {
                    message: context.to_string(),
                    status,
                    description,
                };
            }
        }
        Error::Array {
            message: context.to_string(),
            code,
            description,
            envelope: Box::new(self),
        }
    }
}

/// Read a string field
pub(crate) fn field_str<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

/// Read an integer field the array may encode either as a number or a string
pub(crate) fn field_i64(item: &Value, key: &str) -> Option<i64> {
    match item.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

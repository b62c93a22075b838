use serde_json::Value;

use crate::step::Failure;

/// Payload contract for a successful reply, addressed by JSON pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Any 2xx is enough.
    Any,
    /// A `message` (or `status`) string at the top level.
    Message,
    /// A non-null value at the pointer.
    Field(&'static str),
    /// An array at the pointer; its length is reported.
    Array(&'static str),
}

impl Expect {
    /// Checks `body`, returning a short note for the report.
    pub fn check(
        &self,
        body: &Value,
    ) -> Result<String, Failure> {
        match self {
            Self::Any => Ok("ok".to_string()),
            Self::Message => {
                body.get("message")
                    .or_else(|| body.get("status"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| self.mismatch(body))
            },
            Self::Field(pointer) => {
                match body.pointer(pointer) {
                    Some(value) if !value.is_null() => Ok(format!("{pointer} present")),
                    _ => Err(self.mismatch(body)),
                }
            },
            Self::Array(pointer) => {
                body.pointer(pointer)
                    .and_then(Value::as_array)
                    .map(|items| format!("{} items", items.len()))
                    .ok_or_else(|| self.mismatch(body))
            },
        }
    }

    fn mismatch(
        &self,
        body: &Value,
    ) -> Failure {
        Failure::Shape {
            expected: self.to_string(),
            body: body.clone(),
        }
    }
}

impl std::fmt::Display for Expect {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any payload"),
            Self::Message => write!(f, "a status message"),
            Self::Field(pointer) => write!(f, "a value at {pointer}"),
            Self::Array(pointer) => write!(f, "an array at {pointer}"),
        }
    }
}

use super::*;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
  #[error("message has no `@type` tag")]
  MissingTypeUrl,
  #[error("failed to decode `{type_url}`: {message}")]
  Payload { type_url: String, message: String },
  #[error("event `{kind}` has no attribute `{key}`")]
  MissingAttribute { kind: String, key: String },
  #[error("event `{kind}` attribute `{key}` has invalid value `{value}`")]
  InvalidAttribute {
    kind: String,
    key: String,
    value: String,
  },
  #[error("expected event `{expected}`, found `{found}`")]
  UnexpectedEvent { expected: String, found: String },
  #[error("invalid coin `{0}`")]
  Coin(String),
  #[error("invalid status `{0}`")]
  Status(String),
  #[error("invalid duration `{0}`")]
  Duration(String),
  #[error("invalid address `{address}`: {message}")]
  Address { address: String, message: String },
}

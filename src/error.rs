use super::*;

/// How the main loop reacts to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  /// Retry the height with backoff.
  Transient,
  /// The height does not exist yet. Wait and retry.
  NotProduced,
  /// Stop the process.
  Fatal,
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum SnafuError {
  #[snafu(display("Invalid chain `{chain}`"))]
  InvalidChain { chain: String },
  #[snafu(display("Invalid event attribute encoding `{encoding}`"))]
  InvalidAttributeEncoding { encoding: String },
  #[snafu(display("Request to `{url}` failed"))]
  Transport { source: reqwest::Error, url: String },
  #[snafu(display("Node at `{url}` responded with error: {message}"))]
  Rpc { url: String, message: String },
  #[snafu(display("Malformed response from `{url}`: {message}"))]
  Malformed { url: String, message: String },
  #[snafu(display("Block {height} has not been produced yet"))]
  NotProduced { height: u64 },
  #[snafu(display("Failed to decode block {height}"))]
  Decode {
    source: hubtypes::DecodeError,
    height: u64,
  },
  #[snafu(display("Failed to decode `{kind}` in transaction `{tx_hash}` at height {height}"))]
  Payload {
    source: hubtypes::DecodeError,
    height: u64,
    tx_hash: String,
    kind: String,
  },
  #[snafu(display("Transaction {tx_hash} at height {height} has no `{kind}` event"))]
  MissingEvent {
    height: u64,
    tx_hash: String,
    kind: String,
  },
  #[snafu(display(
    "Transaction {tx_hash} at height {height} wraps sentinel messages in an authz exec"
  ))]
  UnsupportedExec { height: u64, tx_hash: String },
  #[snafu(display(
    "{collection} `{key}` already exists from height {existing:?}, refusing to create it again at height {height}"
  ))]
  Duplicate {
    collection: Collection,
    key: String,
    existing: Option<u64>,
    height: u64,
  },
  #[snafu(display("{collection} `{key}` does not exist"))]
  MissingDocument { collection: Collection, key: String },
  #[snafu(display("Deposit of `{address}` would go negative at height {height}"))]
  DepositUnderflow { address: String, height: u64 },
  #[snafu(display("Deposit of `{address}` would overflow at height {height}"))]
  DepositOverflow { address: String, height: u64 },
  #[snafu(display(
    "Checkpoint `{app_name}` is at height {current}, refusing to move it back to {height}"
  ))]
  CheckpointRegression {
    app_name: String,
    current: u64,
    height: u64,
  },
  #[snafu(display(
    "Checkpoint `{app_name}` is at height {current}, refusing to skip to {height}"
  ))]
  CheckpointGap {
    app_name: String,
    current: u64,
    height: u64,
  },
  #[snafu(display("Failed to serialize {collection} document"))]
  Serialize {
    source: serde_json::Error,
    collection: Collection,
  },
  #[snafu(display("Corrupt {collection} document `{key}`"))]
  Corrupt {
    source: serde_json::Error,
    collection: Collection,
    key: String,
  },
  #[snafu(display("{err}"))]
  Anyhow { err: anyhow::Error },
}

impl SnafuError {
  pub fn class(&self) -> ErrorClass {
    match self {
      Self::NotProduced { .. } => ErrorClass::NotProduced,
      Self::Transport { .. } | Self::Rpc { .. } | Self::Malformed { .. } => ErrorClass::Transient,
      Self::Anyhow { err } => classify(err),
      Self::InvalidChain { .. }
      | Self::InvalidAttributeEncoding { .. }
      | Self::Decode { .. }
      | Self::Payload { .. }
      | Self::MissingEvent { .. }
      | Self::UnsupportedExec { .. }
      | Self::Duplicate { .. }
      | Self::MissingDocument { .. }
      | Self::DepositUnderflow { .. }
      | Self::DepositOverflow { .. }
      | Self::CheckpointRegression { .. }
      | Self::CheckpointGap { .. }
      | Self::Serialize { .. }
      | Self::Corrupt { .. } => ErrorClass::Fatal,
    }
  }
}

/// Classifies an error raised anywhere in the fetch, decode, dispatch and apply
/// pipeline. Store failures are retried. Anything unrecognized is fatal.
pub fn classify(err: &Error) -> ErrorClass {
  if let Some(err) = err.downcast_ref::<SnafuError>() {
    return err.class();
  }

  if err.downcast_ref::<reqwest::Error>().is_some()
    || err.downcast_ref::<redb::StorageError>().is_some()
    || err.downcast_ref::<redb::TransactionError>().is_some()
    || err.downcast_ref::<redb::TableError>().is_some()
    || err.downcast_ref::<redb::CommitError>().is_some()
    || err.downcast_ref::<io::Error>().is_some()
  {
    return ErrorClass::Transient;
  }

  ErrorClass::Fatal
}

impl From<Error> for SnafuError {
  fn from(err: Error) -> SnafuError {
    Self::Anyhow { err }
  }
}

/// We currently use `anyhow` for error handling but are migrating to typed
/// errors using `snafu`. This trait exists to provide access to
/// `snafu::ResultExt::{context, with_context}`, which are otherwise shadowed
/// by `anyhow::Context::{context, with_context}`. Once the migration is
/// complete, this trait can be deleted, and `snafu::ResultExt` used directly.
pub(crate) trait ResultExt<T, E>: Sized {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E> {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat,
  {
    use snafu::ResultExt;
    self.context(context)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classes() {
    assert_eq!(
      SnafuError::NotProduced { height: 5 }.class(),
      ErrorClass::NotProduced
    );
    assert_eq!(
      SnafuError::Rpc {
        url: "http://x".into(),
        message: "boom".into()
      }
      .class(),
      ErrorClass::Transient
    );
    assert_eq!(
      SnafuError::MissingEvent {
        height: 1,
        tx_hash: "AB".into(),
        kind: "sentinel.plan.v2.EventCreate".into(),
      }
      .class(),
      ErrorClass::Fatal
    );
  }

  #[test]
  fn classify_through_context() {
    let err = Error::from(SnafuError::NotProduced { height: 9 }).context("fetching block");

    assert_eq!(classify(&err), ErrorClass::NotProduced);
  }

  #[test]
  fn classify_unknown_is_fatal() {
    assert_eq!(classify(&anyhow!("mystery")), ErrorClass::Fatal);
  }

  #[test]
  fn classify_io_is_transient() {
    let err = Error::from(io::Error::other("disk hiccup"));

    assert_eq!(classify(&err), ErrorClass::Transient);
  }

  #[test]
  fn display() {
    assert_eq!(
      SnafuError::Duplicate {
        collection: Collection::Nodes,
        key: "sentnode1abc".into(),
        existing: Some(100),
        height: 150,
      }
      .to_string(),
      "nodes `sentnode1abc` already exists from height Some(100), refusing to create it again at height 150"
    );
  }
}

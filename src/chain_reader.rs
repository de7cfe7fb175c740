use super::*;

pub use {
  http::HttpChain,
  raw::{
    RawAttribute, RawBlock, RawBlockBody, RawBlockId, RawCommit, RawCommitSignature, RawData,
    RawEvent, RawHeader, RawResults, RawTxResult, RawVersion,
  },
};

mod http;
mod raw;

/// Pure, side-effect free access to committed blocks. Implementations must be
/// safe to call from the prefetch thread.
pub trait ChainReader: Send + Sync {
  fn latest_height(&self) -> Result<u64>;

  /// The block at `height`. Fails with [`SnafuError::NotProduced`] if the
  /// chain has not reached it yet.
  fn block(&self, height: u64) -> Result<RawBlock>;

  fn execution_results(&self, height: u64) -> Result<RawResults>;
}

/// Point-in-time chain state queries.
pub trait ChainState: Send + Sync {
  fn node(&self, address: &str, height: u64) -> Result<Option<NodeState>>;
}

/// The parts of a node's on-chain record that events may omit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
  pub address: String,
  #[serde(default)]
  pub gigabyte_prices: Coins,
  #[serde(default)]
  pub hourly_prices: Coins,
  #[serde(default)]
  pub remote_url: String,
}

/// Upper case hex SHA-256 of a base64 encoded transaction.
pub fn tx_hash(encoded: &str) -> Result<String> {
  let bytes = base64::engine::general_purpose::STANDARD
    .decode(encoded)
    .context("transaction is not valid base64")?;

  Ok(hex::encode_upper(sha256::Hash::hash(&bytes).to_byte_array()))
}

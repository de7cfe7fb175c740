use super::*;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlockId {
  #[serde(default)]
  pub hash: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVersion {
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub block: u64,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub app: u64,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHeader {
  #[serde(default)]
  pub version: RawVersion,
  pub chain_id: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub height: u64,
  pub time: DateTime<Utc>,
  #[serde(default)]
  pub last_block_id: RawBlockId,
  #[serde(default)]
  pub last_commit_hash: String,
  #[serde(default)]
  pub data_hash: String,
  #[serde(default)]
  pub validators_hash: String,
  #[serde(default)]
  pub next_validators_hash: String,
  #[serde(default)]
  pub consensus_hash: String,
  #[serde(default)]
  pub app_hash: String,
  #[serde(default)]
  pub last_results_hash: String,
  #[serde(default)]
  pub evidence_hash: String,
  #[serde(default)]
  pub proposer_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawData {
  #[serde(default, deserialize_with = "null_as_default")]
  pub txs: Vec<String>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCommitSignature {
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub block_id_flag: i32,
  #[serde(default)]
  pub validator_address: String,
  pub timestamp: DateTime<Utc>,
  #[serde(default)]
  pub signature: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCommit {
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub height: u64,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub round: i32,
  #[serde(default)]
  pub block_id: RawBlockId,
  #[serde(default, deserialize_with = "null_as_default")]
  pub signatures: Vec<RawCommitSignature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlockBody {
  pub header: RawHeader,
  #[serde(default)]
  pub data: RawData,
  #[serde(default)]
  pub last_commit: Option<RawCommit>,
}

/// A block as served by the RPC `block` endpoint, plus the decoded
/// transactions served by the LCD, in block order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
  pub block_id: RawBlockId,
  pub block: RawBlockBody,
  #[serde(default)]
  pub txs: Vec<Value>,
}

impl RawBlock {
  pub fn height(&self) -> u64 {
    self.block.header.height
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttribute {
  pub key: String,
  #[serde(default)]
  pub value: Option<String>,
  #[serde(default)]
  pub index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub attributes: Vec<RawAttribute>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTxResult {
  #[serde(default)]
  pub code: u32,
  #[serde(default)]
  pub codespace: String,
  #[serde(default)]
  pub data: Option<String>,
  #[serde(default)]
  pub log: String,
  #[serde(default)]
  pub info: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub gas_wanted: i64,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub gas_used: i64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub events: Vec<RawEvent>,
}

/// The RPC `block_results` payload. Chains before CometBFT 0.38 report
/// begin and end block events. Later chains report a single list of
/// finalize block events tagged with a `mode` attribute.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResults {
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub height: u64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub txs_results: Vec<RawTxResult>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub begin_block_events: Vec<RawEvent>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub end_block_events: Vec<RawEvent>,
  #[serde(default)]
  pub finalize_block_events: Option<Vec<RawEvent>>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub validator_updates: Vec<Value>,
  #[serde(default)]
  pub consensus_param_updates: Option<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

use super::*;

pub type Document = Map<String, Value>;

/// A typed view of the documents in one collection.
pub trait Entry: Serialize + DeserializeOwned {
  const COLLECTION: Collection;

  fn load(key: &str, document: Document) -> Result<Self, SnafuError> {
    serde_json::from_value(Value::Object(document)).snafu_context(error::Corrupt {
      collection: Self::COLLECTION,
      key,
    })
  }

  fn store(&self) -> Result<Document, SnafuError> {
    match serde_json::to_value(self) {
      Ok(Value::Object(document)) => Ok(document),
      Ok(_) => Err(SnafuError::Serialize {
        source: <serde_json::Error as serde::ser::Error>::custom("document is not an object"),
        collection: Self::COLLECTION,
      }),
      Err(source) => Err(SnafuError::Serialize {
        source,
        collection: Self::COLLECTION,
      }),
    }
  }
}

/// An entry created once under a business key.
pub trait Unique: Entry {
  /// Field holding the height the document was created at. A create that
  /// finds an existing document with the same value is a replay.
  const PROVENANCE: &'static str;

  fn key(&self) -> String;

  fn height(&self) -> u64;
}

macro_rules! unique {
  ($type:ty, $collection:ident, $provenance:ident, |$this:ident| $key:expr) => {
    impl Entry for $type {
      const COLLECTION: Collection = Collection::$collection;
    }

    impl Unique for $type {
      const PROVENANCE: &'static str = stringify!($provenance);

      fn key(&self) -> String {
        let $this = self;
        $key
      }

      fn height(&self) -> u64 {
        self.$provenance
      }
    }
  };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
  pub height: u64,
  pub id: String,
  pub chain_id: String,
  pub time: DateTime<Utc>,
  pub version: String,
  pub num_txs: u64,
  /// Nanoseconds since the previous block.
  pub duration: i64,
  pub proposer_address: String,
  pub app_hash: String,
  pub consensus_hash: String,
  pub data_hash: String,
  pub evidence_hash: String,
  pub last_block_id: String,
  pub last_commit_hash: String,
  pub last_results_hash: String,
  pub next_validators_hash: String,
  pub validators_hash: String,
  pub begin_block_events: Vec<Event>,
  pub end_block_events: Vec<Event>,
  pub validator_updates: Vec<Value>,
  #[serde(default)]
  pub consensus_param_updates: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub round: Option<i32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub signatures: Option<Vec<RawCommitSignature>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commit_hash: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub results_hash: Option<String>,
}

unique!(BlockEntry, Blocks, height, |block| id_key(block.height));

impl BlockEntry {
  pub fn new(block: &Block) -> Self {
    let header = &block.header;

    Self {
      height: header.height,
      id: block.id.clone(),
      chain_id: header.chain_id.clone(),
      time: header.time,
      version: format!("{}.{}", header.version.block, header.version.app),
      num_txs: block.txs.len() as u64,
      duration: 0,
      proposer_address: header.proposer_address.clone(),
      app_hash: header.app_hash.clone(),
      consensus_hash: header.consensus_hash.clone(),
      data_hash: header.data_hash.clone(),
      evidence_hash: header.evidence_hash.clone(),
      last_block_id: header.last_block_id.hash.clone(),
      last_commit_hash: header.last_commit_hash.clone(),
      last_results_hash: header.last_results_hash.clone(),
      next_validators_hash: header.next_validators_hash.clone(),
      validators_hash: header.validators_hash.clone(),
      begin_block_events: block.begin_block_events.clone(),
      end_block_events: block.end_block_events.clone(),
      validator_updates: block.validator_updates.clone(),
      consensus_param_updates: block.consensus_param_updates.clone(),
      round: None,
      signatures: None,
      commit_hash: None,
      results_hash: None,
    }
  }
}

/// Fields of block `H - 1` that only become known with block `H`.
#[derive(Debug, Clone, PartialEq)]
pub struct Backfill {
  pub height: u64,
  pub round: i32,
  pub signatures: Vec<RawCommitSignature>,
  pub commit_hash: String,
  pub results_hash: String,
}

impl Backfill {
  pub fn new(block: &Block) -> Option<Self> {
    let commit = block.last_commit.as_ref()?;

    if commit.height == 0 || block.height() <= 1 {
      return None;
    }

    Some(Self {
      height: block.height() - 1,
      round: commit.round,
      signatures: commit.signatures.clone(),
      commit_hash: block.header.last_commit_hash.clone(),
      results_hash: block.header.last_results_hash.clone(),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxEntry {
  pub hash: String,
  pub height: u64,
  pub index: u32,
  pub timestamp: DateTime<Utc>,
  pub code: u32,
  pub codespace: String,
  pub log: String,
  pub info: String,
  pub gas_wanted: i64,
  pub gas_used: i64,
  pub gas_limit: u64,
  pub fee: Coins,
  pub payer: String,
  pub granter: String,
  pub memo: String,
  pub timeout_height: u64,
  pub signer_infos: Value,
  pub signatures: Value,
  pub messages: Vec<Message>,
  pub events: Vec<Event>,
}

unique!(TxEntry, Transactions, height, |tx| tx.hash.clone());

impl TxEntry {
  pub fn new(block: &Block, tx: &Tx) -> Self {
    let string = |pointer: &str| {
      tx.body
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
    };

    let number = |pointer: &str| {
      tx.body
        .pointer(pointer)
        .and_then(|value| match value {
          Value::String(s) => s.parse().ok(),
          value => value.as_u64(),
        })
        .unwrap_or_default()
    };

    Self {
      hash: tx.hash.clone(),
      height: block.height(),
      index: tx.index,
      timestamp: block.time(),
      code: tx.result.code,
      codespace: tx.result.codespace.clone(),
      log: tx.result.log.clone(),
      info: tx.result.info.clone(),
      gas_wanted: tx.result.gas_wanted,
      gas_used: tx.result.gas_used,
      gas_limit: number("/auth_info/fee/gas_limit"),
      fee: tx
        .body
        .pointer("/auth_info/fee/amount")
        .and_then(|amount| serde_json::from_value(amount.clone()).ok())
        .unwrap_or_default(),
      payer: string("/auth_info/fee/payer"),
      granter: string("/auth_info/fee/granter"),
      memo: string("/body/memo"),
      timeout_height: number("/body/timeout_height"),
      signer_infos: tx
        .body
        .pointer("/auth_info/signer_infos")
        .cloned()
        .unwrap_or(Value::Null),
      signatures: tx.body.get("signatures").cloned().unwrap_or(Value::Null),
      messages: tx.messages.clone(),
      events: tx.result.events.clone(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
  pub addr: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub provider: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price: Option<Coins>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gigabyte_prices: Option<Coins>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hourly_prices: Option<Coins>,
  #[serde(default)]
  pub remote_url: String,
  pub register_height: u64,
  pub register_timestamp: DateTime<Utc>,
  pub register_tx_hash: String,
  pub status: Status,
  #[serde(default)]
  pub status_height: u64,
  #[serde(default)]
  pub status_timestamp: DateTime<Utc>,
  #[serde(default)]
  pub status_tx_hash: String,
}

unique!(NodeEntry, Nodes, register_height, |node| node.addr.clone());

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
  pub addr: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub identity: String,
  #[serde(default)]
  pub website: String,
  #[serde(default)]
  pub description: String,
  pub register_height: u64,
  pub register_timestamp: DateTime<Utc>,
  pub register_tx_hash: String,
  pub status: Status,
  #[serde(default)]
  pub status_height: u64,
  #[serde(default)]
  pub status_timestamp: DateTime<Utc>,
  #[serde(default)]
  pub status_tx_hash: String,
}

unique!(ProviderEntry, Providers, register_height, |provider| provider
  .addr
  .clone());

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
  pub id: u64,
  pub prov_addr: String,
  #[serde(default)]
  pub prices: Coins,
  /// Validity in nanoseconds.
  #[serde(default)]
  pub duration: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gigabytes: Option<i64>,
  #[serde_as(as = "Option<DisplayFromStr>")]
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bytes: Option<u128>,
  #[serde(default)]
  pub node_addrs: Vec<String>,
  pub create_height: u64,
  pub create_timestamp: DateTime<Utc>,
  pub create_tx_hash: String,
  pub status: Status,
  #[serde(default)]
  pub status_height: u64,
  #[serde(default)]
  pub status_timestamp: DateTime<Utc>,
  #[serde(default)]
  pub status_tx_hash: String,
}

unique!(PlanEntry, Plans, create_height, |plan| id_key(plan.id));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
  pub id: u64,
  pub subscription_id: u64,
  #[serde(default)]
  pub acc_addr: String,
  pub node_addr: String,
  #[serde(default)]
  pub bandwidth: Bandwidth,
  /// Nanoseconds.
  #[serde(default)]
  pub duration: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub payment: Option<Coin>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub staking_reward: Option<Coin>,
  #[serde(default)]
  pub rating: u64,
  pub start_height: u64,
  pub start_timestamp: DateTime<Utc>,
  pub start_tx_hash: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_height: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_timestamp: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_tx_hash: Option<String>,
  pub status: Status,
  #[serde(default)]
  pub status_height: u64,
  #[serde(default)]
  pub status_timestamp: DateTime<Utc>,
  #[serde(default)]
  pub status_tx_hash: String,
}

unique!(SessionEntry, Sessions, start_height, |session| id_key(
  session.id
));

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionEntry {
  pub id: u64,
  pub acc_addr: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub node_addr: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plan_id: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub denom: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price: Option<Coin>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deposit: Option<Coin>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gigabytes: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hours: Option<i64>,
  #[serde_as(as = "Option<DisplayFromStr>")]
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub free: Option<u128>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub payment: Option<Coin>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub staking_reward: Option<Coin>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub refund: Option<Coin>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inactive_at: Option<DateTime<Utc>>,
  pub start_height: u64,
  pub start_timestamp: DateTime<Utc>,
  pub start_tx_hash: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_height: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_timestamp: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_tx_hash: Option<String>,
  pub status: Status,
  #[serde(default)]
  pub status_height: u64,
  #[serde(default)]
  pub status_timestamp: DateTime<Utc>,
  #[serde(default)]
  pub status_tx_hash: String,
}

unique!(SubscriptionEntry, Subscriptions, start_height, |subscription| {
  id_key(subscription.id)
});

/// A subscription's byte allocation to one account. The first generation
/// called these quotas.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
  pub id: u64,
  pub acc_addr: String,
  #[serde_as(as = "DisplayFromStr")]
  pub granted_bytes: u128,
  #[serde_as(as = "DisplayFromStr")]
  pub utilised_bytes: u128,
  pub height: u64,
}

unique!(AllocationEntry, SubscriptionAllocations, height, |allocation| {
  allocation_key(allocation.id, &allocation.acc_addr)
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepositEntry {
  pub addr: String,
  pub coins: Coins,
  pub height: u64,
  pub timestamp: DateTime<Utc>,
  pub tx_hash: String,
  /// Log key of the last delta applied.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub watermark: Option<String>,
}

unique!(DepositEntry, Deposits, height, |deposit| deposit.addr.clone());

/// A payment to a node out of a subscription. Append only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutEntry {
  pub id: u64,
  pub acc_addr: String,
  pub node_addr: String,
  pub payment: Coin,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub staking_reward: Option<Coin>,
  pub height: u64,
  pub timestamp: DateTime<Utc>,
  pub tx_hash: String,
}

impl Entry for PayoutEntry {
  const COLLECTION: Collection = Collection::SubscriptionPayouts;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositAction {
  Add,
  Subtract,
}

/// One deposit balance change. Append only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositEventEntry {
  pub addr: String,
  pub action: DepositAction,
  pub coins: Coins,
  pub height: u64,
  pub timestamp: DateTime<Utc>,
  pub tx_hash: String,
}

impl Entry for DepositEventEntry {
  const COLLECTION: Collection = Collection::DepositEvents;
}

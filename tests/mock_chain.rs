use {
  super::*,
  base64::Engine,
  bitcoin::bech32::{Bech32, Hrp},
  chrono::{DateTime, TimeDelta, Utc},
  explorer::{
    chain_reader::{ChainReader, ChainState, RawBlock, RawResults},
    error::SnafuError,
  },
  std::{
    collections::BTreeMap,
    sync::{
      Mutex,
      atomic::{AtomicU32, Ordering},
    },
  },
};

pub(crate) fn account(byte: u8) -> String {
  address("sent", byte)
}

pub(crate) fn node(byte: u8) -> String {
  address("sentnode", byte)
}

fn address(prefix: &str, byte: u8) -> String {
  bitcoin::bech32::encode::<Bech32>(Hrp::parse(prefix).unwrap(), &[byte; 20]).unwrap()
}

pub(crate) fn time(height: u64) -> DateTime<Utc> {
  "2023-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
    + TimeDelta::seconds(height.try_into().unwrap())
}

/// A chain event in RPC form, with attribute values JSON quoted the way the
/// hub emits them.
pub(crate) fn event(kind: &str, attributes: &[(&str, &str)]) -> Value {
  json!({
    "type": kind,
    "attributes": attributes
      .iter()
      .map(|(key, value)| json!({"key": key, "value": format!("\"{value}\"")}))
      .collect::<Vec<Value>>(),
  })
}

/// A transaction body and its execution result.
pub(crate) struct MockTx {
  body: Value,
  result: Value,
}

pub(crate) fn tx(messages: Vec<Value>, events: Vec<Value>) -> MockTx {
  MockTx {
    body: json!({"body": {"messages": messages, "memo": ""}}),
    result: json!({"code": 0, "log": "", "events": events}),
  }
}

impl MockTx {
  pub(crate) fn failed(self) -> Self {
    Self {
      result: json!({"code": 5, "log": "insufficient funds", "events": []}),
      ..self
    }
  }
}

#[derive(Default)]
pub(crate) struct MockChain {
  blocks: Mutex<BTreeMap<u64, (RawBlock, RawResults)>>,
  failures: AtomicU32,
  nodes: Mutex<BTreeMap<String, NodeState>>,
}

impl MockChain {
  pub(crate) fn push(&self, height: u64, txs: Vec<MockTx>, end_block_events: Vec<Value>) {
    let encoded = (0..txs.len())
      .map(|i| base64::engine::general_purpose::STANDARD.encode(format!("tx-{height}-{i}")))
      .collect::<Vec<String>>();

    let block = serde_json::from_value::<RawBlock>(json!({
      "block_id": {"hash": format!("BLOCK{height}")},
      "block": {
        "header": {
          "version": {"block": "11", "app": "0"},
          "chain_id": "sentinelhub-2",
          "height": height.to_string(),
          "time": time(height),
          "last_block_id": {"hash": format!("BLOCK{}", height - 1)},
          "last_commit_hash": format!("COMMIT{}", height - 1),
          "last_results_hash": format!("RESULTS{}", height - 1),
          "proposer_address": "PROPOSER",
        },
        "data": {"txs": encoded},
        "last_commit": {
          "height": (height - 1).to_string(),
          "round": 0,
          "block_id": {"hash": format!("BLOCK{}", height - 1)},
          "signatures": [{
            "block_id_flag": 2,
            "validator_address": "VALIDATOR",
            "timestamp": time(height - 1),
            "signature": "c2ln",
          }],
        },
      },
      "txs": txs.iter().map(|tx| tx.body.clone()).collect::<Vec<Value>>(),
    }))
    .unwrap();

    let results = serde_json::from_value::<RawResults>(json!({
      "height": height.to_string(),
      "txs_results": txs.iter().map(|tx| tx.result.clone()).collect::<Vec<Value>>(),
      "begin_block_events": [],
      "end_block_events": end_block_events,
    }))
    .unwrap();

    self.blocks.lock().unwrap().insert(height, (block, results));
  }

  /// The next `count` fetches fail with a transient error.
  pub(crate) fn fail(&self, count: u32) {
    self.failures.store(count, Ordering::SeqCst);
  }

  pub(crate) fn set_node(&self, node: NodeState) {
    self.nodes.lock().unwrap().insert(node.address.clone(), node);
  }

  pub(crate) fn raw(&self, height: u64) -> (RawBlock, RawResults) {
    self.blocks.lock().unwrap()[&height].clone()
  }
}

impl ChainReader for MockChain {
  fn latest_height(&self) -> anyhow::Result<u64> {
    Ok(
      self
        .blocks
        .lock()
        .unwrap()
        .last_key_value()
        .map(|(height, _)| *height)
        .unwrap_or_default(),
    )
  }

  fn block(&self, height: u64) -> anyhow::Result<RawBlock> {
    if self
      .failures
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |failures| {
        failures.checked_sub(1)
      })
      .is_ok()
    {
      return Err(
        SnafuError::Rpc {
          url: "mock".into(),
          message: format!("connection reset fetching block {height}"),
        }
        .into(),
      );
    }

    self
      .blocks
      .lock()
      .unwrap()
      .get(&height)
      .map(|(block, _)| block.clone())
      .ok_or_else(|| SnafuError::NotProduced { height }.into())
  }

  fn execution_results(&self, height: u64) -> anyhow::Result<RawResults> {
    self
      .blocks
      .lock()
      .unwrap()
      .get(&height)
      .map(|(_, results)| results.clone())
      .ok_or_else(|| SnafuError::NotProduced { height }.into())
  }
}

impl ChainState for MockChain {
  fn node(&self, address: &str, _height: u64) -> anyhow::Result<Option<NodeState>> {
    Ok(self.nodes.lock().unwrap().get(address).cloned())
  }
}

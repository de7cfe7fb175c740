use {
  self::{
    command_builder::CommandBuilder,
    mock_chain::{MockChain, account, event, node, tx},
  },
  explorer::{
    Schedule, Updater,
    chain_reader::NodeState,
    decoder::{AttributeEncoding, Decoder},
    index::{Collection, Document, Index, allocation_key, id_key},
  },
  serde_json::{Value, json},
  std::{
    sync::Arc,
    thread,
    time::Duration,
  },
  tempfile::TempDir,
};

mod mock_chain;


/// An index in a temporary directory plus a schedule that never sleeps.
struct Harness {
  chain: Arc<MockChain>,
  index: Index,
  _tempdir: TempDir,
}

impl Harness {
  fn new() -> Self {
    let tempdir = TempDir::new().unwrap();

    Self {
      chain: Arc::new(MockChain::default()),
      index: Index::open_with_path(&tempdir.path().join("index.redb"), 1 << 20).unwrap(),
      _tempdir: tempdir,
    }
  }

  fn schedule(&self, from_height: u64, to_height: u64) -> Schedule {
    Schedule {
      app_name: "explorer".into(),
      chain_id: "sentinelhub-2".into(),
      encoding: AttributeEncoding::Plain,
      from_height,
      to_height: Some(to_height),
      poll_interval: Duration::from_millis(10),
      max_backoff: Duration::ZERO,
      retry_limit: Some(3),
      v2_height: 0,
    }
  }

  fn updater(&self, schedule: Schedule) -> Updater<'_> {
    Updater::new(&self.index, schedule, self.chain.clone(), self.chain.clone())
  }

  fn update(&self, from_height: u64, to_height: u64) -> anyhow::Result<u64> {
    self
      .updater(self.schedule(from_height, to_height))
      .update_index()
  }

  fn get(&self, collection: Collection, key: &str) -> Value {
    Value::Object(
      self
        .index
        .get(collection, key)
        .unwrap()
        .unwrap_or_else(|| panic!("{collection} `{key}` not found")),
    )
  }

  fn checkpoint(&self) -> Option<u64> {
    self
      .index
      .checkpoint("explorer")
      .unwrap()
      .map(|checkpoint| checkpoint.height)
  }

  /// Every document in the index.
  fn snapshot(&self) -> Vec<(Collection, Vec<(String, Document)>)> {
    Collection::ALL
      .into_iter()
      .map(|collection| (collection, self.index.documents(collection).unwrap()))
      .collect()
  }
}

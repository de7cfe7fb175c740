use {
  super::*,
  redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
  },
};

pub use self::{
  checkpoint::CheckpointEntry,
  dispatch::{Context, Cursor, Dispatcher, Registry},
  entry::{
    AllocationEntry, Backfill, BlockEntry, DepositAction, DepositEntry, DepositEventEntry, Document, Entry,
    NodeEntry, PayoutEntry, PlanEntry, ProviderEntry, SessionEntry, SubscriptionEntry, TxEntry,
    Unique,
  },
  event::{EventEntry, EventKind},
  operation::{fields, Operation, Pricing, Stamp, Target},
};

pub mod checkpoint;
pub mod dispatch;
pub mod entry;
pub mod event;
pub mod operation;
pub mod updater;

macro_rules! define_table {
  ($name:ident) => {
    const $name: TableDefinition<&str, &[u8]> = TableDefinition::new(stringify!($name));
  };
}

define_table! { BLOCKS }
define_table! { CHECKPOINTS }
define_table! { DEPOSITS }
define_table! { DEPOSIT_EVENTS }
define_table! { EVENTS }
define_table! { NODES }
define_table! { PLANS }
define_table! { PROVIDERS }
define_table! { SESSIONS }
define_table! { SUBSCRIPTIONS }
define_table! { SUBSCRIPTION_ALLOCATIONS }
define_table! { SUBSCRIPTION_PAYOUTS }
define_table! { TRANSACTIONS }

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, clap::ValueEnum, Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
  #[display("blocks")]
  Blocks,
  #[display("checkpoints")]
  Checkpoints,
  #[display("deposits")]
  Deposits,
  #[display("deposit events")]
  DepositEvents,
  #[display("events")]
  Events,
  #[display("nodes")]
  Nodes,
  #[display("plans")]
  Plans,
  #[display("providers")]
  Providers,
  #[display("sessions")]
  Sessions,
  #[display("subscriptions")]
  Subscriptions,
  #[display("subscription allocations")]
  SubscriptionAllocations,
  #[display("subscription payouts")]
  SubscriptionPayouts,
  #[display("transactions")]
  Transactions,
}

impl Collection {
  pub const ALL: [Collection; 13] = [
    Self::Blocks,
    Self::Checkpoints,
    Self::Deposits,
    Self::DepositEvents,
    Self::Events,
    Self::Nodes,
    Self::Plans,
    Self::Providers,
    Self::Sessions,
    Self::Subscriptions,
    Self::SubscriptionAllocations,
    Self::SubscriptionPayouts,
    Self::Transactions,
  ];

  /// Whether documents are keyed by [`id_key`].
  pub fn numeric_keys(self) -> bool {
    matches!(
      self,
      Self::Blocks | Self::Plans | Self::Sessions | Self::Subscriptions
    )
  }

  pub(crate) fn table(self) -> TableDefinition<'static, &'static str, &'static [u8]> {
    match self {
      Self::Blocks => BLOCKS,
      Self::Checkpoints => CHECKPOINTS,
      Self::Deposits => DEPOSITS,
      Self::DepositEvents => DEPOSIT_EVENTS,
      Self::Events => EVENTS,
      Self::Nodes => NODES,
      Self::Plans => PLANS,
      Self::Providers => PROVIDERS,
      Self::Sessions => SESSIONS,
      Self::Subscriptions => SUBSCRIPTIONS,
      Self::SubscriptionAllocations => SUBSCRIPTION_ALLOCATIONS,
      Self::SubscriptionPayouts => SUBSCRIPTION_PAYOUTS,
      Self::Transactions => TRANSACTIONS,
    }
  }
}

/// Key of a document identified by a height or a numeric id. Zero padded so
/// keys sort numerically.
pub fn id_key(id: u64) -> String {
  format!("{id:020}")
}

/// Key of an append-only log row: the block height and the position of the
/// writing operation within the block.
pub fn log_key(height: u64, sequence: u64) -> String {
  format!("{height:020}-{sequence:06}")
}

pub fn allocation_key(id: u64, address: &str) -> String {
  format!("{id:020}/{address}")
}

/// Reads a document inside a write transaction.
pub(crate) fn find(
  wtx: &WriteTransaction,
  collection: Collection,
  key: &str,
) -> Result<Option<Document>> {
  let table = wtx.open_table(collection.table())?;

  let Some(guard) = table.get(key)? else {
    return Ok(None);
  };

  Ok(Some(decode_document(collection, key, guard.value())?))
}

/// Writes a whole document inside a write transaction.
pub(crate) fn put(
  wtx: &WriteTransaction,
  collection: Collection,
  key: &str,
  document: &Document,
) -> Result {
  let bytes = serde_json::to_vec(document)
    .map_err(|source| SnafuError::Serialize { source, collection })?;

  wtx
    .open_table(collection.table())?
    .insert(key, bytes.as_slice())?;

  Ok(())
}

fn decode_document(collection: Collection, key: &str, bytes: &[u8]) -> Result<Document, SnafuError> {
  serde_json::from_slice(bytes).snafu_context(error::Corrupt { collection, key })
}

#[derive(Serialize)]
pub struct Info {
  pub index_path: PathBuf,
  pub checkpoints: Vec<CheckpointEntry>,
  pub collections: BTreeMap<String, u64>,
}

pub struct Index {
  database: Database,
  path: PathBuf,
}

impl Index {
  pub fn open(settings: &Settings) -> Result<Self> {
    Self::open_with_path(&settings.index(), settings.index_cache_size())
  }

  pub fn open_with_path(path: &Path, cache_size: usize) -> Result<Self> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create index directory `{}`", parent.display()))?;
    }

    log::info!("Opening index at `{}`", path.display());

    let database = Database::builder()
      .set_cache_size(cache_size)
      .create(path)
      .with_context(|| format!("failed to open index `{}`", path.display()))?;

    let wtx = database.begin_write()?;

    for collection in Collection::ALL {
      wtx.open_table(collection.table())?;
    }

    wtx.commit()?;

    Ok(Self {
      database,
      path: path.into(),
    })
  }

  pub(crate) fn begin_write(&self) -> Result<WriteTransaction> {
    Ok(self.database.begin_write()?)
  }

  pub fn get(&self, collection: Collection, key: &str) -> Result<Option<Document>> {
    let rtx = self.database.begin_read()?;

    let table = rtx.open_table(collection.table())?;

    let Some(guard) = table.get(key)? else {
      return Ok(None);
    };

    Ok(Some(decode_document(collection, key, guard.value())?))
  }

  pub fn entry<E: Entry>(&self, key: &str) -> Result<Option<E>> {
    self
      .get(E::COLLECTION, key)?
      .map(|document| E::load(key, document))
      .transpose()
      .map_err(Error::from)
  }

  /// Every document of a collection in key order.
  pub fn documents(&self, collection: Collection) -> Result<Vec<(String, Document)>> {
    let rtx = self.database.begin_read()?;

    let table = rtx.open_table(collection.table())?;

    let mut documents = Vec::new();

    for result in table.iter()? {
      let (key, value) = result?;
      let key = key.value().to_string();
      let document = decode_document(collection, &key, value.value())?;
      documents.push((key, document));
    }

    Ok(documents)
  }

  pub fn entries<E: Entry>(&self) -> Result<Vec<E>> {
    self
      .documents(E::COLLECTION)?
      .into_iter()
      .map(|(key, document)| E::load(&key, document).map_err(Error::from))
      .collect()
  }

  pub fn count(&self, collection: Collection) -> Result<u64> {
    let rtx = self.database.begin_read()?;
    Ok(rtx.open_table(collection.table())?.len()?)
  }

  pub fn checkpoint(&self, app_name: &str) -> Result<Option<CheckpointEntry>> {
    self.entry::<CheckpointEntry>(app_name)
  }

  pub fn info(&self) -> Result<Info> {
    let mut collections = BTreeMap::new();

    for collection in Collection::ALL {
      collections.insert(collection.to_string(), self.count(collection)?);
    }

    Ok(Info {
      index_path: self.path.clone(),
      checkpoints: self.entries::<CheckpointEntry>()?,
      collections,
    })
  }
}

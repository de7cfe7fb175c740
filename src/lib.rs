#![allow(clippy::too_many_arguments, clippy::large_enum_variant)]

use {
  self::{
    arguments::Arguments,
    chain::Chain,
    chain_reader::{
      ChainReader, ChainState, HttpChain, NodeState, RawBlock, RawCommit, RawCommitSignature,
      RawEvent, RawHeader, RawResults, RawTxResult, tx_hash,
    },
    decoder::{AttributeEncoding, Block, Decoder, MessageLog, Tx, TxResult},
    error::{ErrorClass, ResultExt, SnafuError, classify},
    index::{
      AllocationEntry, Backfill, BlockEntry, CheckpointEntry, Collection, Context, Cursor,
      DepositAction, DepositEntry, DepositEventEntry, Dispatcher, Document, Entry, EventEntry,
      EventKind, Index, NodeEntry, Operation, PayoutEntry, PlanEntry, Pricing, ProviderEntry,
      Registry, SessionEntry, Stamp, SubscriptionEntry, Target, TxEntry, Unique,
      allocation_key, find, id_key, log_key, put,
    },
    options::Options,
    subcommand::{OutputFormat, Subcommand, SubcommandResult},
  },
  anyhow::{Context as _, Error, anyhow, bail},
  base64::Engine,
  bitcoin::hashes::{sha256, Hash},
  chrono::{DateTime, Utc},
  clap::Parser,
  hubtypes::{
    Bandwidth, Coin, Coins, DecodeError, Event, Message, NODE_PREFIX, PROVIDER_PREFIX, Status,
    TypedEvent, TypedMessage, convert_address,
  },
  redb::WriteTransaction,
  regex::Regex,
  serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned},
  serde_json::{Map, Value, json},
  serde_with::{DisplayFromStr, PickFirst, serde_as},
  snafu::Snafu,
  std::{
    collections::{BTreeMap, HashMap},
    env,
    fmt::{self, Display, Formatter},
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    process,
    str::FromStr,
    sync::{
      Arc, LazyLock,
      atomic::{self, AtomicBool},
    },
    thread,
    time::{Duration, Instant},
  },
  sysinfo::System,
};

pub use self::{
  index::updater::{Schedule, Updater},
  settings::Settings,
};

pub mod arguments;
pub mod chain;
pub mod chain_reader;
pub mod decoder;
pub mod error;
pub mod index;
pub mod options;
pub mod settings;
pub mod subcommand;

type Result<T = (), E = Error> = std::result::Result<T, E>;

static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);

fn default<T: Default>() -> T {
  Default::default()
}

/// Requests a graceful stop. The main loop finishes the height it is
/// applying and returns.
pub fn shut_down() {
  SHUTTING_DOWN.store(true, atomic::Ordering::Relaxed);
}

pub fn main() {
  env_logger::init();

  ctrlc::set_handler(move || {
    if SHUTTING_DOWN.swap(true, atomic::Ordering::Relaxed) {
      process::exit(1);
    }

    eprintln!("Shutting down gracefully. Press <CTRL-C> again to shutdown immediately.");
  })
  .expect("Error setting <CTRL-C> handler");

  let args = Arguments::parse();

  let format = args.options.format;

  match args.run() {
    Err(err) => {
      eprintln!("error: {err}");

      if let Some(err) = err.downcast_ref::<SnafuError>() {
        snafu::ErrorCompat::iter_chain(err)
          .skip(1)
          .for_each(|err| eprintln!("because: {err}"));
      } else {
        err
          .chain()
          .skip(1)
          .for_each(|cause| eprintln!("because: {cause}"));
      }

      if env::var_os("RUST_BACKTRACE")
        .map(|val| val == "1")
        .unwrap_or_default()
      {
        eprintln!("{}", err.backtrace());
      }

      process::exit(1);
    }
    Ok(output) => {
      if let Some(output) = output {
        output.print(format.unwrap_or_default());
      }
    }
  }
}

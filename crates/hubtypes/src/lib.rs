//! Types for interoperating with the Sentinel hub: coins, statuses, message and
//! event envelopes, and the typed messages and events of both module
//! generations.

use {
  bitcoin::bech32::{self, Bech32, Hrp},
  chrono::{DateTime, Utc},
  serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned},
  serde_json::Value,
  serde_with::{DeserializeFromStr, DisplayFromStr, PickFirst, SerializeDisplay, serde_as},
  std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    str::FromStr,
    time::Duration,
  },
  thiserror::Error,
};

pub use {
  address::{ACCOUNT_PREFIX, NODE_PREFIX, PROVIDER_PREFIX, convert_address},
  bandwidth::Bandwidth,
  coin::{Coin, Coins},
  envelope::{Event, Message, unquote},
  error::DecodeError,
  proto_duration::ProtoDuration,
  status::Status,
  typed::{TypedEvent, TypedMessage},
};

/// Type URL of the authz wrapper message.
pub const MSG_EXEC: &str = "/cosmos.authz.v1beta1.MsgExec";

fn default<T: Default>() -> T {
  Default::default()
}

mod address;
mod bandwidth;
mod coin;
pub mod deposit;
mod envelope;
mod error;
mod proto_duration;
mod status;
mod typed;
pub mod v1;
pub mod v2;

use super::*;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgRegister {
  pub from: String,
  #[serde(default)]
  pub gigabyte_prices: Coins,
  #[serde(default)]
  pub hourly_prices: Coins,
  #[serde(default)]
  pub remote_url: String,
}

message!(MsgRegister, "sentinel.node.v2", "Register");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgUpdateDetails {
  pub from: String,
  #[serde(default)]
  pub gigabyte_prices: Coins,
  #[serde(default)]
  pub hourly_prices: Coins,
  #[serde(default)]
  pub remote_url: String,
}

message!(MsgUpdateDetails, "sentinel.node.v2", "UpdateDetails");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgUpdateStatus {
  pub from: String,
  pub status: Status,
}

message!(MsgUpdateStatus, "sentinel.node.v2", "UpdateStatus");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgSubscribe {
  pub from: String,
  pub node_address: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub gigabytes: i64,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub hours: i64,
  pub denom: String,
}

message!(MsgSubscribe, "sentinel.node.v2", "Subscribe");

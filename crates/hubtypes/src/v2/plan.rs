use super::*;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgCreate {
  pub from: String,
  #[serde(default)]
  pub duration: ProtoDuration,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub gigabytes: i64,
  #[serde(default)]
  pub prices: Coins,
}

message!(MsgCreate, "sentinel.plan.v2", "Create");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgUpdateStatus {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub status: Status,
}

message!(MsgUpdateStatus, "sentinel.plan.v2", "UpdateStatus");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgLinkNode {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  #[serde(alias = "address")]
  pub node_address: String,
}

message!(MsgLinkNode, "sentinel.plan.v2", "LinkNode");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgUnlinkNode {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  #[serde(alias = "address")]
  pub node_address: String,
}

message!(MsgUnlinkNode, "sentinel.plan.v2", "UnlinkNode");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgSubscribe {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub denom: String,
}

message!(MsgSubscribe, "sentinel.plan.v2", "Subscribe");

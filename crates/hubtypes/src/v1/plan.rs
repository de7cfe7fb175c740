use super::*;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgAdd {
  pub from: String,
  #[serde(default)]
  pub price: Coins,
  pub validity: ProtoDuration,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub bytes: u128,
}

message!(MsgAdd, "sentinel.plan.v1", "Add");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgSetStatus {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub status: Status,
}

message!(MsgSetStatus, "sentinel.plan.v1", "SetStatus");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgAddNode {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub address: String,
}

message!(MsgAddNode, "sentinel.plan.v1", "AddNode");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgRemoveNode {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub address: String,
}

message!(MsgRemoveNode, "sentinel.plan.v1", "RemoveNode");

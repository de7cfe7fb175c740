use super::*;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgCancel {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
}

message!(MsgCancel, "sentinel.subscription.v2", "Cancel");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgAllocate {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub address: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub bytes: u128,
}

message!(MsgAllocate, "sentinel.subscription.v2", "Allocate");

use super::*;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgStart {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub address: String,
}

message!(MsgStart, "sentinel.session.v2", "Start");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Proof {
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  #[serde(default)]
  pub duration: ProtoDuration,
  #[serde(default)]
  pub bandwidth: Bandwidth,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgUpdateDetails {
  pub from: String,
  pub proof: Proof,
  #[serde(default)]
  pub signature: Option<String>,
}

impl TypedMessage for MsgUpdateDetails {
  const TYPE_URLS: &'static [&'static str] = &[
    "/sentinel.session.v2.MsgUpdateDetailsRequest",
    "/sentinel.session.v2.MsgService/MsgUpdateDetails",
    "/sentinel.session.v2.MsgService/MsgUpdate",
  ];
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgEnd {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub rating: u64,
}

message!(MsgEnd, "sentinel.session.v2", "End");

use super::*;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgStart {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub node: String,
}

message!(MsgStart, "sentinel.session.v1", "Start");

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
pub struct MsgUpdate {
  pub from: String,
  pub proof: Proof,
  #[serde(default)]
  pub signature: Option<String>,
}

message!(MsgUpdate, "sentinel.session.v1", "Update");

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

message!(MsgEnd, "sentinel.session.v1", "End");

#[cfg(test)]
mod tests {
  use {super::*, serde_json::json};

  #[test]
  fn update() {
    let message = Message::from_json(json!({
      "@type": "/sentinel.session.v1.MsgUpdateRequest",
      "from": "sentnode1abc",
      "proof": {
        "id": "12",
        "duration": "60s",
        "bandwidth": {"upload": "100", "download": "200"},
      },
      "signature": null,
    }))
    .unwrap();

    let update = MsgUpdate::from_message(&message).unwrap();

    assert_eq!(update.proof.id, 12);
    assert_eq!(update.proof.duration.as_nanos(), 60_000_000_000);
    assert_eq!(update.proof.bandwidth.total(), 300);
  }
}

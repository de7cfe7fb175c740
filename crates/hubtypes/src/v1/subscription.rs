use super::*;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgSubscribeToNode {
  pub from: String,
  pub address: String,
  pub deposit: Coin,
}

message!(MsgSubscribeToNode, "sentinel.subscription.v1", "SubscribeToNode");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgSubscribeToPlan {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub denom: String,
}

message!(MsgSubscribeToPlan, "sentinel.subscription.v1", "SubscribeToPlan");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgCancel {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
}

message!(MsgCancel, "sentinel.subscription.v1", "Cancel");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgAddQuota {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub address: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub bytes: u128,
}

message!(MsgAddQuota, "sentinel.subscription.v1", "AddQuota");

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgUpdateQuota {
  pub from: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub id: u64,
  pub address: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub bytes: u128,
}

message!(MsgUpdateQuota, "sentinel.subscription.v1", "UpdateQuota");

#[cfg(test)]
mod tests {
  use {super::*, serde_json::json};

  #[test]
  fn subscribe_to_node() {
    let message = Message::from_json(json!({
      "@type": "/sentinel.subscription.v1.MsgSubscribeToNodeRequest",
      "from": "sent1abc",
      "address": "sentnode1xyz",
      "deposit": {"denom": "udvpn", "amount": "1000"},
    }))
    .unwrap();

    assert_eq!(
      MsgSubscribeToNode::from_message(&message).unwrap(),
      MsgSubscribeToNode {
        from: "sent1abc".into(),
        address: "sentnode1xyz".into(),
        deposit: Coin::new(1000, "udvpn"),
      }
    );
  }

  #[test]
  fn wrong_payload() {
    let message = Message::from_json(json!({
      "@type": "/sentinel.subscription.v1.MsgCancelRequest",
      "from": "sent1abc",
      "id": "not a number",
    }))
    .unwrap();

    assert!(matches!(
      MsgCancel::from_message(&message),
      Err(DecodeError::Payload { .. })
    ));
  }
}

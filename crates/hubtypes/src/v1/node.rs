use super::*;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgRegister {
  pub from: String,
  #[serde(default)]
  pub provider: String,
  #[serde(default)]
  pub price: Coins,
  #[serde(default)]
  pub remote_url: String,
}

message!(MsgRegister, "sentinel.node.v1", "Register");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgUpdate {
  pub from: String,
  #[serde(default)]
  pub provider: String,
  #[serde(default)]
  pub price: Coins,
  #[serde(default)]
  pub remote_url: String,
}

message!(MsgUpdate, "sentinel.node.v1", "Update");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgSetStatus {
  pub from: String,
  pub status: Status,
}

message!(MsgSetStatus, "sentinel.node.v1", "SetStatus");

#[cfg(test)]
mod tests {
  use {super::*, serde_json::json};

  #[test]
  fn register() {
    let message = Message::from_json(json!({
      "@type": "/sentinel.node.v1.MsgRegisterRequest",
      "from": "sent1abc",
      "provider": "",
      "price": [{"denom": "udvpn", "amount": "100"}],
      "remote_url": "https://1.2.3.4:8585",
    }))
    .unwrap();

    assert_eq!(
      MsgRegister::from_message(&message).unwrap(),
      MsgRegister {
        from: "sent1abc".into(),
        provider: String::new(),
        price: Coins::from(Coin::new(100, "udvpn")),
        remote_url: "https://1.2.3.4:8585".into(),
      }
    );
  }

  #[test]
  fn set_status() {
    let message = Message::from_json(json!({
      "@type": "/sentinel.node.v1.MsgService/MsgSetStatus",
      "from": "sentnode1abc",
      "status": "STATUS_ACTIVE",
    }))
    .unwrap();

    assert_eq!(
      MsgSetStatus::from_message(&message).unwrap().status,
      Status::Active
    );
  }
}

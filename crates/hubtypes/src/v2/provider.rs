use super::*;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgRegister {
  pub from: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub identity: String,
  #[serde(default)]
  pub website: String,
  #[serde(default)]
  pub description: String,
}

message!(MsgRegister, "sentinel.provider.v2", "Register");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgUpdate {
  pub from: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub identity: String,
  #[serde(default)]
  pub website: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub status: Status,
}

message!(MsgUpdate, "sentinel.provider.v2", "Update");

#[cfg(test)]
mod tests {
  use {super::*, serde_json::json};

  #[test]
  fn update_without_status() {
    let message = Message::from_json(json!({
      "@type": "/sentinel.provider.v2.MsgUpdateRequest",
      "from": "sentprov1abc",
      "name": "acme",
    }))
    .unwrap();

    let update = MsgUpdate::from_message(&message).unwrap();

    assert_eq!(update.name, "acme");
    assert!(!update.status.is_specified());
  }
}

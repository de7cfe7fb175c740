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

message!(MsgRegister, "sentinel.provider.v1", "Register");

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
}

message!(MsgUpdate, "sentinel.provider.v1", "Update");

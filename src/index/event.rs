use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize, Deserialize)]
pub enum EventKind {
  #[display("Deposit.Add")]
  #[serde(rename = "Deposit.Add")]
  DepositAdd,
  #[display("Deposit.Subtract")]
  #[serde(rename = "Deposit.Subtract")]
  DepositSubtract,
  #[display("Node.UpdateDetails")]
  #[serde(rename = "Node.UpdateDetails")]
  NodeUpdateDetails,
  #[display("Node.UpdateStatus")]
  #[serde(rename = "Node.UpdateStatus")]
  NodeUpdateStatus,
  #[display("Plan.UpdateStatus")]
  #[serde(rename = "Plan.UpdateStatus")]
  PlanUpdateStatus,
  #[display("Plan.LinkNode")]
  #[serde(rename = "Plan.LinkNode")]
  PlanLinkNode,
  #[display("Plan.UnlinkNode")]
  #[serde(rename = "Plan.UnlinkNode")]
  PlanUnlinkNode,
  #[display("Provider.UpdateDetails")]
  #[serde(rename = "Provider.UpdateDetails")]
  ProviderUpdateDetails,
  #[display("Session.UpdateDetails")]
  #[serde(rename = "Session.UpdateDetails")]
  SessionUpdateDetails,
  #[display("Session.UpdateStatus")]
  #[serde(rename = "Session.UpdateStatus")]
  SessionUpdateStatus,
  #[display("Subscription.UpdateDetails")]
  #[serde(rename = "Subscription.UpdateDetails")]
  SubscriptionUpdateDetails,
  #[display("Subscription.UpdateStatus")]
  #[serde(rename = "Subscription.UpdateStatus")]
  SubscriptionUpdateStatus,
  #[display("SubscriptionAllocation.UpdateDetails")]
  #[serde(rename = "SubscriptionAllocation.UpdateDetails")]
  SubscriptionAllocationUpdateDetails,
}

/// An audit record of one domain mutation. Only the fields the mutation
/// touched are set.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntry {
  #[serde(rename = "type")]
  pub kind: EventKind,
  pub height: u64,
  pub timestamp: DateTime<Utc>,
  #[serde(default)]
  pub tx_hash: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub acc_addr: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub node_addr: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prov_addr: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plan_id: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub session_id: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subscription_id: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<Status>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub coins: Option<Coins>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price: Option<Coins>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gigabyte_prices: Option<Coins>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hourly_prices: Option<Coins>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remote_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub identity: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub website: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bandwidth: Option<Bandwidth>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub duration: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub payment: Option<Coin>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub staking_reward: Option<Coin>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub refund: Option<Coin>,
  #[serde_as(as = "Option<DisplayFromStr>")]
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub free: Option<u128>,
  #[serde_as(as = "Option<DisplayFromStr>")]
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub granted_bytes: Option<u128>,
  #[serde_as(as = "Option<DisplayFromStr>")]
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub utilised_bytes: Option<u128>,
}

impl Entry for EventEntry {
  const COLLECTION: Collection = Collection::Events;
}

impl EventEntry {
  pub fn new(kind: EventKind, stamp: &Stamp) -> Self {
    Self {
      kind,
      height: stamp.height,
      timestamp: stamp.timestamp,
      tx_hash: stamp.tx_hash.clone(),
      acc_addr: None,
      node_addr: None,
      prov_addr: None,
      plan_id: None,
      session_id: None,
      subscription_id: None,
      status: None,
      coins: None,
      price: None,
      gigabyte_prices: None,
      hourly_prices: None,
      remote_url: None,
      name: None,
      identity: None,
      website: None,
      description: None,
      bandwidth: None,
      duration: None,
      payment: None,
      staking_reward: None,
      refund: None,
      free: None,
      granted_bytes: None,
      utilised_bytes: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq, serde_json::json};

  #[test]
  fn kind_display() {
    assert_eq!(EventKind::NodeUpdateStatus.to_string(), "Node.UpdateStatus");
    assert_eq!(
      EventKind::SubscriptionAllocationUpdateDetails.to_string(),
      "SubscriptionAllocation.UpdateDetails"
    );
  }

  #[test]
  fn sparse_document() {
    let stamp = Stamp {
      height: 101,
      timestamp: "2023-01-01T00:00:00Z".parse().unwrap(),
      tx_hash: "AB".into(),
    };

    let event = EventEntry {
      node_addr: Some("sentnode1abc".into()),
      status: Some(Status::Active),
      ..EventEntry::new(EventKind::NodeUpdateStatus, &stamp)
    };

    assert_eq!(
      Value::Object(event.store().unwrap()),
      json!({
        "type": "Node.UpdateStatus",
        "height": 101,
        "timestamp": "2023-01-01T00:00:00Z",
        "tx_hash": "AB",
        "node_addr": "sentnode1abc",
        "status": "active",
      })
    );
  }
}

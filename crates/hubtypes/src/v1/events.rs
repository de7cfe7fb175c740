use super::*;

macro_rules! event {
  ($type:ty, $kind:literal) => {
    impl TypedEvent for $type {
      const KIND: &'static str = $kind;

      fn decode(event: &Event) -> Result<Self, DecodeError> {
        Self::parse(event)
      }
    }
  };
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSetNodeStatus {
  pub address: String,
  pub status: Status,
}

impl EventSetNodeStatus {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      address: event.parse("address")?,
      status: event.parse("status")?,
    })
  }
}

event!(EventSetNodeStatus, "sentinel.node.v1.EventSetNodeStatus");

#[derive(Debug, Clone, PartialEq)]
pub struct EventAddPlan {
  pub id: u64,
}

impl EventAddPlan {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      id: event.parse("id")?,
    })
  }
}

event!(EventAddPlan, "sentinel.plan.v1.EventAdd");

#[derive(Debug, Clone, PartialEq)]
pub struct EventStartSession {
  pub id: u64,
}

impl EventStartSession {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      id: event.parse("id")?,
    })
  }
}

event!(EventStartSession, "sentinel.session.v1.EventStartSession");

#[derive(Debug, Clone, PartialEq)]
pub struct EventEndSession {
  pub id: u64,
  pub status: Status,
}

impl EventEndSession {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      id: event.parse("id")?,
      status: event.parse_optional("status")?.unwrap_or(Status::InactivePending),
    })
  }
}

event!(EventEndSession, "sentinel.session.v1.EventEndSession");

#[derive(Debug, Clone, PartialEq)]
pub struct EventPay {
  pub id: u64,
  pub payment: Coin,
  pub staking_reward: Option<Coin>,
}

impl EventPay {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      id: event.parse("id")?,
      payment: event.parse("payment")?,
      staking_reward: event.parse_optional("staking_reward")?,
    })
  }
}

event!(EventPay, "sentinel.session.v1.EventPay");

#[derive(Debug, Clone, PartialEq)]
pub struct EventSubscribeToNode {
  pub id: u64,
  pub owner: String,
  pub node: String,
  pub price: Option<Coin>,
  pub deposit: Coin,
}

impl EventSubscribeToNode {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      id: event.parse("id")?,
      owner: event.parse("owner")?,
      node: event.parse("node")?,
      price: event.parse_optional("price")?,
      deposit: event.parse("deposit")?,
    })
  }
}

event!(
  EventSubscribeToNode,
  "sentinel.subscription.v1.EventSubscribeToNode"
);

#[derive(Debug, Clone, PartialEq)]
pub struct EventSubscribeToPlan {
  pub id: u64,
  pub owner: String,
  pub plan: u64,
  pub payment: Option<Coin>,
  pub expiry: Option<DateTime<Utc>>,
}

impl EventSubscribeToPlan {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      id: event.parse("id")?,
      owner: event.parse("owner")?,
      plan: event.parse_any(&["plan", "plan_id"])?,
      payment: match event.parse_optional("payment")? {
        Some(payment) => Some(payment),
        None => event.parse_optional("price")?,
      },
      expiry: match event.get("expiry") {
        Some(_) => Some(event.time("expiry")?),
        None => None,
      },
    })
  }
}

event!(
  EventSubscribeToPlan,
  "sentinel.subscription.v1.EventSubscribeToPlan"
);

/// Shared shape of the quota add and update events.
#[derive(Debug, Clone, PartialEq)]
pub struct Quota {
  pub id: u64,
  pub address: String,
  pub allocated: u128,
  pub consumed: u128,
  pub free: Option<u128>,
}

impl Quota {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      id: event.parse("id")?,
      address: event.parse("address")?,
      allocated: event.parse("allocated")?,
      consumed: event.parse_optional("consumed")?.unwrap_or_default(),
      free: event.parse_optional("free")?,
    })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventAddQuota(pub Quota);

impl EventAddQuota {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Quota::parse(event).map(Self)
  }
}

event!(EventAddQuota, "sentinel.subscription.v1.EventAddQuota");

#[derive(Debug, Clone, PartialEq)]
pub struct EventUpdateQuota(pub Quota);

impl EventUpdateQuota {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Quota::parse(event).map(Self)
  }
}

event!(EventUpdateQuota, "sentinel.subscription.v1.EventUpdateQuota");

#[derive(Debug, Clone, PartialEq)]
pub struct EventCancelSubscription {
  pub id: u64,
  pub status: Status,
}

impl EventCancelSubscription {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      id: event.parse("id")?,
      status: event
        .parse_optional("status")?
        .unwrap_or(Status::InactivePending),
    })
  }
}

event!(
  EventCancelSubscription,
  "sentinel.subscription.v1.EventCancelSubscription"
);

#[derive(Debug, Clone, PartialEq)]
pub struct EventRefund {
  pub id: u64,
  pub refund: Coin,
}

impl EventRefund {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      id: event.parse("id")?,
      refund: event.parse_any(&["refund", "amount"])?,
    })
  }
}

event!(EventRefund, "sentinel.subscription.v1.EventRefund");

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  #[test]
  fn subscribe_to_node() {
    let event = Event::new(
      "sentinel.subscription.v1.EventSubscribeToNode",
      [
        ("id", "\"9\""),
        ("owner", "\"sent1abc\""),
        ("node", "\"sentnode1xyz\""),
        ("price", r#"{"denom":"udvpn","amount":"10"}"#),
        ("deposit", r#"{"denom":"udvpn","amount":"1000"}"#),
      ],
    );

    assert_eq!(
      EventSubscribeToNode::from_event(&event).unwrap(),
      EventSubscribeToNode {
        id: 9,
        owner: "sent1abc".into(),
        node: "sentnode1xyz".into(),
        price: Some(Coin::new(10, "udvpn")),
        deposit: Coin::new(1000, "udvpn"),
      }
    );
  }

  #[test]
  fn quota() {
    let event = Event::new(
      "sentinel.subscription.v1.EventAddQuota",
      [
        ("id", "4"),
        ("address", "sent1abc"),
        ("allocated", "1000"),
        ("consumed", "0"),
      ],
    );

    assert_eq!(
      EventAddQuota::from_event(&event).unwrap(),
      EventAddQuota(Quota {
        id: 4,
        address: "sent1abc".into(),
        allocated: 1000,
        consumed: 0,
        free: None,
      })
    );
  }

  #[test]
  fn missing_attribute() {
    let event = Event::new("sentinel.node.v1.EventSetNodeStatus", [("address", "x")]);

    assert_eq!(
      EventSetNodeStatus::from_event(&event).unwrap_err(),
      DecodeError::MissingAttribute {
        kind: "sentinel.node.v1.EventSetNodeStatus".into(),
        key: "status".into(),
      }
    );
  }

  #[test]
  fn subscribe_to_plan_expiry() {
    let event = Event::new(
      "sentinel.subscription.v1.EventSubscribeToPlan",
      [
        ("id", "2"),
        ("owner", "sent1abc"),
        ("plan", "5"),
        ("price", "100udvpn"),
        ("expiry", "2022-06-01T00:00:00Z"),
      ],
    );

    let subscribe = EventSubscribeToPlan::from_event(&event).unwrap();

    assert_eq!(subscribe.plan, 5);
    assert_eq!(subscribe.payment, Some(Coin::new(100, "udvpn")));
    assert!(subscribe.expiry.is_some());
  }
}

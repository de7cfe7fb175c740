use super::*;

macro_rules! event {
  ($type:ident, $kind:literal { $($field:ident: $value:expr),* $(,)? }) => {
    impl TypedEvent for $type {
      const KIND: &'static str = $kind;

      fn decode(event: &Event) -> Result<Self, DecodeError> {
        Ok($type { $($field: $value(event)?),* })
      }
    }
  };
}

fn required<T: FromStr>(key: &'static str) -> impl Fn(&Event) -> Result<T, DecodeError> {
  move |event| event.parse(key)
}

fn optional<T: FromStr>(key: &'static str) -> impl Fn(&Event) -> Result<Option<T>, DecodeError> {
  move |event| event.parse_optional(key)
}

fn any<T: FromStr>(keys: &'static [&'static str]) -> impl Fn(&Event) -> Result<T, DecodeError> {
  move |event| event.parse_any(keys)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventCreateSubscription {
  pub address: String,
  pub node_address: String,
  pub id: u64,
}

event!(EventCreateSubscription, "sentinel.node.v2.EventCreateSubscription" {
  address: required("address"),
  node_address: required("node_address"),
  id: required("id"),
});

/// Node details change. Older chains emit only the address, in which case
/// the details have to be queried.
#[derive(Debug, Clone, PartialEq)]
pub struct EventUpdateDetails {
  pub address: String,
  pub gigabyte_prices: Option<Coins>,
  pub hourly_prices: Option<Coins>,
  pub remote_url: Option<String>,
}

impl EventUpdateDetails {
  pub fn is_address_only(&self) -> bool {
    self.gigabyte_prices.is_none() && self.hourly_prices.is_none() && self.remote_url.is_none()
  }
}

event!(EventUpdateDetails, "sentinel.node.v2.EventUpdateDetails" {
  address: required("address"),
  gigabyte_prices: optional("gigabyte_prices"),
  hourly_prices: optional("hourly_prices"),
  remote_url: optional("remote_url"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventNodeUpdateStatus {
  pub address: String,
  pub status: Status,
}

event!(EventNodeUpdateStatus, "sentinel.node.v2.EventUpdateStatus" {
  address: required("address"),
  status: required("status"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventCreatePlan {
  pub address: String,
  pub id: u64,
}

event!(EventCreatePlan, "sentinel.plan.v2.EventCreate" {
  address: required("address"),
  id: required("id"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventCreatePlanSubscription {
  pub address: String,
  pub provider_address: Option<String>,
  pub id: u64,
  pub plan_id: u64,
}

event!(EventCreatePlanSubscription, "sentinel.plan.v2.EventCreateSubscription" {
  address: required("address"),
  provider_address: optional("provider_address"),
  id: required("id"),
  plan_id: required("plan_id"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventStart {
  pub address: String,
  pub node_address: String,
  pub id: u64,
  pub plan_id: Option<u64>,
  pub subscription_id: u64,
}

event!(EventStart, "sentinel.session.v2.EventStart" {
  address: required("address"),
  node_address: required("node_address"),
  id: required("id"),
  plan_id: optional("plan_id"),
  subscription_id: required("subscription_id"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventSessionUpdateStatus {
  pub id: u64,
  pub status: Status,
}

event!(EventSessionUpdateStatus, "sentinel.session.v2.EventUpdateStatus" {
  id: required("id"),
  status: required("status"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventAllocate {
  pub address: String,
  pub granted_bytes: u128,
  pub utilised_bytes: u128,
  pub id: u64,
}

event!(EventAllocate, "sentinel.subscription.v2.EventAllocate" {
  address: required("address"),
  granted_bytes: required("granted_bytes"),
  utilised_bytes: required("utilised_bytes"),
  id: required("id"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventPayForPlan {
  pub address: String,
  pub payment: Coin,
  pub provider_address: Option<String>,
  pub staking_reward: Option<Coin>,
  pub id: u64,
}

event!(EventPayForPlan, "sentinel.subscription.v2.EventPayForPlan" {
  address: required("address"),
  payment: required("payment"),
  provider_address: optional("provider_address"),
  staking_reward: optional("staking_reward"),
  id: required("id"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventPayForPayout {
  pub address: String,
  pub node_address: String,
  pub payment: Coin,
  pub staking_reward: Option<Coin>,
  pub id: u64,
}

event!(EventPayForPayout, "sentinel.subscription.v2.EventPayForPayout" {
  address: required("address"),
  node_address: required("node_address"),
  payment: required("payment"),
  staking_reward: optional("staking_reward"),
  id: required("id"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventPayForSession {
  pub address: String,
  pub node_address: String,
  pub payment: Coin,
  pub staking_reward: Option<Coin>,
  pub session_id: u64,
  pub subscription_id: Option<u64>,
}

event!(EventPayForSession, "sentinel.subscription.v2.EventPayForSession" {
  address: required("address"),
  node_address: required("node_address"),
  payment: required("payment"),
  staking_reward: optional("staking_reward"),
  session_id: any(&["session_id", "id"]),
  subscription_id: optional("subscription_id"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventRefund {
  pub address: String,
  pub amount: Coin,
  pub id: u64,
}

event!(EventRefund, "sentinel.subscription.v2.EventRefund" {
  address: required("address"),
  amount: any(&["amount", "refund"]),
  id: required("id"),
});

#[derive(Debug, Clone, PartialEq)]
pub struct EventSubscriptionUpdateStatus {
  pub id: u64,
  pub status: Status,
}

event!(EventSubscriptionUpdateStatus, "sentinel.subscription.v2.EventUpdateStatus" {
  id: required("id"),
  status: required("status"),
});

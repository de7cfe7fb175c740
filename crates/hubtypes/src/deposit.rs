//! Deposit module events. Both module generations emit these.

use super::*;

/// A deposit balance change. `previous` is the balance before the change,
/// when the chain reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositChange {
  pub address: String,
  pub coins: Coins,
  pub previous: Option<Coins>,
}

impl DepositChange {
  fn parse(event: &Event) -> Result<Self, DecodeError> {
    Ok(Self {
      address: event.parse("address")?,
      coins: event.parse("coins")?,
      previous: event.parse_optional("previous")?,
    })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventAdd(pub DepositChange);

impl TypedEvent for EventAdd {
  const KIND: &'static str = "sentinel.deposit.v1.EventAdd";

  fn decode(event: &Event) -> Result<Self, DecodeError> {
    DepositChange::parse(event).map(Self)
  }
}

impl EventAdd {
  /// The balance after the change, if it can be derived from the event.
  pub fn current(&self) -> Option<Coins> {
    self.0.previous.as_ref().and_then(|previous| previous.checked_add(&self.0.coins))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSubtract(pub DepositChange);

impl TypedEvent for EventSubtract {
  const KIND: &'static str = "sentinel.deposit.v1.EventSubtract";

  fn decode(event: &Event) -> Result<Self, DecodeError> {
    DepositChange::parse(event).map(Self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_with_previous() {
    let event = Event::new(
      EventAdd::KIND,
      [
        ("address", "sent1abc"),
        ("coins", r#"[{"denom":"udvpn","amount":"10"}]"#),
        ("previous", r#"[{"denom":"udvpn","amount":"5"}]"#),
      ],
    );

    let add = EventAdd::from_event(&event).unwrap();

    assert_eq!(add.0.address, "sent1abc");
    assert_eq!(add.current(), Some("15udvpn".parse().unwrap()));
  }

  #[test]
  fn subtract_without_previous() {
    let event = Event::new(
      EventSubtract::KIND,
      [("address", "sent1abc"), ("coins", "3udvpn")],
    );

    let subtract = EventSubtract::from_event(&event).unwrap();

    assert_eq!(subtract.0.previous, None);
    assert_eq!(subtract.0.coins, "3udvpn".parse().unwrap());
  }
}

use super::*;

/// A message payload that can be decoded from a [`Message`] envelope.
pub trait TypedMessage: DeserializeOwned {
  /// Every type URL this message is known under.
  const TYPE_URLS: &'static [&'static str];

  fn from_message(message: &Message) -> Result<Self, DecodeError> {
    message.decode()
  }
}

/// An event that can be decoded from an [`Event`] envelope.
pub trait TypedEvent: Sized {
  const KIND: &'static str;

  fn decode(event: &Event) -> Result<Self, DecodeError>;

  fn from_event(event: &Event) -> Result<Self, DecodeError> {
    event.expect_kind(Self::KIND)?;
    Self::decode(event)
  }
}

/// Implements [`TypedMessage`] for a message registered under both the
/// `Msg<Name>Request` and `MsgService/Msg<Name>` spellings.
macro_rules! message {
  ($type:ty, $package:literal, $name:literal) => {
    impl $crate::TypedMessage for $type {
      const TYPE_URLS: &'static [&'static str] = &[
        concat!("/", $package, ".Msg", $name, "Request"),
        concat!("/", $package, ".MsgService/Msg", $name),
      ];
    }
  };
}

pub(crate) use message;

use super::*;

/// A transaction message: its type URL and its JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub type_url: String,
  pub payload: Value,
}

impl Message {
  /// Splits the `@type` tag off a JSON encoded message.
  pub fn from_json(value: Value) -> Result<Self, DecodeError> {
    let Value::Object(mut payload) = value else {
      return Err(DecodeError::MissingTypeUrl);
    };

    let Some(Value::String(type_url)) = payload.remove("@type") else {
      return Err(DecodeError::MissingTypeUrl);
    };

    Ok(Self {
      type_url,
      payload: Value::Object(payload),
    })
  }

  pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
    serde_json::from_value(self.payload.clone()).map_err(|err| DecodeError::Payload {
      type_url: self.type_url.clone(),
      message: err.to_string(),
    })
  }

  /// The messages wrapped by an authz `MsgExec`, if this is one.
  pub fn exec_messages(&self) -> Result<Vec<Message>, DecodeError> {
    if self.type_url != MSG_EXEC {
      return Ok(Vec::new());
    }

    self
      .payload
      .get("msgs")
      .and_then(Value::as_array)
      .into_iter()
      .flatten()
      .cloned()
      .map(Message::from_json)
      .collect()
  }
}

/// A chain event: a kind and its attributes, with values unquoted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  #[serde(rename = "type")]
  pub kind: String,
  pub attributes: BTreeMap<String, String>,
}

/// Removes one level of JSON string quoting, if present.
pub fn unquote(value: &str) -> String {
  if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
    serde_json::from_str::<String>(value).unwrap_or_else(|_| value[1..value.len() - 1].into())
  } else {
    value.into()
  }
}

impl Event {
  pub fn new<K: Into<String>, V: AsRef<str>>(
    kind: impl Into<String>,
    attributes: impl IntoIterator<Item = (K, V)>,
  ) -> Self {
    let mut event = Self {
      kind: kind.into(),
      attributes: default(),
    };

    for (key, value) in attributes {
      event.attributes.insert(key.into(), unquote(value.as_ref()));
    }

    event
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.attributes.get(key).map(String::as_str)
  }

  pub fn attribute(&self, key: &str) -> Result<&str, DecodeError> {
    self.get(key).ok_or_else(|| DecodeError::MissingAttribute {
      kind: self.kind.clone(),
      key: key.into(),
    })
  }

  /// Parses a required attribute.
  pub fn parse<T: FromStr>(&self, key: &str) -> Result<T, DecodeError> {
    let value = self.attribute(key)?;
    value.parse().map_err(|_| self.invalid(key, value))
  }

  /// Parses an attribute that may be absent or empty.
  pub fn parse_optional<T: FromStr>(&self, key: &str) -> Result<Option<T>, DecodeError> {
    match self.get(key) {
      None | Some("") => Ok(None),
      Some(value) => value
        .parse()
        .map(Some)
        .map_err(|_| self.invalid(key, value)),
    }
  }

  /// Parses the first of several alternative attribute names that is present.
  pub fn parse_any<T: FromStr>(&self, keys: &[&str]) -> Result<T, DecodeError> {
    for key in keys {
      if let Some(value) = self.parse_optional(key)? {
        return Ok(value);
      }
    }

    Err(DecodeError::MissingAttribute {
      kind: self.kind.clone(),
      key: keys.join("|"),
    })
  }

  pub fn time(&self, key: &str) -> Result<DateTime<Utc>, DecodeError> {
    let value = self.attribute(key)?;
    DateTime::parse_from_rfc3339(value)
      .map(|time| time.with_timezone(&Utc))
      .map_err(|_| self.invalid(key, value))
  }

  pub fn expect_kind(&self, kind: &str) -> Result<(), DecodeError> {
    if self.kind == kind {
      Ok(())
    } else {
      Err(DecodeError::UnexpectedEvent {
        expected: kind.into(),
        found: self.kind.clone(),
      })
    }
  }

  fn invalid(&self, key: &str, value: &str) -> DecodeError {
    DecodeError::InvalidAttribute {
      kind: self.kind.clone(),
      key: key.into(),
      value: value.into(),
    }
  }
}

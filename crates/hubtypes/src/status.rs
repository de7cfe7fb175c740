use super::*;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, DeserializeFromStr, SerializeDisplay,
)]
pub enum Status {
  #[default]
  Unspecified,
  Active,
  InactivePending,
  Inactive,
}

impl Status {
  pub fn is_terminal(self) -> bool {
    self == Self::Inactive
  }

  pub fn is_specified(self) -> bool {
    self != Self::Unspecified
  }
}

impl FromStr for Status {
  type Err = DecodeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s
      .trim()
      .trim_start_matches("STATUS_")
      .trim_start_matches("status_")
      .to_ascii_lowercase();

    match normalized.as_str() {
      "" | "unspecified" | "0" => Ok(Self::Unspecified),
      "active" | "1" => Ok(Self::Active),
      "inactive_pending" | "inactivepending" | "2" => Ok(Self::InactivePending),
      "inactive" | "3" => Ok(Self::Inactive),
      _ => Err(DecodeError::Status(s.into())),
    }
  }
}

impl Display for Status {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Unspecified => "unspecified",
        Self::Active => "active",
        Self::InactivePending => "inactive_pending",
        Self::Inactive => "inactive",
      }
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_str() {
    assert_eq!("STATUS_ACTIVE".parse::<Status>().unwrap(), Status::Active);
    assert_eq!("active".parse::<Status>().unwrap(), Status::Active);
    assert_eq!("Active".parse::<Status>().unwrap(), Status::Active);
    assert_eq!(
      "STATUS_INACTIVE_PENDING".parse::<Status>().unwrap(),
      Status::InactivePending
    );
    assert_eq!("3".parse::<Status>().unwrap(), Status::Inactive);
    assert_eq!(
      "STATUS_UNSPECIFIED".parse::<Status>().unwrap(),
      Status::Unspecified
    );
    assert_eq!(
      "paused".parse::<Status>().unwrap_err(),
      DecodeError::Status("paused".into())
    );
  }

  #[test]
  fn display_round_trips() {
    for status in [
      Status::Active,
      Status::InactivePending,
      Status::Inactive,
    ] {
      assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
    }
  }

  #[test]
  fn serde() {
    assert_eq!(
      serde_json::to_string(&Status::InactivePending).unwrap(),
      r#""inactive_pending""#
    );
    assert_eq!(
      serde_json::from_str::<Status>(r#""STATUS_INACTIVE""#).unwrap(),
      Status::Inactive
    );
  }

  #[test]
  fn terminal() {
    assert!(Status::Inactive.is_terminal());
    assert!(!Status::InactivePending.is_terminal());
  }
}

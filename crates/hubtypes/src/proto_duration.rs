use super::*;

/// A protobuf `Duration` in its JSON form, e.g. `"3600s"` or `"1.5s"`.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, DeserializeFromStr, SerializeDisplay,
)]
pub struct ProtoDuration(pub Duration);

impl ProtoDuration {
  pub fn as_nanos(self) -> i64 {
    i64::try_from(self.0.as_nanos()).unwrap_or(i64::MAX)
  }
}

impl FromStr for ProtoDuration {
  type Err = DecodeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || DecodeError::Duration(s.into());

    let seconds = s.trim().strip_suffix('s').ok_or_else(invalid)?;

    let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));

    if whole.is_empty() || fraction.len() > 9 || !fraction.chars().all(|c| c.is_ascii_digit()) {
      return Err(invalid());
    }

    let nanos = if fraction.is_empty() {
      0
    } else {
      format!("{fraction:0<9}").parse::<u32>().map_err(|_| invalid())?
    };

    Ok(Self(Duration::new(
      whole.parse().map_err(|_| invalid())?,
      nanos,
    )))
  }
}

impl Display for ProtoDuration {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    if self.0.subsec_nanos() == 0 {
      write!(f, "{}s", self.0.as_secs())
    } else {
      let fraction = format!("{:09}", self.0.subsec_nanos());
      write!(f, "{}.{}s", self.0.as_secs(), fraction.trim_end_matches('0'))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_str() {
    assert_eq!(
      "3600s".parse::<ProtoDuration>().unwrap(),
      ProtoDuration(Duration::from_secs(3600))
    );
    assert_eq!(
      "1.5s".parse::<ProtoDuration>().unwrap(),
      ProtoDuration(Duration::from_millis(1500))
    );
    assert_eq!(
      "3600".parse::<ProtoDuration>().unwrap_err(),
      DecodeError::Duration("3600".into())
    );
    assert!("s".parse::<ProtoDuration>().is_err());
    assert!("-1s".parse::<ProtoDuration>().is_err());
  }

  #[test]
  fn display() {
    assert_eq!(ProtoDuration(Duration::from_secs(30)).to_string(), "30s");
    assert_eq!(
      ProtoDuration(Duration::from_millis(1250)).to_string(),
      "1.25s"
    );
  }

  #[test]
  fn nanos() {
    assert_eq!(
      ProtoDuration(Duration::from_secs(2)).as_nanos(),
      2_000_000_000
    );
  }
}

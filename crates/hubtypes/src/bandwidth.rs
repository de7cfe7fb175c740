use super::*;

#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bandwidth {
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub upload: u64,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  #[serde(default)]
  pub download: u64,
}

impl Bandwidth {
  pub fn total(&self) -> u64 {
    self.upload.saturating_add(self.download)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_strings_and_numbers() {
    assert_eq!(
      serde_json::from_str::<Bandwidth>(r#"{"upload":"1000","download":2000}"#).unwrap(),
      Bandwidth {
        upload: 1000,
        download: 2000,
      }
    );
  }

  #[test]
  fn total() {
    assert_eq!(
      Bandwidth {
        upload: 1,
        download: 2
      }
      .total(),
      3
    );
  }
}

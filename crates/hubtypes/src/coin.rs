use super::*;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
  pub denom: String,
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  pub amount: u128,
}

impl Coin {
  pub fn new(amount: u128, denom: impl Into<String>) -> Self {
    Self {
      denom: denom.into(),
      amount,
    }
  }

  pub fn is_zero(&self) -> bool {
    self.amount == 0
  }
}

impl FromStr for Coin {
  type Err = DecodeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();

    if s.starts_with('{') {
      return serde_json::from_str(s).map_err(|_| DecodeError::Coin(s.into()));
    }

    let split = s
      .find(|c: char| !c.is_ascii_digit())
      .ok_or_else(|| DecodeError::Coin(s.into()))?;

    let (amount, denom) = s.split_at(split);

    if amount.is_empty() || !denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
      return Err(DecodeError::Coin(s.into()));
    }

    Ok(Self {
      denom: denom.into(),
      amount: amount.parse().map_err(|_| DecodeError::Coin(s.into()))?,
    })
  }
}

impl Display for Coin {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}{}", self.amount, self.denom)
  }
}

/// A normalized coin set: sorted by denomination, one entry per denomination,
/// no zero amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
  /// Returns `None` if the amounts of a denomination overflow.
  pub fn checked_new(coins: impl IntoIterator<Item = Coin>) -> Option<Self> {
    let mut merged = BTreeMap::<String, u128>::new();

    for coin in coins {
      let amount = merged.entry(coin.denom).or_default();
      *amount = amount.checked_add(coin.amount)?;
    }

    Some(Self(
      merged
        .into_iter()
        .filter(|(_, amount)| *amount != 0)
        .map(|(denom, amount)| Coin { denom, amount })
        .collect(),
    ))
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Coin> {
    self.0.iter()
  }

  pub fn get(&self, denom: &str) -> Option<&Coin> {
    self.0.iter().find(|coin| coin.denom == denom)
  }

  pub fn first(&self) -> Option<&Coin> {
    self.0.first()
  }

  /// Returns `None` if any denomination would overflow.
  pub fn checked_add(&self, other: &Coins) -> Option<Coins> {
    Coins::checked_new(self.0.iter().chain(other.0.iter()).cloned())
  }

  /// Returns `None` if any denomination would go negative.
  pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
    let mut balances = self
      .0
      .iter()
      .map(|coin| (coin.denom.as_str(), coin.amount))
      .collect::<BTreeMap<&str, u128>>();

    for coin in &other.0 {
      let balance = balances.entry(coin.denom.as_str()).or_default();
      *balance = balance.checked_sub(coin.amount)?;
    }

    Coins::checked_new(
      balances
        .into_iter()
        .map(|(denom, amount)| Coin::new(amount, denom)),
    )
  }
}

impl From<Coin> for Coins {
  fn from(coin: Coin) -> Self {
    Self(if coin.is_zero() { Vec::new() } else { vec![coin] })
  }
}

impl<'de> Deserialize<'de> for Coins {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Coins::checked_new(Option::<Vec<Coin>>::deserialize(deserializer)?.unwrap_or_default())
      .ok_or_else(|| serde::de::Error::custom("coin amount overflows"))
  }
}

impl FromStr for Coins {
  type Err = DecodeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();

    if s.is_empty() {
      return Ok(Coins::default());
    }

    if s.starts_with('[') {
      return serde_json::from_str(s).map_err(|_| DecodeError::Coin(s.into()));
    }

    Coins::checked_new(
      s.split(',')
        .map(str::parse)
        .collect::<Result<Vec<Coin>, _>>()?,
    )
    .ok_or_else(|| DecodeError::Coin(s.into()))
  }
}

impl Display for Coins {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    for (i, coin) in self.0.iter().enumerate() {
      if i > 0 {
        write!(f, ",")?;
      }
      write!(f, "{coin}")?;
    }
    Ok(())
  }
}

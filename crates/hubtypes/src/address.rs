use super::*;

pub const ACCOUNT_PREFIX: &str = "sent";
pub const NODE_PREFIX: &str = "sentnode";
pub const PROVIDER_PREFIX: &str = "sentprov";

/// Re-encodes a bech32 address under a different human readable prefix.
pub fn convert_address(address: &str, prefix: &str) -> Result<String, DecodeError> {
  let error = |message: String| DecodeError::Address {
    address: address.into(),
    message,
  };

  let (_, data) = bech32::decode(address).map_err(|err| error(err.to_string()))?;

  let hrp = Hrp::parse(prefix).map_err(|err| error(err.to_string()))?;

  bech32::encode::<Bech32>(hrp, &data).map_err(|err| error(err.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn converts_between_prefixes() {
    let data = [7u8; 20];

    let account = bech32::encode::<Bech32>(Hrp::parse(ACCOUNT_PREFIX).unwrap(), &data).unwrap();
    let node = bech32::encode::<Bech32>(Hrp::parse(NODE_PREFIX).unwrap(), &data).unwrap();

    assert!(node.starts_with("sentnode1"));
    assert_eq!(convert_address(&account, NODE_PREFIX).unwrap(), node);
    assert_eq!(convert_address(&node, ACCOUNT_PREFIX).unwrap(), account);
  }

  #[test]
  fn rejects_garbage() {
    assert!(matches!(
      convert_address("sent1notanaddress", NODE_PREFIX),
      Err(DecodeError::Address { .. })
    ));
  }
}

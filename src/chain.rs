use {super::*, clap::ValueEnum};

#[derive(Default, ValueEnum, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
  #[default]
  #[value(alias("mainnet"))]
  Sentinelhub,
  #[value(alias("testnet"))]
  SentinelhubTestnet,
  #[value(alias("devnet"))]
  SentinelhubDevnet,
}

impl Chain {
  pub(crate) fn chain_id(self) -> &'static str {
    match self {
      Self::Sentinelhub => "sentinelhub-2",
      Self::SentinelhubTestnet => "sentinelhub-testnet",
      Self::SentinelhubDevnet => "sentinelhub-devnet",
    }
  }

  /// First height the indexer processes when there is no checkpoint.
  pub(crate) fn first_indexed_height(self) -> u64 {
    match self {
      Self::Sentinelhub => 9_348_475,
      Self::SentinelhubTestnet | Self::SentinelhubDevnet => 1,
    }
  }

  /// First height at which the second generation modules are live.
  pub(crate) fn v2_height(self) -> u64 {
    match self {
      Self::Sentinelhub => 12_310_005,
      Self::SentinelhubTestnet | Self::SentinelhubDevnet => 0,
    }
  }

  pub(crate) fn default_rpc_url(self) -> &'static str {
    "http://127.0.0.1:26657"
  }

  pub(crate) fn default_lcd_url(self) -> &'static str {
    "http://127.0.0.1:1317"
  }

  pub(crate) fn join_with_data_dir(self, data_dir: impl AsRef<Path>) -> PathBuf {
    match self {
      Self::Sentinelhub => data_dir.as_ref().to_owned(),
      Self::SentinelhubTestnet => data_dir.as_ref().join("testnet"),
      Self::SentinelhubDevnet => data_dir.as_ref().join("devnet"),
    }
  }
}

impl Display for Chain {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Sentinelhub => "sentinelhub",
        Self::SentinelhubTestnet => "sentinelhub-testnet",
        Self::SentinelhubDevnet => "sentinelhub-devnet",
      }
    )
  }
}

impl FromStr for Chain {
  type Err = SnafuError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "sentinelhub" | "mainnet" => Ok(Self::Sentinelhub),
      "sentinelhub-testnet" | "testnet" => Ok(Self::SentinelhubTestnet),
      "sentinelhub-devnet" | "devnet" => Ok(Self::SentinelhubDevnet),
      _ => Err(SnafuError::InvalidChain {
        chain: s.to_string(),
      }),
    }
  }
}

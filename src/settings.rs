use super::*;

#[serde_as]
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Settings {
  app_name: Option<String>,
  chain: Option<Chain>,
  data_dir: Option<PathBuf>,
  event_attribute_encoding: Option<AttributeEncoding>,
  from_height: Option<u64>,
  index: Option<PathBuf>,
  index_cache_size: Option<usize>,
  lcd_url: Option<String>,
  #[serde_as(as = "Option<DisplayFromStr>")]
  max_backoff: Option<humantime::Duration>,
  #[serde_as(as = "Option<DisplayFromStr>")]
  poll_interval: Option<humantime::Duration>,
  #[serde_as(as = "Option<DisplayFromStr>")]
  request_timeout: Option<humantime::Duration>,
  retry_limit: Option<u32>,
  rpc_url: Option<String>,
  to_height: Option<u64>,
  v2_height: Option<u64>,
}

impl Settings {
  pub fn load(options: Options) -> Result<Settings> {
    let mut env = BTreeMap::<String, String>::new();

    for (var, value) in env::vars_os() {
      let Some(var) = var.to_str() else {
        continue;
      };

      let Some(key) = var.strip_prefix("EXPLORER_") else {
        continue;
      };

      env.insert(
        key.into(),
        value.into_string().map_err(|value| {
          anyhow!(
            "environment variable `{var}` not valid unicode: `{}`",
            value.to_string_lossy()
          )
        })?,
      );
    }

    Self::merge(options, env)
  }

  pub fn merge(options: Options, env: BTreeMap<String, String>) -> Result<Self> {
    let settings = Settings::from_options(options.clone()).or(Settings::from_env(env)?);

    let config_path = if let Some(path) = &options.config {
      Some(path.into())
    } else {
      let config_dir = options
        .config_dir
        .clone()
        .or_else(|| settings.data_dir.clone());

      config_dir
        .map(|dir| dir.join("explorer.yaml"))
        .filter(|path| path.exists())
    };

    let config = match config_path {
      Some(path) => serde_yaml::from_reader(
        File::open(&path).with_context(|| format!("failed to open config `{}`", path.display()))?,
      )
      .with_context(|| format!("failed to deserialize config `{}`", path.display()))?,
      None => Settings::default(),
    };

    settings.or(config).or_defaults()
  }

  pub fn or(self, source: Settings) -> Self {
    Self {
      app_name: self.app_name.or(source.app_name),
      chain: self.chain.or(source.chain),
      data_dir: self.data_dir.or(source.data_dir),
      event_attribute_encoding: self
        .event_attribute_encoding
        .or(source.event_attribute_encoding),
      from_height: self.from_height.or(source.from_height),
      index: self.index.or(source.index),
      index_cache_size: self.index_cache_size.or(source.index_cache_size),
      lcd_url: self.lcd_url.or(source.lcd_url),
      max_backoff: self.max_backoff.or(source.max_backoff),
      poll_interval: self.poll_interval.or(source.poll_interval),
      request_timeout: self.request_timeout.or(source.request_timeout),
      retry_limit: self.retry_limit.or(source.retry_limit),
      rpc_url: self.rpc_url.or(source.rpc_url),
      to_height: self.to_height.or(source.to_height),
      v2_height: self.v2_height.or(source.v2_height),
    }
  }

  pub fn from_options(options: Options) -> Self {
    let chain = if options.devnet {
      Some(Chain::SentinelhubDevnet)
    } else if options.testnet {
      Some(Chain::SentinelhubTestnet)
    } else {
      options.chain_argument
    };

    Self {
      app_name: options.app_name,
      chain,
      data_dir: options.data_dir,
      event_attribute_encoding: options.event_attribute_encoding,
      from_height: options.from_height,
      index: options.index,
      index_cache_size: options.index_cache_size,
      lcd_url: options.lcd_url,
      max_backoff: options.max_backoff,
      poll_interval: options.poll_interval,
      request_timeout: options.request_timeout,
      retry_limit: options.retry_limit,
      rpc_url: options.rpc_url,
      to_height: options.to_height,
      v2_height: options.v2_height,
    }
  }

  pub fn from_env(env: BTreeMap<String, String>) -> Result<Self> {
    let get = |key: &str| env.get(key).cloned();

    fn parse<T: FromStr>(env: &BTreeMap<String, String>, key: &str) -> Result<Option<T>>
    where
      T::Err: Into<Error>,
    {
      env
        .get(key)
        .map(|value| {
          value
            .parse::<T>()
            .map_err(Into::<Error>::into)
            .with_context(|| format!("failed to parse environment variable EXPLORER_{key}"))
        })
        .transpose()
    }

    Ok(Self {
      app_name: get("APP_NAME"),
      chain: parse(&env, "CHAIN")?,
      data_dir: get("DATA_DIR").map(PathBuf::from),
      event_attribute_encoding: parse(&env, "EVENT_ATTRIBUTE_ENCODING")?,
      from_height: parse(&env, "FROM_HEIGHT")?,
      index: get("INDEX").map(PathBuf::from),
      index_cache_size: parse(&env, "INDEX_CACHE_SIZE")?,
      lcd_url: get("LCD_URL"),
      max_backoff: parse(&env, "MAX_BACKOFF")?,
      poll_interval: parse(&env, "POLL_INTERVAL")?,
      request_timeout: parse(&env, "REQUEST_TIMEOUT")?,
      retry_limit: parse(&env, "RETRY_LIMIT")?,
      rpc_url: get("RPC_URL"),
      to_height: parse(&env, "TO_HEIGHT")?,
      v2_height: parse(&env, "V2_HEIGHT")?,
    })
  }

  pub fn or_defaults(self) -> Result<Self> {
    let chain = self.chain.unwrap_or_default();

    let data_dir = chain.join_with_data_dir(match &self.data_dir {
      Some(data_dir) => data_dir.clone(),
      None => Self::default_data_dir()?,
    });

    let index = match &self.index {
      Some(path) => path.clone(),
      None => data_dir.join("index.redb"),
    };

    let from_height = self.from_height.unwrap_or(chain.first_indexed_height());

    if from_height == 0 {
      bail!("from height must be at least 1");
    }

    if let Some(to_height) = self.to_height
      && to_height <= from_height
    {
      bail!("to height {to_height} must be greater than from height {from_height}");
    }

    Ok(Self {
      app_name: Some(self.app_name.unwrap_or_else(|| "explorer".into())),
      chain: Some(chain),
      data_dir: Some(data_dir),
      event_attribute_encoding: Some(self.event_attribute_encoding.unwrap_or_default()),
      from_height: Some(from_height),
      index: Some(index),
      index_cache_size: Some(match self.index_cache_size {
        Some(index_cache_size) => index_cache_size,
        None => {
          let mut sys = System::new();
          sys.refresh_memory();
          usize::try_from(sys.total_memory() / 4)?
        }
      }),
      lcd_url: Some(
        self
          .lcd_url
          .unwrap_or_else(|| chain.default_lcd_url().into()),
      ),
      max_backoff: Some(
        self
          .max_backoff
          .unwrap_or_else(|| Duration::from_secs(120).into()),
      ),
      poll_interval: Some(
        self
          .poll_interval
          .unwrap_or_else(|| Duration::from_secs(5).into()),
      ),
      request_timeout: Some(
        self
          .request_timeout
          .unwrap_or_else(|| Duration::from_secs(30).into()),
      ),
      retry_limit: self.retry_limit,
      rpc_url: Some(
        self
          .rpc_url
          .unwrap_or_else(|| chain.default_rpc_url().into()),
      ),
      to_height: self.to_height,
      v2_height: Some(self.v2_height.unwrap_or(chain.v2_height())),
    })
  }

  fn default_data_dir() -> Result<PathBuf> {
    Ok(
      dirs::data_dir()
        .context("could not get data dir")?
        .join("explorer"),
    )
  }

  pub fn app_name(&self) -> &str {
    self.app_name.as_deref().unwrap_or("explorer")
  }

  pub fn chain(&self) -> Chain {
    self.chain.unwrap_or_default()
  }

  pub fn data_dir(&self) -> PathBuf {
    self.data_dir.clone().unwrap_or_default()
  }

  pub fn event_attribute_encoding(&self) -> AttributeEncoding {
    self.event_attribute_encoding.unwrap_or_default()
  }

  pub fn from_height(&self) -> u64 {
    self
      .from_height
      .unwrap_or_else(|| self.chain().first_indexed_height())
  }

  pub fn index(&self) -> PathBuf {
    self
      .index
      .clone()
      .unwrap_or_else(|| self.data_dir().join("index.redb"))
  }

  pub fn index_cache_size(&self) -> usize {
    self.index_cache_size.unwrap_or(1 << 26)
  }

  pub fn lcd_url(&self) -> &str {
    self
      .lcd_url
      .as_deref()
      .unwrap_or(self.chain().default_lcd_url())
  }

  pub fn max_backoff(&self) -> Duration {
    self
      .max_backoff
      .map(Into::into)
      .unwrap_or(Duration::from_secs(120))
  }

  pub fn poll_interval(&self) -> Duration {
    self
      .poll_interval
      .map(Into::into)
      .unwrap_or(Duration::from_secs(5))
  }

  pub fn request_timeout(&self) -> Duration {
    self
      .request_timeout
      .map(Into::into)
      .unwrap_or(Duration::from_secs(30))
  }

  pub fn retry_limit(&self) -> Option<u32> {
    self.retry_limit
  }

  pub fn rpc_url(&self) -> &str {
    self
      .rpc_url
      .as_deref()
      .unwrap_or(self.chain().default_rpc_url())
  }

  pub fn to_height(&self) -> Option<u64> {
    self.to_height
  }

  pub fn v2_height(&self) -> u64 {
    self.v2_height.unwrap_or_else(|| self.chain().v2_height())
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq, unindent::Unindent};

  fn parse(args: &[&str]) -> Settings {
    let args = ["explorer"]
      .iter()
      .chain(args)
      .chain(["index", "info"].iter())
      .collect::<Vec<_>>();

    Settings::merge(
      Arguments::try_parse_from(args).unwrap().options,
      Default::default(),
    )
    .unwrap()
  }

  #[test]
  fn defaults() {
    let tempdir = tempfile::TempDir::new().unwrap();

    let settings = parse(&["--data-dir", tempdir.path().to_str().unwrap()]);

    assert_eq!(settings.chain(), Chain::Sentinelhub);
    assert_eq!(settings.app_name(), "explorer");
    assert_eq!(settings.rpc_url(), "http://127.0.0.1:26657");
    assert_eq!(settings.lcd_url(), "http://127.0.0.1:1317");
    assert_eq!(settings.from_height(), 9_348_475);
    assert_eq!(settings.v2_height(), 12_310_005);
    assert_eq!(settings.poll_interval(), Duration::from_secs(5));
    assert_eq!(settings.max_backoff(), Duration::from_secs(120));
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    assert_eq!(settings.retry_limit(), None);
    assert_eq!(settings.to_height(), None);
    assert_eq!(settings.index(), tempdir.path().join("index.redb"));
    assert_eq!(
      settings.event_attribute_encoding(),
      AttributeEncoding::Auto
    );
  }

  #[test]
  fn testnet_flag() {
    let tempdir = tempfile::TempDir::new().unwrap();

    let settings = parse(&["--testnet", "--data-dir", tempdir.path().to_str().unwrap()]);

    assert_eq!(settings.chain(), Chain::SentinelhubTestnet);
    assert_eq!(settings.data_dir(), tempdir.path().join("testnet"));
    assert_eq!(settings.v2_height(), 0);
  }

  #[test]
  fn options_override_env() {
    let tempdir = tempfile::TempDir::new().unwrap();

    let settings = Settings::merge(
      Options {
        data_dir: Some(tempdir.path().into()),
        rpc_url: Some("http://rpc:26657".into()),
        ..default()
      },
      [
        ("RPC_URL".into(), "http://env:26657".into()),
        ("LCD_URL".into(), "http://env:1317".into()),
        ("POLL_INTERVAL".into(), "2s".into()),
        ("RETRY_LIMIT".into(), "3".into()),
      ]
      .into(),
    )
    .unwrap();

    assert_eq!(settings.rpc_url(), "http://rpc:26657");
    assert_eq!(settings.lcd_url(), "http://env:1317");
    assert_eq!(settings.poll_interval(), Duration::from_secs(2));
    assert_eq!(settings.retry_limit(), Some(3));
  }

  #[test]
  fn bad_env_number() {
    assert_eq!(
      Settings::from_env([("FROM_HEIGHT".into(), "ten".into())].into())
        .unwrap_err()
        .to_string(),
      "failed to parse environment variable EXPLORER_FROM_HEIGHT"
    );
  }

  #[test]
  fn config_file() {
    let tempdir = tempfile::TempDir::new().unwrap();

    fs::write(
      tempdir.path().join("explorer.yaml"),
      "
      chain: sentinelhub-devnet
      app-name: staging
      from-height: 10
      to-height: 20
      poll-interval: 1s
      "
      .unindent(),
    )
    .unwrap();

    let settings = Settings::merge(
      Options {
        config_dir: Some(tempdir.path().into()),
        data_dir: Some(tempdir.path().into()),
        ..default()
      },
      Default::default(),
    )
    .unwrap();

    assert_eq!(settings.chain(), Chain::SentinelhubDevnet);
    assert_eq!(settings.app_name(), "staging");
    assert_eq!(settings.from_height(), 10);
    assert_eq!(settings.to_height(), Some(20));
    assert_eq!(settings.poll_interval(), Duration::from_secs(1));
  }

  #[test]
  fn unknown_config_keys_are_rejected() {
    let tempdir = tempfile::TempDir::new().unwrap();

    let config = tempdir.path().join("explorer.yaml");

    fs::write(&config, "bitcoin-rpc-url: foo\n").unwrap();

    assert!(
      Settings::merge(
        Options {
          config: Some(config),
          data_dir: Some(tempdir.path().into()),
          ..default()
        },
        Default::default(),
      )
      .is_err()
    );
  }

  #[test]
  fn to_height_must_exceed_from_height() {
    let tempdir = tempfile::TempDir::new().unwrap();

    assert_eq!(
      Settings::merge(
        Options {
          data_dir: Some(tempdir.path().into()),
          from_height: Some(10),
          to_height: Some(10),
          ..default()
        },
        Default::default(),
      )
      .unwrap_err()
      .to_string(),
      "to height 10 must be greater than from height 10"
    );
  }
}

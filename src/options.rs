use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
  #[arg(long, help = "Record checkpoints under <APP_NAME>. [default: explorer]")]
  pub app_name: Option<String>,
  #[arg(long = "chain", value_enum, help = "Use <CHAIN>. [default: sentinelhub]")]
  pub chain_argument: Option<Chain>,
  #[arg(long, help = "Load configuration from <CONFIG>.")]
  pub config: Option<PathBuf>,
  #[arg(long, help = "Load configuration from <CONFIG_DIR>.")]
  pub config_dir: Option<PathBuf>,
  #[arg(long, alias = "datadir", help = "Store index in <DATA_DIR>.")]
  pub data_dir: Option<PathBuf>,
  #[arg(
    long,
    value_enum,
    help = "Treat event attributes as <EVENT_ATTRIBUTE_ENCODING>. [default: auto]"
  )]
  pub event_attribute_encoding: Option<AttributeEncoding>,
  #[clap(long, short, help = "Specify output format. [default: json]")]
  pub format: Option<OutputFormat>,
  #[arg(
    long,
    help = "Start indexing at <FROM_HEIGHT> when there is no checkpoint. [default: chain specific]"
  )]
  pub from_height: Option<u64>,
  #[arg(long, help = "Use index at <INDEX>.")]
  pub index: Option<PathBuf>,
  #[arg(
    long,
    help = "Set index cache size to <INDEX_CACHE_SIZE> bytes. [default: 1/4 available RAM]"
  )]
  pub index_cache_size: Option<usize>,
  #[arg(long, help = "Query chain state over LCD at <LCD_URL>. [default: http://127.0.0.1:1317]")]
  pub lcd_url: Option<String>,
  #[arg(long, help = "Back off at most <MAX_BACKOFF> between retries. [default: 120s]")]
  pub max_backoff: Option<humantime::Duration>,
  #[arg(long, help = "Wait <POLL_INTERVAL> for new blocks. [default: 5s]")]
  pub poll_interval: Option<humantime::Duration>,
  #[arg(long, help = "Wait at most <REQUEST_TIMEOUT> for a chain response. [default: 30s]")]
  pub request_timeout: Option<humantime::Duration>,
  #[arg(long, help = "Give up on a height after <RETRY_LIMIT> failed attempts. [default: never]")]
  pub retry_limit: Option<u32>,
  #[arg(long, help = "Connect to Tendermint RPC at <RPC_URL>. [default: http://127.0.0.1:26657]")]
  pub rpc_url: Option<String>,
  #[arg(long, help = "Stop indexing before <TO_HEIGHT>.")]
  pub to_height: Option<u64>,
  #[arg(
    long,
    help = "Switch to second generation modules at <V2_HEIGHT>. [default: chain specific]"
  )]
  pub v2_height: Option<u64>,
  #[arg(long, short, help = "Use testnet. Equivalent to `--chain sentinelhub-testnet`.")]
  pub testnet: bool,
  #[arg(long, help = "Use devnet. Equivalent to `--chain sentinelhub-devnet`.")]
  pub devnet: bool,
}

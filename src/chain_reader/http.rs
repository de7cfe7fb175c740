use super::*;

static NOT_PRODUCED: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)must be less than or equal to|could not find results for height|height \d+ is not available").unwrap()
});

static NOT_FOUND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)not found|does not exist").unwrap());

#[derive(Deserialize)]
struct RpcResponse<T> {
  result: Option<T>,
  error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
  #[serde(default)]
  message: String,
  #[serde(default)]
  data: Option<String>,
}

impl RpcError {
  fn describe(&self) -> String {
    match &self.data {
      Some(data) if !data.is_empty() => format!("{}: {data}", self.message),
      _ => self.message.clone(),
    }
  }
}

#[derive(Deserialize)]
struct LcdError {
  #[serde(default)]
  message: String,
}

#[derive(Deserialize)]
struct BlockResponse {
  block_id: RawBlockId,
  block: RawBlockBody,
}

#[derive(Deserialize)]
struct StatusResponse {
  sync_info: SyncInfo,
}

#[serde_as]
#[derive(Deserialize)]
struct SyncInfo {
  #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
  latest_block_height: u64,
}

#[derive(Deserialize)]
struct TxsResponse {
  #[serde(default)]
  txs: Vec<Value>,
}

#[derive(Deserialize)]
struct NodeResponse {
  node: NodeState,
}

/// Reads blocks over Tendermint RPC and decoded transactions and state over
/// the Cosmos LCD.
pub struct HttpChain {
  client: reqwest::blocking::Client,
  lcd_url: String,
  rpc_url: String,
}

impl HttpChain {
  pub fn new(settings: &Settings) -> Result<Self> {
    Ok(Self {
      client: reqwest::blocking::Client::builder()
        .timeout(settings.request_timeout())
        .build()?,
      lcd_url: settings.lcd_url().trim_end_matches('/').into(),
      rpc_url: settings.rpc_url().trim_end_matches('/').into(),
    })
  }

  fn rpc<T: DeserializeOwned>(&self, path: &str, height: Option<u64>) -> Result<T, SnafuError> {
    let url = format!("{}/{path}", self.rpc_url);

    log::trace!("GET {url}");

    let response: RpcResponse<T> = self
      .client
      .get(&url)
      .send()
      .and_then(|response| response.json())
      .snafu_context(error::Transport { url: url.clone() })?;

    match response {
      RpcResponse {
        error: Some(err), ..
      } => {
        let message = err.describe();
        match height {
          Some(height) if NOT_PRODUCED.is_match(&message) => Err(SnafuError::NotProduced { height }),
          _ => Err(SnafuError::Rpc { url, message }),
        }
      }
      RpcResponse {
        result: Some(result),
        ..
      } => Ok(result),
      RpcResponse { .. } => Err(SnafuError::Malformed {
        url,
        message: "response has neither result nor error".into(),
      }),
    }
  }

  /// GETs an LCD path. Returns `None` when the LCD reports the resource as
  /// missing.
  fn lcd<T: DeserializeOwned>(
    &self,
    path: &str,
    height: Option<u64>,
  ) -> Result<Option<T>, SnafuError> {
    let url = format!("{}/{path}", self.lcd_url);

    log::trace!("GET {url}");

    let mut request = self.client.get(&url);

    if let Some(height) = height {
      request = request.header("x-cosmos-block-height", height.to_string());
    }

    let response = request
      .send()
      .snafu_context(error::Transport { url: url.clone() })?;

    let status = response.status();

    let body = response
      .text()
      .snafu_context(error::Transport { url: url.clone() })?;

    if status.is_success() {
      return serde_json::from_str(&body)
        .map(Some)
        .map_err(|err| SnafuError::Malformed {
          url,
          message: err.to_string(),
        });
    }

    let message = serde_json::from_str::<LcdError>(&body)
      .map(|err| err.message)
      .unwrap_or(body);

    if status == reqwest::StatusCode::NOT_FOUND || NOT_FOUND.is_match(&message) {
      return Ok(None);
    }

    match height {
      Some(height) if NOT_PRODUCED.is_match(&message) => Err(SnafuError::NotProduced { height }),
      _ => Err(SnafuError::Rpc {
        url,
        message: format!("{status}: {message}"),
      }),
    }
  }
}

impl ChainReader for HttpChain {
  fn latest_height(&self) -> Result<u64> {
    Ok(
      self
        .rpc::<StatusResponse>("status", None)?
        .sync_info
        .latest_block_height,
    )
  }

  fn block(&self, height: u64) -> Result<RawBlock> {
    let BlockResponse { block_id, block } =
      self.rpc::<BlockResponse>(&format!("block?height={height}"), Some(height))?;

    let count = block.data.txs.len();

    let txs = if count == 0 {
      Vec::new()
    } else {
      let path = format!("cosmos/tx/v1beta1/txs/block/{height}?pagination.limit={count}");

      let TxsResponse { txs } = self
        .lcd::<TxsResponse>(&path, None)?
        .ok_or_else(|| SnafuError::NotProduced { height })?;

      if txs.len() != count {
        return Err(
          SnafuError::Malformed {
            url: format!("{}/{path}", self.lcd_url),
            message: format!("expected {count} transactions, got {}", txs.len()),
          }
          .into(),
        );
      }

      txs
    };

    Ok(RawBlock {
      block_id,
      block,
      txs,
    })
  }

  fn execution_results(&self, height: u64) -> Result<RawResults> {
    Ok(self.rpc(&format!("block_results?height={height}"), Some(height))?)
  }
}

impl ChainState for HttpChain {
  fn node(&self, address: &str, height: u64) -> Result<Option<NodeState>> {
    Ok(
      self
        .lcd::<NodeResponse>(&format!("sentinel/node/v2/nodes/{address}"), Some(height))?
        .map(|response| response.node),
    )
  }
}

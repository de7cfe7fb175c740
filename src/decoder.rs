use {super::*, clap::ValueEnum};

/// How event attribute keys and values are encoded on the wire. Tendermint
/// before 0.35 base64 encoded them.
#[derive(Default, ValueEnum, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeEncoding {
  #[default]
  Auto,
  Plain,
  Base64,
}

impl Display for AttributeEncoding {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Auto => "auto",
        Self::Plain => "plain",
        Self::Base64 => "base64",
      }
    )
  }
}

impl FromStr for AttributeEncoding {
  type Err = SnafuError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "auto" => Ok(Self::Auto),
      "plain" => Ok(Self::Plain),
      "base64" => Ok(Self::Base64),
      _ => Err(SnafuError::InvalidAttributeEncoding {
        encoding: s.to_string(),
      }),
    }
  }
}

/// Events emitted while executing one message of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageLog {
  pub msg_index: usize,
  pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxResult {
  pub code: u32,
  pub codespace: String,
  pub log: String,
  pub info: String,
  pub gas_wanted: i64,
  pub gas_used: i64,
  pub events: Vec<Event>,
  pub message_logs: Vec<MessageLog>,
}

impl TxResult {
  pub fn is_success(&self) -> bool {
    self.code == 0
  }

  /// Events of the message at `index`. Falls back to the `msg_index`
  /// attribute newer chains put on every event when there is no log.
  pub fn message_events(&self, index: usize) -> Vec<Event> {
    if !self.message_logs.is_empty() {
      return self
        .message_logs
        .iter()
        .filter(|log| log.msg_index == index)
        .flat_map(|log| log.events.iter().cloned())
        .collect();
    }

    let index = index.to_string();

    self
      .events
      .iter()
      .filter(|event| event.get("msg_index") == Some(index.as_str()))
      .cloned()
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tx {
  pub hash: String,
  pub index: u32,
  pub body: Value,
  pub messages: Vec<Message>,
  pub result: TxResult,
}

/// A block with everything the dispatcher needs, decoded into envelopes.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
  pub id: String,
  pub header: RawHeader,
  pub last_commit: Option<RawCommit>,
  pub txs: Vec<Tx>,
  pub begin_block_events: Vec<Event>,
  pub end_block_events: Vec<Event>,
  pub validator_updates: Vec<Value>,
  pub consensus_param_updates: Option<Value>,
}

impl Block {
  pub fn height(&self) -> u64 {
    self.header.height
  }

  pub fn time(&self) -> DateTime<Utc> {
    self.header.time
  }
}

#[derive(Deserialize)]
struct RawMessageLog {
  #[serde(default)]
  msg_index: usize,
  #[serde(default)]
  events: Vec<RawEvent>,
}

pub struct Decoder {
  encoding: AttributeEncoding,
}

impl Decoder {
  pub fn new(encoding: AttributeEncoding) -> Self {
    Self { encoding }
  }

  pub fn decode(&self, raw: RawBlock, results: RawResults) -> Result<Block> {
    let height = raw.height();

    if results.height != height {
      return Err(
        SnafuError::Malformed {
          url: format!("block_results?height={height}"),
          message: format!("results are for height {}", results.height),
        }
        .into(),
      );
    }

    if raw.block.data.txs.len() != results.txs_results.len()
      || raw.block.data.txs.len() != raw.txs.len()
    {
      return Err(
        SnafuError::Malformed {
          url: format!("block?height={height}"),
          message: format!(
            "block has {} transactions, {} decoded and {} results",
            raw.block.data.txs.len(),
            raw.txs.len(),
            results.txs_results.len(),
          ),
        }
        .into(),
      );
    }

    let base64 = match self.encoding {
      AttributeEncoding::Plain => false,
      AttributeEncoding::Base64 => true,
      AttributeEncoding::Auto => Self::looks_base64(&results),
    };

    let (begin_block_events, end_block_events) = match &results.finalize_block_events {
      Some(events) => {
        let (begin, end) = events.iter().partition::<Vec<&RawEvent>, _>(|event| {
          event
            .attributes
            .iter()
            .any(|attribute| attribute.key == "mode" && attribute.value.as_deref() == Some("BeginBlock"))
        });
        (
          Self::events(begin, base64, height)?,
          Self::events(end, base64, height)?,
        )
      }
      None => (
        Self::events(&results.begin_block_events, base64, height)?,
        Self::events(&results.end_block_events, base64, height)?,
      ),
    };

    let mut txs = Vec::with_capacity(raw.txs.len());

    for (index, ((encoded, body), result)) in raw
      .block
      .data
      .txs
      .iter()
      .zip(raw.txs)
      .zip(&results.txs_results)
      .enumerate()
    {
      let messages = body
        .pointer("/body/messages")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .cloned()
        .map(Message::from_json)
        .collect::<Result<Vec<Message>, DecodeError>>()
        .map_err(|source| SnafuError::Decode { source, height })?;

      txs.push(Tx {
        hash: tx_hash(encoded)?,
        index: index.try_into()?,
        body,
        messages,
        result: TxResult {
          code: result.code,
          codespace: result.codespace.clone(),
          log: result.log.clone(),
          info: result.info.clone(),
          gas_wanted: result.gas_wanted,
          gas_used: result.gas_used,
          events: Self::events(&result.events, base64, height)?,
          message_logs: Self::message_logs(result, height)?,
        },
      });
    }

    Ok(Block {
      id: raw.block_id.hash,
      header: raw.block.header,
      last_commit: raw.block.last_commit,
      txs,
      begin_block_events,
      end_block_events,
      validator_updates: results.validator_updates,
      consensus_param_updates: results.consensus_param_updates,
    })
  }

  /// Attribute keys are identifiers. If every key in the block decodes from
  /// base64 to a printable identifier, the block is base64 encoded.
  fn looks_base64(results: &RawResults) -> bool {
    let mut keys = results
      .txs_results
      .iter()
      .flat_map(|result| &result.events)
      .chain(&results.begin_block_events)
      .chain(&results.end_block_events)
      .chain(results.finalize_block_events.iter().flatten())
      .flat_map(|event| &event.attributes)
      .map(|attribute| attribute.key.as_str())
      .peekable();

    if keys.peek().is_none() {
      return false;
    }

    keys.all(|key| match Self::base64_decode(key) {
      Some(decoded) => {
        !decoded.is_empty()
          && decoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
      }
      None => false,
    })
  }

  fn base64_decode(value: &str) -> Option<String> {
    base64::engine::general_purpose::STANDARD
      .decode(value)
      .ok()
      .and_then(|bytes| String::from_utf8(bytes).ok())
  }

  fn events<'a>(
    events: impl IntoIterator<Item = &'a RawEvent>,
    base64: bool,
    height: u64,
  ) -> Result<Vec<Event>> {
    events
      .into_iter()
      .map(|event| -> Result<Event> {
        let attributes = event
          .attributes
          .iter()
          .map(|attribute| {
            let value = attribute.value.clone().unwrap_or_default();

            if !base64 {
              return Ok((attribute.key.clone(), value));
            }

            let decode = |field: &str| {
              Self::base64_decode(field).ok_or_else(|| {
                SnafuError::Decode {
                  source: DecodeError::InvalidAttribute {
                    kind: event.kind.clone(),
                    key: attribute.key.clone(),
                    value: field.into(),
                  },
                  height,
                }
              })
            };

            Ok((decode(&attribute.key)?, decode(&value)?))
          })
          .collect::<Result<Vec<(String, String)>, SnafuError>>()?;

        Ok(Event::new(event.kind.clone(), attributes))
      })
      .collect()
  }

  fn message_logs(result: &RawTxResult, height: u64) -> Result<Vec<MessageLog>> {
    if result.code != 0 || !result.log.trim_start().starts_with('[') {
      return Ok(Vec::new());
    }

    let Ok(logs) = serde_json::from_str::<Vec<RawMessageLog>>(&result.log) else {
      return Ok(Vec::new());
    };

    logs
      .into_iter()
      .map(|log| -> Result<MessageLog> {
        Ok(MessageLog {
          msg_index: log.msg_index,
          events: Self::events(&log.events, false, height)?,
        })
      })
      .collect()
  }
}

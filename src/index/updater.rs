use {
  super::*,
  indicatif::{ProgressBar, ProgressStyle},
  std::sync::mpsc::{self, Receiver},
};

/// Blocks fetched ahead of the one being applied.
const PREFETCH_DEPTH: usize = 32;

/// Longest single sleep, so shutdown is noticed promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Knobs of the fetch and apply loop, resolved from [`Settings`].
#[derive(Debug, Clone)]
pub struct Schedule {
  pub app_name: String,
  pub chain_id: String,
  pub encoding: AttributeEncoding,
  pub from_height: u64,
  pub to_height: Option<u64>,
  pub poll_interval: Duration,
  pub max_backoff: Duration,
  pub retry_limit: Option<u32>,
  pub v2_height: u64,
}

impl Schedule {
  pub fn new(settings: &Settings) -> Self {
    Self {
      app_name: settings.app_name().into(),
      chain_id: settings.chain().chain_id().into(),
      encoding: settings.event_attribute_encoding(),
      from_height: settings.from_height(),
      to_height: settings.to_height(),
      poll_interval: settings.poll_interval(),
      max_backoff: settings.max_backoff(),
      retry_limit: settings.retry_limit(),
      v2_height: settings.v2_height(),
    }
  }

  fn backoff(&self, errors: u32) -> Duration {
    Duration::from_secs(1 << errors.min(16)).min(self.max_backoff)
  }

  fn exhausted(&self, errors: u32) -> bool {
    self.retry_limit.is_some_and(|limit| errors > limit)
  }
}

/// Applies one height at a time: fetch, decode, dispatch, then write every
/// operation and the checkpoint in a single transaction.
pub struct Updater<'index> {
  index: &'index Index,
  reader: Arc<dyn ChainReader>,
  state: Arc<dyn ChainState>,
  dispatcher: Dispatcher,
  schedule: Schedule,
}

impl<'index> Updater<'index> {
  pub fn new(
    index: &'index Index,
    schedule: Schedule,
    reader: Arc<dyn ChainReader>,
    state: Arc<dyn ChainState>,
  ) -> Self {
    Self {
      dispatcher: Dispatcher::new(Registry::v1(), Registry::v2(), schedule.v2_height),
      index,
      reader,
      state,
      schedule,
    }
  }

  /// The first height that has not been applied yet.
  pub fn next_height(&self) -> Result<u64> {
    Ok(
      match self.index.checkpoint(&self.schedule.app_name)? {
        Some(checkpoint) => checkpoint.height + 1,
        None => self.schedule.from_height,
      },
    )
  }

  /// Indexes until `to_height`, a fatal error, or shutdown. Returns the
  /// number of heights committed.
  pub fn update_index(&self) -> Result<u64> {
    let start = self.next_height()?;

    if let Some(to_height) = self.schedule.to_height
      && start >= to_height
    {
      log::info!("Index is already at height {}", start - 1);
      return Ok(0);
    }

    log::info!(
      "Indexing from height {start} as `{}`",
      self.schedule.app_name
    );

    let progress_bar = self.progress_bar(start);

    let rx = Self::fetch_blocks_from(self.reader.clone(), self.schedule.clone(), start);

    let mut committed = 0;

    while let Ok(fetched) = rx.recv() {
      let block = fetched?;

      self.index_block_with_retries(&block)?;

      committed += 1;

      if let Some(progress_bar) = &progress_bar {
        progress_bar.inc(1);

        if progress_bar.position() > progress_bar.length().unwrap_or_default() {
          match self.reader.latest_height() {
            Ok(latest) => progress_bar.set_length(latest + 1),
            Err(err) => log::warn!("Failed to fetch latest block height: {err}"),
          }
        }
      }

      if SHUTTING_DOWN.load(atomic::Ordering::Relaxed) {
        log::info!("Stopping after height {}", block.height());
        break;
      }
    }

    if let Some(progress_bar) = &progress_bar {
      progress_bar.finish_and_clear();
    }

    Ok(committed)
  }

  fn progress_bar(&self, start: u64) -> Option<ProgressBar> {
    if cfg!(test) || log::log_enabled!(log::Level::Info) {
      return None;
    }

    let end = match self.schedule.to_height {
      Some(to_height) => to_height,
      None => self.reader.latest_height().ok()? + 1,
    };

    let progress_bar = ProgressBar::new(end);
    progress_bar.set_position(start);
    progress_bar.set_style(
      ProgressStyle::with_template("[indexing blocks] {wide_bar} {pos}/{len}").ok()?,
    );

    Some(progress_bar)
  }

  /// Fetches and decodes blocks on a separate thread, in height order. The
  /// channel closes at `to_height`, on shutdown, or after a fatal error,
  /// which is the last item sent.
  fn fetch_blocks_from(
    reader: Arc<dyn ChainReader>,
    schedule: Schedule,
    mut height: u64,
  ) -> Receiver<Result<Block>> {
    let (tx, rx) = mpsc::sync_channel(PREFETCH_DEPTH);

    thread::spawn(move || {
      let decoder = Decoder::new(schedule.encoding);

      loop {
        if let Some(to_height) = schedule.to_height
          && height >= to_height
        {
          break;
        }

        let result = Self::fetch_block_with_retries(reader.as_ref(), &decoder, &schedule, height);

        let Some(result) = result.transpose() else {
          log::debug!("Stopped fetching at height {height}");
          break;
        };

        let failed = result.is_err();

        if let Err(err) = tx.send(result) {
          log::debug!("Block receiver disconnected: {err}");
          break;
        }

        if failed {
          break;
        }

        height += 1;
      }
    });

    rx
  }

  /// `None` when shutdown was requested while waiting.
  fn fetch_block_with_retries(
    reader: &dyn ChainReader,
    decoder: &Decoder,
    schedule: &Schedule,
    height: u64,
  ) -> Result<Option<Block>> {
    let mut errors = 0;

    loop {
      if SHUTTING_DOWN.load(atomic::Ordering::Relaxed) {
        return Ok(None);
      }

      let err = match Self::fetch_block(reader, decoder, height) {
        Ok(block) => return Ok(Some(block)),
        Err(err) => err,
      };

      match classify(&err) {
        ErrorClass::NotProduced => {
          log::debug!("Waiting for block {height}");
          sleep(schedule.poll_interval);
        }
        ErrorClass::Transient => {
          errors += 1;

          if schedule.exhausted(errors) {
            log::error!("Giving up on block {height} after {errors} attempts");
            return Err(err);
          }

          let backoff = schedule.backoff(errors);
          log::warn!(
            "Failed to fetch block {height}, retrying in {}: {err}",
            humantime::format_duration(backoff)
          );
          sleep(backoff);
        }
        ErrorClass::Fatal => return Err(err),
      }
    }
  }

  fn fetch_block(reader: &dyn ChainReader, decoder: &Decoder, height: u64) -> Result<Block> {
    let raw = reader.block(height)?;
    let results = reader.execution_results(height)?;
    decoder.decode(raw, results)
  }

  fn index_block_with_retries(&self, block: &Block) -> Result {
    let mut errors = 0;

    loop {
      let err = match self.index_block(block) {
        Ok(()) => return Ok(()),
        Err(err) => err,
      };

      if classify(&err) == ErrorClass::Fatal {
        log::error!("Failed to index block {}: {err}", block.height());
        return Err(err);
      }

      errors += 1;

      if self.schedule.exhausted(errors) {
        log::error!(
          "Giving up on block {} after {errors} attempts",
          block.height()
        );
        return Err(err);
      }

      let backoff = self.schedule.backoff(errors);

      log::warn!(
        "Failed to index block {}, retrying in {}: {err}",
        block.height(),
        humantime::format_duration(backoff)
      );

      sleep(backoff);

      if SHUTTING_DOWN.load(atomic::Ordering::Relaxed) {
        return Err(anyhow!("shut down while retrying block {}", block.height()));
      }
    }
  }

  /// Writes every operation of `block` and moves the checkpoint, atomically.
  /// Dropping the transaction on error discards everything it wrote.
  pub fn index_block(&self, block: &Block) -> Result {
    if block.header.chain_id != self.schedule.chain_id {
      log::warn!(
        "Block {} is from chain `{}`, expected `{}`",
        block.height(),
        block.header.chain_id,
        self.schedule.chain_id,
      );
    }

    let operations = self.dispatcher.operations(block, self.state.as_ref())?;

    let wtx = self.index.begin_write()?;

    for (sequence, operation) in operations.iter().enumerate() {
      operation.apply(&wtx, sequence.try_into()?)?;
    }

    CheckpointEntry::advance(&wtx, &self.schedule.app_name, block.height(), block.time())?;

    log::info!(
      "Committing at block height {}, {} transactions, {} operations",
      block.height(),
      block.txs.len(),
      operations.len(),
    );

    wtx.commit()?;

    Ok(())
  }
}

fn sleep(duration: Duration) {
  let deadline = Instant::now() + duration;

  loop {
    let now = Instant::now();

    if now >= deadline || SHUTTING_DOWN.load(atomic::Ordering::Relaxed) {
      break;
    }

    thread::sleep((deadline - now).min(SLEEP_SLICE));
  }
}

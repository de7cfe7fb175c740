use super::*;

mod deposit;
mod v1;
mod v2;

/// Where the chain activity being dispatched happened. Block events have an
/// empty transaction hash.
pub struct Context<'a> {
  pub height: u64,
  pub time: DateTime<Utc>,
  pub tx_hash: &'a str,
  pub state: &'a dyn ChainState,
}

impl Context<'_> {
  pub fn stamp(&self) -> Stamp {
    Stamp {
      height: self.height,
      timestamp: self.time,
      tx_hash: self.tx_hash.into(),
    }
  }

  pub(crate) fn payload_error(&self, source: DecodeError, kind: &str) -> SnafuError {
    SnafuError::Payload {
      source,
      height: self.height,
      tx_hash: self.tx_hash.into(),
      kind: kind.into(),
    }
  }

  fn decode<E: TypedEvent>(&self, event: &Event) -> Result<E> {
    Ok(E::from_event(event).map_err(|source| self.payload_error(source, E::KIND))?)
  }

  fn missing<E: TypedEvent>(&self) -> SnafuError {
    SnafuError::MissingEvent {
      height: self.height,
      tx_hash: self.tx_hash.into(),
      kind: E::KIND.into(),
    }
  }
}

/// The events of one transaction, or of one message within it. Every event
/// is claimed at most once.
pub struct Cursor<'a> {
  events: &'a [Event],
  claimed: Vec<bool>,
  next: usize,
}

impl<'a> Cursor<'a> {
  pub fn new(events: &'a [Event]) -> Self {
    Self {
      events,
      claimed: vec![false; events.len()],
      next: 0,
    }
  }

  /// Claims the first unclaimed `E` after the last event claimed by `next`.
  pub fn next<E: TypedEvent>(&mut self, context: &Context) -> Result<E> {
    let index = self
      .unclaimed::<E>(self.next)
      .ok_or_else(|| context.missing::<E>())?;

    self.claimed[index] = true;
    self.next = index + 1;

    context.decode(&self.events[index])
  }

  /// Claims the first unclaimed `E` anywhere in scope. Message logs group
  /// events by kind, so their order says nothing about emission order.
  pub fn claim<E: TypedEvent>(&mut self, context: &Context) -> Result<E> {
    let index = self
      .unclaimed::<E>(0)
      .ok_or_else(|| context.missing::<E>())?;

    self.claimed[index] = true;

    context.decode(&self.events[index])
  }

  pub fn position(&self) -> usize {
    self.next
  }

  fn unclaimed<E: TypedEvent>(&self, start: usize) -> Option<usize> {
    (start..self.events.len())
      .find(|&index| !self.claimed[index] && self.events[index].kind == E::KIND)
  }
}

type MessageHandler =
  Box<dyn Fn(&Context, &Message, &mut Cursor) -> Result<Vec<Operation>> + Send + Sync>;

type EventHandler = Box<dyn Fn(&Context, &Event) -> Result<Vec<Operation>> + Send + Sync>;

fn message_handler<F>(f: F) -> MessageHandler
where
  F: Fn(&Context, &Message, &mut Cursor) -> Result<Vec<Operation>> + Send + Sync + 'static,
{
  Box::new(f)
}

fn event_handler<F>(f: F) -> EventHandler
where
  F: Fn(&Context, &Event) -> Result<Vec<Operation>> + Send + Sync + 'static,
{
  Box::new(f)
}

/// Handlers of one protocol generation, keyed by type tag.
pub struct Registry {
  name: &'static str,
  messages: HashMap<&'static str, MessageHandler>,
  begin_block: HashMap<&'static str, EventHandler>,
  end_block: HashMap<&'static str, EventHandler>,
}

impl Registry {
  pub fn new(name: &'static str) -> Self {
    Self {
      name,
      messages: HashMap::new(),
      begin_block: HashMap::new(),
      end_block: HashMap::new(),
    }
  }

  /// First generation handlers.
  pub fn v1() -> Self {
    v1::registry()
  }

  /// Second generation handlers.
  pub fn v2() -> Self {
    v2::registry()
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  /// Registers `handler` under every type URL of `M`.
  pub fn message<M: TypedMessage + 'static>(
    &mut self,
    handler: fn(&Context, M, &mut Cursor) -> Result<Vec<Operation>>,
  ) -> &mut Self {
    for type_url in M::TYPE_URLS {
      self.messages.insert(
        *type_url,
        message_handler(move |context, message, cursor| {
          let payload = M::from_message(message)
            .map_err(|source| context.payload_error(source, &message.type_url))?;
          handler(context, payload, cursor)
        }),
      );
    }
    self
  }

  pub fn begin_block<E: TypedEvent + 'static>(
    &mut self,
    handler: fn(&Context, E) -> Result<Vec<Operation>>,
  ) -> &mut Self {
    self.begin_block.insert(E::KIND, Self::event(handler));
    self
  }

  pub fn end_block<E: TypedEvent + 'static>(
    &mut self,
    handler: fn(&Context, E) -> Result<Vec<Operation>>,
  ) -> &mut Self {
    self.end_block.insert(E::KIND, Self::event(handler));
    self
  }

  fn event<E: TypedEvent + 'static>(
    handler: fn(&Context, E) -> Result<Vec<Operation>>,
  ) -> EventHandler {
    event_handler(move |context, event| handler(context, context.decode(event)?))
  }

  pub fn handles(&self, type_url: &str) -> bool {
    self.messages.contains_key(type_url)
  }

  pub fn message_count(&self) -> usize {
    self.messages.len()
  }

  fn block_events(
    handlers: &HashMap<&'static str, EventHandler>,
    context: &Context,
    events: &[Event],
  ) -> Result<Vec<Operation>> {
    let mut operations = Vec::new();

    for event in events {
      match handlers.get(event.kind.as_str()) {
        Some(handler) => operations.extend(handler(context, event)?),
        None => log::trace!("Ignoring block event `{}`", event.kind),
      }
    }

    Ok(operations)
  }
}

/// Turns decoded blocks into the operations that project them into the
/// index. Messages go to the generation whose namespace holds their type
/// URL. Block events go to the generation live at the block's height.
pub struct Dispatcher {
  v1: Registry,
  v2: Registry,
  v2_height: u64,
}

impl Dispatcher {
  pub fn new(v1: Registry, v2: Registry, v2_height: u64) -> Self {
    Self { v1, v2, v2_height }
  }

  fn generation(&self, height: u64) -> &Registry {
    if height >= self.v2_height {
      &self.v2
    } else {
      &self.v1
    }
  }

  pub fn operations(&self, block: &Block, state: &dyn ChainState) -> Result<Vec<Operation>> {
    let registry = self.generation(block.height());

    let context = Context {
      height: block.height(),
      time: block.time(),
      tx_hash: "",
      state,
    };

    let mut operations = vec![Operation::Block {
      block: BlockEntry::new(block),
      backfill: Backfill::new(block),
    }];

    operations.extend(Registry::block_events(
      &registry.begin_block,
      &context,
      &block.begin_block_events,
    )?);

    for tx in &block.txs {
      operations.push(Operation::create(&TxEntry::new(block, tx))?);

      if !tx.result.is_success() {
        log::debug!(
          "Skipping failed transaction {} at height {} with code {}",
          tx.hash,
          block.height(),
          tx.result.code,
        );
        continue;
      }

      let context = Context {
        height: block.height(),
        time: block.time(),
        tx_hash: &tx.hash,
        state,
      };

      operations.extend(self.transaction(&context, tx)?);
    }

    operations.extend(Registry::block_events(
      &registry.end_block,
      &context,
      &block.end_block_events,
    )?);

    log::debug!(
      "Dispatched {} operations for height {} through {}",
      operations.len(),
      block.height(),
      registry.name(),
    );

    Ok(operations)
  }

  fn transaction(&self, context: &Context, tx: &Tx) -> Result<Vec<Operation>> {
    let mut operations = Vec::new();

    let mut shared = Cursor::new(&tx.result.events);

    for (index, message) in tx.messages.iter().enumerate() {
      let wrapped = message
        .exec_messages()
        .map_err(|source| context.payload_error(source, &message.type_url))?;

      if wrapped
        .iter()
        .any(|inner| inner.type_url.starts_with("/sentinel."))
      {
        return Err(
          SnafuError::UnsupportedExec {
            height: context.height,
            tx_hash: context.tx_hash.to_string(),
          }
          .into(),
        );
      }

      let type_url = message.type_url.as_str();

      if let Some(handler) = self.v2.messages.get(type_url) {
        operations.extend(handler(context, message, &mut shared)?);
      } else if let Some(handler) = self.v1.messages.get(type_url) {
        let events = tx.result.message_events(index);

        if events.is_empty() && tx.result.message_logs.is_empty() {
          operations.extend(handler(context, message, &mut shared)?);
        } else {
          operations.extend(handler(context, message, &mut Cursor::new(&events))?);
        }
      } else {
        log::trace!("Ignoring message `{type_url}` in transaction {}", tx.hash);
      }
    }

    Ok(operations)
  }
}

impl Default for Dispatcher {
  fn default() -> Self {
    Self::new(Registry::v1(), Registry::v2(), Chain::Sentinelhub.v2_height())
  }
}

/// Event of a status change.
fn status_event(
  context: &Context,
  kind: EventKind,
  status: Status,
  f: impl FnOnce(&mut EventEntry),
) -> Result<Operation> {
  let mut event = EventEntry {
    status: Some(status),
    ..EventEntry::new(kind, &context.stamp())
  };
  f(&mut event);
  Operation::event(&event)
}

/// Event of any other change.
fn event(context: &Context, kind: EventKind, f: impl FnOnce(&mut EventEntry)) -> Result<Operation> {
  let mut event = EventEntry::new(kind, &context.stamp());
  f(&mut event);
  Operation::event(&event)
}

/// Re-encodes an address under `prefix`.
fn convert(context: &Context, address: &str, prefix: &str) -> Result<String> {
  Ok(convert_address(address, prefix).map_err(|source| context.payload_error(source, prefix))?)
}

fn non_empty(value: &str) -> Option<String> {
  (!value.is_empty()).then(|| value.to_string())
}

fn non_empty_coins(coins: &Coins) -> Option<Coins> {
  (!coins.is_empty()).then(|| coins.clone())
}

/// Create of an allocation plus its audit event.
fn allocation(
  context: &Context,
  id: u64,
  address: &str,
  granted_bytes: u128,
  utilised_bytes: u128,
) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::create(&AllocationEntry {
      id,
      acc_addr: address.into(),
      granted_bytes,
      utilised_bytes,
      height: context.height,
    })?,
    allocation_event(context, id, address, granted_bytes, utilised_bytes)?,
  ])
}

/// Update of an existing allocation plus its audit event.
fn allocation_update(
  context: &Context,
  id: u64,
  address: &str,
  granted_bytes: u128,
  utilised_bytes: u128,
) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::set(
      Target::allocation(id, address),
      json!({
        "granted_bytes": granted_bytes.to_string(),
        "utilised_bytes": utilised_bytes.to_string(),
      }),
    ),
    allocation_event(context, id, address, granted_bytes, utilised_bytes)?,
  ])
}

fn allocation_event(
  context: &Context,
  id: u64,
  address: &str,
  granted_bytes: u128,
  utilised_bytes: u128,
) -> Result<Operation> {
  event(context, EventKind::SubscriptionAllocationUpdateDetails, |event| {
    event.subscription_id = Some(id);
    event.acc_addr = Some(address.into());
    event.granted_bytes = Some(granted_bytes);
    event.utilised_bytes = Some(utilised_bytes);
  })
}

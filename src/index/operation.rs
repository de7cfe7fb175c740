use super::*;

/// Height, block time and transaction hash of the chain activity behind a
/// write. Block events have an empty transaction hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stamp {
  pub height: u64,
  pub timestamp: DateTime<Utc>,
  pub tx_hash: String,
}

impl Stamp {
  fn fields(&self, prefix: &str) -> Document {
    let mut document = Document::new();
    document.insert(format!("{prefix}_height"), self.height.into());
    document.insert(format!("{prefix}_timestamp"), timestamp(self.timestamp));
    document.insert(format!("{prefix}_tx_hash"), self.tx_hash.clone().into());
    document
  }
}

/// The document a field update applies to. `filter` holds the key fields an
/// upserted document starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
  pub collection: Collection,
  pub key: String,
  pub filter: Document,
}

impl Target {
  fn new(collection: Collection, key: String, filter: Value) -> Self {
    Self {
      collection,
      key,
      filter: fields(filter),
    }
  }

  pub fn node(address: &str) -> Self {
    Self::new(Collection::Nodes, address.into(), json!({ "addr": address }))
  }

  pub fn provider(address: &str) -> Self {
    Self::new(
      Collection::Providers,
      address.into(),
      json!({ "addr": address }),
    )
  }

  pub fn plan(id: u64) -> Self {
    Self::new(Collection::Plans, id_key(id), json!({ "id": id }))
  }

  pub fn session(id: u64) -> Self {
    Self::new(Collection::Sessions, id_key(id), json!({ "id": id }))
  }

  pub fn subscription(id: u64) -> Self {
    Self::new(Collection::Subscriptions, id_key(id), json!({ "id": id }))
  }

  pub fn allocation(id: u64, address: &str) -> Self {
    Self::new(
      Collection::SubscriptionAllocations,
      allocation_key(id, address),
      json!({ "id": id, "acc_addr": address }),
    )
  }
}

/// How a new subscription's price is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Pricing {
  /// From the node's gigabyte or hourly prices. Nodes registered by the
  /// first generation only carry a single `price`.
  Node {
    address: String,
    denom: String,
    hourly: bool,
  },
  /// From the plan's prices. The plan's duration also sets the expiry.
  Plan { id: u64, denom: String },
  /// Already known from the chain event.
  Fixed,
}

/// One idempotent write. A height's operations are applied in order inside a
/// single write transaction, and each operation's position in that order is
/// its sequence number.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
  Create {
    collection: Collection,
    key: String,
    document: Document,
    provenance: &'static str,
    height: u64,
  },
  Set {
    target: Target,
    fields: Document,
  },
  Transition {
    target: Target,
    status: Status,
    stamp: Stamp,
    end: bool,
    fields: Document,
  },
  AddToSet {
    target: Target,
    field: &'static str,
    value: Value,
  },
  Pull {
    target: Target,
    field: &'static str,
    value: Value,
  },
  Deposit {
    address: String,
    action: DepositAction,
    coins: Coins,
    previous: Option<Coins>,
    stamp: Stamp,
  },
  Subscribe {
    subscription: SubscriptionEntry,
    pricing: Pricing,
  },
  Append {
    collection: Collection,
    height: u64,
    document: Document,
  },
  Block {
    block: BlockEntry,
    backfill: Option<Backfill>,
  },
}

/// Converts a JSON object into a document. Anything else is an empty
/// document.
pub fn fields(value: Value) -> Document {
  match value {
    Value::Object(document) => document,
    _ => Document::new(),
  }
}

pub(crate) fn timestamp(time: DateTime<Utc>) -> Value {
  time
    .to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
    .into()
}

impl Operation {
  pub fn create<E: Unique>(entry: &E) -> Result<Self> {
    Ok(Self::Create {
      collection: E::COLLECTION,
      key: entry.key(),
      document: entry.store()?,
      provenance: E::PROVENANCE,
      height: entry.height(),
    })
  }

  pub fn append<E: Entry>(height: u64, entry: &E) -> Result<Self> {
    Ok(Self::Append {
      collection: E::COLLECTION,
      height,
      document: entry.store()?,
    })
  }

  pub fn event(event: &EventEntry) -> Result<Self> {
    Self::append(event.height, event)
  }

  pub fn set(target: Target, fields: Value) -> Self {
    Self::Set {
      target,
      fields: self::fields(fields),
    }
  }

  pub fn transition(target: Target, status: Status, stamp: &Stamp) -> Self {
    Self::Transition {
      target,
      status,
      stamp: stamp.clone(),
      end: status == Status::Inactive,
      fields: Document::new(),
    }
  }

  /// Forces `end_*` to be stamped with the status.
  pub fn ending(mut self) -> Self {
    if let Self::Transition { end, .. } = &mut self {
      *end = true;
    }
    self
  }

  /// Adds fields written together with a status transition.
  pub fn with(mut self, extra: Value) -> Self {
    if let Self::Transition { fields, .. } = &mut self {
      fields.extend(self::fields(extra));
    }
    self
  }

  pub fn apply(&self, wtx: &WriteTransaction, sequence: u64) -> Result {
    match self {
      Self::Create {
        collection,
        key,
        document,
        provenance,
        height,
      } => create(wtx, *collection, key, document, provenance, *height),
      Self::Set { target, fields } => update(wtx, target, |document| {
        document.extend(fields.clone());
        Ok(())
      }),
      Self::Transition {
        target,
        status,
        stamp,
        end,
        fields,
      } => update(wtx, target, |document| {
        document.insert("status".into(), status.to_string().into());
        document.extend(stamp.fields("status"));
        if *end {
          document.extend(stamp.fields("end"));
        }
        document.extend(fields.clone());
        Ok(())
      }),
      Self::AddToSet {
        target,
        field,
        value,
      } => update(wtx, target, |document| {
        modify_array(document, field, |values| {
          if !values.contains(value) {
            values.push(value.clone());
          }
        });
        Ok(())
      }),
      Self::Pull {
        target,
        field,
        value,
      } => update(wtx, target, |document| {
        modify_array(document, field, |values| {
          values.retain(|element| element != value)
        });
        Ok(())
      }),
      Self::Deposit {
        address,
        action,
        coins,
        previous,
        stamp,
      } => deposit(
        wtx,
        address,
        *action,
        coins,
        previous.as_ref(),
        stamp,
        log_key(stamp.height, sequence),
      ),
      Self::Subscribe {
        subscription,
        pricing,
      } => subscribe(wtx, subscription, pricing),
      Self::Append {
        collection,
        height,
        document,
      } => put(wtx, *collection, &log_key(*height, sequence), document),
      Self::Block { block, backfill } => self::block(wtx, block, backfill.as_ref()),
    }
  }
}

fn create(
  wtx: &WriteTransaction,
  collection: Collection,
  key: &str,
  document: &Document,
  provenance: &str,
  height: u64,
) -> Result {
  if let Some(existing) = find(wtx, collection, key)? {
    let existing = existing.get(provenance).and_then(Value::as_u64);

    if existing == Some(height) {
      log::debug!("Skipping replayed create of {collection} `{key}` at height {height}");
      return Ok(());
    }

    return Err(
      SnafuError::Duplicate {
        collection,
        key: key.to_string(),
        existing,
        height,
      }
      .into(),
    );
  }

  put(wtx, collection, key, document)
}

/// Read-modify-write of one document. Fields the update does not touch are
/// kept, and a missing document starts from the target's filter.
fn update(
  wtx: &WriteTransaction,
  target: &Target,
  f: impl FnOnce(&mut Document) -> Result,
) -> Result {
  let mut document =
    find(wtx, target.collection, &target.key)?.unwrap_or_else(|| target.filter.clone());

  f(&mut document)?;

  put(wtx, target.collection, &target.key, &document)
}

fn modify_array(document: &mut Document, field: &str, f: impl FnOnce(&mut Vec<Value>)) {
  match document.get_mut(field) {
    Some(Value::Array(values)) => f(values),
    _ => {
      let mut values = Vec::new();
      f(&mut values);
      document.insert(field.into(), Value::Array(values));
    }
  }
}

fn coins(collection: Collection, key: &str, value: Option<&Value>) -> Result<Coins> {
  match value {
    None | Some(Value::Null) => Ok(Coins::default()),
    Some(value) => Ok(
      serde_json::from_value(value.clone())
        .map_err(|source| SnafuError::Corrupt {
          source,
          collection,
          key: key.to_string(),
        })?,
    ),
  }
}

fn deposit(
  wtx: &WriteTransaction,
  address: &str,
  action: DepositAction,
  delta: &Coins,
  previous: Option<&Coins>,
  stamp: &Stamp,
  watermark: String,
) -> Result {
  let collection = Collection::Deposits;

  let existing = find(wtx, collection, address)?;

  if action == DepositAction::Subtract && existing.is_none() {
    return Err(
      SnafuError::MissingDocument {
        collection,
        key: address.to_string(),
      }
      .into(),
    );
  }

  let balance = match previous {
    Some(previous) => previous.clone(),
    None => {
      if let Some(applied) = existing
        .as_ref()
        .and_then(|document| document.get("watermark"))
        .and_then(Value::as_str)
      {
        if applied >= watermark.as_str() {
          log::debug!("Skipping replayed deposit change of `{address}` at {watermark}");
          return Ok(());
        }
      }

      coins(
        collection,
        address,
        existing.as_ref().and_then(|document| document.get("coins")),
      )?
    }
  };

  let balance = match action {
    DepositAction::Add => {
      balance
        .checked_add(delta)
        .ok_or_else(|| SnafuError::DepositOverflow {
          address: address.to_string(),
          height: stamp.height,
        })?
    }
    DepositAction::Subtract => {
      balance
        .checked_sub(delta)
        .ok_or_else(|| SnafuError::DepositUnderflow {
          address: address.to_string(),
          height: stamp.height,
        })?
    }
  };

  let mut document = existing.unwrap_or_else(|| fields(json!({ "addr": address })));

  document.insert("coins".into(), serde_json::to_value(&balance)?);
  document.insert("height".into(), stamp.height.into());
  document.insert("timestamp".into(), timestamp(stamp.timestamp));
  document.insert("tx_hash".into(), stamp.tx_hash.clone().into());
  document.insert("watermark".into(), watermark.into());

  put(wtx, collection, address, &document)
}

fn subscribe(wtx: &WriteTransaction, subscription: &SubscriptionEntry, pricing: &Pricing) -> Result {
  let mut subscription = subscription.clone();

  match pricing {
    Pricing::Node {
      address,
      denom,
      hourly,
    } => {
      if let Some(node) = find(wtx, Collection::Nodes, address)? {
        let field = if *hourly {
          "hourly_prices"
        } else {
          "gigabyte_prices"
        };

        let prices = match node.get(field) {
          Some(prices) if !prices.is_null() => prices,
          _ => node.get("price").unwrap_or(&Value::Null),
        };

        subscription.price = coins(Collection::Nodes, address, Some(prices))?
          .get(denom)
          .cloned();
      }
    }
    Pricing::Plan { id, denom } => {
      let key = id_key(*id);

      if let Some(plan) = find(wtx, Collection::Plans, &key)? {
        subscription.price = coins(Collection::Plans, &key, plan.get("prices"))?
          .get(denom)
          .cloned();

        if subscription.inactive_at.is_none() {
          let duration = plan.get("duration").and_then(Value::as_i64).unwrap_or(0);

          subscription.inactive_at = subscription
            .start_timestamp
            .checked_add_signed(chrono::TimeDelta::nanoseconds(duration));
        }
      }
    }
    Pricing::Fixed => {}
  }

  if subscription.price.is_none() {
    log::warn!(
      "No price found for subscription {} at height {}",
      subscription.id,
      subscription.start_height,
    );
  }

  create(
    wtx,
    SubscriptionEntry::COLLECTION,
    &subscription.key(),
    &subscription.store()?,
    SubscriptionEntry::PROVENANCE,
    subscription.height(),
  )
}

fn block(wtx: &WriteTransaction, block: &BlockEntry, backfill: Option<&Backfill>) -> Result {
  let collection = Collection::Blocks;

  let mut block = block.clone();

  if block.height > 1 {
    let key = id_key(block.height - 1);

    if let Some(mut previous) = find(wtx, collection, &key)? {
      if let Some(time) = previous
        .get("time")
        .and_then(Value::as_str)
        .and_then(|time| DateTime::parse_from_rfc3339(time).ok())
      {
        block.duration = (block.time - time.with_timezone(&Utc))
          .num_nanoseconds()
          .unwrap_or(0);
      }

      if let Some(backfill) = backfill.filter(|backfill| backfill.height == block.height - 1) {
        previous.insert("round".into(), backfill.round.into());
        previous.insert(
          "signatures".into(),
          serde_json::to_value(&backfill.signatures)?,
        );
        previous.insert("commit_hash".into(), backfill.commit_hash.clone().into());
        previous.insert("results_hash".into(), backfill.results_hash.clone().into());
        put(wtx, collection, &key, &previous)?;
      }
    }
  }

  create(
    wtx,
    collection,
    &block.key(),
    &block.store()?,
    BlockEntry::PROVENANCE,
    block.height,
  )
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  struct Context {
    index: Index,
    _tempdir: tempfile::TempDir,
  }

  impl Context {
    fn new() -> Self {
      let tempdir = tempfile::TempDir::new().unwrap();
      let index = Index::open_with_path(&tempdir.path().join("index.redb"), 1 << 20).unwrap();
      Self {
        index,
        _tempdir: tempdir,
      }
    }

    fn apply(&self, operations: &[Operation]) -> Result {
      let wtx = self.index.begin_write()?;
      for (sequence, operation) in operations.iter().enumerate() {
        operation.apply(&wtx, sequence as u64)?;
      }
      wtx.commit()?;
      Ok(())
    }

    fn get(&self, collection: Collection, key: &str) -> Value {
      Value::Object(self.index.get(collection, key).unwrap().unwrap())
    }
  }

  fn stamp(height: u64) -> Stamp {
    Stamp {
      height,
      timestamp: "2023-01-01T00:00:00Z".parse().unwrap(),
      tx_hash: format!("TX{height}"),
    }
  }

  fn node(height: u64) -> NodeEntry {
    NodeEntry {
      addr: "sentnode1abc".into(),
      gigabyte_prices: Some("5udvpn".parse().unwrap()),
      hourly_prices: Some("2udvpn".parse().unwrap()),
      remote_url: "https://node".into(),
      register_height: height,
      register_timestamp: stamp(height).timestamp,
      register_tx_hash: stamp(height).tx_hash,
      status: Status::Inactive,
      status_height: height,
      status_timestamp: stamp(height).timestamp,
      status_tx_hash: stamp(height).tx_hash,
      ..default()
    }
  }

  #[test]
  fn replayed_create_is_skipped() {
    let context = Context::new();

    context.apply(&[Operation::create(&node(100)).unwrap()]).unwrap();
    context.apply(&[Operation::create(&node(100)).unwrap()]).unwrap();

    assert_eq!(context.index.count(Collection::Nodes).unwrap(), 1);
  }

  #[test]
  fn duplicate_create_is_fatal() {
    let context = Context::new();

    context.apply(&[Operation::create(&node(100)).unwrap()]).unwrap();

    let err = context
      .apply(&[Operation::create(&node(150)).unwrap()])
      .unwrap_err();

    assert_eq!(classify(&err), ErrorClass::Fatal);
    assert!(matches!(
      err.downcast_ref::<SnafuError>(),
      Some(SnafuError::Duplicate {
        existing: Some(100),
        height: 150,
        ..
      })
    ));
  }

  #[test]
  fn transition_touches_only_status_fields() {
    let context = Context::new();

    context.apply(&[Operation::create(&node(100)).unwrap()]).unwrap();

    let before = context.get(Collection::Nodes, "sentnode1abc");

    context
      .apply(&[Operation::transition(
        Target::node("sentnode1abc"),
        Status::Active,
        &stamp(101),
      )])
      .unwrap();

    let mut expected = before;
    expected["status"] = "active".into();
    expected["status_height"] = 101.into();
    expected["status_tx_hash"] = "TX101".into();

    assert_eq!(context.get(Collection::Nodes, "sentnode1abc"), expected);
  }

  #[test]
  fn inactive_transition_stamps_end() {
    let context = Context::new();

    context
      .apply(&[
        Operation::transition(Target::session(7), Status::Inactive, &stamp(120))
          .with(json!({ "rating": 0 })),
      ])
      .unwrap();

    let session = context.get(Collection::Sessions, &id_key(7));

    assert_eq!(session["id"], 7);
    assert_eq!(session["status"], "inactive");
    assert_eq!(session["end_height"], 120);
    assert_eq!(session["end_tx_hash"], "TX120");
    assert_eq!(session["rating"], 0);
  }

  #[test]
  fn pending_transition_stamps_end_only_when_forced() {
    let context = Context::new();

    context
      .apply(&[
        Operation::transition(Target::session(1), Status::InactivePending, &stamp(10)),
        Operation::transition(Target::session(2), Status::InactivePending, &stamp(10)).ending(),
      ])
      .unwrap();

    assert!(context.get(Collection::Sessions, &id_key(1)).get("end_height").is_none());
    assert_eq!(context.get(Collection::Sessions, &id_key(2))["end_height"], 10);
  }

  #[test]
  fn set_preserves_foreign_fields() {
    let context = Context::new();

    context.apply(&[Operation::create(&node(100)).unwrap()]).unwrap();

    let mut document = context.index.get(Collection::Nodes, "sentnode1abc").unwrap().unwrap();
    document.insert("reach_error".into(), "timeout".into());

    let wtx = context.index.begin_write().unwrap();
    put(&wtx, Collection::Nodes, "sentnode1abc", &document).unwrap();
    wtx.commit().unwrap();

    context
      .apply(&[Operation::set(
        Target::node("sentnode1abc"),
        json!({ "remote_url": "https://moved" }),
      )])
      .unwrap();

    let node = context.get(Collection::Nodes, "sentnode1abc");

    assert_eq!(node["remote_url"], "https://moved");
    assert_eq!(node["reach_error"], "timeout");
  }

  #[test]
  fn add_to_set_and_pull() {
    let context = Context::new();

    let target = Target::plan(4);

    context
      .apply(&[
        Operation::AddToSet {
          target: target.clone(),
          field: "node_addrs",
          value: "sentnode1a".into(),
        },
        Operation::AddToSet {
          target: target.clone(),
          field: "node_addrs",
          value: "sentnode1a".into(),
        },
        Operation::AddToSet {
          target: target.clone(),
          field: "node_addrs",
          value: "sentnode1b".into(),
        },
        Operation::Pull {
          target,
          field: "node_addrs",
          value: "sentnode1a".into(),
        },
      ])
      .unwrap();

    assert_eq!(
      context.get(Collection::Plans, &id_key(4))["node_addrs"],
      json!(["sentnode1b"])
    );
  }

  #[test]
  fn deposit_deltas_are_not_reapplied() {
    let context = Context::new();

    let add = Operation::Deposit {
      address: "sent1abc".into(),
      action: DepositAction::Add,
      coins: "10udvpn".parse().unwrap(),
      previous: None,
      stamp: stamp(100),
    };

    context.apply(&[add.clone()]).unwrap();
    context.apply(&[add]).unwrap();

    assert_eq!(
      context.index.entry::<DepositEntry>("sent1abc").unwrap().unwrap().coins,
      "10udvpn".parse().unwrap()
    );

    context
      .apply(&[Operation::Deposit {
        address: "sent1abc".into(),
        action: DepositAction::Subtract,
        coins: "4udvpn".parse().unwrap(),
        previous: None,
        stamp: stamp(101),
      }])
      .unwrap();

    assert_eq!(
      context.index.entry::<DepositEntry>("sent1abc").unwrap().unwrap().coins,
      "6udvpn".parse().unwrap()
    );
  }

  #[test]
  fn deposit_with_previous_balance_is_absolute() {
    let context = Context::new();

    let add = Operation::Deposit {
      address: "sent1abc".into(),
      action: DepositAction::Add,
      coins: "10udvpn".parse().unwrap(),
      previous: Some("5udvpn".parse().unwrap()),
      stamp: stamp(100),
    };

    context.apply(&[add.clone()]).unwrap();
    context.apply(&[add]).unwrap();

    assert_eq!(
      context.index.entry::<DepositEntry>("sent1abc").unwrap().unwrap().coins,
      "15udvpn".parse().unwrap()
    );
  }

  #[test]
  fn subtract_from_missing_deposit_is_fatal() {
    let context = Context::new();

    let err = context
      .apply(&[Operation::Deposit {
        address: "sent1abc".into(),
        action: DepositAction::Subtract,
        coins: "1udvpn".parse().unwrap(),
        previous: None,
        stamp: stamp(100),
      }])
      .unwrap_err();

    assert_eq!(classify(&err), ErrorClass::Fatal);
    assert_eq!(context.index.count(Collection::Deposits).unwrap(), 0);
  }

  #[test]
  fn deposit_underflow_is_fatal() {
    let context = Context::new();

    let err = context
      .apply(&[
        Operation::Deposit {
          address: "sent1abc".into(),
          action: DepositAction::Add,
          coins: "1udvpn".parse().unwrap(),
          previous: None,
          stamp: stamp(100),
        },
        Operation::Deposit {
          address: "sent1abc".into(),
          action: DepositAction::Subtract,
          coins: "2udvpn".parse().unwrap(),
          previous: None,
          stamp: stamp(100),
        },
      ])
      .unwrap_err();

    assert!(matches!(
      err.downcast_ref::<SnafuError>(),
      Some(SnafuError::DepositUnderflow { height: 100, .. })
    ));
  }

  #[test]
  fn deposit_overflow_is_fatal() {
    let context = Context::new();

    let err = context
      .apply(&[
        Operation::Deposit {
          address: "sent1abc".into(),
          action: DepositAction::Add,
          coins: Coins::from(Coin::new(u128::MAX, "udvpn")),
          previous: None,
          stamp: stamp(100),
        },
        Operation::Deposit {
          address: "sent1abc".into(),
          action: DepositAction::Add,
          coins: "1udvpn".parse().unwrap(),
          previous: None,
          stamp: stamp(100),
        },
      ])
      .unwrap_err();

    assert!(matches!(
      err.downcast_ref::<SnafuError>(),
      Some(SnafuError::DepositOverflow { height: 100, .. })
    ));
    assert_eq!(classify(&err), ErrorClass::Fatal);
  }

  #[test]
  fn subscription_price_from_node() {
    let context = Context::new();

    let subscription = |hours| SubscriptionEntry {
      id: hours as u64 + 1,
      acc_addr: "sent1abc".into(),
      node_addr: Some("sentnode1abc".into()),
      gigabytes: Some(if hours == 0 { 5 } else { 0 }),
      hours: Some(hours),
      start_height: 101,
      status: Status::Active,
      ..default()
    };

    let pricing = |hourly| Pricing::Node {
      address: "sentnode1abc".into(),
      denom: "udvpn".into(),
      hourly,
    };

    context
      .apply(&[
        Operation::create(&node(100)).unwrap(),
        Operation::Subscribe {
          subscription: subscription(0),
          pricing: pricing(false),
        },
        Operation::Subscribe {
          subscription: subscription(3),
          pricing: pricing(true),
        },
      ])
      .unwrap();

    let by_gigabyte = context.index.entry::<SubscriptionEntry>(&id_key(1)).unwrap().unwrap();
    let by_hour = context.index.entry::<SubscriptionEntry>(&id_key(4)).unwrap().unwrap();

    assert_eq!(by_gigabyte.price, Some(Coin::new(5, "udvpn")));
    assert_eq!(by_hour.price, Some(Coin::new(2, "udvpn")));
  }

  #[test]
  fn subscription_price_and_expiry_from_plan() {
    let context = Context::new();

    let plan = PlanEntry {
      id: 2,
      prov_addr: "sentprov1abc".into(),
      prices: "100udvpn".parse().unwrap(),
      duration: 3_600_000_000_000,
      create_height: 90,
      status: Status::Active,
      ..default()
    };

    let subscription = SubscriptionEntry {
      id: 9,
      acc_addr: "sent1abc".into(),
      plan_id: Some(2),
      start_height: 101,
      start_timestamp: stamp(101).timestamp,
      status: Status::Active,
      ..default()
    };

    context
      .apply(&[
        Operation::create(&plan).unwrap(),
        Operation::Subscribe {
          subscription,
          pricing: Pricing::Plan {
            id: 2,
            denom: "udvpn".into(),
          },
        },
      ])
      .unwrap();

    let subscription = context.index.entry::<SubscriptionEntry>(&id_key(9)).unwrap().unwrap();

    assert_eq!(subscription.price, Some(Coin::new(100, "udvpn")));
    assert_eq!(
      subscription.inactive_at,
      Some("2023-01-01T01:00:00Z".parse().unwrap())
    );
  }

  #[test]
  fn missing_price_leaves_field_empty() {
    let context = Context::new();

    context
      .apply(&[Operation::Subscribe {
        subscription: SubscriptionEntry {
          id: 1,
          start_height: 5,
          ..default()
        },
        pricing: Pricing::Plan {
          id: 77,
          denom: "udvpn".into(),
        },
      }])
      .unwrap();

    let subscription = context.get(Collection::Subscriptions, &id_key(1));

    assert!(subscription.get("price").is_none());
    assert!(subscription.get("inactive_at").is_none());
  }

  #[test]
  fn appends_are_keyed_by_sequence() {
    let context = Context::new();

    let event = EventEntry {
      node_addr: Some("sentnode1abc".into()),
      ..EventEntry::new(EventKind::NodeUpdateStatus, &stamp(100))
    };

    let operations = [
      Operation::set(Target::node("sentnode1abc"), json!({})),
      Operation::event(&event).unwrap(),
    ];

    context.apply(&operations).unwrap();
    context.apply(&operations).unwrap();

    assert_eq!(context.index.count(Collection::Events).unwrap(), 1);
    assert_eq!(
      context.index.entries::<EventEntry>().unwrap(),
      vec![event]
    );
    assert!(context.index.get(Collection::Events, &log_key(100, 1)).unwrap().is_some());
  }

  fn block_entry(height: u64, time: &str) -> BlockEntry {
    BlockEntry {
      height,
      id: format!("B{height}"),
      chain_id: "sentinelhub-2".into(),
      time: time.parse().unwrap(),
      version: "11.0".into(),
      num_txs: 0,
      duration: 0,
      proposer_address: String::new(),
      app_hash: String::new(),
      consensus_hash: String::new(),
      data_hash: String::new(),
      evidence_hash: String::new(),
      last_block_id: String::new(),
      last_commit_hash: String::new(),
      last_results_hash: String::new(),
      next_validators_hash: String::new(),
      validators_hash: String::new(),
      begin_block_events: Vec::new(),
      end_block_events: Vec::new(),
      validator_updates: Vec::new(),
      consensus_param_updates: None,
      round: None,
      signatures: None,
      commit_hash: None,
      results_hash: None,
    }
  }

  #[test]
  fn block_backfills_previous_block() {
    let context = Context::new();

    context
      .apply(&[Operation::Block {
        block: block_entry(100, "2023-01-01T00:00:00Z"),
        backfill: None,
      }])
      .unwrap();

    context
      .apply(&[Operation::Block {
        block: block_entry(101, "2023-01-01T00:00:06.5Z"),
        backfill: Some(Backfill {
          height: 100,
          round: 2,
          signatures: Vec::new(),
          commit_hash: "CC".into(),
          results_hash: "RR".into(),
        }),
      }])
      .unwrap();

    let previous = context.index.entry::<BlockEntry>(&id_key(100)).unwrap().unwrap();
    let current = context.index.entry::<BlockEntry>(&id_key(101)).unwrap().unwrap();

    assert_eq!(previous.round, Some(2));
    assert_eq!(previous.commit_hash.as_deref(), Some("CC"));
    assert_eq!(previous.results_hash.as_deref(), Some("RR"));
    assert_eq!(current.duration, 6_500_000_000);
    assert_eq!(current.round, None);
  }

  #[test]
  fn first_block_has_no_duration() {
    let context = Context::new();

    context
      .apply(&[Operation::Block {
        block: block_entry(100, "2023-01-01T00:00:00Z"),
        backfill: Some(Backfill {
          height: 99,
          round: 0,
          signatures: Vec::new(),
          commit_hash: "CC".into(),
          results_hash: "RR".into(),
        }),
      }])
      .unwrap();

    assert_eq!(context.index.count(Collection::Blocks).unwrap(), 1);
    assert_eq!(
      context.index.entry::<BlockEntry>(&id_key(100)).unwrap().unwrap().duration,
      0
    );
  }
}

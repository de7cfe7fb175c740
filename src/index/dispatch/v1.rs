use {
  super::*,
  hubtypes::{
    deposit,
    v1::{events::*, node, plan, provider, session, subscription},
  },
};

pub(super) fn registry() -> Registry {
  let mut registry = Registry::new("v1");

  registry
    .message(node_register)
    .message(node_update)
    .message(node_set_status)
    .message(plan_add)
    .message(plan_set_status)
    .message(plan_add_node)
    .message(plan_remove_node)
    .message(provider_register)
    .message(provider_update)
    .message(session_start)
    .message(session_update)
    .message(session_end)
    .message(subscribe_to_node)
    .message(subscribe_to_plan)
    .message(subscription_cancel)
    .message(add_quota)
    .message(update_quota)
    .end_block(super::deposit::subtract)
    .end_block(node_status_changed)
    .end_block(session_ended)
    .end_block(session_paid)
    .end_block(subscription_cancelled)
    .end_block(subscription_refunded)
    .end_block(quota_updated);

  registry
}

fn node_register(context: &Context, msg: node::MsgRegister, _: &mut Cursor) -> Result<Vec<Operation>> {
  let stamp = context.stamp();

  Ok(vec![Operation::create(&NodeEntry {
    addr: convert(context, &msg.from, NODE_PREFIX)?,
    provider: non_empty(&msg.provider),
    price: non_empty_coins(&msg.price),
    gigabyte_prices: None,
    hourly_prices: None,
    remote_url: msg.remote_url,
    register_height: stamp.height,
    register_timestamp: stamp.timestamp,
    register_tx_hash: stamp.tx_hash.clone(),
    status: Status::Inactive,
    status_height: stamp.height,
    status_timestamp: stamp.timestamp,
    status_tx_hash: stamp.tx_hash,
  })?])
}

fn node_update(context: &Context, msg: node::MsgUpdate, _: &mut Cursor) -> Result<Vec<Operation>> {
  let mut fields = Document::new();

  if !msg.provider.is_empty() {
    fields.insert("provider".into(), msg.provider.clone().into());
    fields.insert("price".into(), Value::Null);
  } else if !msg.price.is_empty() {
    fields.insert("price".into(), serde_json::to_value(&msg.price)?);
    fields.insert("provider".into(), Value::Null);
  }

  if !msg.remote_url.is_empty() {
    fields.insert("remote_url".into(), msg.remote_url.clone().into());
  }

  Ok(vec![
    Operation::Set {
      target: Target::node(&msg.from),
      fields,
    },
    event(context, EventKind::NodeUpdateDetails, |event| {
      event.node_addr = Some(msg.from);
      event.prov_addr = non_empty(&msg.provider);
      event.price = non_empty_coins(&msg.price);
      event.remote_url = non_empty(&msg.remote_url);
    })?,
  ])
}

fn node_set_status(
  context: &Context,
  msg: node::MsgSetStatus,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::transition(Target::node(&msg.from), msg.status, &context.stamp()),
    status_event(context, EventKind::NodeUpdateStatus, msg.status, |event| {
      event.node_addr = Some(msg.from);
    })?,
  ])
}

fn plan_add(context: &Context, msg: plan::MsgAdd, cursor: &mut Cursor) -> Result<Vec<Operation>> {
  let added = cursor.claim::<EventAddPlan>(context)?;

  let stamp = context.stamp();

  Ok(vec![Operation::create(&PlanEntry {
    id: added.id,
    prov_addr: convert(context, &msg.from, PROVIDER_PREFIX)?,
    prices: msg.price,
    duration: msg.validity.as_nanos(),
    gigabytes: None,
    bytes: Some(msg.bytes),
    node_addrs: Vec::new(),
    create_height: stamp.height,
    create_timestamp: stamp.timestamp,
    create_tx_hash: stamp.tx_hash.clone(),
    status: Status::Inactive,
    status_height: stamp.height,
    status_timestamp: stamp.timestamp,
    status_tx_hash: stamp.tx_hash,
  })?])
}

fn plan_set_status(
  context: &Context,
  msg: plan::MsgSetStatus,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::transition(Target::plan(msg.id), msg.status, &context.stamp()),
    status_event(context, EventKind::PlanUpdateStatus, msg.status, |event| {
      event.plan_id = Some(msg.id);
    })?,
  ])
}

fn plan_add_node(context: &Context, msg: plan::MsgAddNode, _: &mut Cursor) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::AddToSet {
      target: Target::plan(msg.id),
      field: "node_addrs",
      value: msg.address.clone().into(),
    },
    event(context, EventKind::PlanLinkNode, |event| {
      event.plan_id = Some(msg.id);
      event.node_addr = Some(msg.address);
    })?,
  ])
}

fn plan_remove_node(
  context: &Context,
  msg: plan::MsgRemoveNode,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::Pull {
      target: Target::plan(msg.id),
      field: "node_addrs",
      value: msg.address.clone().into(),
    },
    event(context, EventKind::PlanUnlinkNode, |event| {
      event.plan_id = Some(msg.id);
      event.node_addr = Some(msg.address);
    })?,
  ])
}

fn provider_register(
  context: &Context,
  msg: provider::MsgRegister,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  let stamp = context.stamp();

  Ok(vec![Operation::create(&ProviderEntry {
    addr: convert(context, &msg.from, PROVIDER_PREFIX)?,
    name: msg.name,
    identity: msg.identity,
    website: msg.website,
    description: msg.description,
    register_height: stamp.height,
    register_timestamp: stamp.timestamp,
    register_tx_hash: stamp.tx_hash.clone(),
    status: Status::Unspecified,
    status_height: stamp.height,
    status_timestamp: stamp.timestamp,
    status_tx_hash: stamp.tx_hash,
  })?])
}

fn provider_update(
  context: &Context,
  msg: provider::MsgUpdate,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  provider_details(
    context,
    &msg.from,
    &msg.name,
    &msg.identity,
    &msg.website,
    &msg.description,
    Status::Unspecified,
  )
}

/// Update of the descriptive provider fields that are set, plus its event.
/// A specified `status` also moves the provider to it. Shared by both
/// generations.
pub(super) fn provider_details(
  context: &Context,
  address: &str,
  name: &str,
  identity: &str,
  website: &str,
  description: &str,
  status: Status,
) -> Result<Vec<Operation>> {
  let mut fields = Document::new();

  for (field, value) in [
    ("name", name),
    ("identity", identity),
    ("website", website),
    ("description", description),
  ] {
    if !value.is_empty() {
      fields.insert(field.into(), value.into());
    }
  }

  let mut operations = vec![Operation::Set {
    target: Target::provider(address),
    fields,
  }];

  if status.is_specified() {
    operations.push(Operation::transition(
      Target::provider(address),
      status,
      &context.stamp(),
    ));
  }

  operations.push(event(context, EventKind::ProviderUpdateDetails, |event| {
    event.prov_addr = Some(address.into());
    event.name = non_empty(name);
    event.identity = non_empty(identity);
    event.website = non_empty(website);
    event.description = non_empty(description);
    event.status = status.is_specified().then_some(status);
  })?);

  Ok(operations)
}

fn session_start(
  context: &Context,
  msg: session::MsgStart,
  cursor: &mut Cursor,
) -> Result<Vec<Operation>> {
  let started = cursor.claim::<EventStartSession>(context)?;

  let stamp = context.stamp();

  Ok(vec![Operation::create(&SessionEntry {
    id: started.id,
    subscription_id: msg.id,
    acc_addr: msg.from,
    node_addr: msg.node,
    start_height: stamp.height,
    start_timestamp: stamp.timestamp,
    start_tx_hash: stamp.tx_hash.clone(),
    status: Status::Active,
    status_height: stamp.height,
    status_timestamp: stamp.timestamp,
    status_tx_hash: stamp.tx_hash,
    ..default()
  })?])
}

fn session_update(
  context: &Context,
  msg: session::MsgUpdate,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  session_details(
    context,
    msg.proof.id,
    msg.proof.bandwidth,
    msg.proof.duration.as_nanos(),
  )
}

/// Overwrites a session's counters with new totals. Shared by both
/// generations.
pub(super) fn session_details(
  context: &Context,
  id: u64,
  bandwidth: Bandwidth,
  duration: i64,
) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::set(
      Target::session(id),
      json!({
        "bandwidth": bandwidth,
        "duration": duration,
      }),
    ),
    event(context, EventKind::SessionUpdateDetails, |event| {
      event.session_id = Some(id);
      event.bandwidth = Some(bandwidth);
      event.duration = Some(duration);
    })?,
  ])
}

fn session_end(context: &Context, msg: session::MsgEnd, _: &mut Cursor) -> Result<Vec<Operation>> {
  session_status(context, msg.id, Status::InactivePending, Some(msg.rating))
}

/// Status change of a session. Ended by its owner when `rating` is set,
/// otherwise by the chain, which resets the rating of a pending session.
pub(super) fn session_status(
  context: &Context,
  id: u64,
  status: Status,
  rating: Option<u64>,
) -> Result<Vec<Operation>> {
  let stamp = context.stamp();

  let transition = match rating {
    Some(rating) => Operation::transition(Target::session(id), status, &stamp)
      .ending()
      .with(json!({ "rating": rating })),
    None if status == Status::InactivePending => {
      Operation::transition(Target::session(id), status, &stamp).with(json!({ "rating": 0 }))
    }
    None => Operation::transition(Target::session(id), status, &stamp),
  };

  Ok(vec![
    transition,
    status_event(context, EventKind::SessionUpdateStatus, status, |event| {
      event.session_id = Some(id);
    })?,
  ])
}

fn subscribe_to_node(
  context: &Context,
  _: subscription::MsgSubscribeToNode,
  cursor: &mut Cursor,
) -> Result<Vec<Operation>> {
  let subscribed = cursor.claim::<EventSubscribeToNode>(context)?;
  let quota = cursor.claim::<EventAddQuota>(context)?.0;
  let deposit = cursor.claim::<deposit::EventAdd>(context)?;

  let stamp = context.stamp();

  let pricing = if subscribed.price.is_some() {
    Pricing::Fixed
  } else {
    Pricing::Node {
      address: subscribed.node.clone(),
      denom: subscribed.deposit.denom.clone(),
      hourly: false,
    }
  };

  let mut operations = vec![Operation::Subscribe {
    subscription: SubscriptionEntry {
      id: subscribed.id,
      acc_addr: subscribed.owner,
      node_addr: Some(subscribed.node),
      price: subscribed.price,
      deposit: Some(subscribed.deposit),
      start_height: stamp.height,
      start_timestamp: stamp.timestamp,
      start_tx_hash: stamp.tx_hash.clone(),
      status: Status::Active,
      status_height: stamp.height,
      status_timestamp: stamp.timestamp,
      status_tx_hash: stamp.tx_hash,
      ..default()
    },
    pricing,
  }];

  operations.extend(allocation(
    context,
    quota.id,
    &quota.address,
    quota.allocated,
    quota.consumed,
  )?);

  operations.extend(super::deposit::add(context, deposit)?);

  Ok(operations)
}

fn subscribe_to_plan(
  context: &Context,
  msg: subscription::MsgSubscribeToPlan,
  cursor: &mut Cursor,
) -> Result<Vec<Operation>> {
  let subscribed = cursor.claim::<EventSubscribeToPlan>(context)?;
  let quota = cursor.claim::<EventAddQuota>(context)?.0;

  let stamp = context.stamp();

  let denom = subscribed
    .payment
    .as_ref()
    .map(|payment| payment.denom.clone())
    .unwrap_or(msg.denom);

  let mut operations = vec![Operation::Subscribe {
    subscription: SubscriptionEntry {
      id: subscribed.id,
      acc_addr: subscribed.owner,
      plan_id: Some(subscribed.plan),
      denom: Some(denom.clone()),
      payment: subscribed.payment,
      inactive_at: subscribed.expiry,
      start_height: stamp.height,
      start_timestamp: stamp.timestamp,
      start_tx_hash: stamp.tx_hash.clone(),
      status: Status::Active,
      status_height: stamp.height,
      status_timestamp: stamp.timestamp,
      status_tx_hash: stamp.tx_hash,
      ..default()
    },
    pricing: Pricing::Plan {
      id: subscribed.plan,
      denom,
    },
  }];

  operations.extend(allocation(
    context,
    quota.id,
    &quota.address,
    quota.allocated,
    quota.consumed,
  )?);

  Ok(operations)
}

fn subscription_cancel(
  context: &Context,
  msg: subscription::MsgCancel,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  subscription_status(context, msg.id, Status::InactivePending, true)
}

/// Status change of a subscription. `cancelled` when its owner ended it.
pub(super) fn subscription_status(
  context: &Context,
  id: u64,
  status: Status,
  cancelled: bool,
) -> Result<Vec<Operation>> {
  let mut transition = Operation::transition(Target::subscription(id), status, &context.stamp());

  if cancelled {
    transition = transition.ending();
  }

  Ok(vec![
    transition,
    status_event(context, EventKind::SubscriptionUpdateStatus, status, |event| {
      event.subscription_id = Some(id);
    })?,
  ])
}

fn add_quota(context: &Context, _: subscription::MsgAddQuota, cursor: &mut Cursor) -> Result<Vec<Operation>> {
  let quota = cursor.claim::<EventAddQuota>(context)?.0;

  let mut operations = allocation(
    context,
    quota.id,
    &quota.address,
    quota.allocated,
    quota.consumed,
  )?;

  operations.extend(free(context, &quota)?);

  Ok(operations)
}

fn update_quota(
  context: &Context,
  _: subscription::MsgUpdateQuota,
  cursor: &mut Cursor,
) -> Result<Vec<Operation>> {
  let quota = cursor.claim::<EventUpdateQuota>(context)?.0;

  let mut operations = allocation_update(
    context,
    quota.id,
    &quota.address,
    quota.allocated,
    quota.consumed,
  )?;

  operations.extend(free(context, &quota)?);

  Ok(operations)
}

/// The subscription's unallocated bytes, when the quota event reports them.
fn free(context: &Context, quota: &Quota) -> Result<Vec<Operation>> {
  let Some(free) = quota.free else {
    return Ok(Vec::new());
  };

  Ok(vec![
    Operation::set(
      Target::subscription(quota.id),
      json!({ "free": free.to_string() }),
    ),
    event(context, EventKind::SubscriptionUpdateDetails, |event| {
      event.subscription_id = Some(quota.id);
      event.free = Some(free);
    })?,
  ])
}

fn node_status_changed(context: &Context, event: EventSetNodeStatus) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::transition(Target::node(&event.address), event.status, &context.stamp()),
    status_event(context, EventKind::NodeUpdateStatus, event.status, |entry| {
      entry.node_addr = Some(event.address);
    })?,
  ])
}

fn session_ended(context: &Context, event: EventEndSession) -> Result<Vec<Operation>> {
  session_status(context, event.id, event.status, None)
}

fn session_paid(context: &Context, event: EventPay) -> Result<Vec<Operation>> {
  session_payment(context, event.id, event.payment, event.staking_reward)
}

/// Payment for a session. Shared by both generations.
pub(super) fn session_payment(
  context: &Context,
  id: u64,
  payment: Coin,
  staking_reward: Option<Coin>,
) -> Result<Vec<Operation>> {
  let mut fields = json!({ "payment": payment });

  if let Some(staking_reward) = &staking_reward {
    fields["staking_reward"] = serde_json::to_value(staking_reward)?;
  }

  Ok(vec![
    Operation::set(Target::session(id), fields),
    event(context, EventKind::SessionUpdateDetails, |event| {
      event.session_id = Some(id);
      event.payment = Some(payment);
      event.staking_reward = staking_reward;
    })?,
  ])
}

fn subscription_cancelled(
  context: &Context,
  event: EventCancelSubscription,
) -> Result<Vec<Operation>> {
  subscription_status(context, event.id, event.status, false)
}

fn subscription_refunded(context: &Context, event: EventRefund) -> Result<Vec<Operation>> {
  subscription_refund(context, event.id, event.refund)
}

/// Refund of a subscription's remaining deposit. Shared by both generations.
pub(super) fn subscription_refund(context: &Context, id: u64, refund: Coin) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::set(Target::subscription(id), json!({ "refund": refund })),
    event(context, EventKind::SubscriptionUpdateDetails, |event| {
      event.subscription_id = Some(id);
      event.refund = Some(refund);
    })?,
  ])
}

fn quota_updated(context: &Context, event: EventUpdateQuota) -> Result<Vec<Operation>> {
  let quota = event.0;
  allocation_update(
    context,
    quota.id,
    &quota.address,
    quota.allocated,
    quota.consumed,
  )
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    crate::index::dispatch::tests::{address, context},
    pretty_assertions::assert_eq,
  };

  fn message<M: TypedMessage>(value: Value) -> M {
    M::from_message(&Message::from_json(value).unwrap()).unwrap()
  }

  #[test]
  fn register_converts_account_to_node_address() {
    let operations = node_register(
      &context(100, "AA"),
      message(json!({
        "@type": "/sentinel.node.v1.MsgRegisterRequest",
        "from": address("sent", 1),
        "provider": "",
        "price": [{"denom": "udvpn", "amount": "100"}],
        "remote_url": "https://node",
      })),
      &mut Cursor::new(&[]),
    )
    .unwrap();

    let Operation::Create {
      collection,
      key,
      document,
      provenance,
      height,
    } = &operations[0]
    else {
      panic!("expected a create");
    };

    assert_eq!(*collection, Collection::Nodes);
    assert_eq!(*key, address("sentnode", 1));
    assert_eq!(*provenance, "register_height");
    assert_eq!(*height, 100);
    assert_eq!(document["status"], "inactive");
    assert_eq!(document["status_height"], 100);
    assert!(!document.contains_key("provider"));
  }

  #[test]
  fn update_with_provider_clears_price() {
    let operations = node_update(
      &context(100, "AA"),
      message(json!({
        "@type": "/sentinel.node.v1.MsgUpdateRequest",
        "from": "sentnode1abc",
        "provider": "sentprov1xyz",
        "price": null,
        "remote_url": "",
      })),
      &mut Cursor::new(&[]),
    )
    .unwrap();

    assert_eq!(
      operations[0],
      Operation::set(
        Target::node("sentnode1abc"),
        json!({ "provider": "sentprov1xyz", "price": null }),
      )
    );
  }

  #[test]
  fn subscribe_to_node_correlates_three_events() {
    let events = [
      Event::new(
        deposit::EventAdd::KIND,
        [("address", "sent1abc"), ("coins", "1000udvpn")],
      ),
      Event::new(
        EventAddQuota::KIND,
        [
          ("id", "9"),
          ("address", "sent1abc"),
          ("allocated", "1000000"),
          ("consumed", "0"),
        ],
      ),
      Event::new(
        EventSubscribeToNode::KIND,
        [
          ("id", "9"),
          ("owner", "sent1abc"),
          ("node", "sentnode1xyz"),
          ("deposit", "1000udvpn"),
        ],
      ),
    ];

    let operations = subscribe_to_node(
      &context(200, "AB"),
      message(json!({
        "@type": "/sentinel.subscription.v1.MsgSubscribeToNodeRequest",
        "from": "sent1abc",
        "address": "sentnode1xyz",
        "deposit": {"denom": "udvpn", "amount": "1000"},
      })),
      &mut Cursor::new(&events),
    )
    .unwrap();

    assert_eq!(operations.len(), 6);

    let Operation::Subscribe {
      subscription,
      pricing,
    } = &operations[0]
    else {
      panic!("expected a subscribe");
    };

    assert_eq!(subscription.id, 9);
    assert_eq!(subscription.node_addr.as_deref(), Some("sentnode1xyz"));
    assert_eq!(
      *pricing,
      Pricing::Node {
        address: "sentnode1xyz".into(),
        denom: "udvpn".into(),
        hourly: false,
      }
    );
    assert!(matches!(
      &operations[1],
      Operation::Create { collection: Collection::SubscriptionAllocations, .. }
    ));
    assert!(matches!(
      &operations[3],
      Operation::Deposit { action: DepositAction::Add, previous: None, .. }
    ));
  }

  #[test]
  fn missing_correlated_event_is_fatal() {
    let err = plan_add(
      &context(300, "CD"),
      message(json!({
        "@type": "/sentinel.plan.v1.MsgAddRequest",
        "from": address("sentprov", 2),
        "price": [],
        "validity": "3600s",
        "bytes": "1000",
      })),
      &mut Cursor::new(&[]),
    )
    .unwrap_err();

    assert_eq!(classify(&err), ErrorClass::Fatal);
    assert!(matches!(
      err.downcast_ref::<SnafuError>(),
      Some(SnafuError::MissingEvent { height: 300, .. })
    ));
  }

  #[test]
  fn chain_ended_session_resets_rating() {
    let operations = session_ended(
      &context(400, ""),
      EventEndSession {
        id: 3,
        status: Status::InactivePending,
      },
    )
    .unwrap();

    let Operation::Transition { end, fields, .. } = &operations[0] else {
      panic!("expected a transition");
    };

    assert!(!*end);
    assert_eq!(fields["rating"], 0);
  }

  #[test]
  fn user_ended_session_is_stamped() {
    let operations = session_end(
      &context(400, "EF"),
      message(json!({
        "@type": "/sentinel.session.v1.MsgEndRequest",
        "from": "sent1abc",
        "id": "3",
        "rating": "5",
      })),
      &mut Cursor::new(&[]),
    )
    .unwrap();

    let Operation::Transition {
      status,
      end,
      fields,
      ..
    } = &operations[0]
    else {
      panic!("expected a transition");
    };

    assert_eq!(*status, Status::InactivePending);
    assert!(*end);
    assert_eq!(fields["rating"], 5);
  }

  #[test]
  fn add_quota_updates_free_bytes() {
    let events = [Event::new(
      EventAddQuota::KIND,
      [
        ("id", "4"),
        ("address", "sent1def"),
        ("allocated", "500"),
        ("free", "1500"),
      ],
    )];

    let operations = add_quota(
      &context(500, "GH"),
      message(json!({
        "@type": "/sentinel.subscription.v1.MsgAddQuotaRequest",
        "from": "sent1abc",
        "id": "4",
        "address": "sent1def",
        "bytes": "500",
      })),
      &mut Cursor::new(&events),
    )
    .unwrap();

    assert_eq!(operations.len(), 4);
    assert_eq!(
      operations[2],
      Operation::set(Target::subscription(4), json!({ "free": "1500" }))
    );
  }
}

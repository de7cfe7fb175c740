use {
  super::{
    v1::{
      provider_details, session_details, session_payment, session_status, subscription_refund,
      subscription_status,
    },
    *,
  },
  chrono::TimeDelta,
  hubtypes::{
    deposit,
    v2::{events::*, node, plan, provider, session, subscription},
  },
};

/// Lifetime of an hourly node subscription when the message leaves hours
/// unset.
const DEFAULT_SUBSCRIPTION_DAYS: i64 = 90;

pub(super) fn registry() -> Registry {
  let mut registry = Registry::new("v2");

  registry
    .message(node_register)
    .message(node_update_details)
    .message(node_update_status)
    .message(node_subscribe)
    .message(plan_create)
    .message(plan_update_status)
    .message(plan_link_node)
    .message(plan_unlink_node)
    .message(plan_subscribe)
    .message(provider_register)
    .message(provider_update)
    .message(session_start)
    .message(session_update_details)
    .message(session_end)
    .message(subscription_cancel)
    .message(subscription_allocate)
    .begin_block(super::deposit::subtract)
    .begin_block(payout)
    .end_block(super::deposit::subtract)
    .end_block(node_details_changed)
    .end_block(node_status_changed)
    .end_block(session_status_changed)
    .end_block(session_paid)
    .end_block(subscription_status_changed)
    .end_block(subscription_refunded)
    .end_block(allocation_changed);

  registry
}

fn node_register(context: &Context, msg: node::MsgRegister, _: &mut Cursor) -> Result<Vec<Operation>> {
  let stamp = context.stamp();

  Ok(vec![Operation::create(&NodeEntry {
    addr: convert(context, &msg.from, NODE_PREFIX)?,
    provider: None,
    price: None,
    gigabyte_prices: non_empty_coins(&msg.gigabyte_prices),
    hourly_prices: non_empty_coins(&msg.hourly_prices),
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

fn node_update_details(
  context: &Context,
  msg: node::MsgUpdateDetails,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  node_details(
    context,
    &msg.from,
    non_empty_coins(&msg.gigabyte_prices),
    non_empty_coins(&msg.hourly_prices),
    non_empty(&msg.remote_url),
  )
}

/// Sets whichever node details are present, leaving the rest untouched.
fn node_details(
  context: &Context,
  address: &str,
  gigabyte_prices: Option<Coins>,
  hourly_prices: Option<Coins>,
  remote_url: Option<String>,
) -> Result<Vec<Operation>> {
  let mut fields = Document::new();

  if let Some(gigabyte_prices) = &gigabyte_prices {
    fields.insert("gigabyte_prices".into(), serde_json::to_value(gigabyte_prices)?);
  }

  if let Some(hourly_prices) = &hourly_prices {
    fields.insert("hourly_prices".into(), serde_json::to_value(hourly_prices)?);
  }

  if let Some(remote_url) = &remote_url {
    fields.insert("remote_url".into(), remote_url.clone().into());
  }

  Ok(vec![
    Operation::Set {
      target: Target::node(address),
      fields,
    },
    event(context, EventKind::NodeUpdateDetails, |event| {
      event.node_addr = Some(address.into());
      event.gigabyte_prices = gigabyte_prices;
      event.hourly_prices = hourly_prices;
      event.remote_url = remote_url;
    })?,
  ])
}

fn node_update_status(
  context: &Context,
  msg: node::MsgUpdateStatus,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  node_status(context, msg.from, msg.status)
}

fn node_status(context: &Context, address: String, status: Status) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::transition(Target::node(&address), status, &context.stamp()),
    status_event(context, EventKind::NodeUpdateStatus, status, |event| {
      event.node_addr = Some(address);
    })?,
  ])
}

fn node_subscribe(
  context: &Context,
  msg: node::MsgSubscribe,
  cursor: &mut Cursor,
) -> Result<Vec<Operation>> {
  let added = cursor.next::<deposit::EventAdd>(context)?;

  let allocated = if msg.gigabytes != 0 {
    Some(cursor.next::<EventAllocate>(context)?)
  } else {
    None
  };

  let created = cursor.next::<EventCreateSubscription>(context)?;

  let stamp = context.stamp();

  let inactive_at = if msg.hours != 0 {
    context.time + TimeDelta::hours(msg.hours)
  } else {
    context.time + TimeDelta::days(DEFAULT_SUBSCRIPTION_DAYS)
  };

  let mut operations = vec![Operation::Subscribe {
    subscription: SubscriptionEntry {
      id: created.id,
      acc_addr: msg.from,
      node_addr: Some(msg.node_address.clone()),
      denom: Some(msg.denom.clone()),
      deposit: added.0.coins.first().cloned(),
      gigabytes: Some(msg.gigabytes),
      hours: Some(msg.hours),
      inactive_at: Some(inactive_at),
      start_height: stamp.height,
      start_timestamp: stamp.timestamp,
      start_tx_hash: stamp.tx_hash.clone(),
      status: Status::Active,
      status_height: stamp.height,
      status_timestamp: stamp.timestamp,
      status_tx_hash: stamp.tx_hash,
      ..default()
    },
    pricing: Pricing::Node {
      address: msg.node_address,
      denom: msg.denom,
      hourly: msg.gigabytes == 0,
    },
  }];

  operations.extend(super::deposit::add(context, added)?);

  if let Some(allocated) = allocated {
    operations.extend(allocation(
      context,
      allocated.id,
      &allocated.address,
      allocated.granted_bytes,
      allocated.utilised_bytes,
    )?);
  }

  Ok(operations)
}

fn plan_create(context: &Context, msg: plan::MsgCreate, cursor: &mut Cursor) -> Result<Vec<Operation>> {
  let created = cursor.next::<EventCreatePlan>(context)?;

  let stamp = context.stamp();

  Ok(vec![Operation::create(&PlanEntry {
    id: created.id,
    prov_addr: convert(context, &msg.from, PROVIDER_PREFIX)?,
    prices: msg.prices,
    duration: msg.duration.as_nanos(),
    gigabytes: Some(msg.gigabytes),
    bytes: None,
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

fn plan_update_status(
  context: &Context,
  msg: plan::MsgUpdateStatus,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::transition(Target::plan(msg.id), msg.status, &context.stamp()),
    status_event(context, EventKind::PlanUpdateStatus, msg.status, |event| {
      event.plan_id = Some(msg.id);
    })?,
  ])
}

fn plan_link_node(context: &Context, msg: plan::MsgLinkNode, _: &mut Cursor) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::AddToSet {
      target: Target::plan(msg.id),
      field: "node_addrs",
      value: msg.node_address.clone().into(),
    },
    event(context, EventKind::PlanLinkNode, |event| {
      event.plan_id = Some(msg.id);
      event.node_addr = Some(msg.node_address);
    })?,
  ])
}

fn plan_unlink_node(
  context: &Context,
  msg: plan::MsgUnlinkNode,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  Ok(vec![
    Operation::Pull {
      target: Target::plan(msg.id),
      field: "node_addrs",
      value: msg.node_address.clone().into(),
    },
    event(context, EventKind::PlanUnlinkNode, |event| {
      event.plan_id = Some(msg.id);
      event.node_addr = Some(msg.node_address);
    })?,
  ])
}

fn plan_subscribe(
  context: &Context,
  msg: plan::MsgSubscribe,
  cursor: &mut Cursor,
) -> Result<Vec<Operation>> {
  let paid = cursor.next::<EventPayForPlan>(context)?;
  let allocated = cursor.next::<EventAllocate>(context)?;
  let created = cursor.next::<EventCreatePlanSubscription>(context)?;

  let stamp = context.stamp();

  let denom = if msg.denom.is_empty() {
    paid.payment.denom.clone()
  } else {
    msg.denom
  };

  let mut operations = vec![Operation::Subscribe {
    subscription: SubscriptionEntry {
      id: created.id,
      acc_addr: msg.from,
      plan_id: Some(created.plan_id),
      denom: Some(denom.clone()),
      payment: Some(paid.payment),
      staking_reward: paid.staking_reward,
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
      id: created.plan_id,
      denom,
    },
  }];

  operations.extend(allocation(
    context,
    allocated.id,
    &allocated.address,
    allocated.granted_bytes,
    allocated.utilised_bytes,
  )?);

  Ok(operations)
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
    status: Status::Inactive,
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
    msg.status,
  )
}

fn session_start(
  context: &Context,
  msg: session::MsgStart,
  cursor: &mut Cursor,
) -> Result<Vec<Operation>> {
  let started = cursor.next::<EventStart>(context)?;

  let stamp = context.stamp();

  Ok(vec![Operation::create(&SessionEntry {
    id: started.id,
    subscription_id: started.subscription_id,
    acc_addr: msg.from,
    node_addr: started.node_address,
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

fn session_update_details(
  context: &Context,
  msg: session::MsgUpdateDetails,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  session_details(
    context,
    msg.proof.id,
    msg.proof.bandwidth,
    msg.proof.duration.as_nanos(),
  )
}

fn session_end(context: &Context, msg: session::MsgEnd, _: &mut Cursor) -> Result<Vec<Operation>> {
  session_status(context, msg.id, Status::InactivePending, Some(msg.rating))
}

fn subscription_cancel(
  context: &Context,
  msg: subscription::MsgCancel,
  _: &mut Cursor,
) -> Result<Vec<Operation>> {
  subscription_status(context, msg.id, Status::InactivePending, true)
}

/// Moving bytes between two accounts of a subscription reports both
/// allocations, the granter's first.
fn subscription_allocate(
  context: &Context,
  _: subscription::MsgAllocate,
  cursor: &mut Cursor,
) -> Result<Vec<Operation>> {
  let mut operations = Vec::new();

  for _ in 0..2 {
    let allocated = cursor.next::<EventAllocate>(context)?;

    operations.extend(allocation_update(
      context,
      allocated.id,
      &allocated.address,
      allocated.granted_bytes,
      allocated.utilised_bytes,
    )?);
  }

  Ok(operations)
}

fn payout(context: &Context, event: EventPayForPayout) -> Result<Vec<Operation>> {
  Ok(vec![Operation::append(
    context.height,
    &PayoutEntry {
      id: event.id,
      acc_addr: event.address,
      node_addr: event.node_address,
      payment: event.payment,
      staking_reward: event.staking_reward,
      height: context.height,
      timestamp: context.time,
      tx_hash: context.tx_hash.into(),
    },
  )?])
}

fn node_details_changed(context: &Context, event: EventUpdateDetails) -> Result<Vec<Operation>> {
  if !event.is_address_only() {
    return node_details(
      context,
      &event.address,
      event.gigabyte_prices,
      event.hourly_prices,
      event.remote_url,
    );
  }

  let Some(state) = context.state.node(&event.address, context.height)? else {
    log::warn!(
      "Node {} changed details at height {} but has no on-chain record",
      event.address,
      context.height,
    );
    return Ok(Vec::new());
  };

  node_details(
    context,
    &event.address,
    Some(state.gigabyte_prices),
    Some(state.hourly_prices),
    Some(state.remote_url),
  )
}

fn node_status_changed(context: &Context, event: EventNodeUpdateStatus) -> Result<Vec<Operation>> {
  node_status(context, event.address, event.status)
}

fn session_status_changed(
  context: &Context,
  event: EventSessionUpdateStatus,
) -> Result<Vec<Operation>> {
  session_status(context, event.id, event.status, None)
}

fn session_paid(context: &Context, event: EventPayForSession) -> Result<Vec<Operation>> {
  session_payment(context, event.session_id, event.payment, event.staking_reward)
}

fn subscription_status_changed(
  context: &Context,
  event: EventSubscriptionUpdateStatus,
) -> Result<Vec<Operation>> {
  subscription_status(context, event.id, event.status, false)
}

fn subscription_refunded(context: &Context, event: EventRefund) -> Result<Vec<Operation>> {
  subscription_refund(context, event.id, event.amount)
}

fn allocation_changed(context: &Context, event: EventAllocate) -> Result<Vec<Operation>> {
  allocation_update(
    context,
    event.id,
    &event.address,
    event.granted_bytes,
    event.utilised_bytes,
  )
}

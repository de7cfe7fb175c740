use {
  super::*,
  hubtypes::deposit::{DepositChange, EventAdd, EventSubtract},
};

pub(super) fn add(context: &Context, event: EventAdd) -> Result<Vec<Operation>> {
  change(context, DepositAction::Add, event.0)
}

pub(super) fn subtract(context: &Context, event: EventSubtract) -> Result<Vec<Operation>> {
  change(context, DepositAction::Subtract, event.0)
}

fn change(context: &Context, action: DepositAction, change: DepositChange) -> Result<Vec<Operation>> {
  let stamp = context.stamp();

  let log = DepositEventEntry {
    addr: change.address.clone(),
    action,
    coins: change.coins.clone(),
    height: stamp.height,
    timestamp: stamp.timestamp,
    tx_hash: stamp.tx_hash.clone(),
  };

  let kind = match action {
    DepositAction::Add => EventKind::DepositAdd,
    DepositAction::Subtract => EventKind::DepositSubtract,
  };

  Ok(vec![
    Operation::Deposit {
      address: change.address.clone(),
      action,
      coins: change.coins.clone(),
      previous: change.previous,
      stamp,
    },
    Operation::append(context.height, &log)?,
    event(context, kind, |event| {
      event.acc_addr = Some(change.address);
      event.coins = Some(change.coins);
    })?,
  ])
}

#![no_main]

use {
  hubtypes::{Message, TypedMessage, v1, v2},
  libfuzzer_sys::fuzz_target,
};

fuzz_target!(|input: &[u8]| {
  let Ok(value) = serde_json::from_slice(input) else {
    return;
  };

  let Ok(message) = Message::from_json(value) else {
    return;
  };

  let _ = message.exec_messages();
  let _ = v1::subscription::MsgSubscribeToNode::from_message(&message);
  let _ = v2::node::MsgSubscribe::from_message(&message);
  let _ = v2::session::MsgUpdateDetails::from_message(&message);
  let _ = v2::subscription::MsgAllocate::from_message(&message);
});

#![no_main]

use {
  hubtypes::{Event, TypedEvent, deposit, v1, v2},
  libfuzzer_sys::fuzz_target,
};

fuzz_target!(|attributes: Vec<(String, String)>| {
  for kind in [
    v2::events::EventAllocate::KIND,
    v2::events::EventPayForSession::KIND,
    v1::events::EventAddQuota::KIND,
    deposit::EventSubtract::KIND,
  ] {
    let event = Event::new(kind, attributes.iter().map(|(key, value)| (key.clone(), value)));

    let _ = v2::events::EventAllocate::from_event(&event);
    let _ = v2::events::EventPayForSession::from_event(&event);
    let _ = v1::events::EventAddQuota::from_event(&event);
    let _ = deposit::EventSubtract::from_event(&event);
  }
});

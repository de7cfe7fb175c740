//! Messages and events of the second generation modules.

use {super::*, crate::typed::message};

pub mod events;
pub mod node;
pub mod plan;
pub mod provider;
pub mod session;
pub mod subscription;

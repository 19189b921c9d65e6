#![doc(html_root_url = "https://docs.rs/delegate-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod closure_map;
mod config;
pub mod custom;
pub mod delegate;
mod dispatch;
pub mod entry;
mod error;
pub mod event;
mod events;
pub mod host;
pub mod identity;
pub mod memory;
pub mod registry;
mod selector;
pub mod types;
pub mod web;

pub use config::Config;
pub use custom::{Condition, CustomEvents};
pub use entry::{Arg, Handler, HandlerEntry};
pub use error::{Error, Result};
pub use event::{Common, Details, Event, Family, KeyboardDetails, MouseDetails, TouchDetails, WheelDetails};
pub use events::{Binding, Events, Selection};
pub use host::{Host, NativeCallback, NativeEvent, NodeKind};
pub use identity::{ElementId, IdentityMap};
pub use memory::{MemoryDom, MemoryEvent, NodeRef};
pub use registry::{Registry, Scope};
pub use web::WebHost;

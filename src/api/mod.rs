//! Purpose: Define the stable public Rust API boundary for jsonlens.
//! Exports: Accessor, value, date, builder and error types plus the fetch transport.
//! Role: Public, additive-only surface; callers should not need `core` paths directly.
//! Invariants: Everything reachable here is re-exported, not redefined.
//! Invariants: Transport and callback contexts are the only I/O-facing types.

mod dispatch;
mod transport;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::accessor::Accessor;
pub use crate::core::builder::FromAccessor;
pub use crate::core::coerce::Native;
pub use crate::core::date::{DateFormat, DateFormatCascade, DateMatch, DateStyle, MatchSource};
pub use crate::core::error::{CoercionError, Error, ErrorKind, Target};
pub use crate::core::value::{DynamicValue, Key, Map, Number};
pub use crate::json::parse::decode;
pub use dispatch::{CallbackContext, CallbackQueue, Immediate, Job, QueueSender};
pub use transport::{FetchHandle, Request, Transport, TransportOptions};

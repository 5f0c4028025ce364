//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements            | Connects to                 |
//! |------------|-----------------------|-----------------------------|
//! | `hardware` | InputPort, OutputPort | GPIO input / relay / LED banks |
//! | `log_sink` | EventSink             | Serial log output           |
//! | `fieldbus` | FieldBusPort          | Null / scripted transports  |

pub mod fieldbus;
pub mod hardware;
pub mod log_sink;

//! Native messaging host
//!
//! The browser extension starts the `kodegen-clipper` binary and talks to it
//! over stdin/stdout, one JSON request per frame and one response back.

mod framing;
mod host;
mod protocol;

pub use framing::{
    FramingError, MAX_INBOUND_MESSAGE_BYTES, MAX_OUTBOUND_MESSAGE_BYTES, read_frame, write_message,
};
pub use host::{HostSurfaces, NativeHost};
pub use protocol::{CaptureData, ErrorBody, Request, Response};

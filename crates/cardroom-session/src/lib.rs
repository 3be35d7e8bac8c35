//! Player registry for Cardroom rooms.
//!
//! Every room owns exactly one [`PlayerRegistry`]. It answers three
//! questions for the coordinator above it:
//!
//! 1. **Who sits where**: seats are handed out densely in join order and
//!    never reassigned, even across disconnects.
//! 2. **Who wants to play**: the `ready` / `sitting_out` / `broke` flags.
//! 3. **Who is reachable**: the live connection handle, if any.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← quorum, broadcast, recovery
//!     ↕
//! Session Layer (this crate)  ← seats, flags, connection handles
//!     ↕
//! Protocol / Transport (below)  ← PlayerId, Connection
//! ```
//!
//! The registry itself is not synchronized; the owning room guards it
//! with its lock.

mod error;
mod player;
mod registry;

pub use error::SessionError;
pub use player::{Player, SeatAssignment};
pub use registry::PlayerRegistry;

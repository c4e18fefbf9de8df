//! Subscription to the location fix stream.
//!
//! # Architecture
//!
//! ```text
//! FixStream (external provider)
//!     │  subscribe(request, sender) → StreamRegistration
//!     │
//!     └── mpsc::UnboundedSender<RawFix>
//!             │
//!             └── forwarding task (owned by UpdateSubscription)
//!                     │  stamps receipt time
//!                     └── FixSink::on_fix(LocationFix)
//! ```
//!
//! [`UpdateSubscription`] holds at most one registration at a time. `begin`
//! is idempotent and `end` waits for the stream to acknowledge the
//! unsubscribe and for the forwarding task to finish, so no fix reaches the
//! sink after `end` returns.

mod stream;
mod update;

pub use stream::{FixStream, FixStreamError, StreamRegistration};
pub use update::{SubscriptionHandle, UpdateSubscription};

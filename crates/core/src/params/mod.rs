//! Parameter feed between the driver and the kernel
//!
//! User-adjusted values arrive on five named channels. The driver posts into a
//! [`ParameterMailbox`] at any time; the latest value per channel wins. At the
//! start of a tick the mailbox is drained into a [`ParameterSnapshot`] which the
//! grid merges into its [`ChannelRegistry`] and broadcasts to every behavior
//! variant that declared interest in the channel. Nothing is applied mid-pass.

mod channel;
mod mailbox;

pub use channel::ParameterChannel;
pub use mailbox::{ChannelRegistry, ParameterMailbox, ParameterSnapshot};

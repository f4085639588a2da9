//! ModGuard Alerts
//!
//! Best-effort notification of flagged content.
//!
//! Provides:
//! - [`AlertChannel`] trait with chat-webhook and transactional e-mail
//!   implementations
//! - [`AlertDispatcher`], which attempts every configured channel
//!   independently and reports a per-channel outcome
//!
//! Delivery is not confirmed end-to-end; a channel reports success once the
//! provider accepts the submission.

pub mod channel;
pub mod dispatcher;
pub mod email;
pub mod slack;

pub use channel::{Alert, AlertChannel, ChannelError};
pub use dispatcher::{
    AlertDispatcher, AlertsConfig, ChannelReport, ChannelStatus, DispatchOutcome, STATUS_SKIPPED,
    STATUS_SUCCESS,
};
pub use email::BrevoEmailChannel;
pub use slack::SlackWebhookChannel;

//! Inbound notification handling.
//!
//! - Signature verification for GitHub deliveries (HMAC-SHA256)
//! - Parsing of GitHub `pull_request` events
//! - Pure handlers for pull request events and Jenkins build notifications

pub mod events;
pub mod handlers;
pub mod parser;
pub mod signature;

pub use events::{PrAction, PrSide, PullRequestEvent};
pub use handlers::{
    BuildPlan, HandlerError, HandlerResult, PullRequestDecision, handle_build_event,
    handle_pull_request,
};
pub use parser::{EVENT_HEADER, ParseError, parse_pull_request, parse_webhook};
pub use signature::{
    SIGNATURE_HEADER, SignatureError, check_delivery, parse_signature_header, sign_payload,
    verify_signature,
};

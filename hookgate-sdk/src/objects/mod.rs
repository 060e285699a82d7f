//! Request and response bodies of the webhook endpoint.

mod push;
mod response;

pub use push::{BRANCH_REF_PREFIX, PushEvent, branch_ref};
pub use response::{ErrorResponse, IGNORED_MESSAGE, MessageResponse, QUEUED_MESSAGE};

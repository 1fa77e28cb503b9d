//! Interactive chat: the customer support widget and the admin conversation
//! view share one terminal loop.

pub mod input;
pub mod render;
pub mod session;

pub use session::{run_admin_chat, run_support_chat};

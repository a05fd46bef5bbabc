//! Stateless repositories over the `SQLite` schema.
//!
//! Every repository method takes `&Connection`, so callers control
//! transaction boundaries. The [`crate::store::Store`] facade wraps
//! multi-row operations in transactions.

pub mod conversation;
pub mod event;
pub mod message;
pub mod ticket;
pub mod user;

pub use conversation::{ConversationRepo, CreateConversationOptions};
pub use event::{CreateEventOptions, EventRepo, ListEventsOptions, UpdateEventOptions};
pub use message::{AppendMessageOptions, MessageRepo};
pub use ticket::{IssueTicketOptions, TicketRepo};
pub use user::UserRepo;

//! # eventro-core
//!
//! Foundation types shared across the Eventro workspace:
//!
//! - Branded ID newtypes for every entity (UUID v7 based)
//! - Display-formatting utilities for dates, times, prices, and message
//!   timestamps
//! - The optimistic message-list helper (append placeholder, reconcile on
//!   settle)
//! - Tracing subscriber initialization

#![deny(unsafe_code)]

pub mod format;
pub mod ids;
pub mod logging;
pub mod optimistic;

pub use ids::{ConversationId, EventId, MessageId, TicketId, UserId};

//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the request chain and the conversation log so route
//! handlers stay focused on protocol translation.

pub mod chat;
pub mod chat_log;

//! Supabase-backed implementation of [`localmart_core::BackendGateway`].

pub mod client;
pub mod error;
pub mod gateway;
mod retry;
pub mod types;

pub use client::{RetryPolicy, SupabaseClient};
pub use error::BackendError;
pub use gateway::{PositionSource, SupabaseGateway};

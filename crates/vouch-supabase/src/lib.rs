//! Hosted backend for vouch, speaking to a Supabase project over HTTP.
//!
//! Authentication goes through GoTrue (`/auth/v1`), contact tables through
//! PostgREST (`/rest/v1`) and uploads through Storage (`/storage/v1`).

mod client;

pub mod error;

pub use client::{SupabaseBackend, SupabaseConfig};
pub use error::{Error, Result};

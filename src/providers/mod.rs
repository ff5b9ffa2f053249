//! Providers Module - External Surfaces
//!
//! The screening site (login + page fetch), the spreadsheet and the
//! completion webhook.

pub mod fetcher;
pub mod google_auth;
pub mod notifier;
pub mod session;
pub mod sheets;

pub use fetcher::*;
pub use google_auth::*;
pub use notifier::*;
pub use session::*;
pub use sheets::*;

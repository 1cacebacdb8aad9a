//! Client core for the flashpaper burn-after-read snippet service.
//!
//! ARCHITECTURE
//! ============
//! ```text
//!   SessionStore ──> ApiClient ──> Transport (reqwest)
//!        │               │
//!        └──── SessionContext (token slot + profile) ────┘
//!                        │
//!                   TokenStore (memory | file)
//! ```
//!
//! [`ApiClient`] attaches the bearer token to every request and turns a 401
//! into "clear session, notify, navigate". [`SessionStore`] owns the
//! login / profile / logout lifecycle. [`DraftStore`] is independent form
//! state for a snippet being composed.

pub mod config;
pub mod error;
pub mod net;
pub mod state;
pub mod ui;

pub use config::ClientConfig;
pub use error::{ClientError, ErrorInfo, parse_error, parse_error_or_default};
pub use net::api::ApiClient;
pub use net::types::{ApiResponse, Credentials, NewSnippet, User};
pub use state::auth::{AuthState, SessionContext, SessionPhase};
pub use state::draft::{Draft, DraftError, DraftStore};
pub use state::session::{FetchOutcome, SessionStore};
pub use state::token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use ui::{Navigator, Notifier};

//! Client library for the PassBy[ME] two-factor authentication service.
//!
//! Sends authorization, message and e-signature requests to recipients,
//! tracks their delivery/response status and cancels them. Requests go over
//! HTTPS with a client certificate; the server is verified against a
//! bundled trust anchor.
//!
//! ```rust,no_run
//! use passbyme2fa_client::{Client, ClientConfig, MessageParams, MessageType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), passbyme2fa_client::Error> {
//!     let config = ClientConfig::from_pem_files("auth.crt", "auth.key")?;
//!     let client = Client::new(config)?;
//!
//!     let params = MessageParams::new(["somebody@somewhe.re"], 300, MessageType::Authorization)
//!         .with_subject("Login request");
//!     let mut session = client.send_message(&params).await?;
//!
//!     session.refresh().await?;
//!     for recipient in session.recipient_statuses() {
//!         println!("{}: {}", recipient.user_id(), recipient.status());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
mod json;
pub mod recipient_status;
pub mod session_info;
pub mod transport;
pub mod types;

pub use client::{Client, MessageParams, MessageRef, API_VERSION, API_VERSION_HEADER};
pub use config::{ClientConfig, TransportOptions, DEFAULT_ADDRESS};
pub use error::{Error, Result};
pub use recipient_status::RecipientStatus;
pub use session_info::{MessageOperations, SessionInfo};
pub use transport::{HttpRequest, HttpResponse, HttpsTransport, Transport};
pub use types::{MessageStatus, MessageType};

/// Version of this client library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

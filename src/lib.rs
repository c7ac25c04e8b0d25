//! # sendgrid-api - Typed client for the SendGrid v3 management API
//!
//! A type-safe, retry-aware client for the management REST API (API keys,
//! subusers, and friends), built on top of `reqwest`. All operations share
//! one request pipeline: bearer authentication, optional subuser
//! impersonation, uniform provider-error classification, and automatic
//! retry of rate-limited calls with cancellable waits.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sendgrid_api::{api_keys::NewApiKey, CancellationToken, Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sendgrid_api::Error> {
//!     let api_key = std::env::var("SENDGRID_API_KEY").unwrap();
//!     let client = Client::builder(api_key).build()?;
//!     let cancel = CancellationToken::new();
//!
//!     // List existing keys.
//!     let keys = client.list_api_keys(&cancel).await?;
//!     println!("{} keys", keys.result.len());
//!
//!     // Create a new one.
//!     let created = client
//!         .create_api_key(
//!             &NewApiKey {
//!                 name: "deploy".to_string(),
//!                 scopes: vec!["mail.send".to_string()],
//!             },
//!             &cancel,
//!         )
//!         .await?;
//!     println!("created {}", created.api_key_id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed requests and responses** - serde-derived input/output structs
//!   per operation, plus generic verb helpers ([`Client::get`],
//!   [`Client::post`], ...) for endpoints without a wrapper
//! - **Uniform error classification** - the provider's three error body
//!   shapes surface as one [`Error`] enum with the wire message preserved
//! - **Rate-limit aware** - 429 responses are retried after the
//!   provider-indicated wait, bounded by a configurable cap and by the
//!   caller's [`CancellationToken`]
//! - **Subuser impersonation** - set once at construction, or derive a
//!   per-subuser client with [`Client::on_behalf_of`]
//! - **Injectable transport** - the [`transport::HttpTransport`] trait
//!   keeps the pipeline testable without sockets
//! - **Structured logging** - request dispatch, failures, and (optionally)
//!   full error-response dumps via `tracing`
//!
//! ## Error Handling
//!
//! Every call returns either a decoded value or a single [`Error`], never
//! both:
//!
//! ```no_run
//! use sendgrid_api::{CancellationToken, Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder("SG.key").build()?;
//! # let cancel = CancellationToken::new();
//! match client.get_api_key("abc123", &cancel).await {
//!     Ok(key) => println!("{:?}", key.scopes),
//!     Err(Error::Api(message)) => eprintln!("provider said: {message}"),
//!     Err(Error::Validation(errors)) => {
//!         for err in errors {
//!             eprintln!("{err}");
//!         }
//!     }
//!     Err(e) => eprintln!("call failed: {e}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! Calls take a [`CancellationToken`]. Cancelling it aborts the in-flight
//! request or the rate-limit wait promptly and the call returns
//! [`Error::Canceled`]. Combine with `tokio::time::timeout` for deadlines.

pub mod api_keys;
mod client;
mod error;
pub mod rate_limit;
mod request;
mod response;
pub mod subusers;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use error::{Error, FieldError, Result};
pub use rate_limit::{HeaderPolicy, RateLimitPolicy};
pub use transport::HttpTransport;

pub use tokio_util::sync::CancellationToken;

//! HTTP/1.0 request handling.
//!
//! One request is served per connection; there is no keep-alive.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection worker and its state machine
//! - **`parser`**: liberal request-line parser
//! - **`request`**: request representation and path normalization
//! - **`response`**: response kinds, head serialization and the response catalog
//! - **`resolver`**: maps paths to files under the storage root
//! - **`writer`**: writes heads and bodies to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │  Admitting  │ ← try to take an admission slot
//!        └──────┬──────┘
//!     slot      │        no slot
//!        ┌──────┴───────────────┐
//!        ▼                      ▼
//!  ┌───────────┐          ┌───────────┐
//!  │  Parsing  │          │ Rejected  │ ← 503
//!  └─────┬─────┘          └─────┬─────┘
//!        ▼                      │
//!  ┌─────────────┐              │
//!  │ Dispatching │──► Streaming │ (stream route, until client leaves)
//!  └─────┬───────┘        │     │
//!        ▼                │     │
//!  ┌────────────┐         │     │
//!  │ Responding │◄────────┼─────┘
//!  └─────┬──────┘         │
//!        ▼                ▼
//!  ┌─────────────────────────┐
//!  │          Closed         │ ← socket closed, slot released
//!  └─────────────────────────┘
//! ```
//!
//! A request line that yields no method or path goes from Parsing straight to
//! Closed without any response.

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod resolver;
pub mod response;
pub mod writer;

//! # Events Module
//!
//! Push-style notifications alongside the polling `status()` snapshots.
//!
//! ## Design
//! The scheduler and cache emit events through channels, so a UI can react
//! to job transitions instead of polling.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Batch(BatchEvent::Failed { job_id, error }) = event {
//!             eprintln!("{job_id} failed: {error}");
//!         }
//!     }
//! });
//!
//! let scheduler = BatchScheduler::builder()
//!     .provider(provider)
//!     .events(sender)
//!     .build()?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;

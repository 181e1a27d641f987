//! # Events Module
//!
//! Event-driven progress reporting for any front end.
//!
//! ## Design
//! Long-running operations emit events through channels. A UI thread
//! subscribes and stays responsive while the work runs elsewhere.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Extract(ExtractEvent::BatchCompleted(p)) = event {
//!             println!("{}/{} batches", p.completed_batches, p.total_batches);
//!         }
//!     }
//! });
//!
//! analyzer.analyze_with_events(&folder, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;

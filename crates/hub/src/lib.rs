//! BreadBox Hub - the wallet event hub.
//!
//! [`BreadBox`] owns the lifecycle of one wallet system handle and exposes
//! what the runtime knows (account, wallets, transfers, sync progress) as
//! independently throttled, latest-value streams. Consumers never touch the
//! runtime handle or its callback thread directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use breadbox_hub::{BreadBox, EnabledWalletTracker};
//!
//! let tracker = Arc::new(EnabledWalletTracker::new(provider.clone()));
//! let hub = BreadBox::new(config, factory, provider, tracker, Handle::current());
//! hub.open(&account)?;
//!
//! let mut codes = hub.currency_codes();
//! while let Some(codes) = codes.next().await {
//!     println!("wallets: {:?}", codes);
//! }
//! ```

mod breadbox;
mod channels;
mod listener;
mod streams;
mod supervisor;
mod tracker;

pub use breadbox::BreadBox;
pub use tracker::EnabledWalletTracker;

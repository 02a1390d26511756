//! Runtime events module.
//!
//! The wallet runtime reports everything through five sealed event families,
//! one per listener callback. Each family is a tagged union matched
//! exhaustively by its consumers, so adding a variant forces every consumer
//! to decide what to do with it.

mod manager_event;
mod system_event;
mod wallet_event;


pub use manager_event::WalletManagerEvent;
pub use system_event::{NetworkEvent, SystemEvent, TransferEvent};
pub use wallet_event::WalletEvent;

//! Line-oriented TCP chat: clients pick a display name, then every line
//! they send is relayed to everyone else in the room, tagged with the
//! sender's name.

pub mod broadcast;
pub mod conn;
pub mod palette;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod shutdown;

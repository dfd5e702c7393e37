//! Messenger abstractions (Telegram today, behind a port).

pub mod port;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

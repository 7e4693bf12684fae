//! A line-oriented shell driving a single [`Car`].
//!
//! The [`Repl`] is generic over the state its commands operate on; [`commands`]
//! binds it to the car.

pub mod car;
pub mod command;
pub mod commands;
pub mod repl;
mod completion;
#[cfg(test)]
mod testing;

pub use car::Car;
pub use command::{Args, ArgsError, Command, CommandStatus, CriticalError};
pub use repl::{BuilderError, LoopStatus, Repl, ReplBuilder};

//! Gateway data shared by the broker client, the formatter and the demo dataset.

pub mod account;
mod number;
pub mod position;

pub use account::AccountInfo;
pub use position::Position;

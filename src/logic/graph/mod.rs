pub mod arb_path;
pub mod arb_path_hash;

pub use arb_path::{ArbPath, Hop};
pub use arb_path_hash::ArbPathHash;

pub mod pawn_record;

pub use pawn_record::*;

#[cfg(feature = "bitvec")]
pub mod bit_vector;
pub mod vector;

//! Numeric helpers shared by the pool math and the data providers: exact
//! decimal scaling, fixed-point string parsing and formatting, conversions
//! between `U256` and the arbitrary precision `num`/`bigdecimal` types, and
//! timestamp conversions.

pub mod conversions;
pub mod fixed;
pub mod timestamp;
pub mod u256_ext;

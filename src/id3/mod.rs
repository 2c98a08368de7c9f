// ID3 metadata handling module
pub mod v1;
pub mod v2;

pub use v2::Id3v2Header;

pub mod uleb128;
pub mod writer;

pub mod keys;
pub mod storage;

pub mod codec;
pub mod container;
pub mod raw;
pub mod stat;

//! Response cache adapters.

mod in_memory;
mod redis;

pub use in_memory::InMemoryResponseCache;
pub use self::redis::RedisResponseCache;

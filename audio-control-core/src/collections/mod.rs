pub mod identity_cache;
pub mod lazy_iterator;

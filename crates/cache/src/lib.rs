//! TTL key/value result cache for StockFlow
//!
//! Pure storage: tri-state analysis status and completed payloads are
//! stored here by the status service, but the cache itself carries no
//! business logic and guarantees no transactions across keys. Atomicity
//! of the status+result pair is the status service's responsibility.

pub mod memory;
pub mod traits;

pub use memory::InMemoryCache;
pub use traits::{CacheError, CacheResult, ResultCache};

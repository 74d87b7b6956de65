//! Rate limiting logic and state management.

mod backend;
mod distributed;
mod key;
mod limiter;
mod local;
mod policy;
mod verdict;
mod window;

pub use backend::CounterStore;
pub use distributed::RedisCounterStore;
pub use key::BucketKey;
pub use limiter::{ActionOutcome, RateLimiter};
pub use local::LocalCounterStore;
pub use policy::{Action, Policy, PolicyTable};
pub use verdict::{Denial, Verdict};
pub use window::{parse_window, DEFAULT_WINDOW};

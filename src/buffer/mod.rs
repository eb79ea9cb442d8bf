pub mod pool;

pub use pool::{
    INITIAL_CAPACITY, MAX_POOLED_BUFFERS, MAX_RETAINED_CAPACITY, Pool, PoolStats, PooledBuffer,
    global,
};

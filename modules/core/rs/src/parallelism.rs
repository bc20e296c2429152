use std::cmp::Ordering;
use std::thread::available_parallelism;

use eyre::{Result, WrapErr};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Requested degree of parallelism: positive values are taken as is (capped by the number of
/// available cores), zero means serial, negative values count back from the number of cores
/// (`-1` = all of them).
fn _normalize(requested: isize, max: isize) -> usize {
    match requested.cmp(&0) {
        Ordering::Less => (max + requested + 1).max(1) as usize,
        Ordering::Equal => 1,
        Ordering::Greater => requested.min(max) as usize,
    }
}

pub fn available(requested: isize) -> Result<usize> {
    let max = available_parallelism()?.get() as isize;
    Ok(_normalize(requested, max))
}

/// Build a named thread pool with the normalized number of threads.
pub fn pool(requested: isize, name: &'static str) -> Result<ThreadPool> {
    let threads = available(requested)?;
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |ind| format!("{name}-{ind}"))
        .build()
        .wrap_err_with(|| format!("Failed to start a thread pool with {threads} threads"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallelism_normalization() {
        for (threads, max, expected) in [
            (0, 4, 1),
            (1, 4, 1),
            (3, 4, 3),
            (5, 4, 4),
            (-1, 4, 4),
            (-3, 4, 2),
            (-5, 4, 1),
        ] {
            assert_eq!(_normalize(threads, max), expected);
        }
    }

    #[test]
    fn test_pool_is_never_empty() -> Result<()> {
        let pool = pool(0, "test")?;
        assert_eq!(pool.current_num_threads(), 1);
        Ok(())
    }
}

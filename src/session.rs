// src/session.rs
use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::Instant;
use tracing::info;

/// The worker pool a batch run executes on. Started before the first
/// transformation and stopped when dropped, on success and error paths alike.
pub struct Session {
    name: String,
    pool: ThreadPool,
    started: Instant,
}

impl Session {
    pub fn start(name: &str, threads: Option<usize>) -> Result<Self> {
        let mut builder = ThreadPoolBuilder::new().thread_name({
            let name = name.to_string();
            move |i| format!("{}-{}", name, i)
        });
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .with_context(|| format!("starting session {}", name))?;

        info!(session = name, threads = pool.current_num_threads(), "session started");
        Ok(Self {
            name: name.to_string(),
            pool,
            started: Instant::now(),
        })
    }

    /// Run `op` inside the pool; rayon iterators in `op` use its workers.
    pub fn run<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        info!(session = %self.name, elapsed = ?self.started.elapsed(), "session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn runs_on_its_own_pool() -> Result<()> {
        let session = Session::start("test", Some(2))?;
        let (sum, threads) = session.run(|| {
            let sum: u64 = (1..=100u64).into_par_iter().sum();
            (sum, rayon::current_num_threads())
        });
        assert_eq!(sum, 5050);
        assert_eq!(threads, 2);
        Ok(())
    }
}

//! Console and file output behind a background worker
//!
//! Run with `cargo run --example background_logging`.

use sink_logger::prelude::*;
use sink_logger::{check_lt, debug, error, info, warn};
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    let log_path = std::env::temp_dir().join("sink_logger_demo.log");
    let file = FileSink::create(&log_path)?;
    let capture = Arc::new(StringSink::new().with_system_ids(false));

    let chain = ChainBuilder::new()
        .sink(ConsoleSink::new())
        .sink(file)
        .observe(Arc::clone(&capture))
        .min_level(LogLevel::Debug)
        .background(AsyncLogger::builder().name("demo-writer").queue_capacity(1024))
        .build()?;
    let chain: Arc<dyn Sink> = Arc::from(chain);

    info!(chain, "Demo started, writing to {}", log_path.display());

    let workers: Vec<_> = (0..3)
        .map(|id| {
            let chain = Arc::clone(&chain);
            thread::spawn(move || {
                for step in 0..3 {
                    debug!(chain, "worker {} step {}", id, step);
                }
                warn!(chain, "worker {} done", id);
            })
        })
        .collect();
    for worker in workers {
        if worker.join().is_err() {
            error!(chain, "a worker panicked");
        }
    }

    // A failing check is FATAL; debug builds keep running
    let pending = 5;
    check_lt!(chain, pending, 3, "{} jobs still queued", pending);

    chain.flush()?;
    drop(chain);

    println!("\nCaptured {} lines:", capture.lines().len());
    for line in capture.lines().iter().take(3) {
        println!("  {}", line);
    }
    Ok(())
}

//! # verdict CLI
//!
//! Command-line interface for comparing images and managing the verdict cache.
//!
//! ## Usage
//! ```bash
//! verdict compare before.png after.png
//! verdict dedupe uploads/*.jpg --min-similarity 0.9
//! verdict cache stats
//! ```

mod cli;

use verdict_core::Result;

fn main() -> Result<()> {
    verdict_core::init_tracing();
    cli::run()
}

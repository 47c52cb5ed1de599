//! Prints the resolved compute mode and what detection found.
//!
//! ```text
//! cargo run -p gpuswap --example status
//! GPUSWAP_FORCE_CPU=1 cargo run -p gpuswap --example status
//! RUST_LOG=gpuswap_core=debug cargo run -p gpuswap --example status
//! ```

use gpuswap::prelude::*;

fn main() -> Result<(), BackendError> {
    gpuswap::init_default_logging();

    println!("{}", gpuswap::status());

    let values: Vec<f64> = (0..6).map(f64::from).collect();
    let array = gpuswap::create_array(values, &ArrayOptions::with_shape(2, 3))?;
    gpuswap::synchronize()?;

    let host = gpuswap::to_cpu(array)?;
    println!("\n{} array on host:{}", gpuswap::mode(), host.into_host()?);

    Ok(())
}

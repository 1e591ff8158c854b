//! Print the star fans of the bundled reflexive polytopes.
//!
//! Usage:
//!   cargo run -p lattri --example reflexive_fans -- simplex
//!   cargo run -p lattri --example reflexive_fans -- square
//!
//! For each fan: the summary line, GKZ vector, Stanley–Reisner generators and
//! integral heights. `square` also samples a few fine triangulations.

use std::sync::Arc;

use anyhow::Result;
use lattri::api::{reflexive_simplex_4d, reflexive_square, FastSampler, FastSamplerCfg};
use lattri::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::fmt::SubscriberBuilder;

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let mode = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "simplex".to_string());
    match mode.as_str() {
        "simplex" => show_fan(Arc::new(reflexive_simplex_4d())),
        "square" => {
            let poly = Arc::new(reflexive_square());
            show_fan(Arc::clone(&poly))?;
            sample_square(poly)
        }
        _ => {
            eprintln!("usage: reflexive_fans [simplex|square]");
            Ok(())
        }
    }
}

fn show_fan(poly: Arc<LatticePolytope>) -> Result<()> {
    let labels: Vec<usize> = (0..poly.len()).collect();
    let mut t = Triangulation::new(poly, &labels, TriangulateOpts::default().star(true))?;
    println!("{t}");
    for s in t.simplices() {
        println!("  simplex {s:?}");
    }
    println!("  gkz {:?}", t.gkz_phi());
    println!("  sr ideal {:?}", t.sr_ideal()?);
    println!("  integral heights {:?}", t.integral_heights()?);
    Ok(())
}

fn sample_square(poly: Arc<LatticePolytope>) -> Result<()> {
    let cfg = FastSamplerCfg {
        limit: Some(5),
        ..FastSamplerCfg::default()
    };
    let labels: Vec<usize> = (0..poly.len()).collect();
    let sampler = FastSampler::new(
        poly,
        &labels,
        cfg,
        Toolchain::from_env(),
        StdRng::seed_from_u64(2025),
    )?;
    for (i, t) in sampler.enumerate() {
        let mut t = t?;
        println!(
            "sample {i}: {} simplices, regular={}",
            t.simplices().len(),
            t.is_regular()?
        );
    }
    Ok(())
}

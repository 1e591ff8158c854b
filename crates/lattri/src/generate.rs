//! Whole-configuration generators: exhaustive enumeration and random sampling.
//!
//! Samplers are iterators of `Result<Triangulation>`; they stop (return `None`)
//! after `limit` distinct triangulations or after too many consecutive misses, and
//! yield a single `Err` (then stop) when a provider fails.

use std::collections::HashSet;
use std::sync::Arc;

use nalgebra::DVector;
use rand::Rng;
use tracing::{debug, warn};

use crate::backend::{delaunay_heights, topcom, Backend, Toolchain};
use crate::error::{Result, TriangError};
use crate::points::PointConfig;
use crate::polytope::LatticePolytope;
use crate::triangulation::{NeighborFilter, TriangulateOpts, Triangulation};

/// Filters for `all_triangulations`.
///
/// `star_origin` is the local index of the star center and is required when
/// `only_star` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnumerateOpts {
    pub only_fine: bool,
    pub only_regular: bool,
    pub only_star: bool,
    pub star_origin: Option<usize>,
}

/// Every triangulation TOPCOM enumerates, as raw simplex lists (local indices),
/// filtered by fineness and starness only.
pub fn all_triangulations_raw(
    poly: &LatticePolytope,
    labels: &[usize],
    opts: EnumerateOpts,
    tools: &Toolchain,
) -> Result<Vec<Vec<Vec<usize>>>> {
    let center = star_center(opts)?;
    let config = PointConfig::new(poly, labels)?;
    let mut triangs = topcom::all_triangulations(&tools.topcom_dir, config.optimal(), opts.only_fine)?;
    if let Some(c) = center {
        triangs.retain(|t| t.iter().all(|s| s.binary_search(&c).is_ok()));
    }
    Ok(triangs)
}

/// Every triangulation passing the filters, as `Triangulation` objects.
pub fn all_triangulations(
    poly: Arc<LatticePolytope>,
    labels: &[usize],
    opts: EnumerateOpts,
    tools: &Toolchain,
) -> Result<Vec<Triangulation>> {
    let raw = all_triangulations_raw(&poly, labels, opts, tools)?;
    let mut out = Vec::with_capacity(raw.len());
    for simplices in raw {
        let mut t = Triangulation::new(
            Arc::clone(&poly),
            labels,
            TriangulateOpts::with_simplices(simplices)
                .check_input_simplices(false)
                .tools(tools.clone()),
        )?;
        if opts.only_regular && !t.is_regular()? {
            continue;
        }
        out.push(t);
    }
    debug!(count = out.len(), "triangulations after filtering");
    Ok(out)
}

fn star_center(opts: EnumerateOpts) -> Result<Option<usize>> {
    match (opts.only_star, opts.star_origin) {
        (true, None) => Err(TriangError::invalid(
            "only_star needs the local index of the star origin",
        )),
        (true, Some(c)) => Ok(Some(c)),
        (false, _) => Ok(None),
    }
}

/// Standard normal draw (Box–Muller).
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Settings for `FastSampler`.
#[derive(Clone, Debug)]
pub struct FastSamplerCfg {
    /// Stop after this many distinct triangulations.
    pub limit: Option<usize>,
    /// Standard deviation of the Gaussian noise added to the Delaunay heights.
    pub noise: f64,
    /// Stop after this many consecutive draws that yield nothing new.
    pub max_retries: usize,
    pub make_star: bool,
    pub only_fine: bool,
    pub backend: Backend,
}

impl Default for FastSamplerCfg {
    fn default() -> Self {
        Self {
            limit: None,
            noise: 0.2,
            max_retries: 500,
            make_star: false,
            only_fine: true,
            backend: Backend::Native,
        }
    }
}

/// Random regular triangulations from Gaussian-perturbed Delaunay heights.
///
/// Fast but biased towards triangulations close to the Delaunay one.
pub struct FastSampler<R> {
    poly: Arc<LatticePolytope>,
    labels: Vec<usize>,
    cfg: FastSamplerCfg,
    tools: Toolchain,
    rng: R,
    base: Vec<f64>,
    seen: HashSet<Vec<Vec<usize>>>,
    retries: usize,
    done: bool,
}

impl<R: Rng> FastSampler<R> {
    pub fn new(
        poly: Arc<LatticePolytope>,
        labels: &[usize],
        cfg: FastSamplerCfg,
        tools: Toolchain,
        rng: R,
    ) -> Result<Self> {
        if !(cfg.noise.is_finite() && cfg.noise >= 0.0) {
            return Err(TriangError::invalid("noise must be finite and non-negative"));
        }
        if !cfg.backend.takes_heights() {
            return Err(TriangError::invalid(format!(
                "the {} backend does not take heights",
                cfg.backend
            )));
        }
        let config = PointConfig::new(&poly, labels)?;
        let base = delaunay_heights(config.points());
        Ok(Self {
            poly,
            labels: config.labels().to_vec(),
            cfg,
            tools,
            rng,
            base,
            seen: HashSet::new(),
            retries: 0,
            done: false,
        })
    }

    fn draw(&mut self) -> Result<Option<Triangulation>> {
        let noise = self.cfg.noise;
        let heights: Vec<f64> = self
            .base
            .iter()
            .map(|&h| h + noise * standard_normal(&mut self.rng))
            .collect();
        let opts = TriangulateOpts {
            heights: Some(heights),
            make_star: self.cfg.make_star,
            check_heights: false,
            backend: self.cfg.backend,
            tools: self.tools.clone(),
            ..TriangulateOpts::default()
        };
        let mut t = Triangulation::new(Arc::clone(&self.poly), &self.labels, opts)?;
        if self.cfg.only_fine && !t.is_fine() {
            return Ok(None);
        }
        if !self.seen.insert(t.simplices().to_vec()) {
            return Ok(None);
        }
        t.check_heights_quietly();
        Ok(Some(t))
    }
}

impl<R: Rng> Iterator for FastSampler<R> {
    type Item = Result<Triangulation>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.cfg.limit.is_some_and(|n| self.seen.len() >= n) {
                self.done = true;
                break;
            }
            if self.retries >= self.cfg.max_retries {
                warn!(found = self.seen.len(), "fast sampler exhausted its retries");
                self.done = true;
                break;
            }
            match self.draw() {
                Ok(Some(t)) => {
                    self.retries = 0;
                    return Some(Ok(t));
                }
                Ok(None) => self.retries += 1,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// Settings for `FairSampler`.
#[derive(Clone, Debug)]
pub struct FairSamplerCfg {
    pub limit: Option<usize>,
    /// Walk steps between two emitted triangulations.
    pub n_walk: usize,
    /// Random flips applied to each seed triangulation.
    pub n_flip: usize,
    /// Burn-in steps before the first emission.
    pub initial_walk_steps: usize,
    /// Step size, as a fraction of the mean Delaunay height.
    pub walk_step_size: f64,
    /// Steps taken along a random direction while looking for a wall.
    pub max_steps_to_wall: usize,
    /// Bisection steps refining a point next to a wall.
    pub fine_tune_steps: usize,
    /// Stop after this many consecutive duplicate or failed rounds.
    pub max_retries: usize,
    pub make_star: bool,
    pub backend: Backend,
}

impl Default for FairSamplerCfg {
    fn default() -> Self {
        Self {
            limit: None,
            n_walk: 10,
            n_flip: 10,
            initial_walk_steps: 20,
            walk_step_size: 1e-2,
            max_steps_to_wall: 10,
            fine_tune_steps: 8,
            max_retries: 50,
            make_star: false,
            backend: Backend::Native,
        }
    }
}

/// Bisection steps allowed past `fine_tune_steps` while no fine midpoint was seen.
const EXTRA_BISECTION_STEPS: usize = 64;

/// Random fine regular triangulations from a hit-and-run walk near the walls of
/// the fine region of height space, followed by random flips.
///
/// Slower than `FastSampler`, but closer to uniform over fine regular triangulations.
pub struct FairSampler<R> {
    poly: Arc<LatticePolytope>,
    labels: Vec<usize>,
    config: PointConfig,
    cfg: FairSamplerCfg,
    tools: Toolchain,
    rng: R,
    point: DVector<f64>,
    step_size: f64,
    steps: usize,
    steps_since_emit: usize,
    retries: usize,
    seen: HashSet<Vec<Vec<usize>>>,
    done: bool,
}

impl<R: Rng> FairSampler<R> {
    pub fn new(
        poly: Arc<LatticePolytope>,
        labels: &[usize],
        cfg: FairSamplerCfg,
        tools: Toolchain,
        mut rng: R,
    ) -> Result<Self> {
        if !cfg.backend.takes_heights() {
            return Err(TriangError::invalid(format!(
                "the {} backend does not take heights",
                cfg.backend
            )));
        }
        if !(cfg.walk_step_size.is_finite() && cfg.walk_step_size > 0.0) {
            return Err(TriangError::invalid("walk_step_size must be positive"));
        }
        let config = PointConfig::new(&poly, labels)?;
        if !config.is_full_dim() {
            return Err(TriangError::invalid(
                "the fair sampler needs a full-dimensional point configuration",
            ));
        }
        let pts = config.points();
        let anchor = rng.gen_range(0..pts.len());
        let shifted: Vec<Vec<i64>> = pts
            .iter()
            .map(|p| p.iter().zip(&pts[anchor]).map(|(a, b)| a - b).collect())
            .collect();
        let start = DVector::from_vec(delaunay_heights(&shifted)) * cfg.walk_step_size;
        let step_size = cfg.walk_step_size * start.mean();
        Ok(Self {
            poly,
            labels: config.labels().to_vec(),
            config,
            cfg,
            tools,
            rng,
            point: start,
            step_size,
            steps: 0,
            steps_since_emit: 0,
            retries: 0,
            seen: HashSet::new(),
            done: false,
        })
    }

    fn is_fine_at(&self, heights: &DVector<f64>) -> Result<bool> {
        let simplices =
            self.tools
                .triangulate(self.cfg.backend, self.config.optimal(), Some(heights.as_slice()))?;
        let mut used = vec![false; self.config.len()];
        for &i in simplices.iter().flatten() {
            if let Some(u) = used.get_mut(i) {
                *u = true;
            }
        }
        Ok(used.into_iter().all(|u| u))
    }

    fn random_direction(&mut self) -> DVector<f64> {
        let n = self.point.len();
        let dir = DVector::from_fn(n, |_, _| standard_normal(&mut self.rng));
        let norm = dir.norm();
        if norm > 0.0 {
            dir / norm
        } else {
            dir
        }
    }

    /// A fine point and a non-fine point one step apart along a random direction.
    fn find_wall(&mut self) -> Result<Option<(DVector<f64>, DVector<f64>)>> {
        for _ in 0..self.cfg.max_retries {
            let dir = self.random_direction();
            let mut inside = self.point.clone();
            for _ in 0..self.cfg.max_steps_to_wall {
                let next = &inside + &dir * self.step_size;
                if self.is_fine_at(&next)? {
                    inside = next;
                } else {
                    return Ok(Some((inside, next)));
                }
            }
        }
        Ok(None)
    }

    /// One walk step; returns a new triangulation when one is due and distinct.
    fn step(&mut self) -> Result<Option<Triangulation>> {
        let Some((mut inside, mut outside)) = self.find_wall()? else {
            warn!("fair sampler could not find a wall of the fine region");
            self.done = true;
            return Ok(None);
        };
        let mut found_fine = false;
        let mut ctr = 0;
        while (ctr < self.cfg.fine_tune_steps || !found_fine)
            && ctr < self.cfg.fine_tune_steps + EXTRA_BISECTION_STEPS
        {
            let mid = (&inside + &outside) * 0.5;
            if self.is_fine_at(&mid)? {
                inside = mid;
                found_fine = true;
            } else {
                outside = mid;
            }
            ctr += 1;
        }
        let norm = inside.norm();
        if norm > 0.0 {
            inside /= norm;
        }
        let coef: f64 = self.rng.gen();
        let mut next = &self.point * coef + &inside * (1.0 - coef);

        let mut emitted = None;
        if self.steps > self.cfg.initial_walk_steps && self.steps_since_emit >= self.cfg.n_walk {
            let seed = Triangulation::new(
                Arc::clone(&self.poly),
                &self.labels,
                TriangulateOpts {
                    heights: Some(next.as_slice().to_vec()),
                    make_star: self.cfg.make_star,
                    check_heights: false,
                    backend: self.cfg.backend,
                    tools: self.tools.clone(),
                    ..TriangulateOpts::default()
                },
            )?;
            let mut t = if self.cfg.n_flip > 0 {
                let filter = NeighborFilter::new(true, true, self.cfg.make_star);
                seed.random_flips(self.cfg.n_flip, filter, &mut self.rng)?
            } else {
                seed
            };
            if !self.seen.insert(t.simplices().to_vec()) {
                self.retries += 1;
                return Ok(None);
            }
            t.check_heights_quietly();
            self.retries = 0;
            self.steps_since_emit = 0;
            emitted = Some(t);
        }
        let norm = next.norm();
        if norm > 0.0 {
            next /= norm;
        }
        self.point = next;
        self.steps += 1;
        self.steps_since_emit += 1;
        Ok(emitted)
    }
}

impl<R: Rng> Iterator for FairSampler<R> {
    type Item = Result<Triangulation>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.cfg.limit.is_some_and(|n| self.seen.len() >= n) {
                self.done = true;
                break;
            }
            if self.retries >= self.cfg.max_retries {
                warn!(found = self.seen.len(), "fair sampler exhausted its retries");
                self.done = true;
                break;
            }
            match self.step() {
                Ok(Some(t)) => return Some(Ok(t)),
                Ok(None) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::special::{reflexive_simplex_4d, reflexive_square};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn all(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    fn fast(seed: u64, cfg: FastSamplerCfg) -> Result<FastSampler<StdRng>> {
        FastSampler::new(
            Arc::new(reflexive_square()),
            &all(9),
            cfg,
            Toolchain::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn normal_draws_have_unit_variance() {
        let mut rng = StdRng::seed_from_u64(3);
        let xs: Vec<f64> = (0..20_000).map(|_| standard_normal(&mut rng)).collect();
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / xs.len() as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.1, "var {var}");
    }

    #[test]
    fn fast_sampler_yields_distinct_fine_triangulations() {
        let cfg = FastSamplerCfg {
            limit: Some(3),
            ..FastSamplerCfg::default()
        };
        let sampled: Vec<Triangulation> = fast(1, cfg).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(sampled.len(), 3);
        let distinct: HashSet<&Triangulation> = sampled.iter().collect();
        assert_eq!(distinct.len(), 3);
        for mut t in sampled {
            assert!(t.is_fine());
            assert!(t.is_valid_geometric().unwrap());
        }
    }

    #[test]
    fn fast_sampler_is_deterministic_per_seed() {
        let cfg = FastSamplerCfg {
            limit: Some(4),
            make_star: true,
            ..FastSamplerCfg::default()
        };
        let a: Vec<Triangulation> = fast(9, cfg.clone()).unwrap().map(|t| t.unwrap()).collect();
        let b: Vec<Triangulation> = fast(9, cfg).unwrap().map(|t| t.unwrap()).collect();
        assert_eq!(a, b);
        // the star fan of the square is unique
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn fast_sampler_rejects_bad_settings() {
        let bad_noise = FastSamplerCfg {
            noise: -1.0,
            ..FastSamplerCfg::default()
        };
        assert!(matches!(fast(0, bad_noise), Err(TriangError::InvalidInput { .. })));
        let topcom = FastSamplerCfg {
            backend: Backend::Topcom,
            ..FastSamplerCfg::default()
        };
        assert!(matches!(fast(0, topcom), Err(TriangError::InvalidInput { .. })));
    }

    #[test]
    fn fair_sampler_emits_fine_regular_triangulations() {
        let cfg = FairSamplerCfg {
            limit: Some(2),
            n_walk: 1,
            n_flip: 1,
            initial_walk_steps: 0,
            walk_step_size: 0.5,
            ..FairSamplerCfg::default()
        };
        let run = |seed: u64| -> Vec<Triangulation> {
            FairSampler::new(
                Arc::new(reflexive_square()),
                &all(9),
                cfg.clone(),
                Toolchain::default(),
                StdRng::seed_from_u64(seed),
            )
            .unwrap()
            .map(|t| t.unwrap())
            .collect()
        };
        let first = run(5);
        assert!(first.len() <= 2);
        for mut t in first.clone() {
            assert!(t.is_fine());
            assert!(t.is_regular().unwrap());
        }
        assert_eq!(first, run(5));
    }

    #[test]
    fn fair_sampler_needs_full_dimension() {
        let sampler = FairSampler::new(
            Arc::new(reflexive_simplex_4d()),
            &[0, 2, 3, 6],
            FairSamplerCfg::default(),
            Toolchain::default(),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(sampler, Err(TriangError::InvalidInput { .. })));
    }
}

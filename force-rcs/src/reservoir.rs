use std::{cell::OnceCell, fmt};

use common::{RcError, Result, SharedFeedback, SharedInput};
use nalgebra::{DMatrix, DVector};
use nanorand::WyRand;
use vector_ode::Integrator;

use crate::{
    network_equation::NetworkEquation,
    weights::{gaussian, sparse_gaussian},
    ReservoirParams,
};

/// A sparsely connected reservoir of N leaky rate-model neurons.
///
/// The state `x` holds the subthreshold potentials, the firing rates are
/// `tanh(x)`. Rates are computed lazily and cached until the next mutation
/// of `x`. Recurrent weights are drawn from a normal distribution scaled by
/// g / sqrt(N * p) (Sussillo & Abbott 2009), with each connection present
/// with probability p.
pub struct Reservoir {
    params: ReservoirParams,
    t: f64,
    x: DVector<f64>,
    rate: OnceCell<DVector<f64>>,
    w: DMatrix<f64>,
    integrator: Box<dyn Integrator>,
    input: Option<SharedInput>,
    feedback: Option<SharedFeedback>,
}

impl Reservoir {
    /// Create a new reservoir with random connectivity and a small random
    /// initial state.
    /// Consumes `rng` for the connection weights first, then for the state.
    pub fn new(params: ReservoirParams, rng: &mut WyRand) -> Result<Self> {
        params.validate()?;
        let n = params.size;

        let w = sparse_gaussian(n, n, params.sparsity, params.weight_scale(), rng);
        let x = DVector::from_fn(n, |_, _| gaussian(rng) * params.initial_state_scale);
        let integrator = params.integrator.build(n)?;
        debug!(
            "reservoir: N: {}, p: {}, g: {}, tau: {}, dt: {}, integrator: {:?}",
            n, params.sparsity, params.gain, params.tau, params.dt, params.integrator
        );
        trace!("W: {}", w);

        Ok(Self {
            params,
            t: 0.0,
            x,
            rate: OnceCell::new(),
            w,
            integrator,
            input: None,
            feedback: None,
        })
    }

    #[inline(always)]
    pub fn params(&self) -> &ReservoirParams {
        &self.params
    }

    /// Number of neurons
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.params.size
    }

    /// Integration step
    #[inline(always)]
    pub fn dt(&self) -> f64 {
        self.params.dt
    }

    pub fn set_dt(&mut self, dt: f64) -> Result<()> {
        common::validate::finite("dt", dt)?;
        self.params.dt = dt;
        Ok(())
    }

    /// Current simulation time
    #[inline(always)]
    pub fn t(&self) -> f64 {
        self.t
    }

    /// The recurrent weight matrix
    #[inline(always)]
    pub fn w(&self) -> &DMatrix<f64> {
        &self.w
    }

    /// Replace the recurrent weight matrix, which has to be N x N
    pub fn set_w(&mut self, w: DMatrix<f64>) -> Result<()> {
        if w.shape() != self.w.shape() {
            return Err(RcError::dims("Reservoir::set_w", self.w.shape(), w.shape()));
        }
        self.w = w;
        Ok(())
    }

    /// The subthreshold state
    #[inline(always)]
    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    /// Replace the subthreshold state, which has to hold N values
    pub fn set_x(&mut self, x: DVector<f64>) -> Result<()> {
        if x.len() != self.x.len() {
            return Err(RcError::dims("Reservoir::set_x", (self.x.len(), 1), (x.len(), 1)));
        }
        self.x = x;
        self.rate.take();
        Ok(())
    }

    /// The firing rates tanh(x), recomputed only if the state changed
    pub fn get_r(&self) -> &DVector<f64> {
        self.rate.get_or_init(|| self.x.map(f64::tanh))
    }

    /// A copy of the firing rates
    pub fn get_r_array(&self) -> Vec<f64> {
        self.get_r().as_slice().to_vec()
    }

    /// Wire an exogenous input stream of width N, or switch input off with `None`
    pub fn set_input(&mut self, input: Option<SharedInput>) -> Result<()> {
        if let Some(stream) = &input {
            let size = stream.borrow().size();
            if size != self.size() {
                return Err(RcError::dims("Reservoir::set_input", (self.size(), 1), (size, 1)));
            }
        }
        debug!("reservoir input {}", if input.is_some() { "on" } else { "off" });
        self.input = input;
        Ok(())
    }

    /// Wire a feedback source of width N, or switch feedback off with `None`
    pub fn set_feedback(&mut self, feedback: Option<SharedFeedback>) -> Result<()> {
        if let Some(source) = &feedback {
            let size = source.borrow().fb_size();
            if size != self.size() {
                return Err(RcError::dims("Reservoir::set_feedback", (self.size(), 1), (size, 1)));
            }
        }
        debug!("reservoir feedback {}", if feedback.is_some() { "on" } else { "off" });
        self.feedback = feedback;
        Ok(())
    }

    /// Perform one integration step, advancing t by dt.
    /// On error neither the state nor the clock is changed.
    pub fn step(&mut self) -> Result<()> {
        let eq =
            NetworkEquation::new(&self.w, self.params.tau, self.input.as_ref(), self.feedback.as_ref());
        self.integrator.step(&mut self.x, self.t, &eq, self.params.dt)?;
        self.rate.take();
        self.t += self.params.dt;

        Ok(())
    }

    /// Perform `n_steps` integration steps
    pub fn step_n(&mut self, n_steps: usize) -> Result<()> {
        for _ in 0..n_steps {
            self.step()?;
        }
        Ok(())
    }
}

impl fmt::Display for Reservoir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get_r())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use common::{FeedbackSource, InputStream};
    use vector_ode::IntegratorKind;

    use super::*;

    fn small_params(size: usize) -> ReservoirParams {
        ReservoirParams {
            size,
            sparsity: 0.5,
            gain: 1.5,
            tau: 0.1,
            dt: 0.01,
            ..Default::default()
        }
    }

    struct Constant(DVector<f64>);

    impl InputStream for Constant {
        fn size(&self) -> usize {
            self.0.len()
        }

        fn get_input(&self, _t: f64, out: &mut DVector<f64>) -> Result<()> {
            out.copy_from(&self.0);
            Ok(())
        }
    }

    /// Records the rates it is asked for, feeds back nothing
    struct Recorder {
        n: usize,
        calls: RefCell<Vec<(f64, DVector<f64>)>>,
    }

    impl FeedbackSource for Recorder {
        fn fb_size(&self) -> usize {
            self.n
        }

        fn get_feedback(&self, rate: &DVector<f64>, t: f64, out: &mut DVector<f64>) -> Result<()> {
            self.calls.borrow_mut().push((t, rate.clone()));
            out.fill(0.0);
            Ok(())
        }
    }

    #[test]
    fn reservoir_same_seed_same_weights() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let a = Reservoir::new(small_params(20), &mut WyRand::new_seed(7)).unwrap();
        let b = Reservoir::new(small_params(20), &mut WyRand::new_seed(7)).unwrap();
        let c = Reservoir::new(small_params(20), &mut WyRand::new_seed(8)).unwrap();

        assert_eq!(a.w(), b.w());
        assert_eq!(a.x(), b.x());
        assert_ne!(a.w(), c.w());
    }

    #[test]
    fn reservoir_weight_variance() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let (n, p, g) = (200, 0.1, 1.5);
        let params = ReservoirParams {
            size: n,
            sparsity: p,
            gain: g,
            ..Default::default()
        };
        let expected = g * g / (n as f64 * p);
        let mut rng = WyRand::new_seed(0);
        for _ in 0..3 {
            let res = Reservoir::new(params.clone(), &mut rng).unwrap();
            let estimate = res.w().component_mul(res.w()).sum() / (n as f64 * n as f64 * p);
            info!("estimated variance: {}, expected: {}", estimate, expected);
            assert!((estimate / expected - 1.0).abs() < 0.1);
        }
    }

    #[test]
    fn reservoir_rate_cache() {
        let mut res = Reservoir::new(small_params(10), &mut WyRand::new_seed(0)).unwrap();

        let r0 = res.get_r().clone();
        assert_eq!(res.get_r(), &r0);
        assert_eq!(res.get_r_array(), r0.as_slice().to_vec());
        assert_eq!(r0, res.x().map(f64::tanh));

        let x0 = res.x().clone();
        res.step().unwrap();
        assert_ne!(res.x(), &x0);
        let r1 = res.get_r().clone();
        assert_ne!(r0, r1);
        assert_eq!(r1, res.x().map(f64::tanh));

        res.set_x(DVector::from_element(10, 0.5)).unwrap();
        assert_eq!(res.get_r(), &DVector::from_element(10, 0.5f64.tanh()));
    }

    #[test]
    fn reservoir_set_and_get() {
        let mut res = Reservoir::new(small_params(3), &mut WyRand::new_seed(0)).unwrap();

        let w = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        res.set_w(w.clone()).unwrap();
        assert_eq!(res.w(), &w);

        assert_eq!(
            res.set_w(DMatrix::zeros(2, 3)),
            Err(RcError::dims("Reservoir::set_w", (3, 3), (2, 3)))
        );
        assert_eq!(res.w(), &w);

        assert!(res.set_x(DVector::zeros(4)).is_err());
        res.set_x(DVector::from_vec(vec![1.0, 0.0, 1.0])).unwrap();
        assert_eq!(res.x(), &DVector::from_vec(vec![1.0, 0.0, 1.0]));

        assert!(res.set_dt(f64::NAN).is_err());
        res.set_dt(0.005).unwrap();
        assert_eq!(res.dt(), 0.005);
    }

    #[test]
    fn reservoir_clock() {
        let mut res = Reservoir::new(small_params(5), &mut WyRand::new_seed(0)).unwrap();
        assert_eq!(res.t(), 0.0);
        res.step_n(10).unwrap();
        assert!((res.t() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn reservoir_unconnected_decays() {
        let params = ReservoirParams {
            gain: 0.0,
            ..small_params(4)
        };
        let mut res = Reservoir::new(params, &mut WyRand::new_seed(3)).unwrap();
        let initial = res.x().norm();
        res.step_n(100).unwrap();
        // x(t) = x0 * exp(-t / tau), exp(-10) after t = 1
        assert!(res.x().norm() < initial * 1e-3);
    }

    #[test]
    fn reservoir_input_sets_fixed_point() {
        let params = ReservoirParams {
            gain: 0.0,
            tau: 0.01,
            dt: 0.001,
            ..small_params(3)
        };
        let mut res = Reservoir::new(params, &mut WyRand::new_seed(0)).unwrap();
        let drive = DVector::from_vec(vec![0.2, -0.4, 0.6]);
        let input: SharedInput = Rc::new(RefCell::new(Constant(drive.clone())));
        res.set_input(Some(input)).unwrap();
        res.step_n(200).unwrap();

        assert!((res.x() - &drive).norm() < 1e-6);

        // switching input off lets the state decay again
        res.set_input(None).unwrap();
        res.step_n(200).unwrap();
        assert!(res.x().norm() < 1e-6);
    }

    #[test]
    fn reservoir_wiring_checks_width() {
        let mut res = Reservoir::new(small_params(3), &mut WyRand::new_seed(0)).unwrap();

        let input: SharedInput = Rc::new(RefCell::new(Constant(DVector::zeros(2))));
        assert_eq!(
            res.set_input(Some(input)),
            Err(RcError::dims("Reservoir::set_input", (3, 1), (2, 1)))
        );

        let feedback: SharedFeedback = Rc::new(RefCell::new(Recorder {
            n: 4,
            calls: RefCell::new(Vec::new()),
        }));
        assert!(res.set_feedback(Some(feedback)).is_err());
    }

    #[test]
    fn reservoir_feedback_sees_every_stage() {
        let mut res = Reservoir::new(small_params(6), &mut WyRand::new_seed(0)).unwrap();
        let recorder = Rc::new(RefCell::new(Recorder {
            n: 6,
            calls: RefCell::new(Vec::new()),
        }));
        let feedback: SharedFeedback = recorder.clone();
        res.set_feedback(Some(feedback)).unwrap();

        let r_before = res.get_r().clone();
        res.step().unwrap();

        let recorder = recorder.borrow();
        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].1, r_before);
        assert_eq!(calls[0].0, 0.0);
        assert_eq!(calls[1].0, 0.005);
        assert_eq!(calls[2].0, 0.005);
        assert_eq!(calls[3].0, 0.01);
        // each stage has its own candidate state
        assert_ne!(calls[1].1, calls[0].1);
        assert_ne!(calls[2].1, calls[1].1);
        assert_ne!(calls[3].1, calls[2].1);
    }

    #[test]
    fn reservoir_euler_single_evaluation() {
        let params = ReservoirParams {
            integrator: IntegratorKind::Euler,
            ..small_params(6)
        };
        let mut res = Reservoir::new(params, &mut WyRand::new_seed(0)).unwrap();
        let recorder = Rc::new(RefCell::new(Recorder {
            n: 6,
            calls: RefCell::new(Vec::new()),
        }));
        let feedback: SharedFeedback = recorder.clone();
        res.set_feedback(Some(feedback)).unwrap();
        res.step_n(3).unwrap();

        assert_eq!(recorder.borrow().calls.borrow().len(), 3);
    }

    #[test]
    fn reservoir_rejects_invalid_params() {
        let mut rng = WyRand::new_seed(0);
        assert!(Reservoir::new(small_params(0), &mut rng).is_err());
        assert!(Reservoir::new(
            ReservoirParams {
                tau: -1.0,
                ..small_params(3)
            },
            &mut rng
        )
        .is_err());
    }

    #[test]
    fn reservoir_display() {
        let res = Reservoir::new(small_params(2), &mut WyRand::new_seed(0)).unwrap();
        assert!(!res.to_string().is_empty());
    }
}

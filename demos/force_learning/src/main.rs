#[macro_use]
extern crate log;

use std::{cell::RefCell, error::Error, rc::Rc, time::Instant};

use common::{SharedFeedback, SharedInput, TimeSeries, TimeSeriesStream, Waveform, WaveformStream};
use dialoguer::{theme::ColorfulTheme, Select};
use force_rcs::{
    LearningModuleRegression, Readout, ReadoutClampedFB, ReadoutParams, ReadoutRLS, ReadoutUnit,
    Reservoir, ReservoirParams,
};
use nanorand::WyRand;
use rc_plot::TimeSeriesPlotter;

const SEED: u64 = 0;
// number of neurons to plot
const N_TRACK: usize = 5;
const DIMS: (u32, u32) = (2160, 1080);

type DemoResult = Result<(), Box<dyn Error>>;

pub(crate) fn main() {
    pretty_env_logger::init();

    let demos = vec![
        "Reservoir without feedback",
        "Random readout feedback",
        "Clamped feedback",
        "Clamped feedback learning (regression)",
        "FORCE learning (RLS)",
    ];
    let e = match Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select simulation")
        .items(&demos)
        .default(0)
        .interact()
    {
        Ok(e) => e,
        Err(err) => {
            error!("could not read selection: {}", err);
            return;
        }
    };

    if let Err(err) = std::fs::create_dir_all("img") {
        error!("could not create the image directory: {}", err);
        return;
    }

    let mut rng = WyRand::new_seed(SEED);
    let res = match e {
        0 => run_reservoir(&mut rng),
        1 => run_random_feedback(&mut rng),
        2 => run_clamped_feedback(&mut rng),
        3 => run_clamped_learning(&mut rng),
        4 => run_rls_learning(&mut rng),
        _ => unreachable!("invalid simulation selection"),
    };
    if let Err(err) = res {
        error!("simulation failed: {}", err);
    }
}

fn run_reservoir(rng: &mut WyRand) -> DemoResult {
    let mut reservoir = Reservoir::new(ReservoirParams::default(), rng)?;
    let mut res_data = TimeSeriesPlotter::new(
        N_TRACK,
        "Selected reservoir neurons (no feedback)",
        reservoir.dt(),
    )?;

    let t0 = Instant::now();
    for _ in 0..1000 {
        reservoir.step()?;
        res_data.add_time_point(reservoir.get_r().as_slice())?;
    }
    info!("simulation took {}ms", t0.elapsed().as_millis());

    res_data.render("img/reservoir.png", DIMS)
}

fn run_random_feedback(rng: &mut WyRand) -> DemoResult {
    let mut reservoir = Reservoir::new(ReservoirParams::default(), rng)?;
    let readout = Rc::new(RefCell::new(Readout::new(
        5,
        reservoir.size(),
        &ReadoutParams::default(),
        rng,
    )?));
    let feedback: SharedFeedback = readout.clone();
    reservoir.set_feedback(Some(feedback))?;

    let mut res_data =
        TimeSeriesPlotter::new(N_TRACK, "Selected reservoir neurons", reservoir.dt())?;
    let mut ro_data =
        TimeSeriesPlotter::new(readout.borrow().size(), "Readout neurons", reservoir.dt())?;

    let t0 = Instant::now();
    for _ in 0..1000 {
        reservoir.step()?;
        res_data.add_time_point(reservoir.get_r().as_slice())?;
        ro_data.add_time_point(&readout.borrow().readout_array_for(&reservoir)?)?;
    }
    info!("simulation took {}ms", t0.elapsed().as_millis());

    res_data.render("img/random_feedback_reservoir.png", DIMS)?;
    ro_data.render("img/random_feedback_readout.png", DIMS)
}

fn run_clamped_feedback(rng: &mut WyRand) -> DemoResult {
    let mut reservoir = Reservoir::new(ReservoirParams::default(), rng)?;
    let target: SharedInput = Rc::new(RefCell::new(WaveformStream::new(Waveform::Square, 0.1)?));
    let readout = Rc::new(RefCell::new(ReadoutClampedFB::new(
        target,
        reservoir.size(),
        &ReadoutParams::default(),
        rng,
    )?));
    let feedback: SharedFeedback = readout.clone();
    reservoir.set_feedback(Some(feedback))?;

    let n_readout = readout.borrow().size();
    let mut res_data =
        TimeSeriesPlotter::new(N_TRACK, "Selected reservoir neurons", reservoir.dt())?;
    let mut ro_data = TimeSeriesPlotter::new(n_readout, "Readout neurons", reservoir.dt())?;
    let mut tg_data = TimeSeriesPlotter::new(n_readout, "Target readout", reservoir.dt())?;

    let t0 = Instant::now();
    for _ in 0..5000 {
        reservoir.step()?;
        res_data.add_time_point(reservoir.get_r().as_slice())?;
        let ro = readout.borrow();
        ro_data.add_time_point(&ro.readout_array_for(&reservoir)?)?;
        tg_data.add_time_point(&ro.target_readout_array(reservoir.t())?)?;
    }
    info!("simulation took {}ms", t0.elapsed().as_millis());

    res_data.render("img/clamped_reservoir.png", DIMS)?;
    ro_data.render("img/clamped_readout.png", DIMS)?;
    tg_data.render("img/clamped_target.png", DIMS)
}

fn run_clamped_learning(rng: &mut WyRand) -> DemoResult {
    let mut reservoir = Reservoir::new(ReservoirParams::default(), rng)?;
    let target_wave: SharedInput =
        Rc::new(RefCell::new(WaveformStream::new(Waveform::Sine, 0.1)?));
    let readout = Rc::new(RefCell::new(ReadoutClampedFB::new(
        target_wave.clone(),
        reservoir.size(),
        &ReadoutParams::default(),
        rng,
    )?));
    let mut lm = LearningModuleRegression::new(reservoir.size(), target_wave)?;
    let feedback: SharedFeedback = readout.clone();
    reservoir.set_feedback(Some(feedback))?;

    let n_readout = readout.borrow().size();
    let mut res_data =
        TimeSeriesPlotter::new(N_TRACK, "Selected reservoir neurons", reservoir.dt())?;
    let mut ro_data = TimeSeriesPlotter::new(n_readout, "Readout neurons", reservoir.dt())?;
    let mut tg_data = TimeSeriesPlotter::new(n_readout, "Target readout", reservoir.dt())?;

    // acclimation
    let t0 = Instant::now();
    reservoir.step_n(500)?;
    info!("acclimation took {}ms", t0.elapsed().as_millis());

    // clamped learning
    for _ in 0..1000 {
        reservoir.step()?;
        lm.store(&reservoir)?;
    }
    let report = lm.learn(&mut *readout.borrow_mut())?;
    info!("first regression: {:?}, elapsed: {}ms", report, t0.elapsed().as_millis());

    // clamped trial, recording the trained response
    let mut sample = TimeSeries::new(n_readout)?;
    for _ in 0..1500 {
        reservoir.step()?;
        sample.add_time_point(&readout.borrow().readout_array_for(&reservoir)?)?;
    }
    info!("clamped trial done after {}ms", t0.elapsed().as_millis());

    // clamped learning on the replayed response
    let stored_response =
        Rc::new(RefCell::new(TimeSeriesStream::new(sample, reservoir.dt(), reservoir.t())?));
    let replay: SharedInput = stored_response.clone();
    readout.borrow_mut().set_target(replay)?;
    lm.reset()?;

    for _ in 0..1000 {
        reservoir.step()?;
        lm.store(&reservoir)?;
        record(&reservoir, &readout.borrow(), &mut res_data, &mut ro_data, &mut tg_data)?;
        stored_response.borrow_mut().next_frame();
    }
    let report = lm.learn(&mut *readout.borrow_mut())?;
    info!("second regression: {:?}, elapsed: {}ms", report, t0.elapsed().as_millis());

    // clamped testing
    for _ in 0..500 {
        reservoir.step()?;
        record(&reservoir, &readout.borrow(), &mut res_data, &mut ro_data, &mut tg_data)?;
        stored_response.borrow_mut().next_frame();
    }

    // unclamped testing
    readout.borrow_mut().unclamp();
    for _ in 0..500 {
        reservoir.step()?;
        res_data.add_time_point(reservoir.get_r().as_slice())?;
        ro_data.add_time_point(&readout.borrow().readout_array_for(&reservoir)?)?;
    }
    info!("simulation took {}ms", t0.elapsed().as_millis());

    res_data.render("img/clamped_learning_reservoir.png", DIMS)?;
    ro_data.render("img/clamped_learning_readout.png", DIMS)?;
    tg_data.render("img/clamped_learning_target.png", DIMS)
}

fn record(
    reservoir: &Reservoir,
    readout: &ReadoutClampedFB,
    res_data: &mut TimeSeriesPlotter,
    ro_data: &mut TimeSeriesPlotter,
    tg_data: &mut TimeSeriesPlotter,
) -> common::Result<()> {
    res_data.add_time_point(reservoir.get_r().as_slice())?;
    ro_data.add_time_point(&readout.readout_array_for(reservoir)?)?;
    tg_data.add_time_point(&readout.target_readout_array(reservoir.t())?)
}

fn run_rls_learning(rng: &mut WyRand) -> DemoResult {
    // 1 - 100 (Sussillo & Abbott 2009, p. 548)
    let alpha = 1.0;
    // integration steps between learning updates
    let learn_interval = 10;

    let mut reservoir = Reservoir::new(ReservoirParams::default(), rng)?;
    let target_wave: SharedInput =
        Rc::new(RefCell::new(WaveformStream::new(Waveform::Triangle, 0.5)?));
    let readout = Rc::new(RefCell::new(ReadoutRLS::new(
        target_wave,
        reservoir.size(),
        &ReadoutParams::default(),
        alpha,
        rng,
    )?));
    let feedback: SharedFeedback = readout.clone();
    reservoir.set_feedback(Some(feedback))?;

    let n_readout = readout.borrow().size();
    let dt = reservoir.dt();
    let mut res_data = TimeSeriesPlotter::new(N_TRACK, "Selected reservoir neurons", dt)?;
    let mut ro_pre = TimeSeriesPlotter::new(n_readout, "Readout neurons (pre-training)", dt)?;
    let mut ro_post = TimeSeriesPlotter::new(n_readout, "Readout neurons (post-training)", dt)?;
    let mut tg_data = TimeSeriesPlotter::new(n_readout, "Target readout", dt)?;
    let mut err_data = TimeSeriesPlotter::new(n_readout, "Error", dt)?;

    // acclimation
    let t0 = Instant::now();
    for _ in 0..500 {
        reservoir.step()?;
        let ro = readout.borrow();
        res_data.add_time_point(reservoir.get_r().as_slice())?;
        ro_post.add_time_point(&ro.readout_array_for(&reservoir)?)?;
        tg_data.add_time_point(&ro.target_readout_array(reservoir.t())?)?;
    }
    info!("acclimation took {}ms", t0.elapsed().as_millis());

    // rls learning
    for i in 0..2000 {
        reservoir.step()?;
        {
            let ro = readout.borrow();
            res_data.add_time_point(reservoir.get_r().as_slice())?;
            tg_data.add_time_point(&ro.target_readout_array(reservoir.t())?)?;
            ro_pre.add_time_point(&ro.readout_array_for(&reservoir)?)?;
            err_data.add_time_point(&ro.error_array_for(&reservoir)?)?;
        }
        if i % learn_interval == 0 {
            readout.borrow_mut().learn(&reservoir)?;
        }
        ro_post.add_time_point(&readout.borrow().readout_array_for(&reservoir)?)?;
    }
    info!("learning done after {}ms", t0.elapsed().as_millis());

    // testing
    for _ in 0..1000 {
        reservoir.step()?;
        let ro = readout.borrow();
        res_data.add_time_point(reservoir.get_r().as_slice())?;
        ro_post.add_time_point(&ro.readout_array_for(&reservoir)?)?;
        tg_data.add_time_point(&ro.target_readout_array(reservoir.t())?)?;
        err_data.add_time_point(&ro.error_array_for(&reservoir)?)?;
    }
    info!("simulation took {}ms", t0.elapsed().as_millis());

    res_data.render("img/rls_reservoir.png", DIMS)?;
    ro_pre.render("img/rls_readout_pre.png", DIMS)?;
    ro_post.render("img/rls_readout_post.png", DIMS)?;
    tg_data.render("img/rls_target.png", DIMS)?;
    err_data.render("img/rls_error.png", DIMS)
}

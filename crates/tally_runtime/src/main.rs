//! Tally Runtime
//!
//! Small driver that builds a toy machine, advances simulated time and
//! dumps its stats through the configured sinks.
//!
//! Usage: `tally [settings.json]`

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::rc::Rc;
use tally_core::stats::{DumpScope, StatEventQueue, StatObject, Statistics};
use tally_core::time::SimClock;
use tally_core::Tick;
use tally_metrics::{Engine, Ratio, Scalar, Shared, SimObject, SimStats, VectorStat};
use tally_output::{SinkFactories, StatsSettings};
use tracing_subscriber::EnvFilter;

const RUN_TICKS: Tick = 10_000;
const STEP: Tick = 250;
const DEFAULT_DUMP_PERIOD: Tick = 2_500;

struct Cpu {
    insts: Shared<Scalar>,
    cycles: Shared<Scalar>,
    ops: Shared<VectorStat>,
}

fn build_machine(cpus: usize) -> (Rc<SimObject>, Vec<Cpu>) {
    let mut handles = Vec::with_capacity(cpus);
    let cores = (0..cpus)
        .map(|_| {
            let cpu = SimObject::new();
            let insts = cpu.add_stat(Scalar::new("insts", "Instructions committed"));
            let cycles = cpu.add_stat(Scalar::new("cycles", "Cycles elapsed"));
            cpu.add_stat(
                Ratio::new("ipc", "Instructions per cycle").of(insts.clone(), cycles.clone()),
            );
            let ops = cpu.add_stat(VectorStat::new(
                "ops",
                "Committed ops by class",
                &["int", "float", "mem"],
            ));
            handles.push(Cpu { insts, cycles, ops });
            cpu
        })
        .collect();

    let system = SimObject::new();
    system.add_vector("cpu", cores);
    let root = SimObject::new();
    root.add_child("system", system);
    (root, handles)
}

fn load_settings() -> Result<StatsSettings> {
    match std::env::args().nth(1) {
        Some(path) => StatsSettings::load(&path)
            .with_context(|| format!("failed to load stats settings from {path}")),
        None => Ok(StatsSettings {
            dump_period: Some(DEFAULT_DUMP_PERIOD),
            ..StatsSettings::default()
        }),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Tally v{}", tally_core::VERSION);
    let settings = load_settings()?;

    let clock = Rc::new(RefCell::new(SimClock::default()));
    let mut engine = Engine::new();
    let sim = SimStats::register(&mut engine, Rc::clone(&clock))?;
    let (machine, cpus) = build_machine(2);

    let mut stats = Statistics::new(engine);
    settings.apply(&SinkFactories::new(), &mut stats)?;
    let root: Rc<dyn StatObject> = machine;
    stats.bind(&root)?;
    stats.enable()?;
    tracing::info!(outputs = stats.output_count(), "stats enabled");

    let mut queue = StatEventQueue::new();
    settings.schedule(&mut queue, clock.borrow().now());

    while clock.borrow().now() < RUN_TICKS {
        clock.borrow_mut().advance(STEP);
        let now = clock.borrow().now();

        for (idx, cpu) in cpus.iter().enumerate() {
            let width = (idx + 1) as f64;
            cpu.cycles.borrow_mut().add(STEP as f64);
            cpu.insts.borrow_mut().add(STEP as f64 * width * 0.5);
            let mut ops = cpu.ops.borrow_mut();
            ops.add(0, STEP as f64 * width * 0.3);
            ops.add(1, STEP as f64 * width * 0.1);
            ops.add(2, STEP as f64 * width * 0.1);
        }

        let fired = queue.service(now, &mut stats)?;
        if fired > 0 {
            tracing::debug!(tick = now, fired, "serviced stat events");
        }
    }

    let now = clock.borrow().now();
    stats.dump(now, DumpScope::Root)?;
    tracing::info!(
        tick = now,
        host_time = ?sim.host_seconds.borrow().elapsed(),
        "simulation finished"
    );
    Ok(())
}

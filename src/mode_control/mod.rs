//! Control arbitration and timing around the mission.
//! `input_arbiter` decides who flies, `sim_context` owns everything a tick touches
//! and `simulation_clock` drives both from one cooperative loop.

pub(crate) mod input_arbiter;
pub(crate) mod signal;
pub(crate) mod sim_context;
pub(crate) mod simulation_clock;

pub(crate) use sim_context::SimulationContext;
pub(crate) use simulation_clock::SimulationClock;

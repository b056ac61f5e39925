use super::{
    signal::{ControlCommand, FrameSource},
    sim_context::SimulationContext,
};
use crate::console_communication::Presenter;
use crate::{info, warn};
use std::time::Duration;
use tokio::{
    sync::mpsc::Receiver,
    time::{Instant, MissedTickBehavior, interval, sleep_until},
};
use tokio_util::sync::CancellationToken;

/// Drives the simulation and presentation from one cooperative loop.
///
/// Each `select!` branch runs to completion before the next one is polled, so
/// a presenter never sees a half-applied tick.
pub struct SimulationClock {
    context: SimulationContext,
    presenter: Box<dyn Presenter>,
}

impl SimulationClock {
    /// Wall-clock period of a physics step.
    pub const SIM_TICK_INTERVAL: Duration = Duration::from_millis(100);
    /// Wall-clock period of a presentation refresh.
    pub const RENDER_TICK_INTERVAL: Duration = Duration::from_millis(50);

    pub fn new(context: SimulationContext, presenter: Box<dyn Presenter>) -> Self {
        Self { context, presenter }
    }

    /// Runs until `c_tok` is cancelled or the command channel closes, then
    /// hands back the final context.
    pub async fn run(mut self, mut commands: Receiver<ControlCommand>, c_tok: CancellationToken) -> SimulationContext {
        let mut sim_interval = interval(Self::SIM_TICK_INTERVAL);
        sim_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut render_interval = interval(Self::RENDER_TICK_INTERVAL);
        render_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.flush_notices();

        info!("Simulation clock running.");
        loop {
            let deadline = self.context.next_deadline();
            tokio::select! {
                biased;
                () = c_tok.cancelled() => break,
                cmd = commands.recv() => {
                    let Some(cmd) = cmd else {
                        warn!("Control input closed. Stopping simulation.");
                        break;
                    };
                    self.context.handle_command(cmd, Instant::now());
                    self.flush_notices();
                }
                _ = sim_interval.tick() => {
                    let snapshot = self.context.on_sim_tick(Instant::now());
                    self.flush_notices();
                    self.presenter.frame(&snapshot, FrameSource::Simulation);
                }
                _ = render_interval.tick() => {
                    self.context.poll_timers(Instant::now());
                    self.flush_notices();
                    self.presenter.frame(&self.context.snapshot(), FrameSource::Render);
                }
                () = Self::wait_for(deadline) => {
                    self.context.poll_timers(Instant::now());
                    self.flush_notices();
                }
            }
        }
        self.presenter.finish();
        self.context
    }

    async fn wait_for(deadline: Option<Instant>) {
        match deadline {
            Some(t) => sleep_until(t).await,
            None => std::future::pending().await,
        }
    }

    fn flush_notices(&mut self) {
        for notice in self.context.drain_notices() {
            self.presenter.notice(&notice);
        }
    }
}

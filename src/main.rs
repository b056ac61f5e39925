#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod console_communication;
mod flight_control;
mod logger;
mod mode_control;

use crate::console_communication::{PRESENTER_VAR, PresenterKind, keyboard};
use crate::mode_control::{SimulationClock, SimulationContext};
use std::env;
use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;

/// Queued operator commands before the keyboard thread blocks.
const COMMAND_BUFFER: usize = 32;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let presenter_var = env::var(PRESENTER_VAR).ok();
    let presenter_kind = PresenterKind::from_setting(presenter_var.as_deref());
    info!("Starting lunar lander with the {presenter_kind} presenter.");

    let c_tok = CancellationToken::new();
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    keyboard::spawn_reader(cmd_tx, c_tok.clone());

    let interrupt_tok = c_tok.clone();
    tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => {
                    info!("Interrupted, shutting down.");
                    interrupt_tok.cancel();
                }
                Err(e) => error!("Unable to listen for Ctrl-C: {e}"),
            },
            () = interrupt_tok.cancelled() => (),
        }
    });

    let context = SimulationContext::at_boot(Instant::now());
    let clock = SimulationClock::new(context, presenter_kind.build());
    let final_context = clock.run(cmd_rx, c_tok).await;

    let last = final_context.snapshot();
    info!(
        "Simulation stopped in phase {} at {:.1} m with {:.1}% fuel.",
        last.phase, last.altitude, last.fuel
    );
}

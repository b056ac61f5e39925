use super::{
    Presenter,
    gauges::{self, StatusLevel},
};
use crate::flight_control::MissionSnapshot;
use crate::mode_control::signal::{FrameSource, Notice};
use crate::warn;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: FrameSource,
    #[serde(flatten)]
    snapshot: &'a MissionSnapshot,
    fuel_status: StatusLevel,
    velocity_status: StatusLevel,
}

/// Writes one JSON object per line: a record per frame and one per notice.
pub struct JsonPresenter<W: Write + Send> {
    out: W,
    broken: bool,
}

impl<W: Write + Send> JsonPresenter<W> {
    pub fn new(out: W) -> Self { Self { out, broken: false } }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W { &self.out }

    fn emit<T: Serialize>(&mut self, record: &T) {
        if self.broken {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, record)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!("JSON output failed, dropping further records: {e}");
            self.broken = true;
        }
    }
}

impl<W: Write + Send> Presenter for JsonPresenter<W> {
    fn frame(&mut self, snapshot: &MissionSnapshot, source: FrameSource) {
        self.emit(&FrameRecord {
            frame: source,
            snapshot,
            fuel_status: gauges::fuel_level(snapshot.fuel),
            velocity_status: gauges::velocity_level(snapshot.velocity),
        });
    }

    fn notice(&mut self, notice: &Notice) { self.emit(notice); }
}

//! JSON-lines rendering of replay outcomes and runtime events.
use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::warn;

use cover_runtime::{Event, StepOutcome};

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Line<'a> {
    Step(&'a StepOutcome),
    Event(&'a Event),
}

/// Writes one JSON object per line, remembering the first write error.
pub struct JsonLines<W: Write> {
    writer: W,
    error: Option<anyhow::Error>,
}

impl<W: Write> JsonLines<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    pub fn step(&mut self, outcome: &StepOutcome) {
        self.write(&Line::Step(outcome));
    }

    /// Prints every event already waiting on the receiver.
    pub fn events(&mut self, rx: &mut broadcast::Receiver<Event>) {
        loop {
            match rx.try_recv() {
                Ok(event) => self.write(&Line::Event(&event)),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "event receiver lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    /// Flushes the writer and reports the first failed write.
    pub fn finish(mut self) -> Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write(&mut self, line: &Line<'_>) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, line)
            .map_err(anyhow::Error::from)
            .and_then(|()| writeln!(self.writer).map_err(anyhow::Error::from));
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cover_core::{CoverMode, TokenId};
    use cover_runtime::{CoverEvent, CoverLine, EventBus, Topic};

    #[test]
    fn writes_steps_and_pending_events() {
        let bus = EventBus::with_capacity(8);
        let mut rx = bus.subscribe(Topic::Cover);
        bus.publish(CoverEvent::AttackersChanged {
            mode: CoverMode::CoverTypes,
            attackers: vec![TokenId(1)],
        });

        let mut out = JsonLines::new(Vec::new());
        out.step(&StepOutcome::LineSet(CoverLine {
            attacker: TokenId(1),
            defender: TokenId(2),
            percent: 0.5,
        }));
        out.events(&mut rx);
        let bytes = out.finish().unwrap();

        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("{\"step\":{\"line_set\""));
        assert!(lines[1].contains("attackers_changed"));
        for line in lines {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }
}

//! Bridge between boundary messages and the canvas session
//!
//! Host messages are converted into session calls here; the resulting state
//! changes are queued as [`CanvasToHost`] messages. Canvas errors caused by
//! user input are reported to the host instead of aborting.

use canvas::{
    CanvasError, CanvasSession, OverlayMode, PaintEvent, PointerButton, PointerPhase as CanvasPhase,
    PointerSample, Rgba, SubmissionResult,
};
use pixelburn_ipc::{
    CanvasCommand, CanvasToHost, InputMessage, IpcError, MouseButton, OverlaySelection,
    PixelPlacedLog, PlacePixelsCall, PointerInput, PointerPhase, SubmissionOutcome,
};
use image::RgbaImage;
use tracing::{debug, warn};

// ============================================================================
// Conversions
// ============================================================================

pub fn pointer_sample(input: &PointerInput) -> PointerSample {
    let phase = match input.phase {
        PointerPhase::Down => CanvasPhase::Down,
        PointerPhase::Move => CanvasPhase::Move,
        PointerPhase::Up => CanvasPhase::Up,
        PointerPhase::Leave => CanvasPhase::Cancel,
    };
    let button = match input.button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    };
    PointerSample::new(phase, input.x, input.y)
        .with_button(button)
        .with_shift(input.shift)
}

pub fn overlay_mode(selection: OverlaySelection) -> OverlayMode {
    match selection {
        OverlaySelection::Live => OverlayMode::Live,
        OverlaySelection::Heatmap => OverlayMode::Heatmap,
        OverlaySelection::Replay { prefix } => OverlayMode::Replay { prefix },
    }
}

/// A wallet rejection is treated like the user walking away from the batch
pub fn submission_result(outcome: &SubmissionOutcome) -> SubmissionResult {
    match outcome {
        SubmissionOutcome::Confirmed => SubmissionResult::Confirmed,
        SubmissionOutcome::Rejected { .. } => SubmissionResult::Abandoned,
        SubmissionOutcome::Failed { .. } => SubmissionResult::Failed,
    }
}

/// Decode a raw log into a paint event.
///
/// `fallback_sequence` is used when the source does not number its logs.
pub fn paint_event(log: &PixelPlacedLog, fallback_sequence: u64) -> Result<PaintEvent, IpcError> {
    let placed = log.decode()?;
    Ok(PaintEvent::new(
        placed.x as u32,
        placed.y as u32,
        Rgba::from_uint24(placed.color),
        placed.user,
        placed.log_index.unwrap_or(fallback_sequence),
    ))
}

/// Stable machine-readable code for host error messages
pub fn error_code(error: &CanvasError) -> &'static str {
    match error {
        CanvasError::OutOfBounds { .. } => "out_of_bounds",
        CanvasError::SequenceGap { .. } => "sequence_gap",
        CanvasError::PrefixOutOfRange { .. } => "prefix_out_of_range",
        CanvasError::InvalidColor(_) => "invalid_color",
        CanvasError::InvalidGridSize(_) => "invalid_grid_size",
        CanvasError::SubmissionInFlight => "submission_in_flight",
        CanvasError::NoSubmissionInFlight => "no_submission_in_flight",
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// Owns a session and translates host traffic into session calls
#[derive(Debug)]
pub struct CanvasBridge {
    session: CanvasSession,
    outbox: Vec<CanvasToHost>,
    last_hover: String,
    last_pending: usize,
}

impl CanvasBridge {
    pub fn new(session: CanvasSession) -> Self {
        let last_hover = session.hover_label();
        Self {
            session,
            outbox: Vec::new(),
            last_hover,
            last_pending: 0,
        }
    }

    pub fn session(&self) -> &CanvasSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CanvasSession {
        &mut self.session
    }

    /// Apply one host message
    pub fn handle_input(&mut self, message: InputMessage) {
        let result = match message {
            InputMessage::Pointer(input) => self
                .session
                .handle_pointer(pointer_sample(&input))
                .map(|_| ()),
            InputMessage::Wheel { x, y, delta_y } => {
                self.session.handle_wheel(x, y, delta_y);
                Ok(())
            }
            InputMessage::Resize { width, height } => {
                self.session.resize(width, height);
                Ok(())
            }
            InputMessage::Command(command) => self.handle_command(command),
        };
        if let Err(e) = result {
            self.report(&e);
        }
        self.emit_changes();
    }

    fn handle_command(&mut self, command: CanvasCommand) -> Result<(), CanvasError> {
        debug!("command: {:?}", command);
        match command {
            CanvasCommand::SelectColor { hex } => {
                self.session.select_color(Rgba::from_hex(&hex)?);
            }
            CanvasCommand::SelectPalette { index } => {
                if !self.session.select_palette_index(index) {
                    warn!("Unknown palette index {}", index);
                }
            }
            CanvasCommand::SetOverlay { mode } => self.session.set_overlay(overlay_mode(mode))?,
            CanvasCommand::ToggleHeatmap => {
                self.session.toggle_heatmap();
            }
            CanvasCommand::SetReplayPrefix { prefix } => self.session.set_replay_prefix(prefix)?,
            CanvasCommand::ToggleCell { x, y } => {
                self.session.toggle_cell(x as i64, y as i64)?;
            }
            CanvasCommand::Unstage { x, y } => {
                if !self.session.unstage_cell(x as i64, y as i64)? {
                    debug!("({}, {}) was not staged", x, y);
                }
            }
            CanvasCommand::Commit => self.commit()?,
            CanvasCommand::Cancel => {
                self.session.cancel_pending();
            }
            CanvasCommand::Resolve { outcome } => self.resolve(outcome)?,
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), CanvasError> {
        if self.session.commit_pending()?.is_none() {
            debug!("Commit with nothing staged");
            return Ok(());
        }
        let cost_per_pixel = self.session.config().cost_per_pixel;
        let columns = match self.session.in_flight().map(|batch| (batch.columns(), batch.cost(cost_per_pixel))) {
            Some((Ok(columns), cost)) => Some((columns, cost)),
            Some((Err(e), _)) => {
                self.session.resolve_submission(SubmissionResult::Abandoned)?;
                return Err(e);
            }
            None => None,
        };
        if let Some((columns, cost)) = columns {
            self.outbox.push(CanvasToHost::SubmissionRequested(PlacePixelsCall {
                xs: columns.xs,
                ys: columns.ys,
                colors: columns.colors,
                cost,
            }));
        }
        Ok(())
    }

    /// Stage an image with its top-left at grid `(x, y)`
    pub fn import_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        if let Err(e) = self.session.stage_image(image, x, y) {
            self.report(&e);
        }
        self.emit_changes();
    }

    /// Settle the in-flight submission
    pub fn resolve(&mut self, outcome: SubmissionOutcome) -> Result<(), CanvasError> {
        let cells = self.session.resolve_submission(submission_result(&outcome))?;
        self.outbox
            .push(CanvasToHost::SubmissionResolved { outcome, cells });
        self.emit_changes();
        Ok(())
    }

    /// Apply a `PixelPlaced` log from the event source
    pub fn ingest_log(&mut self, log: &PixelPlacedLog) -> anyhow::Result<()> {
        let event = paint_event(log, self.session.log().next_sequence())?;
        self.session.ingest(event)?;
        self.outbox.push(CanvasToHost::PixelCount {
            total: self.session.log().total_placed(),
        });
        Ok(())
    }

    /// Take the queued outbound messages
    pub fn drain(&mut self) -> Vec<CanvasToHost> {
        std::mem::take(&mut self.outbox)
    }

    fn report(&mut self, error: &CanvasError) {
        warn!("Rejected input: {}", error);
        self.outbox.push(CanvasToHost::Error {
            code: error_code(error).to_string(),
            message: error.to_string(),
        });
    }

    fn emit_changes(&mut self) {
        let hover = self.session.hover_label();
        if hover != self.last_hover {
            self.outbox.push(CanvasToHost::HoverChanged {
                label: hover.clone(),
            });
            self.last_hover = hover;
        }

        let pending = self.session.pending().len();
        if pending != self.last_pending {
            self.outbox.push(CanvasToHost::PendingChanged {
                count: pending,
                cost: self.session.pending_cost(),
            });
            self.last_pending = pending;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelburn_config::CanvasConfig;
    use pixelburn_ipc::LooseUint;

    fn bridge() -> CanvasBridge {
        let mut config = CanvasConfig::with_grid_size(8);
        config.viewport_width = 8;
        config.viewport_height = 8;
        config.cost_per_pixel = 0.01;
        CanvasBridge::new(CanvasSession::new(&config).unwrap())
    }

    fn pointer(phase: PointerPhase, x: f64, y: f64) -> InputMessage {
        InputMessage::Pointer(PointerInput {
            phase,
            x,
            y,
            button: MouseButton::Left,
            shift: false,
        })
    }

    fn log(x: u64, y: u64, color: &str) -> PixelPlacedLog {
        PixelPlacedLog {
            user: "0xfeed".to_string(),
            x: LooseUint::Number(x),
            y: LooseUint::Number(y),
            color: LooseUint::Text(color.to_string()),
            log_index: None,
        }
    }

    #[test]
    fn test_pointer_conversion() {
        let input = PointerInput {
            phase: PointerPhase::Leave,
            x: 1.0,
            y: 2.0,
            button: MouseButton::Right,
            shift: true,
        };
        let sample = pointer_sample(&input);
        assert_eq!(sample.phase, CanvasPhase::Cancel);
        assert_eq!(sample.button, PointerButton::Secondary);
        assert!(sample.shift);
    }

    #[test]
    fn test_paint_event_sequence_fallback() {
        let event = paint_event(&log(3, 4, "0x00ff00"), 9).unwrap();
        assert_eq!(event.sequence, 9);
        assert_eq!(event.color, Rgba::opaque(0, 255, 0));

        let mut numbered = log(3, 4, "0x00ff00");
        numbered.log_index = Some(LooseUint::Number(2));
        assert_eq!(paint_event(&numbered, 9).unwrap().sequence, 2);
    }

    #[test]
    fn test_stroke_commit_emits_call() {
        let mut bridge = bridge();
        bridge.handle_input(pointer(PointerPhase::Down, 2.5, 2.5));
        bridge.handle_input(pointer(PointerPhase::Move, 2.5, 3.5));
        bridge.handle_input(pointer(PointerPhase::Up, 2.5, 3.5));
        bridge.drain();

        bridge.handle_input(InputMessage::Command(CanvasCommand::Commit));
        let messages = bridge.drain();
        let call = messages
            .iter()
            .find_map(|m| match m {
                CanvasToHost::SubmissionRequested(call) => Some(call.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(call.xs, vec![2, 2]);
        assert_eq!(call.ys, vec![2, 3]);
        assert_eq!(call.colors, vec![0xffffff, 0xffffff]);
        assert!((call.cost - 0.02).abs() < 1e-12);
        assert!(messages.contains(&CanvasToHost::PendingChanged { count: 0, cost: 0.0 }));
    }

    fn command(command: CanvasCommand) -> InputMessage {
        InputMessage::Command(command)
    }

    #[test]
    fn test_click_and_commands_unstage() {
        let mut bridge = bridge();
        bridge.handle_input(pointer(PointerPhase::Down, 1.5, 1.5));
        bridge.handle_input(pointer(PointerPhase::Up, 1.5, 1.5));
        bridge.handle_input(command(CanvasCommand::ToggleCell { x: 6, y: 6 }));
        assert_eq!(bridge.session().pending().len(), 2);

        // Clicking the staged cell again takes it back out
        bridge.handle_input(pointer(PointerPhase::Down, 1.5, 1.5));
        bridge.handle_input(pointer(PointerPhase::Up, 1.5, 1.5));
        assert_eq!(bridge.session().raster().cell(1, 1), Rgba::BLACK);

        bridge.handle_input(command(CanvasCommand::Unstage { x: 6, y: 6 }));
        assert!(bridge.session().pending().is_empty());
        let messages = bridge.drain();
        assert_eq!(
            messages.last(),
            Some(&CanvasToHost::PendingChanged { count: 0, cost: 0.0 })
        );

        bridge.handle_input(command(CanvasCommand::ToggleCell { x: 8, y: 0 }));
        assert!(matches!(
            &bridge.drain()[..],
            [CanvasToHost::Error { code, .. }] if code == "out_of_bounds"
        ));
    }

    #[test]
    fn test_import_image_reports_pending() {
        let mut bridge = bridge();
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 1, image::Rgba([0, 0, 255, 255]));
        bridge.import_image(&image, 6, 6);

        assert_eq!(bridge.session().raster().cell(7, 7), Rgba::opaque(0, 0, 255));
        assert_eq!(
            bridge.drain(),
            vec![CanvasToHost::PendingChanged { count: 2, cost: 0.02 }]
        );
    }

    #[test]
    fn test_input_errors_become_messages() {
        let mut bridge = bridge();
        bridge.handle_input(InputMessage::Command(CanvasCommand::SelectColor {
            hex: "nope".to_string(),
        }));
        let messages = bridge.drain();
        assert!(matches!(
            &messages[..],
            [CanvasToHost::Error { code, .. }] if code == "invalid_color"
        ));

        bridge.handle_input(InputMessage::Command(CanvasCommand::Resolve {
            outcome: SubmissionOutcome::Confirmed,
        }));
        assert!(matches!(
            &bridge.drain()[..],
            [CanvasToHost::Error { code, .. }] if code == "no_submission_in_flight"
        ));
    }

    #[test]
    fn test_rejected_submission_reverts() {
        let mut bridge = bridge();
        bridge.handle_input(pointer(PointerPhase::Down, 1.5, 1.5));
        bridge.handle_input(pointer(PointerPhase::Up, 1.5, 1.5));
        bridge.handle_input(InputMessage::Command(CanvasCommand::Commit));
        bridge.handle_input(InputMessage::Command(CanvasCommand::Resolve {
            outcome: SubmissionOutcome::Rejected {
                reason: "denied".to_string(),
            },
        }));
        assert_eq!(bridge.session().raster().cell(1, 1), Rgba::BLACK);
    }

    #[test]
    fn test_hover_changes_are_reported_once() {
        let mut bridge = bridge();
        bridge.handle_input(pointer(PointerPhase::Move, 4.5, 5.5));
        bridge.handle_input(pointer(PointerPhase::Move, 4.6, 5.6));
        let hovers: Vec<_> = bridge
            .drain()
            .into_iter()
            .filter(|m| matches!(m, CanvasToHost::HoverChanged { .. }))
            .collect();
        assert_eq!(
            hovers,
            vec![CanvasToHost::HoverChanged {
                label: "(4, 5)".to_string()
            }]
        );
    }

    #[test]
    fn test_ingest_log() {
        let mut bridge = bridge();
        bridge.ingest_log(&log(0, 7, "0xff0000")).unwrap();
        bridge.ingest_log(&log(1, 7, "#ff0000")).unwrap_err();
        assert_eq!(bridge.session().raster().cell(0, 7), Rgba::RED);
        assert_eq!(bridge.drain(), vec![CanvasToHost::PixelCount { total: 1 }]);
        assert!(bridge.ingest_log(&log(9, 0, "0x0")).is_err());
    }
}

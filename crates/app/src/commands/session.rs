//! `session`: drive a canvas session from a JSON script
//!
//! Each step is a host message, a `PixelPlaced` log from another author,
//! an image import, a frame tick or a reset. Outbound messages are written
//! as JSON lines; submissions go to the local submitter and are settled
//! before the next step runs.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use canvas::CanvasSession;
use image::RgbaImage;
use pixelburn_config::CanvasConfig;
use pixelburn_ipc::{CanvasToHost, InputMessage, PixelPlacedLog};
use serde::Deserialize;
use tracing::{debug, info};

use crate::bridge::CanvasBridge;
use crate::submitter::{LocalSubmitter, SubmitterHandle};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ScriptStep {
    Input(InputMessage),
    PixelPlaced(PixelPlacedLog),
    /// Stage an image file with its top-left at grid `(x, y)`
    Import { path: PathBuf, x: i64, y: i64 },
    Frame,
    Reset,
}

/// Totals reported when a script finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub steps: usize,
    pub messages: usize,
    pub submissions: usize,
    pub frames: u64,
    pub placed: usize,
}

pub fn read_script(path: &Path) -> anyhow::Result<Vec<ScriptStep>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing script {}", path.display()))
}

struct Driver<'a, W: Write> {
    bridge: CanvasBridge,
    submitter: SubmitterHandle,
    surface: RgbaImage,
    out: &'a mut W,
    summary: SessionSummary,
}

impl<W: Write> Driver<'_, W> {
    async fn step(&mut self, step: ScriptStep) -> anyhow::Result<()> {
        match step {
            ScriptStep::Input(message) => self.bridge.handle_input(message),
            ScriptStep::PixelPlaced(log) => self.bridge.ingest_log(&log)?,
            ScriptStep::Import { path, x, y } => {
                let image = image::open(&path)
                    .with_context(|| format!("opening image {}", path.display()))?
                    .to_rgba8();
                self.bridge.import_image(&image, x, y);
            }
            ScriptStep::Frame => {
                self.bridge.session_mut().frame(&mut self.surface)?;
            }
            ScriptStep::Reset => self.bridge.session_mut().reset(),
        }
        self.flush().await
    }

    /// Write queued messages, serving submission requests as they appear
    async fn flush(&mut self) -> anyhow::Result<()> {
        loop {
            let messages = self.bridge.drain();
            if messages.is_empty() {
                return Ok(());
            }
            for message in messages {
                serde_json::to_writer(&mut *self.out, &message)?;
                writeln!(self.out)?;
                self.summary.messages += 1;

                if let CanvasToHost::SubmissionRequested(call) = message {
                    self.summary.submissions += 1;
                    let reply = self.submitter.submit(call).await;
                    debug!("Submission outcome: {:?}", reply.outcome);
                    self.bridge.resolve(reply.outcome)?;
                    for log in &reply.logs {
                        self.bridge.ingest_log(log)?;
                    }
                }
            }
        }
    }
}

/// Run a script and return the final frame with a summary
pub async fn run<W: Write>(
    config: &CanvasConfig,
    steps: Vec<ScriptStep>,
    user: &str,
    fail_submissions: bool,
    out: &mut W,
) -> anyhow::Result<(RgbaImage, SessionSummary)> {
    let session = CanvasSession::new(config)?;
    let side = session.side();
    let (submitter, handle) = LocalSubmitter::new(user, fail_submissions);
    let task = tokio::spawn(submitter.run());

    let mut driver = Driver {
        bridge: CanvasBridge::new(session),
        submitter: handle,
        surface: RgbaImage::new(side, side),
        out,
        summary: SessionSummary::default(),
    };

    for (index, step) in steps.into_iter().enumerate() {
        driver
            .step(step)
            .await
            .with_context(|| format!("script step {}", index))?;
        driver.summary.steps += 1;
    }

    let session = driver.bridge.session_mut();
    session.request_redraw();
    session.frame(&mut driver.surface)?;

    let mut summary = driver.summary;
    summary.frames = driver.bridge.session().frames();
    summary.placed = driver.bridge.session().log().total_placed();

    drop(driver.submitter);
    task.await.context("local submitter task")?;
    info!(
        "Script finished: {} steps, {} submissions, {} pixels placed",
        summary.steps, summary.submissions, summary.placed
    );
    Ok((driver.surface, summary))
}

pub async fn run_file(
    config: &CanvasConfig,
    script: &Path,
    out: &Path,
    user: &str,
    fail_submissions: bool,
) -> anyhow::Result<SessionSummary> {
    let steps = read_script(script)?;
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    let (image, summary) = run(config, steps, user, fail_submissions, &mut lock).await?;
    image
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CanvasConfig {
        let mut config = CanvasConfig::with_grid_size(8);
        config.viewport_width = 8;
        config.viewport_height = 8;
        config.cost_per_pixel = 0.5;
        config
    }

    fn steps(json: &str) -> Vec<ScriptStep> {
        serde_json::from_str(json).unwrap()
    }

    fn lines(out: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    const PAINT_AND_COMMIT: &str = r##"[
        {"type": "Input", "data": {"type": "Command", "data": {"type": "SelectColor", "data": {"hex": "#ffffff"}}}},
        {"type": "Input", "data": {"type": "Pointer", "data": {"phase": "down", "x": 2.5, "y": 2.5}}},
        {"type": "Input", "data": {"type": "Pointer", "data": {"phase": "move", "x": 2.5, "y": 3.5}}},
        {"type": "Input", "data": {"type": "Pointer", "data": {"phase": "up", "x": 2.5, "y": 3.5}}},
        {"type": "Input", "data": {"type": "Command", "data": {"type": "Commit"}}},
        {"type": "Frame"}
    ]"##;

    #[tokio::test]
    async fn test_confirmed_script_places_pixels() {
        let mut out = Vec::new();
        let (image, summary) = run(&config(), steps(PAINT_AND_COMMIT), "0xme", false, &mut out)
            .await
            .unwrap();

        assert_eq!(summary.steps, 6);
        assert_eq!(summary.submissions, 1);
        assert_eq!(summary.placed, 2);
        assert_eq!(image.get_pixel(2, 2).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(2, 3).0, [255, 255, 255, 255]);

        let kinds: Vec<String> = lines(&out)
            .iter()
            .map(|v| v["type"].as_str().unwrap().to_string())
            .collect();
        assert!(kinds.contains(&"SubmissionRequested".to_string()));
        assert!(kinds.contains(&"SubmissionResolved".to_string()));
        assert_eq!(kinds.iter().filter(|k| *k == "PixelCount").count(), 2);
    }

    #[tokio::test]
    async fn test_failed_submission_reverts() {
        let mut out = Vec::new();
        let (image, summary) = run(&config(), steps(PAINT_AND_COMMIT), "0xme", true, &mut out)
            .await
            .unwrap();

        assert_eq!(summary.placed, 0);
        assert_eq!(image.get_pixel(2, 2).0, [0, 0, 0, 255]);
        let resolved = lines(&out)
            .into_iter()
            .find(|v| v["type"] == "SubmissionResolved")
            .unwrap();
        assert_eq!(resolved["data"]["outcome"]["type"], "Failed");
    }

    #[tokio::test]
    async fn test_foreign_pixels_are_ingested() {
        let script = r#"[
            {"type": "PixelPlaced", "data": {"user": "0xother", "x": 1, "y": 1, "color": "0xff0000"}},
            {"type": "Frame"}
        ]"#;
        let mut out = Vec::new();
        let (image, summary) = run(&config(), steps(script), "0xme", false, &mut out)
            .await
            .unwrap();
        assert_eq!(summary.placed, 1);
        assert_eq!(image.get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[tokio::test]
    async fn test_import_step_stages_image() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("sprite.png");
        let mut sprite = RgbaImage::new(2, 1);
        sprite.put_pixel(0, 0, image::Rgba([0, 255, 0, 255]));
        sprite.put_pixel(1, 0, image::Rgba([0, 0, 255, 255]));
        sprite.save(&png).unwrap();

        let script = serde_json::json!([
            {"type": "Import", "data": {"path": png, "x": 3, "y": 5}},
            {"type": "Input", "data": {"type": "Command", "data": {"type": "Commit"}}}
        ]);
        let steps: Vec<ScriptStep> = serde_json::from_value(script).unwrap();
        let mut out = Vec::new();
        let (image, summary) = run(&config(), steps, "0xme", false, &mut out).await.unwrap();

        assert_eq!(summary.submissions, 1);
        assert_eq!(summary.placed, 2);
        assert_eq!(image.get_pixel(3, 5).0, [0, 255, 0, 255]);
        assert_eq!(image.get_pixel(4, 5).0, [0, 0, 255, 255]);
    }

    #[tokio::test]
    async fn test_missing_import_fails() {
        let script = r#"[{"type": "Import", "data": {"path": "/nonexistent/sprite.png", "x": 0, "y": 0}}]"#;
        let mut out = Vec::new();
        let err = run(&config(), steps(script), "0xme", false, &mut out)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("opening image"));
    }

    #[tokio::test]
    async fn test_bad_foreign_log_names_step() {
        let script = r#"[
            {"type": "Frame"},
            {"type": "PixelPlaced", "data": {"user": "0xother", "x": 99, "y": 1, "color": 0}}
        ]"#;
        let mut out = Vec::new();
        let err = run(&config(), steps(script), "0xme", false, &mut out)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("script step 1"));
    }

    #[tokio::test]
    async fn test_run_file_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("script.json");
        let out = dir.path().join("frame.png");
        std::fs::write(&script, PAINT_AND_COMMIT).unwrap();

        let summary = run_file(&config(), &script, &out, "0xme", false).await.unwrap();
        assert_eq!(summary.placed, 2);
        let loaded = image::open(&out).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(2, 3).0, [255, 255, 255, 255]);
    }
}

//! Recorded signature input
//!
//! A signature is captured elsewhere (a tablet page, a kiosk) and saved as the
//! raw device events plus the surface geometry, e.g.
//!
//! ```json
//! {
//!   "width": 300, "height": 128,
//!   "bounds": { "left": 40, "top": 220 },
//!   "events": [
//!     { "type": "touch_start", "touches": [{ "client_x": 60, "client_y": 250 }] },
//!     { "type": "touch_move",  "touches": [{ "client_x": 140, "client_y": 270 }] },
//!     { "type": "touch_end" }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use cert_core::{check_surface, DeviceEvent, InputAdapter, SignatureCapture, SurfaceBounds};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StrokeRecording {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub bounds: SurfaceBounds,
    pub events: Vec<DeviceEvent>,
}

impl StrokeRecording {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let recording: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid stroke file {}", path.display()))?;
        check_surface(recording.width, recording.height)
            .with_context(|| format!("Invalid stroke file {}", path.display()))?;
        Ok(recording)
    }

    /// Feed every event to `target` through the device adapter.
    pub fn replay<C: SignatureCapture + ?Sized>(&self, target: &mut C) {
        InputAdapter::new(self.bounds).replay(&self.events, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cert_core::SignaturePad;
    use std::io::Write;

    #[test]
    fn test_load_and_replay() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "width": 300, "height": 128,
                "bounds": {{ "left": 40, "top": 220 }},
                "events": [
                    {{ "type": "touch_start", "touches": [{{ "client_x": 60, "client_y": 250 }}] }},
                    {{ "type": "touch_move", "touches": [{{ "client_x": 140, "client_y": 270 }}] }},
                    {{ "type": "touch_end" }}
                ]
            }}"#
        )
        .unwrap();

        let recording = StrokeRecording::load(file.path()).unwrap();
        let mut pad = SignaturePad::new(recording.width, recording.height).unwrap();
        recording.replay(&mut pad);
        assert_eq!(pad.strokes()[0][0].x, 20.0);
        assert!(pad.signature().is_some());
    }

    #[test]
    fn test_unbounded_surface_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "width": 1e40, "height": 128, "events": [] }}"#).unwrap();
        let err = StrokeRecording::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid stroke file"));
        assert!(err.root_cause().to_string().contains("Invalid signature surface"));
    }

    #[test]
    fn test_invalid_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = StrokeRecording::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid stroke file"));
    }
}

//! The snapshot capability: camera id in, JPEG still out.

use serde_json::json;
use tracing::debug;

use crate::capture;
use crate::devices::DeviceDirectory;
use crate::gemini::ToolDef;

use super::CapabilityResult;

pub const CAPTURE_CAMERA_SNAPSHOT: &str = "capture_camera_snapshot";

/// JPEG quality for snapshots sent to the model.
const SNAPSHOT_JPEG_QUALITY: u8 = 85;

pub struct SnapshotTool {
    directory: DeviceDirectory,
}

impl SnapshotTool {
    pub fn new(directory: DeviceDirectory) -> Self {
        Self { directory }
    }

    pub fn tool_defs() -> Vec<ToolDef> {
        vec![ToolDef {
            name: CAPTURE_CAMERA_SNAPSHOT.to_string(),
            description:
                "Take a snapshot from the camera with the given ID and return the still image."
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "cam_id": {
                        "type": "string",
                        "description": "ID of the camera, as listed in the device table"
                    }
                },
                "required": ["cam_id"]
            }),
        }]
    }

    /// Snapshot from the camera with the given id.
    ///
    /// Unknown id and no-frame both come back as `Absent`; an unreachable
    /// stream propagates as an error.
    pub async fn capture_camera_snapshot(
        &self,
        cam_id: &str,
    ) -> Result<CapabilityResult, capture::CaptureError> {
        let Some(device) = self.directory.lookup(cam_id) else {
            return Ok(CapabilityResult::Absent);
        };

        debug!("capturing snapshot from {} ({})", device.id, device.address);
        match capture::snapshot_rtsp_stream(&device.address).await? {
            Some(frame) => Ok(CapabilityResult::Image(encode_jpeg(&frame))),
            None => Ok(CapabilityResult::Absent),
        }
    }
}

fn encode_jpeg(frame: &image::RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    // Encoding an in-memory RGB8 buffer to JPEG cannot fail.
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, SNAPSHOT_JPEG_QUALITY)
        .encode_image(frame)
        .ok();
    bytes
}

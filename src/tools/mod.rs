pub mod camera;

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use serde_json::Value;

use crate::devices::DeviceDirectory;
use crate::gemini::ToolDef;

/// Result of one capability invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityResult {
    Text(String),
    /// JPEG bytes.
    Image(Vec<u8>),
    /// Known capability, nothing to report (e.g. unknown camera id or a
    /// stream that yielded no frame).
    Absent,
}

/// Name-based dispatch surface the conversation loop invokes through.
///
/// Object-safe with boxed futures so the loop can hold it behind a `dyn`
/// pointer; `Ok(None)` means the name is not registered at all and the
/// caller skips it silently.
pub trait CapabilityDispatch: Send + Sync {
    fn tool_defs(&self) -> Vec<ToolDef>;

    fn invoke<'a>(
        &'a self,
        name: &'a str,
        args: &'a Value,
    ) -> Pin<Box<dyn Future<Output = Result<Option<CapabilityResult>>> + Send + 'a>>;
}

/// The fixed capability table. Currently a single entry: take a snapshot
/// from a camera by id.
pub struct ToolRegistry {
    snapshot: camera::SnapshotTool,
}

impl ToolRegistry {
    pub fn new(directory: DeviceDirectory) -> Self {
        Self {
            snapshot: camera::SnapshotTool::new(directory),
        }
    }
}

impl CapabilityDispatch for ToolRegistry {
    fn tool_defs(&self) -> Vec<ToolDef> {
        camera::SnapshotTool::tool_defs()
    }

    fn invoke<'a>(
        &'a self,
        name: &'a str,
        args: &'a Value,
    ) -> Pin<Box<dyn Future<Output = Result<Option<CapabilityResult>>> + Send + 'a>> {
        Box::pin(async move {
            match name {
                camera::CAPTURE_CAMERA_SNAPSHOT => {
                    let cam_id = args["cam_id"].as_str().unwrap_or("");
                    let result = self.snapshot.capture_camera_snapshot(cam_id).await?;
                    Ok(Some(result))
                }
                _ => Ok(None),
            }
        })
    }
}

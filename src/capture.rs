//! One-shot RTSP frame capture via an ffmpeg subprocess.
//!
//! A failure to open the stream is a hard error carried back to the caller;
//! a stream that opens but yields no usable frame is only logged and turns
//! into `Ok(None)`. The two paths are deliberately different.

use std::path::PathBuf;

use image::RgbImage;
use thiserror::Error;
use tokio::process::Command;
use tracing::warn;

/// Errors from opening the stream. A connected stream that produces no
/// frame is not an error (see module docs).
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Error: Failed to open RTSP stream at {address}: {detail}")]
    Connect { address: String, detail: String },

    #[error("Error: Failed to run ffmpeg: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Grab a single frame from the stream at `address` and return it as an
/// RGB image.
///
/// One synchronous attempt, no retry. The temp file ffmpeg writes into is
/// removed on every path before returning.
pub async fn snapshot_rtsp_stream(address: &str) -> Result<Option<RgbImage>, CaptureError> {
    let tmp = frame_path();

    let output = Command::new("ffmpeg")
        .args(ffmpeg_args(address, &tmp))
        .output()
        .await?;

    if !output.status.success() {
        let _ = tokio::fs::remove_file(&tmp).await;
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CaptureError::Connect {
            address: address.to_string(),
            detail: stderr_tail(&stderr),
        });
    }

    let bytes = tokio::fs::read(&tmp).await.unwrap_or_default();
    let _ = tokio::fs::remove_file(&tmp).await;

    match decode_rgb(&bytes) {
        Some(frame) => Ok(Some(frame)),
        None => {
            warn!("Error: Failed to capture frame from {address}.");
            Ok(None)
        }
    }
}

fn frame_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "gemini_home_cap_{}.jpg",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    ))
}

fn ffmpeg_args(address: &str, tmp: &std::path::Path) -> Vec<String> {
    vec![
        "-rtsp_transport".to_string(),
        "tcp".to_string(),
        "-i".to_string(),
        address.to_string(),
        "-vframes".to_string(),
        "1".to_string(),
        "-q:v".to_string(),
        "3".to_string(),
        "-y".to_string(),
        tmp.to_string_lossy().into_owned(),
    ]
}

/// Decode whatever ffmpeg wrote and normalize to RGB8, whatever the
/// source color order was. Undecodable or empty input is the no-frame case.
pub(crate) fn decode_rgb(bytes: &[u8]) -> Option<RgbImage> {
    image::load_from_memory(bytes).ok().map(|img| img.to_rgb8())
}

/// Last non-empty stderr line; ffmpeg puts the actual failure reason there.
fn stderr_tail(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("unknown error")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_jpeg() -> Vec<u8> {
        let img = RgbImage::from_fn(4, 4, |x, y| image::Rgb([x as u8 * 60, y as u8 * 60, 128]));
        let mut bytes = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 90)
            .encode_image(&img)
            .unwrap();
        bytes
    }

    #[test]
    fn decode_rgb_roundtrips_a_jpeg() {
        let frame = decode_rgb(&sample_jpeg()).unwrap();
        assert_eq!(frame.dimensions(), (4, 4));
    }

    #[test]
    fn decode_rgb_rejects_garbage() {
        assert!(decode_rgb(b"not an image").is_none());
    }

    #[test]
    fn decode_rgb_rejects_empty_input() {
        assert!(decode_rgb(&[]).is_none());
    }

    #[test]
    fn ffmpeg_args_request_a_single_frame_over_tcp() {
        let args = ffmpeg_args("rtsp://cam/stream", std::path::Path::new("/tmp/out.jpg"));
        assert_eq!(args[0], "-rtsp_transport");
        assert_eq!(args[1], "tcp");
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[i + 1], "rtsp://cam/stream");
        let v = args.iter().position(|a| a == "-vframes").unwrap();
        assert_eq!(args[v + 1], "1");
        assert_eq!(args.last().unwrap(), "/tmp/out.jpg");
    }

    #[test]
    fn connect_error_names_the_address() {
        let err = CaptureError::Connect {
            address: "rtsp://cam1/stream".to_string(),
            detail: "Connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("rtsp://cam1/stream"));
        assert!(msg.contains("Connection refused"));
    }

    #[test]
    fn stderr_tail_picks_last_meaningful_line() {
        let stderr = "ffmpeg version n6.0\nInput #0 ...\nConnection to tcp://cam:554 failed: Connection refused\n\n";
        assert_eq!(
            stderr_tail(stderr),
            "Connection to tcp://cam:554 failed: Connection refused"
        );
    }

    #[test]
    fn stderr_tail_handles_empty_output() {
        assert_eq!(stderr_tail(""), "unknown error");
    }
}

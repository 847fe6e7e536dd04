/// Extensions (lowercase) we report as supported video containers.
pub const SUPPORTED_VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "3gp", "avi", "mkv", "webm"];

pub const DEFAULT_TIME_POSITION: f64 = 0.0;
pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 240;
pub const DEFAULT_QUALITY: f64 = 0.8;

/// Largest accepted thumbnail side, in pixels. WebP can't encode anything wider or taller.
pub const MAX_DIMENSION: u32 = 16_383;

/// How many decodes a batch runs at once.
pub const DEFAULT_MAX_CONCURRENT_DECODES: usize = 2;

/// How far from the requested time a decoded frame may land, in seconds.
pub const DEFAULT_SEEK_TOLERANCE_SECS: f64 = 0.5;

/// Requests past the end of a video are pulled back this far before the end, in seconds.
pub const DEFAULT_END_OF_STREAM_BACKOFF_SECS: f64 = 0.1;

/// Frames are decoded at up to this multiple of the requested size, then resampled down.
pub const DEFAULT_DECODE_OVERSAMPLE: u32 = 2;

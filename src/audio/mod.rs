//! Audio download and processing for the transcription fallback.

mod downloader;

pub use downloader::{convert_to_wav, download_audio, split_audio};

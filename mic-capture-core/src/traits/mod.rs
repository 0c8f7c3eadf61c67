pub mod audio_sink;
pub mod capture_delegate;
pub mod stream_provider;

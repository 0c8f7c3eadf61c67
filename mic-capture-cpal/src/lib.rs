//! # mic-capture-cpal
//!
//! Hardware backend for `mic-capture-core`: a cpal input stream that
//! implements [`StreamProvider`](mic_capture_core::StreamProvider) and a
//! device enumerator covering every host cpal was built with.
//!
//! ```no_run
//! use mic_capture_core::{CaptureEngine, StreamConfig};
//! use mic_capture_cpal::CpalInputStream;
//!
//! let mut engine = CaptureEngine::new(CpalInputStream::new());
//! engine.configure(StreamConfig::default())?;
//! engine.begin_recording("take.wav");
//! std::thread::sleep(std::time::Duration::from_secs(2));
//! engine.end_recording();
//! # Ok::<(), mic_capture_core::CaptureError>(())
//! ```

pub mod cpal_input;
pub mod device_enumerator;
pub mod host;

pub use cpal_input::CpalInputStream;
pub use device_enumerator::{list_devices, list_input_devices, print_device_list};
pub use host::{available_backends, host_id};

//! Mapping between [`AudioBackend`] and the cpal hosts compiled into this
//! build.

use cpal::HostId;

use mic_capture_core::AudioBackend;

/// cpal host implementing `backend`, or `None` if it is not compiled for
/// this platform.
pub fn host_id(backend: AudioBackend) -> Option<HostId> {
    match backend {
        #[cfg(any(
            target_os = "linux",
            target_os = "dragonfly",
            target_os = "freebsd",
            target_os = "netbsd"
        ))]
        AudioBackend::Alsa => Some(HostId::Alsa),
        #[cfg(all(
            feature = "jack",
            any(
                target_os = "linux",
                target_os = "dragonfly",
                target_os = "freebsd",
                target_os = "netbsd",
                target_os = "macos",
                target_os = "windows"
            )
        ))]
        AudioBackend::Jack => Some(HostId::Jack),
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        AudioBackend::CoreAudio => Some(HostId::CoreAudio),
        #[cfg(target_os = "windows")]
        AudioBackend::Wasapi => Some(HostId::Wasapi),
        #[cfg(all(feature = "asio", target_os = "windows"))]
        AudioBackend::Asio => Some(HostId::Asio),
        _ => None,
    }
}

/// Backend a cpal host corresponds to.
pub fn backend_for(id: HostId) -> Option<AudioBackend> {
    AudioBackend::ALL
        .into_iter()
        .find(|&backend| host_id(backend) == Some(id))
}

/// Backends that are compiled in and available at runtime, in
/// enumeration order.
pub fn available_backends() -> Vec<AudioBackend> {
    let hosts = cpal::available_hosts();
    AudioBackend::ALL
        .into_iter()
        .filter(|&backend| host_id(backend).is_some_and(|id| hosts.contains(&id)))
        .collect()
}

/// Open the host for `backend`, or the platform default host.
pub fn open_host(backend: Option<AudioBackend>) -> Result<cpal::Host, String> {
    let Some(backend) = backend else {
        return Ok(cpal::default_host());
    };
    let id = host_id(backend)
        .ok_or_else(|| format!("{} is not compiled for this platform", backend))?;
    cpal::host_from_id(id).map_err(|e| format!("{} unavailable: {}", backend, e))
}

use ort::execution_providers::ExecutionProviderDispatch;

/// Execution providers to register on a detector session, in priority order.
///
/// ONNX Runtime silently falls back to its CPU provider when none of these
/// can be initialised, so an empty list means "CPU only".
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    let providers = platform_providers();
    if providers.is_empty() {
        log::debug!("Using the CPU execution provider");
    } else {
        log::debug!("Requesting {} accelerated execution provider(s)", providers.len());
    }
    providers
}

#[cfg(target_os = "macos")]
fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
}

#[cfg(target_os = "windows")]
fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    Vec::new()
}

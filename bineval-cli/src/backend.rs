//! Backend selection for the command line tools.
//!
//! The selected backend holds the pixel masks and computes the confusion
//! counts of local evaluation. The external tool mode never touches it.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "wgpu")] {
        use burn::backend::wgpu::{Wgpu, WgpuDevice};

        /// Selected backend type
        pub type SelectedBackend = Wgpu;
        /// Selected device type
        pub type SelectedDevice = WgpuDevice;

        /// Creates the appropriate device for the selected backend
        pub fn create_device() -> SelectedDevice {
            WgpuDevice::default()
        }

        /// Name of the backend that classifies and counts pixels, for the
        /// start-up log line
        pub const fn get_backend_name() -> &'static str {
            "WGPU (GPU)"
        }
    } else {
        use burn::backend::ndarray::{NdArray, NdArrayDevice};

        /// Selected backend type
        pub type SelectedBackend = NdArray;
        /// Selected device type
        pub type SelectedDevice = NdArrayDevice;

        /// Creates the appropriate device for the selected backend
        pub fn create_device() -> SelectedDevice {
            NdArrayDevice::default()
        }

        /// Name of the backend that classifies and counts pixels, for the
        /// start-up log line
        pub const fn get_backend_name() -> &'static str {
            "NdArray (CPU)"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "wgpu"))]
    #[test]
    fn default_backend_runs_on_the_cpu() {
        assert_eq!(get_backend_name(), "NdArray (CPU)");
        let _device: SelectedDevice = create_device();
    }
}

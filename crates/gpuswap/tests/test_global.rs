//! Process-wide mode switch.
//!
//! All tests share one global context, so they run serially and start from
//! a reset state.

use gpuswap::{prelude::*, FORCE_CPU_VAR, USE_GPU_VAR};
use pretty_assertions::assert_eq;
use serial_test::serial;

#[test]
#[serial(gpuswap_global)]
fn test_force_cpu_from_process_env() {
    temp_env::with_vars([(FORCE_CPU_VAR, Some("1")), (USE_GPU_VAR, Some("1"))], || {
        gpuswap::reset();
        assert!(!gpuswap::gpu_mode());
        assert_eq!(gpuswap::resolution().source, ModeSource::ForceCpu);
        assert_eq!(gpuswap::array_library(), "nalgebra");
        assert_eq!(gpuswap::table_library(), "gpuswap::Table<host>");
    });
    gpuswap::reset();
}

#[test]
#[serial(gpuswap_global)]
fn test_explicit_gpu_is_trusted() {
    temp_env::with_vars([(FORCE_CPU_VAR, None), (USE_GPU_VAR, Some("true"))], || {
        gpuswap::reset();
        assert!(gpuswap::gpu_mode());
        assert_eq!(gpuswap::resolution().source, ModeSource::Explicit);
        assert_eq!(gpuswap::array_library(), "cudarc");
    });
    gpuswap::reset();
}

#[test]
#[serial(gpuswap_global)]
fn test_setter_is_process_wide() {
    temp_env::with_var(FORCE_CPU_VAR, Some("1"), || {
        gpuswap::reset();
        assert_eq!(gpuswap::mode(), Mode::Cpu);

        gpuswap::set_gpu_mode(true);
        let seen = std::thread::spawn(gpuswap::gpu_mode).join().unwrap();
        assert!(seen);
        assert_eq!(gpuswap::context().resolution().source, ModeSource::Manual);

        gpuswap::set_gpu_mode(false);
        assert_eq!(gpuswap::array_library(), "nalgebra");

        assert_eq!(gpuswap::refresh().source, ModeSource::ForceCpu);
    });
    gpuswap::reset();
}

#[test]
#[serial(gpuswap_global)]
fn test_cpu_round_trip() {
    temp_env::with_var(FORCE_CPU_VAR, Some("on"), || {
        gpuswap::reset();

        let a = gpuswap::create_array(
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            &ArrayOptions::default(),
        )
        .unwrap();
        let a = gpuswap::to_cpu(a).unwrap();
        assert_eq!(a.shape(), (2, 2));

        let t = gpuswap::create_table(
            TableInput::records(["x", "y"], vec![vec![1.0, 2.0]]),
            &TableOptions::default(),
        )
        .unwrap();
        let t = gpuswap::to_cpu(t).unwrap();
        assert_eq!(t.host_column("y"), Some(&[2.0][..]));

        gpuswap::synchronize().unwrap();

        let status = gpuswap::status();
        assert_eq!(status.mode, Mode::Cpu);
        assert_eq!(status.array_library, "nalgebra");
    });
    gpuswap::reset();
}

#[test]
fn test_detection_helpers_agree() {
    if gpuswap::is_gpu_available() {
        assert!(gpuswap::detect_hardware());
        assert!(gpuswap::is_software_available());
    }
}

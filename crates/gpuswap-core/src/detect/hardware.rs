//! Hardware probe.
//!
//! Runs the device enumeration utility with a bounded run time and parses
//! its CSV listing into [`GpuDevice`] records.

use crate::{
    config::settings::ProbeConfig,
    core::error::{DetectionError, DetectionResult},
};
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Information about a GPU device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpuDevice {
    /// Device index
    pub index: usize,
    /// Device name
    pub name: String,
    /// Compute capability, `(0, 0)` when the utility does not report it
    pub compute_capability: (u32, u32),
    /// Total memory in MiB, 0 when unknown
    pub total_memory_mib: u64,
}

impl GpuDevice {
    /// Checks if this device meets a minimum compute capability.
    pub fn is_compatible(&self, min_compute_capability: (u32, u32)) -> bool {
        self.compute_capability >= min_compute_capability
    }
}

/// Outcome of a successful hardware probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareReport {
    /// All devices reported by the utility
    pub devices: Vec<GpuDevice>,
    /// Threshold used to judge compatibility
    pub min_compute_capability: (u32, u32),
}

impl HardwareReport {
    /// Devices meeting the compute capability threshold.
    pub fn compatible_devices(&self) -> impl Iterator<Item = &GpuDevice> {
        let min = self.min_compute_capability;
        self.devices.iter().filter(move |d| d.is_compatible(min))
    }

    /// Whether at least one compatible device was found.
    pub fn has_compatible_device(&self) -> bool {
        self.compatible_devices().next().is_some()
    }
}

/// Probes for GPU hardware according to `config`.
pub fn probe_hardware(config: &ProbeConfig) -> DetectionResult<HardwareReport> {
    if !config.is_supported_os() {
        return Err(DetectionError::UnsupportedPlatform {
            os: config.target_os.clone(),
        });
    }

    let output = run_utility(config)?;
    let devices = parse_device_listing(&output)?;

    Ok(HardwareReport {
        devices,
        min_compute_capability: config.min_compute_capability,
    })
}

/// Runs the configured utility and returns its standard output.
///
/// The child is killed if it outlives `config.timeout`. Output that is
/// still incomplete at the deadline also counts as a timeout.
pub fn run_utility(config: &ProbeConfig) -> DetectionResult<String> {
    let program = config.program.clone();

    let mut child = Command::new(&config.program)
        .args(&config.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DetectionError::UtilityNotFound {
                program: program.clone(),
            },
            _ => DetectionError::Spawn {
                program: program.clone(),
                reason: e.to_string(),
            },
        })?;

    // Drain stdout on a separate thread so a chatty child cannot block on a full pipe.
    let mut stdout = child.stdout.take().ok_or_else(|| DetectionError::Spawn {
        program: program.clone(),
        reason: "stdout was not captured".to_string(),
    })?;
    let (tx, output_rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = tx.send(stdout.read_to_string(&mut buf).map(|_| buf));
    });

    let deadline = Instant::now() + config.timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DetectionError::Timeout {
                    program,
                    timeout: config.timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(DetectionError::Spawn {
                    program,
                    reason: e.to_string(),
                });
            }
        }
    };

    if !status.success() {
        return Err(DetectionError::NonZeroExit {
            program,
            code: status.code(),
        });
    }

    // A backgrounded descendant can keep stdout open after the utility exits.
    let remaining = deadline.saturating_duration_since(Instant::now());
    let output = match output_rx.recv_timeout(remaining) {
        Ok(read) => read.map_err(|e| DetectionError::Spawn {
            program: program.clone(),
            reason: e.to_string(),
        })?,
        Err(RecvTimeoutError::Timeout) => {
            return Err(DetectionError::Timeout {
                program,
                timeout: config.timeout,
            });
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(DetectionError::Spawn {
                program,
                reason: "output reader panicked".to_string(),
            });
        }
    };

    trace!(%program, bytes = output.len(), "device utility finished");
    Ok(output)
}

/// Parses `index, name, compute_cap, memory.total` CSV lines.
///
/// Blank lines are skipped. Names may contain commas; the first field is the
/// index and the last two are compute capability and memory. Fields the
/// utility reports as `[N/A]` or `[Not Supported]` parse as zero.
pub fn parse_device_listing(output: &str) -> DetectionResult<Vec<GpuDevice>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_device_line)
        .collect()
}

fn parse_device_line(line: &str) -> DetectionResult<GpuDevice> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(DetectionError::malformed(line));
    }

    let index = fields[0]
        .parse::<usize>()
        .map_err(|_| DetectionError::malformed(line))?;
    let n = fields.len();
    let name = fields[1..n - 2].join(", ");
    let compute_capability = parse_compute_capability(fields[n - 2]);
    let total_memory_mib = fields[n - 1].parse::<u64>().unwrap_or(0);

    Ok(GpuDevice {
        index,
        name,
        compute_capability,
        total_memory_mib,
    })
}

fn parse_compute_capability(field: &str) -> (u32, u32) {
    let mut parts = field.splitn(2, '.');
    let major = parts.next().and_then(|s| s.parse::<u32>().ok());
    let minor = parts.next().map_or(Some(0), |s| s.parse::<u32>().ok());

    match (major, minor) {
        (Some(major), Some(minor)) => (major, minor),
        _ => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_for(program: &str, args: &[&str]) -> ProbeConfig {
        ProbeConfig {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(2),
            target_os: "linux".to_string(),
            ..ProbeConfig::default()
        }
    }

    #[test]
    fn test_parse_device_listing() {
        let output = "0, Tesla T4, 7.5, 15360\n\n1, NVIDIA GeForce GTX 680, 3.0, 2048\n";
        let devices = parse_device_listing(output).unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(
            devices[0],
            GpuDevice {
                index: 0,
                name: "Tesla T4".to_string(),
                compute_capability: (7, 5),
                total_memory_mib: 15360,
            }
        );
        assert_eq!(devices[1].compute_capability, (3, 0));
    }

    #[test]
    fn test_parse_name_with_commas_and_missing_fields() {
        let devices = parse_device_listing("3, Board, rev 2, [N/A], [Not Supported]").unwrap();
        assert_eq!(devices[0].index, 3);
        assert_eq!(devices[0].name, "Board, rev 2");
        assert_eq!(devices[0].compute_capability, (0, 0));
        assert_eq!(devices[0].total_memory_mib, 0);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_device_listing("No devices were found"),
            Err(DetectionError::MalformedOutput { .. })
        ));
        assert!(matches!(
            parse_device_listing("x, Tesla T4, 7.5, 15360"),
            Err(DetectionError::MalformedOutput { .. })
        ));
        assert!(parse_device_listing("").unwrap().is_empty());
    }

    #[test]
    fn test_report_compatibility() {
        let report = HardwareReport {
            devices: parse_device_listing("0, Old, 3.0, 1024\n1, New, 8.6, 24576").unwrap(),
            min_compute_capability: (3, 5),
        };
        assert!(report.has_compatible_device());
        assert_eq!(report.compatible_devices().count(), 1);

        let report = HardwareReport {
            devices: parse_device_listing("0, Old, 3.0, 1024").unwrap(),
            min_compute_capability: (3, 5),
        };
        assert!(!report.has_compatible_device());
    }

    #[test]
    fn test_unsupported_platform() {
        let mut config = config_for("true", &[]);
        config.target_os = "macos".to_string();
        assert_eq!(
            probe_hardware(&config),
            Err(DetectionError::UnsupportedPlatform {
                os: "macos".to_string()
            })
        );
    }

    #[test]
    fn test_missing_utility() {
        let config = config_for("gpuswap-definitely-not-installed", &[]);
        assert!(matches!(
            run_utility(&config),
            Err(DetectionError::UtilityNotFound { .. })
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_probe_with_fake_utility() {
        let config = config_for("sh", &["-c", "echo '0, Tesla T4, 7.5, 15360'"]);
        let report = probe_hardware(&config).unwrap();
        assert!(report.has_compatible_device());
        assert_eq!(report.devices[0].name, "Tesla T4");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_zero_exit() {
        let config = config_for("sh", &["-c", "exit 9"]);
        assert_eq!(
            run_utility(&config),
            Err(DetectionError::NonZeroExit {
                program: "sh".to_string(),
                code: Some(9),
            })
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_timeout_kills_child() {
        let mut config = config_for("sleep", &["5"]);
        config.timeout = Duration::from_millis(100);

        let start = Instant::now();
        let result = run_utility(&config);
        assert!(matches!(result, Err(DetectionError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_timeout_covers_inherited_stdout() {
        let mut config = config_for("sh", &["-c", "sleep 5 & echo '0, Tesla T4, 7.5, 15360'"]);
        config.timeout = Duration::from_millis(300);

        let start = Instant::now();
        let result = run_utility(&config);
        assert!(matches!(result, Err(DetectionError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}

//! Mode resolution.
//!
//! Precedence, first match wins:
//!
//! 1. force-CPU flag truthy → CPU, detection is skipped
//! 2. explicit enable/disable flag → that value, not re-validated
//! 3. auto-detection enabled → result of [`GpuDetector::is_gpu_available`]
//! 4. configured default mode

use crate::{
    config::{env::EnvOverrides, settings::ResolverConfig},
    core::types::{Mode, ModeSource, Resolution},
    detect::{GpuDetector, SystemDetector},
};
use tracing::debug;

/// Computes the effective mode from overrides and detection.
#[derive(Debug)]
pub struct ModeResolver<D: GpuDetector> {
    detector: D,
    config: ResolverConfig,
}

impl ModeResolver<SystemDetector> {
    /// Resolver probing the running system.
    pub fn system(config: ResolverConfig) -> Self {
        let detector = SystemDetector::new(config.probe.clone());
        Self { detector, config }
    }
}

impl<D: GpuDetector> ModeResolver<D> {
    /// Creates a resolver with a custom detector.
    pub fn new(detector: D, config: ResolverConfig) -> Self {
        Self { detector, config }
    }

    /// Resolves the mode for the given overrides.
    pub fn resolve(&self, env: &EnvOverrides) -> Resolution {
        let resolution = if env.force_cpu {
            Resolution::new(Mode::Cpu, ModeSource::ForceCpu)
        } else if let Some(use_gpu) = env.use_gpu {
            Resolution::new(Mode::from(use_gpu), ModeSource::Explicit)
        } else if self.config.auto_detect {
            Resolution::new(
                Mode::from(self.detector.is_gpu_available()),
                ModeSource::AutoDetect,
            )
        } else {
            Resolution::new(self.config.default_mode, ModeSource::Default)
        };

        debug!(mode = %resolution.mode, source = %resolution.source, "mode resolved");
        resolution
    }

    /// The detector used for auto-detection.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// The resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::settings::ResolverConfigBuilder, detect::StaticDetector};
    use proptest::prelude::*;

    fn overrides(force_cpu: bool, use_gpu: Option<bool>) -> EnvOverrides {
        EnvOverrides { force_cpu, use_gpu }
    }

    #[test]
    fn test_force_cpu_skips_detection() {
        let resolver = ModeResolver::new(StaticDetector::available(), ResolverConfig::default());
        let r = resolver.resolve(&overrides(true, Some(true)));

        assert_eq!(r, Resolution::new(Mode::Cpu, ModeSource::ForceCpu));
        assert_eq!(resolver.detector().probe_count(), 0);
    }

    #[test]
    fn test_explicit_flag_is_trusted() {
        let resolver = ModeResolver::new(StaticDetector::unavailable(), ResolverConfig::default());
        let r = resolver.resolve(&overrides(false, Some(true)));

        assert_eq!(r, Resolution::new(Mode::Gpu, ModeSource::Explicit));
        assert_eq!(resolver.detector().probe_count(), 0);
    }

    #[test]
    fn test_auto_detect() {
        let resolver = ModeResolver::new(StaticDetector::available(), ResolverConfig::default());
        assert_eq!(
            resolver.resolve(&EnvOverrides::default()),
            Resolution::new(Mode::Gpu, ModeSource::AutoDetect)
        );

        let resolver =
            ModeResolver::new(StaticDetector::new(true, false), ResolverConfig::default());
        assert_eq!(resolver.resolve(&EnvOverrides::default()).mode, Mode::Cpu);
    }

    #[test]
    fn test_default_when_auto_detect_disabled() {
        let config = ResolverConfigBuilder::new()
            .auto_detect(false)
            .default_mode(Mode::Gpu)
            .build();
        let resolver = ModeResolver::new(StaticDetector::unavailable(), config);

        assert_eq!(
            resolver.resolve(&EnvOverrides::default()),
            Resolution::new(Mode::Gpu, ModeSource::Default)
        );
        assert_eq!(resolver.detector().probe_count(), 0);
    }

    #[test]
    fn test_missing_utility_resolves_cpu() {
        let config = ResolverConfigBuilder::new()
            .probe_command("gpuswap-definitely-not-installed", Vec::<String>::new())
            .target_os("linux")
            .build();
        let resolver = ModeResolver::system(config);

        assert_eq!(
            resolver.resolve(&EnvOverrides::default()),
            Resolution::new(Mode::Cpu, ModeSource::AutoDetect)
        );
    }

    proptest! {
        #[test]
        fn prop_force_cpu_always_wins(
            use_gpu in proptest::option::of(any::<bool>()),
            hardware in any::<bool>(),
            software in any::<bool>(),
        ) {
            let resolver = ModeResolver::new(
                StaticDetector::new(hardware, software),
                ResolverConfig::default(),
            );
            let r = resolver.resolve(&overrides(true, use_gpu));
            prop_assert_eq!(r.mode, Mode::Cpu);
            prop_assert_eq!(r.source, ModeSource::ForceCpu);
        }

        #[test]
        fn prop_explicit_flag_ignores_availability(
            use_gpu in any::<bool>(),
            hardware in any::<bool>(),
            software in any::<bool>(),
        ) {
            let resolver = ModeResolver::new(
                StaticDetector::new(hardware, software),
                ResolverConfig::default(),
            );
            let r = resolver.resolve(&overrides(false, Some(use_gpu)));
            prop_assert_eq!(r.mode, Mode::from(use_gpu));
        }

        #[test]
        fn prop_auto_detect_matches_availability(
            hardware in any::<bool>(),
            software in any::<bool>(),
        ) {
            let detector = StaticDetector::new(hardware, software);
            let expected = Mode::from(detector.is_gpu_available());
            let resolver = ModeResolver::new(detector, ResolverConfig::default());
            prop_assert_eq!(resolver.resolve(&EnvOverrides::default()).mode, expected);
        }
    }
}

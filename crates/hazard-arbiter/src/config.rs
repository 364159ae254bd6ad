//! Arbiter configuration and global suppression flags.

use serde::{Deserialize, Serialize};

use crate::error::{ArbiterError, ArbiterResult};

/// Timing configuration for the arbiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Pedestrian-crossing episode dwell (milliseconds).
    pub epcw_episode_dwell_ms: u64,
    /// Pedestrian direction overlay blink interval (milliseconds).
    pub epcw_blink_interval_ms: u64,
    /// Transit zone dwell when the event carries none (milliseconds).
    pub transit_zone_dwell_ms: u64,
    /// Rail-crossing surface blink interval (milliseconds).
    pub rail_blink_interval_ms: u64,
    /// Rail-crossing ladder dwell; `None` keeps the ladder until told otherwise.
    pub rail_dwell_ms: Option<u64>,
    /// Red-light dwell when the event carries none (milliseconds).
    pub red_light_dwell_ms: u64,
    /// Dwell of timed images when the event carries none (milliseconds).
    pub timed_image_dwell_ms: u64,
    /// Window during which a playing cue cannot be downgraded (milliseconds).
    pub audio_hold_ms: u64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            epcw_episode_dwell_ms: 30_000,
            epcw_blink_interval_ms: 300,
            transit_zone_dwell_ms: 2_000,
            rail_blink_interval_ms: 500,
            rail_dwell_ms: Some(10_000),
            red_light_dwell_ms: 10_000,
            timed_image_dwell_ms: 5_000,
            audio_hold_ms: 1_500,
        }
    }
}

impl ArbiterConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any dwell or blink interval is zero.
    pub fn validate(&self) -> ArbiterResult<()> {
        let required = [
            ("epcw_episode_dwell_ms", self.epcw_episode_dwell_ms),
            ("epcw_blink_interval_ms", self.epcw_blink_interval_ms),
            ("transit_zone_dwell_ms", self.transit_zone_dwell_ms),
            ("rail_blink_interval_ms", self.rail_blink_interval_ms),
            ("red_light_dwell_ms", self.red_light_dwell_ms),
            ("timed_image_dwell_ms", self.timed_image_dwell_ms),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| *value == 0) {
            return Err(ArbiterError::invalid_configuration(format!(
                "{name} must be greater than 0"
            )));
        }
        if self.rail_dwell_ms == Some(0) {
            return Err(ArbiterError::invalid_configuration(
                "rail_dwell_ms must be greater than 0 when set",
            ));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> ArbiterConfigBuilder {
        ArbiterConfigBuilder::default()
    }
}

/// Builder for `ArbiterConfig`.
#[derive(Debug, Default)]
pub struct ArbiterConfigBuilder {
    config: ArbiterConfig,
}

impl ArbiterConfigBuilder {
    /// Set the pedestrian-crossing episode dwell.
    #[must_use]
    pub fn epcw_episode_dwell_ms(mut self, ms: u64) -> Self {
        self.config.epcw_episode_dwell_ms = ms;
        self
    }

    /// Set the pedestrian overlay blink interval.
    #[must_use]
    pub fn epcw_blink_interval_ms(mut self, ms: u64) -> Self {
        self.config.epcw_blink_interval_ms = ms;
        self
    }

    /// Set the default transit zone dwell.
    #[must_use]
    pub fn transit_zone_dwell_ms(mut self, ms: u64) -> Self {
        self.config.transit_zone_dwell_ms = ms;
        self
    }

    /// Set the rail-crossing blink interval.
    #[must_use]
    pub fn rail_blink_interval_ms(mut self, ms: u64) -> Self {
        self.config.rail_blink_interval_ms = ms;
        self
    }

    /// Set or disable the rail-crossing ladder dwell.
    #[must_use]
    pub fn rail_dwell_ms(mut self, ms: Option<u64>) -> Self {
        self.config.rail_dwell_ms = ms;
        self
    }

    /// Set the default red-light dwell.
    #[must_use]
    pub fn red_light_dwell_ms(mut self, ms: u64) -> Self {
        self.config.red_light_dwell_ms = ms;
        self
    }

    /// Set the default timed-image dwell.
    #[must_use]
    pub fn timed_image_dwell_ms(mut self, ms: u64) -> Self {
        self.config.timed_image_dwell_ms = ms;
        self
    }

    /// Set the audio hold window.
    #[must_use]
    pub fn audio_hold_ms(mut self, ms: u64) -> Self {
        self.config.audio_hold_ms = ms;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> ArbiterResult<ArbiterConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Global notification switches.
///
/// State keeps updating whatever the flags say; only the directives that
/// leave the arbiter are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressionFlags {
    /// Screen notifications enabled.
    pub screen_notifications: bool,
    /// Sound notifications enabled.
    pub sound_notifications: bool,
    /// Unit is in maintenance.
    pub maintenance_mode: bool,
    /// Unit is running degraded.
    pub degraded_mode: bool,
}

impl Default for SuppressionFlags {
    fn default() -> Self {
        Self {
            screen_notifications: true,
            sound_notifications: true,
            maintenance_mode: false,
            degraded_mode: false,
        }
    }
}

impl SuppressionFlags {
    /// Whether every directive is withheld.
    pub fn is_silenced(&self) -> bool {
        self.maintenance_mode
            || self.degraded_mode
            || (!self.screen_notifications && !self.sound_notifications)
    }

    /// Whether display directives and log events may leave.
    pub fn display_allowed(&self) -> bool {
        !self.is_silenced() && self.screen_notifications
    }

    /// Whether audio directives may leave.
    pub fn audio_allowed(&self) -> bool {
        !self.is_silenced() && self.sound_notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() -> ArbiterResult<()> {
        ArbiterConfig::default().validate()
    }

    #[test]
    fn test_zero_dwell_rejected() {
        let result = ArbiterConfig::builder().transit_zone_dwell_ms(0).build();
        assert!(matches!(
            result,
            Err(ArbiterError::InvalidConfiguration(ref msg)) if msg.contains("transit_zone_dwell_ms")
        ));

        let result = ArbiterConfig::builder().rail_dwell_ms(Some(0)).build();
        assert!(matches!(result, Err(ArbiterError::InvalidConfiguration(_))));

        let result = ArbiterConfig::builder().rail_dwell_ms(None).build();
        assert!(matches!(result, Ok(ref c) if c.rail_dwell_ms.is_none()));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() -> Result<(), serde_yaml::Error> {
        let config: ArbiterConfig = serde_yaml::from_str("audio_hold_ms: 900\n")?;
        assert_eq!(config.audio_hold_ms, 900);
        assert_eq!(config.epcw_episode_dwell_ms, 30_000);
        Ok(())
    }

    #[test]
    fn test_suppression_flags() {
        let flags = SuppressionFlags::default();
        assert!(flags.display_allowed() && flags.audio_allowed());

        let screen_off = SuppressionFlags {
            screen_notifications: false,
            ..SuppressionFlags::default()
        };
        assert!(!screen_off.display_allowed());
        assert!(screen_off.audio_allowed());

        let both_off = SuppressionFlags {
            sound_notifications: false,
            ..screen_off
        };
        assert!(both_off.is_silenced());

        let degraded = SuppressionFlags {
            degraded_mode: true,
            ..SuppressionFlags::default()
        };
        assert!(!degraded.display_allowed() && !degraded.audio_allowed());
    }
}

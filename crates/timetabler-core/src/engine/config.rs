use crate::core::models::calendar::DAYS_PER_WEEK;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_LESSONS_PER_DAY: u32 = 3;
pub const DEFAULT_SENIOR_PERIODS_PER_DAY: u32 = 6;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Parameters of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Wall-clock budget handed to the search backend.
    pub time_limit: Duration,
    /// Most lessons of one subject a section may have on a single day.
    pub max_lessons_per_day: u32,
    /// Daily period count that marks a section as senior.
    pub senior_periods_per_day: u32,
    /// Overrides `senior_periods_per_day * 5`.
    pub senior_weekly_ceiling: Option<u32>,
    /// Overrides the longest school day in the snapshot times five.
    pub human_weekly_ceiling: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            max_lessons_per_day: DEFAULT_MAX_LESSONS_PER_DAY,
            senior_periods_per_day: DEFAULT_SENIOR_PERIODS_PER_DAY,
            senior_weekly_ceiling: None,
            human_weekly_ceiling: None,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Most periods one person can teach in a week, given the longest school day.
    pub fn human_ceiling(&self, max_periods_per_day: u32) -> u64 {
        self.human_weekly_ceiling
            .map_or(u64::from(max_periods_per_day) * DAYS_PER_WEEK as u64, u64::from)
    }

    /// Most senior-section periods one person can teach in a week.
    pub fn senior_ceiling(&self) -> u64 {
        self.senior_weekly_ceiling.map_or(
            u64::from(self.senior_periods_per_day) * DAYS_PER_WEEK as u64,
            u64::from,
        )
    }
}

#[derive(Default)]
pub struct EngineConfigBuilder {
    time_limit: Option<Duration>,
    max_lessons_per_day: Option<u32>,
    senior_periods_per_day: Option<u32>,
    senior_weekly_ceiling: Option<u32>,
    human_weekly_ceiling: Option<u32>,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
    pub fn max_lessons_per_day(mut self, n: u32) -> Self {
        self.max_lessons_per_day = Some(n);
        self
    }
    pub fn senior_periods_per_day(mut self, n: u32) -> Self {
        self.senior_periods_per_day = Some(n);
        self
    }
    pub fn senior_weekly_ceiling(mut self, ceiling: u32) -> Self {
        self.senior_weekly_ceiling = Some(ceiling);
        self
    }
    pub fn human_weekly_ceiling(mut self, ceiling: u32) -> Self {
        self.human_weekly_ceiling = Some(ceiling);
        self
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let defaults = EngineConfig::default();
        let config = EngineConfig {
            time_limit: self.time_limit.unwrap_or(defaults.time_limit),
            max_lessons_per_day: self
                .max_lessons_per_day
                .unwrap_or(defaults.max_lessons_per_day),
            senior_periods_per_day: self
                .senior_periods_per_day
                .unwrap_or(defaults.senior_periods_per_day),
            senior_weekly_ceiling: self.senior_weekly_ceiling,
            human_weekly_ceiling: self.human_weekly_ceiling,
        };

        if config.max_lessons_per_day == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_lessons_per_day",
                reason: "must allow at least one lesson per day".to_string(),
            });
        }
        if config.senior_periods_per_day == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "senior_periods_per_day",
                reason: "must be a positive period count".to_string(),
            });
        }
        if let (Some(senior), Some(human)) =
            (config.senior_weekly_ceiling, config.human_weekly_ceiling)
        {
            if senior > human {
                return Err(ConfigError::InvalidParameter {
                    name: "senior_weekly_ceiling",
                    reason: format!("{senior} exceeds the weekly ceiling of {human}"),
                });
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_yields_defaults() {
        let config = EngineConfigBuilder::new().build().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.time_limit, Duration::from_secs(60));
        assert_eq!(config.max_lessons_per_day, 3);
        assert_eq!(config.senior_ceiling(), 30);
        assert_eq!(config.human_ceiling(8), 40);
    }

    #[test]
    fn overrides_replace_derived_ceilings() {
        let config = EngineConfig::builder()
            .human_weekly_ceiling(36)
            .senior_weekly_ceiling(28)
            .build()
            .unwrap();
        assert_eq!(config.human_ceiling(8), 36);
        assert_eq!(config.senior_ceiling(), 28);
    }

    #[test]
    fn zero_daily_cap_is_rejected() {
        let err = EngineConfig::builder()
            .max_lessons_per_day(0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "max_lessons_per_day",
                ..
            }
        ));
    }

    #[test]
    fn senior_ceiling_above_human_ceiling_is_rejected() {
        let err = EngineConfig::builder()
            .human_weekly_ceiling(20)
            .senior_weekly_ceiling(25)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("25 exceeds the weekly ceiling of 20"));
    }
}

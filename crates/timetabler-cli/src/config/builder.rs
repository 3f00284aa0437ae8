use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use crate::cli::EngineArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use std::str::FromStr;
use std::time::Duration;
use timetabler::engine::config::EngineConfig;
use tracing::debug;

/// Resolves the engine configuration from built-in defaults, the optional
/// config file, `-S` overrides and finally the dedicated flags.
pub fn build_config(args: &EngineArgs, time_limit_flag: Option<u64>) -> Result<EngineConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let file_config = apply_set_values(file_config, &args.set_values)?;
    debug!("Merged configuration file and overrides: {:?}", file_config);

    let search = file_config.search.unwrap_or_default();
    let constraints = file_config.constraints.unwrap_or_default();
    let workload = file_config.workload.unwrap_or_default();

    let time_limit_secs = time_limit_flag
        .or(search.time_limit_secs)
        .unwrap_or(defaults.time_limit_secs);

    let mut builder = EngineConfig::builder()
        .time_limit(Duration::from_secs(time_limit_secs))
        .max_lessons_per_day(
            constraints
                .max_lessons_per_day
                .unwrap_or(defaults.max_lessons_per_day),
        )
        .senior_periods_per_day(
            workload
                .senior_periods_per_day
                .unwrap_or(defaults.senior_periods_per_day),
        );
    if let Some(ceiling) = workload.senior_weekly_ceiling {
        builder = builder.senior_weekly_ceiling(ceiling);
    }
    if let Some(ceiling) = workload.human_weekly_ceiling {
        builder = builder.human_weekly_ceiling(ceiling);
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid non-negative integer value for {}: {}",
            key, value
        ))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) =
            parser::parse_key_value(kv_pair).map_err(|e| CliError::Argument(e.to_string()))?;

        match key {
            "search.time-limit-secs" => {
                config
                    .search
                    .get_or_insert_with(Default::default)
                    .time_limit_secs = Some(parse_value(key, value)?);
            }
            "constraints.max-lessons-per-day" => {
                config
                    .constraints
                    .get_or_insert_with(Default::default)
                    .max_lessons_per_day = Some(parse_value(key, value)?);
            }
            "workload.senior-periods-per-day" => {
                config
                    .workload
                    .get_or_insert_with(Default::default)
                    .senior_periods_per_day = Some(parse_value(key, value)?);
            }
            "workload.senior-weekly-ceiling" => {
                config
                    .workload
                    .get_or_insert_with(Default::default)
                    .senior_weekly_ceiling = Some(parse_value(key, value)?);
            }
            "workload.human-weekly-ceiling" => {
                config
                    .workload
                    .get_or_insert_with(Default::default)
                    .human_weekly_ceiling = Some(parse_value(key, value)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

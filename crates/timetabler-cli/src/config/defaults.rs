use timetabler::engine::config::{
    DEFAULT_MAX_LESSONS_PER_DAY, DEFAULT_SENIOR_PERIODS_PER_DAY, DEFAULT_TIME_LIMIT,
};

pub struct DefaultsConfig {
    pub time_limit_secs: u64,
    pub max_lessons_per_day: u32,
    pub senior_periods_per_day: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT.as_secs(),
            max_lessons_per_day: DEFAULT_MAX_LESSONS_PER_DAY,
            senior_periods_per_day: DEFAULT_SENIOR_PERIODS_PER_DAY,
        }
    }
}

use super::load_snapshot;
use crate::cli::VerifyArgs;
use crate::config::builder::build_config;
use crate::error::{CliError, Result};
use timetabler::core::io::schedule_file::ScheduleFile;
use timetabler::core::io::traits::TimetableFile;
use tracing::info;

pub async fn run(args: VerifyArgs) -> Result<()> {
    let config = build_config(&args.engine, None)?;
    let snapshot = load_snapshot(&args.input)?;

    info!("Loading schedule from {:?}", &args.schedule);
    let schedule =
        ScheduleFile::read_from_path(&args.schedule).map_err(|e| CliError::FileParsing {
            path: args.schedule.clone(),
            source: e.into(),
        })?;

    let violations = schedule.verify(&snapshot, config.max_lessons_per_day);
    if violations.is_empty() {
        println!(
            "✓ Schedule with {} lesson(s) satisfies every constraint.",
            schedule.len()
        );
        return Ok(());
    }

    println!("Schedule violations:");
    for violation in &violations {
        println!("  ✗ {}", violation);
    }
    Err(CliError::Violations {
        count: violations.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{EngineArgs, GenerateArgs};
    use crate::commands::{fixtures, generate};

    #[tokio::test]
    async fn generated_schedule_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixtures::write(&dir, "school.toml", fixtures::FEASIBLE);
        let schedule = dir.path().join("week.toml");
        generate::run(GenerateArgs {
            input: input.clone(),
            output: Some(schedule.clone()),
            time_limit: None,
            engine: EngineArgs::default(),
        })
        .await
        .unwrap();

        let result = run(VerifyArgs {
            input,
            schedule,
            engine: EngineArgs::default(),
        })
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn incomplete_schedule_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixtures::write(&dir, "school.toml", fixtures::FEASIBLE);
        let schedule = fixtures::write(
            &dir,
            "week.toml",
            r#"
[[entries]]
day = "Monday"
period = 1
section = 100
subject = 10
teacher = 1
"#,
        );

        let result = run(VerifyArgs {
            input,
            schedule,
            engine: EngineArgs::default(),
        })
        .await;

        assert!(matches!(result, Err(CliError::Violations { count: 2 })));
    }
}

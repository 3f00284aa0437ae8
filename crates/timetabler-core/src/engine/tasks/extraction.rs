use super::model_building::ModelBuildResult;
use crate::core::models::schedule::{Schedule, ScheduleKey, ScheduledLesson};
use crate::engine::context::GenerationContext;
use crate::engine::cp::CpSolution;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use tracing::{info, instrument};

/// Turns solved start slots into a schedule.
///
/// Every modeled occurrence must have a value and land in its own
/// (day, period, section) cell; anything else is an engine fault, and no
/// partial schedule is returned.
#[instrument(skip_all, name = "extraction_task")]
pub fn run(
    context: &GenerationContext,
    build: &ModelBuildResult,
    solution: &CpSolution,
) -> Result<Schedule, EngineError> {
    info!(
        occurrences = build.occurrences.len(),
        "Extracting schedule from solution."
    );
    context.reporter.report(Progress::TaskStart {
        total_steps: build.occurrences.len() as u64,
    });

    let mut schedule = Schedule::new();
    for (key, vars) in &build.occurrences {
        let slot = solution.value(vars.start).ok_or_else(|| {
            EngineError::Extraction(format!(
                "no value for lesson {} of subject {} in section {}",
                key.index, key.subject, key.section
            ))
        })?;
        let (day, period) = build.grid.decompose(slot).ok_or_else(|| {
            EngineError::Extraction(format!(
                "slot {slot} lies outside the week of {} positions",
                build.grid.horizon()
            ))
        })?;

        let cell = ScheduleKey::new(day, period, key.section);
        let lesson = ScheduledLesson {
            subject: key.subject,
            teacher: key.teacher,
        };
        if let Some(previous) = schedule.insert(cell, lesson) {
            return Err(EngineError::Extraction(format!(
                "section {} has both subject {} and subject {} on {day} period {period}",
                key.section, previous.subject, key.subject
            )));
        }
        context.reporter.report(Progress::TaskIncrement);
    }

    context.reporter.report(Progress::TaskFinish);
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::calendar::Day;
    use crate::core::models::ids::{SectionId, SubjectId, TeacherId};
    use crate::core::models::requirement::{SubjectRequirement, TeacherAssignment};
    use crate::core::models::section::ClassSection;
    use crate::core::models::snapshot::Snapshot;
    use crate::core::models::subject::Subject;
    use crate::core::models::teacher::Teacher;
    use crate::engine::config::EngineConfig;
    use crate::engine::cp::{
        BacktrackingSolver, CpSolver, SolverConfig, SolverStatus,
    };
    use crate::engine::progress::ProgressReporter;
    use crate::engine::tasks::model_building;

    fn snapshot(periods: u32) -> Snapshot {
        Snapshot::builder()
            .teacher(Teacher::new(TeacherId(1), "Bose"))
            .subject(Subject::new(SubjectId(1), "Chemistry"))
            .section(ClassSection::new(SectionId(1), "12-A", 6))
            .assignment(TeacherAssignment::new(SectionId(1), SubjectId(1), TeacherId(1)))
            .requirement(SubjectRequirement::new(SectionId(1), SubjectId(1), periods))
            .build()
            .unwrap()
    }

    #[test]
    fn solved_starts_become_schedule_cells() {
        let snapshot = snapshot(4);
        let config = EngineConfig::default();
        let reporter = ProgressReporter::new();
        let context = GenerationContext::new(&snapshot, &config, &reporter);
        let build = model_building::run(&context).unwrap();
        let solution = BacktrackingSolver::new().solve(&build.model, &SolverConfig::default());

        let schedule = run(&context, &build, &solution).unwrap();
        assert_eq!(schedule.len(), 4);
        assert!(schedule.verify(&snapshot, 3).is_empty());
        assert!(
            schedule
                .iter()
                .all(|(k, _)| k.period >= 1 && k.period <= 6 && k.day <= Day::Friday)
        );
    }

    #[test]
    fn missing_values_are_an_extraction_error() {
        let snapshot = snapshot(2);
        let config = EngineConfig::default();
        let reporter = ProgressReporter::new();
        let context = GenerationContext::new(&snapshot, &config, &reporter);
        let build = model_building::run(&context).unwrap();
        let empty = CpSolution::empty(SolverStatus::Feasible);

        let err = run(&context, &build, &empty).unwrap_err();
        assert!(matches!(err, EngineError::Extraction(msg) if msg.contains("no value")));
    }
}

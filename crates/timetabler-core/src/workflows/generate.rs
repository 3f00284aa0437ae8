use crate::core::models::schedule::Schedule;
use crate::core::models::snapshot::Snapshot;
use crate::engine::config::EngineConfig;
use crate::engine::context::GenerationContext;
use crate::engine::cp::{CpSolver, PortfolioSolver};
use crate::engine::diagnostics::{DiagnosticReport, ScanMode};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks;
use itertools::Itertools;
use tracing::{info, instrument, warn};

/// What a generation run produced: a complete timetable, or the reasons none exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Schedule(Schedule),
    Diagnostics(DiagnosticReport),
}

impl GenerationOutcome {
    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            GenerationOutcome::Schedule(schedule) => Some(schedule),
            GenerationOutcome::Diagnostics(_) => None,
        }
    }

    pub fn diagnostics(&self) -> Option<&DiagnosticReport> {
        match self {
            GenerationOutcome::Schedule(_) => None,
            GenerationOutcome::Diagnostics(report) => Some(report),
        }
    }
}

/// Generates a weekly timetable with the bundled [`PortfolioSolver`].
#[instrument(skip_all, name = "generation_workflow")]
pub fn run(
    snapshot: &Snapshot,
    config: &EngineConfig,
    reporter: &ProgressReporter,
) -> Result<GenerationOutcome, EngineError> {
    run_with_solver(snapshot, config, reporter, &PortfolioSolver::new())
}

/// Generates a weekly timetable, searching with `solver`.
///
/// Structural findings stop the run before any model is built. A failed
/// search (infeasible, timed out or otherwise inconclusive) triggers a deep
/// scan whose findings, or a generic explanation, become the result.
pub fn run_with_solver(
    snapshot: &Snapshot,
    config: &EngineConfig,
    reporter: &ProgressReporter,
    solver: &dyn CpSolver,
) -> Result<GenerationOutcome, EngineError> {
    let context = GenerationContext::new(snapshot, config, reporter);

    // === Phase 1: Pre-Solve Diagnostics ===
    reporter.report(Progress::PhaseStart {
        name: "Diagnostics",
    });
    let findings = tasks::diagnostic_scan::run(&context, ScanMode::PreSolve);
    reporter.report(Progress::PhaseFinish);
    if let Some(report) = DiagnosticReport::new(ScanMode::PreSolve, findings) {
        info!(
            findings = report.len(),
            "Snapshot is structurally infeasible; skipping search."
        );
        return Ok(GenerationOutcome::Diagnostics(report));
    }

    // === Phase 2: Model Building ===
    reporter.report(Progress::PhaseStart {
        name: "Model Building",
    });
    let build = tasks::model_building::run(&context)?;
    reporter.report(Progress::PhaseFinish);
    if !build.skipped.is_empty() {
        reporter.report(Progress::Message(format!(
            "{} requirement(s) without an assigned teacher were left out.",
            build.skipped.len()
        )));
    }

    // === Phase 3: Search ===
    reporter.report(Progress::PhaseStart { name: "Search" });
    let solution = tasks::search::run(&context, &build, solver);
    reporter.report(Progress::PhaseFinish);

    if !solution.is_solution_found() {
        // === Phase 4b: Deep Diagnostics ===
        reporter.report(Progress::PhaseStart {
            name: "Deep Diagnostics",
        });
        let findings = tasks::diagnostic_scan::run(&context, ScanMode::Deep);
        reporter.report(Progress::PhaseFinish);
        let report = DiagnosticReport::new(ScanMode::Deep, findings).unwrap_or_else(|| {
            warn!("Search failed without a structural explanation.");
            DiagnosticReport::unexplained()
        });
        return Ok(GenerationOutcome::Diagnostics(report));
    }

    // === Phase 4a: Extraction ===
    reporter.report(Progress::PhaseStart { name: "Extraction" });
    let schedule = tasks::extraction::run(&context, &build, &solution)?;
    reporter.report(Progress::PhaseFinish);

    let violations = schedule.verify(snapshot, config.max_lessons_per_day);
    if !violations.is_empty() {
        return Err(EngineError::Extraction(format!(
            "extracted schedule breaks {} invariant(s): {}",
            violations.len(),
            violations.iter().join("; ")
        )));
    }

    info!(lessons = schedule.len(), "Timetable generated.");
    Ok(GenerationOutcome::Schedule(schedule))
}

/// Runs [`run`] on tokio's blocking pool.
///
/// The snapshot, configuration and reporter are moved onto the worker; a
/// panicked or cancelled worker surfaces as [`EngineError::Worker`].
pub async fn run_async(
    snapshot: Snapshot,
    config: EngineConfig,
    reporter: ProgressReporter<'static>,
) -> Result<GenerationOutcome, EngineError> {
    tokio::task::spawn_blocking(move || run(&snapshot, &config, &reporter))
        .await
        .map_err(|e| EngineError::Worker(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::calendar::Day;
    use crate::core::models::concurrent::ConcurrentSet;
    use crate::core::models::ids::{SectionId, SetId, SubjectId, TeacherId};
    use crate::core::models::requirement::{SubjectRequirement, TeacherAssignment};
    use crate::core::models::schedule::ScheduleKey;
    use crate::core::models::section::ClassSection;
    use crate::core::models::snapshot::SnapshotBuilder;
    use crate::core::models::subject::Subject;
    use crate::core::models::teacher::Teacher;
    use crate::engine::cp::{CpModel, CpSolution, SolverConfig, SolverStatus};
    use crate::engine::diagnostics::{FindingKind, UNEXPLAINED_FAILURE_MESSAGE};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Delegates to the bundled solver while counting calls.
    #[derive(Default)]
    struct CountingSolver {
        calls: AtomicUsize,
    }

    impl CpSolver for CountingSolver {
        fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
            self.calls.fetch_add(1, Ordering::SeqCst);
            PortfolioSolver::new().solve(model, config)
        }
    }

    fn generate(snapshot: &Snapshot) -> (GenerationOutcome, usize) {
        let solver = CountingSolver::default();
        let outcome = run_with_solver(
            snapshot,
            &EngineConfig::default(),
            &ProgressReporter::new(),
            &solver,
        )
        .unwrap();
        (outcome, solver.calls.load(Ordering::SeqCst))
    }

    fn with_teachers(names: &[&str]) -> SnapshotBuilder {
        names
            .iter()
            .enumerate()
            .fold(Snapshot::builder(), |b, (i, name)| {
                b.teacher(Teacher::new(TeacherId(i as u32 + 1), *name))
            })
    }

    fn with_subjects(builder: SnapshotBuilder, count: u32) -> SnapshotBuilder {
        (1..=count).fold(builder, |b, id| {
            b.subject(Subject::new(SubjectId(id), format!("Subject {id}")))
        })
    }

    fn teach(
        builder: SnapshotBuilder,
        section: u32,
        subject: u32,
        teacher: u32,
        periods: u32,
    ) -> SnapshotBuilder {
        builder
            .assignment(TeacherAssignment::new(
                SectionId(section),
                SubjectId(subject),
                TeacherId(teacher),
            ))
            .requirement(SubjectRequirement::new(
                SectionId(section),
                SubjectId(subject),
                periods,
            ))
    }

    fn expect_schedule(outcome: GenerationOutcome) -> Schedule {
        match outcome {
            GenerationOutcome::Schedule(schedule) => schedule,
            GenerationOutcome::Diagnostics(report) => panic!("expected a schedule, got:\n{report}"),
        }
    }

    fn expect_report(outcome: GenerationOutcome) -> DiagnosticReport {
        match outcome {
            GenerationOutcome::Diagnostics(report) => report,
            GenerationOutcome::Schedule(_) => panic!("expected diagnostics, got a schedule"),
        }
    }

    #[test]
    fn two_subjects_share_one_section_without_overlap() {
        let builder = with_subjects(with_teachers(&["Menon", "Pillai"]), 2)
            .section(ClassSection::new(SectionId(1), "8-A", 5));
        let builder = teach(builder, 1, 1, 1, 5);
        let snapshot = teach(builder, 1, 2, 2, 5).build().unwrap();

        let (outcome, searches) = generate(&snapshot);
        let schedule = expect_schedule(outcome);
        assert_eq!(searches, 1);
        assert_eq!(schedule.len(), 10);
        assert_eq!(schedule.lesson_count(SectionId(1), SubjectId(1)), 5);
        assert_eq!(schedule.lesson_count(SectionId(1), SubjectId(2)), 5);
        assert!(schedule.verify(&snapshot, 3).is_empty());
    }

    #[test]
    fn exactly_full_section_fills_every_slot() {
        let mut builder = with_subjects(with_teachers(&["A", "B", "C", "D", "E"]), 5)
            .section(ClassSection::new(SectionId(1), "7-A", 5));
        for subject in 1..=5 {
            builder = teach(builder, 1, subject, subject, 5);
        }
        let snapshot = builder.build().unwrap();

        let schedule = expect_schedule(generate(&snapshot).0);
        assert_eq!(schedule.len(), 25);
        for day in Day::ALL {
            for period in 1..=5 {
                let key = ScheduleKey::new(day, period, SectionId(1));
                assert!(schedule.get(&key).is_some());
            }
        }
        assert!(schedule.verify(&snapshot, 3).is_empty());
    }

    #[test]
    fn shared_elective_lands_on_identical_slots() {
        let builder = with_subjects(with_teachers(&["Kapoor", "Das", "Roy", "Sen", "Ghosh"]), 4)
            .section(ClassSection::new(SectionId(1), "11-A", 2))
            .section(ClassSection::new(SectionId(2), "11-B", 2));
        let builder = teach(builder, 1, 1, 1, 2);
        let builder = teach(builder, 2, 1, 1, 2);
        let builder = teach(builder, 1, 2, 2, 4);
        let builder = teach(builder, 1, 3, 3, 4);
        let builder = teach(builder, 2, 2, 4, 4);
        let snapshot = teach(builder, 2, 4, 5, 4)
            .concurrent_set(
                ConcurrentSet::new(SetId(1), "Electives")
                    .with_sections([SectionId(1), SectionId(2)])
                    .with_subjects([SubjectId(1)]),
            )
            .build()
            .unwrap();

        let schedule = expect_schedule(generate(&snapshot).0);
        let elective_slots = |section| -> BTreeSet<(Day, u32)> {
            schedule
                .for_section(section)
                .filter(|(_, lesson)| lesson.subject == SubjectId(1))
                .map(|(key, _)| (key.day, key.period))
                .collect()
        };
        assert_eq!(elective_slots(SectionId(1)).len(), 2);
        assert_eq!(elective_slots(SectionId(1)), elective_slots(SectionId(2)));
        assert_eq!(schedule.len(), 20);
        assert!(schedule.verify(&snapshot, 3).is_empty());
    }

    #[test]
    fn one_person_across_short_and_long_days_is_never_double_booked() {
        let builder = with_subjects(with_teachers(&["Rao", "Rao (2)", "Iyer"]), 2)
            .section(ClassSection::new(SectionId(1), "12-A", 6))
            .section(ClassSection::new(SectionId(2), "9-A", 8));
        let builder = teach(builder, 1, 1, 1, 12);
        let builder = teach(builder, 2, 1, 2, 14);
        let snapshot = teach(builder, 2, 2, 3, 10).build().unwrap();

        let schedule = expect_schedule(generate(&snapshot).0);
        assert!(schedule.verify(&snapshot, 3).is_empty());
        assert!(schedule.for_section(SectionId(1)).all(|(k, _)| k.period <= 6));
    }

    /// Derives a snapshot from a random week that is valid by construction: every
    /// section fills its eight daily periods where some teacher is free, nobody
    /// teaches two lessons at once and no subject runs more than three times a
    /// day in one section.
    fn planted_snapshot(seed: u64, sections: usize, teachers: u32) -> Snapshot {
        const PERIODS: u32 = 8;
        const SUBJECTS: usize = 8;
        let mut rng = StdRng::seed_from_u64(seed);

        let names: Vec<String> = (1..=teachers).map(|t| format!("Teacher {t}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut builder = with_subjects(with_teachers(&names), SUBJECTS as u32);

        let staff: Vec<Vec<u32>> = (0..sections)
            .map(|_| (0..SUBJECTS).map(|_| rng.random_range(1..=teachers)).collect())
            .collect();
        let mut weekly = vec![vec![0u32; SUBJECTS]; sections];
        for _ in Day::ALL {
            let mut daily = vec![vec![0u32; SUBJECTS]; sections];
            for _ in 0..PERIODS {
                let mut busy = vec![false; teachers as usize + 1];
                let mut order: Vec<usize> = (0..sections).collect();
                for i in 0..order.len() {
                    let j = rng.random_range(i..order.len());
                    order.swap(i, j);
                }
                for section in order {
                    let open: Vec<usize> = (0..SUBJECTS)
                        .filter(|&s| !busy[staff[section][s] as usize] && daily[section][s] < 3)
                        .collect();
                    if open.is_empty() {
                        continue;
                    }
                    let subject = open[rng.random_range(0..open.len())];
                    busy[staff[section][subject] as usize] = true;
                    daily[section][subject] += 1;
                    weekly[section][subject] += 1;
                }
            }
        }

        for (section, subjects) in weekly.iter().enumerate() {
            let id = section as u32 + 1;
            builder = builder.section(ClassSection::new(
                SectionId(id),
                format!("Section {id}"),
                PERIODS,
            ));
            for (subject, &periods) in subjects.iter().enumerate() {
                if periods > 0 {
                    builder = teach(
                        builder,
                        id,
                        subject as u32 + 1,
                        staff[section][subject],
                        periods,
                    );
                }
            }
        }
        builder.build().unwrap()
    }

    fn assert_planted_week_is_recovered(snapshot: &Snapshot) {
        let planted: u32 = snapshot
            .requirements()
            .iter()
            .map(|r| r.periods_per_week)
            .sum();
        let outcome = run(snapshot, &EngineConfig::default(), &ProgressReporter::new()).unwrap();
        let schedule = expect_schedule(outcome);
        assert_eq!(schedule.len(), planted as usize);
        assert!(schedule.verify(snapshot, 3).is_empty());
    }

    #[test]
    fn irregular_week_for_eight_sections_and_ten_teachers_is_solved() {
        let snapshot = planted_snapshot(1, 8, 10);
        assert_eq!(snapshot.sections().len(), 8);
        assert_eq!(snapshot.teachers().len(), 10);
        assert_planted_week_is_recovered(&snapshot);
    }

    #[test]
    fn irregular_week_for_twelve_sections_and_fourteen_teachers_is_solved() {
        let snapshot = planted_snapshot(42, 12, 14);
        assert_planted_week_is_recovered(&snapshot);
    }

    #[test]
    fn section_overload_stops_before_search() {
        let builder = with_subjects(with_teachers(&["Menon", "Pillai"]), 2)
            .section(ClassSection::new(SectionId(1), "10-A", 8));
        let builder = teach(builder, 1, 1, 1, 20);
        let snapshot = teach(builder, 1, 2, 2, 25).build().unwrap();

        let (outcome, searches) = generate(&snapshot);
        let report = expect_report(outcome);
        assert_eq!(searches, 0);
        assert_eq!(report.mode(), ScanMode::PreSolve);
        assert_eq!(report.len(), 1);
        assert_eq!(report.findings()[0].kind, FindingKind::SectionOverload);
        assert!(report.to_string().contains("45 periods, but only 40 slots"));
    }

    #[test]
    fn overloaded_person_stops_before_search() {
        let builder = with_subjects(with_teachers(&["Rao", "Rao (2)"]), 1)
            .section(ClassSection::new(SectionId(1), "10-A", 8))
            .section(ClassSection::new(SectionId(2), "10-B", 8));
        let builder = teach(builder, 1, 1, 1, 21);
        let snapshot = teach(builder, 2, 1, 2, 21).build().unwrap();

        let (outcome, searches) = generate(&snapshot);
        let report = expect_report(outcome);
        assert_eq!(searches, 0);
        assert_eq!(report.count_of(FindingKind::HumanOverload), 1);
        assert!(report.to_string().contains("42 periods. Max possible is 40"));
    }

    #[test]
    fn contradictory_set_stops_before_search() {
        let builder = with_subjects(with_teachers(&["Menon", "Pillai"]), 2)
            .section(ClassSection::new(SectionId(1), "X", 8));
        let builder = teach(builder, 1, 1, 1, 3);
        let snapshot = teach(builder, 1, 2, 2, 3)
            .concurrent_set(
                ConcurrentSet::new(SetId(1), "Block")
                    .with_sections([SectionId(1)])
                    .with_subjects([SubjectId(1), SubjectId(2)]),
            )
            .build()
            .unwrap();

        let (outcome, searches) = generate(&snapshot);
        let report = expect_report(outcome);
        assert_eq!(searches, 0);
        assert_eq!(report.count_of(FindingKind::ConcurrentSetContradiction), 1);
        let text = report.to_string();
        assert!(text.contains("forces X to attend [Subject 1, Subject 2]"));
    }

    #[test]
    fn chained_sets_fail_search_with_the_generic_explanation() {
        // Block 1 ties (X, A) to (Y, C); block 2 ties (Y, C) to (X, B).
        let builder = with_subjects(with_teachers(&["Menon", "Pillai", "Nair"]), 3)
            .section(ClassSection::new(SectionId(1), "X", 5))
            .section(ClassSection::new(SectionId(2), "Y", 5));
        let builder = teach(builder, 1, 1, 1, 1);
        let builder = teach(builder, 1, 2, 3, 1);
        let snapshot = teach(builder, 2, 3, 2, 1)
            .concurrent_set(
                ConcurrentSet::new(SetId(1), "Block 1")
                    .with_sections([SectionId(1), SectionId(2)])
                    .with_subjects([SubjectId(1), SubjectId(3)]),
            )
            .concurrent_set(
                ConcurrentSet::new(SetId(2), "Block 2")
                    .with_sections([SectionId(1), SectionId(2)])
                    .with_subjects([SubjectId(2), SubjectId(3)]),
            )
            .build()
            .unwrap();

        let (outcome, searches) = generate(&snapshot);
        let report = expect_report(outcome);
        assert_eq!(searches, 1);
        assert_eq!(report.mode(), ScanMode::Deep);
        assert_eq!(report.len(), 1);
        assert_eq!(report.findings()[0].kind, FindingKind::Unexplained);
        assert_eq!(report.to_string(), UNEXPLAINED_FAILURE_MESSAGE);
    }

    #[test]
    fn exhausted_time_budget_is_treated_like_infeasibility() {
        let builder = with_subjects(with_teachers(&["Menon"]), 1)
            .section(ClassSection::new(SectionId(1), "8-A", 5));
        let snapshot = teach(builder, 1, 1, 1, 3).build().unwrap();
        let config = EngineConfig::builder()
            .time_limit(Duration::ZERO)
            .build()
            .unwrap();

        let outcome = run(&snapshot, &config, &ProgressReporter::new()).unwrap();
        let report = expect_report(outcome);
        assert_eq!(report.findings()[0].kind, FindingKind::Unexplained);
    }

    #[test]
    fn unassigned_requirements_are_left_out_of_the_schedule() {
        let builder = with_subjects(with_teachers(&["Menon"]), 2)
            .section(ClassSection::new(SectionId(1), "8-A", 5))
            .requirement(SubjectRequirement::new(SectionId(1), SubjectId(2), 4));
        let snapshot = teach(builder, 1, 1, 1, 5).build().unwrap();

        let schedule = expect_schedule(generate(&snapshot).0);
        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule.lesson_count(SectionId(1), SubjectId(2)), 0);
    }

    #[test]
    fn phases_are_reported_in_order() {
        let builder = with_subjects(with_teachers(&["Menon"]), 1)
            .section(ClassSection::new(SectionId(1), "8-A", 5));
        let snapshot = teach(builder, 1, 1, 1, 2).build().unwrap();

        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                phases.lock().unwrap().push(name);
            }
        }));
        run(&snapshot, &EngineConfig::default(), &reporter).unwrap();
        drop(reporter);

        assert_eq!(
            phases.into_inner().unwrap(),
            vec!["Diagnostics", "Model Building", "Search", "Extraction"]
        );
    }

    #[test]
    fn failing_solver_status_leads_to_deep_diagnostics() {
        struct GivesUp;
        impl CpSolver for GivesUp {
            fn solve(&self, _: &CpModel, _: &SolverConfig) -> CpSolution {
                CpSolution::empty(SolverStatus::Unknown)
            }
        }
        let builder = with_subjects(with_teachers(&["Menon"]), 1)
            .section(ClassSection::new(SectionId(1), "8-A", 5));
        let snapshot = teach(builder, 1, 1, 1, 2).build().unwrap();

        let outcome = run_with_solver(
            &snapshot,
            &EngineConfig::default(),
            &ProgressReporter::new(),
            &GivesUp,
        )
        .unwrap();
        assert_eq!(
            expect_report(outcome).findings()[0].kind,
            FindingKind::Unexplained
        );
    }

    #[tokio::test]
    async fn async_entry_point_runs_on_the_blocking_pool() {
        let builder = with_subjects(with_teachers(&["Menon", "Pillai"]), 2)
            .section(ClassSection::new(SectionId(1), "8-A", 5));
        let builder = teach(builder, 1, 1, 1, 3);
        let snapshot = teach(builder, 1, 2, 2, 4).build().unwrap();

        let outcome = run_async(snapshot, EngineConfig::default(), ProgressReporter::new())
            .await
            .unwrap();
        assert_eq!(outcome.schedule().map(Schedule::len), Some(7));
        assert!(outcome.diagnostics().is_none());
    }
}

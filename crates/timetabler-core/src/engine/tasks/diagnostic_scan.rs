use crate::core::models::snapshot::Snapshot;
use crate::core::models::teacher::HumanKey;
use crate::engine::context::GenerationContext;
use crate::engine::diagnostics::{Finding, FindingKind, ScanMode};
use crate::engine::progress::Progress;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

/// Runs every structural check and returns the findings in report order:
/// section overloads, then per-person loads, then set contradictions.
///
/// Deep scans currently run the same checks as pre-solve scans.
#[instrument(skip_all, name = "diagnostic_scan_task", fields(mode = ?mode))]
pub fn run(context: &GenerationContext, mode: ScanMode) -> Vec<Finding> {
    info!("Scanning snapshot for structural contradictions.");
    context.reporter.report(Progress::TaskStart { total_steps: 3 });

    let mut findings = section_overloads(context.snapshot);
    context.reporter.report(Progress::TaskIncrement);
    findings.extend(human_loads(context));
    context.reporter.report(Progress::TaskIncrement);
    findings.extend(set_contradictions(context.snapshot));
    context.reporter.report(Progress::TaskIncrement);

    context.reporter.report(Progress::TaskFinish);
    debug!(findings = findings.len(), "Diagnostic scan complete.");
    findings
}

fn section_overloads(snapshot: &Snapshot) -> Vec<Finding> {
    let mut totals: HashMap<_, u64> = HashMap::new();
    for req in snapshot.requirements() {
        *totals.entry(req.section).or_default() += u64::from(req.periods_per_week);
    }

    snapshot
        .sections()
        .iter()
        .filter_map(|section| {
            let total = totals.get(&section.id).copied().unwrap_or(0);
            let capacity = section.weekly_capacity();
            (total > capacity).then(|| {
                Finding::new(
                    FindingKind::SectionOverload,
                    format!(
                        "SECTION OVERLOAD: {} has {total} periods, but only {capacity} slots available.",
                        section.name
                    ),
                )
            })
        })
        .collect()
}

#[derive(Default)]
struct Load {
    total: u64,
    senior: u64,
}

fn human_loads(context: &GenerationContext) -> Vec<Finding> {
    let snapshot = context.snapshot;
    let config = context.config;

    let mut loads: BTreeMap<&HumanKey, Load> = BTreeMap::new();
    for req in snapshot.requirements() {
        let Some(teacher) = snapshot.assigned_teacher(req.section, req.subject) else {
            continue;
        };
        let load = loads.entry(teacher.human_key()).or_default();
        load.total += u64::from(req.periods_per_week);
        let senior = snapshot
            .section(req.section)
            .is_some_and(|s| s.is_senior(config.senior_periods_per_day));
        if senior {
            load.senior += u64::from(req.periods_per_week);
        }
    }

    let ceiling = config.human_ceiling(snapshot.max_periods_per_day());
    let senior_ceiling = config.senior_ceiling();

    let mut findings = Vec::new();
    for (human, load) in loads {
        if load.total > ceiling {
            findings.push(Finding::new(
                FindingKind::HumanOverload,
                format!(
                    "PHYSICAL IMPOSSIBILITY: {human} assigned {} periods. Max possible is {ceiling}.",
                    load.total
                ),
            ));
        } else if load.senior > senior_ceiling {
            let needed = load.senior - senior_ceiling;
            findings.push(Finding::new(
                FindingKind::SeniorBottleneck,
                format!(
                    "TEACHER BOTTLENECK: {human} has {} senior periods but only {senior_ceiling} slots. \
                     At least {needed} of these periods must be synchronized in a Concurrent Set.",
                    load.senior
                ),
            ));
        }
    }
    findings
}

fn set_contradictions(snapshot: &Snapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    for set in snapshot.concurrent_sets() {
        for &section_id in &set.sections {
            let conflicting: Vec<_> = set
                .subjects
                .iter()
                .filter(|&&subject| snapshot.assigned_teacher(section_id, subject).is_some())
                .collect();
            if conflicting.len() < 2 {
                continue;
            }

            let section = snapshot
                .section(section_id)
                .map_or_else(|| section_id.to_string(), |s| s.name.clone());
            let subjects = conflicting
                .iter()
                .map(|&&id| {
                    snapshot
                        .subject(id)
                        .map_or_else(|| id.to_string(), |s| s.name.clone())
                })
                .join(", ");
            findings.push(Finding::new(
                FindingKind::ConcurrentSetContradiction,
                format!(
                    "SET LOGIC ERROR: Set '{}' forces {section} to attend [{subjects}] at the same time. This is impossible.",
                    set.name
                ),
            ));
        }
    }
    findings
}

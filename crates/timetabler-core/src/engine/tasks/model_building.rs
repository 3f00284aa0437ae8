use crate::core::models::calendar::{Day, WeekGrid};
use crate::core::models::ids::{SectionId, SetId, SubjectId, TeacherId};
use crate::core::models::requirement::SubjectRequirement;
use crate::core::models::teacher::HumanKey;
use crate::engine::context::GenerationContext;
use crate::engine::cp::{CpModel, IntVarId, IntervalVarId};
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use slotmap::SecondaryMap;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// One lesson a section must receive: the `index`-th weekly lesson of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceKey {
    pub section: SectionId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    pub index: u32,
}

/// Occurrences sharing a group key are held in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub set: SetId,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceVars {
    pub start: IntVarId,
    pub interval: IntervalVarId,
}

#[derive(Debug, Clone)]
pub struct ModelBuildResult {
    pub model: CpModel,
    pub grid: WeekGrid,
    pub occurrences: BTreeMap<OccurrenceKey, OccurrenceVars>,
    pub section_intervals: BTreeMap<SectionId, Vec<IntervalVarId>>,
    /// Intervals constrained per person, one representative per concurrent group.
    pub human_intervals: BTreeMap<HumanKey, Vec<IntervalVarId>>,
    pub concurrent_groups: SecondaryMap<IntVarId, GroupKey>,
    /// Requirements with no teacher assigned; they are left out of the model.
    pub skipped: Vec<SubjectRequirement>,
}

#[instrument(skip_all, name = "model_building_task")]
pub fn run(context: &GenerationContext) -> Result<ModelBuildResult, EngineError> {
    let snapshot = context.snapshot;
    let grid = context.grid();
    info!(
        horizon = grid.horizon(),
        requirements = snapshot.requirements().len(),
        "Building constraint model."
    );

    let mut model = CpModel::new("weekly_timetable", grid.horizon());
    let mut occurrences = BTreeMap::new();
    let mut section_intervals: BTreeMap<SectionId, Vec<IntervalVarId>> = BTreeMap::new();
    let mut person_intervals: BTreeMap<HumanKey, Vec<OccurrenceVars>> = BTreeMap::new();
    let mut modeled: Vec<(SubjectRequirement, Vec<IntVarId>)> = Vec::new();
    let mut skipped = Vec::new();

    context.reporter.report(Progress::TaskStart {
        total_steps: snapshot.requirements().len() as u64,
    });
    for req in snapshot.requirements() {
        context.reporter.report(Progress::TaskIncrement);
        let Some(teacher) = snapshot.assigned_teacher(req.section, req.subject) else {
            warn!(
                section = %req.section,
                subject = %req.subject,
                "Requirement has no assigned teacher; leaving it out of the timetable."
            );
            skipped.push(*req);
            continue;
        };
        let section = snapshot.section(req.section).ok_or_else(|| {
            EngineError::Internal(format!("section {} vanished from snapshot", req.section))
        })?;
        let domain = grid.section_slots(section.periods_per_day);

        let mut starts = Vec::with_capacity(req.periods_per_week as usize);
        for index in 0..req.periods_per_week {
            let prefix = format!("L_{}_{}_{}_{index}", req.section, req.subject, teacher.id);
            let start = model.new_int_var(format!("{prefix}_start"), domain.iter().copied());
            let interval = model.new_interval(format!("{prefix}_interval"), start, 1);
            let vars = OccurrenceVars { start, interval };

            occurrences.insert(
                OccurrenceKey {
                    section: req.section,
                    subject: req.subject,
                    teacher: teacher.id,
                    index,
                },
                vars,
            );
            section_intervals.entry(req.section).or_default().push(interval);
            person_intervals
                .entry(teacher.human_key().clone())
                .or_default()
                .push(vars);
            starts.push(start);
        }
        modeled.push((*req, starts));
    }
    context.reporter.report(Progress::TaskFinish);

    for intervals in section_intervals.values() {
        model.add_no_overlap(intervals.clone());
    }

    let concurrent_groups = synchronize_sets(context, &mut model, &occurrences);
    let human_intervals = separate_people(&mut model, person_intervals, &concurrent_groups);
    cap_daily_lessons(context, &mut model, &grid, &modeled);

    model.validate()?;
    debug!(
        int_vars = model.num_int_vars(),
        intervals = model.num_intervals(),
        bool_vars = model.num_bool_vars(),
        constraints = model.constraints().len(),
        skipped = skipped.len(),
        "Constraint model built."
    );

    Ok(ModelBuildResult {
        model,
        grid,
        occurrences,
        section_intervals,
        human_intervals,
        concurrent_groups,
        skipped,
    })
}

/// Forces the `i`-th occurrences of every set member into one slot. A variable
/// reachable from several sets keeps the group of the first set listed.
fn synchronize_sets(
    context: &GenerationContext,
    model: &mut CpModel,
    occurrences: &BTreeMap<OccurrenceKey, OccurrenceVars>,
) -> SecondaryMap<IntVarId, GroupKey> {
    let mut groups_of = SecondaryMap::new();
    for set in context.snapshot.concurrent_sets() {
        let mut groups: BTreeMap<u32, Vec<IntVarId>> = BTreeMap::new();
        for (key, vars) in occurrences {
            if set.contains(key.section, key.subject) {
                groups.entry(key.index).or_default().push(vars.start);
            }
        }
        for (index, vars) in groups {
            if vars.len() > 1 {
                model.add_all_equal(vars.clone());
            }
            let group = GroupKey { set: set.id, index };
            for var in vars {
                if !groups_of.contains_key(var) {
                    groups_of.insert(var, group);
                }
            }
        }
    }
    groups_of
}

fn separate_people(
    model: &mut CpModel,
    person_intervals: BTreeMap<HumanKey, Vec<OccurrenceVars>>,
    concurrent_groups: &SecondaryMap<IntVarId, GroupKey>,
) -> BTreeMap<HumanKey, Vec<IntervalVarId>> {
    person_intervals
        .into_iter()
        .map(|(human, lessons)| {
            let mut handled = HashSet::new();
            let kept: Vec<IntervalVarId> = lessons
                .into_iter()
                .filter(|vars| match concurrent_groups.get(vars.start) {
                    Some(group) => handled.insert(*group),
                    None => true,
                })
                .map(|vars| vars.interval)
                .collect();
            if kept.len() > 1 {
                model.add_no_overlap(kept.clone());
            }
            (human, kept)
        })
        .collect()
}

fn cap_daily_lessons(
    context: &GenerationContext,
    model: &mut CpModel,
    grid: &WeekGrid,
    modeled: &[(SubjectRequirement, Vec<IntVarId>)],
) {
    let cap = i64::from(context.config.max_lessons_per_day);
    for (req, starts) in modeled.iter().filter(|(_, starts)| !starts.is_empty()) {
        for day in Day::ALL {
            let (first, last) = grid.day_bounds(day);
            let literals = starts
                .iter()
                .enumerate()
                .map(|(i, &start)| {
                    let literal = model.new_bool_var(format!(
                        "D_{}_{}_{i}_{}",
                        req.section,
                        req.subject,
                        day.index()
                    ));
                    model.add_reified_in_range(start, first, last, literal);
                    literal
                })
                .collect();
            model.add_linear_at_most(literals, cap);
        }
    }
}

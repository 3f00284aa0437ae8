use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use timetabler::engine::progress::{Progress, ProgressCallback};
use tracing::warn;

const TICK: Duration = Duration::from_millis(80);
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const STEPS_TEMPLATE: &str = "{spinner:.green} {msg:<18} {wide_bar:.cyan/blue} {pos}/{len}";

/// Shows one status line per generation phase on stderr.
///
/// A phase spins until its first task reports a step count, switches to a
/// step bar for that task, and is frozen as `✓ <phase> (<elapsed>)` when it
/// ends. Free-form engine messages are printed above the line.
#[derive(Clone)]
pub struct CliProgressHandler {
    line: Arc<Mutex<PhaseLine>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            line: Arc::new(Mutex::new(PhaseLine::new(target))),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let line = Arc::clone(&self.line);
        Box::new(move |event: Progress| match line.lock() {
            Ok(mut line) => line.apply(event),
            Err(_) => warn!("Progress display lock was poisoned; dropping event."),
        })
    }

    /// Names of the phases that ran to completion, in order.
    pub fn completed_phases(&self) -> Vec<&'static str> {
        self.line
            .lock()
            .map(|line| line.completed.clone())
            .unwrap_or_default()
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

struct PhaseLine {
    bar: ProgressBar,
    current: Option<(&'static str, Instant)>,
    completed: Vec<&'static str>,
}

impl PhaseLine {
    fn new(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target).with_style(style(SPINNER_TEMPLATE));
        Self {
            bar,
            current: None,
            completed: Vec::new(),
        }
    }

    fn apply(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => self.begin(name),
            Progress::PhaseFinish => self.end(),
            Progress::TaskStart { total_steps } => {
                self.bar.set_style(style(STEPS_TEMPLATE));
                self.bar.set_length(total_steps);
                self.bar.set_position(0);
            }
            Progress::TaskIncrement => self.bar.inc(1),
            Progress::TaskFinish => {
                if let Some(total) = self.bar.length() {
                    self.bar.set_position(total);
                }
                self.bar.set_style(style(SPINNER_TEMPLATE));
            }
            Progress::Message(text) => self.bar.println(format!("  · {text}")),
        }
    }

    fn begin(&mut self, name: &'static str) {
        self.bar.reset();
        self.bar.set_style(style(SPINNER_TEMPLATE));
        self.bar.set_message(name);
        self.bar.enable_steady_tick(TICK);
        self.current = Some((name, Instant::now()));
    }

    fn end(&mut self) {
        let Some((name, started)) = self.current.take() else {
            return;
        };
        self.bar.disable_steady_tick();
        self.bar.finish_with_message(format!(
            "✓ {name} ({:.2}s)",
            started.elapsed().as_secs_f64()
        ));
        self.completed.push(name);
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .progress_chars("=> ")
}

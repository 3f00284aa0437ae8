use std::fmt;

pub const UNEXPLAINED_FAILURE_MESSAGE: &str =
    "Unknown logic contradiction. Check Concurrent Sets.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    /// A section needs more lessons than it has slots.
    SectionOverload,
    /// One person is assigned more periods than the week holds.
    HumanOverload,
    /// One person's senior-section load only fits if part of it is synchronized.
    SeniorBottleneck,
    /// A set forces one section into two of its subjects at once.
    ConcurrentSetContradiction,
    /// The search failed and no static check explains why.
    Unexplained,
}

/// When a diagnostic scan runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Before any model is built.
    PreSolve,
    /// After the search failed to find a timetable.
    Deep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// An ordered, non-empty list of findings explaining why no timetable was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    mode: ScanMode,
    findings: Vec<Finding>,
}

impl DiagnosticReport {
    /// Wraps the findings of a scan; `None` when the scan found nothing.
    pub fn new(mode: ScanMode, findings: Vec<Finding>) -> Option<Self> {
        (!findings.is_empty()).then_some(Self { mode, findings })
    }

    /// The report returned when a failed search has no static explanation.
    pub fn unexplained() -> Self {
        Self {
            mode: ScanMode::Deep,
            findings: vec![Finding::new(
                FindingKind::Unexplained,
                UNEXPLAINED_FAILURE_MESSAGE,
            )],
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }

    pub fn count_of(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, finding) in self.findings.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{finding}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DiagnosticReport {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scan_produces_no_report() {
        assert!(DiagnosticReport::new(ScanMode::PreSolve, Vec::new()).is_none());
    }

    #[test]
    fn report_lists_findings_one_per_line() {
        let report = DiagnosticReport::new(
            ScanMode::PreSolve,
            vec![
                Finding::new(FindingKind::SectionOverload, "first"),
                Finding::new(FindingKind::HumanOverload, "second"),
            ],
        )
        .unwrap();
        assert_eq!(report.to_string(), "first\nsecond");
        assert_eq!(report.count_of(FindingKind::HumanOverload), 1);
        assert_eq!(report.mode(), ScanMode::PreSolve);
    }

    #[test]
    fn unexplained_report_carries_the_generic_message() {
        let report = DiagnosticReport::unexplained();
        assert_eq!(report.len(), 1);
        assert_eq!(report.mode(), ScanMode::Deep);
        assert_eq!(report.findings()[0].kind, FindingKind::Unexplained);
        assert_eq!(report.to_string(), UNEXPLAINED_FAILURE_MESSAGE);
    }
}

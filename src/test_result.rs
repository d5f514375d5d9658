use crate::test_id::TestId;

/// The verdict for one test case. Captured output is not kept past evaluation.
pub struct CaseOutcome {
    pub id: TestId,
    pub is_success: bool,
}

impl CaseOutcome {
    pub fn is_success(&self) -> bool {
        self.is_success
    }
}

/// Accumulates outcomes over a run. Replaces a global "had failure" flag.
#[derive(Default)]
pub struct RunSummary {
    outcomes: Vec<CaseOutcome>,
    invalid_cases: usize,
}

impl RunSummary {
    pub fn new() -> RunSummary {
        Self::default()
    }

    pub fn record(&mut self, outcome: CaseOutcome) {
        self.outcomes.push(outcome);
    }

    /// Count cases that could not be built from configuration. Each one fails the run.
    pub fn record_invalid_cases(&mut self, count: usize) {
        self.invalid_cases += count;
    }

    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    pub fn number_of_passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn number_of_failed(&self) -> usize {
        self.outcomes.len() - self.number_of_passed() + self.invalid_cases
    }

    pub fn had_failure(&self) -> bool {
        self.number_of_failed() > 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.had_failure() {
            1
        } else {
            0
        }
    }
}

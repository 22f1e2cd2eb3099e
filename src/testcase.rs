//! Test case definition.
//!
//! A [`TestCase`] is a name plus three ordered step lists, one per
//! [`Stage`]. It is built up front and never mutated once a run starts.

use serde::{Deserialize, Serialize};

use crate::steps::TestStep;

/// One of the three ordered stages of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Prepares the environment.
    Setup,
    /// Exercises the system under test.
    Execution,
    /// Tears down whatever setup created. Always runs.
    Cleanup,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Setup, Stage::Execution, Stage::Cleanup];
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Setup => "Setup",
            Stage::Execution => "Execution",
            Stage::Cleanup => "Cleanup",
        };
        write!(f, "{}", s)
    }
}

/// A named test case with its steps partitioned into stages.
#[derive(Clone, Default)]
pub struct TestCase {
    /// Test case name, used in logs and errors.
    pub name: String,

    /// Free-form description.
    pub description: Option<String>,

    /// Steps run before execution.
    pub setup: Vec<TestStep>,

    /// Steps that exercise the system under test.
    pub execution: Vec<TestStep>,

    /// Steps that always run last.
    pub cleanup: Vec<TestStep>,
}

impl TestCase {
    /// Create an empty test case.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a step to a stage.
    pub fn add_step(&mut self, stage: Stage, step: TestStep) -> &mut Self {
        self.steps_mut(stage).push(step);
        self
    }

    /// Builder form of [`TestCase::add_step`].
    pub fn with_step(mut self, stage: Stage, step: TestStep) -> Self {
        self.add_step(stage, step);
        self
    }

    /// Steps of a stage, in order.
    pub fn steps(&self, stage: Stage) -> &[TestStep] {
        match stage {
            Stage::Setup => &self.setup,
            Stage::Execution => &self.execution,
            Stage::Cleanup => &self.cleanup,
        }
    }

    fn steps_mut(&mut self, stage: Stage) -> &mut Vec<TestStep> {
        match stage {
            Stage::Setup => &mut self.setup,
            Stage::Execution => &mut self.execution,
            Stage::Cleanup => &mut self.cleanup,
        }
    }

    /// Total number of steps across all stages.
    pub fn step_count(&self) -> usize {
        self.setup.len() + self.execution.len() + self.cleanup.len()
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("setup", &self.setup.len())
            .field("execution", &self.execution.len())
            .field("cleanup", &self.cleanup.len())
            .finish()
    }
}

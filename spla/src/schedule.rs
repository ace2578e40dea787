use crate::dispatch::Task;
use crate::error::SplaResult;

/// A sequence of steps executed strictly in order on the single command
/// queue this core models (spec §5). A step never rolls back a prior
/// successful step: `run` keeps executing every queued task and returns
/// one result per step rather than stopping at the first error, matching
/// "tasks in a multi-step schedule do not roll back previously
/// successful steps."
#[derive(Default)]
pub struct Schedule<'a> {
    steps: Vec<Task<'a>>,
}

impl<'a> Schedule<'a> {
    pub fn new() -> Schedule<'a> {
        Schedule { steps: Vec::new() }
    }

    pub fn push(&mut self, task: Task<'a>) {
        self.steps.push(task);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn run(self) -> Vec<SplaResult<()>> {
        self.steps.into_iter().map(Task::run).collect()
    }
}

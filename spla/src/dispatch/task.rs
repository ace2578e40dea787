use spla_types::ElementTypeId;

use crate::dispatch::descriptor::Descriptor;
use crate::error::SplaResult;

/// A unit of work bound to an operation tag, the element type it was
/// dispatched for, and the caller's descriptor (spec §6: "a submit
/// function accepting containers, operators, an optional descriptor, and
/// optionally a task-handle output parameter"). Kernels build a `Task`
/// by capturing a closure over their already-validated arguments; the
/// closure only runs when the task is executed, either immediately by
/// the submitting call or later via a [`crate::schedule::Schedule`].
pub struct Task<'a> {
    pub tag: &'static str,
    pub element_type: ElementTypeId,
    pub descriptor: Descriptor,
    thunk: Box<dyn FnOnce() -> SplaResult<()> + 'a>,
}

impl<'a> Task<'a> {
    pub fn new(
        tag: &'static str,
        element_type: ElementTypeId,
        descriptor: Descriptor,
        thunk: impl FnOnce() -> SplaResult<()> + 'a,
    ) -> Task<'a> {
        Task {
            tag,
            element_type,
            descriptor,
            thunk: Box::new(thunk),
        }
    }

    pub fn run(self) -> SplaResult<()> {
        (self.thunk)()
    }
}

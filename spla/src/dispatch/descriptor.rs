/// Per-call policy hints a caller attaches to a task (spec §6). None of
/// these change the *result*; they steer which registered algorithm
/// `can_execute` accepts and how it traverses its inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Descriptor {
    pub push_only: bool,
    pub pull_only: bool,
    pub push_pull: bool,
    pub front_factor: Option<f32>,
    pub discovered_factor: Option<f32>,
    pub early_exit: bool,
    pub struct_only: bool,
}

impl Descriptor {
    pub fn new() -> Descriptor {
        Descriptor::default()
    }

    pub fn with_early_exit(mut self, early_exit: bool) -> Descriptor {
        self.early_exit = early_exit;
        self
    }

    pub fn with_struct_only(mut self, struct_only: bool) -> Descriptor {
        self.struct_only = struct_only;
        self
    }

    pub fn with_front_factor(mut self, factor: f32) -> Descriptor {
        self.front_factor = Some(factor);
        self
    }
}

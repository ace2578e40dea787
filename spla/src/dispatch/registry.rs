use std::sync::{Mutex, OnceLock};

use hashbrown::HashMap;
use spla_types::ElementTypeId;

use crate::dispatch::descriptor::Descriptor;
use crate::error::{SplaResult, Status};
use crate::library::Library;

pub type CanExecute = fn(&Descriptor) -> bool;

/// One registered implementation of an operation tag (spec §4.4).
/// `can_execute` is a pure predicate over the caller's descriptor;
/// `accelerated` candidates are skipped whenever acceleration is forced
/// off, without needing to ask the predicate at all.
#[derive(Clone, Copy)]
pub struct Candidate {
    pub name: &'static str,
    pub accelerated: bool,
    pub can_execute: CanExecute,
}

/// Registration order is priority order: ties among accepting candidates
/// go to whichever was registered first (spec §4.4).
#[derive(Default)]
pub struct AlgorithmRegistry {
    table: HashMap<(&'static str, ElementTypeId), Vec<Candidate>>,
}

impl AlgorithmRegistry {
    pub fn new() -> AlgorithmRegistry {
        AlgorithmRegistry { table: HashMap::new() }
    }

    pub fn register(&mut self, tag: &'static str, ty: ElementTypeId, candidate: Candidate) {
        self.table.entry((tag, ty)).or_default().push(candidate);
    }

    /// Walks the priority list for `(tag, ty)`, skipping accelerated
    /// candidates when acceleration is forced off, and returns the first
    /// one whose `can_execute` accepts `descriptor`.
    pub fn select(
        &self,
        tag: &'static str,
        ty: ElementTypeId,
        descriptor: &Descriptor,
    ) -> SplaResult<Candidate> {
        let accel_allowed = !Library::is_acceleration_forced_off();
        let list = self.table.get(&(tag, ty)).ok_or(Status::NotImplemented)?;
        list.iter()
            .filter(|c| accel_allowed || !c.accelerated)
            .find(|c| (c.can_execute)(descriptor))
            .copied()
            .ok_or(Status::NotImplemented)
    }
}

static REGISTRY: OnceLock<Mutex<AlgorithmRegistry>> = OnceLock::new();

/// The process-wide registry every kernel module registers its
/// candidates into on first use (spec §5: registry state is process-wide
/// library singleton state).
pub fn global() -> &'static Mutex<AlgorithmRegistry> {
    REGISTRY.get_or_init(|| Mutex::new(AlgorithmRegistry::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: &Descriptor) -> bool {
        true
    }

    fn never(_: &Descriptor) -> bool {
        false
    }

    #[test]
    fn unknown_tag_is_not_implemented() {
        let registry = AlgorithmRegistry::new();
        assert_eq!(
            registry.select("nope", ElementTypeId::I32, &Descriptor::new()),
            Err(Status::NotImplemented)
        );
    }

    #[test]
    fn first_accepting_candidate_in_registration_order_wins() {
        let mut registry = AlgorithmRegistry::new();
        registry.register(
            "op",
            ElementTypeId::I32,
            Candidate { name: "first", accelerated: false, can_execute: never },
        );
        registry.register(
            "op",
            ElementTypeId::I32,
            Candidate { name: "second", accelerated: false, can_execute: always },
        );
        registry.register(
            "op",
            ElementTypeId::I32,
            Candidate { name: "third", accelerated: false, can_execute: always },
        );
        let chosen = registry.select("op", ElementTypeId::I32, &Descriptor::new()).unwrap();
        assert_eq!(chosen.name, "second");
    }

    #[test]
    fn no_candidate_accepts_is_not_implemented() {
        let mut registry = AlgorithmRegistry::new();
        registry.register(
            "op",
            ElementTypeId::I32,
            Candidate { name: "first", accelerated: false, can_execute: never },
        );
        assert_eq!(
            registry.select("op", ElementTypeId::I32, &Descriptor::new()),
            Err(Status::NotImplemented)
        );
    }
}

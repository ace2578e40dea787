use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ahash::AHasher;

use crate::{ElementTypeId, Value};

pub type HostUnaryFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;
pub type HostBinaryFn = Arc<dyn Fn(Value, Value) -> Value + Send + Sync>;
pub type HostSelectFn = Arc<dyn Fn(Value) -> bool + Send + Sync>;

/// `key = hash(name, types, src)`. Two built-ins with the same name and
/// types share a key (they're literally the same object in the catalogue,
/// but independently-constructed equivalents also collide here by design);
/// two user operators with different source fragments never do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpKey(u64);

impl OpKey {
    fn compute(name: &str, types: &[ElementTypeId], src: &str) -> OpKey {
        let mut hasher = AHasher::default();
        name.hash(&mut hasher);
        for t in types {
            t.hash(&mut hasher);
        }
        src.hash(&mut hasher);
        OpKey(hasher.finish())
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// `OpUnary(T_in -> T_out)`.
#[derive(Clone)]
pub struct OpUnary {
    name: Arc<str>,
    t_in: ElementTypeId,
    t_out: ElementTypeId,
    src: Arc<str>,
    host: HostUnaryFn,
    key: OpKey,
}

impl OpUnary {
    pub fn new(
        name: impl Into<Arc<str>>,
        t_in: ElementTypeId,
        t_out: ElementTypeId,
        src: impl Into<Arc<str>>,
        host: HostUnaryFn,
    ) -> OpUnary {
        let name = name.into();
        let src = src.into();
        let key = OpKey::compute(&name, &[t_in, t_out], &src);
        OpUnary {
            name,
            t_in,
            t_out,
            src,
            host,
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn t_in(&self) -> ElementTypeId {
        self.t_in
    }
    pub fn t_out(&self) -> ElementTypeId {
        self.t_out
    }
    pub fn src(&self) -> &str {
        &self.src
    }
    pub fn key(&self) -> OpKey {
        self.key
    }
    pub fn apply(&self, v: Value) -> Value {
        (self.host)(v)
    }
}

impl fmt::Debug for OpUnary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpUnary")
            .field("name", &self.name)
            .field("t_in", &self.t_in)
            .field("t_out", &self.t_out)
            .finish()
    }
}

/// `OpBinary(T_a, T_b -> T_c)`.
#[derive(Clone)]
pub struct OpBinary {
    name: Arc<str>,
    t_a: ElementTypeId,
    t_b: ElementTypeId,
    t_c: ElementTypeId,
    src: Arc<str>,
    host: HostBinaryFn,
    key: OpKey,
}

impl OpBinary {
    pub fn new(
        name: impl Into<Arc<str>>,
        t_a: ElementTypeId,
        t_b: ElementTypeId,
        t_c: ElementTypeId,
        src: impl Into<Arc<str>>,
        host: HostBinaryFn,
    ) -> OpBinary {
        let name = name.into();
        let src = src.into();
        let key = OpKey::compute(&name, &[t_a, t_b, t_c], &src);
        OpBinary {
            name,
            t_a,
            t_b,
            t_c,
            src,
            host,
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn t_a(&self) -> ElementTypeId {
        self.t_a
    }
    pub fn t_b(&self) -> ElementTypeId {
        self.t_b
    }
    pub fn t_c(&self) -> ElementTypeId {
        self.t_c
    }
    pub fn src(&self) -> &str {
        &self.src
    }
    pub fn key(&self) -> OpKey {
        self.key
    }
    pub fn apply(&self, a: Value, b: Value) -> Value {
        (self.host)(a, b)
    }
}

impl fmt::Debug for OpBinary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpBinary")
            .field("name", &self.name)
            .field("t_a", &self.t_a)
            .field("t_b", &self.t_b)
            .field("t_c", &self.t_c)
            .finish()
    }
}

/// `OpSelect(T -> bool)`.
#[derive(Clone)]
pub struct OpSelect {
    name: Arc<str>,
    t_in: ElementTypeId,
    src: Arc<str>,
    host: HostSelectFn,
    key: OpKey,
}

impl OpSelect {
    pub fn new(
        name: impl Into<Arc<str>>,
        t_in: ElementTypeId,
        src: impl Into<Arc<str>>,
        host: HostSelectFn,
    ) -> OpSelect {
        let name = name.into();
        let src = src.into();
        let key = OpKey::compute(&name, &[t_in], &src);
        OpSelect {
            name,
            t_in,
            src,
            host,
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn t_in(&self) -> ElementTypeId {
        self.t_in
    }
    pub fn src(&self) -> &str {
        &self.src
    }
    pub fn key(&self) -> OpKey {
        self.key
    }
    pub fn apply(&self, v: Value) -> bool {
        (self.host)(v)
    }
}

impl fmt::Debug for OpSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpSelect")
            .field("name", &self.name)
            .field("t_in", &self.t_in)
            .finish()
    }
}

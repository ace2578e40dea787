use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ocl::{Context, Device, Program};

use crate::error::AccelError;

/// `(kernel source text, -D defines, element type name, operator source
/// fragments)` — the 4-tuple that keys the program cache (spec §4.3).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramKey {
    pub template_source: Arc<str>,
    pub defines: Vec<Arc<str>>,
    pub type_name: Arc<str>,
    pub op_fragments: Vec<Arc<str>>,
}

impl ProgramKey {
    pub fn new(
        template_source: impl Into<Arc<str>>,
        defines: Vec<Arc<str>>,
        type_name: impl Into<Arc<str>>,
        op_fragments: Vec<Arc<str>>,
    ) -> ProgramKey {
        ProgramKey {
            template_source: template_source.into(),
            defines,
            type_name: type_name.into(),
            op_fragments,
        }
    }

    /// Concatenates the template with the `-D` defines and inlined
    /// operator fragments the way the original assembles kernel text
    /// (design note "Kernel source templating").
    fn assemble(&self) -> String {
        let mut text = String::new();
        for define in &self.defines {
            text.push_str("#define ");
            text.push_str(define);
            text.push('\n');
        }
        text.push_str(&format!("typedef {} T;\n", self.type_name));
        for (i, frag) in self.op_fragments.iter().enumerate() {
            text.push_str(&format!("#define OP_{i}(a, b) ({frag})\n"));
        }
        text.push_str(&self.template_source);
        text
    }
}

enum CacheEntry {
    Built(Program),
    Failed(String),
}

/// Compiles parameterised kernel source exactly once per distinct
/// `ProgramKey`. Build failures are cached too, so a repeated request for
/// the same broken parameterisation fails identically without
/// re-invoking the compiler (spec §4.1's "compilation error at first
/// dispatch").
pub struct ProgramCache {
    context: Context,
    devices: Vec<Device>,
    entries: Mutex<HashMap<ProgramKey, CacheEntry>>,
}

impl ProgramCache {
    pub fn new(context: Context, devices: Vec<Device>) -> ProgramCache {
        ProgramCache {
            context,
            devices,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_build(&self, key: ProgramKey) -> Result<Program, AccelError> {
        {
            let entries = self.entries.lock().expect("program cache poisoned");
            if let Some(entry) = entries.get(&key) {
                return match entry {
                    CacheEntry::Built(program) => Ok(program.clone()),
                    CacheEntry::Failed(message) => {
                        Err(AccelError::CompilationError(message.clone()))
                    }
                };
            }
        }

        log::debug!("program cache miss, compiling {} bytes", key.template_source.len());
        let source = key.assemble();
        let built = Program::builder()
            .devices(self.devices.clone())
            .src(source)
            .build(&self.context);

        let mut entries = self.entries.lock().expect("program cache poisoned");
        match built {
            Ok(program) => {
                entries.insert(key, CacheEntry::Built(program.clone()));
                Ok(program)
            }
            Err(e) => {
                let message = e.to_string();
                entries.insert(key, CacheEntry::Failed(message.clone()));
                Err(AccelError::CompilationError(message))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("program cache poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_defines_type_and_op_fragments() {
        let key = ProgramKey::new(
            "__kernel void k() {}",
            vec![Arc::from("FOO"), Arc::from("BAR=1")],
            "float",
            vec![Arc::from("a + b")],
        );
        let text = key.assemble();
        assert!(text.contains("#define FOO"));
        assert!(text.contains("#define BAR=1"));
        assert!(text.contains("typedef float T;"));
        assert!(text.contains("__kernel void k() {}"));
    }
}

use std::sync::{OnceLock, RwLock};

use crate::error::{Message, MessageCallback, MessageSink, SplaResult, Status};

/// Backend families `set_accelerator` can select (spec §6). This core
/// only ever talks to an OpenCL-shaped device, so `OpenClLike` is the only
/// family that can produce accelerator candidates in the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceleratorFamily {
    None,
    OpenClLike,
}

struct Config {
    accelerator: AcceleratorFamily,
    platform: usize,
    device: usize,
    queues: usize,
    force_no_acceleration: bool,
    finalized: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            accelerator: AcceleratorFamily::None,
            platform: 0,
            device: 0,
            queues: 1,
            force_no_acceleration: false,
            finalized: false,
        }
    }
}

/// Process-wide library state (spec §5): the selected backend/device, the
/// dispatch-affecting `force_no_acceleration` switch, and the message
/// callback. Lazily initialized on first access; `finalize()` is explicit
/// and permanent — every call after it returns `Status::InvalidState`.
pub struct Library {
    config: RwLock<Config>,
    messages: MessageSink,
}

static LIBRARY: OnceLock<Library> = OnceLock::new();

impl Library {
    fn instance() -> &'static Library {
        LIBRARY.get_or_init(|| {
            log::info!("spla library state initialized");
            Library {
                config: RwLock::new(Config::default()),
                messages: MessageSink::default(),
            }
        })
    }

    fn guard() -> SplaResult<std::sync::RwLockReadGuard<'static, Config>> {
        let cfg = Self::instance().config.read().expect("library config poisoned");
        if cfg.finalized {
            return Err(Status::InvalidState.emit());
        }
        Ok(cfg)
    }

    fn guard_mut() -> SplaResult<std::sync::RwLockWriteGuard<'static, Config>> {
        let cfg = Self::instance().config.write().expect("library config poisoned");
        if cfg.finalized {
            return Err(Status::InvalidState.emit());
        }
        Ok(cfg)
    }

    pub fn set_accelerator(family: AcceleratorFamily) -> SplaResult<()> {
        Self::guard_mut()?.accelerator = family;
        log::info!("accelerator family set to {family:?}");
        Ok(())
    }

    pub fn accelerator() -> SplaResult<AcceleratorFamily> {
        Ok(Self::guard()?.accelerator)
    }

    pub fn set_platform(index: usize) -> SplaResult<()> {
        Self::guard_mut()?.platform = index;
        Ok(())
    }

    pub fn set_device(index: usize) -> SplaResult<()> {
        Self::guard_mut()?.device = index;
        Ok(())
    }

    pub fn platform_device() -> SplaResult<(usize, usize)> {
        let cfg = Self::guard()?;
        Ok((cfg.platform, cfg.device))
    }

    pub fn set_queues_count(count: usize) -> SplaResult<()> {
        if count == 0 {
            return Err(Status::InvalidArgument("queue count must be >= 1".into()).emit());
        }
        Self::guard_mut()?.queues = count;
        Ok(())
    }

    pub fn set_message_callback(callback: Option<MessageCallback>) -> SplaResult<()> {
        Self::guard_mut()?;
        Self::instance().messages.set(callback);
        Ok(())
    }

    pub fn emit(message: Message) {
        Self::instance().messages.emit(message);
    }

    pub fn force_no_acceleration(force: bool) -> SplaResult<()> {
        Self::guard_mut()?.force_no_acceleration = force;
        log::info!("force_no_acceleration set to {force}");
        Ok(())
    }

    pub fn is_acceleration_forced_off() -> bool {
        Self::guard()
            .map(|cfg| cfg.force_no_acceleration)
            .unwrap_or(true)
    }

    /// Tears the library down; every call after this returns
    /// `Status::InvalidState` (spec §6).
    pub fn finalize() -> SplaResult<()> {
        let mut cfg = Self::instance().config.write().expect("library config poisoned");
        cfg.finalized = true;
        log::info!("spla library finalized");
        Ok(())
    }
}

/// Convenience used by tests that need a fresh, un-finalized library
/// state between scenarios; not part of the public surface, since there
/// is no public reset operation.
#[cfg(test)]
pub(crate) fn reset_for_test() {
    let lib = Library::instance();
    let mut cfg = lib.config.write().expect("library config poisoned");
    *cfg = Config::default();
    drop(cfg);
    lib.messages.set(None);
}

use std::fmt;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Closed status taxonomy (spec §6). Every fallible library entry point
/// returns one of these rather than an opaque error; `NotImplemented` is
/// reserved for "no registered algorithm accepted this task" and always
/// sorts last among the variants that matter operationally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Status {
    #[error("ok")]
    Ok,
    #[error("error: {0}")]
    Error(String),
    #[error("no acceleration backend is configured")]
    NoAcceleration,
    #[error("platform {0} not found")]
    PlatformNotFound(usize),
    #[error("device {device} not found on platform {platform}")]
    DeviceNotFound { platform: usize, device: usize },
    #[error("invalid library state (library already finalized?)")]
    InvalidState,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no value stored at the requested coordinate")]
    NoValue,
    #[error("kernel compilation failed: {0}")]
    CompilationError(String),
    #[error("no registered algorithm can execute this task")]
    NotImplemented,
}

pub type SplaResult<T> = Result<T, Status>;

impl Status {
    /// Routes this status through the library's message callback (spec
    /// §7: "the message callback is invoked (if set) with a human-readable
    /// description; the numeric status is returned") before it propagates
    /// as an `Err`. Chain at the point an error is constructed:
    /// `return Err(Status::InvalidArgument(msg).emit())`.
    pub(crate) fn emit(self) -> Self {
        emit_message!(self);
        self
    }
}

impl From<spla_accel::AccelError> for Status {
    fn from(e: spla_accel::AccelError) -> Self {
        match e {
            spla_accel::AccelError::NoAcceleration => Status::NoAcceleration,
            spla_accel::AccelError::PlatformNotFound(p) => Status::PlatformNotFound(p),
            spla_accel::AccelError::DeviceNotFound { platform, device } => {
                Status::DeviceNotFound { platform, device }
            }
            spla_accel::AccelError::CompilationError(msg) => Status::CompilationError(msg),
            spla_accel::AccelError::Other(msg) => Status::Error(msg),
        }
    }
}

/// The five fields the original's message callback carries (spec §6, and
/// `include/spla/library.hpp` in the original source); only `status` and
/// `message` are populated by the kernels this core implements, but the
/// shape is kept in full so application callbacks never have to special
/// case a narrower signature.
#[derive(Clone, Debug)]
pub struct Message {
    pub status: Status,
    pub message: String,
    pub file: &'static str,
    pub function: &'static str,
    pub line: u32,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}:{} in {})",
            self.status, self.message, self.file, self.line, self.function
        )
    }
}

pub type MessageCallback = Arc<dyn Fn(&Message) + Send + Sync>;

#[derive(Clone, Default)]
pub struct MessageSink {
    callback: Arc<Mutex<Option<MessageCallback>>>,
}

impl MessageSink {
    pub fn set(&self, callback: Option<MessageCallback>) {
        *self.callback.lock().expect("message sink poisoned") = callback;
    }

    pub fn emit(&self, message: Message) {
        log::debug!("{message}");
        if let Some(callback) = self.callback.lock().expect("message sink poisoned").as_ref() {
            callback(&message);
        }
    }
}

#[macro_export]
macro_rules! emit_message {
    ($status:expr) => {
        $crate::library::Library::emit($crate::error::Message {
            status: $status.clone(),
            message: $status.to_string(),
            file: file!(),
            function: "",
            line: line!(),
        })
    };
}

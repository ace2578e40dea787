use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Mutex;

use ocl::{Buffer, OclPrm, Queue};

use crate::error::AccelError;

/// Allocates device buffers per-operation and hands them back to a free
/// list keyed by `(type, length)` when the scope that borrowed them ends.
/// Mirrors the original's scoped device-buffer acquisition
/// (`src/opencl/cl_accelerator.*`): a [`TempBuffer`] is released on every
/// exit path, success or failure, because `Drop` does the releasing.
///
/// `reset` is called between schedule steps (spec §5's "temporary device
/// buffer pool reset between tasks"), dropping every pooled buffer.
pub struct TempBufferPool {
    queue: Queue,
    free: Mutex<HashMap<(TypeId, usize), Vec<Box<dyn Any + Send>>>>,
}

impl TempBufferPool {
    pub fn new(queue: Queue) -> TempBufferPool {
        TempBufferPool {
            queue,
            free: Mutex::new(HashMap::new()),
        }
    }

    pub fn acquire<T: OclPrm + 'static>(&self, len: usize) -> Result<TempBuffer<'_, T>, AccelError> {
        let key = (TypeId::of::<T>(), len);
        let pooled = {
            let mut free = self.free.lock().expect("temp buffer pool poisoned");
            free.get_mut(&key).and_then(|bufs| bufs.pop())
        };
        let buffer = match pooled {
            Some(boxed) => *boxed
                .downcast::<Buffer<T>>()
                .expect("temp buffer pool key/type mismatch"),
            None => Buffer::<T>::builder()
                .queue(self.queue.clone())
                .len(len)
                .build()
                .map_err(AccelError::from)?,
        };
        Ok(TempBuffer {
            buffer: Some(buffer),
            pool: self,
            len,
        })
    }

    fn release<T: OclPrm + 'static>(&self, len: usize, buffer: Buffer<T>) {
        let key = (TypeId::of::<T>(), len);
        self.free
            .lock()
            .expect("temp buffer pool poisoned")
            .entry(key)
            .or_default()
            .push(Box::new(buffer));
    }

    /// Drop every pooled buffer, reclaiming device memory between
    /// schedule steps.
    pub fn reset(&self) {
        self.free.lock().expect("temp buffer pool poisoned").clear();
    }
}

/// A scoped handle to a pooled device buffer. Returned to the pool's free
/// list on drop rather than deallocated, unless the pool itself has
/// already been torn down.
pub struct TempBuffer<'a, T: OclPrm + 'static> {
    buffer: Option<Buffer<T>>,
    pool: &'a TempBufferPool,
    len: usize,
}

impl<'a, T: OclPrm + 'static> TempBuffer<'a, T> {
    pub fn buffer(&self) -> &Buffer<T> {
        self.buffer.as_ref().expect("temp buffer used after release")
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

impl<'a, T: OclPrm + 'static> Drop for TempBuffer<'a, T> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.release(self.len, buffer);
        }
    }
}

use std::sync::Arc;

use ocl::{Context, Device, Platform, Queue};

use crate::buffer_pool::TempBufferPool;
use crate::device::Vendor;
use crate::error::AccelError;
use crate::program_cache::ProgramCache;

/// Owns the device handle, the single command queue this core uses (spec
/// §5: `set_queues_count` reserves 1), the program cache, and the
/// temporary-buffer pool. One `AccelRuntime` per process, lazily built on
/// first accelerator-dependent call.
pub struct AccelRuntime {
    platform_index: usize,
    device_index: usize,
    device: Device,
    context: Context,
    queue: Queue,
    vendor: Vendor,
    program_cache: ProgramCache,
    temp_buffers: Arc<TempBufferPool>,
}

impl AccelRuntime {
    /// Enumerates platforms/devices and selects `platform_index` /
    /// `device_index` (default 0/0 per spec §4.3).
    pub fn init(platform_index: usize, device_index: usize) -> Result<AccelRuntime, AccelError> {
        let platforms = Platform::list();
        let platform = platforms
            .get(platform_index)
            .copied()
            .ok_or(AccelError::PlatformNotFound(platform_index))?;

        let devices = Device::list_all(platform).map_err(AccelError::from)?;
        let device = devices
            .get(device_index)
            .copied()
            .ok_or(AccelError::DeviceNotFound {
                platform: platform_index,
                device: device_index,
            })?;

        let vendor_string = device.vendor().unwrap_or_default();
        let vendor = Vendor::detect(&vendor_string);
        log::info!(
            "selected accelerator device {} ({vendor_string}, vendor={vendor:?}, wavefront={})",
            device.name().unwrap_or_default(),
            vendor.wavefront_size()
        );

        let context = Context::builder()
            .platform(platform)
            .devices(device)
            .build()
            .map_err(AccelError::from)?;
        let queue = Queue::new(&context, device, None).map_err(AccelError::from)?;

        let program_cache = ProgramCache::new(context.clone(), vec![device]);
        let temp_buffers = Arc::new(TempBufferPool::new(queue.clone()));

        Ok(AccelRuntime {
            platform_index,
            device_index,
            device,
            context,
            queue,
            vendor,
            program_cache,
            temp_buffers,
        })
    }

    pub fn platform_index(&self) -> usize {
        self.platform_index
    }

    pub fn device_index(&self) -> usize {
        self.device_index
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn wavefront_size(&self) -> usize {
        self.vendor.wavefront_size()
    }

    pub fn default_workgroup_size(&self) -> usize {
        self.vendor.default_workgroup_size()
    }

    /// Work-group/thread sizing for a dispatch over `n` items on this
    /// device, using the vendor's default work-group size as the
    /// preferred width (spec §4.3).
    pub fn launch_geometry(&self, n: usize) -> spla_util::LaunchGeometry {
        spla_util::launch_geometry(n, self.default_workgroup_size())
    }

    pub fn program_cache(&self) -> &ProgramCache {
        &self.program_cache
    }

    pub fn temp_buffers(&self) -> &Arc<TempBufferPool> {
        &self.temp_buffers
    }

    /// Blocks until every command previously enqueued on this runtime's
    /// queue has completed (spec §5: every task submission blocks before
    /// the next schedule step begins).
    pub fn finish(&self) -> Result<(), AccelError> {
        self.queue.finish().map_err(AccelError::from)
    }
}

//! The base every handle is built on: a type tag, an owning-device
//! back-reference, and (in debug builds with the `leak-tracking` feature)
//! a process-wide live-object registry used for leak triage.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Discriminant carried by every object's base record.
///
/// Backends switch on this only for diagnostics (log messages, leak
/// reports); dispatch itself goes through the per-object `dyn Trait`, not
/// through a match on `ObjectType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Device,
    Queue,
    CommandPool,
    CommandBuffer,
    Fence,
    Pipeline,
    PipelineLayout,
    ShaderModule,
    Texture,
    Swapchain,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectType::Device => "device",
            ObjectType::Queue => "queue",
            ObjectType::CommandPool => "command_pool",
            ObjectType::CommandBuffer => "command_buffer",
            ObjectType::Fence => "fence",
            ObjectType::Pipeline => "pipeline",
            ObjectType::PipelineLayout => "pipeline_layout",
            ObjectType::ShaderModule => "shader_module",
            ObjectType::Texture => "texture",
            ObjectType::Swapchain => "swapchain",
        };
        f.write_str(s)
    }
}

/// Severity carried alongside every message passed to a [`DebugCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Info,
    Warning,
    Error,
    Fatal,
}

/// Application-supplied diagnostic sink, mirrored by the `log` facade (see
/// the crate's module docs) but preserved as an explicit hook so host
/// applications can route messages into their own UI/telemetry without
/// depending on a particular log backend being installed.
pub trait DebugCallback: Send + Sync {
    fn message(&self, severity: MessageSeverity, text: &str);
}

/// Default sink: every message is forwarded to the `log` facade at the
/// matching level and nowhere else.
pub struct LogDebugCallback;

impl DebugCallback for LogDebugCallback {
    fn message(&self, severity: MessageSeverity, text: &str) {
        match severity {
            MessageSeverity::Info => log::info!("{}", text),
            MessageSeverity::Warning => log::warn!("{}", text),
            MessageSeverity::Error | MessageSeverity::Fatal => log::error!("{}", text),
        }
    }
}

/// Accounting hook mirrored alongside every core object allocation/free.
///
/// Rust objects are always backed by the global allocator (`Arc`/`Box`);
/// this trait does not replace that allocator. It exists so a host
/// application can observe allocation traffic the way the original C ABI's
/// `AllocationCallbacks` let it intercept every allocation directly. See
/// `DESIGN.md` for the Open Question this resolves.
pub trait AllocationCallbacks: Send + Sync {
    fn on_allocate(&self, _size: usize, _ty: ObjectType) {}
    fn on_free(&self, _size: usize, _ty: ObjectType) {}
}

/// Default hook: accounting is a no-op.
pub struct NullAllocationCallbacks;
impl AllocationCallbacks for NullAllocationCallbacks {}

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide live-object registry, gated behind the `leak-tracking`
/// feature. Disabled by default: the registry is a debug aid, not part of
/// the steady-state hot path.
#[cfg(feature = "leak-tracking")]
pub mod registry {
    use super::ObjectType;
    use std::collections::HashMap;
    use std::sync::Mutex;

    static LIVE: Mutex<Option<HashMap<u64, ObjectType>>> = Mutex::new(None);

    pub(crate) fn track(id: u64, ty: ObjectType) {
        let mut guard = LIVE.lock().unwrap();
        guard.get_or_insert_with(HashMap::new).insert(id, ty);
    }

    pub(crate) fn untrack(id: u64) {
        let mut guard = LIVE.lock().unwrap();
        if let Some(map) = guard.as_mut() {
            map.remove(&id);
        }
    }

    /// Returns a snapshot of every object believed to still be live, for
    /// leak reporting at shutdown.
    pub fn report_live_objects() -> Vec<(u64, ObjectType)> {
        let guard = LIVE.lock().unwrap();
        guard
            .as_ref()
            .map(|m| m.iter().map(|(k, v)| (*k, *v)).collect())
            .unwrap_or_default()
    }
}

#[cfg(not(feature = "leak-tracking"))]
pub mod registry {
    use super::ObjectType;

    pub(crate) fn track(_id: u64, _ty: ObjectType) {}
    pub(crate) fn untrack(_id: u64) {}

    /// Always empty when the `leak-tracking` feature is disabled.
    pub fn report_live_objects() -> Vec<(u64, ObjectType)> {
        Vec::new()
    }
}

/// The fixed header shared by every RHI object.
pub struct ObjectBase {
    pub id: u64,
    pub ty: ObjectType,
}

impl ObjectBase {
    pub fn new(ty: ObjectType) -> Self {
        let id = NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed);
        registry::track(id, ty);
        ObjectBase { id, ty }
    }
}

impl Drop for ObjectBase {
    fn drop(&mut self) {
        registry::untrack(self.id);
    }
}

/// Shared owning handle to a device's ambient diagnostic/allocation hooks.
/// Every subordinate object holds a clone of this so it can emit messages
/// and accounting calls without walking back through the device.
#[derive(Clone)]
pub struct Diagnostics {
    pub debug_callback: Arc<dyn DebugCallback>,
    pub allocation_callback: Arc<dyn AllocationCallbacks>,
}

impl Diagnostics {
    pub fn message(&self, severity: MessageSeverity, text: impl AsRef<str>) {
        self.debug_callback.message(severity, text.as_ref());
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            debug_callback: Arc::new(LogDebugCallback),
            allocation_callback: Arc::new(NullAllocationCallbacks),
        }
    }
}

/// Dumps every object the live-object registry believes is still
/// allocated. A no-op snapshot (always empty) unless the `leak-tracking`
/// feature is enabled.
pub fn report_live_objects() -> Vec<(u64, ObjectType)> {
    registry::report_live_objects()
}

//! Memory Instrumentation
//!
//! Two independent sources of memory readings for the measurement harness:
//!
//! - **Resident set size**: an [`RssProbe`] reports the OS view of the
//!   process. On Linux this reads `VmRSS` from `/proc/self/status`; elsewhere
//!   no probe is available and RSS fields stay `None`.
//! - **Allocation tracking**: [`TrackingAllocator`] wraps the system
//!   allocator and keeps live and peak byte counts. It only reports anything
//!   when a binary installs it:
//!
//!   ```ignore
//!   #[global_allocator]
//!   static GLOBAL: sorting_lab::memory::TrackingAllocator = sorting_lab::memory::TrackingAllocator;
//!   ```
//!
//! The allocation counters are process-wide. Two measurements running at the
//! same time on different threads see each other's allocations.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Bytes per mebibyte, the unit of every reported memory figure.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Source of resident-set-size readings for the current process.
pub trait RssProbe: Send + Sync {
    /// Current resident set size in bytes, or `None` if it cannot be read.
    fn resident_bytes(&self) -> Option<u64>;
}

/// Reads `VmRSS` from `/proc/self/status`.
///
/// The read goes through a stack buffer and never allocates, so sampling
/// during a measurement does not show up in the allocation peak.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcStatusProbe;

/// `VmRSS` sits in the first kilobyte or two of the status file.
#[cfg(target_os = "linux")]
const STATUS_BUF_LEN: usize = 4096;

impl RssProbe for ProcStatusProbe {
    #[cfg(target_os = "linux")]
    fn resident_bytes(&self) -> Option<u64> {
        use std::io::Read;

        let mut file = std::fs::File::open("/proc/self/status").ok()?;
        let mut buf = [0u8; STATUS_BUF_LEN];
        let mut len = 0;
        while len < buf.len() {
            match file.read(&mut buf[len..]) {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => return None,
            }
        }
        let status = match std::str::from_utf8(&buf[..len]) {
            Ok(s) => s,
            // A truncated read may split a multi-byte character at the end.
            Err(e) => std::str::from_utf8(&buf[..e.valid_up_to()]).ok()?,
        };
        parse_vm_rss(status)
    }

    #[cfg(not(target_os = "linux"))]
    fn resident_bytes(&self) -> Option<u64> {
        None
    }
}

/// Extract the `VmRSS` line (reported in kB) from a `/proc/<pid>/status` dump.
pub fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line
        .trim_start_matches("VmRSS:")
        .trim()
        .trim_end_matches("kB")
        .trim()
        .parse()
        .ok()?;
    Some(kb * 1024)
}

/// The platform RSS probe, if it produces readings on this system.
pub fn rss_probe() -> Option<Arc<dyn RssProbe>> {
    let probe = ProcStatusProbe;
    match probe.resident_bytes() {
        Some(_) => Some(Arc::new(probe)),
        None => {
            log::debug!("resident set size is not available on this platform");
            None
        }
    }
}

static CURRENT_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_BYTES: AtomicUsize = AtomicUsize::new(0);
static TRACING: AtomicBool = AtomicBool::new(false);
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Global allocator that counts live and peak bytes on top of [`System`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingAllocator;

#[inline]
fn on_alloc(size: usize) {
    INSTALLED.store(true, Ordering::Relaxed);
    let now = CURRENT_BYTES.fetch_add(size, Ordering::Relaxed) + size;
    PEAK_BYTES.fetch_max(now, Ordering::Relaxed);
}

#[inline]
fn on_dealloc(size: usize) {
    CURRENT_BYTES.fetch_sub(size, Ordering::Relaxed);
}

// SAFETY: every call is forwarded unchanged to `System`; the wrapper only
// updates atomic counters and never allocates itself.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        on_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                on_alloc(new_size - layout.size());
            } else {
                on_dealloc(layout.size() - new_size);
            }
        }
        new_ptr
    }
}

/// Process-wide view of the counters kept by [`TrackingAllocator`].
///
/// The allocator counts unconditionally; "tracing" marks that some caller
/// owns the peak window, so nested users know not to stop it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationTracer;

impl AllocationTracer {
    /// Whether [`TrackingAllocator`] is the global allocator of this process.
    pub fn is_installed() -> bool {
        INSTALLED.load(Ordering::Relaxed)
    }

    pub fn is_tracing() -> bool {
        TRACING.load(Ordering::Acquire)
    }

    /// Begin a tracing window and reset the peak to the current usage.
    pub fn start() {
        TRACING.store(true, Ordering::Release);
        Self::reset_peak();
    }

    pub fn stop() {
        TRACING.store(false, Ordering::Release);
    }

    /// Forget the recorded peak; it restarts from the current usage.
    pub fn reset_peak() {
        PEAK_BYTES.store(CURRENT_BYTES.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Live and peak allocated bytes.
    pub fn traced_memory() -> (usize, usize) {
        let current = CURRENT_BYTES.load(Ordering::Relaxed);
        let peak = PEAK_BYTES.load(Ordering::Relaxed);
        (current, peak.max(current))
    }
}

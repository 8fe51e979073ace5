//! Host-side stand-ins for PHY hardware and platform services.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use core::time::Duration;

use spin::Mutex;

use crate::Mmio;
use crate::consts::WINDOW_SIZE;
use crate::osal::{ClockOp, GpioOp, Kernel, Platform, ResetOp};

/// Heap memory standing in for `phys` PHY register windows.
pub struct FakeWindow {
    ptr: NonNull<u32>,
    words: usize,
}

unsafe impl Send for FakeWindow {}
unsafe impl Sync for FakeWindow {}

impl FakeWindow {
    pub fn new(phys: usize) -> Self {
        let words = phys * WINDOW_SIZE / 4;
        let mem = vec![0u32; words].into_boxed_slice();
        let ptr = NonNull::new(Box::into_raw(mem) as *mut u32).unwrap();
        Self { ptr, words }
    }

    pub fn mmio(&self) -> Mmio {
        self.ptr.cast()
    }

    pub fn len(&self) -> usize {
        self.words * 4
    }

    pub fn read(&self, offset: usize) -> u32 {
        assert!(offset / 4 < self.words);
        unsafe { self.ptr.as_ptr().add(offset / 4).read_volatile() }
    }

    pub fn write(&self, offset: usize, value: u32) {
        assert!(offset / 4 < self.words);
        unsafe { self.ptr.as_ptr().add(offset / 4).write_volatile(value) }
    }
}

impl Drop for FakeWindow {
    fn drop(&mut self) {
        let slice = core::ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.words);
        drop(unsafe { Box::from_raw(slice) });
    }
}

/// Kernel that records delays and maps the CBUS gate onto heap memory.
///
/// Each delay also samples the word at the watched address, if any.
pub struct MockKernel {
    pub cbus: FakeWindow,
    delays: Mutex<Vec<(Duration, Option<u32>)>>,
    watch: Mutex<Option<usize>>,
    iomap_calls: AtomicUsize,
    iomap_fail: AtomicBool,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            cbus: FakeWindow::new(1),
            delays: Mutex::new(Vec::new()),
            watch: Mutex::new(None),
            iomap_calls: AtomicUsize::new(0),
            iomap_fail: AtomicBool::new(false),
        }
    }

    pub fn fail_iomap(&self) {
        self.iomap_fail.store(true, Ordering::SeqCst);
    }

    pub fn iomap_calls(&self) -> usize {
        self.iomap_calls.load(Ordering::SeqCst)
    }

    pub fn watch(&self, addr: usize) {
        *self.watch.lock() = Some(addr);
    }

    pub fn delays(&self) -> Vec<(Duration, Option<u32>)> {
        self.delays.lock().clone()
    }
}

impl Kernel for MockKernel {
    fn delay(&self, duration: Duration) {
        let sample = self
            .watch
            .lock()
            .map(|addr| unsafe { (addr as *const u32).read_volatile() });
        self.delays.lock().push((duration, sample));
    }

    fn iomap(&self, _paddr: usize, size: usize) -> Option<Mmio> {
        self.iomap_calls.fetch_add(1, Ordering::SeqCst);
        if self.iomap_fail.load(Ordering::SeqCst) || size > self.cbus.len() {
            return None;
        }
        Some(self.cbus.mmio())
    }
}

#[derive(Default)]
pub struct MockReset {
    pub events: Mutex<Vec<&'static str>>,
}

impl ResetOp for MockReset {
    fn reset_assert(&self) {
        self.events.lock().push("assert");
    }

    fn reset_deassert(&self) {
        self.events.lock().push("deassert");
    }
}

#[derive(Default)]
pub struct MockClock {
    pub enabled: AtomicBool,
    pub enables: AtomicUsize,
}

impl ClockOp for MockClock {
    fn enable(&self) {
        self.enables.fetch_add(1, Ordering::SeqCst);
        self.enabled.store(true, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }
}

/// GPIO whose level is observable after it has been handed to the driver.
pub struct MockGpio {
    pub level: Arc<Mutex<Option<bool>>>,
}

impl GpioOp for MockGpio {
    fn set_value(&self, high: bool) {
        *self.level.lock() = Some(high);
    }
}

/// Platform handing out mock resources. Clear a field to make it missing.
pub struct MockPlatform {
    pub window: Option<FakeWindow>,
    pub reset: Option<Arc<MockReset>>,
    pub clock: Option<Arc<MockClock>>,
    pub gpio_level: Option<Arc<Mutex<Option<bool>>>>,
    pub gpio_requests: Vec<String>,
}

impl MockPlatform {
    pub fn new(phys: usize) -> Self {
        Self {
            window: Some(FakeWindow::new(phys)),
            reset: Some(Arc::new(MockReset::default())),
            clock: Some(Arc::new(MockClock::default())),
            gpio_level: Some(Arc::new(Mutex::new(None))),
            gpio_requests: Vec::new(),
        }
    }

    pub fn window(&self) -> &FakeWindow {
        self.window.as_ref().unwrap()
    }
}

impl Platform for MockPlatform {
    fn map_registers(&mut self) -> Option<(Mmio, usize)> {
        self.window.as_ref().map(|w| (w.mmio(), w.len()))
    }

    fn reset_control(&mut self) -> Option<Arc<dyn ResetOp>> {
        self.reset.clone().map(|r| r as Arc<dyn ResetOp>)
    }

    fn clock(&mut self) -> Option<Arc<dyn ClockOp>> {
        self.clock.clone().map(|c| c as Arc<dyn ClockOp>)
    }

    fn gpio(&mut self, name: &str) -> Option<Box<dyn GpioOp>> {
        self.gpio_requests.push(name.to_string());
        self.gpio_level
            .clone()
            .map(|level| Box::new(MockGpio { level }) as Box<dyn GpioOp>)
    }
}

/// Shared helpers for unit tests: mock contexts and a capturing logger

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{ContextConfig, ContextRef, GraphicsContext};
use crate::graphics_device::DeviceLimits;
use crate::graphics_device::mock_graphics_device::{MockGraphicsDevice, MockDeviceState};
use crate::log::{Logger, LogEntry, LogSeverity};

/// Logger keeping every entry in memory
#[derive(Clone, Default)]
pub struct CapturingLogger {
    entries: Rc<RefCell<Vec<LogEntry>>>,
}

impl CapturingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Entries at exactly `severity`
    pub fn count(&self, severity: LogSeverity) -> usize {
        self.entries.borrow().iter().filter(|e| e.severity == severity).count()
    }
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.borrow_mut().push(entry.clone());
    }
}

fn quiet_config() -> ContextConfig {
    ContextConfig {
        debug_name: "test".to_string(),
        min_severity: LogSeverity::Trace,
        ..ContextConfig::default()
    }
}

/// Context over a mock device with default limits
pub fn mock_context() -> (ContextRef, Rc<RefCell<MockDeviceState>>) {
    mock_context_with_limits(DeviceLimits::default())
}

/// Context over a mock device reporting `limits`
pub fn mock_context_with_limits(limits: DeviceLimits) -> (ContextRef, Rc<RefCell<MockDeviceState>>) {
    let device = MockGraphicsDevice::with_limits(limits);
    let state = device.state();
    let ctx = GraphicsContext::with_logger(
        Box::new(device),
        Box::new(CapturingLogger::new()),
        quiet_config(),
    )
    .unwrap();
    (ctx, state)
}

/// Context over a mock device logging into `logger`
///
/// The creation line is dropped so `logger` starts empty.
pub fn mock_context_with_logger(
    logger: CapturingLogger,
    min_severity: LogSeverity,
) -> (ContextRef, Rc<RefCell<MockDeviceState>>) {
    let device = MockGraphicsDevice::new();
    let state = device.state();
    let config = ContextConfig {
        min_severity,
        ..quiet_config()
    };
    let ctx = GraphicsContext::with_logger(Box::new(device), Box::new(logger.clone()), config).unwrap();
    logger.clear();
    (ctx, state)
}

/// Small limits that make segmentation and chunking easy to observe
pub fn small_limits() -> DeviceLimits {
    DeviceLimits {
        max_storage_block_size: 64,
        max_storage_buffer_bindings: 4,
        max_work_group_count: 10,
    }
}

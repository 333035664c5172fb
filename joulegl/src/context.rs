/// GraphicsContext - device, limits and logger shared by every JouleGL object
///
/// A context is created once per OpenGL context and handed to buffers,
/// handlers and programs as a `ContextRef`. The device is only reachable
/// through `device()`, which fails instead of panicking if it is already
/// borrowed. Objects holding a `ContextRef` are not `Send`: OpenGL state is
/// bound to the thread its context is current on.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, DeviceLimits};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

/// Shared handle on a graphics context
pub type ContextRef = Rc<GraphicsContext>;

// ===== CONFIGURATION =====

/// Context configuration
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Name used in the creation log line
    pub debug_name: String,
    /// Entries below this severity are dropped before reaching the logger
    pub min_severity: LogSeverity,
    /// Replaces the queried maximum storage block size (bytes)
    pub max_storage_block_size: Option<usize>,
    /// Replaces the queried number of bindable storage buffers
    pub max_storage_buffer_bindings: Option<usize>,
    /// Replaces the queried maximum work group count on x
    pub max_work_group_count: Option<usize>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            debug_name: "joulegl".to_string(),
            min_severity: if cfg!(debug_assertions) {
                LogSeverity::Debug
            } else {
                LogSeverity::Info
            },
            max_storage_block_size: None,
            max_storage_buffer_bindings: None,
            max_work_group_count: None,
        }
    }
}

// ===== CONTEXT =====

/// Device, limits and logger of one OpenGL context
pub struct GraphicsContext {
    device: RefCell<Box<dyn GraphicsDevice>>,
    limits: DeviceLimits,
    logger: Box<dyn Logger>,
    config: ContextConfig,
}

impl GraphicsContext {
    /// Create a context logging to the console
    pub fn new(device: Box<dyn GraphicsDevice>, config: ContextConfig) -> Result<ContextRef> {
        Self::with_logger(device, Box::new(DefaultLogger), config)
    }

    /// Create a context with a custom logger
    ///
    /// Device limits are queried once here, then replaced by any override
    /// present in `config`.
    pub fn with_logger(
        mut device: Box<dyn GraphicsDevice>,
        logger: Box<dyn Logger>,
        config: ContextConfig,
    ) -> Result<ContextRef> {
        let queried = device.query_limits();
        let limits = DeviceLimits {
            max_storage_block_size: config.max_storage_block_size
                .unwrap_or(queried.max_storage_block_size),
            max_storage_buffer_bindings: config.max_storage_buffer_bindings
                .unwrap_or(queried.max_storage_buffer_bindings),
            max_work_group_count: config.max_work_group_count
                .unwrap_or(queried.max_work_group_count),
        };

        let ctx = Self {
            device: RefCell::new(device),
            limits,
            logger,
            config,
        };

        if limits.max_storage_block_size == 0
            || limits.max_storage_buffer_bindings == 0
            || limits.max_work_group_count == 0
        {
            crate::gl_bail!(ctx, "joulegl::GraphicsContext", Error::BackendError(format!(
                "invalid device limits {:?}", limits
            )));
        }

        crate::gl_info!(
            ctx,
            "joulegl::GraphicsContext",
            "Context '{}' created: storage block {} bytes, {} storage bindings, {} work groups",
            ctx.config.debug_name,
            limits.max_storage_block_size,
            limits.max_storage_buffer_bindings,
            limits.max_work_group_count
        );

        Ok(Rc::new(ctx))
    }

    /// Limits in effect for this context
    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Borrow the device for a sequence of driver calls
    ///
    /// The borrow must be released before calling into another JouleGL
    /// object that uses the same context.
    pub fn device(&self) -> Result<RefMut<'_, Box<dyn GraphicsDevice>>> {
        self.device.try_borrow_mut().map_err(|_| {
            Error::BackendError("graphics device is already borrowed".to_string())
        })
    }

    // ===== LOGGING =====

    /// Log a message (used by the gl_* macros)
    pub fn log(&self, severity: LogSeverity, source: &str, message: String) {
        if severity < self.config.min_severity {
            return;
        }
        self.logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Log a message with file:line information (used by gl_error! and gl_err!)
    pub fn log_detailed(
        &self,
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if severity < self.config.min_severity {
            return;
        }
        self.logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

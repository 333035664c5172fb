/// ShaderSet - a program bound to a data handler and an execution
///
/// `use_set` activates the program, binds the handler and executes:
/// - Default handler: once, with `element_count(0)`
/// - Overflowing handler: once per active segment `i` of its first overflow
///   buffer, with `element_count(i)`
///
/// Several sets may share one handler.

use std::cell::RefCell;
use std::rc::Rc;

use crate::buffer::BindMode;
use crate::context::ContextRef;
use crate::data_handler::DataHandler;
use crate::error::{Error, Result};
use crate::shader::{ProgramKind, ShaderConfig, SharedProgram};
use crate::shader_set::DrawFunction;
use crate::{gl_bail, gl_trace};

const SOURCE: &str = "joulegl::ShaderSet";

pub type SharedHandler = Rc<RefCell<DataHandler>>;

/// Element count of segment `i` (always 0 for default handlers)
pub type ElementCount = Box<dyn Fn(usize) -> usize>;

/// What a set does once its data is bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Execution {
    /// Render program: issue a draw call
    Draw(DrawFunction),
    /// Compute program: dispatch one work group per element
    Compute { barrier: bool },
}

pub struct ShaderSet {
    ctx: ContextRef,
    program: SharedProgram,
    handler: SharedHandler,
    execution: Execution,
    element_count: ElementCount,
}

impl ShaderSet {
    /// Fails with `InvalidShaderSetting` when the execution does not match
    /// the program kind
    pub fn new(
        ctx: &ContextRef,
        program: SharedProgram,
        handler: SharedHandler,
        execution: Execution,
        element_count: impl Fn(usize) -> usize + 'static,
    ) -> Result<Self> {
        let kind = program.borrow().kind();
        let expected = match execution {
            Execution::Draw(_) => ProgramKind::Render,
            Execution::Compute { .. } => ProgramKind::Compute,
        };
        if kind != expected {
            gl_bail!(ctx, SOURCE, Error::InvalidShaderSetting(format!(
                "program '{}' is a {:?} program, execution needs {:?}",
                program.borrow().name(), kind, expected
            )));
        }

        Ok(Self {
            ctx: ContextRef::clone(ctx),
            program,
            handler,
            execution,
            element_count: Box::new(element_count),
        })
    }

    pub fn program(&self) -> &SharedProgram { &self.program }

    pub fn handler(&self) -> &SharedHandler { &self.handler }

    pub fn execution(&self) -> Execution { self.execution }

    /// Forward the config entries meant for this set's program
    pub fn set_from_config(&self, config: &ShaderConfig) -> Result<()> {
        self.program.borrow_mut().set_from_config(config)
    }

    /// Activate, bind and execute (once per segment for overflowing handlers)
    pub fn use_set(&self, mode: BindMode) -> Result<()> {
        self.program.borrow().use_program()?;

        let mut handler = self.handler.borrow_mut();
        match &mut *handler {
            DataHandler::Default(default) => {
                default.bind(mode)?;
                self.execute((self.element_count)(0))
            }
            DataHandler::Overflowing(overflowing) => {
                let segments = overflowing.active_segments()?;
                gl_trace!(self.ctx, SOURCE, "Running '{}' over {} segment(s)", self.program.borrow().name(), segments);
                for segment in 0..segments {
                    overflowing.set_buffer(segment);
                    overflowing.bind(mode)?;
                    self.execute((self.element_count)(segment))?;
                }
                Ok(())
            }
        }
    }

    /// Activate and bind a single segment without executing
    pub fn use_segment(&self, segment: usize, mode: BindMode) -> Result<()> {
        let mut handler = self.handler.borrow_mut();
        match &mut *handler {
            DataHandler::Default(_) => {
                gl_bail!(self.ctx, SOURCE, Error::UnsupportedHandlerType(
                    "Default handlers have no segments".to_string()
                ));
            }
            DataHandler::Overflowing(overflowing) => {
                self.program.borrow().use_program()?;
                overflowing.set_buffer(segment);
                overflowing.bind(mode)
            }
        }
    }

    fn execute(&self, count: usize) -> Result<()> {
        match self.execution {
            Execution::Draw(draw) => draw.execute(&self.ctx, count),
            Execution::Compute { barrier } => self.program.borrow_mut().compute(count, barrier),
        }
    }
}

#[cfg(test)]
#[path = "shader_set_tests.rs"]
mod tests;

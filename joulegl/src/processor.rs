/// Processor - named programs and shader sets run against a config
///
/// Programs are built from `ShaderSetting`s (through the optional parser)
/// and referenced by id when creating sets. `run` forwards the config to a
/// set's program, then uses the set.

use std::path::PathBuf;
use rustc_hash::FxHashMap;

use crate::buffer::BindMode;
use crate::context::ContextRef;
use crate::error::{Error, Result};
use crate::shader::{ShaderConfig, ShaderHandler, ShaderParser, ShaderSetting, SharedProgram};
use crate::shader_set::{Execution, ShaderSet, SharedHandler};
use crate::{gl_bail, gl_debug, gl_warn};

const SOURCE: &str = "joulegl::Processor";

pub struct Processor {
    ctx: ContextRef,
    shaders: ShaderHandler,
    parser: Option<ShaderParser>,
    programs: FxHashMap<String, SharedProgram>,
    sets: FxHashMap<String, ShaderSet>,
}

impl Processor {
    /// Processor reading shader sources from `shader_directory`
    pub fn new(ctx: &ContextRef, shader_directory: impl Into<PathBuf>) -> Self {
        Self {
            ctx: ContextRef::clone(ctx),
            shaders: ShaderHandler::new(ctx, shader_directory),
            parser: None,
            programs: FxHashMap::default(),
            sets: FxHashMap::default(),
        }
    }

    /// Run every source read afterwards through `parser`
    pub fn with_parser(mut self, parser: ShaderParser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn parser_mut(&mut self) -> Option<&mut ShaderParser> {
        self.parser.as_mut()
    }

    /// Build (or fetch from the handler cache) every program in `settings`
    pub fn set_shaders(&mut self, settings: &[ShaderSetting]) -> Result<()> {
        for setting in settings {
            let program = self.shaders.create(setting, self.parser.as_ref())?;
            self.programs.insert(setting.id.clone(), program);
        }
        Ok(())
    }

    pub fn program(&self, id: &str) -> Option<SharedProgram> {
        self.programs.get(id).cloned()
    }

    pub fn set(&self, name: &str) -> Option<&ShaderSet> {
        self.sets.get(name)
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(|name| name.as_str())
    }

    /// Register a set named `name` running program `program_id`
    ///
    /// A set already registered under `name` is replaced.
    pub fn create_set(
        &mut self,
        name: impl Into<String>,
        program_id: &str,
        handler: SharedHandler,
        execution: Execution,
        element_count: impl Fn(usize) -> usize + 'static,
    ) -> Result<()> {
        let name = name.into();
        let program = match self.programs.get(program_id) {
            Some(program) => SharedProgram::clone(program),
            None => gl_bail!(self.ctx, SOURCE, Error::InvalidResource(format!(
                "set '{}' needs unknown program '{}'", name, program_id
            ))),
        };

        let set = ShaderSet::new(&self.ctx, program, handler, execution, element_count)?;
        if self.sets.insert(name.clone(), set).is_some() {
            gl_warn!(self.ctx, SOURCE, "Shader set '{}' replaced", name);
        } else {
            gl_debug!(self.ctx, SOURCE, "Shader set '{}' created with program '{}'", name, program_id);
        }
        Ok(())
    }

    /// Apply `config` to the set's program, then use the set
    pub fn run(&self, name: &str, config: &ShaderConfig, mode: BindMode) -> Result<()> {
        let Some(set) = self.sets.get(name) else {
            gl_bail!(self.ctx, SOURCE, Error::InvalidResource(format!("unknown shader set '{}'", name)));
        };
        set.set_from_config(config)?;
        set.use_set(mode)
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;

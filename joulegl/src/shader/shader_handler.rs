/// ShaderHandler - builds programs from source files and keeps them by id
///
/// Sources are read from one shader directory, optionally run through a
/// `ShaderParser`. A second `create` for a known id returns the existing
/// program without touching the files.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use rustc_hash::FxHashMap;

use crate::context::ContextRef;
use crate::error::{Error, Result};
use crate::graphics_device::ShaderSource;
use crate::shader::{ShaderParser, ShaderProgram, ShaderSetting};
use crate::{gl_debug, gl_err, gl_warn};

const SOURCE: &str = "joulegl::ShaderHandler";

pub type SharedProgram = Rc<RefCell<ShaderProgram>>;

pub struct ShaderHandler {
    ctx: ContextRef,
    directory: PathBuf,
    programs: FxHashMap<String, SharedProgram>,
}

impl ShaderHandler {
    /// Handler reading from `directory`
    ///
    /// If `directory` does not exist but a `shader` directory next to it
    /// does, that one is used instead.
    pub fn new(ctx: &ContextRef, directory: impl Into<PathBuf>) -> Self {
        let mut directory = directory.into();
        if !directory.is_dir() {
            let fallback = directory.parent().unwrap_or(Path::new(".")).join("shader");
            if fallback.is_dir() {
                gl_warn!(ctx, SOURCE, "Shader directory {:?} not found, using {:?}", directory, fallback);
                directory = fallback;
            }
        }

        Self {
            ctx: ContextRef::clone(ctx),
            directory,
            programs: FxHashMap::default(),
        }
    }

    pub fn directory(&self) -> &Path { &self.directory }

    pub fn get(&self, id: &str) -> Option<SharedProgram> {
        self.programs.get(id).cloned()
    }

    pub fn len(&self) -> usize { self.programs.len() }

    pub fn is_empty(&self) -> bool { self.programs.is_empty() }

    /// Build the program described by `setting`, or return the cached one
    pub fn create(&mut self, setting: &ShaderSetting, parser: Option<&ShaderParser>) -> Result<SharedProgram> {
        if let Some(program) = self.programs.get(&setting.id) {
            return Ok(Rc::clone(program));
        }

        let mut codes = Vec::with_capacity(setting.stages.len());
        for (_, path) in &setting.stages {
            codes.push(self.read_source(path, parser)?);
        }
        let sources: Vec<ShaderSource<'_>> = setting.stages.iter()
            .zip(codes.iter())
            .map(|((stage, _), code)| ShaderSource::new(*stage, code))
            .collect();

        let mut program = ShaderProgram::from_sources(&self.ctx, setting.id.as_str(), setting.kind, &sources)?;
        let labels: Vec<&str> = setting.uniform_labels.iter().map(|l| l.as_str()).collect();
        program.set_uniform_labels(&labels);
        gl_debug!(self.ctx, SOURCE, "Program '{}' built from {} source(s)", setting.id, sources.len());

        let program = Rc::new(RefCell::new(program));
        self.programs.insert(setting.id.clone(), Rc::clone(&program));
        Ok(program)
    }

    fn read_source(&self, relative: &Path, parser: Option<&ShaderParser>) -> Result<String> {
        let path = self.directory.join(relative);
        let code = match parser {
            Some(parser) => parser.parse_file(&path),
            None => fs::read_to_string(&path).map_err(Error::from),
        };
        code.map_err(|error| gl_err!(self.ctx, SOURCE, error))
    }
}

#[cfg(test)]
#[path = "shader_handler_tests.rs"]
mod tests;

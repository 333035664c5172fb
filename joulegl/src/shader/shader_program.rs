/// ShaderProgram - linked program with a uniform cache
///
/// Uniform writes are deferred: `set_uniforms` only records values, and
/// `use_program` (or each `compute` chunk) writes every cached value.
///
/// Cache rules:
/// - a name confirmed absent from the program is never queried again
/// - a name seen for the first time is looked up once, with the program
///   activated at most once per batch
/// - a cached name only has its value replaced

use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::ContextRef;
use crate::error::{Error, Result};
use crate::graphics_device::{BarrierFlags, ProgramHandle, ShaderSource, ShaderStage, UniformLocation};
use crate::shader::{ShaderConfig, UniformType, UniformValue};
use crate::{gl_bail, gl_debug, gl_err, gl_warn};

const SOURCE: &str = "joulegl::ShaderProgram";

/// Uniform incremented by `compute` for each dispatched chunk
pub const WORK_GROUP_OFFSET: &str = "work_group_offset";

/// Render (vertex + fragment [+ geometry]) or compute program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    Render,
    Compute,
}

/// Cached location, last value and setter of one uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedUniform {
    pub location: UniformLocation,
    pub value: UniformValue,
    pub uniform_type: UniformType,
}

pub struct ShaderProgram {
    ctx: ContextRef,
    name: String,
    kind: ProgramKind,
    handle: Option<ProgramHandle>,
    uniform_cache: FxHashMap<String, CachedUniform>,
    /// Names confirmed absent, never cleared
    ignored: FxHashSet<String>,
    /// Config keys this program reads whatever programs the config lists
    uniform_labels: Vec<String>,
}

impl ShaderProgram {
    /// Compile and link `sources` into a program
    pub fn from_sources(
        ctx: &ContextRef,
        name: impl Into<String>,
        kind: ProgramKind,
        sources: &[ShaderSource<'_>],
    ) -> Result<Self> {
        let name = name.into();

        // ========== VALIDATION ==========
        let has_stage = |stage| sources.iter().any(|s| s.stage == stage);
        let valid = match kind {
            ProgramKind::Render => {
                has_stage(ShaderStage::Vertex)
                    && has_stage(ShaderStage::Fragment)
                    && !has_stage(ShaderStage::Compute)
            }
            ProgramKind::Compute => sources.len() == 1 && has_stage(ShaderStage::Compute),
        };
        if !valid {
            gl_bail!(ctx, SOURCE, Error::InvalidShaderSetting(format!(
                "program '{}' has stages {:?}, not a {:?} program",
                name,
                sources.iter().map(|s| s.stage).collect::<Vec<_>>(),
                kind
            )));
        }

        // ========== LINK ==========
        let handle = match ctx.device()?.create_program(sources) {
            Ok(handle) => handle,
            Err(error) => return Err(gl_err!(ctx, SOURCE, error)),
        };
        gl_debug!(ctx, SOURCE, "Linked {:?} program '{}'", kind, name);

        Ok(Self {
            ctx: ContextRef::clone(ctx),
            name,
            kind,
            handle: Some(handle),
            uniform_cache: FxHashMap::default(),
            ignored: FxHashSet::default(),
            uniform_labels: Vec::new(),
        })
    }

    /// Render program from vertex, fragment and optional geometry sources
    pub fn new_render(
        ctx: &ContextRef,
        name: impl Into<String>,
        vertex: &str,
        fragment: &str,
        geometry: Option<&str>,
    ) -> Result<Self> {
        let mut sources = vec![
            ShaderSource::new(ShaderStage::Vertex, vertex),
            ShaderSource::new(ShaderStage::Fragment, fragment),
        ];
        if let Some(geometry) = geometry {
            sources.push(ShaderSource::new(ShaderStage::Geometry, geometry));
        }
        Self::from_sources(ctx, name, ProgramKind::Render, &sources)
    }

    /// Compute program from one source
    pub fn new_compute(ctx: &ContextRef, name: impl Into<String>, source: &str) -> Result<Self> {
        Self::from_sources(
            ctx,
            name,
            ProgramKind::Compute,
            &[ShaderSource::new(ShaderStage::Compute, source)],
        )
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str { &self.name }

    pub fn kind(&self) -> ProgramKind { self.kind }

    pub fn handle(&self) -> Option<ProgramHandle> { self.handle }

    /// Cache entry of a uniform
    pub fn cached(&self, name: &str) -> Option<&CachedUniform> {
        self.uniform_cache.get(name)
    }

    /// True once `name` was confirmed absent from the program
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    pub fn uniform_labels(&self) -> &[String] { &self.uniform_labels }

    /// Declare config keys this program reads
    pub fn set_uniform_labels(&mut self, labels: &[&str]) {
        for label in labels {
            if !self.uniform_labels.iter().any(|known| known == label) {
                self.uniform_labels.push(label.to_string());
            }
        }
    }

    fn live_handle(&self) -> Result<ProgramHandle> {
        match self.handle {
            Some(handle) => Ok(handle),
            None => Err(gl_err!(self.ctx, SOURCE, Error::InvalidResource(format!(
                "program '{}' was deleted", self.name
            )))),
        }
    }

    // ===== UNIFORMS =====

    /// Record one uniform value (see `set_uniforms`)
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>, uniform_type: &str) -> Result<()> {
        self.set_uniforms(&[(name, value.into(), uniform_type)])
    }

    /// Record a batch of (name, value, type tag) uniform values
    ///
    /// The type tag is only parsed when a cache entry is created. Entries
    /// processed before a failing one stay recorded.
    pub fn set_uniforms(&mut self, batch: &[(&str, UniformValue, &str)]) -> Result<()> {
        let handle = self.live_handle()?;
        let mut program_active = false;

        for &(name, value, tag) in batch {
            if self.ignored.contains(name) {
                continue;
            }

            if let Some(cached) = self.uniform_cache.get_mut(name) {
                if let Err(error) = cached.uniform_type.check(name, &value) {
                    return Err(gl_err!(self.ctx, SOURCE, error));
                }
                cached.value = value;
                continue;
            }

            let uniform_type = match UniformType::parse(tag) {
                Ok(uniform_type) => uniform_type,
                Err(error) => return Err(gl_err!(self.ctx, SOURCE, error)),
            };
            if let Err(error) = uniform_type.check(name, &value) {
                return Err(gl_err!(self.ctx, SOURCE, error));
            }

            let location = {
                let mut device = self.ctx.device()?;
                if !program_active {
                    device.use_program(handle)?;
                    program_active = true;
                }
                device.uniform_location(handle, name)?
            };

            match location {
                Some(location) => {
                    self.uniform_cache.insert(name.to_string(), CachedUniform {
                        location,
                        value,
                        uniform_type,
                    });
                }
                None => {
                    gl_warn!(self.ctx, SOURCE, "Uniform '{}' not found in program '{}', ignored from now on", name, self.name);
                    self.ignored.insert(name.to_string());
                }
            }
        }
        Ok(())
    }

    /// Record the config entries meant for this program
    ///
    /// Entries listed for this program's name come first, then entries
    /// reached through the uniform labels. Other entries are skipped.
    pub fn set_from_config(&mut self, config: &ShaderConfig) -> Result<()> {
        let mut keys: Vec<&str> = config.uniforms_for(&self.name).iter().map(|k| k.as_str()).collect();
        for label in &self.uniform_labels {
            if config.get(label).is_some() && !keys.contains(&label.as_str()) {
                keys.push(label.as_str());
            }
        }

        let batch: Vec<(&str, UniformValue, &str)> = keys.iter()
            .filter_map(|key| config.get(key))
            .map(|setting| (setting.key.as_str(), setting.value, setting.uniform_type.as_str()))
            .collect();
        self.set_uniforms(&batch)
    }

    /// Write every cached value to the current program
    fn apply_cache(&self) -> Result<()> {
        let mut device = self.ctx.device()?;
        for (name, cached) in &self.uniform_cache {
            cached.uniform_type.apply(&mut **device, name, cached.location, &cached.value)?;
        }
        Ok(())
    }

    /// Activate the program and write every cached value
    pub fn use_program(&self) -> Result<()> {
        let handle = self.live_handle()?;
        self.ctx.device()?.use_program(handle)?;
        self.apply_cache()
    }

    // ===== COMPUTE =====

    /// Dispatch `groups` work groups in chunks the device accepts
    ///
    /// Chunk `i` sets `work_group_offset` to `i * max`, writes the cache and
    /// dispatches `min(max, groups - i * max)` groups. With `barrier` a full
    /// memory barrier follows the last chunk.
    pub fn compute(&mut self, groups: usize, barrier: bool) -> Result<()> {
        if self.kind != ProgramKind::Compute {
            gl_bail!(self.ctx, SOURCE, Error::InvalidResource(format!(
                "program '{}' is not a compute program", self.name
            )));
        }
        let handle = self.live_handle()?;
        let max = self.ctx.limits().max_work_group_count;

        if groups > 0 {
            self.ctx.device()?.use_program(handle)?;
        }
        for chunk in 0..groups.div_ceil(max) {
            let offset = chunk * max;
            self.set_uniforms(&[(WORK_GROUP_OFFSET, UniformValue::Int(offset as i32), "int")])?;
            self.apply_cache()?;
            let count = max.min(groups - offset);
            self.ctx.device()?.dispatch_compute(count as u32, 1, 1);
        }

        if barrier {
            self.ctx.device()?.memory_barrier(BarrierFlags::ALL);
        }
        Ok(())
    }

    /// Release the program (a second call does nothing)
    pub fn delete(&mut self) -> Result<()> {
        if let Some(handle) = self.handle {
            self.ctx.device()?.delete_program(handle);
            self.handle = None;
        }
        Ok(())
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            match self.ctx.device() {
                Ok(mut device) => device.delete_program(handle),
                Err(_) => {
                    gl_warn!(self.ctx, SOURCE, "Device busy, program '{}' leaked on drop", self.name);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "shader_program_tests.rs"]
mod tests;

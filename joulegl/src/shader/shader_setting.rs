/// ShaderSetting - declaration of a program to build from source files
///
/// Paths are relative to the shader directory of the `ShaderHandler`.
/// Render settings take vertex, fragment and optional geometry paths in
/// that order, compute settings take exactly one path.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::graphics_device::ShaderStage;
use crate::shader::ProgramKind;

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSetting {
    pub id: String,
    pub kind: ProgramKind,
    pub stages: Vec<(ShaderStage, PathBuf)>,
    /// Config keys the program reads besides those listed for its id
    pub uniform_labels: Vec<String>,
}

impl ShaderSetting {
    /// Render program from `[vertex, fragment]` or `[vertex, fragment, geometry]`
    pub fn render(id: impl Into<String>, paths: &[&str]) -> Result<Self> {
        let id = id.into();
        if !(2..=3).contains(&paths.len()) {
            return Err(Error::InvalidShaderSetting(format!(
                "render setting '{}' needs 2 or 3 paths, got {}", id, paths.len()
            )));
        }

        let order = [ShaderStage::Vertex, ShaderStage::Fragment, ShaderStage::Geometry];
        let stages = order.into_iter()
            .zip(paths.iter())
            .map(|(stage, path)| (stage, PathBuf::from(path)))
            .collect();

        Ok(Self { id, kind: ProgramKind::Render, stages, uniform_labels: Vec::new() })
    }

    /// Compute program from a single path
    pub fn compute(id: impl Into<String>, paths: &[&str]) -> Result<Self> {
        let id = id.into();
        match paths {
            [path] => Ok(Self {
                id,
                kind: ProgramKind::Compute,
                stages: vec![(ShaderStage::Compute, PathBuf::from(path))],
                uniform_labels: Vec::new(),
            }),
            _ => Err(Error::InvalidShaderSetting(format!(
                "compute setting '{}' needs 1 path, got {}", id, paths.len()
            ))),
        }
    }

    pub fn with_uniform_labels(mut self, labels: &[&str]) -> Self {
        self.uniform_labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }
}

#[cfg(test)]
#[path = "shader_setting_tests.rs"]
mod tests;

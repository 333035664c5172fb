/// ShaderConfig - runtime uniform values shared by several programs
///
/// Each entry maps a key to a uniform type tag, a value, a display label and
/// the programs it belongs to. A program picks the entries listed for its
/// name plus the keys it declared as uniform labels.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::shader::UniformValue;

/// One configurable uniform
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSetting {
    /// Uniform name in the shader source
    pub key: String,
    /// Display label (carried for user interfaces)
    pub label: String,
    /// Type tag (`float`, `vec3`, `mat4`, `int`, `ivec3`)
    pub uniform_type: String,
    pub value: UniformValue,
    /// Names of the programs reading this uniform
    pub programs: Vec<String>,
}

impl UniformSetting {
    pub fn new(
        key: impl Into<String>,
        programs: &[&str],
        uniform_type: impl Into<String>,
        value: impl Into<UniformValue>,
    ) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            uniform_type: uniform_type.into(),
            value: value.into(),
            programs: programs.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShaderConfig {
    settings: Vec<UniformSetting>,
    index: FxHashMap<String, usize>,
    /// Program name → keys
    program_uniforms: FxHashMap<String, Vec<String>>,
}

impl ShaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register uniform settings
    ///
    /// A key seen before gains the new program names and type tag but keeps
    /// its current value.
    pub fn set_items(&mut self, items: Vec<UniformSetting>) {
        for item in items {
            for program in &item.programs {
                let keys = self.program_uniforms.entry(program.clone()).or_default();
                if !keys.contains(&item.key) {
                    keys.push(item.key.clone());
                }
            }

            match self.index.get(&item.key) {
                Some(&position) => {
                    let existing = &mut self.settings[position];
                    for program in item.programs {
                        if !existing.programs.contains(&program) {
                            existing.programs.push(program);
                        }
                    }
                    existing.uniform_type = item.uniform_type;
                }
                None => {
                    self.index.insert(item.key.clone(), self.settings.len());
                    self.settings.push(item);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&UniformSetting> {
        self.index.get(key).map(|&position| &self.settings[position])
    }

    /// Current value of a key
    pub fn value(&self, key: &str) -> Option<UniformValue> {
        self.get(key).map(|setting| setting.value)
    }

    /// Replace the value of a registered key
    pub fn set_value(&mut self, key: &str, value: impl Into<UniformValue>) -> Result<()> {
        match self.index.get(key) {
            Some(&position) => {
                self.settings[position].value = value.into();
                Ok(())
            }
            None => Err(Error::InvalidResource(format!("unknown uniform setting '{}'", key))),
        }
    }

    /// Keys registered for a program, in registration order
    pub fn uniforms_for(&self, program: &str) -> &[String] {
        self.program_uniforms.get(program).map(|keys| keys.as_slice()).unwrap_or(&[])
    }

    /// Every setting in registration order
    pub fn iter(&self) -> impl Iterator<Item = &UniformSetting> {
        self.settings.iter()
    }

    pub fn len(&self) -> usize { self.settings.len() }

    pub fn is_empty(&self) -> bool { self.settings.is_empty() }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

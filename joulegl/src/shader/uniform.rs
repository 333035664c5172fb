/// Uniform values and the setters that write them

use glam::{IVec3, Mat4, Vec3};

use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, UniformLocation};

// ===== UNIFORM VALUE =====

/// Value of one uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
    Int(i32),
    IVec3(IVec3),
}

impl UniformValue {
    /// Type tag matching this value
    pub fn uniform_type(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Mat4(_) => UniformType::Mat4,
            UniformValue::Int(_) => UniformType::Int,
            UniformValue::IVec3(_) => UniformType::IVec3,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self { UniformValue::Float(value) }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self { UniformValue::Vec3(value) }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self { UniformValue::Mat4(value) }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self { UniformValue::Int(value) }
}

impl From<IVec3> for UniformValue {
    fn from(value: IVec3) -> Self { UniformValue::IVec3(value) }
}

// ===== UNIFORM TYPE =====

/// Setter selected from a type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    Vec3,
    Mat4,
    Int,
    IVec3,
}

impl UniformType {
    /// Parse a tag (`float`, `vec3`, `mat4`, `int`, `ivec3`)
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "float" => Ok(UniformType::Float),
            "vec3" => Ok(UniformType::Vec3),
            "mat4" => Ok(UniformType::Mat4),
            "int" => Ok(UniformType::Int),
            "ivec3" => Ok(UniformType::IVec3),
            _ => Err(Error::UnknownUniformType(tag.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            UniformType::Float => "float",
            UniformType::Vec3 => "vec3",
            UniformType::Mat4 => "mat4",
            UniformType::Int => "int",
            UniformType::IVec3 => "ivec3",
        }
    }

    /// Fail unless `value` can be written by this setter
    pub fn check(&self, name: &str, value: &UniformValue) -> Result<()> {
        if value.uniform_type() != *self {
            return Err(Error::UniformValueMismatch {
                name: name.to_string(),
                expected: self.tag(),
            });
        }
        Ok(())
    }

    /// Write `value` at `location` of the current program
    pub fn apply(
        &self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        location: UniformLocation,
        value: &UniformValue,
    ) -> Result<()> {
        match (self, value) {
            (UniformType::Float, UniformValue::Float(v)) => device.uniform_f32(location, *v),
            (UniformType::Vec3, UniformValue::Vec3(v)) => device.uniform_vec3(location, v.to_array()),
            (UniformType::Mat4, UniformValue::Mat4(v)) => device.uniform_mat4(location, &v.to_cols_array()),
            (UniformType::Int, UniformValue::Int(v)) => device.uniform_i32(location, *v),
            (UniformType::IVec3, UniformValue::IVec3(v)) => device.uniform_ivec3(location, v.to_array()),
            _ => return self.check(name, value),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "uniform_tests.rs"]
mod tests;

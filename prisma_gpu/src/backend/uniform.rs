/// Uniform variable model: base types, shapes, reflection records, and the
/// tagged value union exchanged between the toolkit and backends.

/// Numeric base type of a uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformBaseType {
    /// 32-bit float (float, vecN, matN)
    Float,
    /// 32-bit signed integer (int, ivecN)
    Int,
}

/// Shape of one uniform element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformShape {
    /// Single component
    Scalar,
    /// 2-component vector
    Vec2,
    /// 3-component vector
    Vec3,
    /// 4-component vector
    Vec4,
    /// 2x2 matrix
    Mat2,
    /// 3x3 matrix
    Mat3,
    /// 4x4 matrix
    Mat4,
}

impl UniformShape {
    /// Number of components in one element of this shape
    pub fn component_count(&self) -> usize {
        match self {
            UniformShape::Scalar => 1,
            UniformShape::Vec2 => 2,
            UniformShape::Vec3 => 3,
            UniformShape::Vec4 => 4,
            UniformShape::Mat2 => 4,
            UniformShape::Mat3 => 9,
            UniformShape::Mat4 => 16,
        }
    }

    /// Whether this shape is a matrix (matrices are always float-based)
    pub fn is_matrix(&self) -> bool {
        matches!(self, UniformShape::Mat2 | UniformShape::Mat3 | UniformShape::Mat4)
    }
}

impl std::fmt::Display for UniformShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniformShape::Scalar => write!(f, "scalar"),
            UniformShape::Vec2 => write!(f, "vec2"),
            UniformShape::Vec3 => write!(f, "vec3"),
            UniformShape::Vec4 => write!(f, "vec4"),
            UniformShape::Mat2 => write!(f, "mat2"),
            UniformShape::Mat3 => write!(f, "mat3"),
            UniformShape::Mat4 => write!(f, "mat4"),
        }
    }
}

/// Reflection record for one active uniform, as reported by the backend
///
/// Derived solely from the linked program; never constructed by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformInfo {
    /// Variable name as declared in the shader source
    pub name: String,
    /// Numeric base type
    pub base_type: UniformBaseType,
    /// Element shape
    pub shape: UniformShape,
    /// Declared array length (1 if not an array)
    pub array_length: usize,
    /// Backend-assigned location
    pub location: i32,
}

impl UniformInfo {
    /// Total component count across all array elements
    pub fn total_components(&self) -> usize {
        self.shape.component_count() * self.array_length
    }
}

/// A uniform value crossing the API boundary
///
/// Scalars keep their own variants so that "a single number" and "a
/// sequence of one number" stay distinguishable during validation.
/// Vectors, matrices and arrays travel as flat component sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// Single float
    Float(f32),
    /// Single int
    Int(i32),
    /// Flat float components (vector, matrix, or array thereof)
    FloatVec(Vec<f32>),
    /// Flat int components (ivec or int array)
    IntVec(Vec<i32>),
}

impl UniformValue {
    /// Whether this value is a single scalar (not a sequence)
    pub fn is_scalar(&self) -> bool {
        matches!(self, UniformValue::Float(_) | UniformValue::Int(_))
    }

    /// Numeric base type of the carried data
    pub fn base_type(&self) -> UniformBaseType {
        match self {
            UniformValue::Float(_) | UniformValue::FloatVec(_) => UniformBaseType::Float,
            UniformValue::Int(_) | UniformValue::IntVec(_) => UniformBaseType::Int,
        }
    }

    /// Number of components carried (1 for scalars)
    pub fn component_count(&self) -> usize {
        match self {
            UniformValue::Float(_) | UniformValue::Int(_) => 1,
            UniformValue::FloatVec(v) => v.len(),
            UniformValue::IntVec(v) => v.len(),
        }
    }

    /// View the float components, if this is a float value
    pub fn as_f32_slice(&self) -> Option<&[f32]> {
        match self {
            UniformValue::Float(v) => Some(std::slice::from_ref(v)),
            UniformValue::FloatVec(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// View the int components, if this is an int value
    pub fn as_i32_slice(&self) -> Option<&[i32]> {
        match self {
            UniformValue::Int(v) => Some(std::slice::from_ref(v)),
            UniformValue::IntVec(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

// ===== SCALAR / SEQUENCE CONVERSIONS =====

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<Vec<f32>> for UniformValue {
    fn from(v: Vec<f32>) -> Self {
        UniformValue::FloatVec(v)
    }
}

impl From<Vec<i32>> for UniformValue {
    fn from(v: Vec<i32>) -> Self {
        UniformValue::IntVec(v)
    }
}

impl From<&[f32]> for UniformValue {
    fn from(v: &[f32]) -> Self {
        UniformValue::FloatVec(v.to_vec())
    }
}

impl From<&[i32]> for UniformValue {
    fn from(v: &[i32]) -> Self {
        UniformValue::IntVec(v.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for UniformValue {
    fn from(v: [f32; N]) -> Self {
        UniformValue::FloatVec(v.to_vec())
    }
}

impl<const N: usize> From<[i32; N]> for UniformValue {
    fn from(v: [i32; N]) -> Self {
        UniformValue::IntVec(v.to_vec())
    }
}

// ===== GLAM CONVERSIONS =====

impl From<glam::Vec2> for UniformValue {
    fn from(v: glam::Vec2) -> Self {
        UniformValue::FloatVec(v.to_array().to_vec())
    }
}

impl From<glam::Vec3> for UniformValue {
    fn from(v: glam::Vec3) -> Self {
        UniformValue::FloatVec(v.to_array().to_vec())
    }
}

impl From<glam::Vec4> for UniformValue {
    fn from(v: glam::Vec4) -> Self {
        UniformValue::FloatVec(v.to_array().to_vec())
    }
}

impl From<glam::IVec2> for UniformValue {
    fn from(v: glam::IVec2) -> Self {
        UniformValue::IntVec(v.to_array().to_vec())
    }
}

impl From<glam::IVec3> for UniformValue {
    fn from(v: glam::IVec3) -> Self {
        UniformValue::IntVec(v.to_array().to_vec())
    }
}

impl From<glam::IVec4> for UniformValue {
    fn from(v: glam::IVec4) -> Self {
        UniformValue::IntVec(v.to_array().to_vec())
    }
}

// Matrices flatten column-major, matching the upload convention.

impl From<glam::Mat2> for UniformValue {
    fn from(m: glam::Mat2) -> Self {
        UniformValue::FloatVec(m.to_cols_array().to_vec())
    }
}

impl From<glam::Mat3> for UniformValue {
    fn from(m: glam::Mat3) -> Self {
        UniformValue::FloatVec(m.to_cols_array().to_vec())
    }
}

impl From<glam::Mat4> for UniformValue {
    fn from(m: glam::Mat4) -> Self {
        UniformValue::FloatVec(m.to_cols_array().to_vec())
    }
}

#[cfg(test)]
#[path = "uniform_tests.rs"]
mod tests;

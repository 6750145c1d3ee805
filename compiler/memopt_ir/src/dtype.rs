//! Element and variable types attached to value nodes.

/// Element type of a tensor value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    Bool,
    Int8,
    UInt8,
    Int16,
    Int32,
    Int64,
    Float16,
    BFloat16,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl DataType {
    /// Width of one element in bytes.
    #[inline]
    pub const fn size_of(self) -> u64 {
        match self {
            DataType::Bool | DataType::Int8 | DataType::UInt8 => 1,
            DataType::Int16 | DataType::Float16 | DataType::BFloat16 => 2,
            DataType::Int32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::Float64 | DataType::Complex64 => 8,
            DataType::Complex128 => 16,
        }
    }
}

/// Storage category of a value.
///
/// Only [`DenseTensor`](VarType::DenseTensor) values have a single
/// contiguous allocation whose size can be estimated from the shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarType {
    /// Contiguous tensor with a declared shape.
    #[default]
    DenseTensor,
    /// Sparse row-selected tensor.
    SelectedRows,
    /// Dynamically sized list of tensors.
    TensorArray,
    /// Holder for externally fed inputs.
    FeedList,
    /// Holder for extracted outputs.
    FetchList,
    /// Scopes used by control-flow operators.
    StepScopes,
    /// Opaque runtime object.
    Raw,
}

impl VarType {
    /// Returns `true` for values backed by one dense tensor allocation.
    #[inline]
    pub fn is_tensor(self) -> bool {
        self == VarType::DenseTensor
    }
}

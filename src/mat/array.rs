//! Decoded MATLAB arrays

use std::fmt;

/// MATLAB array classes (`mxCELL_CLASS` .. `mxUINT64_CLASS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatClass {
    Cell,
    Struct,
    Object,
    Char,
    Sparse,
    Double,
    Single,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
}

impl MatClass {
    /// Map the class byte of the array flags to a class
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(MatClass::Cell),
            2 => Some(MatClass::Struct),
            3 => Some(MatClass::Object),
            4 => Some(MatClass::Char),
            5 => Some(MatClass::Sparse),
            6 => Some(MatClass::Double),
            7 => Some(MatClass::Single),
            8 => Some(MatClass::Int8),
            9 => Some(MatClass::UInt8),
            10 => Some(MatClass::Int16),
            11 => Some(MatClass::UInt16),
            12 => Some(MatClass::Int32),
            13 => Some(MatClass::UInt32),
            14 => Some(MatClass::Int64),
            15 => Some(MatClass::UInt64),
            _ => None,
        }
    }

    /// Class byte written to the array flags
    pub fn code(self) -> u8 {
        match self {
            MatClass::Cell => 1,
            MatClass::Struct => 2,
            MatClass::Object => 3,
            MatClass::Char => 4,
            MatClass::Sparse => 5,
            MatClass::Double => 6,
            MatClass::Single => 7,
            MatClass::Int8 => 8,
            MatClass::UInt8 => 9,
            MatClass::Int16 => 10,
            MatClass::UInt16 => 11,
            MatClass::Int32 => 12,
            MatClass::UInt32 => 13,
            MatClass::Int64 => 14,
            MatClass::UInt64 => 15,
        }
    }

    /// Whether arrays of this class hold plain numbers
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            MatClass::Cell | MatClass::Struct | MatClass::Object | MatClass::Char | MatClass::Sparse
        )
    }
}

impl fmt::Display for MatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatClass::Cell => "cell",
            MatClass::Struct => "struct",
            MatClass::Object => "object",
            MatClass::Char => "char",
            MatClass::Sparse => "sparse",
            MatClass::Double => "double",
            MatClass::Single => "single",
            MatClass::Int8 => "int8",
            MatClass::UInt8 => "uint8",
            MatClass::Int16 => "int16",
            MatClass::UInt16 => "uint16",
            MatClass::Int32 => "int32",
            MatClass::UInt32 => "uint32",
            MatClass::Int64 => "int64",
            MatClass::UInt64 => "uint64",
        };
        f.write_str(name)
    }
}

/// Payload of a decoded array
#[derive(Debug, Clone, PartialEq)]
pub enum MatData {
    /// Numeric or logical values widened to `f64`, row-major.
    ///
    /// `int64`/`uint64` values beyond ±2^53 round to the nearest `f64`.
    Numeric {
        /// Storage class declared in the array flags
        class: MatClass,
        /// Logical flag from the array flags
        logical: bool,
        /// Values in row-major order
        values: Vec<f64>,
    },
    /// Character array, rows concatenated
    Char(String),
    /// Cell array elements in MATLAB (column-major) order
    Cell(Vec<MatArray>),
    /// Struct array
    Struct {
        /// Field names in declaration order
        field_names: Vec<String>,
        /// One entry per struct element (column-major), values in field order;
        /// empty when there are no fields
        elements: Vec<Vec<MatArray>>,
    },
}

/// A named MATLAB array with its dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct MatArray {
    name: String,
    dims: Vec<usize>,
    data: MatData,
}

impl MatArray {
    /// Assemble an array from decoded parts
    pub fn new(name: impl Into<String>, dims: Vec<usize>, data: MatData) -> Self {
        Self {
            name: name.into(),
            dims,
            data,
        }
    }

    /// Double array from row-major values
    pub fn numeric(name: impl Into<String>, dims: Vec<usize>, values: Vec<f64>) -> Self {
        Self::new(
            name,
            dims,
            MatData::Numeric {
                class: MatClass::Double,
                logical: false,
                values,
            },
        )
    }

    /// 1×1 double array
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self::numeric(name, vec![1, 1], vec![value])
    }

    /// 1×n character array
    pub fn char_array(name: impl Into<String>, text: &str) -> Self {
        let len = text.encode_utf16().count();
        Self::new(name, vec![1, len], MatData::Char(text.to_string()))
    }

    /// 1×1 struct holding `fields` in order; each field array is renamed to
    /// its field name.
    pub fn record<S: Into<String>>(name: impl Into<String>, fields: Vec<(S, MatArray)>) -> Self {
        let mut field_names = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for (field, value) in fields {
            let field = field.into();
            values.push(value.renamed(field.clone()));
            field_names.push(field);
        }
        Self::new(
            name,
            vec![1, 1],
            MatData::Struct {
                field_names,
                elements: if values.is_empty() { Vec::new() } else { vec![values] },
            },
        )
    }

    /// Empty 0×0 double array, as stored for zero-byte matrix elements
    pub fn empty(name: impl Into<String>) -> Self {
        Self::numeric(name, vec![0, 0], Vec::new())
    }

    /// Same array under another name
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimensions as stored (always at least two)
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn data(&self) -> &MatData {
        &self.data
    }

    /// Total number of elements
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn class(&self) -> MatClass {
        match &self.data {
            MatData::Numeric { class, .. } => *class,
            MatData::Char(_) => MatClass::Char,
            MatData::Cell(_) => MatClass::Cell,
            MatData::Struct { .. } => MatClass::Struct,
        }
    }

    /// Row-major values of a numeric array
    pub fn numeric_values(&self) -> Option<&[f64]> {
        match &self.data {
            MatData::Numeric { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Field names of a struct array
    pub fn field_names(&self) -> Option<&[String]> {
        match &self.data {
            MatData::Struct { field_names, .. } => Some(field_names),
            _ => None,
        }
    }

    /// Value of `field` in struct element `index` (column-major)
    pub fn field(&self, index: usize, field: &str) -> Option<&MatArray> {
        match &self.data {
            MatData::Struct {
                field_names,
                elements,
            } => {
                let position = field_names.iter().position(|name| name == field)?;
                elements.get(index)?.get(position)
            }
            _ => None,
        }
    }
}

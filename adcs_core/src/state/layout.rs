// adcs_core/src/state/layout.rs

use nalgebra::Vector3;

use crate::errors::LayoutError;

/// Name under which the packed secondary vector is registered with the engine.
pub const SECONDARY_STATES_KEY: &str = "SecondaryStates";

/// Body-frame spin, rad/s.
pub const SPIN: &str = "Spin";
/// Accumulated rotation angle, rad. Diagnostics only.
pub const THETA: &str = "Theta";

/// The standard dimension of the packed secondary vector.
pub const STANDARD_SECONDARY_DIM: usize = 6;

/// One named slice of the packed vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryField {
    pub name: String,
    pub index: usize,
    pub size: usize,
}

/// Fixed, ordered packing of named auxiliary fields into one flat vector so
/// the engine can integrate them as a single ODE state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryStateLayout {
    fields: Vec<SecondaryField>,
    total: usize,
}

impl SecondaryStateLayout {
    /// Builds a layout from `(name, size)` pairs laid out in order.
    pub fn new<S: Into<String>>(
        fields: impl IntoIterator<Item = (S, usize)>,
    ) -> Result<Self, LayoutError> {
        let mut packed: Vec<SecondaryField> = Vec::new();
        let mut index = 0;
        for (name, size) in fields {
            let name = name.into();
            if packed.iter().any(|f| f.name == name) {
                return Err(LayoutError::DuplicateField { field: name });
            }
            packed.push(SecondaryField { name, index, size });
            index += size;
        }
        Ok(Self {
            fields: packed,
            total: index,
        })
    }

    /// The layout used by the attitude equations:
    /// - Spin (3) in the body frame, indices 0-2
    /// - Theta (3), indices 3-5
    pub fn standard() -> Self {
        Self {
            fields: vec![
                SecondaryField {
                    name: SPIN.to_string(),
                    index: 0,
                    size: 3,
                },
                SecondaryField {
                    name: THETA.to_string(),
                    index: 3,
                    size: 3,
                },
            ],
            total: STANDARD_SECONDARY_DIM,
        }
    }

    pub fn fields(&self) -> &[SecondaryField] {
        &self.fields
    }

    fn field(&self, name: &str) -> Result<&SecondaryField, LayoutError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| LayoutError::OutOfRange {
                field: name.to_string(),
            })
    }

    pub fn index_of(&self, name: &str) -> Result<usize, LayoutError> {
        self.field(name).map(|f| f.index)
    }

    pub fn size_of(&self, name: &str) -> Result<usize, LayoutError> {
        self.field(name).map(|f| f.size)
    }

    pub fn total_size(&self) -> usize {
        self.total
    }

    fn bounds(&self, name: &str, len: usize) -> Result<(usize, usize), LayoutError> {
        let field = self.field(name)?;
        let end = field.index + field.size;
        if end > len {
            return Err(LayoutError::VectorTooShort {
                field: name.to_string(),
                start: field.index,
                end,
                len,
            });
        }
        Ok((field.index, end))
    }

    /// Borrows the slice of `vector` that holds `name`.
    pub fn extract<'a>(&self, vector: &'a [f64], name: &str) -> Result<&'a [f64], LayoutError> {
        let (start, end) = self.bounds(name, vector.len())?;
        Ok(&vector[start..end])
    }

    /// Reads a three-component field as a vector.
    pub fn extract_vector3(&self, vector: &[f64], name: &str) -> Result<Vector3<f64>, LayoutError> {
        match self.extract(vector, name)? {
            [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
            other => Err(LayoutError::WrongSize {
                field: name.to_string(),
                expected: 3,
                found: other.len(),
            }),
        }
    }

    /// Copies `values` into the slice of `vector` that holds `name`.
    /// Extra or missing values are ignored / left untouched.
    pub fn write(&self, vector: &mut [f64], name: &str, values: &[f64]) -> Result<(), LayoutError> {
        let (start, end) = self.bounds(name, vector.len())?;
        for (dst, src) in vector[start..end].iter_mut().zip(values) {
            *dst = *src;
        }
        Ok(())
    }

    /// Builds a full packed vector from named values; unspecified fields are zero.
    pub fn pack(&self, values: &[(&str, &[f64])]) -> Result<Vec<f64>, LayoutError> {
        let mut vector = vec![0.0; self.total];
        for (name, field_values) in values {
            self.write(&mut vector, name, field_values)?;
        }
        Ok(vector)
    }
}

impl Default for SecondaryStateLayout {
    fn default() -> Self {
        Self::standard()
    }
}

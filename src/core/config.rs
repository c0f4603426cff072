use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Which regression model backs the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    Linear,
    Poly,
    TwoLayer,
}

impl ModelKind {
    /// Parse the `model` create-time option. Anything but the three known
    /// names is a construction error.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "linear" => Ok(ModelKind::Linear),
            "poly" => Ok(ModelKind::Poly),
            "two_layer" => Ok(ModelKind::TwoLayer),
            other => Err(Error::new(
                ErrorKind::Construction,
                format!("Unknown model option '{}'", other),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Poly => "poly",
            ModelKind::TwoLayer => "two_layer",
        }
    }
}

impl Default for ModelKind {
    fn default() -> Self {
        ModelKind::Linear
    }
}

/// Physical type of the indexed column as declared by the host.
/// The build pipeline has already widened the values to f64; this only
/// gates construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Text,
    Boolean,
    Blob,
}

impl KeyType {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, KeyType::Text | KeyType::Boolean | KeyType::Blob)
    }
}

/// Constraint requested on the index at create time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexConstraint {
    None,
    Unique,
    PrimaryKey,
}

/// Create-time options for an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOptions {
    pub model: ModelKind,
    pub key_type: KeyType,
    pub constraint: IndexConstraint,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions {
            model: ModelKind::Linear,
            key_type: KeyType::Float64,
            constraint: IndexConstraint::None,
        }
    }
}

impl IndexOptions {
    pub fn with_model(model: ModelKind) -> Self {
        IndexOptions {
            model,
            ..Default::default()
        }
    }

    /// Construction-time gate. A learned index cannot enforce uniqueness
    /// and only orders numeric key spaces.
    pub fn validate(&self) -> Result<()> {
        if !self.key_type.is_numeric() {
            return Err(Error::new(
                ErrorKind::Construction,
                format!("Unsupported key type {:?} for a learned index", self.key_type),
            ));
        }
        if self.constraint != IndexConstraint::None {
            return Err(Error::new(
                ErrorKind::Construction,
                "Learned indexes do not support UNIQUE or PRIMARY KEY constraints".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_model_names() {
        assert_eq!(ModelKind::parse("linear").unwrap(), ModelKind::Linear);
        assert_eq!(ModelKind::parse("poly").unwrap(), ModelKind::Poly);
        assert_eq!(ModelKind::parse("two_layer").unwrap(), ModelKind::TwoLayer);

        let err = ModelKind::parse("btree").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Construction);
    }

    #[test]
    fn rejects_non_numeric_keys() {
        let options = IndexOptions {
            key_type: KeyType::Text,
            ..Default::default()
        };
        assert_eq!(options.validate().unwrap_err().kind, ErrorKind::Construction);
    }

    #[test]
    fn rejects_constraints() {
        let options = IndexOptions {
            constraint: IndexConstraint::Unique,
            ..Default::default()
        };
        assert_eq!(options.validate().unwrap_err().kind, ErrorKind::Construction);

        let options = IndexOptions {
            constraint: IndexConstraint::PrimaryKey,
            ..Default::default()
        };
        assert_eq!(options.validate().unwrap_err().kind, ErrorKind::Construction);
    }

    #[test]
    fn default_options_are_valid() {
        assert!(IndexOptions::default().validate().is_ok());
    }
}

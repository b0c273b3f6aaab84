use crate::domain::PayloadShape;

/// A patch value cannot replace the existing property value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("property {property} of {entity} holds a {existing} value, patch carries a {incoming}")]
pub struct ShapeError {
    pub entity: String,
    pub property: String,
    pub existing: PayloadShape,
    pub incoming: PayloadShape,
}

//! DOM errors
//!
//! Contract violations surfaced synchronously by tree, attribute and
//! document operations. Names and codes follow the DOMException table.

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// A name failed the Name grammar, or PI data contains `?>`
    #[error("String contains an invalid character")]
    InvalidCharacter,

    /// Prefix / namespace mismatch
    #[error("Operation is not allowed by Namespaces in XML")]
    Namespace,

    /// Document nodes cannot be imported or adopted, unknown event interface
    #[error("Operation is not supported")]
    NotSupported,

    /// Node cannot be inserted at this point of the tree
    #[error("Operation would yield an incorrect node tree")]
    HierarchyRequest,

    /// Attr is already owned by another element
    #[error("Attribute is in use by another element")]
    InUseAttribute,

    /// Node or attribute does not exist
    #[error("Object can not be found here")]
    NotFound,

    /// Object is not in a state that allows the operation
    #[error("Object is in an invalid state")]
    InvalidState,
}

impl DomError {
    /// DOMException name
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidCharacter => "InvalidCharacterError",
            Self::Namespace => "NamespaceError",
            Self::NotSupported => "NotSupportedError",
            Self::HierarchyRequest => "HierarchyRequestError",
            Self::InUseAttribute => "InUseAttributeError",
            Self::NotFound => "NotFoundError",
            Self::InvalidState => "InvalidStateError",
        }
    }

    /// Legacy DOMException code
    pub fn code(&self) -> u16 {
        match self {
            Self::HierarchyRequest => 3,
            Self::InvalidCharacter => 5,
            Self::NotFound => 8,
            Self::NotSupported => 9,
            Self::InUseAttribute => 10,
            Self::InvalidState => 11,
            Self::Namespace => 14,
        }
    }
}

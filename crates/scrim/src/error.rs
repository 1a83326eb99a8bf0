#![forbid(unsafe_code)]

//! Error taxonomy for modal construction and content updates.
//!
//! Construction-time errors ([`ModalError::NotFound`],
//! [`ModalError::InvalidConfiguration`]) abort `create` and surface to the
//! caller. [`ModalError::ContentUpdateFailed`] is reported after the engine
//! has already degraded in place — the dialog stays open showing fallback
//! content. No error is retried anywhere.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    /// A pre-existing element referenced by id does not exist.
    #[error("no element with id `{id}` exists in the document")]
    NotFound { id: String },

    /// A configuration value could not be interpreted.
    #[error("unrecognized {field} value `{value}`")]
    InvalidConfiguration { field: &'static str, value: String },

    /// A late content update produced no usable markup; fallback content
    /// was rendered in place.
    #[error("content update for modal `{id}` produced no usable markup")]
    ContentUpdateFailed { id: String },
}

//! Loading of external schema documents.
use std::error::Error;

use url::Url;

use crate::value::JsonValue;

/// Loads documents for `$ref` targets that are not known to the compiler.
///
/// The compiler never touches the network or the file system on its own; external references
/// are only followed through an implementation of this trait passed via
/// [`crate::ValidationOptions::with_retriever`].
pub trait Retrieve: Send + Sync {
    /// Load the document identified by `uri` (without its fragment).
    ///
    /// # Errors
    ///
    /// Any error is reported as [`crate::SchemaError::Retrieval`].
    fn retrieve(&self, uri: &Url) -> Result<JsonValue, Box<dyn Error + Send + Sync>>;
}

impl<F> Retrieve for F
where
    F: Fn(&Url) -> Result<JsonValue, Box<dyn Error + Send + Sync>> + Send + Sync,
{
    fn retrieve(&self, uri: &Url) -> Result<JsonValue, Box<dyn Error + Send + Sync>> {
        self(uri)
    }
}

//! Index of every addressable schema resource, built before compilation.
use std::{collections::VecDeque, sync::Arc};

use ahash::AHashMap;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::{
    draft::Draft, paths::Location, retriever::Retrieve, value::JsonValue, SchemaError,
};

/// Base URI of a root schema that declares no `$id` and has no configured base URI.
pub(crate) const DEFAULT_ROOT_URI: &str = "json-schema:///";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DocumentId(usize);

struct Document {
    uri: Url,
    contents: Arc<JsonValue>,
    draft: Draft,
}

/// Resolved position of a subschema: the document and a JSON Pointer into it.
pub(crate) type Target = (DocumentId, Location);

pub(crate) struct Registry<'o> {
    documents: Vec<Document>,
    /// Absolute URIs (without fragment) of documents and embedded `$id` resources.
    resources: AHashMap<Url, Target>,
    /// Plain-name fragments, keyed by the URI of their enclosing resource.
    anchors: AHashMap<(Url, String), Target>,
    /// Base URI in effect for each indexed subschema.
    bases: AHashMap<Target, Url>,
    default_draft: Draft,
    retriever: Option<&'o dyn Retrieve>,
}

pub(crate) fn parse_uri(uri: &str) -> Result<Url, SchemaError> {
    let mut parsed = Url::parse(uri).map_err(|source| SchemaError::InvalidUri {
        uri: uri.to_string(),
        source,
    })?;
    parsed.set_fragment(None);
    Ok(parsed)
}

impl<'o> Registry<'o> {
    pub(crate) fn new(default_draft: Draft, retriever: Option<&'o dyn Retrieve>) -> Self {
        Registry {
            documents: Vec::new(),
            resources: AHashMap::new(),
            anchors: AHashMap::new(),
            bases: AHashMap::new(),
            default_draft,
            retriever,
        }
    }

    /// Register a document under `uri` and index its subschemas.
    pub(crate) fn add_document(
        &mut self,
        uri: Url,
        contents: Arc<JsonValue>,
        draft: Draft,
    ) -> Result<DocumentId, SchemaError> {
        let id = DocumentId(self.documents.len());
        self.resources
            .entry(uri.clone())
            .or_insert_with(|| (id, Location::new()));
        self.documents.push(Document {
            uri,
            contents,
            draft,
        });
        self.index(id)?;
        Ok(id)
    }

    pub(crate) fn contents(&self, document: DocumentId) -> Arc<JsonValue> {
        Arc::clone(&self.documents[document.0].contents)
    }

    pub(crate) fn draft(&self, document: DocumentId) -> Draft {
        self.documents[document.0].draft
    }

    pub(crate) fn len(&self) -> usize {
        self.documents.len()
    }

    fn index(&mut self, document: DocumentId) -> Result<(), SchemaError> {
        let contents = self.contents(document);
        let draft = self.draft(document);
        let mut queue = VecDeque::with_capacity(32);
        queue.push_back((
            self.documents[document.0].uri.clone(),
            Location::new(),
            &*contents,
        ));
        while let Some((mut base, location, schema)) = queue.pop_front() {
            if let JsonValue::Object(object) = schema {
                // `$ref` overrides every sibling keyword, `$id` included
                if !object.contains_key("$ref") {
                    if let Some(JsonValue::String(id)) = object.get(draft.id_keyword()) {
                        self.register_id(&mut base, id, document, &location)?;
                    }
                }
                for (child_location, child) in draft.subresources_of(&location, object) {
                    queue.push_back((base.clone(), child_location, child));
                }
            }
            self.bases.insert((document, location), base);
        }
        Ok(())
    }

    fn register_id(
        &mut self,
        base: &mut Url,
        id: &str,
        document: DocumentId,
        location: &Location,
    ) -> Result<(), SchemaError> {
        if let Some(name) = id.strip_prefix('#') {
            if !name.is_empty() {
                self.anchors
                    .entry((base.clone(), name.to_string()))
                    .or_insert_with(|| (document, location.clone()));
            }
            return Ok(());
        }
        let mut resolved = base.join(id).map_err(|source| SchemaError::InvalidUri {
            uri: id.to_string(),
            source,
        })?;
        let fragment = resolved
            .fragment()
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string);
        resolved.set_fragment(None);
        self.resources
            .entry(resolved.clone())
            .or_insert_with(|| (document, location.clone()));
        if let Some(name) = fragment {
            self.anchors
                .entry((resolved.clone(), name))
                .or_insert_with(|| (document, location.clone()));
        }
        *base = resolved;
        Ok(())
    }

    /// Base URI in effect at `location`.
    ///
    /// Locations that were not indexed (e.g. pointers into `enum` values) inherit the base of
    /// their closest indexed ancestor.
    pub(crate) fn base_of(&self, document: DocumentId, location: &Location) -> Url {
        let mut current = Some(location.clone());
        while let Some(location) = current {
            if let Some(base) = self.bases.get(&(document, location.clone())) {
                return base.clone();
            }
            current = location.parent();
        }
        self.documents[document.0].uri.clone()
    }

    /// Resolve `reference` against `base`, retrieving external documents if needed.
    ///
    /// `location` is the location of the `$ref` keyword and only used for error reporting.
    pub(crate) fn resolve(
        &mut self,
        base: &Url,
        reference: &str,
        location: &Location,
    ) -> Result<Target, SchemaError> {
        let mut uri = base.join(reference).map_err(|source| SchemaError::InvalidUri {
            uri: reference.to_string(),
            source,
        })?;
        let fragment = uri
            .fragment()
            .map(|fragment| percent_decode_str(fragment).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        uri.set_fragment(None);
        tracing::trace!(reference, base = %base, resolved = %uri, "Resolving reference");
        let (document, resource) = match self.resources.get(&uri) {
            Some(target) => target.clone(),
            None => self.retrieve(&uri, reference, location)?,
        };
        if fragment.is_empty() {
            return Ok((document, resource));
        }
        if fragment.starts_with('/') {
            let pointer = resource.concat(&fragment);
            if self.documents[document.0]
                .contents
                .pointer(pointer.as_str())
                .is_some()
            {
                return Ok((document, pointer));
            }
        } else if let Some(target) = self.anchors.get(&(uri, fragment)) {
            return Ok(target.clone());
        }
        Err(SchemaError::UnresolvedRef {
            reference: reference.to_string(),
            location: location.clone(),
        })
    }

    fn retrieve(
        &mut self,
        uri: &Url,
        reference: &str,
        location: &Location,
    ) -> Result<Target, SchemaError> {
        let retriever = match self.retriever {
            // Nothing to retrieve relative to the placeholder base
            Some(retriever) if !uri.as_str().starts_with(DEFAULT_ROOT_URI) => retriever,
            _ => {
                return Err(SchemaError::UnresolvedRef {
                    reference: reference.to_string(),
                    location: location.clone(),
                })
            }
        };
        tracing::debug!(uri = %uri, "Retrieving external document");
        let contents = retriever
            .retrieve(uri)
            .map_err(|source| SchemaError::Retrieval {
                uri: uri.to_string(),
                source,
            })?;
        let draft = Draft::detect(&contents)?.unwrap_or(self.default_draft);
        let document = self.add_document(uri.clone(), Arc::new(contents), draft)?;
        Ok((document, Location::new()))
    }
}

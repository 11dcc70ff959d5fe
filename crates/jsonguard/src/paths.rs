//! JSON Pointer locations for instances and schema keywords.
use core::fmt;
use std::{borrow::Cow, sync::Arc};

use serde::{Serialize, Serializer};

/// A single step in a location: an object property or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSegment<'a> {
    Property(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for LocationSegment<'a> {
    fn from(value: &'a str) -> Self {
        LocationSegment::Property(value)
    }
}

impl<'a> From<&'a String> for LocationSegment<'a> {
    fn from(value: &'a String) -> Self {
        LocationSegment::Property(value)
    }
}

impl From<usize> for LocationSegment<'_> {
    fn from(value: usize) -> Self {
        LocationSegment::Index(value)
    }
}

fn write_escaped(buffer: &mut String, segment: LocationSegment<'_>) {
    buffer.push('/');
    match segment {
        LocationSegment::Property(property) => {
            for ch in property.chars() {
                match ch {
                    '~' => buffer.push_str("~0"),
                    '/' => buffer.push_str("~1"),
                    _ => buffer.push(ch),
                }
            }
        }
        LocationSegment::Index(idx) => {
            let mut itoa_buffer = itoa::Buffer::new();
            buffer.push_str(itoa_buffer.format(idx));
        }
    }
}

/// An immutable JSON Pointer, cheap to clone.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Location(Arc<str>);

impl Location {
    /// The empty pointer, referring to the whole document.
    #[must_use]
    pub fn new() -> Self {
        Location(Arc::from(""))
    }

    /// Build a location from an already escaped JSON Pointer.
    pub(crate) fn from_escaped(pointer: &str) -> Self {
        Location(Arc::from(pointer))
    }

    /// Append one segment, escaping it as needed.
    #[must_use]
    pub fn join<'a>(&self, segment: impl Into<LocationSegment<'a>>) -> Self {
        let mut buffer = String::with_capacity(self.0.len() + 8);
        buffer.push_str(&self.0);
        write_escaped(&mut buffer, segment.into());
        Location(Arc::from(buffer))
    }

    /// Append an escaped JSON Pointer (e.g. taken from a `$ref` fragment).
    pub(crate) fn concat(&self, pointer: &str) -> Self {
        let mut buffer = String::with_capacity(self.0.len() + pointer.len());
        buffer.push_str(&self.0);
        buffer.push_str(pointer);
        Location(Arc::from(buffer))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The location without its last segment, or `None` at the root.
    pub(crate) fn parent(&self) -> Option<Location> {
        self.0
            .rfind('/')
            .map(|idx| Location::from_escaped(&self.0[..idx]))
    }

    /// Unescaped segments of this location, from the root down.
    pub fn segments(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.0.split('/').skip(1).map(|segment| {
            if segment.contains('~') {
                Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
            } else {
                Cow::Borrowed(segment)
            }
        })
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::new()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({:?})", &*self.0)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Instance location built up on the stack while descending into a document.
///
/// Only materialized into a [`Location`] when an error is reported.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LazyLocation<'a> {
    segment: LocationSegment<'a>,
    parent: Option<&'a LazyLocation<'a>>,
}

impl Default for LazyLocation<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LazyLocation<'a> {
    pub(crate) const fn new() -> Self {
        LazyLocation {
            segment: LocationSegment::Index(0),
            parent: None,
        }
    }

    #[inline]
    pub(crate) fn push<'b>(&'b self, segment: impl Into<LocationSegment<'b>>) -> LazyLocation<'b>
    where
        'a: 'b,
    {
        LazyLocation {
            segment: segment.into(),
            parent: Some(self),
        }
    }
}

impl From<&LazyLocation<'_>> for Location {
    fn from(value: &LazyLocation<'_>) -> Self {
        let mut segments = Vec::new();
        let mut current = value;
        while let Some(parent) = current.parent {
            segments.push(current.segment);
            current = parent;
        }
        let mut buffer = String::new();
        for segment in segments.into_iter().rev() {
            write_escaped(&mut buffer, segment);
        }
        Location(Arc::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::{LazyLocation, Location};

    #[test]
    fn join_escapes_special_characters() {
        let location = Location::new().join("a/b").join("m~n").join(3);
        assert_eq!(location.as_str(), "/a~1b/m~0n/3");
        assert_eq!(
            location.segments().collect::<Vec<_>>(),
            ["a/b", "m~n", "3"]
        );
    }

    #[test]
    fn lazy_location_materializes_in_order() {
        let root = LazyLocation::new();
        let first = root.push("items");
        let second = first.push(2);
        let third = second.push("name");
        assert_eq!(Location::from(&third).as_str(), "/items/2/name");
        assert_eq!(Location::from(&root).as_str(), "");
    }

    #[test]
    fn root_location_has_no_segments() {
        let location = Location::new();
        assert!(location.is_root());
        assert_eq!(location.segments().count(), 0);
        assert!(location.parent().is_none());
    }

    #[test]
    fn parent_drops_last_segment() {
        let location = Location::new().join("definitions").join("a/b");
        let parent = location.parent().expect("Not the root");
        assert_eq!(parent.as_str(), "/definitions");
        assert_eq!(parent.parent().expect("Not the root").as_str(), "");
    }
}

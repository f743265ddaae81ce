//! Field paths
//!
//! A [`Path`] identifies a value inside a configuration document, e.g.
//! `networks.vpc.cloudRouter.name` or `dataVolumes[1].name`.
//!
//! Paths are persistent: `child`, `index` and `key` return a new path that
//! shares its parent with the original. Nothing is ever mutated in place, so
//! the same base path can be handed to independent validation branches.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Name(String),
    Index(usize),
    Key(String),
}

#[derive(Debug, PartialEq, Eq)]
struct Node {
    parent: Option<Path>,
    segment: Segment,
}

/// Persistent field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path(Arc<Node>);

impl Path {
    /// Create a root path with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(Node {
            parent: None,
            segment: Segment::Name(name.into()),
        }))
    }

    /// Create an unnamed root path. Children of it render without a leading dot.
    #[must_use]
    pub fn root() -> Self {
        Self::new("")
    }

    /// Create a path from a dotted list of names, e.g. `["spec", "networking"]`.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(Self::root(), |path, name| path.child(name))
    }

    /// Append a named child.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        self.push(Segment::Name(name.into()))
    }

    /// Append a list index, rendered as `[i]`.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    /// Append a map key, rendered as `[key]`.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.push(Segment::Key(key.into()))
    }

    /// Parent path, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Path> {
        self.0.parent.as_ref()
    }

    fn push(&self, segment: Segment) -> Self {
        Self(Arc::new(Node {
            parent: Some(self.clone()),
            segment,
        }))
    }

    fn segments(&self) -> Vec<&Segment> {
        let mut segments = Vec::new();
        let mut current = Some(self);
        while let Some(path) = current {
            segments.push(&path.0.segment);
            current = path.0.parent.as_ref();
        }
        segments.reverse();
        segments
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();
        for segment in self.segments() {
            match segment {
                Segment::Name(name) if name.is_empty() => {}
                Segment::Name(name) => {
                    if !rendered.is_empty() {
                        rendered.push('.');
                    }
                    rendered.push_str(name);
                }
                Segment::Index(index) => {
                    rendered.push('[');
                    rendered.push_str(&index.to_string());
                    rendered.push(']');
                }
                Segment::Key(key) => {
                    rendered.push('[');
                    rendered.push_str(key);
                    rendered.push(']');
                }
            }
        }
        f.write_str(&rendered)
    }
}

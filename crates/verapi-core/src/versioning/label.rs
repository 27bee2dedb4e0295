//! Version labels and the handler annotation

use crate::handler::Handler;
use crate::request::Request;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized identifier of one API version
///
/// Labels compare and sort by their string form, so `"10"` sorts before
/// `"2"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionLabel(String);

impl VersionLabel {
    /// Label from anything printable, `1` and `"1"` are the same label
    pub fn new(label: impl fmt::Display) -> Self {
        Self(label.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionLabel {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for VersionLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// One entry of a [`VersionTag`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionMark {
    Version(VersionLabel),
    /// Leave the route where it is, under no version prefix
    Unversioned,
}

/// Version annotation of a route
///
/// An empty tag behaves like a missing one: the route falls back to the
/// default version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionTag {
    marks: Vec<VersionMark>,
}

impl VersionTag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag carrying every label of `labels`
    pub fn labels<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: fmt::Display,
    {
        labels.into_iter().fold(Self::new(), Self::label)
    }

    /// Tag carrying only the unversioned marker
    pub fn unversioned_only() -> Self {
        Self::new().unversioned()
    }

    /// Add a label, ignoring duplicates
    pub fn label(self, label: impl fmt::Display) -> Self {
        self.mark(VersionMark::Version(VersionLabel::new(label)))
    }

    /// Add the unversioned marker
    pub fn unversioned(self) -> Self {
        self.mark(VersionMark::Unversioned)
    }

    fn mark(mut self, mark: VersionMark) -> Self {
        if !self.marks.contains(&mark) {
            self.marks.push(mark);
        }
        self
    }

    pub fn marks(&self) -> &[VersionMark] {
        &self.marks
    }

    /// Labels of the tag, markers skipped
    pub fn versions(&self) -> impl Iterator<Item = &VersionLabel> {
        self.marks.iter().filter_map(|mark| match mark {
            VersionMark::Version(label) => Some(label),
            VersionMark::Unversioned => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// Handler carrying a [`VersionTag`]
///
/// Calls are delegated unchanged to the wrapped handler.
#[derive(Debug, Clone)]
pub struct Versioned<H> {
    handler: H,
    tag: VersionTag,
}

impl<H> Versioned<H> {
    pub fn new(handler: H, tag: VersionTag) -> Self {
        Self { handler, tag }
    }

    pub fn tag(&self) -> &VersionTag {
        &self.tag
    }

    pub fn into_inner(self) -> H {
        self.handler
    }
}

impl<H, T> Handler<T> for Versioned<H>
where
    H: Handler<T>,
{
    type Future = H::Future;

    fn call(self, req: Request) -> Self::Future {
        self.handler.call(req)
    }

    fn version_tag(&self) -> Option<VersionTag> {
        Some(self.tag.clone())
    }

    fn name(&self) -> &'static str {
        self.handler.name()
    }
}

/// Serve `handler` under each of `labels`
///
/// ```rust,ignore
/// Router::new()
///     .route("/cookies", get(version([1, 2], list_cookies)))
///     .route("/cookies/{id}", get(version(["1"], get_cookie)));
/// ```
pub fn version<I, L, H>(labels: I, handler: H) -> Versioned<H>
where
    I: IntoIterator<Item = L>,
    L: fmt::Display,
{
    Versioned::new(handler, VersionTag::labels(labels))
}

/// Keep `handler` out of versioning: it stays at its original path and is
/// left out of every per-version document
pub fn unversioned<H>(handler: H) -> Versioned<H> {
    Versioned::new(handler, VersionTag::unversioned_only())
}

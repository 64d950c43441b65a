//! Parameter namespace mount points.
//!
//! The parameter tree itself (storage, serialization, remote access) lives
//! outside this workspace. Drivers only need a stable, uniquely named mount
//! point under which their tunables will appear, e.g.
//! `/actuator/left-wheel`.

/// Node of the parameter tree, identified by its absolute path.
///
/// Cloning is cheap enough for startup code; namespaces are created once and
/// never renamed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterNamespace {
    path: String,
}

impl ParameterNamespace {
    /// The tree root, `/`.
    pub fn root() -> Self {
        Self {
            path: String::from("/"),
        }
    }

    /// Child namespace `name` mounted under `self`.
    ///
    /// `name` must be non-empty and free of `/`, which a
    /// [`MotorId`](crate::motor::MotorId) always is.
    pub fn child(&self, name: &str) -> Self {
        debug_assert!(!name.is_empty() && !name.contains('/'), "invalid namespace {name:?}");
        let path = if self.path == "/" {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.path)
        };
        Self { path }
    }

    /// Absolute path of this namespace.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment (`""` for the root).
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// Whether `self` is `other` or mounted somewhere below it.
    pub fn is_within(&self, other: &Self) -> bool {
        other.path == "/"
            || self.path == other.path
            || self
                .path
                .strip_prefix(other.path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl std::fmt::Display for ParameterNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

//! # Opaque handle to a launched child process.
//!
//! [`ChildHandle`] identifies one supervised child. Two handles compare equal
//! iff they refer to the same OS process identity, and the default handle is
//! *invalid*: it represents "no child" and never matches a live process.
//!
//! The handle deliberately carries no back-reference to the registry and no
//! kill/wait behavior of its own. Ownership of the process lifetime is
//! explicit: only the registry's owner (the watch loop) may initiate kills,
//! so dropping a handle copy never signals anything.

/// Identity of a launched child process.
///
/// A plain value type: cheap to copy, compared by pid. The default value is
/// the invalid "no child" handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildHandle {
    pid: Option<u32>,
}

impl ChildHandle {
    /// Creates a handle for a live pid.
    pub fn from_pid(pid: u32) -> Self {
        Self { pid: Some(pid) }
    }

    /// Creates the invalid "no child" handle (same as `Default`).
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Whether this handle refers to a launched child at all.
    pub fn is_valid(&self) -> bool {
        self.pid.is_some()
    }

    /// The OS pid, if the handle is valid.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handle_is_invalid() {
        let h = ChildHandle::default();
        assert!(!h.is_valid());
        assert_eq!(h.pid(), None);
        assert_eq!(h, ChildHandle::invalid());
    }

    #[test]
    fn equality_follows_process_identity() {
        assert_eq!(ChildHandle::from_pid(7), ChildHandle::from_pid(7));
        assert_ne!(ChildHandle::from_pid(7), ChildHandle::from_pid(8));
        assert_ne!(ChildHandle::from_pid(7), ChildHandle::invalid());
    }
}

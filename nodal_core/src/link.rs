//! Primitive link operations on a container handle.
//!
//! Each function makes one engine call and translates its fault into a
//! typed [`Error`]. [`link_exists`] is the only probe: it runs with engine
//! error reporting silenced, so a missing link leaves no trace in the
//! engine's diagnostics.

use crate::engine::RawLinkType;
use crate::error::{Error, ErrorKind, Result};
use crate::handle::{Handle, ObjectKind};
use crate::path;
use crate::props::{LinkAccessProps, LinkCreateProps};
use crate::silence::SilenceReports;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Classified link type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    Hard,
    Soft,
    External,
    /// A user-defined link class.
    Other,
}

impl LinkKind {
    /// Get the string name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Hard => "hard",
            LinkKind::Soft => "soft",
            LinkKind::External => "external",
            LinkKind::Other => "other",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the final link of `path` exists under `container`.
///
/// A missing final segment is `Ok(false)`. Anything the engine refuses,
/// including a missing intermediate group, is a [`ErrorKind::Link`] error.
/// `/` always exists, but the engine is still asked so that a broken
/// container handle is reported.
pub fn link_exists(container: &Handle, path: &str) -> Result<bool> {
    let engine = container.engine();
    let found = {
        let _silence = SilenceReports::new(engine.as_ref());
        engine.link_exists(container.id(), path, &LinkAccessProps::default())
    }
    .map_err(|f| {
        Error::from_fault(
            ErrorKind::Link,
            format!("Invalid link for exist() \"{}\"", path),
            f,
        )
    })?;
    trace!(path, found, "probed link");
    Ok(path::is_root(path) || found)
}

/// Create a hard link `name` to the object behind `target`.
///
/// Attributes are not objects in the link graph and are rejected before
/// the engine is consulted.
pub fn create_hard_link(
    container: &Handle,
    name: &str,
    target: &Handle,
    lcpl: &LinkCreateProps,
    lapl: &LinkAccessProps,
) -> Result<()> {
    if target.kind() == ObjectKind::Attribute {
        return Err(Error::link(format!(
            "Cannot create hard link \"{}\": attributes cannot be link targets",
            name
        )));
    }
    container
        .engine()
        .link_create_hard(target.id(), ".", container.id(), name, lcpl, lapl)
        .map_err(|f| {
            Error::from_fault(
                ErrorKind::Link,
                format!("Unable to create hard link \"{}\"", name),
                f,
            )
        })?;
    debug!(name, target = %target.id(), "created hard link");
    Ok(())
}

/// Create a soft link `name` pointing at `target_path`. The target is not
/// checked.
pub fn create_soft_link(
    container: &Handle,
    name: &str,
    target_path: &str,
    lcpl: &LinkCreateProps,
    lapl: &LinkAccessProps,
) -> Result<()> {
    container
        .engine()
        .link_create_soft(target_path, container.id(), name, lcpl, lapl)
        .map_err(|f| {
            Error::from_fault(
                ErrorKind::Link,
                format!("Unable to create soft link \"{}\" -> \"{}\"", name, target_path),
                f,
            )
        })?;
    debug!(name, target = target_path, "created soft link");
    Ok(())
}

/// Create an external link `name` pointing at `obj_path` inside the file
/// `file_name`. Neither is checked.
pub fn create_external_link(
    container: &Handle,
    name: &str,
    file_name: &str,
    obj_path: &str,
    lcpl: &LinkCreateProps,
    lapl: &LinkAccessProps,
) -> Result<()> {
    container
        .engine()
        .link_create_external(file_name, obj_path, container.id(), name, lcpl, lapl)
        .map_err(|f| {
            Error::from_fault(
                ErrorKind::Link,
                format!(
                    "Unable to create external link \"{}\" -> \"{}:{}\"",
                    name, file_name, obj_path
                ),
                f,
            )
        })?;
    debug!(name, file = file_name, target = obj_path, "created external link");
    Ok(())
}

/// Remove the link at `path`.
pub fn delete_link(container: &Handle, path: &str) -> Result<()> {
    container
        .engine()
        .link_delete(container.id(), path, &LinkAccessProps::default())
        .map_err(|f| {
            Error::from_fault(
                ErrorKind::Link,
                format!("Unable to delete link \"{}\"", path),
                f,
            )
        })?;
    debug!(path, "deleted link");
    Ok(())
}

/// Move the link at `src` to `dst`, both relative to `container`.
pub fn move_link(container: &Handle, src: &str, dst: &str, lcpl: &LinkCreateProps) -> Result<()> {
    container
        .engine()
        .link_move(
            container.id(),
            src,
            container.id(),
            dst,
            lcpl,
            &LinkAccessProps::default(),
        )
        .map_err(|f| {
            Error::from_fault(
                ErrorKind::Link,
                format!("Unable to move link \"{}\" to \"{}\"", src, dst),
                f,
            )
        })?;
    debug!(src, dst, "moved link");
    Ok(())
}

/// Type of the link at `path`. The link itself is not followed.
pub fn link_kind(container: &Handle, path: &str) -> Result<LinkKind> {
    let info = container
        .engine()
        .link_info(container.id(), path, &LinkAccessProps::default())
        .map_err(|f| {
            Error::from_fault(
                ErrorKind::Link,
                format!("Unable to get link info for \"{}\"", path),
                f,
            )
        })?;
    link_kind_from_raw(path, info.link_type)
}

pub(crate) fn link_kind_from_raw(path: &str, raw: RawLinkType) -> Result<LinkKind> {
    match raw {
        RawLinkType::Hard => Ok(LinkKind::Hard),
        RawLinkType::Soft => Ok(LinkKind::Soft),
        RawLinkType::External => Ok(LinkKind::External),
        RawLinkType::UserDefined(_) => Ok(LinkKind::Other),
        RawLinkType::Error => Err(Error::fail(
            ErrorKind::InvalidLinkType,
            format!("Link type of \"{}\" is the error sentinel", path),
        )),
    }
}

/// Kind of the object `path` resolves to, following links.
///
/// The object is opened only for the query and closed again before
/// returning.
pub fn object_kind(container: &Handle, path: &str) -> Result<ObjectKind> {
    let engine = container.engine();
    let id = engine
        .object_open(container.id(), path, &LinkAccessProps::default())
        .map_err(|f| Error::from_open_fault(format!("Unable to open object \"{}\"", path), f))?;
    let probe = Handle::adopt(Arc::clone(engine), id)?;
    Ok(probe.kind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::handle::SharedEngine;
    use crate::memory::MemoryEngine;
    use crate::props::GroupCreateProps;

    struct Fixture {
        memory: Arc<MemoryEngine>,
        root: Handle,
    }

    fn fixture() -> Fixture {
        let memory = Arc::new(MemoryEngine::new());
        let engine: SharedEngine = memory.clone();
        let id = engine
            .file_create("links.h5", false, &GroupCreateProps::default())
            .unwrap();
        let root = Handle::adopt(engine, id).unwrap();
        Fixture { memory, root }
    }

    impl Fixture {
        fn group(&self, path: &str) -> Handle {
            let id = self
                .root
                .engine()
                .group_create(
                    self.root.id(),
                    path,
                    &LinkCreateProps::default(),
                    &GroupCreateProps::default(),
                )
                .unwrap();
            Handle::adopt(Arc::clone(self.root.engine()), id).unwrap()
        }
    }

    #[test]
    fn test_probe_leaves_no_diagnostics() {
        let fx = fixture();
        assert!(!link_exists(&fx.root, "missing").unwrap());
        let err = link_exists(&fx.root, "missing/child").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Link);
        assert!(err.to_string().contains("Invalid link for exist()"));
        assert!(fx.memory.diagnostics().is_empty());
        assert!(fx.memory.reporting_enabled());
    }

    #[test]
    fn test_root_always_exists() {
        let fx = fixture();
        assert!(link_exists(&fx.root, "/").unwrap());
    }

    #[test]
    fn test_hard_link_rejects_attribute_target() {
        let fx = fixture();
        let engine = fx.root.engine();
        let ty = engine
            .type_create(&crate::types::TypeDescriptor::Boolean)
            .unwrap();
        let space = engine.space_create(&[]).unwrap();
        let attr_id = engine.attribute_create(fx.root.id(), "flag", ty, space).unwrap();
        let attr = Handle::adopt(Arc::clone(engine), attr_id).unwrap();
        engine.close(ty).unwrap();
        engine.close(space).unwrap();

        let err = create_hard_link(
            &fx.root,
            "alias",
            &attr,
            &LinkCreateProps::default(),
            &LinkAccessProps::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Link);
        assert!(!link_exists(&fx.root, "alias").unwrap());
    }

    #[test]
    fn test_hard_link_shares_object() {
        let fx = fixture();
        let g = fx.group("g");
        create_hard_link(
            &fx.root,
            "h",
            &g,
            &LinkCreateProps::default(),
            &LinkAccessProps::default(),
        )
        .unwrap();
        drop(g);
        delete_link(&fx.root, "g").unwrap();
        assert_eq!(object_kind(&fx.root, "h").unwrap(), ObjectKind::Group);
        assert_eq!(link_kind(&fx.root, "h").unwrap(), LinkKind::Hard);
    }

    #[test]
    fn test_dangling_soft_link_then_resolved() {
        let fx = fixture();
        create_soft_link(
            &fx.root,
            "later",
            "/target",
            &LinkCreateProps::default(),
            &LinkAccessProps::default(),
        )
        .unwrap();
        assert!(link_exists(&fx.root, "later").unwrap());
        assert_eq!(link_kind(&fx.root, "later").unwrap(), LinkKind::Soft);

        let err = object_kind(&fx.root, "later").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectNotFound);

        fx.group("target");
        assert_eq!(object_kind(&fx.root, "later").unwrap(), ObjectKind::Group);
    }

    #[test]
    fn test_external_link_kind() {
        let fx = fixture();
        create_external_link(
            &fx.root,
            "ext",
            "elsewhere.h5",
            "/data",
            &LinkCreateProps::default(),
            &LinkAccessProps::default(),
        )
        .unwrap();
        assert_eq!(link_kind(&fx.root, "ext").unwrap(), LinkKind::External);
        let err = object_kind(&fx.root, "ext").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectNotFound);
    }

    #[test]
    fn test_object_kind_closes_probe() {
        let fx = fixture();
        drop(fx.group("g"));
        let before = fx.memory.open_handles();
        assert_eq!(object_kind(&fx.root, "g").unwrap(), ObjectKind::Group);
        assert_eq!(fx.memory.open_handles(), before);
    }

    #[test]
    fn test_move_and_delete() {
        let fx = fixture();
        drop(fx.group("a"));
        move_link(&fx.root, "a", "b", &LinkCreateProps::default()).unwrap();
        assert!(!link_exists(&fx.root, "a").unwrap());
        assert!(link_exists(&fx.root, "b").unwrap());

        let err = delete_link(&fx.root, "a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Link);
    }

    #[test]
    fn test_link_kind_translation() {
        assert_eq!(
            link_kind_from_raw("x", RawLinkType::UserDefined(64)).unwrap(),
            LinkKind::Other
        );
        let err = link_kind_from_raw("x", RawLinkType::Error).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLinkType);
        assert!(err.to_string().contains("\"x\""));
    }
}

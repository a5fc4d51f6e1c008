//! Adapter from the engine's link callback to a list of names.

use crate::engine::{IndexType, IterControl, IterOrder, LinkInfo, LinkVisitor};
use crate::error::{Error, ErrorKind, Result};
use crate::handle::Handle;

/// Collects link names in the order the engine visits them.
///
/// Borrows the output vector, so it cannot outlive the traversal it is
/// passed to.
pub struct NameCollector<'a> {
    names: &'a mut Vec<String>,
}

impl<'a> NameCollector<'a> {
    pub fn new(names: &'a mut Vec<String>) -> Self {
        Self { names }
    }
}

impl LinkVisitor for NameCollector<'_> {
    fn visit(&mut self, name: &str, _info: &LinkInfo) -> IterControl {
        self.names.push(name.to_string());
        IterControl::Continue
    }
}

/// Names of the links directly under `container`, in increasing `index`
/// order. `hint` pre-sizes the result.
pub(crate) fn collect_names(container: &Handle, index: IndexType, hint: usize) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(hint);
    let mut collector = NameCollector::new(&mut names);
    container
        .engine()
        .link_iterate(container.id(), index, IterOrder::Increasing, 0, &mut collector)
        .map_err(|f| Error::from_fault(ErrorKind::Resource, "Unable to list objects in group", f))?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RawLinkType;
    use crate::props::CharEncoding;

    fn info() -> LinkInfo {
        LinkInfo {
            link_type: RawLinkType::Hard,
            creation_order: None,
            char_encoding: CharEncoding::Ascii,
            value_size: 0,
        }
    }

    #[test]
    fn test_collector_appends_in_visit_order() {
        let mut names = vec!["existing".to_string()];
        let mut collector = NameCollector::new(&mut names);
        for name in ["b", "a"] {
            assert_eq!(collector.visit(name, &info()), IterControl::Continue);
        }
        assert_eq!(names, vec!["existing", "b", "a"]);
    }
}

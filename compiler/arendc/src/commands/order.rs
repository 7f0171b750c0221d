//! `arend order`: the order definitions are checked in.

use std::fmt;

use arend_ir::{DefId, ModulePath};
use arend_resolve::Workspace;
use arend_typeck::{components, SnapshotSource};

use crate::server::{ArendServer, ServerError};

/// One strongly connected component, members by qualified name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderedComponent {
    pub members: Vec<String>,
    /// More than one member, or a member that refers to itself.
    pub recursive: bool,
}

impl fmt::Display for OrderedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.members.join(" "))?;
        if self.members.len() > 1 {
            write!(f, "  (mutual)")?;
        } else if self.recursive {
            write!(f, "  (recursive)")?;
        }
        Ok(())
    }
}

/// Components of `modules` and everything they use, dependencies first.
pub fn dependency_order(
    server: &ArendServer,
    modules: &[ModulePath],
) -> Result<Vec<OrderedComponent>, ServerError> {
    let workspace = server.snapshot();
    if let Some(missing) = modules.iter().find(|path| workspace.module(path).is_none()) {
        return Err(ServerError::UnknownModule(missing.clone()));
    }
    let units = workspace.units_of(modules);
    let ordered = components(&units, |unit| {
        workspace
            .unit_deps(unit)
            .iter()
            .copied()
            .filter(|dep| workspace.defs().is_live(*dep))
            .collect::<Vec<_>>()
    });
    Ok(ordered
        .into_iter()
        .map(|component| OrderedComponent {
            recursive: component.len() > 1
                || component
                    .iter()
                    .any(|unit| workspace.unit_deps(*unit).contains(unit)),
            members: component
                .iter()
                .map(|unit| qualified_name(&workspace, *unit))
                .collect(),
        })
        .collect())
}

fn qualified_name(workspace: &Workspace, id: DefId) -> String {
    match workspace.def_info(id) {
        Some(info) => format!("{}.{}", info.module, info.long_name),
        None => format!("#{}", id.raw()),
    }
}

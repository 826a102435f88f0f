//! Action planning: declared resources against the state file
//!
//! Pure; nothing here touches the store. Drift made outside mzconverge is
//! picked up by `refresh`, which rewrites the state the planner reads.

use crate::resource::{Address, Definition, DesiredResource};
use crate::state::{ConvergeState, TrackedResource};

/// One step of an apply
#[derive(Debug)]
pub enum Action<'a> {
    /// Create the object or issue the grant
    Create(&'a DesiredResource),
    /// Reconcile name, definition, owner and comment in place
    Update {
        resource: &'a DesiredResource,
        content_changed: bool,
    },
    /// Drop and recreate; the definition cannot change in place
    Replace(&'a DesiredResource),
    /// Revoke the old grant, issue the new one
    Regrant(&'a DesiredResource),
    /// Drop the object or revoke the grant; it left the manifest
    Delete {
        address: Address,
        tracked: TrackedResource,
    },
}

impl Action<'_> {
    pub fn address(&self) -> &Address {
        match self {
            Self::Create(resource)
            | Self::Update { resource, .. }
            | Self::Replace(resource)
            | Self::Regrant(resource) => &resource.address,
            Self::Delete { address, .. } => address,
        }
    }
}

/// Ordered actions for one apply
#[derive(Debug, Default)]
pub struct Plan<'a> {
    pub actions: Vec<Action<'a>>,
}

impl Plan<'_> {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

/// An unset owner leaves whatever the store has; an unset comment clears it.
fn differs(resource: &DesiredResource, tracked: &TrackedResource) -> bool {
    let owner_differs = resource
        .definition
        .ownership_role()
        .is_some_and(|role| Some(role) != tracked.ownership_role.as_deref());
    resource.definition.qualified_name() != tracked.qualified_name
        || owner_differs
        || resource.definition.comment() != tracked.comment.as_deref()
}

/// Compute what an apply has to do.
///
/// Removals come first, dependents before their dependencies (grants, then
/// connections, then secrets). Everything declared follows in dependency
/// order, which `desired` is already sorted in.
pub fn plan<'a>(desired: &'a [DesiredResource], state: &ConvergeState) -> Plan<'a> {
    let mut actions: Vec<Action<'a>> = state
        .resources
        .iter()
        .rev()
        .filter(|(address, _)| !desired.iter().any(|r| &r.address == *address))
        .map(|(address, tracked)| Action::Delete {
            address: address.clone(),
            tracked: tracked.clone(),
        })
        .collect();

    for resource in desired {
        let Some(tracked) = state.get(&resource.address) else {
            actions.push(Action::Create(resource));
            continue;
        };

        let content_changed = resource.fingerprint != tracked.fingerprint;
        match &resource.definition {
            Definition::Grant(_) => {
                if content_changed {
                    actions.push(Action::Regrant(resource));
                }
            }
            definition if content_changed && !definition.alters_in_place() => {
                actions.push(Action::Replace(resource));
            }
            _ if content_changed || differs(resource, tracked) => {
                actions.push(Action::Update {
                    resource,
                    content_changed,
                });
            }
            _ => log::debug!("{} is up to date", resource.address),
        }
    }

    Plan { actions }
}

/// Every tracked resource, removed in reverse dependency order
pub fn destroy_plan(state: &ConvergeState) -> Plan<'static> {
    Plan {
        actions: state
            .resources
            .iter()
            .rev()
            .map(|(address, tracked)| Action::Delete {
                address: address.clone(),
                tracked: tracked.clone(),
            })
            .collect(),
    }
}

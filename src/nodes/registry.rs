//! Per-process node identity map
//!
//! Every widget receives a handle to the same registry and records which ports
//! it owns. The canvas uses it to find the widget behind a port id, and node
//! creation uses it to keep ids unique while a port is alive.

use super::ids::{PortId, WidgetId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Maps live port ids to their owning widget
#[derive(Debug, Default)]
pub struct NodeRegistry {
    owners: HashMap<PortId, WidgetId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `port` as owned by `widget`; returns false if the id is already live
    pub fn register(&mut self, port: PortId, widget: WidgetId) -> bool {
        if self.owners.contains_key(&port) {
            return false;
        }
        self.owners.insert(port, widget);
        true
    }

    pub fn unregister(&mut self, port: &PortId) -> Option<WidgetId> {
        self.owners.remove(port)
    }

    pub fn owner(&self, port: &PortId) -> Option<&WidgetId> {
        self.owners.get(port)
    }

    pub fn contains(&self, port: &PortId) -> bool {
        self.owners.contains_key(port)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Shared handle injected into every widget
///
/// All mutation happens on the UI thread, so a `RefCell` is enough. Borrows are
/// never held across calls.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistryHandle(Rc<RefCell<NodeRegistry>>);

impl NodeRegistryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, port: PortId, widget: WidgetId) -> bool {
        self.0.borrow_mut().register(port, widget)
    }

    pub fn unregister(&self, port: &PortId) -> Option<WidgetId> {
        self.0.borrow_mut().unregister(port)
    }

    pub fn owner(&self, port: &PortId) -> Option<WidgetId> {
        self.0.borrow().owner(port).cloned()
    }

    pub fn contains(&self, port: &PortId) -> bool {
        self.0.borrow().contains(port)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

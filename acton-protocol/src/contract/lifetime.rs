/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::contract::ActorInstance;
use crate::ir::{ClassIr, LoweredProtocol, MethodKind, Role};

/// Identifies one actor of an [`ActorTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    /// The raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a lifetime operation was refused.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifetimeError {
    #[error("no actor {0}")]
    UnknownActor(ActorId),

    #[error("protocol `{0}` was never registered")]
    UnknownProtocol(String),

    #[error("actor {id} is dead")]
    Dead { id: ActorId },

    #[error("`{manager}` does not manage `{protocol}`")]
    NotManaged { manager: String, protocol: String },
}

#[derive(Debug, Clone)]
struct Node {
    actor: ActorInstance,
    manager: Option<ActorId>,
    managed: IndexSet<ActorId>,
}

/// Manager and managed actor lifetimes.
///
/// A manager owns every actor it constructs. Destroying it destroys all of its
/// live managed actors first, depth-first, each exactly once. Destroyed actors
/// leave the tree; only their ids are remembered.
#[derive(Debug, Clone, Default)]
pub struct ActorTree {
    classes: IndexMap<String, [Arc<ClassIr>; 2]>,
    nodes: IndexMap<ActorId, Node>,
    destroyed: IndexSet<ActorId>,
    next_id: u64,
}

impl ActorTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the classes of `protocol` available to spawn and construct.
    pub fn register(&mut self, protocol: &LoweredProtocol) {
        let classes = [
            Arc::new(protocol.parent().clone()),
            Arc::new(protocol.child().clone()),
        ];
        self.classes.insert(protocol.protocol.clone(), classes);
    }

    fn class(&self, protocol: &str, role: Role) -> Result<Arc<ClassIr>, LifetimeError> {
        self.classes
            .get(protocol)
            .map(|classes| Arc::clone(&classes[role.index()]))
            .ok_or_else(|| LifetimeError::UnknownProtocol(protocol.to_string()))
    }

    fn insert(&mut self, class: Arc<ClassIr>, manager: Option<ActorId>) -> ActorId {
        self.next_id += 1;
        let id = ActorId(self.next_id);
        self.nodes.insert(
            id,
            Node {
                actor: ActorInstance::new(class),
                manager,
                managed: IndexSet::new(),
            },
        );
        id
    }

    fn node(&self, id: ActorId) -> Result<&Node, LifetimeError> {
        match self.nodes.get(&id) {
            Some(node) => Ok(node),
            None if self.destroyed.contains(&id) => Err(LifetimeError::Dead { id }),
            None => Err(LifetimeError::UnknownActor(id)),
        }
    }

    /// Spawns an actor without a manager.
    pub fn spawn_root(&mut self, protocol: &str, role: Role) -> Result<ActorId, LifetimeError> {
        let class = self.class(protocol, role)?;
        let id = self.insert(class, None);
        debug!(%id, protocol, role = %role, "spawned root actor");
        Ok(id)
    }

    /// Constructs an actor of `protocol` owned by `manager`, on the manager's side.
    ///
    /// The manager's class must declare the matching construct stub.
    pub fn construct(&mut self, manager: ActorId, protocol: &str) -> Result<ActorId, LifetimeError> {
        let node = self.node(manager)?;
        if node.actor.is_dead() {
            return Err(LifetimeError::Dead { id: manager });
        }
        let manager_class = node.actor.class();
        let class = self.class(protocol, manager_class.role)?;
        let managed_name = class.qualified_name();
        let declared = manager_class.methods.iter().any(|m| {
            m.kind == MethodKind::Construct && m.managed.as_deref() == Some(managed_name.as_str())
        });
        if !declared {
            return Err(LifetimeError::NotManaged {
                manager: manager_class.qualified_name(),
                protocol: protocol.to_string(),
            });
        }

        let id = self.insert(class, Some(manager));
        if let Some(node) = self.nodes.get_mut(&manager) {
            node.managed.insert(id);
        }
        debug!(%id, %manager, protocol, "constructed managed actor");
        Ok(id)
    }

    /// Destroys `id` and every live actor it manages, returning the destroyed
    /// ids managed actors first.
    ///
    /// Destroying an actor that is already dead destroys nothing.
    #[instrument(skip(self), level = "debug")]
    pub fn destroy(&mut self, id: ActorId) -> Result<Vec<ActorId>, LifetimeError> {
        if self.destroyed.contains(&id) {
            trace!("already destroyed");
            return Ok(Vec::new());
        }
        let manager = self.node(id)?.manager;
        let mut destroyed = Vec::new();
        self.destroy_subtree(id, &mut destroyed);
        if let Some(node) = manager.and_then(|m| self.nodes.get_mut(&m)) {
            node.managed.shift_remove(&id);
        }
        debug!(count = destroyed.len(), remaining = self.nodes.len(), "destroyed actors");
        Ok(destroyed)
    }

    fn destroy_subtree(&mut self, id: ActorId, destroyed: &mut Vec<ActorId>) {
        let managed: Vec<ActorId> = match self.nodes.get(&id) {
            Some(node) => node.managed.iter().copied().collect(),
            None => return,
        };
        for child in managed {
            self.destroy_subtree(child, destroyed);
        }
        if let Some(mut node) = self.nodes.shift_remove(&id) {
            if node.actor.destroy() {
                destroyed.push(id);
            }
            self.destroyed.insert(id);
        }
    }

    /// The actor behind `id`, `None` once it has been destroyed.
    pub fn actor(&self, id: ActorId) -> Option<&ActorInstance> {
        self.nodes.get(&id).map(|node| &node.actor)
    }

    /// Mutable access to the actor behind `id`, to fire its stubs.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorInstance> {
        self.nodes.get_mut(&id).map(|node| &mut node.actor)
    }

    /// Returns `true` if `id` exists and is not dead.
    pub fn is_alive(&self, id: ActorId) -> bool {
        self.actor(id).is_some_and(|actor| !actor.is_dead())
    }

    /// The manager of `id`.
    pub fn manager(&self, id: ActorId) -> Option<ActorId> {
        self.nodes.get(&id).and_then(|node| node.manager)
    }

    /// Live actors managed by `id`, in construction order.
    pub fn managed(&self, id: ActorId) -> Vec<ActorId> {
        self.nodes
            .get(&id)
            .map(|node| {
                node.managed
                    .iter()
                    .copied()
                    .filter(|child| self.is_alive(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of live actors.
    pub fn live_count(&self) -> usize {
        self.nodes.values().filter(|node| !node.actor.is_dead()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Direction, Loc, ManagerStmt, ManagesStmt, MessageDecl, Program, Protocol, ProtocolInclude, TranslationUnit};
    use crate::common::{CompilerConfig, ProtocolCompiler};

    fn tree() -> anyhow::Result<ActorTree> {
        let mut manager = Protocol::new(Loc::new("PM.ipdl", 1), "PM");
        manager.add_manages([ManagesStmt::new(Loc::new("PM.ipdl", 2), "PC")]);
        manager.add_messages([MessageDecl::new(Loc::new("PM.ipdl", 3), "Hi", Direction::Out)]);
        let mut m_unit = TranslationUnit::new("PM.ipdl", manager);
        m_unit.add_protocol_include(ProtocolInclude::new(Loc::new("PM.ipdl", 1), "PC.ipdl"));

        let mut managed = Protocol::new(Loc::new("PC.ipdl", 1), "PC");
        managed.set_manager(ManagerStmt::new(Loc::new("PC.ipdl", 2), "PM"));
        managed.add_messages([MessageDecl::new(Loc::new("PC.ipdl", 3), "Yo", Direction::In)]);
        let c_unit = TranslationUnit::new("PC.ipdl", managed);

        let program = Program::new().with_unit(m_unit).with_unit(c_unit);
        let output = ProtocolCompiler::new(CompilerConfig::default()).compile(&program);
        anyhow::ensure!(output.ok(), "compile failed: {:?}", output.failed);

        let mut tree = ActorTree::new();
        for protocol in &output.lowered {
            tree.register(protocol);
        }
        Ok(tree)
    }

    #[test]
    fn destroying_the_manager_cascades_once() -> anyhow::Result<()> {
        let mut tree = tree()?;
        let m = tree.spawn_root("PM", Role::Parent)?;
        let c1 = tree.construct(m, "PC")?;
        let c2 = tree.construct(m, "PC")?;
        assert_eq!(tree.managed(m), vec![c1, c2]);

        assert_eq!(tree.destroy(c1)?, vec![c1]);
        assert_eq!(tree.managed(m), vec![c2]);
        assert_eq!(tree.destroy(m)?, vec![c2, m]);
        assert!(tree.destroy(c2)?.is_empty());
        assert_eq!(tree.live_count(), 0);
        Ok(())
    }

    #[test]
    fn destroyed_actors_leave_the_tree() -> anyhow::Result<()> {
        let mut tree = tree()?;
        let m = tree.spawn_root("PM", Role::Parent)?;
        for _ in 0..3 {
            let c = tree.construct(m, "PC")?;
            tree.destroy(c)?;
            assert!(tree.actor(c).is_none());
            assert!(tree.destroy(c)?.is_empty());
        }
        assert!(tree.managed(m).is_empty());
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes.get(&m).map(|node| node.managed.len()), Some(0));

        tree.destroy(m)?;
        assert!(tree.nodes.is_empty());
        assert_eq!(tree.destroyed.len(), 4);
        Ok(())
    }

    #[test]
    fn managed_protocol_cannot_construct_its_manager() -> anyhow::Result<()> {
        let mut tree = tree()?;
        let m = tree.spawn_root("PM", Role::Child)?;
        let c = tree.construct(m, "PC")?;
        assert_eq!(tree.manager(c), Some(m));
        assert!(matches!(
            tree.construct(c, "PM"),
            Err(LifetimeError::NotManaged { .. })
        ));
        assert_eq!(
            tree.construct(m, "PNope"),
            Err(LifetimeError::UnknownProtocol("PNope".into()))
        );
        Ok(())
    }

    #[test]
    fn dead_manager_constructs_nothing() -> anyhow::Result<()> {
        let mut tree = tree()?;
        let m = tree.spawn_root("PM", Role::Parent)?;
        tree.destroy(m)?;
        assert_eq!(tree.construct(m, "PC"), Err(LifetimeError::Dead { id: m }));
        Ok(())
    }
}

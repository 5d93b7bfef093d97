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

use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::ast::Trigger;
use crate::contract::ProtocolFault;
use crate::ir::{ClassIr, MethodIr, Role};

/// One live endpoint of a protocol, running the guards of its class.
#[derive(Debug, Clone)]
pub struct ActorInstance {
    class: Arc<ClassIr>,
    state: String,
}

impl ActorInstance {
    /// A fresh actor in its class's start state.
    pub fn new(class: Arc<ClassIr>) -> Self {
        let state = class.states.start.clone();
        trace!(class = %class.name, state = %state, "actor created");
        Self { class, state }
    }

    /// The class this actor instantiates.
    pub fn class(&self) -> &ClassIr {
        &self.class
    }

    /// The end of the channel this actor implements.
    pub fn role(&self) -> Role {
        self.class.role
    }

    /// Current protocol state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns `true` once the actor was closed or destroyed.
    pub fn is_dead(&self) -> bool {
        self.state == self.class.states.dead
    }

    /// Returns `true` once the actor hit a protocol fault.
    pub fn is_failed(&self) -> bool {
        self.state == self.class.states.error
    }

    /// The concrete stub sending `message`.
    pub fn outbound(&self, message: &str) -> Result<&MethodIr, ProtocolFault> {
        self.find_stub(message, false)
    }

    /// The handler receiving `message`.
    pub fn inbound(&self, message: &str) -> Result<&MethodIr, ProtocolFault> {
        self.find_stub(message, true)
    }

    fn find_stub(&self, message: &str, handler: bool) -> Result<&MethodIr, ProtocolFault> {
        self.class
            .stubs()
            .find(|m| m.is_virtual == handler && m.message.as_deref() == Some(message))
            .ok_or_else(|| ProtocolFault::UnknownMessage {
                role: self.class.role,
                message: message.to_string(),
            })
    }

    /// Runs the guard of the stub firing `(trigger, message)`.
    ///
    /// On success the actor has entered the transition's target state, which is
    /// returned. On failure the state is left untouched; the caller decides how
    /// to tear down.
    pub fn fire(&mut self, trigger: Trigger, message: &str) -> Result<&str, ProtocolFault> {
        let stub = self
            .class
            .stub(trigger, message)
            .ok_or_else(|| ProtocolFault::UnknownMessage {
                role: self.class.role,
                message: message.to_string(),
            })?;
        let target = stub.guard.as_ref().and_then(|guard| guard.target(&self.state));
        match target {
            Some(to) => {
                trace!(
                    class = %self.class.name,
                    from = %self.state,
                    to,
                    trigger = %trigger,
                    message,
                    "guard passed"
                );
                self.state = to.to_string();
                Ok(self.state.as_str())
            }
            None => {
                error!(
                    class = %self.class.name,
                    state = %self.state,
                    trigger = %trigger,
                    message,
                    "protocol violation"
                );
                Err(ProtocolFault::ProtocolViolation {
                    state: self.state.clone(),
                    trigger,
                    message: message.to_string(),
                })
            }
        }
    }

    /// Moves the actor to the error state.
    pub fn fail(&mut self) {
        if !self.is_failed() {
            debug!(class = %self.class.name, state = %self.state, "actor failed");
            self.state = self.class.states.error.clone();
        }
    }

    /// Moves the actor to the dead state; `false` if it already was dead.
    pub fn destroy(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        debug!(class = %self.class.name, state = %self.state, "actor destroyed");
        self.state = self.class.states.dead.clone();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{GuardEdge, GuardIr, MethodKind, StateEnumIr};

    fn class() -> Arc<ClassIr> {
        let guard = GuardIr::new(
            Trigger::Send,
            "Open".into(),
            vec![GuardEdge::new("START".into(), "OPEN".into())],
        );
        Arc::new(ClassIr {
            name: "PParent".into(),
            protocol: "P".into(),
            namespaces: Vec::new(),
            role: Role::Parent,
            fields: Vec::new(),
            states: StateEnumIr::new(
                vec!["START".into(), "OPEN".into(), "__Dead".into(), "__Error".into()],
                "START".into(),
                "__Dead".into(),
                "__Error".into(),
            ),
            transitions: Vec::new(),
            methods: vec![MethodIr {
                name: "SendOpen".into(),
                kind: MethodKind::Send,
                message: Some("Open".into()),
                id: Some(1),
                reply_id: None,
                semantics: None,
                params: Vec::new(),
                returns: Vec::new(),
                is_virtual: false,
                blocking: false,
                reentrant: false,
                guard: Some(guard),
                managed: None,
            }],
        })
    }

    #[test]
    fn second_open_is_a_violation() -> anyhow::Result<()> {
        let mut actor = ActorInstance::new(class());
        assert_eq!(actor.fire(Trigger::Send, "Open")?, "OPEN");
        let fault = actor.fire(Trigger::Send, "Open");
        assert!(matches!(fault, Err(ProtocolFault::ProtocolViolation { ref state, .. }) if state == "OPEN"));
        assert_eq!(actor.state(), "OPEN");
        Ok(())
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut actor = ActorInstance::new(class());
        assert!(actor.destroy());
        assert!(!actor.destroy());
        assert!(actor.is_dead());
    }

    #[test]
    fn missing_stub_is_unknown() {
        let actor = ActorInstance::new(class());
        assert!(actor.outbound("Open").is_ok());
        assert!(matches!(
            actor.inbound("Open"),
            Err(ProtocolFault::UnknownMessage { role: Role::Parent, .. })
        ));
    }
}

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

use crate::ast::{Direction, MessageDecl, Param, QualifiedId, Trigger};
use crate::check::{CheckedUnit, ParamType};
use crate::common::NamingConfig;
use crate::ir::{FieldIr, FieldKind, MessageIds, MethodIr, MethodKind, ParamIr, Role, TypeIr};
use crate::lower::LowerError;

/// Everything the stub builders need about the class being lowered.
pub(crate) struct StubContext<'u, 'a> {
    pub(crate) unit: &'u CheckedUnit<'a>,
    pub(crate) role: Role,
    pub(crate) naming: &'u NamingConfig,
    pub(crate) ids: &'u MessageIds,
}

impl StubContext<'_, '_> {
    fn protocol_name(&self) -> String {
        self.unit.symbols.name.to_string()
    }

    /// Qualified name of `protocol`'s class for this role.
    pub(crate) fn class_name(&self, protocol: &QualifiedId) -> String {
        protocol
            .with_base_suffix(self.role.suffix(self.naming))
            .to_string()
    }

    fn lower_params(&self, md: &MessageDecl, params: &[Param]) -> Result<Vec<ParamIr>, LowerError> {
        params
            .iter()
            .map(|param| {
                let ty = self
                    .unit
                    .decls
                    .param_type(&md.name, &param.name)
                    .ok_or_else(|| LowerError::MissingParamType {
                        protocol: self.protocol_name(),
                        message: md.name.clone(),
                        param: param.name.clone(),
                    })?;
                let ty = match ty {
                    ParamType::Native(name) => TypeIr::Native(name.to_string()),
                    ParamType::Actor { protocol, state } => TypeIr::Actor {
                        class: self.class_name(protocol),
                        state: state.clone(),
                    },
                };
                Ok(ParamIr::new(param.name.clone(), ty))
            })
            .collect()
    }

    fn stub(
        &self,
        md: &MessageDecl,
        trigger: Trigger,
        params: &[ParamIr],
        returns: &[ParamIr],
    ) -> Result<MethodIr, LowerError> {
        let protocol = self.unit.protocol();
        let semantics = protocol.semantics_of(md);
        let ids = self
            .ids
            .get(&md.name)
            .ok_or_else(|| LowerError::UndeclaredMessage {
                protocol: self.protocol_name(),
                message: md.name.clone(),
            })?;
        let kind = MethodKind::for_trigger(trigger);
        Ok(MethodIr {
            name: format!("{}{}", kind.prefix(), md.name),
            kind,
            message: Some(md.name.clone()),
            id: Some(ids.id),
            reply_id: ids.reply,
            semantics: Some(semantics),
            params: params.to_vec(),
            returns: returns.to_vec(),
            is_virtual: trigger.direction() == Direction::In,
            blocking: semantics.is_blocking(),
            reentrant: semantics.is_reentrant(),
            guard: None,
            managed: None,
        })
    }

    /// One stub per direction the role takes part in, sender first, messages in
    /// declaration order.
    pub(crate) fn message_stubs(&self) -> Result<Vec<MethodIr>, LowerError> {
        let protocol = self.unit.protocol();
        let mut methods = Vec::new();
        for name in self.unit.symbols.messages.keys() {
            let md = protocol
                .message(name)
                .ok_or_else(|| LowerError::UndeclaredMessage {
                    protocol: self.protocol_name(),
                    message: name.clone(),
                })?;
            let semantics = protocol.semantics_of(md);
            let params = self.lower_params(md, &md.in_params)?;
            let returns = self.lower_params(md, &md.out_params)?;
            if md.direction.permits(self.role.outbound()) {
                methods.push(self.stub(md, semantics.outbound_trigger(), &params, &returns)?);
            }
            if md.direction.permits(self.role.inbound()) {
                methods.push(self.stub(md, semantics.inbound_trigger(), &params, &returns)?);
            }
        }
        Ok(methods)
    }

    /// Manager back-reference and managed collections, with the construct and
    /// destroy pair of every managed protocol.
    pub(crate) fn lifetime_members(&self) -> (Vec<FieldIr>, Vec<MethodIr>) {
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        if let Some(manager) = &self.unit.manager {
            fields.push(FieldIr::new(
                "manager".to_string(),
                FieldKind::ManagerRef,
                self.class_name(manager),
                false,
                None,
            ));
        }

        for managed in &self.unit.managed {
            let class = self.class_name(managed);
            fields.push(FieldIr::new(
                format!("managed_{}", managed.base),
                FieldKind::ManagedActors,
                class.clone(),
                true,
                None,
            ));
            for kind in [MethodKind::Construct, MethodKind::Destroy] {
                let actor = vec![ParamIr::new("actor".to_string(), TypeIr::Class(class.clone()))];
                let (params, returns) = match kind {
                    MethodKind::Construct => (Vec::new(), actor),
                    _ => (actor, Vec::new()),
                };
                methods.push(MethodIr {
                    name: format!("{}{}", kind.prefix(), managed.base),
                    kind,
                    message: None,
                    id: None,
                    reply_id: None,
                    semantics: None,
                    params,
                    returns,
                    is_virtual: false,
                    blocking: false,
                    reentrant: false,
                    guard: None,
                    managed: Some(class.clone()),
                });
            }
        }
        (fields, methods)
    }
}

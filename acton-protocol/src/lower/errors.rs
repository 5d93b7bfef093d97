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

use thiserror::Error;

/// An inconsistency the checker should have rejected.
///
/// Lowering only ever sees checked input, so each of these is a compiler defect
/// rather than a problem with the user's protocol.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LowerError {
    #[error("internal compiler error: stateful protocol `{protocol}` has no start state")]
    MissingStartState { protocol: String },

    #[error("internal compiler error: `{protocol}` declares state `{state}` twice")]
    DuplicateState { protocol: String, state: String },

    #[error("internal compiler error: state `{state}` of `{protocol}` collides with an implicit state")]
    StateClash { protocol: String, state: String },

    #[error("internal compiler error: a transition of `{protocol}` enters undeclared state `{state}`")]
    UndeclaredState { protocol: String, state: String },

    #[error("internal compiler error: a transition of `{protocol}` fires undeclared message `{message}`")]
    UndeclaredMessage { protocol: String, message: String },

    #[error("internal compiler error: `{protocol}` has no resolved type for `{message}.{param}`")]
    MissingParamType {
        protocol: String,
        message: String,
        param: String,
    },
}

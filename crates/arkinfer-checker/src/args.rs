//! Argument and parameter cross-inference.
//!
//! Once a call is bound, each argument is walked against its parameter
//! type: generic parameters record the argument type as a real type
//! argument of the call, callbacks receive the parameter types the callee
//! declares, and object literals passed to SDK-declared parameters are
//! typed member by member.

use arkinfer_ir::model::{InvokeExpr, LocalId, Value};
use arkinfer_ir::{FunctionType, MethodParameter, MethodSignature, Type};
use smallvec::SmallVec;
use tracing::trace;

use crate::state::{InferenceState, Scope};

/// Real type arguments of a call, by generic index. The first recorded
/// type for an index wins.
type RealSlots = SmallVec<[Option<Type>; 4]>;

fn record_real(reals: &mut RealSlots, index: usize, ty: &Type) {
    if ty.is_unclear() {
        return;
    }
    if reals.len() <= index {
        reals.resize(index + 1, None);
    }
    if reals[index].is_none() {
        reals[index] = Some(ty.clone());
    }
}

impl<'a> InferenceState<'a> {
    pub(crate) fn infer_args(&mut self, invoke: &mut InvokeExpr, scope: Scope) {
        let scene = self.scene;
        let params: Vec<MethodParameter> = invoke
            .method_signature
            .sub
            .call_parameters()
            .cloned()
            .collect();
        if params.is_empty() {
            return;
        }
        let mut reals = RealSlots::new();
        for (index, arg) in invoke.args.iter().enumerate() {
            let param = match params.get(index) {
                Some(param) => param,
                None => match params.last() {
                    Some(last) if last.rest => last,
                    _ => break,
                },
            };
            let expected = match (&param.ty, param.rest) {
                (Type::Array(array), true) => (*array.base).clone(),
                (ty, _) => ty.clone(),
            };
            let arg_local = match arg {
                Value::Local(id) => Some(*id),
                _ => None,
            };
            let arg_ty = arg.ty(scene);
            self.infer_arg(&expected, &arg_ty, arg_local, &mut reals, scope, 0);
        }
        if invoke.real_generic_types.is_none() && reals.iter().any(Option::is_some) {
            let reals: Vec<Type> = reals.into_iter().map(|r| r.unwrap_or(Type::Unknown)).collect();
            trace!(call = %invoke.method_name(), count = reals.len(), "call type arguments inferred");
            invoke.real_generic_types = Some(reals);
        }
    }

    fn infer_arg(
        &mut self,
        param: &Type,
        arg: &Type,
        arg_local: Option<LocalId>,
        reals: &mut RealSlots,
        scope: Scope,
        depth: u32,
    ) {
        if depth > arkinfer_common::limits::MAX_ALIAS_CHAIN_DEPTH {
            return;
        }
        match param {
            Type::Generic(generic) => record_real(reals, generic.index, arg),
            Type::Union(union) => {
                for member in &union.types {
                    self.infer_arg(member, arg, arg_local, reals, scope, depth + 1);
                }
            }
            Type::Alias(alias) => {
                let original = alias.original_type().clone();
                self.infer_arg(&original, arg, arg_local, reals, scope, depth + 1);
            }
            Type::Array(expected) => {
                if let Type::Array(actual) = arg {
                    self.infer_arg(&expected.base, &actual.base, None, reals, scope, depth + 1);
                }
            }
            Type::Class(expected) => {
                let Type::Class(actual) = arg else {
                    return;
                };
                if let (Some(expected_reals), Some(actual_reals)) =
                    (&expected.real_generic_types, &actual.real_generic_types)
                {
                    for (e, a) in expected_reals.iter().zip(actual_reals) {
                        self.infer_arg(e, a, None, reals, scope, depth + 1);
                    }
                }
                if actual.signature.is_anonymous()
                    && self.scene.is_sdk_project(&expected.signature.file.project_name)
                {
                    self.infer_arg_type_with_sdk(&actual.signature, &expected.signature, scope);
                }
            }
            Type::Function(expected) => {
                if let Type::Function(actual) = arg {
                    self.infer_callback_arg(expected, actual, arg_local, reals);
                }
            }
            _ => {}
        }
    }

    /// Copies the parameter types a callee declares for a callback onto the
    /// function passed in, and records generic return types.
    fn infer_callback_arg(
        &mut self,
        expected: &FunctionType,
        actual: &FunctionType,
        arg_local: Option<LocalId>,
        reals: &mut RealSlots,
    ) {
        if let Type::Generic(generic) = expected.signature.return_type() {
            record_real(reals, generic.index, actual.signature.return_type());
        }

        let Some(updated) = with_expected_params(&actual.signature, &expected.signature) else {
            return;
        };
        let scene = self.scene;
        if let Some(method) = scene.get_method(&actual.signature)
            && let Some(implementation) = method.implementation_signature()
            && let Some(implementation) = with_expected_params(&implementation, &expected.signature)
        {
            trace!(callback = %method.name, "callback parameters typed from callee");
            method.set_implementation_signature(implementation);
            self.mark_changed();
        }
        if let Some(local) = arg_local {
            self.update_local_type(local, Type::function(updated));
        }
    }
}

/// `signature` with its unclear parameters typed from `expected`, matched
/// by position with lexical environment parameters skipped. `None` if no
/// parameter changed.
fn with_expected_params(signature: &MethodSignature, expected: &MethodSignature) -> Option<MethodSignature> {
    let expected_params: SmallVec<[&MethodParameter; 8]> = expected.sub.call_parameters().collect();
    let mut updated = signature.clone();
    let mut changed = false;
    let call_params = updated
        .sub
        .parameters
        .iter_mut()
        .filter(|p| !p.is_lexical_env());
    for (param, expected) in call_params.zip(expected_params) {
        if !param.ty.is_unclear() || expected.ty.is_unclear() || matches!(expected.ty, Type::Generic(_)) {
            continue;
        }
        param.ty = expected.ty.clone();
        changed = true;
    }
    changed.then_some(updated)
}

//! Three-address statements and the values they operate on.

use std::fmt;
use std::rc::Rc;

use super::{ImportId, LocalId, Scene, StmtId};
use crate::instantiate::replace_type_with_real;
use crate::signature::{FieldSignature, MethodSignature};
use crate::types::{AliasType, Type};

// =============================================================================
// Values
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Local(LocalId),
    Constant(Constant),
    Expr(Box<Expr>),
    Ref(Box<Ref>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub value: String,
    pub ty: Type,
}

impl Constant {
    pub fn number(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ty: Type::Number,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ty: Type::String,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            value: value.to_string(),
            ty: Type::Boolean,
        }
    }

    pub fn null() -> Self {
        Self {
            value: "null".to_string(),
            ty: Type::Null,
        }
    }

    pub fn undefined() -> Self {
        Self {
            value: "undefined".to_string(),
            ty: Type::Undefined,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Exp,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    And,
    Or,
    NullishCoalescing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Neg,
    Plus,
    BitNot,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InvokeKind {
    /// `base.method(args)`
    Instance { base: LocalId },
    /// `Class.method(args)`, `func(args)`, `super(args)`, `import(specifier)`
    Static,
    /// Call through a function-typed local (`callback(args)`).
    Ptr { callee: LocalId },
}

#[derive(Clone, Debug, PartialEq)]
pub struct InvokeExpr {
    pub kind: InvokeKind,
    pub method_signature: MethodSignature,
    pub args: Vec<Value>,
    /// Explicit or inferred type arguments of the call.
    pub real_generic_types: Option<Vec<Type>>,
}

impl InvokeExpr {
    pub fn instance(base: LocalId, method_signature: MethodSignature, args: Vec<Value>) -> Self {
        Self {
            kind: InvokeKind::Instance { base },
            method_signature,
            args,
            real_generic_types: None,
        }
    }

    pub fn static_call(method_signature: MethodSignature, args: Vec<Value>) -> Self {
        Self {
            kind: InvokeKind::Static,
            method_signature,
            args,
            real_generic_types: None,
        }
    }

    pub fn ptr(callee: LocalId, method_signature: MethodSignature, args: Vec<Value>) -> Self {
        Self {
            kind: InvokeKind::Ptr { callee },
            method_signature,
            args,
            real_generic_types: None,
        }
    }

    pub fn method_name(&self) -> &str {
        self.method_signature.name()
    }

    /// Return type instantiated with the call's type arguments.
    pub fn return_type(&self) -> Type {
        replace_type_with_real(
            self.method_signature.return_type(),
            self.real_generic_types.as_deref(),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Invoke(InvokeExpr),
    New { class_type: Type },
    NewArray { base_type: Type, size: Value },
    Binop { op: BinaryOperator, left: Value, right: Value },
    Unop { op: UnaryOperator, operand: Value },
    Cast { operand: Value, ty: Type },
    TypeOf(Value),
    InstanceOf { operand: Value, check_type: Type },
    Await(Value),
    Delete(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Ref {
    InstanceField { base: LocalId, field: FieldSignature },
    StaticField { field: FieldSignature },
    Array { base: LocalId, index: Value },
    /// `parameterN` in the prologue of a body.
    Parameter { index: usize, ty: Type },
    This { ty: Type },
}

// =============================================================================
// Alias type definitions
// =============================================================================

/// What an alias was declared as.
#[derive(Clone, Debug, PartialEq)]
pub enum AliasOriginal {
    /// `type A = B<number>`
    Type(Type),
    /// `type A = typeof x`
    Local(LocalId),
    /// `type A = import("./m").B`
    Import(ImportId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AliasTypeExpr {
    pub original: AliasOriginal,
    pub transfer_with_typeof: bool,
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Assign { left: Value, right: Value },
    Invoke(InvokeExpr),
    If(Value),
    Return(Value),
    ReturnVoid,
    Throw(Value),
    AliasTypeDefine { alias: Rc<AliasType>, expr: AliasTypeExpr },
    Nop,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub id: StmtId,
    pub kind: StmtKind,
    /// Source text the statement was lowered from, when preserved.
    pub original_text: Option<String>,
    /// 1-based line and column.
    pub position: Option<(u32, u32)>,
}

impl Stmt {
    /// The invoke expression of the statement, if any (`foo()` or `x = foo()`).
    pub fn invoke_expr(&self) -> Option<&InvokeExpr> {
        match &self.kind {
            StmtKind::Invoke(invoke) => Some(invoke),
            StmtKind::Assign { right: Value::Expr(expr), .. } => match expr.as_ref() {
                Expr::Invoke(invoke) => Some(invoke),
                _ => None,
            },
            _ => None,
        }
    }

    /// Locals mentioned anywhere in the statement.
    pub fn locals(&self) -> Vec<LocalId> {
        let mut out = Vec::new();
        match &self.kind {
            StmtKind::Assign { left, right } => {
                left.collect_locals(&mut out);
                right.collect_locals(&mut out);
            }
            StmtKind::Invoke(invoke) => invoke.collect_locals(&mut out),
            StmtKind::If(value) | StmtKind::Return(value) | StmtKind::Throw(value) => {
                value.collect_locals(&mut out)
            }
            StmtKind::AliasTypeDefine { expr, .. } => {
                if let AliasOriginal::Local(local) = expr.original {
                    out.push(local);
                }
            }
            StmtKind::ReturnVoid | StmtKind::Nop => {}
        }
        out
    }
}

impl InvokeExpr {
    fn collect_locals(&self, out: &mut Vec<LocalId>) {
        match &self.kind {
            InvokeKind::Instance { base } => out.push(*base),
            InvokeKind::Ptr { callee } => out.push(*callee),
            InvokeKind::Static => {}
        }
        for arg in &self.args {
            arg.collect_locals(out);
        }
    }
}

impl Value {
    fn collect_locals(&self, out: &mut Vec<LocalId>) {
        match self {
            Value::Local(local) => out.push(*local),
            Value::Constant(_) => {}
            Value::Expr(expr) => match expr.as_ref() {
                Expr::Invoke(invoke) => invoke.collect_locals(out),
                Expr::New { .. } => {}
                Expr::NewArray { size, .. } => size.collect_locals(out),
                Expr::Binop { left, right, .. } => {
                    left.collect_locals(out);
                    right.collect_locals(out);
                }
                Expr::Unop { operand, .. }
                | Expr::Cast { operand, .. }
                | Expr::InstanceOf { operand, .. }
                | Expr::TypeOf(operand)
                | Expr::Await(operand)
                | Expr::Delete(operand) => operand.collect_locals(out),
            },
            Value::Ref(r) => match r.as_ref() {
                Ref::InstanceField { base, .. } => out.push(*base),
                Ref::Array { base, index } => {
                    out.push(*base);
                    index.collect_locals(out);
                }
                Ref::StaticField { .. } | Ref::Parameter { .. } | Ref::This { .. } => {}
            },
        }
    }
}

// =============================================================================
// Typing
// =============================================================================

impl Value {
    /// Current type of the value. Missing locals read as `Unknown`.
    pub fn ty(&self, scene: &Scene) -> Type {
        match self {
            Value::Local(id) => scene
                .local(*id)
                .map(|l| l.ty().clone())
                .unwrap_or(Type::Unknown),
            Value::Constant(constant) => constant.ty.clone(),
            Value::Expr(expr) => expr.ty(scene),
            Value::Ref(r) => r.ty(scene),
        }
    }
}

impl Expr {
    pub fn ty(&self, scene: &Scene) -> Type {
        match self {
            Expr::Invoke(invoke) => invoke.return_type(),
            Expr::New { class_type } => class_type.clone(),
            Expr::NewArray { base_type, .. } => Type::array(base_type.clone(), 1),
            Expr::Binop { op, left, right } => binop_type(*op, &left.ty(scene), &right.ty(scene)),
            Expr::Unop { op, .. } => match op {
                UnaryOperator::Not => Type::Boolean,
                UnaryOperator::Neg | UnaryOperator::Plus | UnaryOperator::BitNot => Type::Number,
            },
            Expr::Cast { ty, .. } => ty.clone(),
            Expr::TypeOf(_) => Type::String,
            Expr::InstanceOf { .. } | Expr::Delete(_) => Type::Boolean,
            Expr::Await(operand) => {
                let ty = operand.ty(scene);
                match ty.unwrap_alias().promise_argument() {
                    Some(inner) => inner.clone(),
                    None => ty,
                }
            }
        }
    }
}

fn binop_type(op: BinaryOperator, left: &Type, right: &Type) -> Type {
    use BinaryOperator::*;
    match op {
        Add => {
            if matches!(left, Type::String) || matches!(right, Type::String) {
                Type::String
            } else if matches!(left, Type::Number) && matches!(right, Type::Number) {
                Type::Number
            } else {
                Type::Unknown
            }
        }
        Sub | Mul | Div | Rem | Exp | BitAnd | BitOr | BitXor | LeftShift | RightShift
        | UnsignedRightShift => Type::Number,
        Eq | NotEq | StrictEq | StrictNotEq | Lt | LtEq | Gt | GtEq | In => Type::Boolean,
        And => right.clone(),
        Or => {
            if left == right {
                left.clone()
            } else {
                Type::union([left.clone(), right.clone()])
            }
        }
        NullishCoalescing => {
            let non_null: Vec<Type> = left.flat_types().into_iter().filter(|t| !t.is_nullish()).collect();
            Type::union(non_null.into_iter().chain(std::iter::once(right.clone())))
        }
    }
}

impl Ref {
    pub fn ty(&self, scene: &Scene) -> Type {
        match self {
            Ref::InstanceField { field, .. } | Ref::StaticField { field } => field.ty.clone(),
            Ref::Array { base, .. } => {
                let base_ty = scene
                    .local(*base)
                    .map(|l| l.ty().clone())
                    .unwrap_or(Type::Unknown);
                match base_ty.unwrap_alias() {
                    Type::Array(array) if array.dimension > 1 => {
                        Type::array(*array.base, array.dimension - 1)
                    }
                    Type::Array(array) => *array.base,
                    Type::Any => Type::Any,
                    _ => Type::Unknown,
                }
            }
            Ref::Parameter { ty, .. } | Ref::This { ty } => ty.clone(),
        }
    }
}

// =============================================================================
// Display
// =============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Local(id) => write!(f, "%l{}", id.0),
            Value::Constant(c) => f.write_str(&c.value),
            Value::Expr(expr) => match expr.as_ref() {
                Expr::Invoke(invoke) => write!(f, "invoke {}", invoke.method_signature),
                Expr::New { class_type } => write!(f, "new {class_type}"),
                Expr::NewArray { base_type, size } => write!(f, "newarray ({base_type})[{size}]"),
                Expr::Binop { op, left, right } => write!(f, "{left} {op:?} {right}"),
                Expr::Unop { op, operand } => write!(f, "{op:?} {operand}"),
                Expr::Cast { operand, ty } => write!(f, "<{ty}>{operand}"),
                Expr::TypeOf(operand) => write!(f, "typeof {operand}"),
                Expr::InstanceOf { operand, check_type } => write!(f, "{operand} instanceof {check_type}"),
                Expr::Await(operand) => write!(f, "await {operand}"),
                Expr::Delete(operand) => write!(f, "delete {operand}"),
            },
            Value::Ref(r) => match r.as_ref() {
                Ref::InstanceField { base, field } => write!(f, "%l{}.{}", base.0, field.name),
                Ref::StaticField { field } => write!(f, "{}.{}", field.declaring.name(), field.name),
                Ref::Array { base, index } => write!(f, "%l{}[{index}]", base.0),
                Ref::Parameter { index, ty } => write!(f, "parameter{index}: {ty}"),
                Ref::This { ty } => write!(f, "this: {ty}"),
            },
        }
    }
}

//! Folds integer constants into values and replaces symbolic array bounds
//! with the folded values.
//!
//! Only constants declared with one of the integer types in
//! [`PERMITTED_TYPES`] take part. Other constants (for example `REAL` or
//! `STRING` constants) are ignored.
//!
//! ## Passes
//!
//! ```text
//! VAR CONSTANT
//!     STATIONS : USINT := 2;
//!     MOTORS : USINT := STATIONS * 3;
//! END_VAR
//! VAR
//!     gMotors : ARRAY[1..MOTORS] OF MotorType;
//! END_VAR
//! ```
//!
//! ## Fails
//!
//! ```text
//! VAR CONSTANT
//!     A : INT := B + 1;
//!     B : INT := A;
//! END_VAR
//! ```
use std::collections::HashMap;

use alarmgen_dsl::core::SourceSpan;
use alarmgen_dsl::declaration::{Bound, BoundsDecl, ConstantDecl, DeclarationSet};
use alarmgen_dsl::diagnostic::{Diagnostic, Label};
use alarmgen_dsl::expression::{BinaryOp, Expr};
use alarmgen_dsl::model::{ArrayBounds, Constant, GlobalVariable, RecordTypeMember};
use alarmgen_parser::expression::parse_expression;
use alarmgen_problems::Problem;
use log::{debug, trace};
use phf::{phf_set, Set};
use thiserror::Error;

/// Declared types of constants that are folded.
pub static PERMITTED_TYPES: Set<&'static str> = phf_set! {
    "USINT",
    "SINT",
    "UINT",
    "INT",
    "UDINT",
    "DINT",
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("symbol '{0}' is not defined")]
    UndefinedSymbol(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result does not fit in a 64-bit integer")]
    Overflow,
}

/// Declarations with every constant folded and every array bound resolved.
#[derive(Clone, Debug, Default)]
pub struct ResolvedDeclarations {
    /// Folded constants in declaration order.
    pub constants: Vec<Constant>,
    pub variables: Vec<GlobalVariable>,
    pub members: Vec<RecordTypeMember>,
}

impl ResolvedDeclarations {
    pub fn constant(&self, name: &str) -> Option<i64> {
        self.constants
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
    }
}

pub fn apply(declarations: &DeclarationSet) -> Result<ResolvedDeclarations, Vec<Diagnostic>> {
    let constants = fold_constants(&declarations.constants)?;
    let values: HashMap<&str, i64> = constants
        .iter()
        .map(|c| (c.name.as_str(), c.value))
        .collect();

    let mut errors = vec![];

    let mut variables = vec![];
    for decl in &declarations.variables {
        match resolve_bounds(&decl.bounds, &values, &decl.name, &decl.span) {
            Ok(bounds) => variables.push(GlobalVariable {
                name: decl.name.clone(),
                type_name: decl.type_name.clone(),
                bounds,
                span: decl.span.clone(),
            }),
            Err(err) => errors.push(err),
        }
    }

    let mut members = vec![];
    for decl in &declarations.members {
        let owner = format!("{}.{}", decl.parent_type, decl.name);
        match resolve_bounds(&decl.bounds, &values, &owner, &decl.span) {
            Ok(bounds) => members.push(RecordTypeMember {
                name: decl.name.clone(),
                type_name: decl.type_name.clone(),
                bounds,
                annotation: decl.annotation.clone(),
                parent_type: decl.parent_type.clone(),
                span: decl.span.clone(),
            }),
            Err(err) => errors.push(err),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    debug!(
        "Folded {} constants, {} variables and {} members",
        constants.len(),
        variables.len(),
        members.len()
    );

    Ok(ResolvedDeclarations {
        constants,
        variables,
        members,
    })
}

/// Folds the permitted constants with a worklist. Each pass evaluates the
/// pending constants whose symbols are all known. A pass that resolves
/// nothing means the remaining constants refer to undefined symbols or
/// to each other.
fn fold_constants(decls: &[ConstantDecl]) -> Result<Vec<Constant>, Vec<Diagnostic>> {
    let mut errors = vec![];
    let mut pending: Vec<(usize, &ConstantDecl, Expr)> = vec![];

    for (idx, decl) in decls.iter().enumerate() {
        if !PERMITTED_TYPES.contains(decl.type_name.to_uppercase().as_str()) {
            trace!(
                "Constant {} has type {} and is not folded",
                decl.name,
                decl.type_name
            );
            continue;
        }
        match parse_expression(&decl.value, &decl.span) {
            Ok(expr) => pending.push((idx, decl, expr)),
            Err(err) => errors.push(err.with_context("constant", &decl.name)),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut values: HashMap<String, i64> = HashMap::new();
    let mut folded: Vec<(usize, Constant)> = vec![];

    while !pending.is_empty() {
        let mut remaining = vec![];
        let mut progress = false;

        for (idx, decl, expr) in pending {
            let ready = expr.symbols().iter().all(|s| values.contains_key(*s));
            if !ready {
                remaining.push((idx, decl, expr));
                continue;
            }
            match evaluate(&expr, &values) {
                Ok(value) => {
                    trace!("Constant {} = {}", decl.name, value);
                    values.insert(decl.name.clone(), value);
                    folded.push((
                        idx,
                        Constant {
                            name: decl.name.clone(),
                            type_name: decl.type_name.clone(),
                            value,
                        },
                    ));
                    progress = true;
                }
                Err(err) => errors.push(
                    Diagnostic::problem(
                        Problem::ConstantMalformed,
                        Label::span(&decl.span, err.to_string()),
                    )
                    .with_context("constant", &decl.name),
                ),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        if !progress && !remaining.is_empty() {
            return Err(remaining
                .iter()
                .map(|(_, decl, expr)| {
                    let missing: Vec<&str> = expr
                        .symbols()
                        .into_iter()
                        .filter(|s| !values.contains_key(*s))
                        .collect();
                    Diagnostic::problem(
                        Problem::ConstantUnresolved,
                        Label::span(&decl.span, "Constant"),
                    )
                    .with_context("constant", &decl.name)
                    .with_context("missing", missing.join(" "))
                })
                .collect());
        }

        pending = remaining;
    }

    folded.sort_by_key(|(idx, _)| *idx);
    Ok(folded.into_iter().map(|(_, c)| c).collect())
}

/// Evaluates the expression with integer arithmetic. Division truncates
/// towards zero.
pub fn evaluate<S>(expr: &Expr, values: &HashMap<String, i64, S>) -> Result<i64, EvalError>
where
    S: std::hash::BuildHasher,
{
    match expr {
        Expr::Integer(value) => Ok(*value),
        Expr::Symbol(name) => values
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UndefinedSymbol(name.clone())),
        Expr::Negate(inner) => evaluate(inner, values)?
            .checked_neg()
            .ok_or(EvalError::Overflow),
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, values)?;
            let right = evaluate(right, values)?;
            let result = match op {
                BinaryOp::Add => left.checked_add(right),
                BinaryOp::Sub => left.checked_sub(right),
                BinaryOp::Mul => left.checked_mul(right),
                BinaryOp::Div | BinaryOp::Mod if right == 0 => {
                    return Err(EvalError::DivisionByZero)
                }
                BinaryOp::Div => left.checked_div(right),
                BinaryOp::Mod => left.checked_rem(right),
            };
            result.ok_or(EvalError::Overflow)
        }
    }
}

fn resolve_bounds(
    bounds: &Option<BoundsDecl>,
    values: &HashMap<&str, i64>,
    owner: &str,
    span: &SourceSpan,
) -> Result<Option<ArrayBounds>, Diagnostic> {
    let Some(bounds) = bounds else {
        return Ok(None);
    };
    let low = resolve_bound(&bounds.low, values, owner, span)?;
    let high = resolve_bound(&bounds.high, values, owner, span)?;
    Ok(Some(ArrayBounds::new(low, high)))
}

fn resolve_bound(
    bound: &Bound,
    values: &HashMap<&str, i64>,
    owner: &str,
    span: &SourceSpan,
) -> Result<i64, Diagnostic> {
    match bound {
        Bound::Literal(value) => Ok(*value),
        Bound::Symbol(name) => values.get(name.as_str()).copied().ok_or_else(|| {
            Diagnostic::problem(
                Problem::ArrayBoundUnresolved,
                Label::span(span, "Array declaration"),
            )
            .with_context("declaration", owner)
            .with_context("constant", name)
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use alarmgen_dsl::expression::{BinaryOp, Expr};
    use alarmgen_dsl::model::ArrayBounds;
    use rstest::rstest;

    use super::{apply, evaluate, EvalError};
    use crate::test_helpers::declarations;

    #[test]
    fn apply_when_constants_refer_to_each_other_then_folded() {
        let decls = declarations(
            "VAR CONSTANT
	C : INT := B * A;
	B : INT := A + 1;
	A : INT := 2;
END_VAR",
        );

        let resolved = apply(&decls).unwrap();

        assert_eq!(Some(2), resolved.constant("A"));
        assert_eq!(Some(3), resolved.constant("B"));
        assert_eq!(Some(6), resolved.constant("C"));
        assert_eq!("C", resolved.constants[0].name);
    }

    #[test]
    fn apply_when_undefined_symbol_then_err_names_constant() {
        let decls = declarations(
            "VAR CONSTANT
	A : INT := 2;
	B : INT := A + MISSING;
END_VAR",
        );

        let errors = apply(&decls).unwrap_err();

        assert_eq!(1, errors.len());
        assert_eq!("P0102", errors[0].code);
        assert!(errors[0].description().contains("constant=B"));
        assert!(errors[0].description().contains("missing=MISSING"));
    }

    #[test]
    fn apply_when_cycle_then_err_for_each_constant() {
        let decls = declarations(
            "VAR CONSTANT
	A : INT := B + 1;
	B : INT := A;
END_VAR",
        );

        let errors = apply(&decls).unwrap_err();

        assert_eq!(2, errors.len());
        assert!(errors.iter().all(|e| e.code == "P0102"));
    }

    #[test]
    fn apply_when_real_constant_then_ignored() {
        let decls = declarations(
            "VAR CONSTANT
	PI : REAL := 3.14159;
	NAME : STRING[10] := 'Line';
	COUNT : usint := 4;
END_VAR",
        );

        let resolved = apply(&decls).unwrap();

        assert_eq!(1, resolved.constants.len());
        assert_eq!(Some(4), resolved.constant("COUNT"));
    }

    #[test]
    fn apply_when_malformed_integer_constant_then_err() {
        let decls = declarations(
            "VAR CONSTANT
	A : INT := 'text';
END_VAR",
        );

        let errors = apply(&decls).unwrap_err();

        assert_eq!("P0101", errors[0].code);
    }

    #[test]
    fn apply_when_division_by_zero_then_err() {
        let decls = declarations(
            "VAR CONSTANT
	ZERO : INT := 0;
	A : INT := 4 / ZERO;
END_VAR",
        );

        let errors = apply(&decls).unwrap_err();

        assert_eq!("P0101", errors[0].code);
    }

    #[test]
    fn apply_when_symbolic_bounds_then_resolved() {
        let decls = declarations(
            "TYPE
	LineType : STRUCT
		Stations : ARRAY[FIRST..LAST] OF StationType;
	END_STRUCT;
END_TYPE
VAR
	gAxes : ARRAY[0..LAST] OF AxisType;
END_VAR
VAR CONSTANT
	FIRST : INT := 1;
	LAST : INT := FIRST + 2;
END_VAR",
        );

        let resolved = apply(&decls).unwrap();

        assert_eq!(Some(ArrayBounds::new(1, 3)), resolved.members[0].bounds);
        assert_eq!(Some(ArrayBounds::new(0, 3)), resolved.variables[0].bounds);
    }

    #[test]
    fn apply_when_bound_constant_undefined_then_err_names_member() {
        let decls = declarations(
            "TYPE
	LineType : STRUCT
		Stations : ARRAY[1..MAX_STATIONS] OF StationType;
	END_STRUCT;
END_TYPE",
        );

        let errors = apply(&decls).unwrap_err();

        assert_eq!("P0103", errors[0].code);
        let description = errors[0].description();
        assert!(description.contains("declaration=LineType.Stations"));
        assert!(description.contains("constant=MAX_STATIONS"));
    }

    #[rstest]
    #[case(Expr::binary(BinaryOp::Div, Expr::Integer(7), Expr::Integer(2)), Ok(3))]
    #[case(Expr::binary(BinaryOp::Div, Expr::Integer(-7), Expr::Integer(2)), Ok(-3))]
    #[case(Expr::binary(BinaryOp::Mod, Expr::Integer(7), Expr::Integer(4)), Ok(3))]
    #[case(Expr::binary(BinaryOp::Sub, Expr::Integer(1), Expr::Symbol(String::from("N"))), Ok(-9))]
    #[case(Expr::binary(BinaryOp::Mod, Expr::Integer(7), Expr::Integer(0)), Err(EvalError::DivisionByZero))]
    #[case(Expr::binary(BinaryOp::Mul, Expr::Integer(i64::MAX), Expr::Integer(2)), Err(EvalError::Overflow))]
    #[case(Expr::Symbol(String::from("X")), Err(EvalError::UndefinedSymbol(String::from("X"))))]
    fn evaluate_when_expression_then_result(
        #[case] expr: Expr,
        #[case] expected: Result<i64, EvalError>,
    ) {
        let values = HashMap::from([(String::from("N"), 10)]);
        assert_eq!(expected, evaluate(&expr, &values));
    }
}

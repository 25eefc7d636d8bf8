//! Finds every path from a global variable to a structure that holds alarms.
//!
//! Resolution works from the inside out. The structures whose type name
//! marks a severity hold the alarms. Each pass finds the members whose type
//! is one found by the previous pass and extends the paths by one level
//! towards the global variables. When no pass finds anything more, the
//! global variables are attached to the outer end of the paths.
//!
//! ## Passes
//!
//! ```text
//! TYPE
//!     MachineType : STRUCT
//!         Stations : ARRAY[1..2] OF StationType;
//!     END_STRUCT;
//!     StationType : STRUCT
//!         Errors : StationErrorType;
//!     END_STRUCT;
//! END_TYPE
//! VAR
//!     gMachine : MachineType;
//! END_VAR
//! ```
//!
//! yields the path `gMachine > Stations[1..2] > Errors`.
//!
//! ## Fails
//!
//! ```text
//! TYPE
//!     LoopErrorType : STRUCT
//!         Next : LoopErrorType;
//!     END_STRUCT;
//! END_TYPE
//! ```
use std::collections::{HashMap, HashSet};

use alarmgen_dsl::diagnostic::{Diagnostic, Label};
use alarmgen_dsl::model::{AlarmPath, GlobalVariable, PathSegment, RecordTypeMember};
use alarmgen_problems::Problem;
use log::{debug, trace};
use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::severity::is_alarm_type;

/// The default limit for the number of passes.
pub const DEFAULT_MAX_NESTING: usize = 15;

/// Returns the members with identical declarations collapsed to the first.
pub fn unique_members(members: &[RecordTypeMember]) -> Vec<RecordTypeMember> {
    let mut unique: Vec<RecordTypeMember> = vec![];
    for member in members {
        if unique.iter().any(|m| m.same_declaration(member)) {
            trace!(
                "Member {}.{} is declared more than once",
                member.parent_type,
                member.name
            );
            continue;
        }
        unique.push(member.clone());
    }
    unique
}

/// Resolves the paths to alarm structures. The members must not contain
/// duplicate declarations (see [`unique_members`]).
pub fn apply(
    members: &[RecordTypeMember],
    variables: &[GlobalVariable],
    max_nesting: usize,
) -> Result<Vec<AlarmPath>, Diagnostic> {
    let alarm_types = alarm_bearing_types(members);
    debug!("Alarm structures: {}", alarm_types.join(", "));

    let mut paths = upward_closure(members, &alarm_types, max_nesting)?;
    for path in paths.iter_mut() {
        path.reverse();
    }

    let resolved = attach_variables(members, variables, &paths);
    debug!("Resolved {} alarm paths", resolved.len());
    Ok(resolved)
}

/// Returns the declared structure types that hold alarms, in declaration
/// order.
fn alarm_bearing_types(members: &[RecordTypeMember]) -> Vec<&str> {
    let mut types: Vec<&str> = vec![];
    for member in members {
        let name = member.parent_type.as_str();
        if is_alarm_type(name) && !types.contains(&name) {
            types.push(name);
        }
    }
    types
}

/// Builds the paths innermost-first. A path is a list of indices into the
/// members.
fn upward_closure(
    members: &[RecordTypeMember],
    alarm_types: &[&str],
    max_nesting: usize,
) -> Result<Vec<Vec<usize>>, Diagnostic> {
    let mut paths: Vec<Vec<usize>> = vec![];
    let mut prefixes: HashSet<Vec<usize>> = HashSet::new();
    let mut frontier: HashSet<&str> = alarm_types.iter().copied().collect();
    let mut nesting = 0;
    let mut first_pass = true;

    loop {
        nesting += 1;
        if nesting >= max_nesting {
            return Err(nesting_error(members, max_nesting));
        }

        let mut parents: HashSet<&str> = HashSet::new();

        for (found, member) in members.iter().enumerate() {
            if !frontier.contains(member.type_name.as_str()) {
                continue;
            }
            parents.insert(member.parent_type.as_str());

            if first_pass {
                paths.push(vec![found]);
                prefixes.insert(vec![found]);
                continue;
            }

            let mut branches: Vec<Vec<usize>> = vec![];
            for path in 0..paths.len() {
                let len = paths[path].len();
                for pos in 0..len {
                    if members[paths[path][pos]].parent_type != member.type_name {
                        continue;
                    }
                    if pos == len - 1 {
                        paths[path].push(found);
                        prefixes.insert(paths[path].clone());
                    } else {
                        let mut branch = paths[path][..=pos].to_vec();
                        branch.push(found);
                        if !prefixes.contains(&branch) && !branches.contains(&branch) {
                            branches.push(branch);
                        }
                    }
                }
            }
            for branch in branches {
                prefixes.insert(branch.clone());
                paths.push(branch);
            }
        }

        trace!("Pass {} found {} containing types", nesting, parents.len());

        if parents.is_empty() {
            return Ok(paths);
        }
        frontier = parents;
        first_pass = false;
    }
}

fn attach_variables(
    members: &[RecordTypeMember],
    variables: &[GlobalVariable],
    paths: &[Vec<usize>],
) -> Vec<AlarmPath> {
    let declared: HashSet<&str> = members.iter().map(|m| m.parent_type.as_str()).collect();

    let mut resolved: Vec<AlarmPath> = vec![];
    let mut seen: HashSet<AlarmPath> = HashSet::new();

    for variable in variables {
        let mut matched = false;
        for path in paths {
            for (pos, idx) in path.iter().enumerate() {
                if members[*idx].parent_type != variable.type_name {
                    continue;
                }
                matched = true;
                let mut segments = vec![PathSegment::from_variable(variable)];
                segments.extend(
                    path[pos..]
                        .iter()
                        .map(|i| PathSegment::from_member(&members[*i])),
                );
                let candidate = AlarmPath::new(segments);
                if seen.insert(candidate.clone()) {
                    resolved.push(candidate);
                }
            }
        }

        if matched {
            continue;
        }
        if is_alarm_type(&variable.type_name) && declared.contains(variable.type_name.as_str()) {
            let candidate = AlarmPath::new(vec![PathSegment::from_variable(variable)]);
            if seen.insert(candidate.clone()) {
                resolved.push(candidate);
            }
        } else {
            debug!(
                "Variable {} of type {} does not contain alarms",
                variable.name, variable.type_name
            );
        }
    }

    resolved
}

/// Creates the diagnostic for nesting that exceeds the limit. The types
/// that form a cycle, if any, are named.
fn nesting_error(members: &[RecordTypeMember], max_nesting: usize) -> Diagnostic {
    let mut graph: StableDiGraph<&str, usize, u32> = StableDiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for (idx, member) in members.iter().enumerate() {
        let parent = add_node(&mut graph, &mut nodes, &member.parent_type);
        let child = add_node(&mut graph, &mut nodes, &member.type_name);
        graph.add_edge(parent, child, idx);
    }

    let mut cycle_types: Vec<&str> = vec![];
    let mut cycle_members: Vec<usize> = vec![];
    for component in tarjan_scc(&graph) {
        let is_cycle = component.len() > 1
            || component
                .first()
                .is_some_and(|node| graph.contains_edge(*node, *node));
        if !is_cycle {
            continue;
        }
        for node in &component {
            cycle_types.push(graph[*node]);
            for edge in graph.edges(*node) {
                if component.contains(&edge.target()) {
                    cycle_members.push(*edge.weight());
                }
            }
        }
    }
    cycle_types.sort_unstable();
    cycle_members.sort_unstable();

    let primary = match cycle_members.first() {
        Some(idx) => Label::span(&members[*idx].span, "Member in a cycle of types"),
        None => Label::none("Types are nested too deeply"),
    };

    let mut diagnostic =
        Diagnostic::problem(Problem::NestingTooDeep, primary).with_context("max", max_nesting);
    if !cycle_types.is_empty() {
        diagnostic = diagnostic.with_context("cycle", cycle_types.join(" "));
    }
    for idx in cycle_members.iter().skip(1) {
        diagnostic = diagnostic
            .with_secondary(Label::span(&members[*idx].span, "Member in a cycle of types"));
    }
    diagnostic
}

fn add_node<'a>(
    graph: &mut StableDiGraph<&'a str, usize, u32>,
    nodes: &mut HashMap<&'a str, NodeIndex>,
    name: &'a str,
) -> NodeIndex {
    *nodes.entry(name).or_insert_with(|| graph.add_node(name))
}

#[cfg(test)]
mod tests {
    use alarmgen_dsl::model::{AlarmPath, ArrayBounds};

    use super::{apply, unique_members, DEFAULT_MAX_NESTING};
    use crate::test_helpers::{declarations, declarations_from};
    use crate::xform_fold_constants;

    fn resolve(source: &str) -> Vec<AlarmPath> {
        let resolved = xform_fold_constants::apply(&declarations(source)).unwrap();
        let members = unique_members(&resolved.members);
        apply(&members, &resolved.variables, DEFAULT_MAX_NESTING).unwrap()
    }

    fn names(paths: &[AlarmPath]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn apply_when_global_of_alarm_type_without_nesting_then_one_path() {
        let paths = resolve(
            "TYPE
	LineInfoType : STRUCT
		Ready : BOOL; (*Ready*) (*Code=1*)
	END_STRUCT;
END_TYPE
VAR
	gLineInfo : LineInfoType;
END_VAR",
        );

        assert_eq!(vec!["gLineInfo"], names(&paths));
        assert_eq!(1, paths[0].len());
    }

    #[test]
    fn apply_when_nested_structures_then_outermost_first() {
        let paths = resolve(
            "TYPE
	MachineType : STRUCT
		Errors : MachineErrorType;
		Stations : ARRAY[1..2] OF StationType;
	END_STRUCT;
	StationType : STRUCT
		Errors : StationErrorType;
		Warnings : StationWarningType;
	END_STRUCT;
	MachineErrorType : STRUCT
		Stop : BOOL; (*Stop*) (*Code=1*)
	END_STRUCT;
	StationErrorType : STRUCT
		Overload : BOOL; (*Overload*) (*Code=2*)
	END_STRUCT;
	StationWarningType : STRUCT
		Low : BOOL; (*Low*) (*Code=3*)
	END_STRUCT;
END_TYPE
VAR
	gMachine : MachineType;
	gCounter : UDINT;
END_VAR",
        );

        assert_eq!(
            vec![
                "gMachine > Errors",
                "gMachine > Stations[1..2] > Errors",
                "gMachine > Stations[1..2] > Warnings",
            ],
            names(&paths)
        );
        assert_eq!(Some(ArrayBounds::new(1, 2)), paths[1].segments[1].bounds);
        assert_eq!(
            Some(String::from("StationType")),
            paths[1].segments[2].parent_type
        );
    }

    #[test]
    fn apply_when_type_used_in_two_places_then_branches() {
        let paths = resolve(
            "TYPE
	LineType : STRUCT
		Left : StationType;
		Right : StationType;
	END_STRUCT;
	StationType : STRUCT
		Motor : MotorType;
	END_STRUCT;
	MotorType : STRUCT
		Errors : MotorErrorType;
	END_STRUCT;
	MotorErrorType : STRUCT
		Overload : BOOL; (*Overload*) (*Code=1*)
	END_STRUCT;
END_TYPE
VAR
	gLine : LineType;
	gStation : StationType;
END_VAR",
        );

        assert_eq!(
            vec![
                "gLine > Left > Motor > Errors",
                "gLine > Right > Motor > Errors",
                "gStation > Motor > Errors",
            ],
            names(&paths)
        );
    }

    #[test]
    fn apply_when_structure_declared_twice_then_no_duplicate_paths() {
        let source = "TYPE
	StationType : STRUCT
		Errors : StationErrorType;
	END_STRUCT;
	StationErrorType : STRUCT
		Overload : BOOL; (*Overload*) (*Code=1*)
	END_STRUCT;
END_TYPE";
        let decls = declarations_from(&[source, source, "VAR\n\tgStation : StationType;\nEND_VAR"]);
        let resolved = xform_fold_constants::apply(&decls).unwrap();
        let members = unique_members(&resolved.members);

        let paths = apply(&members, &resolved.variables, DEFAULT_MAX_NESTING).unwrap();

        assert_eq!(2, members.len());
        assert_eq!(vec!["gStation > Errors"], names(&paths));
    }

    #[test]
    fn apply_when_global_type_has_no_alarms_then_dropped() {
        let paths = resolve(
            "TYPE
	PointType : STRUCT
		X : REAL;
	END_STRUCT;
	UndeclaredUse : STRUCT
		Y : REAL;
	END_STRUCT;
END_TYPE
VAR
	gPoint : PointType;
	gErrors : UnknownErrorType;
END_VAR",
        );

        assert!(paths.is_empty());
    }

    #[test]
    fn apply_when_type_contains_itself_then_nesting_error_names_type() {
        let decls = declarations(
            "TYPE
	LoopErrorType : STRUCT
		Next : LoopErrorType;
		Stop : BOOL; (*Stop*) (*Code=1*)
	END_STRUCT;
END_TYPE",
        );
        let resolved = xform_fold_constants::apply(&decls).unwrap();

        let err = apply(&resolved.members, &resolved.variables, DEFAULT_MAX_NESTING).unwrap_err();

        assert_eq!("P0104", err.code);
        assert!(err.description().contains("cycle=LoopErrorType"));
    }

    #[test]
    fn apply_when_types_contain_each_other_then_nesting_error_names_both() {
        let decls = declarations(
            "TYPE
	AErrorType : STRUCT
		B : BType;
		Stop : BOOL; (*Stop*) (*Code=1*)
	END_STRUCT;
	BType : STRUCT
		A : AErrorType;
	END_STRUCT;
END_TYPE",
        );
        let resolved = xform_fold_constants::apply(&decls).unwrap();

        let err = apply(&resolved.members, &resolved.variables, DEFAULT_MAX_NESTING).unwrap_err();

        assert!(err.description().contains("cycle=AErrorType BType"));
        assert_eq!(1, err.secondary.len());
    }

    #[test]
    fn apply_when_nesting_exceeds_small_limit_then_err() {
        let decls = declarations(
            "TYPE
	AType : STRUCT
		B : BType;
	END_STRUCT;
	BType : STRUCT
		Errors : BErrorType;
	END_STRUCT;
	BErrorType : STRUCT
		Stop : BOOL; (*Stop*) (*Code=1*)
	END_STRUCT;
END_TYPE",
        );
        let resolved = xform_fold_constants::apply(&decls).unwrap();

        assert!(apply(&resolved.members, &resolved.variables, 3).is_err());
        assert!(apply(&resolved.members, &resolved.variables, 4).is_ok());
    }
}

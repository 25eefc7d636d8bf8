//! Generates the cyclic program that sets and resets the alarms.
//!
//! The program compares every alarm flag with the value it had in the
//! previous cycle (kept in the `Flag` variable) and calls `MpAlarmXSet` on
//! a rising edge and `MpAlarmXReset` on a falling edge. Arrays on the way to
//! an alarm become nested loops and the alarm name is then composed at run
//! time.
//!
//! The program is built as a small statement tree and rendered either as
//! Structured Text or as C.
use alarmgen_dsl::core::FileId;
use alarmgen_dsl::diagnostic::Diagnostic;
use alarmgen_dsl::model::{Alarm, ArrayBounds, Severity};
use log::{debug, trace};

use crate::sentinel::replace_region;

/// Width of the section banners including the comment delimiters.
const BANNER_WIDTH: usize = 100;

/// The variable that holds the alarm values of the previous cycle.
pub const FLAG_VARIABLE: &str = "Flag";
/// The variable that holds the composed alarm name.
pub const NAME_VARIABLE: &str = "Name";
/// The variable that holds a converted array index.
pub const STRING_VARIABLE: &str = "String";
const CORE_INSTANCE: &str = "gAlarmXCore";

/// The language of the program file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    StructuredText,
    C,
}

impl Dialect {
    /// Dialects in the order their program files are preferred.
    pub const PREFERRED: [Dialect; 2] = [Dialect::C, Dialect::StructuredText];

    pub fn extension(&self) -> &'static str {
        match self {
            Dialect::StructuredText => "st",
            Dialect::C => "c",
        }
    }
}

/// Returns the name of the loop variable for the loop nesting level
/// (starting at 1).
pub fn index_variable(level: usize) -> String {
    format!("ArrayIndex{}", level)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Changed,
    Rising,
    Falling,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub left: String,
    pub comparison: Comparison,
    pub right: String,
}

/// An argument of a function call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Arg {
    /// The address of a variable.
    Address(String),
    /// The address of a string literal.
    AddressOfLiteral(String),
    SizeOf(String),
    Integer(i64),
    Variable(String),
    /// The alarm core instance.
    Core,
    /// A string literal.
    Literal(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// An empty line (that is indented).
    Blank,
    Comment(String),
    For {
        level: usize,
        bounds: ArrayBounds,
        body: Vec<Statement>,
    },
    If {
        condition: Condition,
        then: Vec<Statement>,
        otherwise: Vec<Statement>,
    },
    Call {
        function: &'static str,
        args: Vec<Arg>,
    },
    Assign {
        target: String,
        value: String,
    },
}

/// The generated region of the program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedProgram {
    pub text: String,
    /// The deepest loop nesting in the program.
    pub max_loops: usize,
}

/// Replaces the generated region of the program file.
pub fn update_program(
    text: &str,
    alarms: &[Alarm],
    dialect: Dialect,
    file_id: &FileId,
) -> Result<GeneratedProgram, Diagnostic> {
    let generated = generate_program(alarms, dialect);
    let text = replace_region(text, &generated.text, file_id)?;
    Ok(GeneratedProgram {
        text,
        max_loops: generated.max_loops,
    })
}

/// Generates the program for the alarms. Alarms are grouped by severity and
/// keep their order within a group.
pub fn generate_program(alarms: &[Alarm], dialect: Dialect) -> GeneratedProgram {
    let mut text = String::new();
    let mut max_loops = 0;

    for severity in Severity::ALL {
        if severity == Severity::Error {
            text.push('\t');
        } else {
            text.push_str("\n\t\n\t");
        }
        text.push_str(&banner(severity.title(), dialect));

        let mut statements = vec![];
        let mut last_root: Option<&str> = None;
        for alarm in alarms.iter().filter(|alarm| alarm.severity == severity) {
            if !has_set_reset(alarm) {
                trace!("Alarm {} is not set or reset by the program", alarm);
                continue;
            }
            let Some(root) = alarm.path.root() else {
                continue;
            };
            if last_root != Some(root.name.as_str()) {
                statements.push(Statement::Comment(format!("Global variable {}", root.name)));
                last_root = Some(root.name.as_str());
            }

            let (alarm_statements, loops) = alarm_statements(alarm);
            statements.extend(alarm_statements);
            statements.push(Statement::Blank);
            max_loops = max_loops.max(loops);
        }
        render(&statements, 1, dialect, &mut text);
    }

    text.push_str("\n\t\n");
    debug!("Generated program with {} nested loops", max_loops);
    GeneratedProgram { text, max_loops }
}

/// Alarms with a monitoring behavior are set by the alarm system itself.
/// Alarms with an invalid behavior are left out.
fn has_set_reset(alarm: &Alarm) -> bool {
    match alarm.property("Behavior") {
        Some(behavior) => behavior.valid && !behavior.value.contains("Monitoring"),
        None => true,
    }
}

fn banner(title: &str, dialect: Dialect) -> String {
    let (open, close) = match dialect {
        Dialect::StructuredText => ('(', ')'),
        Dialect::C => ('/', '/'),
    };
    let stars = BANNER_WIDTH.saturating_sub(title.len() + 4);
    let left = stars / 2;
    format!(
        "{}{} {} {}{}",
        open,
        "*".repeat(left),
        title,
        "*".repeat(stars - left),
        close
    )
}

/// A part of the name that the program composes at run time.
enum NamePart {
    Literal(String),
    /// The converted value of the loop variable at the level.
    Index(usize),
}

/// Returns the statements for one alarm and the number of loops around the
/// alarm.
fn alarm_statements(alarm: &Alarm) -> (Vec<Statement>, usize) {
    let mut loops: Vec<(usize, ArrayBounds)> = vec![];
    let mut parts: Vec<NamePart> = vec![];
    let mut reference = String::new();

    for segment in &alarm.path.segments {
        reference.push_str(&segment.name);
        match segment.bounds {
            Some(bounds) => {
                let level = loops.len() + 1;
                loops.push((level, bounds));
                push_literal(&mut parts, &format!("{}[", segment.name));
                parts.push(NamePart::Index(level));
                push_literal(&mut parts, "].");
                reference.push_str(&format!("[{}].", index_variable(level)));
            }
            None => {
                push_literal(&mut parts, &format!("{}.", segment.name));
                reference.push('.');
            }
        }
    }

    reference.push_str(&alarm.variable_name);
    match alarm.bounds {
        Some(bounds) => {
            let level = loops.len() + 1;
            loops.push((level, bounds));
            push_literal(&mut parts, &format!("{}[", alarm.variable_name));
            parts.push(NamePart::Index(level));
            push_literal(&mut parts, "]");
            reference.push_str(&format!("[{}]", index_variable(level)));
        }
        None => push_literal(&mut parts, &alarm.variable_name),
    }

    let flag = format!("{}.{}", FLAG_VARIABLE, reference);
    let compare = |comparison| Condition {
        left: reference.clone(),
        comparison,
        right: flag.clone(),
    };

    let mut body = if loops.is_empty() {
        vec![
            Statement::If {
                condition: compare(Comparison::Rising),
                then: vec![core_call("MpAlarmXSet", Arg::Literal(reference.clone()))],
                otherwise: vec![],
            },
            Statement::If {
                condition: compare(Comparison::Falling),
                then: vec![core_call("MpAlarmXReset", Arg::Literal(reference.clone()))],
                otherwise: vec![],
            },
        ]
    } else {
        let name = || Arg::Variable(NAME_VARIABLE.to_string());
        let mut then = compose_name(&parts);
        then.push(Statement::If {
            condition: compare(Comparison::Rising),
            then: vec![core_call("MpAlarmXSet", name())],
            otherwise: vec![core_call("MpAlarmXReset", name())],
        });
        vec![Statement::If {
            condition: compare(Comparison::Changed),
            then,
            otherwise: vec![],
        }]
    };
    body.push(Statement::Assign {
        target: flag.clone(),
        value: reference.clone(),
    });

    let count = loops.len();
    for (level, bounds) in loops.into_iter().rev() {
        body = vec![Statement::For {
            level,
            bounds,
            body,
        }];
    }
    (body, count)
}

/// Adds the literal to the parts joining it with a literal before it.
fn push_literal(parts: &mut Vec<NamePart>, literal: &str) {
    if let Some(NamePart::Literal(last)) = parts.last_mut() {
        last.push_str(literal);
    } else {
        parts.push(NamePart::Literal(literal.to_string()));
    }
}

/// Returns the calls that compose the alarm name in the name variable.
fn compose_name(parts: &[NamePart]) -> Vec<Statement> {
    let mut statements = vec![clear(NAME_VARIABLE)];
    let mut copied = false;

    for part in parts {
        match part {
            NamePart::Literal(literal) => {
                let function = if copied { "brsstrcat" } else { "brsstrcpy" };
                copied = true;
                statements.push(Statement::Call {
                    function,
                    args: vec![
                        Arg::Address(NAME_VARIABLE.to_string()),
                        Arg::AddressOfLiteral(literal.clone()),
                    ],
                });
            }
            NamePart::Index(level) => {
                statements.push(clear(STRING_VARIABLE));
                statements.push(Statement::Call {
                    function: "brsitoa",
                    args: vec![
                        Arg::Variable(index_variable(*level)),
                        Arg::Address(STRING_VARIABLE.to_string()),
                    ],
                });
                statements.push(Statement::Call {
                    function: "brsstrcat",
                    args: vec![
                        Arg::Address(NAME_VARIABLE.to_string()),
                        Arg::Address(STRING_VARIABLE.to_string()),
                    ],
                });
            }
        }
    }
    statements
}

fn clear(variable: &str) -> Statement {
    Statement::Call {
        function: "brsmemset",
        args: vec![
            Arg::Address(variable.to_string()),
            Arg::Integer(0),
            Arg::SizeOf(variable.to_string()),
        ],
    }
}

fn core_call(function: &'static str, name: Arg) -> Statement {
    Statement::Call {
        function,
        args: vec![Arg::Core, name],
    }
}

/// Renders the statements. Every statement starts on a new line indented
/// by the level.
pub fn render(statements: &[Statement], level: usize, dialect: Dialect, out: &mut String) {
    for statement in statements {
        match statement {
            Statement::Blank => line(out, level, ""),
            Statement::Comment(text) => line(out, level, &format!("// {}", text)),
            Statement::For {
                level: loop_level,
                bounds,
                body,
            } => {
                let index = index_variable(*loop_level);
                match dialect {
                    Dialect::StructuredText => {
                        line(
                            out,
                            level,
                            &format!("FOR {} := {} TO {} DO", index, bounds.low, bounds.high),
                        );
                        render(body, level + 1, dialect, out);
                        line(out, level, "END_FOR;");
                    }
                    Dialect::C => {
                        line(
                            out,
                            level,
                            &format!(
                                "for ({index} = {}; {index} <= {}; {index}++)",
                                bounds.low,
                                bounds.high,
                                index = index
                            ),
                        );
                        block(body, level, dialect, out);
                    }
                }
            }
            Statement::If {
                condition,
                then,
                otherwise,
            } => {
                let condition = render_condition(condition, dialect);
                match dialect {
                    Dialect::StructuredText => {
                        line(out, level, &format!("IF ({}) THEN", condition));
                        render(then, level + 1, dialect, out);
                        if !otherwise.is_empty() {
                            line(out, level, "ELSE");
                            render(otherwise, level + 1, dialect, out);
                        }
                        line(out, level, "END_IF;");
                    }
                    Dialect::C => {
                        line(out, level, &format!("if ({})", condition));
                        block(then, level, dialect, out);
                        if !otherwise.is_empty() {
                            line(out, level, "else");
                            block(otherwise, level, dialect, out);
                        }
                    }
                }
            }
            Statement::Call { function, args } => {
                let args: Vec<String> = args.iter().map(|arg| render_arg(arg, dialect)).collect();
                line(out, level, &format!("{}({});", function, args.join(", ")));
            }
            Statement::Assign { target, value } => {
                let operator = match dialect {
                    Dialect::StructuredText => ":=",
                    Dialect::C => "=",
                };
                line(out, level, &format!("{}\t{} {};", target, operator, value));
            }
        }
    }
}

fn line(out: &mut String, level: usize, text: &str) {
    out.push('\n');
    for _ in 0..level {
        out.push('\t');
    }
    out.push_str(text);
}

fn block(statements: &[Statement], level: usize, dialect: Dialect, out: &mut String) {
    line(out, level, "{");
    render(statements, level + 1, dialect, out);
    line(out, level, "}");
}

fn render_condition(condition: &Condition, dialect: Dialect) -> String {
    let operator = match (condition.comparison, dialect) {
        (Comparison::Changed, Dialect::StructuredText) => "<>",
        (Comparison::Changed, Dialect::C) => "!=",
        (Comparison::Rising, _) => ">",
        (Comparison::Falling, _) => "<",
    };
    format!("{} {} {}", condition.left, operator, condition.right)
}

fn render_arg(arg: &Arg, dialect: Dialect) -> String {
    match (arg, dialect) {
        (Arg::Address(name), Dialect::StructuredText) => format!("ADR({})", name),
        (Arg::Address(name), Dialect::C) => format!("(UDINT)&({})", name),
        (Arg::AddressOfLiteral(text), Dialect::StructuredText) => format!("ADR('{}')", text),
        (Arg::AddressOfLiteral(text), Dialect::C) => format!("(UDINT)&(\"{}\")", text),
        (Arg::SizeOf(name), Dialect::StructuredText) => format!("SIZEOF({})", name),
        (Arg::SizeOf(name), Dialect::C) => format!("sizeof({})", name),
        (Arg::Integer(value), _) => value.to_string(),
        (Arg::Variable(name), _) => name.clone(),
        (Arg::Core, Dialect::StructuredText) => CORE_INSTANCE.to_string(),
        (Arg::Core, Dialect::C) => format!("&{}", CORE_INSTANCE),
        (Arg::Literal(text), Dialect::StructuredText) => format!("'{}'", text),
        (Arg::Literal(text), Dialect::C) => format!("\"{}\"", text),
    }
}

use log::trace;
use thiserror::Error;

use super::{
    config::Config,
    logic::{Constant, Formula, Predicate, Term, Variable},
    types::Type,
};

/// `Scope` identifies the construct a marker on the `LogicStack` was
/// pushed for.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Scope {
    EitherType,
    Not,
    And,
    Equals,
    ForAll,
    IfThen,
}

/// `Frame` is a single entry of the `LogicStack`.  Markers and open
/// predicates delimit the children of the construct currently being
/// built; every other frame is a finished value waiting to be collected.
#[derive(Debug)]
enum Frame {
    Marker(Scope),
    OpenPredicate(Option<String>), // Marker plus the pending predicate name.
    Type(Type),
    Term(Term),
    Predicate(Predicate),
    Formula(Formula),
}

impl Frame {
    fn kind(&self) -> &'static str {
        match self {
            Frame::Marker(Scope::EitherType) => "open either",
            Frame::Marker(Scope::Not) => "open not",
            Frame::Marker(Scope::And) => "open and",
            Frame::Marker(Scope::Equals) => "open =",
            Frame::Marker(Scope::ForAll) => "open forall",
            Frame::Marker(Scope::IfThen) => "open when",
            Frame::OpenPredicate(_) => "open predicate",
            Frame::Type(_) => "type",
            Frame::Term(Term::Variable(_)) => "variable",
            Frame::Term(Term::Constant(_)) => "constant",
            Frame::Predicate(_) => "predicate",
            Frame::Formula(_) => "formula",
        }
    }

    fn is_open(&self) -> bool {
        match self {
            Frame::Marker(_) | Frame::OpenPredicate(_) => true,
            _ => false,
        }
    }

    fn is_formula(&self) -> bool {
        match self {
            Frame::Predicate(_) | Frame::Formula(_) => true,
            _ => false,
        }
    }

    /// `into_formula` promotes a completed predicate to a literal.  Frames
    /// that are not formulas are handed back.
    fn into_formula(self) -> Result<Formula, Frame> {
        match self {
            Frame::Formula(f) => Ok(f),
            Frame::Predicate(p) => Ok(Formula::Literal(p)),
            other => Err(other),
        }
    }
}

/// `BuildErrorKind` describes why a `LogicStack` operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildErrorKind {
    /// No matching marker, or nothing to collect.
    #[error("stack underflow")]
    StackUnderflow,
    /// The wrong number of elements sat above a marker.
    #[error("expected {expected}, found {found} element(s)")]
    ArityError { expected: &'static str, found: usize },
    /// A value of the wrong kind was found where another was expected.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A predicate was closed before its name was recorded.
    #[error("predicate has no name")]
    MissingSymbol,
    /// A construct was closed by the wrong operation or left residue.
    #[error("unbalanced construct, found {0}")]
    UnbalancedConstruct(&'static str),
}

/// `BuildError` is returned when the sequence of operations applied to a
/// `LogicStack` does not describe a well-formed construct.  This points
/// to a mismatch between the grammar walk and the builder rather than to
/// bad input that could be recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{op}: {kind} (stack depth {depth})")]
pub struct BuildError {
    pub kind: BuildErrorKind,
    /// Name of the failed operation.
    pub op: &'static str,
    /// Stack depth when the operation was invoked.
    pub depth: usize,
}

impl BuildError {
    pub fn new(kind: BuildErrorKind, op: &'static str, depth: usize) -> Self {
        BuildError { kind, op, depth }
    }
}

/// `LogicStack` rebuilds types, terms, predicates and formulas from the
/// flat sequence of begin/end calls produced by walking a PDDL syntax
/// tree depth first.
///
/// Each `begin_*` pushes a marker.  Every value produced while the
/// construct is open lands above that marker, so the matching `end_*`
/// collects everything above the marker (in push order), builds the
/// result and replaces the whole span with it.  Leaf calls such as
/// `add_variable` push finished values directly.
///
/// A `LogicStack` serves a single parse and is never shared.
#[derive(Debug, Default)]
pub struct LogicStack {
    frames: Vec<Frame>,
    default_type: Option<Type>,
}

impl LogicStack {
    pub fn new() -> Self {
        LogicStack::default()
    }

    pub fn with_config(config: &Config) -> Self {
        LogicStack {
            frames: vec![],
            default_type: config.default_type.clone(),
        }
    }

    /// `is_empty` returns true if no frames are left on the stack.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// `ensure_empty` fails with `UnbalancedConstruct` if any frame is left
    /// on the stack.
    pub fn ensure_empty(&self, op: &'static str) -> Result<(), BuildError> {
        match self.frames.last() {
            None => Ok(()),
            Some(f) => Err(self.fail(op, BuildErrorKind::UnbalancedConstruct(f.kind()))),
        }
    }

    fn fail(&self, op: &'static str, kind: BuildErrorKind) -> BuildError {
        BuildError::new(kind, op, self.frames.len())
    }

    fn push(&mut self, op: &'static str, frame: Frame) {
        trace!("{}: push {} at depth {}", op, frame.kind(), self.frames.len());
        self.frames.push(frame);
    }

    fn innermost_open(&self) -> Option<usize> {
        self.frames.iter().rposition(Frame::is_open)
    }

    /// `close` removes the innermost marker, which must belong to `scope`,
    /// and returns every frame above it in push order.
    fn close(&mut self, op: &'static str, scope: Scope) -> Result<Vec<Frame>, BuildError> {
        let i = self
            .innermost_open()
            .ok_or_else(|| self.fail(op, BuildErrorKind::StackUnderflow))?;

        match &self.frames[i] {
            Frame::Marker(s) if *s == scope => {}
            f => return Err(self.fail(op, BuildErrorKind::UnbalancedConstruct(f.kind()))),
        }

        let children = self.frames.split_off(i + 1);
        self.frames.pop();
        trace!("{}: collected {} frame(s)", op, children.len());
        Ok(children)
    }

    fn settle_variable(&self, mut v: Variable) -> Variable {
        if v.ty.is_none() {
            v.ty = self.default_type.clone();
        }
        v
    }

    fn settle_constant(&self, mut c: Constant) -> Constant {
        if c.ty.is_none() {
            c.ty = self.default_type.clone();
        }
        c
    }

    // Types.

    pub fn push_primitive_type(&mut self, name: &str) {
        self.push("push_primitive_type", Frame::Type(Type::primitive(name)));
    }

    pub fn begin_either_type_list(&mut self) {
        self.push("begin_either_type_list", Frame::Marker(Scope::EitherType));
    }

    /// `end_either_type_list` unions every type pushed since
    /// `begin_either_type_list` into a single type.
    pub fn end_either_type_list(&mut self) -> Result<(), BuildError> {
        const OP: &str = "end_either_type_list";
        let depth = self.depth();

        let mut union: Option<Type> = None;
        for child in self.close(OP, Scope::EitherType)? {
            let ty = match child {
                Frame::Type(t) => t,
                other => {
                    let kind = BuildErrorKind::TypeMismatch {
                        expected: "type",
                        found: other.kind(),
                    };
                    return Err(BuildError::new(kind, OP, depth));
                }
            };
            union = Some(match union {
                Some(u) => u.union(ty),
                None => ty,
            });
        }

        let ty = union.ok_or_else(|| {
            let kind = BuildErrorKind::ArityError {
                expected: "at least one type",
                found: 0,
            };
            BuildError::new(kind, OP, depth)
        })?;
        self.push(OP, Frame::Type(ty));
        Ok(())
    }

    /// `apply_type` types the items of a typed list that just closed: the
    /// run of untyped variables or constants on top of the stack.  The run
    /// ends at a marker or at a term typed by an earlier list, so in
    /// `?a ?b - block ?c - table` only `?c` receives `table`.
    pub fn apply_type(&mut self, ty: Type) -> Result<(), BuildError> {
        const OP: &str = "apply_type";
        let mut applied = 0;

        for frame in self.frames.iter_mut().rev() {
            match frame {
                Frame::Term(t) if t.ty().is_none() => {
                    t.set_type(ty.clone());
                    applied += 1;
                }
                _ => break,
            }
        }

        if applied == 0 {
            return Err(self.fail(OP, BuildErrorKind::StackUnderflow));
        }
        trace!("{}: {} applied to {} term(s)", OP, ty, applied);
        Ok(())
    }

    // Terms.

    pub fn add_variable(&mut self, name: &str) {
        self.push("add_variable", Frame::Term(Term::variable(name)));
    }

    pub fn add_constant(&mut self, name: &str) {
        self.push("add_constant", Frame::Term(Term::constant(name)));
    }

    // Predicates.

    pub fn begin_predicate(&mut self) {
        self.push("begin_predicate", Frame::OpenPredicate(None));
    }

    /// `symbol` names the innermost open predicate.
    pub fn symbol(&mut self, name: &str) -> Result<(), BuildError> {
        const OP: &str = "symbol";
        let depth = self.depth();

        let slot = self.frames.iter_mut().rev().find_map(|f| match f {
            Frame::OpenPredicate(slot) => Some(slot),
            _ => None,
        });

        match slot {
            None => Err(BuildError::new(BuildErrorKind::StackUnderflow, OP, depth)),
            Some(Some(_)) => {
                let kind = BuildErrorKind::ArityError {
                    expected: "one predicate name",
                    found: 2,
                };
                Err(BuildError::new(kind, OP, depth))
            }
            Some(slot) => {
                *slot = Some(name.to_ascii_lowercase());
                Ok(())
            }
        }
    }

    /// `end_predicate` replaces the open predicate and the terms above it
    /// with the completed `Predicate`.
    pub fn end_predicate(&mut self) -> Result<(), BuildError> {
        const OP: &str = "end_predicate";
        let depth = self.depth();

        let i = self
            .innermost_open()
            .ok_or_else(|| self.fail(OP, BuildErrorKind::StackUnderflow))?;

        let name = match &mut self.frames[i] {
            Frame::OpenPredicate(name) => name.take(),
            f => {
                let kind = BuildErrorKind::UnbalancedConstruct(f.kind());
                return Err(BuildError::new(kind, OP, depth));
            }
        };
        let name = name.ok_or_else(|| BuildError::new(BuildErrorKind::MissingSymbol, OP, depth))?;

        let children = self.frames.split_off(i + 1);
        self.frames.pop();

        let mut terms = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Frame::Term(t) => terms.push(t),
                other => {
                    let kind = BuildErrorKind::TypeMismatch {
                        expected: "term",
                        found: other.kind(),
                    };
                    return Err(BuildError::new(kind, OP, depth));
                }
            }
        }

        self.push(OP, Frame::Predicate(Predicate { name, terms }));
        Ok(())
    }

    // Formulas.

    pub fn begin_not(&mut self) {
        self.push("begin_not", Frame::Marker(Scope::Not));
    }

    pub fn end_not(&mut self) -> Result<(), BuildError> {
        const OP: &str = "end_not";
        let depth = self.depth();
        let mut fs = formulas(OP, depth, self.close(OP, Scope::Not)?)?;

        if fs.len() != 1 {
            return Err(arity(OP, depth, "exactly one formula", fs.len()));
        }
        let f = Formula::Negation(Box::new(fs.remove(0)));
        self.push(OP, Frame::Formula(f));
        Ok(())
    }

    pub fn begin_and(&mut self) {
        self.push("begin_and", Frame::Marker(Scope::And));
    }

    /// `end_and` builds a conjunction of every formula above the marker in
    /// the order they were pushed.  No operands is the empty conjunction.
    pub fn end_and(&mut self) -> Result<(), BuildError> {
        const OP: &str = "end_and";
        let depth = self.depth();
        let fs = formulas(OP, depth, self.close(OP, Scope::And)?)?;

        self.push(OP, Frame::Formula(Formula::Conjunction(fs)));
        Ok(())
    }

    pub fn begin_equals(&mut self) {
        self.push("begin_equals", Frame::Marker(Scope::Equals));
    }

    pub fn end_equals(&mut self) -> Result<(), BuildError> {
        const OP: &str = "end_equals";
        let depth = self.depth();
        let children = self.close(OP, Scope::Equals)?;

        if children.len() != 2 {
            return Err(arity(OP, depth, "exactly two terms", children.len()));
        }

        let mut terms = Vec::with_capacity(2);
        for child in children {
            match child {
                Frame::Term(t) => terms.push(t),
                other => return Err(mismatch(OP, depth, "term", &other)),
            }
        }
        let right = terms.pop();
        let left = terms.pop();

        match (left, right) {
            (Some(l), Some(r)) => {
                self.push(OP, Frame::Formula(Formula::Equality(l, r)));
                Ok(())
            }
            _ => Err(arity(OP, depth, "exactly two terms", 0)),
        }
    }

    pub fn begin_for_all(&mut self) {
        self.push("begin_for_all", Frame::Marker(Scope::ForAll));
    }

    /// `end_for_all` expects the bound variables followed by a single body
    /// formula above its marker.
    pub fn end_for_all(&mut self) -> Result<(), BuildError> {
        const OP: &str = "end_for_all";
        let depth = self.depth();
        let mut children = self.close(OP, Scope::ForAll)?;

        let bodies = children.iter().filter(|f| f.is_formula()).count();
        if bodies != 1 {
            return Err(arity(OP, depth, "exactly one body formula", bodies));
        }

        let body = match children.pop().map(Frame::into_formula) {
            Some(Ok(f)) => f,
            Some(Err(other)) => return Err(mismatch(OP, depth, "formula", &other)),
            None => return Err(arity(OP, depth, "exactly one body formula", 0)),
        };

        let mut variables = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Frame::Term(Term::Variable(v)) => variables.push(self.settle_variable(v)),
                other => return Err(mismatch(OP, depth, "variable", &other)),
            }
        }

        let f = Formula::Quantification(variables, Box::new(body));
        self.push(OP, Frame::Formula(f));
        Ok(())
    }

    pub fn begin_if_then(&mut self) {
        self.push("begin_if_then", Frame::Marker(Scope::IfThen));
    }

    /// `end_if_then` builds a conditional effect from the condition and
    /// the effect, pushed in that order.
    pub fn end_if_then(&mut self) -> Result<(), BuildError> {
        const OP: &str = "end_if_then";
        let depth = self.depth();
        let fs = formulas(OP, depth, self.close(OP, Scope::IfThen)?)?;

        if fs.len() != 2 {
            return Err(arity(OP, depth, "a condition and an effect", fs.len()));
        }
        let mut fs = fs.into_iter();

        match (fs.next(), fs.next()) {
            (Some(cond), Some(effect)) => {
                let f = Formula::Conditional(Box::new(cond), Box::new(effect));
                self.push(OP, Frame::Formula(f));
                Ok(())
            }
            _ => Err(arity(OP, depth, "a condition and an effect", 0)),
        }
    }

    // Retrieval.

    /// `take` pops the top frame and converts it with `f`.  A frame `f`
    /// rejects is put back and reported as a `TypeMismatch`.
    fn take<T, F>(&mut self, op: &'static str, expected: &'static str, f: F) -> Result<T, BuildError>
    where
        F: FnOnce(&Self, Frame) -> Result<T, Frame>,
    {
        let depth = self.depth();
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| BuildError::new(BuildErrorKind::StackUnderflow, op, depth))?;

        match f(&*self, frame) {
            Ok(v) => {
                trace!("{}: took {} at depth {}", op, expected, depth);
                Ok(v)
            }
            Err(frame) => {
                let err = mismatch(op, depth, expected, &frame);
                self.frames.push(frame);
                Err(err)
            }
        }
    }

    /// `take_run` removes the longest run of frames on top of the stack
    /// that satisfy `pred` and returns them in push order.
    fn take_run<P>(&mut self, pred: P) -> Vec<Frame>
    where
        P: Fn(&Frame) -> bool,
    {
        let start = self
            .frames
            .iter()
            .rposition(|f| !pred(f))
            .map_or(0, |i| i + 1);
        self.frames.split_off(start)
    }

    pub fn take_type(&mut self) -> Result<Type, BuildError> {
        self.take("take_type", "type", |_, frame| match frame {
            Frame::Type(t) => Ok(t),
            other => Err(other),
        })
    }

    /// `take_types` removes every type on top of the stack, e.g. the
    /// names of a `:types` declaration list.
    pub fn take_types(&mut self) -> Vec<Type> {
        self.take_run(|f| matches!(f, Frame::Type(_)))
            .into_iter()
            .filter_map(|f| match f {
                Frame::Type(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn take_constant(&mut self) -> Result<Constant, BuildError> {
        self.take("take_constant", "constant", |s, frame| match frame {
            Frame::Term(Term::Constant(c)) => Ok(s.settle_constant(c)),
            other => Err(other),
        })
    }

    /// `take_constants` removes every constant on top of the stack, e.g.
    /// the declarations of an `:objects` section.
    pub fn take_constants(&mut self) -> Vec<Constant> {
        self.take_run(|f| matches!(f, Frame::Term(Term::Constant(_))))
            .into_iter()
            .filter_map(|f| match f {
                Frame::Term(Term::Constant(c)) => Some(self.settle_constant(c)),
                _ => None,
            })
            .collect()
    }

    /// `take_predicate` removes a completed predicate.  Untyped variables
    /// of the predicate receive the configured default type.
    pub fn take_predicate(&mut self) -> Result<Predicate, BuildError> {
        self.take("take_predicate", "predicate", |s, frame| match frame {
            Frame::Predicate(mut p) => {
                for t in p.terms.iter_mut() {
                    if let Term::Variable(v) = t {
                        if v.ty.is_none() {
                            v.ty = s.default_type.clone();
                        }
                    }
                }
                Ok(p)
            }
            other => Err(other),
        })
    }

    /// `take_optional_formula` removes a completed formula.  An empty
    /// stack means the formula was omitted and yields `None`.
    pub fn take_optional_formula(&mut self) -> Result<Option<Formula>, BuildError> {
        if self.is_empty() {
            trace!("take_optional_formula: absent");
            return Ok(None);
        }
        self.take("take_optional_formula", "formula", |_, frame| frame.into_formula())
            .map(Some)
    }

    /// `take_variables` removes every variable on top of the stack, e.g.
    /// the `:parameters` of an action.
    pub fn take_variables(&mut self) -> Vec<Variable> {
        self.take_run(|f| matches!(f, Frame::Term(Term::Variable(_))))
            .into_iter()
            .filter_map(|f| match f {
                Frame::Term(Term::Variable(v)) => Some(self.settle_variable(v)),
                _ => None,
            })
            .collect()
    }
}

fn arity(op: &'static str, depth: usize, expected: &'static str, found: usize) -> BuildError {
    BuildError::new(BuildErrorKind::ArityError { expected, found }, op, depth)
}

fn mismatch(op: &'static str, depth: usize, expected: &'static str, found: &Frame) -> BuildError {
    let kind = BuildErrorKind::TypeMismatch {
        expected,
        found: found.kind(),
    };
    BuildError::new(kind, op, depth)
}

/// `formulas` converts collected children to formulas, promoting
/// predicates to literals.
fn formulas(op: &'static str, depth: usize, children: Vec<Frame>) -> Result<Vec<Formula>, BuildError> {
    children
        .into_iter()
        .map(|c| c.into_formula().map_err(|other| mismatch(op, depth, "formula", &other)))
        .collect()
}

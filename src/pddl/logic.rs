use std::fmt;

use super::types::Type;

/// `Variable` is a `?`-prefixed term.  The name is stored without the
/// sigil and in lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub name: String,
    /// Type given by an enclosing typed list, if any.
    pub ty: Option<Type>,
}

impl Variable {
    pub fn new(name: &str) -> Self {
        Variable {
            name: name.trim_start_matches('?').to_ascii_lowercase(),
            ty: None,
        }
    }

    pub fn typed(name: &str, ty: Type) -> Self {
        Variable {
            ty: Some(ty),
            ..Variable::new(name)
        }
    }
}

/// `Constant` is a named object.  Constants are typed when declared in
/// `:constants` or `:objects` and untyped when used as a ground term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constant {
    pub name: String,
    pub ty: Option<Type>,
}

impl Constant {
    pub fn new(name: &str) -> Self {
        Constant {
            name: name.to_ascii_lowercase(),
            ty: None,
        }
    }

    pub fn typed(name: &str, ty: Type) -> Self {
        Constant {
            ty: Some(ty),
            ..Constant::new(name)
        }
    }
}

/// `Term` is an argument of a predicate or an operand of an equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Variable(Variable),
    Constant(Constant),
}

impl Term {
    pub fn variable(name: &str) -> Self {
        Term::Variable(Variable::new(name))
    }

    pub fn constant(name: &str) -> Self {
        Term::Constant(Constant::new(name))
    }

    pub fn ty(&self) -> Option<&Type> {
        match self {
            Term::Variable(v) => v.ty.as_ref(),
            Term::Constant(c) => c.ty.as_ref(),
        }
    }

    pub(crate) fn set_type(&mut self, ty: Type) {
        match self {
            Term::Variable(v) => v.ty = Some(ty),
            Term::Constant(c) => c.ty = Some(ty),
        }
    }
}

/// `Predicate` is a named relation applied to an ordered list of terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    pub name: String,
    pub terms: Vec<Term>,
}

impl Predicate {
    pub fn new(name: &str, terms: Vec<Term>) -> Self {
        Predicate {
            name: name.to_ascii_lowercase(),
            terms,
        }
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }
}

/// `Formula` is a goal description or an effect.  The tree owns its
/// children and is never modified once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    Literal(Predicate),
    Negation(Box<Formula>),
    /// An empty conjunction is the trivially true formula.
    Conjunction(Vec<Formula>),
    Equality(Term, Term),
    /// Universal quantification of the bound variables over the body.
    Quantification(Vec<Variable>, Box<Formula>),
    /// Conditional effect: the effect (second) applies when the condition
    /// (first) holds.
    Conditional(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn literal(name: &str, terms: Vec<Term>) -> Self {
        Formula::Literal(Predicate::new(name, terms))
    }

    pub fn not(f: Formula) -> Self {
        Formula::Negation(Box::new(f))
    }

    pub fn and(fs: Vec<Formula>) -> Self {
        Formula::Conjunction(fs)
    }

    pub fn forall(variables: Vec<Variable>, body: Formula) -> Self {
        Formula::Quantification(variables, Box::new(body))
    }

    pub fn when(condition: Formula, effect: Formula) -> Self {
        Formula::Conditional(Box::new(condition), Box::new(effect))
    }

    /// `is_atomic` returns true for a literal or its negation.
    pub fn is_atomic(&self) -> bool {
        match self {
            Formula::Literal(_) => true,
            Formula::Negation(f) => matches!(**f, Formula::Literal(_)),
            _ => false,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => v.fmt(f),
            Term::Constant(c) => c.fmt(f),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for t in &self.terms {
            write!(f, " {}", t)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Literal(p) => p.fmt(f),
            Formula::Negation(g) => write!(f, "(not {})", g),
            Formula::Conjunction(gs) => {
                f.write_str("(and")?;
                for g in gs {
                    write!(f, " {}", g)?;
                }
                f.write_str(")")
            }
            Formula::Equality(l, r) => write!(f, "(= {} {})", l, r),
            Formula::Quantification(vars, body) => {
                f.write_str("(forall (")?;
                write_typed_list(f, vars)?;
                write!(f, ") {})", body)
            }
            Formula::Conditional(cond, effect) => write!(f, "(when {} {})", cond, effect),
        }
    }
}

/// `write_typed_list` writes `vars` the way they would appear in source,
/// grouping consecutive variables of the same type behind a single `-`.
fn write_typed_list(f: &mut fmt::Formatter<'_>, vars: &[Variable]) -> fmt::Result {
    for (i, v) in vars.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", v)?;

        let next_ty = vars.get(i + 1).map(|n| n.ty.as_ref());
        if let Some(ty) = &v.ty {
            if next_ty != Some(Some(ty)) {
                write!(f, " - {}", ty)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_are_lowercase() {
        assert_eq!(Variable::new("?X").name, "x");
        assert_eq!(Constant::new("A").name, "a");
        assert_eq!(Predicate::new("On-Table", vec![]).name, "on-table");
    }

    #[test]
    fn display_formula() {
        let block = Type::primitive("block");
        let f = Formula::forall(
            vec![
                Variable::typed("x", block.clone()),
                Variable::typed("y", block),
                Variable::new("z"),
            ],
            Formula::and(vec![
                Formula::literal("clear", vec![Term::variable("x")]),
                Formula::not(Formula::Equality(Term::variable("x"), Term::constant("a"))),
                Formula::when(
                    Formula::literal("on", vec![Term::variable("x"), Term::variable("y")]),
                    Formula::and(vec![]),
                ),
            ]),
        );

        assert_eq!(
            f.to_string(),
            "(forall (?x ?y - block ?z) (and (clear ?x) (not (= ?x a)) (when (on ?x ?y) (and))))"
        );
    }

    #[test]
    fn atomic_formulas() {
        let p = Formula::literal("p", vec![]);

        assert!(p.is_atomic());
        assert!(Formula::not(p.clone()).is_atomic());
        assert!(!Formula::not(Formula::not(p.clone())).is_atomic());
        assert!(!Formula::and(vec![p]).is_atomic());
    }
}

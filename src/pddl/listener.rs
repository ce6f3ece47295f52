use super::stack::{BuildError, LogicStack};

/// `Construct` is a grammar production whose start and end are reported
/// to a `Listener`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Construct {
    /// `(either t1 t2 ...)`.
    EitherType,
    /// Items followed by `- type` inside a variable or constant list.
    TypedList,
    /// `(name term*)`, either used in a formula or declared.
    Predicate,
    Not,
    And,
    Equality,
    ForAll,
    When,

    // Top-level productions; the builder ignores these and leaves them
    // to whoever assembles the domain or problem.
    /// The `:types` section.
    Types,
    /// Type names followed by `- parent` inside `:types`.
    SubtypesOfType,
    /// The `:constants` section of a domain.
    Constants,
    /// The `:objects` section of a problem.
    Objects,
    /// A single declaration within `:predicates`.
    PredicateDefinition,
    /// The `:parameters` list of an action.
    Parameters,
    /// The formula following `:precondition`.
    Precondition,
    /// The formula following `:effect`.
    Effect,
    /// A single literal within `:init`.
    InitLiteral,
    /// The formula following `:goal`.
    Goal,
}

/// `Leaf` is the kind of a name token reported to a `Listener`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Leaf {
    PrimitiveType,
    Variable,
    Constant,
    PredicateName,
}

/// `Event` is a single notification of a depth-first walk over PDDL
/// source.  `Enter` and `Exit` of a construct bracket the events of its
/// children.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Event<'a> {
    Enter(Construct),
    Exit(Construct),
    /// A name token; variables are reported without their `?`.
    Leaf(Leaf, &'a str),
}

/// `Listener` receives the events of a walk in order.
pub trait Listener {
    fn on_event(&mut self, event: Event<'_>) -> Result<(), BuildError>;
}

impl Listener for LogicStack {
    /// Maps each logic event to one `LogicStack` operation.  Closing a
    /// typed list takes the type just built and applies it to the items
    /// of the list.
    fn on_event(&mut self, event: Event<'_>) -> Result<(), BuildError> {
        match event {
            Event::Leaf(Leaf::PrimitiveType, name) => self.push_primitive_type(name),
            Event::Leaf(Leaf::Variable, name) => self.add_variable(name),
            Event::Leaf(Leaf::Constant, name) => self.add_constant(name),
            Event::Leaf(Leaf::PredicateName, name) => self.symbol(name)?,

            Event::Enter(Construct::EitherType) => self.begin_either_type_list(),
            Event::Exit(Construct::EitherType) => self.end_either_type_list()?,
            Event::Exit(Construct::TypedList) => {
                let ty = self.take_type()?;
                self.apply_type(ty)?;
            }
            Event::Enter(Construct::Predicate) => self.begin_predicate(),
            Event::Exit(Construct::Predicate) => self.end_predicate()?,
            Event::Enter(Construct::Not) => self.begin_not(),
            Event::Exit(Construct::Not) => self.end_not()?,
            Event::Enter(Construct::And) => self.begin_and(),
            Event::Exit(Construct::And) => self.end_and()?,
            Event::Enter(Construct::Equality) => self.begin_equals(),
            Event::Exit(Construct::Equality) => self.end_equals()?,
            Event::Enter(Construct::ForAll) => self.begin_for_all(),
            Event::Exit(Construct::ForAll) => self.end_for_all()?,
            Event::Enter(Construct::When) => self.begin_if_then(),
            Event::Exit(Construct::When) => self.end_if_then()?,

            Event::Enter(_) | Event::Exit(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pddl::{
        logic::{Formula, Term, Variable},
        types::Type,
    };

    fn replay(events: &[Event]) -> Result<LogicStack, BuildError> {
        let mut s = LogicStack::new();
        for &e in events {
            s.on_event(e)?;
        }
        Ok(s)
    }

    #[test]
    fn forall_events() -> Result<(), BuildError> {
        // (forall (?x - block) (clear ?x))
        let mut s = replay(&[
            Event::Enter(Construct::ForAll),
            Event::Enter(Construct::TypedList),
            Event::Leaf(Leaf::Variable, "x"),
            Event::Leaf(Leaf::PrimitiveType, "block"),
            Event::Exit(Construct::TypedList),
            Event::Enter(Construct::Predicate),
            Event::Leaf(Leaf::PredicateName, "clear"),
            Event::Leaf(Leaf::Variable, "x"),
            Event::Exit(Construct::Predicate),
            Event::Exit(Construct::ForAll),
        ])?;

        assert_eq!(
            s.take_optional_formula()?,
            Some(Formula::forall(
                vec![Variable::typed("x", Type::primitive("block"))],
                Formula::literal("clear", vec![Term::variable("x")]),
            ))
        );
        assert!(s.is_empty());
        Ok(())
    }

    #[test]
    fn either_typed_list_events() -> Result<(), BuildError> {
        // ?x ?y - (either block table)
        let mut s = replay(&[
            Event::Enter(Construct::Parameters),
            Event::Enter(Construct::TypedList),
            Event::Leaf(Leaf::Variable, "x"),
            Event::Leaf(Leaf::Variable, "y"),
            Event::Enter(Construct::EitherType),
            Event::Leaf(Leaf::PrimitiveType, "block"),
            Event::Leaf(Leaf::PrimitiveType, "table"),
            Event::Exit(Construct::EitherType),
            Event::Exit(Construct::TypedList),
            Event::Exit(Construct::Parameters),
        ])?;

        let either = Type::either(&["block", "table"]).unwrap();
        assert_eq!(
            s.take_variables(),
            vec![
                Variable::typed("x", either.clone()),
                Variable::typed("y", either),
            ]
        );
        Ok(())
    }

    #[test]
    fn top_level_constructs_are_ignored() -> Result<(), BuildError> {
        let s = replay(&[
            Event::Enter(Construct::Goal),
            Event::Exit(Construct::Goal),
            Event::Enter(Construct::Types),
            Event::Exit(Construct::Types),
        ])?;

        assert!(s.is_empty());
        Ok(())
    }

    #[test]
    fn errors_pass_through() {
        let e = replay(&[Event::Exit(Construct::Not)]).unwrap_err();
        assert_eq!(e.op, "end_not");
    }
}

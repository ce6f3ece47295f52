use log::debug;

use super::{
    config::Config,
    listener::{Construct, Event, Listener},
    logic::{Constant, Formula, Predicate, Variable},
    stack::{BuildError, BuildErrorKind, LogicStack},
    types::{Type, TypeDefinition},
};

/// `Assembler` listens to the walk of a single top-level section.  Logic
/// events are handed to its `LogicStack`; when a top-level production
/// closes, the finished values are taken off the stack and the stack must
/// be empty again.
#[derive(Debug, Default)]
pub struct Assembler {
    stack: LogicStack,

    pub types: Vec<TypeDefinition>, // Declarations of :types.
    pub constants: Vec<Constant>,   // Declarations of :constants or :objects.
    pub predicates: Vec<Predicate>, // Declarations of :predicates.
    pub parameters: Vec<Variable>,  // :parameters of an action.
    pub precondition: Option<Formula>,
    pub effect: Option<Formula>,
    pub init: Vec<Formula>,
    pub goal: Option<Formula>,
}

impl Assembler {
    pub fn new(config: &Config) -> Self {
        Assembler {
            stack: LogicStack::with_config(config),
            ..Assembler::default()
        }
    }

    /// `subtypes` records a `name* - parent` group of the `:types`
    /// section.
    fn subtypes(&mut self) -> Result<(), BuildError> {
        let parent = self.stack.take_type()?;
        self.declare_types(parent)
    }

    fn declare_types(&mut self, parent: Type) -> Result<(), BuildError> {
        let names = self.stack.take_types();
        if names.is_empty() {
            let kind = BuildErrorKind::ArityError {
                expected: "at least one type name",
                found: 0,
            };
            return Err(BuildError::new(kind, "types", self.stack.depth()));
        }

        for name in names {
            match name.primitive_name() {
                Some(n) => self.types.push(TypeDefinition::new(n, parent.clone())),
                None => {
                    let kind = BuildErrorKind::TypeMismatch {
                        expected: "type name",
                        found: "either type",
                    };
                    return Err(BuildError::new(kind, "types", self.stack.depth()));
                }
            }
        }
        Ok(())
    }

    /// `close` handles the end of a top-level production.
    fn close(&mut self, c: Construct) -> Result<(), BuildError> {
        match c {
            Construct::SubtypesOfType => return self.subtypes(),
            Construct::Types => {
                // Trailing names without a parent derive from object.
                if !self.stack.is_empty() {
                    self.declare_types(Type::object())?;
                }
                debug!("{} type(s) declared", self.types.len());
                self.stack.ensure_empty("types")?;
            }
            Construct::Constants | Construct::Objects => {
                self.constants = self.stack.take_constants();
                debug!("{} object(s) declared", self.constants.len());
                self.stack.ensure_empty("objects")?;
            }
            Construct::PredicateDefinition => {
                let p = self.stack.take_predicate()?;
                debug!("predicate {} declared", p);
                self.predicates.push(p);
                self.stack.ensure_empty("predicate definition")?;
            }
            Construct::Parameters => {
                self.parameters = self.stack.take_variables();
                self.stack.ensure_empty("parameters")?;
            }
            Construct::Precondition => {
                self.precondition = self.stack.take_optional_formula()?;
                self.stack.ensure_empty("precondition")?;
            }
            Construct::Effect => {
                self.effect = self.stack.take_optional_formula()?;
                self.stack.ensure_empty("effect")?;
            }
            Construct::InitLiteral => {
                let depth = self.stack.depth();
                let f = self
                    .stack
                    .take_optional_formula()?
                    .ok_or_else(|| BuildError::new(BuildErrorKind::StackUnderflow, "init", depth))?;
                self.init.push(f);
                self.stack.ensure_empty("init")?;
            }
            Construct::Goal => {
                self.goal = self.stack.take_optional_formula()?;
                debug!("goal {}", if self.goal.is_some() { "set" } else { "omitted" });
                self.stack.ensure_empty("goal")?;
            }
            _ => return self.stack.on_event(Event::Exit(c)),
        }
        Ok(())
    }
}

impl Listener for Assembler {
    fn on_event(&mut self, event: Event<'_>) -> Result<(), BuildError> {
        match event {
            Event::Exit(c) => self.close(c),
            _ => self.stack.on_event(event),
        }
    }
}

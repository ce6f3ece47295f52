pub mod assembler;
pub mod config;
pub mod listener;
pub mod logic;
pub mod scanner;
pub mod stack;
pub mod types;

mod parser;
mod reqs;

#[cfg(test)]
mod problem_test;


use self::{
    assembler::Assembler,
    parser::{Parse, Parser, ParsingWhat},
    reqs::Reqs,
    scanner::{Scanner, Token, TokenType},
    types::Types,
};

pub use self::{
    config::Config,
    listener::{Construct, Event, Leaf, Listener},
    logic::{Constant, Formula, Predicate, Term, Variable},
    parser::{Error, ErrorType},
    reqs::Requirement,
    stack::{BuildError, BuildErrorKind, LogicStack},
    types::{Type, TypeDefinition},
};

use log::debug;
use rayon::prelude::*;

pub type Errors = Vec<Error>;

/// `Domain` represents the final output from parsing the contents
/// representing some PDDL domain.
#[derive(Debug, Default)]
pub struct Domain {
    /// The parsed domain name.
    pub name: String,
    /// Parsed (:types) in declaration order.
    pub types: Vec<TypeDefinition>,
    /// Parsed (:constants) in declaration order.
    pub constants: Vec<Constant>,
    /// Parsed (:predicates) in declaration order.
    pub predicates: Vec<Predicate>,
    /// Parsed (:action ...) definitions in source order.
    pub actions: Vec<Action>,

    reqs: Reqs,       // Parsed (:requirements).
    hierarchy: Types, // Subtype relation built from `types`.
}

impl Domain {
    /// `is_domain` return true if `src` represents a PDDL domain.
    /// Only the first few tokens of `src` is paresed to make this
    /// determination.
    pub fn is_domain(src: &str) -> bool {
        is_define(src, "domain")
    }

    /// `parse` returns a complete domain represented by the PDDL domain
    /// within `src.`  Returns one or many `Error`s if any syntax error or
    /// malformed construct is encountered.  Unannotated declarations are
    /// left untyped.
    pub fn parse(src: &str) -> Result<Self, Errors> {
        Domain::parse_with(src, &Config::default())
    }

    /// `parse_with` is like `parse` but follows the choices of `config`.
    pub fn parse_with(src: &str, config: &Config) -> Result<Self, Errors> {
        Domain::parse_sections(src, config, true)
    }

    /// `parse_seq` is like `parse` but only parses `src` sequentially and
    /// employs no parallelism.  It is provided mainly for benchmark testing
    /// of `parse`.
    pub fn parse_seq(src: &str) -> Result<Self, Errors> {
        Domain::parse_seq_with(src, &Config::default())
    }

    /// `parse_seq_with` is the sequential counterpart of `parse_with`.
    pub fn parse_seq_with(src: &str, config: &Config) -> Result<Self, Errors> {
        Domain::parse_sections(src, config, false)
    }

    fn parse_sections(src: &str, config: &Config, parallel: bool) -> Result<Self, Errors> {
        let tokens = scanner::scan(src);
        let mut top = Parser::new(src, &tokens);
        let top_parse: Parse = top.domain_top().map_err(|e| vec![e])?;

        let mut jobs: Vec<(ParsingWhat, usize)> = vec![];
        if let Some(pos) = top_parse.types_pos {
            jobs.push((ParsingWhat::Types, pos));
        }
        if let Some(pos) = top_parse.const_pos {
            jobs.push((ParsingWhat::Constants, pos));
        }
        if let Some(pos) = top_parse.pred_pos {
            jobs.push((ParsingWhat::Predicates, pos));
        }
        for &pos in &top_parse.action_pos {
            jobs.push((ParsingWhat::Action, pos));
        }

        let walker = Walker {
            src,
            tokens: &tokens,
            reqs: top_parse.reqs,
            gated: top_parse.gated,
            config,
        };
        let sections = walker.run(&jobs, parallel)?;

        let mut dom = Domain {
            name: top_parse.name.to_ascii_lowercase(),
            reqs: top_parse.reqs,
            ..Domain::default()
        };

        for section in sections {
            let asm = section.asm;
            match section.what {
                ParsingWhat::Types => dom.types = asm.types,
                ParsingWhat::Constants => dom.constants = asm.constants,
                ParsingWhat::Predicates => dom.predicates = asm.predicates,
                ParsingWhat::Action => {
                    if let Some(tok) = section.name {
                        dom.actions.push(Action {
                            name: tok.to_str(src).to_ascii_lowercase(),
                            parameters: asm.parameters,
                            precondition: asm.precondition,
                            effect: asm.effect,
                            line: tok.line,
                            col: tok.col,
                        });
                    }
                }
                _ => continue,
            }
        }

        dom.hierarchy = Types::from_definitions(&dom.types);
        debug!(
            "domain {} parsed: {} type(s), {} predicate(s), {} action(s)",
            dom.name,
            dom.types.len(),
            dom.predicates.len(),
            dom.actions.len()
        );
        Ok(dom)
    }

    /// `has_requirement` returns true if this `Domain` has the requirement of `r`.
    pub fn has_requirement(&self, r: Requirement) -> bool {
        self.reqs.has(r)
    }

    /// `requirements` returns the declared requirements, including those
    /// implied by them.
    pub fn requirements(&self) -> impl Iterator<Item = Requirement> {
        self.reqs.iter()
    }

    /// `is_subtype_of` returns true if the type `child` is `parent` or
    /// derives from it through the `:types` declarations.
    pub fn is_subtype_of(&self, child: &str, parent: &str) -> bool {
        self.hierarchy.is_subtype_of(child, parent)
    }

    /// `predicate` returns the declaration of the predicate `name`.
    pub fn predicate(&self, name: &str) -> Option<&Predicate> {
        self.predicates
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// `action` returns the action `name`.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// `Action` is a PDDL action that is declared within a domain description.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Action's name in lowercase form.
    pub name: String,
    /// Parameters of the action.
    pub parameters: Vec<Variable>,
    /// Possible precondition of the action.
    pub precondition: Option<Formula>,
    /// Possible effect of the action.
    pub effect: Option<Formula>,
    /// Line number where the action is defined.
    pub line: usize,
    /// Column number where the action is defined.
    pub col: usize,
}

/// `Problem` represents the final output from parsing the contents
/// representing some PDDL problem.
#[derive(Debug, Default)]
pub struct Problem {
    /// The parsed problem name.
    pub name: String,
    /// Name of the domain the problem belongs to.
    pub domain: String,
    /// Parsed (:objects) in declaration order.
    pub objects: Vec<Constant>,
    /// Parsed (:init): ground atoms and negated ground atoms.
    pub init: Vec<Formula>,
    /// Parsed (:goal); `None` when omitted.
    pub goal: Option<Formula>,

    reqs: Reqs, // Parsed (:requirements).
}

impl Problem {
    /// `is_problem` return true if `src` represents a PDDL problem.
    /// Only the first few tokens of `src` is paresed to make this
    /// determination.
    pub fn is_problem(src: &str) -> bool {
        is_define(src, "problem")
    }

    /// `parse` returns a complete problem represented by the PDDL problem
    /// within `src`.
    pub fn parse(src: &str) -> Result<Self, Errors> {
        Problem::parse_with(src, &Config::default())
    }

    /// `parse_with` is like `parse` but follows the choices of `config`.
    pub fn parse_with(src: &str, config: &Config) -> Result<Self, Errors> {
        Problem::parse_sections(src, config, true)
    }

    /// `parse_seq` is like `parse` but employs no parallelism.
    pub fn parse_seq(src: &str) -> Result<Self, Errors> {
        Problem::parse_seq_with(src, &Config::default())
    }

    /// `parse_seq_with` is the sequential counterpart of `parse_with`.
    pub fn parse_seq_with(src: &str, config: &Config) -> Result<Self, Errors> {
        Problem::parse_sections(src, config, false)
    }

    fn parse_sections(src: &str, config: &Config, parallel: bool) -> Result<Self, Errors> {
        let tokens = scanner::scan(src);
        let mut top = Parser::new(src, &tokens);
        let top_parse: Parse = top.problem_top().map_err(|e| vec![e])?;

        let mut jobs: Vec<(ParsingWhat, usize)> = vec![];
        if let Some(pos) = top_parse.objects_pos {
            jobs.push((ParsingWhat::Objects, pos));
        }
        if let Some(pos) = top_parse.init_pos {
            jobs.push((ParsingWhat::Init, pos));
        }
        if let Some(pos) = top_parse.goal_pos {
            jobs.push((ParsingWhat::Goal, pos));
        }

        let walker = Walker {
            src,
            tokens: &tokens,
            reqs: top_parse.reqs,
            gated: top_parse.gated,
            config,
        };
        let sections = walker.run(&jobs, parallel)?;

        let mut prob = Problem {
            name: top_parse.problem.to_ascii_lowercase(),
            domain: top_parse.name.to_ascii_lowercase(),
            reqs: top_parse.reqs,
            ..Problem::default()
        };

        for section in sections {
            match section.what {
                ParsingWhat::Objects => prob.objects = section.asm.constants,
                ParsingWhat::Init => prob.init = section.asm.init,
                ParsingWhat::Goal => prob.goal = section.asm.goal,
                _ => continue,
            }
        }

        debug!(
            "problem {} parsed: {} object(s), {} init literal(s)",
            prob.name,
            prob.objects.len(),
            prob.init.len()
        );
        Ok(prob)
    }

    /// `has_requirement` returns true if this `Problem` has the requirement of `r`.
    pub fn has_requirement(&self, r: Requirement) -> bool {
        self.reqs.has(r)
    }

    pub fn requirements(&self) -> impl Iterator<Item = Requirement> {
        self.reqs.iter()
    }
}

/// `is_define` returns true if `src` starts with `(define (what`.
fn is_define(src: &str, what: &str) -> bool {
    let mut lex = Scanner::new(src);

    lex.next()
        .filter(|t| t.what == TokenType::LParen)
        .and_then(|_| lex.next())
        .filter(|t| t.is_ident(src, "define"))
        .and_then(|_| lex.next())
        .filter(|t| t.what == TokenType::LParen)
        .and_then(|_| lex.next())
        .filter(|t| t.is_ident(src, what))
        .is_some()
}

/// `Section` is the outcome of walking one top-level section.
struct Section {
    what: ParsingWhat,
    asm: Assembler,
    name: Option<Token>, // Name of an :action.
}

/// `Walker` holds what every section walk of one source shares.
struct Walker<'a> {
    src: &'a str,
    tokens: &'a [Token],
    reqs: Reqs,
    gated: bool,
    config: &'a Config,
}

impl<'a> Walker<'a> {
    /// `walk` walks the section `what` starting at token `pos` with a fresh
    /// `Assembler`.
    fn walk(&self, what: ParsingWhat, pos: usize) -> Result<Section, Error> {
        let mut p = Parser::new(self.src, self.tokens);

        p.tokpos = pos;
        p.reqs = self.reqs;
        p.gated = self.gated;
        p.what = what;

        let mut asm = Assembler::new(self.config);
        let name = p.section(&mut asm)?;
        Ok(Section { what, asm, name })
    }

    /// `run` walks every job, in parallel if requested, and returns the
    /// sections in job order or every error encountered.
    fn run(&self, jobs: &[(ParsingWhat, usize)], parallel: bool) -> Result<Vec<Section>, Errors> {
        let results: Vec<Result<Section, Error>> = if parallel {
            jobs.par_iter()
                .map(|&(what, pos)| self.walk(what, pos))
                .collect()
        } else {
            jobs.iter()
                .map(|&(what, pos)| self.walk(what, pos))
                .collect()
        };

        let mut sections = Vec::with_capacity(results.len());
        let mut errors: Errors = vec![];

        for result in results {
            match result {
                Ok(s) => sections.push(s),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(sections)
    }
}

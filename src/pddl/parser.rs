use std::iter::Iterator;

use log::debug;

use super::{
    listener::{Construct, Event, Leaf, Listener},
    reqs::{Reqs, Requirement},
    scanner::{Token, TokenType},
    stack::BuildError,
};

/// Goal connectives outside of the formulas a `LogicStack` can build.
const UNSUPPORTED_GOALS: [&str; 4] = ["or", "imply", "exists", "preference"];

/// Numeric effects, which need fluents.
const UNSUPPORTED_EFFECTS: [&str; 6] = [
    "assign",
    "increase",
    "decrease",
    "scale-up",
    "scale-down",
    "forall-undefined",
];

/// `Parser` walks the tokens of a PDDL domain or problem depth first and
/// reports every construct it enters and exits to a `Listener`.  The
/// events of a construct's children always fall between its `Enter` and
/// `Exit`.
pub struct Parser<'a> {
    pub src: &'a str,        // Original source that was scanned.
    pub tokens: &'a [Token], // Scanned tokens to be parsed.
    pub tokpos: usize,       // Current index into `tokens`.
    pub col: usize,          // Current column of parse.
    pub line: usize,         // Current line of parse.
    pub what: ParsingWhat,   // What is specifically being parsed.
    pub reqs: Reqs,          // Known requirements.
    pub gated: bool,         // Constructs must be enabled by `reqs`.
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParsingWhat {
    Any,
    Types,
    Constants,
    Predicates,
    Action,
    Objects,
    Init,
    Goal,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, tokens: &'a [Token]) -> Self {
        Parser {
            src,
            tokens,
            tokpos: 0,
            col: 1,
            line: 1,
            reqs: Reqs::default(),
            gated: true,
            what: ParsingWhat::Any,
        }
    }

    /// `domain_top` parses the outline of a domain: its name and
    /// requirements, and the token positions of the remaining sections so
    /// that they can be walked separately.
    pub fn domain_top(&mut self) -> Result<Parse<'a>, Error> {
        const SECTIONS: [&str; 5] = [
            ":requirements",
            ":types",
            ":constants",
            ":predicates",
            ":action",
        ];
        const UNSUPPORTED: [&str; 4] = [":functions", ":constraints", ":durative-action", ":derived"];

        self.consume(TokenType::LParen)?;
        self.ident("define")?;
        self.consume(TokenType::LParen)?;
        self.ident("domain")?;

        let mut parse = Parse {
            gated: true,
            ..Parse::default()
        };
        parse.name = self.consume(TokenType::Ident)?.to_str(self.src);
        self.consume(TokenType::RParen)?;

        // Sections must appear in the order of SECTIONS and, except for
        // :action, at most once.
        let mut allowed = 0;

        while let Some(kw) = self.section_keyword(&SECTIONS[allowed..], &UNSUPPORTED)? {
            let found = allowed
                + SECTIONS[allowed..]
                    .iter()
                    .position(|s| kw.is_keyword(self.src, s))
                    .unwrap_or(0);

            match found {
                0 => {
                    parse.reqs = self.requirements()?;
                    self.reqs = parse.reqs;
                }
                1 => {
                    self.require(Requirement::Typing, ":types")?;
                    parse.types_pos = Some(self.tokpos);
                    self.balance_parens();
                }
                2 => {
                    parse.const_pos = Some(self.tokpos);
                    self.balance_parens();
                }
                3 => {
                    parse.pred_pos = Some(self.tokpos);
                    self.balance_parens();
                }
                _ => {
                    parse.action_pos.push(self.tokpos);
                    self.balance_parens();
                }
            }
            allowed = if found < 4 { found + 1 } else { 4 };
        }

        self.end_of_input()?;
        debug!(
            "domain {}: {} action(s) located",
            parse.name,
            parse.action_pos.len()
        );
        Ok(parse)
    }

    /// `problem_top` is the problem counterpart of `domain_top`.
    pub fn problem_top(&mut self) -> Result<Parse<'a>, Error> {
        const SECTIONS: [&str; 4] = [":requirements", ":objects", ":init", ":goal"];
        const UNSUPPORTED: [&str; 3] = [":constraints", ":metric", ":length"];

        self.consume(TokenType::LParen)?;
        self.ident("define")?;
        self.consume(TokenType::LParen)?;
        self.ident("problem")?;

        let mut parse = Parse::default();
        parse.problem = self.consume(TokenType::Ident)?.to_str(self.src);
        self.consume(TokenType::RParen)?;

        self.consume(TokenType::LParen)?;
        self.keyword(":domain")?;
        parse.name = self.consume(TokenType::Ident)?.to_str(self.src);
        self.consume(TokenType::RParen)?;

        let mut allowed = 0;

        while let Some(kw) = self.section_keyword(&SECTIONS[allowed..], &UNSUPPORTED)? {
            let found = allowed
                + SECTIONS[allowed..]
                    .iter()
                    .position(|s| kw.is_keyword(self.src, s))
                    .unwrap_or(0);

            match found {
                // A problem without :requirements relies on its domain's,
                // so its sections are only gated once it declares some.
                0 => {
                    parse.reqs = self.requirements()?;
                    parse.gated = true;
                    self.reqs = parse.reqs;
                }
                1 => {
                    parse.objects_pos = Some(self.tokpos);
                    self.balance_parens();
                }
                2 => {
                    parse.init_pos = Some(self.tokpos);
                    self.balance_parens();
                }
                _ => {
                    parse.goal_pos = Some(self.tokpos);
                    self.balance_parens();
                }
            }
            allowed = found + 1;
        }

        self.end_of_input()?;
        debug!("problem {} of domain {} located", parse.problem, parse.name);
        Ok(parse)
    }

    /// `section_keyword` consumes the opening of a top-level section and
    /// returns its keyword, or `None` once the closing paren of the
    /// definition has been consumed.  Only keywords in `allowed` are
    /// accepted; those in `unsupported` are reported as such.
    fn section_keyword(&mut self, allowed: &[&str], unsupported: &[&str]) -> Result<Option<Token>, Error> {
        if self.next_is(TokenType::RParen).is_ok() {
            return Ok(None);
        }
        if let Err(have) = self.next_is(TokenType::LParen) {
            return Err(Error::expect(self.line, self.col, have, &["(", ")"]));
        }

        let tok = match self.next_is(TokenType::Keyword) {
            Ok(t) => t,
            Err(_) => return Err(self.expect(allowed)),
        };
        if allowed.iter().any(|s| tok.is_keyword(self.src, s)) {
            return Ok(Some(tok));
        }
        if let Some(s) = unsupported.iter().find(|s| tok.is_keyword(self.src, s)) {
            return Err(Error::unsupported(tok.line, tok.col, s));
        }
        Err(Error::expect(tok.line, tok.col, tok.to_str(self.src), allowed))
    }

    /// `end_of_input` returns an error if any tokens remain.
    fn end_of_input(&mut self) -> Result<(), Error> {
        if let Some(t) = self.next() {
            let s = t.to_str(self.src).to_string();
            return Err(Error {
                what: ErrorType::ExtraInput(s),
                col: t.col,
                line: t.line,
            });
        }
        Ok(())
    }

    /// `section` walks the section selected by `what` starting at `tokpos`.
    /// The name token of an `:action` is returned.
    pub fn section<L: Listener>(&mut self, l: &mut L) -> Result<Option<Token>, Error> {
        debug!("walking {:?} at token {}", self.what, self.tokpos);
        let walked = match self.what {
            ParsingWhat::Types => self.types(l),
            ParsingWhat::Constants => self.constants(l),
            ParsingWhat::Predicates => self.predicates(l),
            ParsingWhat::Objects => self.objects(l),
            ParsingWhat::Init => self.init(l),
            ParsingWhat::Goal => self.goal(l),
            ParsingWhat::Action => return self.action(l).map(Some),
            ParsingWhat::Any => Ok(()),
        };
        walked.map(|_| None)
    }

    fn expect(&mut self, what: &[&str]) -> Error {
        if let Some(t) = self.next() {
            let have = t.to_str(self.src);
            Error::expect(t.line, t.col, have, what)
        } else {
            Error::expect(self.line, self.col, "end of input", what)
        }
    }

    /// `consume` consumes and returns the next token whose `TokenType` is
    /// is equal to `what`. If that is not the case then an `Error` is
    /// returned that expects `what`.
    fn consume(&mut self, what: TokenType) -> Result<Token, Error> {
        let tok = *self
            .next()
            .ok_or_else(|| Error::expect(self.line, self.col, "end of input", &[what.as_str()]))?;

        if tok.what != what {
            let have = tok.to_str(self.src);
            return Err(Error::expect(self.line, self.col, have, &[what.as_str()]));
        }
        Ok(tok)
    }

    /// `ident` consumes the next input if the next token is an identifier
    /// that matches `what`.
    fn ident(&mut self, what: &str) -> Result<Token, Error> {
        let tok = *self
            .next()
            .ok_or_else(|| Error::expect(self.line, self.col, "end of input", &[what]))?;

        if !tok.is_ident(self.src, what) {
            let have = tok.to_str(self.src);
            return Err(Error::expect(self.line, self.col, have, &[what]));
        }
        Ok(tok)
    }

    /// `keyword` is like `ident` but for keywords such as `:parameters`.
    fn keyword(&mut self, what: &str) -> Result<Token, Error> {
        let src = self.src;
        self.next_is_and(TokenType::Keyword, |t| t.is_keyword(src, what))
            .map_err(|have| Error::expect(self.line, self.col, have, &[what]))
    }

    /// `next_is_and` returns the next token in the stream if it has
    /// a `TokenType` of `what` and fulfills the predicate of `and`.  If
    /// false then the token is not consumed.
    fn next_is_and<F>(&mut self, what: TokenType, and: F) -> Result<Token, &'a str>
    where
        F: FnOnce(&Token) -> bool,
    {
        if self.tokpos >= self.tokens.len() {
            return Err("end of input");
        }
        let t = self.tokens[self.tokpos];
        if t.what == what && and(&t) {
            self.tokpos += 1;
            self.col = t.col;
            self.line = t.line;
            Ok(t)
        } else {
            Err(t.to_str(self.src))
        }
    }

    /// `next_is` is like calling `next_is_and` where `and` is a tautology.
    fn next_is(&mut self, what: TokenType) -> Result<Token, &'a str> {
        self.next_is_and(what, |_| true)
    }

    /// `ident_is` consumes the next token and returns true if it is an
    /// identifier matching `what`, ignoring case.
    fn ident_is(&mut self, what: &str) -> bool {
        let src = self.src;
        self.next_is_and(TokenType::Ident, |t| t.is_ident(src, what))
            .is_ok()
    }

    /// `keyword_is` is `ident_is` for keywords.
    fn keyword_is(&mut self, what: &str) -> bool {
        let src = self.src;
        self.next_is_and(TokenType::Keyword, |t| t.is_keyword(src, what))
            .is_ok()
    }

    /// `peek` return the next token without consuming it from the stream.
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.tokpos)
    }

    /// `unsupported_head` returns an error if the next token is one of
    /// `words`.
    fn unsupported_head(&self, words: &[&str]) -> Result<(), Error> {
        if let Some(t) = self.peek() {
            if let Some(w) = words.iter().find(|w| t.is_ident(self.src, w)) {
                return Err(Error::unsupported(t.line, t.col, w));
            }
        }
        Ok(())
    }

    /// `empty_list_is` consumes `()` if it is next.
    fn empty_list_is(&mut self) -> bool {
        let open = self.tokens.get(self.tokpos).map(|t| t.what);
        let close = self.tokens.get(self.tokpos + 1).map(|t| t.what);

        if open == Some(TokenType::LParen) && close == Some(TokenType::RParen) {
            self.next();
            self.next();
            true
        } else {
            false
        }
    }

    /// `balance_parens` consumes tokens until the current count of parenthesis
    /// reaches zero.  Initially, the count is one since it is expected that the
    /// first left paren has already been consumed.
    fn balance_parens(&mut self) {
        let mut count = 1;

        while let Some(tok) = self.next() {
            if tok.what == TokenType::LParen {
                count += 1;
            } else if tok.what == TokenType::RParen {
                count -= 1;
                if count == 0 {
                    return;
                }
            }
        }
    }

    /// `requirements` parses the `:requirements` section.  Requirements
    /// that imply others (e.g. `:adl`) are expanded.
    fn requirements(&mut self) -> Result<Reqs, Error> {
        let mut reqs = Reqs::default();

        loop {
            if self.next_is(TokenType::RParen).is_ok() {
                return Ok(reqs);
            }
            let tok = self.consume(TokenType::Keyword)?;
            let kw = tok.to_str(self.src);
            match kw.parse::<Requirement>() {
                Ok(r) => reqs.add(r),
                Err(_) => return Err(Error::expect(tok.line, tok.col, kw, &["requirement"])),
            }
        }
    }

    fn require(&self, r: Requirement, what: &str) -> Result<(), Error> {
        if !self.gated || self.reqs.has(r) {
            Ok(())
        } else {
            Err(Error::missing(self.line, self.col, r, what))
        }
    }

    /// `emit` hands `event` to `l`, attaching the current position to any
    /// error the listener returns.
    fn emit<L: Listener>(&self, l: &mut L, event: Event<'_>) -> Result<(), Error> {
        l.on_event(event)
            .map_err(|e| Error::construct(self.line, self.col, e))
    }

    /// `leaf_text` returns the name carried by `tok`, without the `?` of
    /// a variable.
    fn leaf_text(&self, tok: Token) -> &'a str {
        let s = &self.src[tok.pos..tok.end];
        if tok.what == TokenType::Variable {
            &s[1..]
        } else {
            s
        }
    }

    fn leaf<L: Listener>(&self, l: &mut L, leaf: Leaf, tok: Token) -> Result<(), Error> {
        self.emit(l, Event::Leaf(leaf, self.leaf_text(tok)))
    }

    /// `group_is_typed` looks ahead to see whether the run of `item`
    /// tokens starting at the current position is followed by `-`.
    fn group_is_typed(&self, item: TokenType) -> bool {
        let rest = &self.tokens[self.tokpos.min(self.tokens.len())..];
        let items = rest.iter().take_while(|t| t.what == item).count();
        items > 0 && rest.get(items).map(|t| t.what) == Some(TokenType::Minus)
    }

    /// `typed_list` walks a list of `item` tokens where groups of items
    /// may be followed by `- type` (e.g. `?a ?b - block ?c`).  Each typed
    /// group is bracketed by `group` events; trailing untyped items are
    /// reported on their own.  The closing paren of the list is consumed.
    fn typed_list<L: Listener>(
        &mut self,
        l: &mut L,
        item: TokenType,
        leaf: Leaf,
        group: Construct,
    ) -> Result<(), Error> {
        loop {
            if self.next_is(TokenType::RParen).is_ok() {
                return Ok(());
            }

            let typed = self.group_is_typed(item);
            if typed {
                self.emit(l, Event::Enter(group))?;
            }

            let mut count = 0;
            while let Ok(tok) = self.next_is(item) {
                self.leaf(l, leaf, tok)?;
                count += 1;
            }

            if typed {
                self.consume(TokenType::Minus)?;
                self.require(Requirement::Typing, "typed list")?;
                self.type_spec(l)?;
                self.emit(l, Event::Exit(group))?;
            } else if count == 0 {
                return Err(self.expect(&[item.as_str(), ")"]));
            }
        }
    }

    /// `type_spec` walks the type following a `-`: a primitive type or
    /// `(either t1 t2 ...)`.
    fn type_spec<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        if let Ok(tok) = self.next_is(TokenType::Ident) {
            return self.leaf(l, Leaf::PrimitiveType, tok);
        }
        if self.next_is(TokenType::LParen).is_err() {
            return Err(self.expect(&["identifier", "("]));
        }

        self.ident("either")?;
        self.emit(l, Event::Enter(Construct::EitherType))?;

        // Must have at least one either type.
        let first = self.consume(TokenType::Ident)?;
        self.leaf(l, Leaf::PrimitiveType, first)?;

        loop {
            if self.next_is(TokenType::RParen).is_ok() {
                return self.emit(l, Event::Exit(Construct::EitherType));
            } else if let Ok(tok) = self.next_is(TokenType::Ident) {
                self.leaf(l, Leaf::PrimitiveType, tok)?;
            } else {
                return Err(self.expect(&["identifier", ")"]));
            }
        }
    }

    /// `types` walks the `:types` section.
    pub fn types<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        self.emit(l, Event::Enter(Construct::Types))?;
        self.typed_list(
            l,
            TokenType::Ident,
            Leaf::PrimitiveType,
            Construct::SubtypesOfType,
        )?;
        self.emit(l, Event::Exit(Construct::Types))
    }

    /// `constants` walks the `:constants` section of a domain.
    pub fn constants<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        self.emit(l, Event::Enter(Construct::Constants))?;
        self.typed_list(l, TokenType::Ident, Leaf::Constant, Construct::TypedList)?;
        self.emit(l, Event::Exit(Construct::Constants))
    }

    /// `objects` walks the `:objects` section of a problem.
    pub fn objects<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        self.emit(l, Event::Enter(Construct::Objects))?;
        self.typed_list(l, TokenType::Ident, Leaf::Constant, Construct::TypedList)?;
        self.emit(l, Event::Exit(Construct::Objects))
    }

    /// `predicates` walks the `:predicates` section where each declaration
    /// looks like `(on ?x ?y - block)`.
    pub fn predicates<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        loop {
            if self.next_is(TokenType::RParen).is_ok() {
                return Ok(());
            } else if self.next_is(TokenType::LParen).is_err() {
                return Err(self.expect(&["(", ")"]));
            }

            let name = self.consume(TokenType::Ident)?;
            self.emit(l, Event::Enter(Construct::PredicateDefinition))?;
            self.emit(l, Event::Enter(Construct::Predicate))?;
            self.leaf(l, Leaf::PredicateName, name)?;
            self.typed_list(l, TokenType::Variable, Leaf::Variable, Construct::TypedList)?;
            self.emit(l, Event::Exit(Construct::Predicate))?;
            self.emit(l, Event::Exit(Construct::PredicateDefinition))?;
        }
    }

    /// `action` walks an `:action` definition and returns the token of its
    /// name.
    pub fn action<L: Listener>(&mut self, l: &mut L) -> Result<Token, Error> {
        let name = self.consume(TokenType::Ident)?;

        self.keyword(":parameters")?;
        self.consume(TokenType::LParen)?;
        self.emit(l, Event::Enter(Construct::Parameters))?;
        self.typed_list(l, TokenType::Variable, Leaf::Variable, Construct::TypedList)?;
        self.emit(l, Event::Exit(Construct::Parameters))?;

        if self.keyword_is(":precondition") {
            self.emit(l, Event::Enter(Construct::Precondition))?;
            if !self.empty_list_is() {
                self.goal_description(l)?;
            }
            self.emit(l, Event::Exit(Construct::Precondition))?;
        }

        if self.keyword_is(":effect") {
            self.emit(l, Event::Enter(Construct::Effect))?;
            if !self.empty_list_is() {
                self.effect(l)?;
            }
            self.emit(l, Event::Exit(Construct::Effect))?;
        }

        if self.next_is(TokenType::RParen).is_err() {
            return Err(self.expect(&[":precondition", ":effect", ")"]));
        }
        Ok(name)
    }

    /// `init` walks the `:init` section: ground atoms, possibly negated.
    pub fn init<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        loop {
            if self.next_is(TokenType::RParen).is_ok() {
                return Ok(());
            } else if self.next_is(TokenType::LParen).is_err() {
                return Err(self.expect(&["(", ")"]));
            }

            self.emit(l, Event::Enter(Construct::InitLiteral))?;
            if self.ident_is("not") {
                self.emit(l, Event::Enter(Construct::Not))?;
                self.consume(TokenType::LParen)?;
                self.atomic_formula(l, true)?;
                self.consume(TokenType::RParen)?;
                self.emit(l, Event::Exit(Construct::Not))?;
            } else {
                self.atomic_formula(l, true)?;
            }
            self.emit(l, Event::Exit(Construct::InitLiteral))?;
        }
    }

    /// `goal` walks the `:goal` section.  `()` is an omitted goal.
    pub fn goal<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        self.emit(l, Event::Enter(Construct::Goal))?;
        if !self.empty_list_is() {
            self.goal_description(l)?;
        }
        self.consume(TokenType::RParen)?;
        self.emit(l, Event::Exit(Construct::Goal))
    }

    /// `term` walks a single variable or constant.
    fn term<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        if let Ok(tok) = self.next_is(TokenType::Variable) {
            self.leaf(l, Leaf::Variable, tok)
        } else if let Ok(tok) = self.next_is(TokenType::Ident) {
            self.leaf(l, Leaf::Constant, tok)
        } else {
            Err(self.expect(&["variable", "identifier"]))
        }
    }

    /// `atomic_formula` walks `name term*)` once the opening paren has
    /// been consumed.  A `ground` formula only accepts constants.
    fn atomic_formula<L: Listener>(&mut self, l: &mut L, ground: bool) -> Result<(), Error> {
        let name = self.consume(TokenType::Ident)?;
        self.emit(l, Event::Enter(Construct::Predicate))?;
        self.leaf(l, Leaf::PredicateName, name)?;

        loop {
            if self.next_is(TokenType::RParen).is_ok() {
                return self.emit(l, Event::Exit(Construct::Predicate));
            }
            if ground {
                match self.next_is(TokenType::Ident) {
                    Ok(tok) => self.leaf(l, Leaf::Constant, tok)?,
                    Err(_) => return Err(self.expect(&["identifier", ")"])),
                }
            } else {
                self.term(l)?;
            }
        }
    }

    /// `goal_description` walks a goal such as a precondition: an atomic
    /// formula, `=`, `and`, `not` or `forall`.
    fn goal_description<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        self.consume(TokenType::LParen)?;

        if self.next_is(TokenType::Equal).is_ok() {
            self.require(Requirement::Equality, "=")?;
            self.emit(l, Event::Enter(Construct::Equality))?;
            self.term(l)?;
            self.term(l)?;
            self.consume(TokenType::RParen)?;
            return self.emit(l, Event::Exit(Construct::Equality));
        }

        if self.ident_is("and") {
            self.emit(l, Event::Enter(Construct::And))?;
            while self.next_is(TokenType::RParen).is_err() {
                self.goal_description(l)?;
            }
            self.emit(l, Event::Exit(Construct::And))
        } else if self.ident_is("not") {
            self.emit(l, Event::Enter(Construct::Not))?;
            self.goal_description(l)?;
            self.consume(TokenType::RParen)?;
            self.emit(l, Event::Exit(Construct::Not))
        } else if self.ident_is("forall") {
            self.require(Requirement::UniversalPreconditions, "forall goal")?;
            self.emit(l, Event::Enter(Construct::ForAll))?;
            self.consume(TokenType::LParen)?;
            self.typed_list(l, TokenType::Variable, Leaf::Variable, Construct::TypedList)?;
            self.goal_description(l)?;
            self.consume(TokenType::RParen)?;
            self.emit(l, Event::Exit(Construct::ForAll))
        } else {
            self.unsupported_head(&UNSUPPORTED_GOALS)?;
            self.atomic_formula(l, false)
        }
    }

    /// `effect` walks the effect of an action: a conjunction of effects
    /// or a single one.
    fn effect<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        self.consume(TokenType::LParen)?;
        self.c_effect(l)
    }

    /// `c_effect` walks an effect once its opening paren is consumed.
    fn c_effect<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        if self.ident_is("and") {
            self.emit(l, Event::Enter(Construct::And))?;
            while self.next_is(TokenType::RParen).is_err() {
                self.effect(l)?;
            }
            self.emit(l, Event::Exit(Construct::And))
        } else if self.ident_is("forall") {
            self.require(Requirement::ConditionalEffects, "forall effect")?;
            self.emit(l, Event::Enter(Construct::ForAll))?;
            self.consume(TokenType::LParen)?;
            self.typed_list(l, TokenType::Variable, Leaf::Variable, Construct::TypedList)?;
            self.effect(l)?;
            self.consume(TokenType::RParen)?;
            self.emit(l, Event::Exit(Construct::ForAll))
        } else if self.ident_is("when") {
            self.require(Requirement::ConditionalEffects, "when effect")?;
            self.emit(l, Event::Enter(Construct::When))?;
            self.goal_description(l)?;
            self.cond_effect(l)?;
            self.consume(TokenType::RParen)?;
            self.emit(l, Event::Exit(Construct::When))
        } else {
            self.p_effect(l)
        }
    }

    /// `cond_effect` walks the effect part of a `when`: a conjunction of
    /// literals or a single one.
    fn cond_effect<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        self.consume(TokenType::LParen)?;
        if !self.ident_is("and") {
            return self.p_effect(l);
        }

        self.emit(l, Event::Enter(Construct::And))?;
        while self.next_is(TokenType::RParen).is_err() {
            self.consume(TokenType::LParen)?;
            self.p_effect(l)?;
        }
        self.emit(l, Event::Exit(Construct::And))
    }

    /// `p_effect` walks a literal effect once its opening paren is
    /// consumed.
    fn p_effect<L: Listener>(&mut self, l: &mut L) -> Result<(), Error> {
        if self.ident_is("not") {
            self.emit(l, Event::Enter(Construct::Not))?;
            self.consume(TokenType::LParen)?;
            self.atomic_formula(l, false)?;
            self.consume(TokenType::RParen)?;
            self.emit(l, Event::Exit(Construct::Not))
        } else {
            self.unsupported_head(&UNSUPPORTED_EFFECTS)?;
            self.atomic_formula(l, false)
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        let t = self.tokens.get(self.tokpos)?;
        self.tokpos += 1;
        self.col = t.col;
        self.line = t.line;
        Some(t)
    }
}

/// `Parse` is the outline of a domain or problem returned by
/// `Parser::domain_top` and `Parser::problem_top`.
#[derive(Debug, Default)]
pub struct Parse<'a> {
    pub name: &'a str,              // Name of a domain.
    pub problem: &'a str,           // Name of a problem.
    pub reqs: Reqs,                 // Requirements of the domain or problem.
    pub gated: bool,                // Whether `reqs` gates the sections.
    pub types_pos: Option<usize>,   // Token position of the :types contents.
    pub const_pos: Option<usize>,   // Token position of the :constants contents.
    pub pred_pos: Option<usize>,    // Token position of the :predicates contents.
    pub action_pos: Vec<usize>,     // Token positions where :actions begin.
    pub objects_pos: Option<usize>, // Token position of the :objects contents.
    pub init_pos: Option<usize>,    // Token position of the :init contents.
    pub goal_pos: Option<usize>,    // Token position of the :goal contents.
}

/// `Error` is returned from parsing a PDDL domain or problem.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{line}:{col}: error: {what}")]
pub struct Error {
    /// The specific parse error that occurred.
    pub what: ErrorType,
    /// The line number the error occurred on.
    pub line: usize,
    /// The column number the error occurred on.
    pub col: usize,
}

impl Error {
    /// `expect` returns an `Error` for an error that occurred
    /// on line, `line`, column, `col`, and has a value of `have` where
    /// `expect` are the expected values at the time of parse.
    pub fn expect(line: usize, col: usize, have: &str, expect: &[&str]) -> Self {
        let have = have.to_string();
        let expect = expect.iter().map(|s| s.to_string()).collect();
        let what = ErrorType::Expect { have, expect };
        Error { what, line, col }
    }

    /// `missing` returns an `Error` where the requirement is missing
    /// for `what`.
    pub fn missing(line: usize, col: usize, req: Requirement, what: &str) -> Self {
        let what = what.to_string();
        let what = ErrorType::MissingRequirement { req, what };
        Error { what, line, col }
    }

    pub fn unsupported(line: usize, col: usize, what: &str) -> Self {
        let what = ErrorType::Unsupported(what.to_string());
        Error { what, line, col }
    }

    /// `construct` wraps a builder error raised while walking the source
    /// around `line` and `col`.
    pub fn construct(line: usize, col: usize, e: BuildError) -> Self {
        let what = ErrorType::Construct(e);
        Error { what, line, col }
    }
}

/// `ErrorType` are the different type of `Error`s that
/// can occur during parsing.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ErrorType {
    /// Where the parser expected a specific token but received something else.
    #[error("{}", expecting(.have, .expect))]
    Expect { have: String, expect: Vec<String> },
    /// Signals that extra input was detected at the end of the source.
    #[error("Extra input detected: {0}")]
    ExtraInput(String),
    /// Signals that a `Requirement` is missing for a specific construct.
    #[error("{what} requires {req} declaration in :requirements section")]
    MissingRequirement { req: Requirement, what: String },
    /// A valid PDDL construct this parser does not model.
    #[error("{0} is not supported")]
    Unsupported(String),
    /// The walk produced a construct the builder could not assemble.
    #[error("malformed construct: {0}")]
    Construct(#[source] BuildError),
}

fn expecting(have: &str, expect: &[String]) -> String {
    match expect {
        [] => format!("Unexpected {}", have),
        [one] => format!("Expecting {}, found {}", one, have),
        [init @ .., last] => format!(
            "Expecting either {}, or {}, found {}",
            init.join(", "),
            last,
            have
        ),
    }
}

use std::{fmt, str::FromStr};

/// `Reqs` is the set of requirements declared by a domain or problem,
/// kept as a bit vector indexed by `Requirement::bit`.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct Reqs(u32);

impl Reqs {
    /// `has` returns true if `r` was declared or implied.  An empty
    /// declaration implies `:strips`.
    pub fn has(&self, r: Requirement) -> bool {
        let b = self.0 & r.bit();
        if r == Requirement::Strips {
            return self.0 == 0 || b > 0;
        }
        b > 0
    }

    /// `add` adds `r` together with every requirement it implies.
    pub fn add(&mut self, r: Requirement) {
        self.0 |= r.bit();
        for &implied in r.implies() {
            self.add(implied);
        }
    }

    /// `iter` yields the declared and implied requirements in
    /// declaration-table order.
    pub fn iter(self) -> impl Iterator<Item = Requirement> {
        let all: &'static [Requirement] = &Requirement::ALL;
        all.iter().copied().filter(move |r| self.0 & r.bit() > 0)
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// `Requirement` is one of the requirement flags of PDDL 3.1.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Requirement {
    Strips,
    Typing,
    Equality,
    NegativePreconditions,
    DisjunctivePreconditions,
    ExistentialPreconditions,
    UniversalPreconditions,
    QuantifiedPreconditions,
    ConditionalEffects,
    Fluents,
    NumericFluents,
    ObjectFluents,
    Adl,
    DurativeActions,
    DurationInequalities,
    ContinuousEffects,
    DerivedPredicates,
    TimedInitialLiterals,
    Preferences,
    Constraints,
    ActionCosts,
}

impl Requirement {
    pub const ALL: [Requirement; 21] = [
        Requirement::Strips,
        Requirement::Typing,
        Requirement::Equality,
        Requirement::NegativePreconditions,
        Requirement::DisjunctivePreconditions,
        Requirement::ExistentialPreconditions,
        Requirement::UniversalPreconditions,
        Requirement::QuantifiedPreconditions,
        Requirement::ConditionalEffects,
        Requirement::Fluents,
        Requirement::NumericFluents,
        Requirement::ObjectFluents,
        Requirement::Adl,
        Requirement::DurativeActions,
        Requirement::DurationInequalities,
        Requirement::ContinuousEffects,
        Requirement::DerivedPredicates,
        Requirement::TimedInitialLiterals,
        Requirement::Preferences,
        Requirement::Constraints,
        Requirement::ActionCosts,
    ];

    fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// `implies` returns the requirements that declaring this one also
    /// declares.
    fn implies(self) -> &'static [Requirement] {
        match self {
            Requirement::QuantifiedPreconditions => &[
                Requirement::ExistentialPreconditions,
                Requirement::UniversalPreconditions,
            ],
            Requirement::Fluents => &[Requirement::NumericFluents, Requirement::ObjectFluents],
            Requirement::TimedInitialLiterals => &[Requirement::DurativeActions],
            Requirement::Adl => &[
                Requirement::Strips,
                Requirement::Typing,
                Requirement::Equality,
                Requirement::NegativePreconditions,
                Requirement::DisjunctivePreconditions,
                Requirement::QuantifiedPreconditions,
                Requirement::ConditionalEffects,
            ],
            _ => &[],
        }
    }

    /// `keyword` returns the source form of the requirement.
    pub fn keyword(self) -> &'static str {
        match self {
            Requirement::Strips => ":strips",
            Requirement::Typing => ":typing",
            Requirement::Equality => ":equality",
            Requirement::NegativePreconditions => ":negative-preconditions",
            Requirement::DisjunctivePreconditions => ":disjunctive-preconditions",
            Requirement::ExistentialPreconditions => ":existential-preconditions",
            Requirement::UniversalPreconditions => ":universal-preconditions",
            Requirement::QuantifiedPreconditions => ":quantified-preconditions",
            Requirement::ConditionalEffects => ":conditional-effects",
            Requirement::Fluents => ":fluents",
            Requirement::NumericFluents => ":numeric-fluents",
            Requirement::ObjectFluents => ":object-fluents",
            Requirement::Adl => ":adl",
            Requirement::DurativeActions => ":durative-actions",
            Requirement::DurationInequalities => ":duration-inequalities",
            Requirement::ContinuousEffects => ":continuous-effects",
            Requirement::DerivedPredicates => ":derived-predicates",
            Requirement::TimedInitialLiterals => ":timed-initial-literals",
            Requirement::Preferences => ":preferences",
            Requirement::Constraints => ":constraints",
            Requirement::ActionCosts => ":action-costs",
        }
    }
}

impl FromStr for Requirement {
    type Err = ();

    /// Parses a requirement keyword, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::ALL
            .iter()
            .copied()
            .find(|r| r.keyword().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn can_add_requirements() {
        let mut r = Reqs::default();

        r.add(Requirement::ConditionalEffects);
        r.add(Requirement::UniversalPreconditions);
        r.add(Requirement::Typing);

        assert!(r.has(Requirement::ConditionalEffects));
        assert!(r.has(Requirement::UniversalPreconditions));
        assert!(r.has(Requirement::Typing));
        assert!(!r.has(Requirement::Equality));
        assert!(!r.has(Requirement::Strips));
        assert_eq!(r.iter().count(), 3);
    }

    #[test]
    fn strips_is_implied_by_nothing() {
        assert!(Reqs::default().has(Requirement::Strips));
        assert!(Reqs::default().is_empty());
    }

    #[test]
    fn adl_expands() {
        let mut r = Reqs::default();
        r.add(Requirement::Adl);

        assert!(r.has(Requirement::Strips));
        assert!(r.has(Requirement::Typing));
        assert!(r.has(Requirement::Equality));
        assert!(r.has(Requirement::ConditionalEffects));
        assert!(r.has(Requirement::UniversalPreconditions));
        assert!(r.has(Requirement::ExistentialPreconditions));
        assert!(!r.has(Requirement::Fluents));
    }

    #[test]
    fn iterates_in_table_order() {
        let mut r = Reqs::default();
        r.add(Requirement::Equality);
        r.add(Requirement::Strips);

        let all: Vec<Requirement> = r.iter().collect();
        assert_eq!(all, vec![Requirement::Strips, Requirement::Equality]);
    }

    #[test]
    fn parse_keywords() {
        assert_eq!(":TYPING".parse(), Ok(Requirement::Typing));
        assert_eq!(":action-costs".parse(), Ok(Requirement::ActionCosts));
        assert_eq!("typing".parse::<Requirement>(), Err(()));
        assert_eq!(Requirement::Adl.to_string(), ":adl");
    }
}

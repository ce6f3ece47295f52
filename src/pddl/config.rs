use super::types::Type;

/// `Config` controls choices the PDDL source leaves open.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    /// Type given to declared variables and constants that have no type
    /// annotation (e.g. the `?z` in `:parameters (?x - block ?z)`).  When
    /// `None` such declarations stay untyped.  Terms referenced inside
    /// formulas are never defaulted.
    pub default_type: Option<Type>,
}

impl Config {
    /// `with_object_default` returns a `Config` that types every
    /// unannotated declaration as `object`.
    pub fn with_object_default() -> Self {
        Config::with_default_type(Type::object())
    }

    /// `with_default_type` returns a `Config` that types every unannotated
    /// declaration as `ty`.
    pub fn with_default_type(ty: Type) -> Self {
        Config {
            default_type: Some(ty),
        }
    }
}

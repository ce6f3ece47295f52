use std::{
    collections::{BTreeSet, HashSet},
    fmt,
};

/// Name of the implicit root type every PDDL type derives from.
pub const OBJECT: &str = "object";

pub type TypeId = usize;

/// `Type` is the type annotation of a term or the parent of a declared
/// type.  It is a set of primitive type names: a single name for a simple
/// type (e.g. `block`) or several for an either-type (e.g.
/// `(either block table)`).  The set is never empty and, being a set,
/// `(either block table block)` and `(either table block)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    names: BTreeSet<String>,
}

impl Type {
    /// `primitive` returns the simple type of `name`.
    pub fn primitive(name: &str) -> Self {
        let mut names = BTreeSet::new();
        names.insert(name.to_ascii_lowercase());
        Type { names }
    }

    /// `either` returns the union of all `names` or `None` if `names`
    /// is empty.
    pub fn either(names: &[&str]) -> Option<Self> {
        let names: BTreeSet<String> = names.iter().map(|n| n.to_ascii_lowercase()).collect();
        if names.is_empty() {
            None
        } else {
            Some(Type { names })
        }
    }

    /// `object` returns the implicit root type.
    pub fn object() -> Self {
        Type::primitive(OBJECT)
    }

    /// `union` merges the primitive names of `other` into this type.
    pub fn union(mut self, other: Type) -> Self {
        self.names.extend(other.names);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// `names` iterates the primitive type names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_either(&self) -> bool {
        self.names.len() > 1
    }

    /// `primitive_name` returns the name of a simple type, `None` for an
    /// either-type.
    pub fn primitive_name(&self) -> Option<&str> {
        if self.is_either() {
            None
        } else {
            self.names().next()
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.primitive_name() {
            return f.write_str(name);
        }
        f.write_str("(either")?;
        for n in self.names() {
            write!(f, " {}", n)?;
        }
        f.write_str(")")
    }
}

/// `TypeDefinition` is a single declaration from the `:types` section of
/// a domain, e.g. `truck - vehicle`.  Declarations without an explicit
/// parent derive from `object`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub parent: Type,
}

impl TypeDefinition {
    pub fn new(name: &str, parent: Type) -> Self {
        TypeDefinition {
            name: name.to_ascii_lowercase(),
            parent,
        }
    }
}

/// `Types` indexes the declared types of a domain so that the subtype
/// relation can be queried.
#[derive(Debug)]
pub struct Types {
    // Type names where the index into the vector is the TypeId for the
    // type.  Domains declare a handful of types so a linear scan beats
    // hashing here.
    types: Vec<String>,
    parents: Vec<HashSet<TypeId>>, // Immediate parent TypeIds, indexed by the child TypeId.
}

impl Default for Types {
    fn default() -> Self {
        let mut t = Types {
            types: vec![],
            parents: vec![],
        };
        t.insert(OBJECT);
        t
    }
}

impl Types {
    /// `from_definitions` builds the index for every declaration in `defs`.
    /// A parent that is an either-type makes the child a subtype of each of
    /// its constituents.
    pub fn from_definitions(defs: &[TypeDefinition]) -> Self {
        let mut types = Types::default();
        for def in defs {
            let child = types.insert(&def.name);
            for parent in def.parent.names() {
                let parent = types.insert(parent);
                types.relate(child, parent);
            }
        }
        types
    }

    /// `get` returns the `TypeId` of `name` if it exists.
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.types.iter().position(|s| name.eq_ignore_ascii_case(s))
    }

    /// `name_of` returns the type name of the given `id`.
    pub fn name_of(&self, id: TypeId) -> &str {
        &self.types[id]
    }

    /// `insert` assigns `name` a `TypeId` if it hasn't already been seen.
    pub fn insert(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.get(name) {
            return id;
        }
        self.types.push(name.to_ascii_lowercase());
        self.parents.push(HashSet::new());
        self.types.len() - 1
    }

    /// `relate` records `parent` as an immediate parent of `child`.
    pub fn relate(&mut self, child: TypeId, parent: TypeId) {
        self.parents[child].insert(parent);
    }

    /// `is_subtype_of` returns true if `child` equals `parent` or inherits
    /// from it through any chain of declarations.  Every known type is a
    /// subtype of `object`.
    pub fn is_subtype_of(&self, child: &str, parent: &str) -> bool {
        let (child, parent) = match (self.get(child), self.get(parent)) {
            (Some(c), Some(p)) => (c, p),
            _ => return false,
        };
        if child == parent || self.name_of(parent) == OBJECT {
            return true;
        }

        // Declarations may be circular so track what has been visited.
        let mut seen: HashSet<TypeId> = HashSet::new();
        let mut pending = vec![child];

        while let Some(id) = pending.pop() {
            for &p in &self.parents[id] {
                if p == parent {
                    return true;
                }
                if seen.insert(p) {
                    pending.push(p);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn either_collapses_duplicates() {
        let t = Type::either(&["block", "table", "block"]).unwrap();

        assert_eq!(t.len(), 2);
        assert_eq!(t, Type::either(&["table", "block"]).unwrap());
        assert!(t.is_either());
        assert!(t.contains("BLOCK"));
    }

    #[test]
    fn either_of_nothing() {
        assert_eq!(Type::either(&[]), None);
    }

    #[test]
    fn display_types() {
        assert_eq!(Type::primitive("Block").to_string(), "block");
        assert_eq!(
            Type::either(&["table", "block"]).unwrap().to_string(),
            "(either block table)"
        );
    }

    #[test]
    fn union_of_primitives() {
        let t = Type::primitive("a").union(Type::primitive("b"));
        assert_eq!(t, Type::either(&["a", "b"]).unwrap());
        assert_eq!(t.primitive_name(), None);
    }

    #[test]
    fn insert_and_get() {
        let mut t = Types::default();

        let foo = t.insert("Foo");
        let bar = t.insert("bar");

        assert_eq!(t.get("object"), Some(0));
        assert_eq!(t.get("FOO"), Some(foo));
        assert_eq!(t.get("BAR"), Some(bar));
        assert_eq!(t.name_of(foo), "foo");
    }

    #[test]
    fn subtypes_through_grandparents() {
        let t = Types::from_definitions(&[
            TypeDefinition::new("vehicle", Type::object()),
            TypeDefinition::new("truck", Type::primitive("vehicle")),
            TypeDefinition::new("pickup", Type::primitive("truck")),
        ]);

        assert!(t.is_subtype_of("pickup", "truck"));
        assert!(t.is_subtype_of("pickup", "vehicle"));
        assert!(t.is_subtype_of("pickup", "object"));
        assert!(t.is_subtype_of("truck", "truck"));

        assert!(!t.is_subtype_of("vehicle", "truck"));
        assert!(!t.is_subtype_of("pickup", "unknown"));
    }

    #[test]
    fn either_parents() {
        let t = Types::from_definitions(&[TypeDefinition::new(
            "moped",
            Type::either(&["motorcycle", "bicycle"]).unwrap(),
        )]);

        assert!(t.is_subtype_of("moped", "motorcycle"));
        assert!(t.is_subtype_of("moped", "bicycle"));
        assert!(!t.is_subtype_of("bicycle", "moped"));
    }

    #[test]
    fn circular_declarations_terminate() {
        let t = Types::from_definitions(&[
            TypeDefinition::new("foo", Type::primitive("bar")),
            TypeDefinition::new("bar", Type::primitive("baz")),
            TypeDefinition::new("baz", Type::primitive("foo")),
        ]);

        assert!(t.is_subtype_of("foo", "baz"));
        assert!(!t.is_subtype_of("foo", "quux"));
    }
}

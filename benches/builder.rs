use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use pddl_stack::pddl::{stack::LogicStack, types::Types, TypeDefinition, Type};

/// Builds `(forall (?x - block) (when (clear ?x) (and (p0 ?x a) ... )))`
/// with `width` literals in the conjunction.
fn build(s: &mut LogicStack, width: usize) {
    s.begin_for_all();
    s.add_variable("x");
    s.push_primitive_type("block");
    let ty = s.take_type().unwrap();
    s.apply_type(ty).unwrap();

    s.begin_if_then();
    s.begin_predicate();
    s.symbol("clear").unwrap();
    s.add_variable("x");
    s.end_predicate().unwrap();

    s.begin_and();
    for i in 0..width {
        s.begin_not();
        s.begin_predicate();
        s.symbol(&format!("p{}", i)).unwrap();
        s.add_variable("x");
        s.add_constant("a");
        s.end_predicate().unwrap();
        s.end_not().unwrap();
    }
    s.end_and().unwrap();
    s.end_if_then().unwrap();
    s.end_for_all().unwrap();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("build nested formula", |b| {
        b.iter_batched(
            LogicStack::new,
            |mut s| {
                build(&mut s, black_box(32));
                s.take_optional_formula().unwrap()
            },
            BatchSize::SmallInput,
        )
    });

    let mut defs = vec![];
    for i in 1..12 {
        let parent = Type::primitive(&format!("t{}", i - 1));
        defs.push(TypeDefinition::new(&format!("t{}", i), parent));
    }
    let types = Types::from_definitions(&defs);

    c.bench_function("subtype chain", |b| {
        b.iter(|| types.is_subtype_of(black_box("t11"), black_box("t0")))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

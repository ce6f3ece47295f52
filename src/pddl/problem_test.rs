use super::*;
use std::fs;

fn ground(name: &str, objects: &[&str]) -> Formula {
    Formula::literal(name, objects.iter().map(|o| Term::constant(o)).collect())
}

#[test]
fn check_if_problem() {
    assert!(Problem::is_problem("(define (problem p1"));
}

#[test]
fn check_if_not_problem() {
    assert!(!Problem::is_problem("(define (domain d"));
}

#[test]
fn parse_problem_name() -> Result<(), Errors> {
    let prob = Problem::parse(
        "(define (problem foo)
           (:domain bar)
           (:init)
           (:goal (and)))",
    )?;

    assert_eq!(prob.name, "foo".to_string());
    assert_eq!(prob.domain, "bar".to_string());
    assert!(prob.init.is_empty());
    assert_eq!(prob.goal, Some(Formula::and(vec![])));

    Ok(())
}

#[test]
fn blocksworld_problem_8() -> Result<(), Errors> {
    let s = fs::read_to_string("testdata/blocksworld-pb8.pddl").unwrap();
    let prob = Problem::parse(&s)?;

    assert_eq!(prob.name, "tower8");
    assert_eq!(prob.domain, "blocksworld");

    let names: Vec<&str> = prob.objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e", "f", "g", "h"]);
    assert!(prob.objects.iter().all(|o| o.ty.is_none()));

    assert_eq!(prob.init.len(), 17);
    for b in &["a", "b", "c", "d", "e", "f", "g", "h"] {
        assert!(prob.init.contains(&ground("on-table", &[*b])));
        assert!(prob.init.contains(&ground("clear", &[*b])));
    }
    assert!(prob.init.contains(&ground("arm-empty", &[])));

    assert_eq!(
        prob.goal,
        Some(Formula::and(vec![
            ground("on", &["a", "b"]),
            ground("on", &["b", "c"]),
            ground("on", &["c", "d"]),
            ground("on", &["d", "e"]),
            ground("on", &["e", "f"]),
            ground("on", &["f", "g"]),
            ground("on", &["g", "h"]),
        ]))
    );
    Ok(())
}

#[test]
fn monkey_problem_2() -> Result<(), Errors> {
    let s = fs::read_to_string("testdata/monkey-pb2.pddl").unwrap();
    let prob = Problem::parse(&s)?;

    assert_eq!(prob.name, "pb2");
    assert_eq!(prob.domain, "monkey");
    assert_eq!(prob.requirements().count(), 0);

    assert_eq!(prob.objects.len(), 11);
    for o in &["p1", "p2", "p3", "p4", "p6", "bananas", "monkey", "box", "knife", "glass", "waterfountain"] {
        assert!(prob.objects.contains(&Constant::new(o)), "missing object {}", o);
    }

    assert_eq!(prob.init.len(), 12);
    assert_eq!(prob.init[0], ground("location", &["p1"]));
    assert!(prob.init.contains(&ground("on-floor", &[])));
    assert!(prob.init.contains(&ground("at", &["monkey", "p1"])));
    assert!(prob.init.contains(&ground("at", &["waterfountain", "p3"])));
    assert!(prob.init.contains(&ground("at", &["glass", "p6"])));

    assert_eq!(
        prob.goal,
        Some(Formula::and(vec![
            ground("hasbananas", &[]),
            ground("haswater", &[]),
        ]))
    );
    Ok(())
}

#[test]
fn briefcase_problem() -> Result<(), Errors> {
    let s = fs::read_to_string("testdata/briefcase-pb1.pddl").unwrap();
    let prob = Problem::parse_with(&s, &Config::with_object_default())?;

    assert!(prob.has_requirement(Requirement::Adl));
    assert_eq!(
        prob.objects,
        vec![
            Constant::typed("case", Type::primitive("briefcase")),
            Constant::typed("dictionary", Type::primitive("portable")),
            Constant::typed("paycheck", Type::primitive("portable")),
            Constant::typed("bank", Type::object()),
        ]
    );

    assert_eq!(prob.init.len(), 5);
    assert_eq!(
        prob.init[4],
        Formula::not(ground("visited", &["office"]))
    );
    assert_eq!(
        prob.goal.as_ref().map(|g| g.to_string()),
        Some("(and (at case office) (at dictionary office) (at paycheck home))".to_string())
    );
    Ok(())
}

#[test]
fn parallel_and_sequential_agree() -> Result<(), Errors> {
    let s = fs::read_to_string("testdata/blocksworld-pb8.pddl").unwrap();
    let par = Problem::parse(&s)?;
    let seq = Problem::parse_seq(&s)?;

    assert_eq!(par.objects, seq.objects);
    assert_eq!(par.init, seq.init);
    assert_eq!(par.goal, seq.goal);
    Ok(())
}

#[test]
fn omitted_goal() -> Result<(), Errors> {
    let prob = Problem::parse("(define (problem p) (:domain d) (:init (a)))")?;
    assert_eq!(prob.goal, None);
    assert_eq!(prob.init, vec![ground("a", &[])]);

    let prob = Problem::parse("(define (problem p) (:domain d) (:init) (:goal ()))")?;
    assert_eq!(prob.goal, None);
    Ok(())
}

#[test]
fn problem_needs_domain() {
    let e = Problem::parse("(define (problem p) (:init))").unwrap_err();
    match &e[0].what {
        ErrorType::Expect { have, expect } => {
            assert_eq!(have, ":init");
            assert_eq!(*expect, vec![":domain"]);
        }
        _ => panic!("Invalid ErrorType -- have {:?}, want Expect", e[0].what),
    }
}

#[test]
fn init_must_be_ground() {
    let e = Problem::parse("(define (problem p) (:domain d) (:init (on ?x a)))").unwrap_err();
    match &e[0].what {
        ErrorType::Expect { have, expect: _ } => assert_eq!(have, "?x"),
        _ => panic!("Invalid ErrorType -- have {:?}, want Expect", e[0].what),
    }
}

#[test]
fn metric_is_unsupported() {
    let e = Problem::parse(
        "(define (problem p) (:domain d) (:init) (:goal (a)) (:metric minimize (total-cost)))",
    )
    .unwrap_err();
    assert_eq!(e[0].what, ErrorType::Unsupported(":metric".to_string()));
}

#[test]
fn exists_goal_is_unsupported() {
    let e = Problem::parse(
        "(define (problem p) (:domain d) (:requirements :adl) (:init) (:goal (exists (?x) (a ?x))))",
    )
    .unwrap_err();
    assert_eq!(e.len(), 1);
    assert_eq!(e[0].what, ErrorType::Unsupported("exists".to_string()));
}

#[test]
fn errors_from_every_section_are_collected() {
    let e = Problem::parse(
        "(define (problem p) (:domain d) (:requirements :strips)
           (:objects a - block)
           (:init (p ?x))
           (:goal (= a a)))",
    )
    .unwrap_err();

    assert_eq!(e.len(), 3);
    assert_eq!(
        e[0].what,
        ErrorType::MissingRequirement {
            req: Requirement::Typing,
            what: "typed list".to_string()
        }
    );
    assert_eq!(e[1].line, 3);
    assert_eq!(
        e[2].what,
        ErrorType::MissingRequirement {
            req: Requirement::Equality,
            what: "=".to_string()
        }
    );
}

#[test]
fn requirements_default_to_the_domain() -> Result<(), Errors> {
    let prob = Problem::parse(
        "(define (problem p) (:domain d)
           (:objects a b - block)
           (:init (on-table a))
           (:goal (and (forall (?x) (clear ?x)) (not (= a b)))))",
    )?;

    assert_eq!(
        prob.objects,
        vec![
            Constant::typed("a", Type::primitive("block")),
            Constant::typed("b", Type::primitive("block")),
        ]
    );
    assert_eq!(
        prob.goal.as_ref().map(|g| g.to_string()),
        Some("(and (forall (?x) (clear ?x)) (not (= a b)))".to_string())
    );
    assert!(prob.has_requirement(Requirement::Strips));
    assert!(!prob.has_requirement(Requirement::Typing));
    Ok(())
}

#[test]
fn declared_requirements_gate_the_problem() {
    let e = Problem::parse(
        "(define (problem p) (:domain d) (:requirements :strips)
           (:objects a b - block)
           (:init (on-table a)))",
    )
    .unwrap_err();
    assert_eq!(
        e[0].what,
        ErrorType::MissingRequirement {
            req: Requirement::Typing,
            what: "typed list".to_string()
        }
    );
}

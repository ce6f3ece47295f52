pub mod pddl;

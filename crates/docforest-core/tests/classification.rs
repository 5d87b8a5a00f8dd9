//! Integration tests for classification runs across source units

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use docforest_core::doc::{
    is_reserved, Abstract, ClassifyOptions, Comment, DocRun, ProjectDoc, RawNode, SourceUnit,
};

fn unit(package: &str, comments: Vec<Comment>, nodes: Vec<RawNode>) -> SourceUnit {
    SourceUnit::new(package, comments, nodes)
}

#[test]
fn test_duplicate_root_across_units_keeps_first_subtree() {
    let first = unit(
        "text",
        vec![Comment::new(1, "String helpers")],
        vec![RawNode::new("Util", 1)
            .with_child(RawNode::new("trim", 2))
            .with_child(RawNode::new("Case", 3).with_child(RawNode::new("upper", 4)))],
    );
    let second = unit(
        "math",
        vec![Comment::new(1, "Number helpers")],
        vec![RawNode::new("Util", 1)
            .with_child(RawNode::new("abs", 2))
            .with_child(RawNode::new("Round", 3).with_child(RawNode::new("floor", 4)))],
    );

    let project = DocRun::new(ClassifyOptions::default()).run(&[first, second]);

    let utils: Vec<&Abstract> = project.roots().filter(|a| a.name == "Util").collect();
    assert_eq!(utils.len(), 1);
    let util = utils[0];
    assert_eq!(util.comment, "String helpers");
    assert!(util.has_object("trim"));
    assert!(util.has_abstract("Util_Case"));
    assert!(!util.has_object("abs"));
    assert!(!util.has_abstract("Util_Round"));
    assert!(project.package("math").unwrap().is_empty());
}

#[test]
fn test_reference_forest_shape() {
    let source = unit(
        "demo",
        vec![
            Comment::new(1, "root"),
            Comment::new(2, "leaf"),
            Comment::new(3, "has kids"),
            Comment::new(4, "grandchild"),
        ],
        vec![RawNode::new("A", 1)
            .with_child(RawNode::new("B", 2))
            .with_child(RawNode::new("C", 3).with_child(RawNode::new("D", 4)))],
    );

    let project = DocRun::new(ClassifyOptions::default()).run(&[source]);
    let roots = project.package("demo").unwrap();

    assert_eq!(roots.len(), 1);
    let a = &roots[0];
    assert_eq!(a.unique_id, "A");
    assert_eq!(a.objects.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(), ["B"]);
    assert_eq!(a.abstracts.len(), 1);
    assert_eq!(a.abstracts[0].unique_id, "A_C");
    assert_eq!(a.abstracts[0].objects[0].name, "D");
    assert!(a.abstracts[0].abstracts.is_empty());
}

#[test]
fn test_reserved_root_hides_named_descendants() {
    let source = unit(
        "p",
        Vec::new(),
        vec![RawNode::new("@", 1).with_child(
            RawNode::new("Visible", 2)
                .with_child(RawNode::new("Deep", 3).with_child(RawNode::new("x", 4))),
        )],
    );

    let project = DocRun::new(ClassifyOptions::default()).run(&[source]);
    assert_eq!(project.root_count(), 0);
    assert!(project.index().is_empty());
}

#[test]
fn test_run_stats_accumulate_over_units() {
    let units = vec![
        unit("a", Vec::new(), vec![RawNode::new("λ", 1), RawNode::new("Keep", 2)]),
        unit("b", Vec::new(), vec![RawNode::new("Keep", 1), RawNode::default()]),
    ];

    let mut run = DocRun::new(ClassifyOptions::default());
    run.run(&units);

    let stats = run.stats();
    assert_eq!(stats.reserved, 2);
    assert_eq!(stats.duplicate_roots, 1);
    assert_eq!(stats.total_dropped(), 3);
}

// Randomized forests ---------------------------------------------------------

const ROOT_POOL: [&str; 4] = ["Core", "Util", "Io", "Net"];

struct ForestGen {
    rng: StdRng,
    counter: usize,
    line: u32,
}

impl ForestGen {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            counter: 0,
            line: 0,
        }
    }

    fn unit(&mut self, package: &str) -> SourceUnit {
        let mut comments = Vec::new();
        let roots = (0..self.rng.gen_range(1..4))
            .map(|_| {
                let name = ROOT_POOL[self.rng.gen_range(0..ROOT_POOL.len())].to_string();
                self.node(name, 0, &mut comments)
            })
            .collect();
        unit(package, comments, roots)
    }

    fn node(&mut self, name: String, depth: usize, comments: &mut Vec<Comment>) -> RawNode {
        self.line += 1;
        let mut node = RawNode {
            name: Some(name),
            line: Some(self.line),
            ..RawNode::default()
        };
        if self.rng.gen_bool(0.05) {
            node.line = None;
        }
        if self.rng.gen_bool(0.6) {
            comments.push(Comment::new(self.line, format!("doc {}", self.line)));
        }
        if depth < 4 {
            for _ in 0..self.rng.gen_range(0..4) {
                let child_name = self.child_name();
                node.children.push(self.node(child_name, depth + 1, comments));
            }
        }
        node
    }

    fn child_name(&mut self) -> String {
        self.counter += 1;
        match self.rng.gen_range(0..20) {
            0 => "Unnamed".to_string(),
            1 => "λ".to_string(),
            2 => format!("ask{}?", self.counter),
            _ => format!("n{}", self.counter),
        }
    }
}

/// Raw nodes by name, skipping reserved subtrees; child names are unique
fn raw_by_name<'a>(nodes: &'a [RawNode], out: &mut HashMap<&'a str, &'a RawNode>) {
    for node in nodes {
        if is_reserved(node.name.as_deref()) {
            continue;
        }
        if let Some(name) = node.name.as_deref() {
            out.entry(name).or_insert(node);
        }
        raw_by_name(&node.children, out);
    }
}

fn qualifies(node: &RawNode, comments: &HashSet<u32>, skip_uncommented: bool) -> bool {
    !is_reserved(node.name.as_deref())
        && node
            .line
            .is_some_and(|line| !skip_uncommented || comments.contains(&line))
}

/// A qualifying child that has any children at all
fn is_significant(node: &RawNode, comments: &HashSet<u32>, skip: bool) -> bool {
    node.children
        .iter()
        .any(|c| qualifies(c, comments, skip) && !c.children.is_empty())
}

fn check_project(project: &ProjectDoc, units: &[SourceUnit], skip_uncommented: bool) {
    let mut raw = HashMap::new();
    let mut commented = HashSet::new();
    for unit in units {
        raw_by_name(&unit.nodes, &mut raw);
        commented.extend(unit.comments.iter().map(|c| c.line));
    }

    let mut root_ids = HashSet::new();
    for root in project.roots() {
        assert!(root_ids.insert(root.unique_id.clone()), "duplicate root {}", root.unique_id);
        assert_eq!(root.unique_id, root.name);
    }

    for root in project.roots() {
        root.visit(&mut |a: &Abstract| {
            assert!(!is_reserved(Some(a.name.as_str())));
            assert_eq!(a.is_question, a.name.contains('?'));
            if skip_uncommented {
                assert!(!a.comment.is_empty(), "{} has no comment", a.unique_id);
            }
            for child in &a.abstracts {
                assert_eq!(child.unique_id, format!("{}_{}", a.unique_id, child.name));
                assert_eq!(child.parent.as_deref(), Some(a.unique_id.as_str()));
            }

            let mut names = HashSet::new();
            for object in &a.objects {
                assert!(names.insert(object.name.as_str()), "duplicate object {}", object.name);
                assert!(!is_reserved(Some(object.name.as_str())));
                assert_eq!(object.is_question, object.name.contains('?'));
                if skip_uncommented {
                    assert!(!object.comment.is_empty(), "{} has no comment", object.name);
                }
                let source = raw[object.name.as_str()];
                assert!(
                    !is_significant(source, &commented, skip_uncommented),
                    "{} has significant children but is an object",
                    object.name
                );
            }
        });
    }
}

#[test]
fn test_random_forests_hold_invariants() {
    for seed in 0..64 {
        let mut gen = ForestGen::new(seed);
        let units: Vec<_> = (0..3).map(|i| gen.unit(&format!("pkg{}", i % 2))).collect();

        for skip_uncommented in [false, true] {
            let options = ClassifyOptions { skip_uncommented };
            let project = DocRun::new(options).run(&units);
            check_project(&project, &units, skip_uncommented);
        }
    }
}

#[test]
fn test_parallel_run_matches_sequential() {
    for seed in 100..132 {
        let mut gen = ForestGen::new(seed);
        let units: Vec<_> = (0..6).map(|i| gen.unit(&format!("pkg{}", i % 3))).collect();

        for skip_uncommented in [false, true] {
            let options = ClassifyOptions { skip_uncommented };
            let sequential = DocRun::new(options).run(&units);
            let parallel = DocRun::new(options).run_parallel(&units);
            assert_eq!(sequential, parallel, "seed {seed}");
        }
    }
}

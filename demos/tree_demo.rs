// Demos for the core move-tree CRDT: the same concurrent-move and
// cycle scenarios from the Kleppmann paper, plus log truncation and
// trash emptying, run against `repltree::TreeReplica` directly.
use repltree::{Tree, TreeId, TreeMeta, TreeReplica};
use crdts::Actor;
use rand::Rng;
use std::collections::HashMap;
use std::env;

type TypeId = u64;
type TypeMeta<'a> = &'static str;
type TypeActor = u64;

fn main() {
    let args: Vec<String> = env::args().collect();
    let demo = if args.len() > 1 { &args[1] } else { "" };

    match demo {
        "demo_concurrent_moves" => demo_concurrent_moves(),
        "demo_concurrent_moves_cycle" => demo_concurrent_moves_cycle(),
        "demo_truncate_log" => demo_truncate_log(),
        "demo_walk_deep_tree" => demo_walk_deep_tree(),
        _ => print_help(),
    }
}

// Concurrent moves of the same node to two different new parents: both
// replicas must converge on the same winner once they've merged.
fn demo_concurrent_moves() {
    let mut r1: TreeReplica<TypeId, TypeMeta, TypeActor> = TreeReplica::new(new_id());
    let mut r2: TreeReplica<TypeId, TypeMeta, TypeActor> = TreeReplica::new(new_id());
    r1.add_peer(*r2.id());
    r2.add_peer(*r1.id());

    let ids: HashMap<&str, TypeId> = [
        ("root", new_id()),
        ("a", new_id()),
        ("b", new_id()),
        ("c", new_id()),
    ]
    .iter()
    .cloned()
    .collect();

    let ops = r1.opmoves(vec![
        (0, "root", ids["root"]),
        (ids["root"], "a", ids["a"]),
        (ids["root"], "b", ids["b"]),
        (ids["root"], "c", ids["c"]),
    ]);
    r1.apply_ops_byref(&ops).unwrap();
    r2.apply_ops_byref(&ops).unwrap();

    println!("Initial tree state on both replicas");
    print_tree(r1.tree(), &ids["root"]);

    // replica_1 moves /root/a to /root/b
    let repl1_ops = vec![r1.opmove(ids["b"], "a", ids["a"])];
    // replica_2 "simultaneously" moves /root/a to /root/c
    let repl2_ops = vec![r2.opmove(ids["c"], "a", ids["a"])];

    r1.apply_ops_byref(&repl1_ops).unwrap();
    println!("\nreplica_1 tree after move");
    print_tree(r1.tree(), &ids["root"]);
    r1.apply_ops_byref(&repl2_ops).unwrap();

    r2.apply_ops_byref(&repl2_ops).unwrap();
    println!("\nreplica_2 tree after move");
    print_tree(r2.tree(), &ids["root"]);
    r2.apply_ops_byref(&repl1_ops).unwrap();

    if r1.state() == r2.state() {
        println!("\nreplica_1 state matches replica_2 state. conflict resolved!");
        print_replica_trees(&r1, &r2, &ids["root"]);
    } else {
        println!("\nwarning: replica_1 state does not match replica_2 state after merge");
        print_replica_trees(&r1, &r2, &ids["root"]);
    }
}

// Moving node B under A, while concurrently moving A under B: applying
// either op alone would create a cycle-free tree, but applying both
// naively would create a cycle. One op is discarded; both replicas
// discard the same one.
fn demo_concurrent_moves_cycle() {
    let mut r1: TreeReplica<TypeId, TypeMeta, TypeActor> = TreeReplica::new(new_id());
    let mut r2: TreeReplica<TypeId, TypeMeta, TypeActor> = TreeReplica::new(new_id());
    r1.add_peer(*r2.id());
    r2.add_peer(*r1.id());

    let ids: HashMap<&str, TypeId> = [
        ("root", new_id()),
        ("a", new_id()),
        ("b", new_id()),
        ("c", new_id()),
    ]
    .iter()
    .cloned()
    .collect();

    let ops = r1.opmoves(vec![
        (0, "root", ids["root"]),
        (ids["root"], "a", ids["a"]),
        (ids["root"], "b", ids["b"]),
        (ids["a"], "c", ids["c"]),
    ]);
    r1.apply_ops_byref(&ops).unwrap();
    r2.apply_ops_byref(&ops).unwrap();

    println!("Initial tree state on both replicas");
    print_tree(r1.tree(), &ids["root"]);

    // replica_1 moves /root/b to /root/a, creating /root/a/b
    let repl1_ops = r1.opmoves(vec![(ids["a"], "b", ids["b"])]);
    // replica_2 "simultaneously" moves /root/a to /root/b, creating /root/b/a
    let repl2_ops = r2.opmoves(vec![(ids["b"], "a", ids["a"])]);

    r1.apply_ops_byref(&repl1_ops).unwrap();
    println!("\nreplica_1 tree after move");
    print_tree(r1.tree(), &ids["root"]);
    r1.apply_ops_byref(&repl2_ops).unwrap();

    r2.apply_ops_byref(&repl2_ops).unwrap();
    println!("\nreplica_2 tree after move");
    print_tree(r2.tree(), &ids["root"]);
    r2.apply_ops_byref(&repl1_ops).unwrap();

    if r1.state() == r2.state() {
        println!("\nreplica_1 state matches replica_2 state. conflict resolved, no cycle!");
        print_replica_trees(&r1, &r2, &ids["root"]);
    } else {
        println!("\nwarning: replica_1 state does not match replica_2 state after merge");
        print_replica_trees(&r1, &r2, &ids["root"]);
    }
}

/// Demonstrates causally-stable-threshold tracking and log truncation
/// across a handful of replicas that all gossip the same ops.
fn demo_truncate_log() {
    let num_replicas = 5;
    let mut replicas: Vec<TreeReplica<TypeId, TypeMeta, TypeActor>> = (0..num_replicas)
        .map(|_| TreeReplica::new(new_id()))
        .collect();

    let peer_ids: Vec<TypeActor> = replicas.iter().map(|r| *r.id()).collect();
    for r in replicas.iter_mut() {
        for id in &peer_ids {
            if id != r.id() {
                r.add_peer(*id);
            }
        }
    }

    let root_id = new_id();
    let mut opmoves = vec![replicas[0].opmove(0, "root", root_id)];

    println!("generating move operations...");
    for r in replicas.iter_mut() {
        let finaldepth = rand::thread_rng().gen_range(3, 6);
        let mut ops = vec![];
        mktree_ops(&mut ops, r, root_id, 2, finaldepth);
        opmoves.extend(r.opmoves(ops));
    }

    println!(
        "applying {} operations to all {} replicas...\n",
        opmoves.len(),
        replicas.len()
    );
    for r in replicas.iter_mut() {
        r.apply_ops_byref(&opmoves).unwrap();
    }

    #[derive(Debug)]
    #[allow(dead_code)]
    struct Stat {
        replica: TypeActor,
        ops_before_truncate: usize,
        ops_after_truncate: usize,
    }

    let mut stats: Vec<Stat> = Vec::new();
    for r in replicas.iter_mut() {
        println!("truncating log of replica {}...", r.id());
        println!(
            "causally stable threshold: {:?}\n",
            r.causally_stable_threshold()
        );
        let ops_b4 = r.state().log().len();
        r.truncate_log();
        let ops_after = r.state().log().len();
        stats.push(Stat {
            replica: *r.id(),
            ops_before_truncate: ops_b4,
            ops_after_truncate: ops_after,
        });
    }

    println!("-- Stats --");
    println!("\n{:#?}", stats);
}

/// Builds a deep tree and walks it depth-first.
fn demo_walk_deep_tree() {
    let mut r1: TreeReplica<TypeId, TypeMeta, TypeActor> = TreeReplica::new(new_id());
    let root_id = new_id();

    println!("generating ops...");
    let mut ops = vec![(0, "root", root_id)];
    mktree_ops_tuples(&mut ops, root_id, 2, 6);

    println!("applying ops...");
    let ops_len = ops.len();
    let opmoves = r1.opmoves(ops);
    r1.apply_ops_byref(&opmoves).unwrap();

    println!("walking tree...");
    r1.tree().walk(&root_id, |tree, node_id, depth| {
        let meta = match tree.find(node_id) {
            Some(tn) => format!("{:?}", tn.metadata()),
            None => format!("{:?}", node_id),
        };
        println!("{:indent$}{}", "", meta, indent = depth);
    });

    println!("\nnodes in tree: {}", ops_len);
}

fn print_help() {
    let buf = "
Usage: tree_demo <demo>

<demo> can be any of:
  demo_concurrent_moves
  demo_concurrent_moves_cycle
  demo_truncate_log
  demo_walk_deep_tree

";
    println!("{}", buf);
}

// Returns op tuples representing a depth-first tree, 2 children per parent.
fn mktree_ops(
    ops: &mut Vec<(TypeId, TypeMeta, TypeActor)>,
    _r: &mut TreeReplica<TypeId, TypeMeta, TypeActor>,
    parent_id: u64,
    depth: usize,
    max_depth: usize,
) {
    mktree_ops_tuples(ops, parent_id, depth, max_depth);
}

fn mktree_ops_tuples(
    ops: &mut Vec<(TypeId, TypeMeta, TypeActor)>,
    parent_id: u64,
    depth: usize,
    max_depth: usize,
) {
    if depth > max_depth {
        return;
    }
    for i in 0..2 {
        let name = if i == 0 { "a" } else { "b" };
        let child_id = new_id();
        ops.push((parent_id, name, child_id));
        mktree_ops_tuples(ops, child_id, depth + 1, max_depth);
    }
}

// note: in practice a UUID (at least 128 bits) should be used
fn new_id() -> TypeId {
    rand::random::<TypeId>()
}

fn print_treenode<ID, TM>(tree: &Tree<ID, TM>, node_id: &ID, depth: usize)
where
    ID: TreeId + std::fmt::Debug,
    TM: TreeMeta + std::fmt::Debug,
{
    let meta = match tree.find(node_id) {
        Some(tn) => format!("{:?}", tn.metadata()),
        None if depth == 0 => "forest".to_string(),
        None => panic!("tree node {:?} not found", node_id),
    };
    println!("{:indent$}{}", "", meta, indent = depth * 2);

    for c in tree.children(node_id) {
        print_treenode(tree, &c, depth + 1);
    }
}

fn print_tree<ID, TM>(tree: &Tree<ID, TM>, root: &ID)
where
    ID: TreeId + std::fmt::Debug,
    TM: TreeMeta + std::fmt::Debug,
{
    print_treenode(tree, root, 0);
}

fn print_replica_trees<ID, TM, A>(
    repl1: &TreeReplica<ID, TM, A>,
    repl2: &TreeReplica<ID, TM, A>,
    root: &ID,
) where
    ID: TreeId + std::fmt::Debug,
    A: Actor + std::fmt::Debug,
    TM: TreeMeta + std::fmt::Debug,
{
    println!("\n--replica_1 --");
    print_tree(repl1.tree(), root);
    println!("\n--replica_2 --");
    print_tree(repl2.tree(), root);
    println!();
}

// Demos for the filesystem projection: directories, hard links, and
// name-collision reconciliation between two independently-mutating
// replicas, built on `repltree::fs::Filesystem`.
use repltree::fs::{ConflictPolicy, FsMeta, Ino};
use repltree::fs::Filesystem;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    let demo = if args.len() > 1 { &args[1] } else { "" };

    match demo {
        "demo_mkdir_mknod" => demo_mkdir_mknod(),
        "demo_hard_links" => demo_hard_links(),
        "demo_name_collision" => demo_name_collision(),
        _ => print_help(),
    }
}

fn now() -> i64 {
    1_700_000_000
}

// Builds a small directory tree and walks it with readdir.
fn demo_mkdir_mknod() {
    let mut fs = Filesystem::init(1u32);
    let root = fs.root();

    let docs = fs.mkdir(root, "docs", now()).unwrap();
    fs.mknod(docs, "a.txt", now()).unwrap();
    fs.mknod(docs, "b.txt", now()).unwrap();

    println!("/docs entries:");
    let mut offset = 0usize;
    while let Some((name, ino)) = fs.readdir(docs, offset) {
        println!("  {} -> {:?}", name, ino);
        offset += 1;
    }
}

// Demonstrates the link_count lifecycle: mknod+link gives link_count 2,
// and unlinking both references moves the underlying inode to trash.
fn demo_hard_links() {
    let mut fs = Filesystem::init(1u32);
    let root = fs.root();

    let a = fs.mknod(root, "a.txt", now()).unwrap();
    let inode = match fs.attr(a).unwrap() {
        FsMeta::FileRef { inode_id, .. } => inode_id,
        _ => unreachable!(),
    };
    println!("created a.txt, inode {:?}", inode);

    fs.link(a, root, "b.txt", now()).unwrap();
    print_link_count(&fs, inode);

    fs.unlink(root, "a.txt", now()).unwrap();
    print_link_count(&fs, inode);

    fs.unlink(root, "b.txt", now()).unwrap();
    println!("after final unlink: {:?}", fs.attr(inode).unwrap());
}

fn print_link_count(fs: &Filesystem, inode: Ino) {
    match fs.attr(inode).unwrap() {
        FsMeta::FileInode { link_count, .. } => println!("link_count now {}", link_count),
        other => println!("unexpected metadata {:?}", other),
    }
}

// Two replicas concurrently create a file with the same name in the
// same directory; after merging, reconcile_names resolves the
// collision under both policies.
fn demo_name_collision() {
    let mut fs1 = Filesystem::init(1u32);
    let mut fs2 = Filesystem::init(2u32);
    fs1.replica_mut().add_peer(2u32);
    fs2.replica_mut().add_peer(1u32);

    let root = fs1.root();
    fs1.mknod(root, "notes.txt", now()).unwrap();
    fs2.mknod(root, "notes.txt", now()).unwrap();

    let log2: Vec<_> = fs2.replica().state().log().clone();
    fs1.replica_mut().apply_log_ops(log2).unwrap();

    println!(
        "before reconciliation, /notes.txt has {} concurrent creators",
        fs1.replica().tree().children(&root).len()
    );

    let renamed = fs1
        .reconcile_names(root, ConflictPolicy::RenameAll)
        .unwrap();
    println!("renamed {} colliding entries", renamed);

    let mut offset = 0usize;
    while let Some((name, _)) = fs1.readdir(root, offset) {
        println!("  {}", name);
        offset += 1;
    }
}

fn print_help() {
    let buf = "
Usage: fs_demo <demo>

<demo> can be any of:
  demo_mkdir_mknod
  demo_hard_links
  demo_name_collision

";
    println!("{}", buf);
}

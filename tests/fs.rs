/// tests for the filesystem projection
use repltree::fs::{ConflictPolicy, Filesystem};

const T0: i64 = 1_700_000_000;

#[test]
fn mkdir_mknod_and_readdir() {
    let mut fs = Filesystem::init(1);
    let root = fs.root();

    let docs = fs.mkdir(root, "docs", T0).unwrap();
    let file = fs.mknod(docs, "a.txt", T0).unwrap();

    assert_eq!(fs.lookup(root, "docs"), docs);
    assert_eq!(fs.lookup(docs, "a.txt"), file);
    assert_eq!(fs.readdir(docs, 0), Some(("a.txt".to_string(), file)));
    assert_eq!(fs.readdir(docs, 1), None);
}

#[test]
fn mknod_rejects_duplicate_name() {
    let mut fs = Filesystem::init(1);
    let root = fs.root();

    fs.mknod(root, "a.txt", T0).unwrap();
    assert_eq!(fs.mknod(root, "a.txt", T0), Err(repltree::fs::FsError::AlreadyExists));
}

#[test]
fn rmdir_rejects_non_empty_and_non_directory() {
    let mut fs = Filesystem::init(1);
    let root = fs.root();

    let docs = fs.mkdir(root, "docs", T0).unwrap();
    fs.mknod(docs, "a.txt", T0).unwrap();
    assert_eq!(fs.rmdir(root, "docs"), Err(repltree::fs::FsError::DirectoryNotEmpty));

    fs.mknod(root, "plain.txt", T0).unwrap();
    assert_eq!(fs.rmdir(root, "plain.txt"), Err(repltree::fs::FsError::NotADirectory));
}

#[test]
fn read_write_roundtrip() {
    let mut fs = Filesystem::init(1);
    let root = fs.root();

    let file = fs.mknod(root, "a.txt", T0).unwrap();
    fs.write(file, b"hello ", T0).unwrap();
    fs.write(file, b"world", T0 + 1).unwrap();

    assert_eq!(fs.read(file).unwrap(), b"hello world");
}

#[test]
fn symlink_readlink_roundtrip() {
    let mut fs = Filesystem::init(1);
    let root = fs.root();

    let link = fs.symlink(root, "shortcut", "/docs/a.txt", T0).unwrap();
    assert_eq!(fs.readlink(link).unwrap(), "/docs/a.txt");

    let file = fs.mknod(root, "a.txt", T0).unwrap();
    assert_eq!(fs.readlink(file), Err(repltree::fs::FsError::NotASymlink));
}

// Hard-link lifecycle from the spec: mknod+link gives link_count == 2;
// unlinking one reference drops it to 1 (inode survives); unlinking the
// last reference moves the inode itself to trash. No resurrection.
#[test]
fn hard_link_lifecycle() {
    let mut fs = Filesystem::init(1);
    let root = fs.root();

    let a = fs.mknod(root, "a.txt", T0).unwrap();
    let inode = match fs.attr(a).unwrap() {
        repltree::fs::FsMeta::FileRef { inode_id, .. } => inode_id,
        _ => panic!("expected a file-ref"),
    };

    let b = fs.link(a, root, "b.txt", T0).unwrap();
    match fs.attr(inode).unwrap() {
        repltree::fs::FsMeta::FileInode { link_count, .. } => assert_eq!(link_count, 2),
        _ => panic!("expected a file-inode"),
    }

    fs.unlink(root, "a.txt", T0).unwrap();
    match fs.attr(inode).unwrap() {
        repltree::fs::FsMeta::FileInode { link_count, .. } => assert_eq!(link_count, 1),
        _ => panic!("expected a file-inode"),
    }
    assert!(fs.lookup(root, "a.txt").is_null());

    fs.unlink(root, "b.txt", T0).unwrap();
    assert!(fs.lookup(root, "b.txt").is_null());
    // the inode is moved under `trash`, not deleted outright: it survives
    // in the tree as dead (`Trashed`) state until log truncation reclaims
    // it, per the "no resurrection" lifecycle.
    assert_eq!(fs.attr(inode).unwrap(), repltree::fs::FsMeta::Trashed);
    let _ = b;
}

// Name-collision reconciliation from the spec: two replicas concurrently
// create a child with the same name under the same directory; after
// merging, reconcile_names renames the collision away under each policy.
#[test]
fn reconcile_names_rename_all() {
    let mut fs1 = Filesystem::init(1);
    let mut fs2 = Filesystem::init(2);
    fs1.replica_mut().add_peer(2);
    fs2.replica_mut().add_peer(1);

    let root = fs1.root();
    assert_eq!(root, fs2.root());

    fs1.mknod(root, "conflict.txt", T0).unwrap();
    fs2.mknod(root, "conflict.txt", T0).unwrap();

    let log2: Vec<_> = fs2.replica().state().log().clone();
    fs1.replica_mut().apply_log_ops(log2).unwrap();

    assert_eq!(fs1.replica().tree().children(&root).len(), 2);

    let renamed = fs1.reconcile_names(root, ConflictPolicy::RenameAll).unwrap();
    assert_eq!(renamed, 2);
    assert!(fs1.lookup(root, "conflict.txt").is_null());
    assert!(!fs1.lookup(root, "conflict.txt.conflict.1").is_null());
    assert!(!fs1.lookup(root, "conflict.txt.conflict.2").is_null());
}

#[test]
fn reconcile_names_last_writer_wins_keeps_newest() {
    let mut fs1 = Filesystem::init(1);
    let mut fs2 = Filesystem::init(2);
    fs1.replica_mut().add_peer(2);
    fs2.replica_mut().add_peer(1);

    let root = fs1.root();

    // Both replicas create the same name at the same logical counter; the
    // actor-id tiebreak in `Clock`'s total order makes fs2's entry (actor
    // 2 > actor 1) the newest without needing any extra coordination.
    fs1.mknod(root, "conflict.txt", T0).unwrap();
    fs2.mknod(root, "conflict.txt", T0).unwrap();

    let log1: Vec<_> = fs1.replica().state().log().clone();
    fs2.replica_mut().apply_log_ops(log1).unwrap();

    let renamed = fs2
        .reconcile_names(root, ConflictPolicy::LastWriterWins)
        .unwrap();
    assert_eq!(renamed, 1);
    // the newest (fs2's own) entry kept its name.
    assert!(!fs2.lookup(root, "conflict.txt").is_null());
}

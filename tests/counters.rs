/// tests for the counter CRDTs
use crdts::CvRDT;
use repltree::counters::{BCounter, GCounter, PnCounter};

#[test]
fn gcounter_converges_regardless_of_merge_order() {
    let mut a = GCounter::<u8>::new();
    a.increment(1, 4);
    a.increment(1, 1);

    let mut b = GCounter::<u8>::new();
    b.increment(2, 10);

    let mut c = GCounter::<u8>::new();
    c.increment(3, 2);

    let mut merged_abc = a.clone();
    merged_abc.merge(b.clone());
    merged_abc.merge(c.clone());

    let mut merged_cba = c;
    merged_cba.merge(b);
    merged_cba.merge(a);

    assert_eq!(merged_abc, merged_cba);
    assert_eq!(merged_abc.value(), 17);
}

#[test]
fn pncounter_tracks_net_value_across_replicas() {
    let mut a = PnCounter::<u8>::new();
    a.increment(1, 20);

    let mut b = PnCounter::<u8>::new();
    b.decrement(2, 5);

    a.merge(b);
    assert_eq!(a.value(), 15);
}

#[test]
fn bcounter_rejects_overspend_but_allows_after_transfer() {
    let mut a = BCounter::<u8>::new();
    a.increment(1, 10);

    // replica 1 cannot spend more than its own quota.
    assert!(a.decrement(1, 11).is_err());

    // but can transfer some to replica 2, who can then spend it.
    assert!(a.transfer(1, 2, 6).is_ok());
    assert_eq!(a.quota(&1), 4);
    assert_eq!(a.quota(&2), 6);
    assert!(a.decrement(2, 6).is_ok());
    assert!(a.decrement(2, 1).is_err());
}

#[test]
fn bcounter_merge_is_commutative() {
    let mut a = BCounter::<u8>::new();
    a.increment(1, 10);
    a.transfer(1, 2, 3).unwrap();

    let mut b = BCounter::<u8>::new();
    b.increment(1, 10);
    b.transfer(1, 2, 7).unwrap();

    let mut ab = a.clone();
    ab.merge(b.clone());
    let mut ba = b;
    ba.merge(a);

    assert_eq!(ab, ba);
    assert_eq!(ab.quota(&2), 7);
}

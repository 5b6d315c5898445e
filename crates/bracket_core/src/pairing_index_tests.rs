use super::*;

fn pairing(a: u32, b: u32) -> Pairing<u32> {
    Pairing::new(a, b)
}

#[test]
fn test_add_makes_pairing_active() {
    let mut index = PairingIndex::new();
    assert!(index.add(pairing(1, 2)));

    assert!(index.is_active(&pairing(1, 2)));
    assert!(index.is_active(&pairing(2, 1)));
    assert!(!index.is_finished(&pairing(1, 2)));
    assert_eq!(index.find_active_by_entrant(&1), Some(&pairing(1, 2)));
    assert_eq!(index.find_active_by_entrant(&2), Some(&pairing(1, 2)));
    assert_eq!(index.active_entrant_count(), 2);
}

#[test]
fn test_add_known_pairing_returns_false() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));
    assert!(!index.add(pairing(2, 1)));

    index.finish(&pairing(1, 2));
    assert!(!index.add(pairing(1, 2)));
}

#[test]
fn test_finish_moves_to_finished_partition() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));
    assert!(index.finish(&pairing(1, 2)));

    assert!(!index.is_active(&pairing(1, 2)));
    assert!(index.is_finished(&pairing(1, 2)));
    assert_eq!(index.find_active_by_entrant(&1), None);
    assert_eq!(index.find_finished_by_entrant(&1), &[pairing(1, 2)]);
    assert!(!index.finish(&pairing(1, 2)));
}

#[test]
fn test_finish_keeps_stored_orientation() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));
    // Finishing through a flipped copy must not flip the record.
    index.finish(&pairing(2, 1));

    let finished = &index.finished()[0];
    assert_eq!(*finished.first(), 1);
    assert_eq!(*finished.second(), 2);
}

#[test]
fn test_finished_order_is_completion_order() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));
    index.add(pairing(3, 4));
    index.add(pairing(5, 6));

    // Resolve in a different order than creation.
    index.finish(&pairing(3, 4));
    index.finish(&pairing(5, 6));
    index.finish(&pairing(1, 2));

    assert_eq!(
        index.finished(),
        &[pairing(3, 4), pairing(5, 6), pairing(1, 2)]
    );
}

#[test]
fn test_last_pairing_prefers_active_over_finished() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));
    index.finish(&pairing(1, 2));
    assert_eq!(index.last_pairing_of(&1), Some(&pairing(1, 2)));

    index.add(pairing(1, 3));
    assert_eq!(index.last_pairing_of(&1), Some(&pairing(1, 3)));
    assert_eq!(index.last_pairing_of(&2), Some(&pairing(1, 2)));
    assert_eq!(index.last_pairing_of(&4), None);
}

#[test]
fn test_last_pairing_is_most_recently_finished() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));
    index.finish(&pairing(1, 2));
    index.add(pairing(1, 3));
    index.finish(&pairing(1, 3));

    assert_eq!(index.last_pairing_of(&1), Some(&pairing(1, 3)));
    assert_eq!(index.find_finished_by_entrant(&1).len(), 2);
}

#[test]
fn test_remove_finished_unlinks_entrants() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));
    index.finish(&pairing(1, 2));
    index.add(pairing(1, 3));
    index.finish(&pairing(1, 3));

    assert!(index.remove_finished(&pairing(1, 2)));
    assert!(!index.remove_finished(&pairing(1, 2)));

    assert_eq!(index.finished(), &[pairing(1, 3)]);
    assert_eq!(index.find_finished_by_entrant(&1), &[pairing(1, 3)]);
    assert!(index.find_finished_by_entrant(&2).is_empty());
    assert_eq!(index.last_pairing_of(&2), None);
}

#[test]
fn test_remove_active_by_entrant() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));

    assert_eq!(index.remove_active_by_entrant(&2), Some(pairing(1, 2)));
    assert_eq!(index.remove_active_by_entrant(&2), None);
    assert!(!index.contains(&pairing(1, 2)));
    assert_eq!(index.active_entrant_count(), 0);
}

#[test]
fn test_remove_takes_from_either_partition() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));
    index.add(pairing(3, 4));
    index.finish(&pairing(3, 4));

    assert!(index.remove(&pairing(1, 2)));
    assert!(index.remove(&pairing(3, 4)));
    assert!(!index.remove(&pairing(5, 6)));
    assert!(index.partitions_consistent());
}

#[test]
fn test_serde_round_trip_rebuilds_lookups() {
    let mut index = PairingIndex::new();
    index.add(pairing(1, 2));
    index.finish(&pairing(1, 2));
    index.add(pairing(2, 3));
    index.finish(&pairing(2, 3));
    index.add(pairing(1, 4));

    let json = serde_json::to_string(&index).unwrap();
    let restored: PairingIndex<u32> = serde_json::from_str(&json).unwrap();

    assert!(restored.is_active(&pairing(1, 4)));
    assert_eq!(restored.finished(), &[pairing(1, 2), pairing(2, 3)]);
    assert_eq!(restored.last_pairing_of(&1), Some(&pairing(1, 4)));
    assert_eq!(restored.last_pairing_of(&2), Some(&pairing(2, 3)));
    assert_eq!(restored.find_finished_by_entrant(&2).len(), 2);
    assert!(restored.partitions_consistent());
}

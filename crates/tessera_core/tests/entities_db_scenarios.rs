//! # Entities Database Verification Tests
//!
//! End-to-end checks of the storage contract:
//!
//! 1. **Scenarios**: single-entity updates, swap-remove, sparse groups,
//!    mismatched joint iteration, unknown groups
//! 2. **Invariants**: density and index bijection after long mixed
//!    add/remove sequences
//! 3. **Iteration**: coverage across groups and `has_any` bookkeeping
//!
//! Run with: cargo test --test entities_db_scenarios -- --nocapture

use std::collections::{HashMap, HashSet};

use bytemuck::{Pod, Zeroable};
use tessera_core::{
    Component, DbError, Egid, EntitiesDb, GroupId, StructuralMutation,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {
    const NAME: &'static str = "Position";
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Velocity {
    x: f32,
    y: f32,
}

impl Component for Velocity {
    const NAME: &'static str = "Velocity";
}

/// Records its owner, so buffer contents can be checked against the index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
struct Tag {
    owner: u32,
}

impl Component for Tag {
    const NAME: &'static str = "Tag";
}

fn database() -> EntitiesDb {
    let mut db = EntitiesDb::new();
    db.register::<Position>();
    db.register::<Velocity>();
    db.register::<Tag>();
    db
}

/// Deterministic xorshift sequence.
struct Sequence(u64);

impl Sequence {
    fn next_below(&mut self, max: u32) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 % u64::from(max)) as u32
    }
}

/// Checks density and bijection of `Tag` against the expected live set.
fn assert_consistent(db: &EntitiesDb, live: &HashMap<GroupId, HashSet<u32>>) {
    for (&group, ids) in live {
        let mapper = db.query_mapped_entities::<Tag>(group).unwrap();
        assert_eq!(mapper.count() as usize, ids.len(), "density in {group}");

        let mut owners = HashSet::new();
        for (position, tag) in mapper.entities().iter().enumerate() {
            assert!(ids.contains(&tag.owner), "stale record in {group}");
            assert!(owners.insert(tag.owner), "duplicate record in {group}");
            assert_eq!(
                mapper.resolve(Egid::new(tag.owner, group)),
                Ok(position as u32)
            );
        }
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn verify_update_single_entity() {
    let db = database();
    let egid = Egid::new(1, GroupId(0));
    db.add_component(egid, Position { x: 0.0, y: 0.0 }).unwrap();

    let view = db.query_entities::<Position>(GroupId(0)).unwrap();
    assert_eq!(&*view, &[Position { x: 0.0, y: 0.0 }]);
    drop(view);

    db.execute_on_entity::<Position, _>(egid, |p| p.x = 5.0).unwrap();

    let view = db.query_entities::<Position>(GroupId(0)).unwrap();
    assert_eq!(&*view, &[Position { x: 5.0, y: 0.0 }]);
}

#[test]
fn verify_swap_remove_middle() {
    let db = database();
    let group = GroupId(2);
    for id in [10, 11, 12] {
        db.add_component(Egid::new(id, group), Tag { owner: id })
            .unwrap();
    }

    db.remove_component::<Tag>(Egid::new(11, group)).unwrap();

    let mapper = db.query_mapped_entities::<Tag>(group).unwrap();
    assert_eq!(mapper.count(), 2);
    assert_eq!(mapper.entities()[1], Tag { owner: 12 });
    assert_eq!(mapper.resolve(Egid::new(12, group)), Ok(1));
    assert!(!mapper.exists(Egid::new(11, group)));
    assert!(matches!(
        mapper.resolve(Egid::new(11, group)),
        Err(DbError::EntityNotFound { .. })
    ));
}

#[test]
fn verify_sparse_groups() {
    let db = database();
    db.add_component(Egid::new(1, GroupId(0)), Position::default())
        .unwrap();
    db.add_component(Egid::new(1, GroupId(2)), Position::default())
        .unwrap();

    assert!(db.has_any::<Position>().unwrap());
    assert!(!db.has_any_in::<Position>(GroupId(1)).unwrap());

    let view = db.query_entities::<Position>(GroupId(1)).unwrap();
    assert_eq!(view.count(), 0);
    assert!(view.is_empty());
}

#[test]
fn verify_joint_iteration_mismatch() {
    let db = database();
    let group = GroupId(3);
    for id in 0..5 {
        db.add_component(Egid::new(id, group), Position::default())
            .unwrap();
    }
    for id in 0..4 {
        db.add_component(Egid::new(id, group), Velocity::default())
            .unwrap();
    }

    let mut calls = 0_u32;
    let result = db.execute_on_entities_pair::<Position, Velocity, _>(group, |_, _, _| {
        calls += 1;
    });

    assert!(matches!(
        result,
        Err(DbError::ComponentCountMismatch {
            first_count: 5,
            second_count: 4,
            ..
        })
    ));
    assert_eq!(calls, 0);
}

#[test]
fn verify_unknown_group_mapper() {
    let db = database();
    let mapper = db.query_mapped_entities::<Position>(GroupId(99)).unwrap();

    assert_eq!(mapper.count(), 0);
    assert!(!mapper.exists(Egid::new(1, GroupId(99))));
    assert_eq!(
        mapper.resolve(Egid::new(1, GroupId(99))),
        Err(DbError::EntityNotFound {
            component: "Position",
            egid: Egid::new(1, GroupId(99)),
        })
    );
}

// ============================================================================
// INVARIANTS
// ============================================================================

#[test]
fn verify_density_and_bijection_under_churn() {
    let db = database();
    let mut live: HashMap<GroupId, HashSet<u32>> = HashMap::new();
    let mut seq = Sequence(0x2545_f491_4f6c_dd1d);

    for _ in 0..5_000 {
        let group = GroupId(seq.next_below(4));
        let id = seq.next_below(64);
        let egid = Egid::new(id, group);
        let ids = live.entry(group).or_default();

        if ids.contains(&id) {
            let removed = db.remove_component::<Tag>(egid).unwrap();
            assert_eq!(removed.owner, id);
            ids.remove(&id);
        } else {
            db.add_component(egid, Tag { owner: id }).unwrap();
            ids.insert(id);
        }
    }

    assert_consistent(&db, &live);
}

#[test]
fn verify_swap_remove_relocates_last() {
    let db = database();
    let group = GroupId(1);
    let n = 8_u32;
    for id in 0..n {
        db.add_component(Egid::new(id, group), Tag { owner: id })
            .unwrap();
    }

    db.remove_component::<Tag>(Egid::new(2, group)).unwrap();

    let mapper = db.query_mapped_entities::<Tag>(group).unwrap();
    assert_eq!(mapper.count(), n - 1);
    assert_eq!(mapper.entities()[2], Tag { owner: n - 1 });
    assert_eq!(mapper.resolve(Egid::new(n - 1, group)), Ok(2));
    assert!(!mapper.exists(Egid::new(2, group)));
}

#[test]
fn verify_remove_last_position_moves_nothing() {
    let db = database();
    let group = GroupId(0);
    for id in 0..3 {
        db.add_component(Egid::new(id, group), Tag { owner: id })
            .unwrap();
    }

    db.remove_component::<Tag>(Egid::new(2, group)).unwrap();

    let mapper = db.query_mapped_entities::<Tag>(group).unwrap();
    assert_eq!(mapper.entities(), &[Tag { owner: 0 }, Tag { owner: 1 }]);
}

#[test]
fn verify_structural_change_inside_iteration_fails() {
    let db = database();
    let group = GroupId(0);
    for id in 0..3 {
        db.add_component(Egid::new(id, group), Tag { owner: id })
            .unwrap();
    }

    let mut rejected = 0;
    db.execute_on_entities::<Tag, _>(group, |tag, _| {
        if let Err(DbError::ConcurrentStructuralMutation { .. }) =
            db.remove_component::<Tag>(Egid::new(tag.owner, group))
        {
            rejected += 1;
        }
    })
    .unwrap();

    assert_eq!(rejected, 3);
    assert_eq!(db.count::<Tag>(group), Ok(3));
}

// ============================================================================
// ITERATION
// ============================================================================

#[test]
fn verify_all_entities_coverage() {
    let db = database();
    let mut expected = HashSet::new();
    for group in 0..5 {
        for id in 0..(group * 3) {
            db.add_component(Egid::new(id, GroupId(group)), Tag { owner: id })
                .unwrap();
            expected.insert((GroupId(group), id));
        }
    }
    db.remove_component::<Tag>(Egid::new(0, GroupId(4))).unwrap();
    expected.remove(&(GroupId(4), 0));

    let mut visited = Vec::new();
    db.execute_on_all_entities_with::<Tag, _, _>(&mut visited, |tag, group, _, visited| {
        visited.push((group, tag.owner));
    })
    .unwrap();

    let total: u32 = (0..5).map(|g| db.count::<Tag>(GroupId(g)).unwrap()).sum();
    assert_eq!(visited.len(), total as usize);
    let unique: HashSet<_> = visited.into_iter().collect();
    assert_eq!(unique, expected);
}

#[test]
fn verify_has_any_tracks_counts() {
    let db = database();
    assert!(!db.has_any::<Velocity>().unwrap());

    let egid = Egid::new(4, GroupId(6));
    db.add_component(egid, Velocity::default()).unwrap();
    assert!(db.has_any::<Velocity>().unwrap());
    assert!(db.has_any_in::<Velocity>(GroupId(6)).unwrap());
    assert!(!db.has_any_in::<Velocity>(GroupId(5)).unwrap());

    db.remove_component::<Velocity>(egid).unwrap();
    assert!(!db.has_any::<Velocity>().unwrap());
    assert!(!db.has_any_in::<Velocity>(GroupId(6)).unwrap());
}

#[test]
fn verify_pair_iteration_with_state() {
    let db = database();
    let group = GroupId(0);
    for id in 0..10 {
        let egid = Egid::new(id, group);
        db.add_component(egid, Position::default()).unwrap();
        db.add_component(egid, Velocity { x: 1.0, y: 2.0 }).unwrap();
    }

    let mut moved = 0_u32;
    db.execute_on_entities_pair_with::<Position, Velocity, _, _>(
        group,
        &mut moved,
        |p, v, _, moved| {
            p.x += v.x;
            p.y += v.y;
            *moved += 1;
        },
    )
    .unwrap();

    assert_eq!(moved, 10);
    let view = db.query_entities::<Position>(group).unwrap();
    assert!(view.iter().all(|p| *p == Position { x: 1.0, y: 2.0 }));
}

#[test]
fn verify_move_entity_between_groups() {
    let db = database();
    let egid = Egid::new(9, GroupId(0));
    db.add_component(egid, Position { x: 3.0, y: 4.0 }).unwrap();
    db.add_component(egid, Tag { owner: 9 }).unwrap();

    let moved = db.move_to_group(egid, GroupId(7)).unwrap();

    assert!(!db.has_any_in::<Tag>(GroupId(0)).unwrap());
    assert_eq!(
        db.query_entities::<Position>(GroupId(7)).unwrap()[0],
        Position { x: 3.0, y: 4.0 }
    );
    assert_eq!(db.remove_entity(moved), Ok(2));
    assert!(!db.has_any::<Tag>().unwrap());
}

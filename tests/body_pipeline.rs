//! End-to-end tick behavior through the public context API

use glam::Vec2;
use lockstep_body::math::{Fixed, Vec2d};
use lockstep_body::render::{NoRender, RenderSync, TransformBuffer};
use lockstep_body::sim::{Aabb, Body, BodyConfig, BodyId, Partition, Pose, Shape, SimContext};
use lockstep_body::SimConfig;

fn fx(n: i64) -> Fixed {
    Fixed::from_int(n)
}

fn aabb(x_min: i64, x_max: i64, y_min: i64, y_max: i64) -> Aabb {
    Aabb {
        x_min: fx(x_min),
        x_max: fx(x_max),
        y_min: fx(y_min),
        y_max: fx(y_max),
    }
}

/// Counts partition notifications per body
#[derive(Debug, Default)]
struct RecordingPartition {
    calls: Vec<BodyId>,
}

impl Partition for RecordingPartition {
    fn partition_object(&mut self, body: &mut Body) {
        self.calls.push(body.id());
    }
}

/// Remembers every push in arrival order
#[derive(Debug, Default)]
struct SyncLog {
    positions: Vec<(BodyId, Vec2)>,
    rotations: Vec<(BodyId, Vec2)>,
}

impl RenderSync for SyncLog {
    fn sync_position(&mut self, id: BodyId, position: Vec2) {
        self.positions.push((id, position));
    }

    fn sync_rotation(&mut self, id: BodyId, heading: Vec2) {
        self.rotations.push((id, heading));
    }
}

#[test]
fn circle_moves_and_rebuilds_bounds() {
    let mut ctx = SimContext::default();
    let id = ctx
        .initialize(BodyConfig::new(Shape::circle(Fixed::ONE)), Pose::default())
        .expect("valid circle");
    ctx.set_velocity(id, Vec2d::from_int(1, 0)).expect("exists");

    ctx.early_simulate().expect("phase 1");
    ctx.simulate().expect("phase 2");

    let body = ctx.body(id).expect("exists");
    assert_eq!(body.position(), Vec2d::from_int(1, 0));
    assert_eq!(body.bounds().current, aabb(0, 2, -1, 1));
    // Swept by velocity * 2
    assert_eq!(body.bounds().future, aabb(2, 4, -1, 1));
    assert_eq!(body.future_position(), Vec2d::from_int(3, 0));
}

#[test]
fn triangle_real_points_and_bounds() {
    let mut ctx = SimContext::default();
    let triangle = Shape::polygon(vec![
        Vec2d::from_int(0, 0),
        Vec2d::from_int(2, 0),
        Vec2d::from_int(0, 2),
    ]);
    let id = ctx
        .initialize(
            BodyConfig::new(triangle),
            Pose::new(Vec2d::from_int(5, 5), Vec2d::RIGHT),
        )
        .expect("valid triangle");

    let body = ctx.body(id).expect("exists");
    assert_eq!(
        body.real_points(),
        &[
            Vec2d::from_int(5, 5),
            Vec2d::from_int(7, 5),
            Vec2d::from_int(5, 7)
        ]
    );
    assert_eq!(body.bounds().current, aabb(5, 7, 5, 7));
    assert_eq!(body.edge_normals().len(), 3);
}

#[test]
fn box_bounds_are_tight_regardless_of_heading() {
    let mut ctx = SimContext::default();
    let id = ctx
        .initialize(
            BodyConfig::new(Shape::aa_box(fx(3), fx(1))),
            Pose::new(Vec2d::from_int(10, -4), Vec2d::from_int(1, 1).normalize()),
        )
        .expect("valid box");

    assert_eq!(ctx.body(id).expect("exists").bounds().current, aabb(7, 13, -5, -3));
}

#[test]
fn partition_is_notified_once_per_moving_tick() {
    let mut ctx = SimContext::with_partition(SimConfig::default(), RecordingPartition::default());
    let mover = ctx
        .initialize(BodyConfig::new(Shape::circle(Fixed::ONE)), Pose::default())
        .expect("valid");
    let idle = ctx
        .initialize(BodyConfig::new(Shape::circle(Fixed::ONE)), Pose::default())
        .expect("valid");
    ctx.step(&mut NoRender).expect("settle tick");
    ctx.partition_mut().calls.clear();

    ctx.set_velocity(mover, Vec2d::from_int(0, 1)).expect("exists");
    for _ in 0..3 {
        ctx.step(&mut NoRender).expect("tick");
    }

    let calls = &ctx.partition().calls;
    assert_eq!(calls.iter().filter(|&&id| id == mover).count(), 3);
    assert!(!calls.contains(&idle));
}

#[test]
fn moved_child_is_partitioned_once_per_tick() {
    let mut ctx = SimContext::with_partition(SimConfig::default(), RecordingPartition::default());
    let parent = ctx
        .initialize(BodyConfig::new(Shape::circle(Fixed::ONE)), Pose::default())
        .expect("valid");
    let child = ctx
        .initialize(BodyConfig::new(Shape::circle(Fixed::ONE)), Pose::at(Vec2d::from_int(3, 0)))
        .expect("valid");
    ctx.set_parent(child, parent).expect("attach");
    ctx.step(&mut NoRender).expect("settle tick");
    ctx.step(&mut NoRender).expect("settle tick");
    ctx.partition_mut().calls.clear();

    // Own move and parent move land in the same tick
    ctx.set_velocity(parent, Vec2d::from_int(1, 0)).expect("exists");
    ctx.set_position(child, Vec2d::from_int(5, 0)).expect("exists");
    ctx.step(&mut NoRender).expect("tick");

    let calls = &ctx.partition().calls;
    assert_eq!(calls.iter().filter(|&&id| id == child).count(), 1);
    assert_eq!(calls.iter().filter(|&&id| id == parent).count(), 1);

    // Parent-only movement still reaches the partition once
    ctx.partition_mut().calls.clear();
    ctx.step(&mut NoRender).expect("tick");
    let calls = &ctx.partition().calls;
    assert_eq!(calls.iter().filter(|&&id| id == child).count(), 1);
}

#[test]
fn render_sync_only_fires_for_changes() {
    let mut ctx = SimContext::default();
    let a = ctx
        .initialize(BodyConfig::new(Shape::circle(Fixed::ONE)), Pose::default())
        .expect("valid");
    let b = ctx
        .initialize(BodyConfig::new(Shape::circle(Fixed::ONE)), Pose::default())
        .expect("valid");

    // Initialization raises every flag, so the first tick syncs both
    let mut log = SyncLog::default();
    ctx.step(&mut log).expect("tick");
    assert_eq!(log.positions.len(), 2);
    assert_eq!(log.rotations.len(), 2);

    let mut log = SyncLog::default();
    ctx.set_position(b, Vec2d::from_int(4, 4)).expect("exists");
    ctx.step(&mut log).expect("tick");
    assert_eq!(log.positions, vec![(b, Vec2::new(4.0, 4.0))]);
    assert!(log.rotations.is_empty());

    let mut log = SyncLog::default();
    ctx.set_rotation(a, Vec2d::RIGHT).expect("exists");
    ctx.step(&mut log).expect("tick");
    assert!(log.positions.is_empty());
    assert_eq!(log.rotations, vec![(a, Vec2::X)]);
}

#[test]
fn buffers_lag_primary_flags_by_one_phase() {
    let mut ctx = SimContext::default();
    let id = ctx
        .initialize(BodyConfig::new(Shape::circle(Fixed::ONE)), Pose::default())
        .expect("valid");
    // The first tick latches the initial flags; the second clears them
    ctx.step(&mut NoRender).expect("settle tick");
    ctx.step(&mut NoRender).expect("settle tick");

    ctx.set_position(id, Vec2d::from_int(2, 0)).expect("exists");
    let flags = ctx.body(id).expect("exists").flags();
    assert!(flags.position_changed);
    assert!(!flags.position_changed_buffer);

    ctx.early_simulate().expect("phase 1");
    let flags = ctx.body(id).expect("exists").flags();
    assert!(flags.position_changed_buffer);
    assert!(!flags.set_position_buffer);

    ctx.simulate().expect("phase 2");
    let flags = ctx.body(id).expect("exists").flags();
    assert!(!flags.position_changed);
    assert!(flags.set_position_buffer);

    ctx.visualize(&mut NoRender).expect("phase 3");
    assert!(!ctx.body(id).expect("exists").flags().set_position_buffer);
}

#[test]
fn parent_rotation_swings_child_exactly() {
    let mut ctx = SimContext::default();
    let parent_pos = Vec2d::from_int(20, -7);
    let parent = ctx
        .initialize(
            BodyConfig::new(Shape::circle(Fixed::ONE)),
            Pose::new(parent_pos, Vec2d::RIGHT),
        )
        .expect("valid");
    let child = ctx
        .initialize(
            BodyConfig::new(Shape::circle(Fixed::HALF)),
            Pose::new(parent_pos + Vec2d::from_int(5, 0), Vec2d::RIGHT),
        )
        .expect("valid");
    ctx.set_parent(child, parent).expect("attach");
    ctx.step(&mut NoRender).expect("settle tick");

    ctx.set_rotation(parent, Vec2d::UP).expect("exists");
    ctx.step(&mut NoRender).expect("tick");

    let body = ctx.body(child).expect("exists");
    assert_eq!(body.position(), parent_pos + Vec2d::from_int(0, 5));
    assert_eq!(body.rotation(), Vec2d::UP);
}

#[test]
fn child_keeps_edited_pose_when_parent_turns() {
    let mut ctx = SimContext::default();
    let parent_pos = Vec2d::from_int(10, 10);
    let parent = ctx
        .initialize(
            BodyConfig::new(Shape::circle(Fixed::ONE)),
            Pose::new(parent_pos, Vec2d::RIGHT),
        )
        .expect("valid");
    let child = ctx
        .initialize(
            BodyConfig::new(Shape::circle(Fixed::HALF)),
            Pose::new(parent_pos + Vec2d::from_int(2, 0), Vec2d::RIGHT),
        )
        .expect("valid");
    ctx.set_parent(child, parent).expect("attach");
    ctx.step(&mut NoRender).expect("settle tick");
    ctx.step(&mut NoRender).expect("settle tick");

    ctx.set_position(child, parent_pos + Vec2d::from_int(4, 0)).expect("exists");
    ctx.set_rotation(child, Vec2d::UP).expect("exists");
    ctx.step(&mut NoRender).expect("tick");
    let body = ctx.body(child).expect("exists");
    assert_eq!(body.local_position(), Vec2d::from_int(4, 0));
    assert_eq!(body.local_rotation(), Vec2d::UP);

    ctx.set_rotation(parent, Vec2d::UP).expect("exists");
    ctx.step(&mut NoRender).expect("tick");

    let body = ctx.body(child).expect("exists");
    assert_eq!(body.position(), parent_pos + Vec2d::from_int(0, 4));
    assert_eq!(body.rotation(), Vec2d::from_int(-1, 0));
}

#[test]
fn translation_propagates_through_grandchildren_in_one_tick() {
    let mut ctx = SimContext::default();
    let config = || BodyConfig::new(Shape::circle(Fixed::ONE));
    // Registered leaf-first so update order differs from id order
    let leaf = ctx.initialize(config(), Pose::at(Vec2d::from_int(2, 0))).expect("valid");
    let mid = ctx.initialize(config(), Pose::at(Vec2d::from_int(1, 0))).expect("valid");
    let root = ctx.initialize(config(), Pose::default()).expect("valid");
    ctx.set_parent(mid, root).expect("attach");
    ctx.set_parent(leaf, mid).expect("attach");
    ctx.step(&mut NoRender).expect("settle tick");

    ctx.set_velocity(root, Vec2d::from_int(0, 3)).expect("exists");
    ctx.step(&mut NoRender).expect("tick");

    assert_eq!(ctx.body(root).expect("exists").position(), Vec2d::from_int(0, 3));
    assert_eq!(ctx.body(mid).expect("exists").position(), Vec2d::from_int(1, 3));
    assert_eq!(ctx.body(leaf).expect("exists").position(), Vec2d::from_int(2, 3));
    assert_eq!(
        ctx.body(leaf).expect("exists").bounds().current,
        aabb(1, 3, 2, 4)
    );
}

#[test]
fn grid_tracks_moving_body() {
    let mut ctx = SimContext::default();
    let id = ctx
        .initialize(BodyConfig::new(Shape::circle(Fixed::ONE)), Pose::at(Vec2d::from_int(8, 8)))
        .expect("valid");
    ctx.step(&mut NoRender).expect("tick");

    let here = Aabb::around(Vec2d::from_int(8, 8), Fixed::ONE, Fixed::ONE);
    assert_eq!(ctx.partition().query(&here), vec![id]);

    ctx.set_position(id, Vec2d::from_int(200, 200)).expect("exists");
    ctx.step(&mut NoRender).expect("tick");
    assert!(ctx.partition().query(&here).is_empty());
    let there = Aabb::around(Vec2d::from_int(200, 200), Fixed::ONE, Fixed::ONE);
    assert_eq!(ctx.partition().query(&there), vec![id]);
}

#[test]
fn shapeless_body_moves_without_geometry() {
    let mut ctx = SimContext::default();
    let id = ctx
        .initialize(BodyConfig::new(Shape::None), Pose::default())
        .expect("valid");
    ctx.set_velocity(id, Vec2d::from_int(1, 1)).expect("exists");
    let mut buffer = TransformBuffer::new();
    ctx.step(&mut buffer).expect("tick");

    let body = ctx.body(id).expect("exists");
    assert_eq!(body.position(), Vec2d::from_int(1, 1));
    assert!(body.real_points().is_empty());
    assert!(body.located_partitions().is_empty());
    let transform = buffer.get(id).expect("synced");
    assert_eq!(transform.position, Vec2::new(1.0, 1.0));
}

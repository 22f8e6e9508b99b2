//! Scheduler behavior through the public facade: phase ordering,
//! per-frame clearing, stable handles, and quit semantics.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use tui_arcade::canvas::FrameBuffer;
use tui_arcade::engine::{Engine, EngineConfig, Entity, Game, RunState, Surface, World};
use tui_arcade::input::NullEvents;
use tui_arcade::types::{CollisionKind, Layer};

/// Headless surface that records each presented frame's dirty state by
/// comparing against its own previous copy.
struct RecordingSurface {
    prev: Option<FrameBuffer>,
    flushes: Vec<bool>,
}

impl RecordingSurface {
    fn new() -> Self {
        Self {
            prev: None,
            flushes: Vec::new(),
        }
    }
}

impl Surface for RecordingSurface {
    fn present(&mut self, frame: &FrameBuffer) -> Result<bool> {
        let dirty = match &self.prev {
            Some(prev) => prev != frame,
            None => true,
        };
        self.prev = Some(frame.clone());
        self.flushes.push(dirty);
        Ok(dirty)
    }

    fn invalidate(&mut self) {
        self.prev = None;
    }
}

fn engine_with(
    w: u16,
    h: u16,
) -> Engine<RecordingSurface, NullEvents> {
    let config = EngineConfig {
        canvas_w: w,
        canvas_h: h,
        frame_rate: 2_000,
        ..EngineConfig::default()
    };
    Engine::new(config, RecordingSurface::new(), NullEvents, None)
}

struct StopAfter {
    frames: u64,
}

impl Game for StopAfter {
    fn post_step(&mut self, world: &mut World) {
        if world.elapsed_frames() + 1 >= self.frames {
            world.quit();
        }
    }
}

#[derive(Clone)]
struct Recorder {
    name: &'static str,
    trace: Rc<RefCell<Vec<String>>>,
}

impl Entity for Recorder {
    fn begin_step(&mut self, _world: &mut World) {
        self.trace.borrow_mut().push(format!("begin:{}", self.name));
    }

    fn step(&mut self, _world: &mut World) {
        self.trace.borrow_mut().push(format!("step:{}", self.name));
    }

    fn end_step(&mut self, _world: &mut World) {
        self.trace.borrow_mut().push(format!("end:{}", self.name));
    }
}

#[test]
fn three_entities_run_in_barriered_phases() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut engine = engine_with(8, 4);
    for name in ["one", "two", "three"] {
        engine.world_mut().spawn(Recorder {
            name,
            trace: Rc::clone(&trace),
        });
    }

    engine.run(&mut StopAfter { frames: 1 }).unwrap();
    assert_eq!(engine.run_state(), RunState::Stopped);

    let calls = trace.borrow().clone();
    let phase_of = |call: &str| call.split(':').next().unwrap().to_string();
    assert_eq!(calls.len(), 9);
    assert!(calls[0..3].iter().all(|c| phase_of(c) == "begin"));
    assert!(calls[3..6].iter().all(|c| phase_of(c) == "step"));
    assert!(calls[6..9].iter().all(|c| phase_of(c) == "end"));
    for chunk in calls.chunks(3) {
        let names: Vec<_> = chunk
            .iter()
            .map(|c| c.split(':').nth(1).unwrap())
            .collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }
}

struct TagsDynamic;

impl Entity for TagsDynamic {
    fn step(&mut self, world: &mut World) {
        if world.elapsed_frames() == 0 {
            world.set_collision(4, 2, CollisionKind::Dynamic, 1);
            world.set_collision(4, 2, CollisionKind::Static, 9);
        }
    }
}

#[test]
fn dynamic_collision_resets_after_one_frame_cycle() {
    let mut engine = engine_with(8, 4);
    engine.world_mut().spawn(TagsDynamic);
    engine.run(&mut StopAfter { frames: 2 }).unwrap();

    assert_eq!(engine.world().collision(4, 2, CollisionKind::Dynamic), 0);
    assert_eq!(engine.world().collision(4, 2, CollisionKind::Static), 9);
}

struct StaticPainter;

impl Entity for StaticPainter {
    fn step(&mut self, world: &mut World) {
        // Drawn once; the Ui layer persists while Entity/Debug reset.
        if world.elapsed_frames() == 0 {
            world.set_char(1, 1, Layer::Ui, 'u');
        }
        world.set_char(2, 2, Layer::Entity, '@');
    }
}

#[test]
fn unchanged_frames_skip_the_flush() {
    let mut engine = engine_with(8, 4);
    engine.world_mut().spawn(StaticPainter);
    engine.run(&mut StopAfter { frames: 4 }).unwrap();

    let flushes = &engine.surface_mut().flushes;
    assert_eq!(flushes.len(), 4);
    // First frame paints everything; identical frames after that are
    // presented but not flushed.
    assert!(flushes[0]);
    assert!(flushes[1..].iter().all(|&flushed| !flushed));
}

struct Nothing;

impl Entity for Nothing {}

#[test]
fn entity_ids_stay_valid_across_removals() {
    let mut engine = engine_with(8, 4);
    let a = engine.world_mut().spawn(Nothing);
    let b = engine.world_mut().spawn(Nothing);
    let c = engine.world_mut().spawn(Nothing);
    assert!(a != b && b != c);

    engine.run(&mut StopAfter { frames: 1 }).unwrap();
    assert_eq!(engine.entity_count(), 3);

    engine.world_mut().despawn(b);
    engine.run(&mut StopAfter { frames: 1 }).unwrap();

    assert!(engine.contains_entity(a));
    assert!(!engine.contains_entity(b));
    assert!(engine.contains_entity(c));
}

struct MidFrameSpawner {
    trace: Rc<RefCell<Vec<String>>>,
    spawned: bool,
}

impl Entity for MidFrameSpawner {
    fn begin_step(&mut self, world: &mut World) {
        if !self.spawned {
            self.spawned = true;
            world.spawn(Recorder {
                name: "child",
                trace: Rc::clone(&self.trace),
            });
        }
    }
}

#[test]
fn entity_spawned_in_begin_step_joins_before_step_phase() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut engine = engine_with(8, 4);
    engine.world_mut().spawn(MidFrameSpawner {
        trace: Rc::clone(&trace),
        spawned: false,
    });

    engine.run(&mut StopAfter { frames: 1 }).unwrap();
    let calls = trace.borrow().clone();
    assert!(calls.contains(&"step:child".to_string()));
    assert!(calls.contains(&"end:child".to_string()));
}

#[test]
fn quit_finishes_the_frame_through_post_step() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut engine = engine_with(8, 4);
    engine.world_mut().spawn(Recorder {
        name: "solo",
        trace: Rc::clone(&trace),
    });

    struct QuitInPre;
    impl Game for QuitInPre {
        fn pre_step(&mut self, world: &mut World) {
            world.quit();
        }
    }

    engine.run(&mut QuitInPre).unwrap();
    // The quit frame still ran its step and end phases.
    assert_eq!(
        trace.borrow().clone(),
        vec!["begin:solo", "step:solo", "end:solo"]
    );
    assert_eq!(engine.world().elapsed_frames(), 1);
}

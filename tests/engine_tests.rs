// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the scroll engine state machine

mod common;

use common::{FIELD_TILES, VIEWPORT};
use sleepscreen::scroll::{Mode, SceneSurface, ScrollEngine, Surface};
use sleepscreen::ScrollError;
use std::cell::Cell;
use std::rc::Rc;

fn counter() -> (Rc<Cell<u32>>, Box<dyn FnOnce()>) {
    let count = Rc::new(Cell::new(0));
    let inner = count.clone();
    (count, Box::new(move || inner.set(inner.get() + 1)))
}

fn started(assets: &common::Assets) -> (ScrollEngine, SceneSurface) {
    let mut surface = SceneSurface::new(VIEWPORT.0, VIEWPORT.1);
    let mut engine = ScrollEngine::new(common::settings(assets));
    engine.start(&mut surface, false).unwrap();
    (engine, surface)
}

#[test]
fn test_start_builds_field() {
    let assets = common::assets(4, 50, 50);
    let (engine, surface) = started(&assets);

    assert_eq!(engine.mode(), Mode::Continuous);
    assert!(engine.is_running());
    assert_eq!(engine.total_tile_count(), FIELD_TILES);
    assert_eq!(surface.tile_count(), FIELD_TILES);
}

#[test]
fn test_continuous_scroll_keeps_tile_count() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);

    for _ in 0..500 {
        engine.tick(&mut surface);
        assert_eq!(engine.total_tile_count(), FIELD_TILES);
        assert_eq!(surface.tile_count(), FIELD_TILES);
    }

    // Columns stay contiguous and in y order
    let layout = engine.layout().unwrap();
    for column in layout.columns() {
        let ys: Vec<f32> = column.tiles().map(|t| t.y).collect();
        for pair in ys.windows(2) {
            assert!((pair[1] - pair[0] - 50.0).abs() < 1e-3, "gap in {:?}", ys);
        }
    }
}

#[test]
fn test_start_while_running_keeps_layout() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);
    engine.tick(&mut surface);
    let before: Vec<f32> = engine.layout().unwrap().columns()[0].tiles().map(|t| t.y).collect();

    engine.start(&mut surface, false).unwrap();
    let after: Vec<f32> = engine.layout().unwrap().columns()[0].tiles().map(|t| t.y).collect();
    assert_eq!(before, after);
}

#[test]
fn test_stop_animation_drains_field() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);
    let (fired, on_finished) = counter();

    engine.begin_stop(30.0, Some(on_finished));
    assert_eq!(engine.mode(), Mode::Stopping { speed: 30.0 });

    let mut previous = engine.total_tile_count();
    let mut ticks = 0;
    while engine.mode() != Mode::Idle {
        engine.tick(&mut surface);
        let now = engine.total_tile_count();
        assert!(now <= previous, "tile count went up while draining");
        previous = now;
        ticks += 1;
        assert!(ticks < 100, "drain never finished");
    }

    assert_eq!(fired.get(), 1);
    assert!(engine.layout().is_none());
    assert_eq!(surface.tile_count(), 0);

    for _ in 0..10 {
        engine.tick(&mut surface);
    }
    assert_eq!(fired.get(), 1, "callback must fire only once");
}

#[test]
fn test_stop_without_layout_finishes_next_tick() {
    let assets = common::assets(2, 50, 50);
    let mut surface = SceneSurface::new(VIEWPORT.0, VIEWPORT.1);
    let mut engine = ScrollEngine::new(common::settings(&assets));
    let (fired, on_finished) = counter();

    engine.begin_stop(30.0, Some(on_finished));
    assert_eq!(fired.get(), 0);
    engine.tick(&mut surface);
    assert_eq!(fired.get(), 1);
    assert_eq!(engine.mode(), Mode::Idle);
}

#[test]
fn test_start_animation_fires_once() {
    let assets = common::assets(4, 50, 50);
    let mut surface = SceneSurface::new(VIEWPORT.0, VIEWPORT.1);
    let mut engine = ScrollEngine::new(common::settings(&assets));
    engine.start(&mut surface, true).unwrap();
    let (fired, on_finished) = counter();

    engine.begin_start(30.0, Some(on_finished));
    let mut ticks = 0;
    while fired.get() == 0 {
        engine.tick(&mut surface);
        assert_eq!(engine.total_tile_count(), FIELD_TILES);
        ticks += 1;
        assert!(ticks < 100, "reveal never finished");
    }

    assert_eq!(engine.mode(), Mode::Continuous);
    assert!(engine.layout().unwrap().any_column_cycled_once());
    for _ in 0..50 {
        engine.tick(&mut surface);
    }
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_start_animation_replaces_gradient() {
    let assets = common::assets(4, 50, 50);
    let mut surface = SceneSurface::new(VIEWPORT.0, VIEWPORT.1);
    let mut engine = ScrollEngine::new(common::settings(&assets));
    engine.start(&mut surface, true).unwrap();

    let layout = engine.layout().unwrap();
    assert!(layout.columns().iter().flat_map(|c| c.tiles()).all(|t| t.source == assets.gradient));

    engine.begin_start(30.0, None);
    while engine.mode() != Mode::Continuous {
        engine.tick(&mut surface);
    }

    let layout = engine.layout().unwrap();
    let first = &layout.columns()[0];
    assert!(first.tiles().all(|t| t.source != assets.gradient));
}

#[test]
fn test_start_animation_without_layout_goes_idle() {
    let assets = common::assets(2, 50, 50);
    let mut surface = SceneSurface::new(VIEWPORT.0, VIEWPORT.1);
    let mut engine = ScrollEngine::new(common::settings(&assets));
    let (fired, on_finished) = counter();

    engine.begin_start(30.0, Some(on_finished));
    engine.tick(&mut surface);
    assert_eq!(fired.get(), 1);
    assert_eq!(engine.mode(), Mode::Idle);
}

#[test]
fn test_negative_transition_speed_uses_magnitude() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);

    engine.begin_start(-20.0, None);
    assert_eq!(engine.mode(), Mode::Starting { speed: 20.0 });

    let (fired, on_finished) = counter();
    engine.begin_stop(-30.0, Some(on_finished));
    assert_eq!(engine.mode(), Mode::Stopping { speed: 30.0 });

    let mut ticks = 0;
    while fired.get() == 0 {
        engine.tick(&mut surface);
        ticks += 1;
        assert!(ticks < 100, "drain with a negative speed never finished");
    }
    assert_eq!(fired.get(), 1);
    assert_eq!(engine.mode(), Mode::Idle);
    assert_eq!(surface.tile_count(), 0);
}

#[test]
fn test_non_finite_transition_speed_holds_field() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);

    engine.begin_stop(f32::NAN, None);
    assert_eq!(engine.mode(), Mode::Stopping { speed: 0.0 });
    engine.tick(&mut surface);
    assert_eq!(engine.total_tile_count(), FIELD_TILES);
}

#[test]
fn test_stop_scrolls_once_and_idles() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);

    engine.stop(&mut surface);
    assert_eq!(engine.mode(), Mode::Idle);
    assert_eq!(engine.total_tile_count(), FIELD_TILES);

    let ys: Vec<f32> = engine.layout().unwrap().columns()[0].tiles().map(|t| t.y).collect();
    engine.tick(&mut surface);
    let after: Vec<f32> = engine.layout().unwrap().columns()[0].tiles().map(|t| t.y).collect();
    assert_eq!(ys, after, "idle engine must not move tiles");
}

#[test]
fn test_clear_is_idempotent() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);

    engine.clear(&mut surface);
    engine.clear(&mut surface);
    assert_eq!(engine.mode(), Mode::Idle);
    assert!(engine.layout().is_none());
    assert_eq!(surface.tile_count(), 0);

    engine.start(&mut surface, false).unwrap();
    assert_eq!(surface.tile_count(), FIELD_TILES);
}

#[test]
fn test_start_supersedes_transition() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);
    let (fired, on_finished) = counter();

    engine.begin_stop(30.0, Some(on_finished));
    engine.tick(&mut surface);
    engine.start(&mut surface, false).unwrap();

    assert_eq!(engine.mode(), Mode::Continuous);
    assert_eq!(surface.tile_count(), FIELD_TILES);
    for _ in 0..20 {
        engine.tick(&mut surface);
    }
    assert_eq!(fired.get(), 0, "superseded callback must not fire");
}

#[test]
fn test_callback_can_restart_through_handle() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);
    let handle = engine.handle();

    engine.begin_stop(60.0, Some(Box::new(move || handle.start(false))));
    let mut ticks = 0;
    while engine.mode() != Mode::Continuous {
        engine.tick(&mut surface);
        ticks += 1;
        assert!(ticks < 100, "restart never happened");
    }

    assert_eq!(engine.mode(), Mode::Continuous);
    assert_eq!(engine.total_tile_count(), FIELD_TILES);
    assert_eq!(engine.handle().pending(), 0);
}

#[test]
fn test_panicking_callback_is_contained() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);

    engine.begin_stop(60.0, Some(Box::new(|| panic!("callback failure"))));
    for _ in 0..100 {
        engine.tick(&mut surface);
    }
    assert_eq!(engine.mode(), Mode::Idle);

    engine.start(&mut surface, false).unwrap();
    assert_eq!(engine.total_tile_count(), FIELD_TILES);
}

#[test]
fn test_missing_directory() {
    let assets = common::assets(1, 50, 50);
    let mut settings = common::settings(&assets);
    settings.image_dir = assets.dir.path().join("nope");
    let mut engine = ScrollEngine::new(settings);
    let mut surface = SceneSurface::new(VIEWPORT.0, VIEWPORT.1);

    let result = engine.start(&mut surface, false);
    assert!(matches!(result, Err(ScrollError::DirectoryNotFound(_))));
    assert!(engine.layout().is_none());
}

#[test]
fn test_empty_directory() {
    let assets = common::assets(0, 50, 50);
    let mut engine = ScrollEngine::new(common::settings(&assets));
    let mut surface = SceneSurface::new(VIEWPORT.0, VIEWPORT.1);

    let result = engine.start(&mut surface, false);
    assert!(matches!(result, Err(ScrollError::EmptyDirectory(_))));
    assert_eq!(surface.tile_count(), 0);
}

#[test]
fn test_reset_follows_viewport() {
    let assets = common::assets(4, 50, 50);
    let (mut engine, mut surface) = started(&assets);

    surface.set_viewport_size(400, 150);
    engine.reset(&mut surface, false).unwrap();
    assert_eq!(engine.layout().unwrap().columns().len(), 8);
    assert_eq!(surface.tile_count(), 32);
    assert_eq!(surface.viewport_size(), (400, 150));
}

#[test]
fn test_failed_start_leaves_surface_empty() {
    let assets = common::assets(1, 50, 50);
    // Sorts after the good image, so the tile size still probes fine
    std::fs::write(assets.images.join("zz_broken.png"), b"not an image").unwrap();

    for seed in 0..20 {
        let mut settings = common::settings(&assets);
        settings.seed = Some(seed);
        let mut engine = ScrollEngine::new(settings);
        let mut surface = SceneSurface::new(VIEWPORT.0, VIEWPORT.1);

        match engine.start(&mut surface, false) {
            Ok(()) => assert_eq!(surface.tile_count(), FIELD_TILES),
            Err(e) => {
                assert!(matches!(e, ScrollError::AssetLoad { .. }), "seed {seed}: {e}");
                assert!(engine.layout().is_none());
                assert_eq!(surface.tile_count(), 0, "seed {seed}: orphan tiles left");
            }
        }
    }
}

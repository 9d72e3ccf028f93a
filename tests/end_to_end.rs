//! Data file -> population -> 60 ticks through the real loop

use std::fs;

use data_balls::app::{self, FrameClock};
use data_balls::pipeline::{PopulationBuilder, local_today};
use data_balls::renderer::FrameBuffer;
use data_balls::settings::Settings;
use data_balls::sim::{Bounds, SimulationState};

fn settings_for(dir: &tempfile::TempDir) -> Settings {
    Settings {
        data_path: dir.path().join("balls_data.csv"),
        seed: Some(2024),
        ..Settings::default()
    }
}

#[test]
fn single_fresh_large_row_spawns_one_fast_big_ball() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&dir);
    fs::write(
        &settings.data_path,
        format!("Date,Amount\n{},$5000000\n", local_today()),
    )
    .unwrap();

    let mut builder = PopulationBuilder::new(settings.clone());
    let population = builder.build().unwrap();
    assert_eq!(population.len(), 1);

    let ball = &population.entities[0];
    assert!((ball.diameter - 200.0).abs() < 1e-3);
    assert_eq!(ball.speed(), 5.0);
    let start = ball.pos;

    let bounds = Bounds::new(settings.width as f32, settings.height as f32);
    let mut state = SimulationState::new(bounds, population);
    let mut canvas = FrameBuffer::new(settings.width, settings.height).with_frame_limit(60);
    let summary = app::run(&mut state, &mut canvas, &mut FrameClock::unthrottled()).unwrap();

    assert_eq!(summary.frames, 60);
    assert_eq!(state.time_ticks, 60);
    let ball = &state.population.entities[0];
    assert_ne!(ball.pos, start);
    assert!(bounds.contains_circle(ball.pos, ball.radius));
    assert!((ball.vel.length() - 5.0).abs() < 1e-3);
}

#[test]
fn mixed_file_keeps_only_valid_recent_rows() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&dir);
    let today = local_today();
    let day = |n: u64| today.checked_sub_days(chrono::Days::new(n)).unwrap();
    fs::write(
        &settings.data_path,
        format!(
            " Date ,  Amount\n{},\"$1,234.50\"\n{},N/A\n{},1000\n{},2000\n",
            day(0),
            day(1),
            day(7),
            day(8)
        ),
    )
    .unwrap();

    let population = PopulationBuilder::new(settings).build().unwrap();
    assert_eq!(population.len(), 2);
    assert_eq!(population.entities[0].speed(), 5.0);
    assert_eq!(population.entities[1].speed(), 0.25);
    assert!((population.entities[1].diameter - 10.0).abs() < 1e-3);
}

#[test]
fn unreadable_source_runs_with_no_balls() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&dir);

    let population = PopulationBuilder::new(settings.clone()).build_or_empty();
    assert!(population.is_empty());

    let bounds = Bounds::new(settings.width as f32, settings.height as f32);
    let mut state = SimulationState::new(bounds, population);
    let mut canvas = FrameBuffer::new(settings.width, settings.height).with_frame_limit(5);
    let summary = app::run(&mut state, &mut canvas, &mut FrameClock::unthrottled()).unwrap();
    assert_eq!(summary.frames, 5);
}

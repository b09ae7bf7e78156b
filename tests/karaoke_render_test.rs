// Karaoke display plan for a running track

use lyrics_sync_wasm::models::LyricLine;
use lyrics_sync_wasm::renderers::{plan, LineRole, WordState};
use lyrics_sync_wasm::sync::{resolve, Phase};
use lyrics_sync_wasm::SyncConfig;

fn song() -> Vec<LyricLine> {
    vec![
        LyricLine::timed("hello there", 2.0).ending_at(4.0),
        LyricLine::timed("one two three four", 5.0).ending_at(9.0),
        LyricLine::timed("third line", 10.0),
        LyricLine::timed("fourth line", 14.0),
        LyricLine::timed("fifth line", 18.0),
    ]
}

#[test]
fn test_waiting_before_first_line() {
    let config = SyncConfig::default();
    let lines = song();
    let view = plan(&resolve(1.0, &lines, &config), &lines, &config);

    assert!(view.waiting);
    assert_eq!(view.current, None);
    assert_eq!(view.phase, Phase::None);
    // rows 0 and 1 sit just below the hidden current slot
    let roles: Vec<LineRole> = view.lines.iter().map(|l| l.role).collect();
    assert_eq!(roles, vec![LineRole::Next, LineRole::Upcoming]);
}

#[test]
fn test_active_line_window_and_words() {
    let config = SyncConfig::default();
    let lines = song();
    let view = plan(&resolve(7.0, &lines, &config), &lines, &config);

    assert_eq!(view.current, Some(1));
    let indices: Vec<usize> = view.lines.iter().map(|l| l.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);

    let current = view.current_line().unwrap();
    assert_eq!(current.role, LineRole::Current);
    assert_eq!(current.style.scale, 1.0);

    let states: Vec<WordState> = current
        .words
        .as_ref()
        .unwrap()
        .iter()
        .map(|w| w.state)
        .collect();
    assert_eq!(
        states,
        vec![
            WordState::Revealed,
            WordState::Revealed,
            WordState::Emphasized,
            WordState::Pending
        ]
    );
    assert!(view.line(0).unwrap().words.is_none());
    assert_eq!(view.scroll_offset, 0.0);
}

#[test]
fn test_gap_reveals_whole_line() {
    let config = SyncConfig::default();
    let lines = song();
    let view = plan(&resolve(9.5, &lines, &config), &lines, &config);

    assert_eq!(view.phase, Phase::Transitioning);
    assert_eq!(view.transition_progress, Some(0.5));
    let words = view.current_line().unwrap().words.clone().unwrap();
    assert!(words.iter().all(|w| w.state == WordState::Revealed));
}

#[test]
fn test_plan_is_deterministic() {
    let config = SyncConfig::default();
    let lines = song();
    let position = resolve(15.2, &lines, &config);
    assert_eq!(plan(&position, &lines, &config), plan(&position, &lines, &config));
}

use std::sync::{Arc, Mutex};

use super::*;

fn recorded(player: &mut Player) -> Arc<Mutex<Vec<PlayerEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    player.on_event(Box::new(move |e: &PlayerEvent| {
        sink.lock().unwrap().push(e.clone());
    }));
    events.lock().unwrap().clear();
    events
}

#[test]
fn ticks_advance_within_and_across_shots() {
    let mut p = Player::new(vec![100, 200]);
    p.play();
    assert!(p.is_playing());
    p.tick(50);
    assert_eq!(p.shot_index(), 0);
    assert_eq!(p.time_properties().total_time, 50);

    p.tick(50);
    assert_eq!(p.shot_time(), 100);
    p.tick(50);
    assert_eq!(p.shot_index(), 1);
    assert_eq!(p.shot_time(), 0);

    let props = p.time_properties();
    assert_eq!(props.total_time, 100);
    assert_eq!(props.shot_duration, 200);
    assert!(props.is_last_shot);
    assert!((props.total_percentage - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn running_past_the_last_shot_finishes() {
    let mut p = Player::new(vec![100]);
    let events = recorded(&mut p);
    p.play();
    p.tick(100);
    p.tick(50);
    assert!(!p.is_playing());
    assert!(p.is_finished());
    let events = events.lock().unwrap();
    assert!(matches!(events.first(), Some(PlayerEvent::ShotStarted(_))));
    assert!(matches!(events.last(), Some(PlayerEvent::Stopped(p)) if p.is_finished));
}

#[test]
fn ticks_are_ignored_when_stopped() {
    let mut p = Player::new(vec![100, 100]);
    p.tick(50);
    assert_eq!(p.shot_time(), 0);
    p.play();
    p.tick(50);
    p.stop();
    p.tick(50);
    assert_eq!(p.shot_time(), 50);
}

#[test]
fn navigation_while_stopped_prepares_the_shot() {
    let mut p = Player::new(vec![100, 200, 300]);
    let events = recorded(&mut p);
    p.go_to_shot(2);
    assert_eq!(p.shot_index(), 2);
    assert!(!p.is_playing());
    {
        let events = events.lock().unwrap();
        assert!(matches!(&events[0], PlayerEvent::ShotPrepared(t) if t.shot_index == 2));
        assert!(matches!(events[1], PlayerEvent::Stopped(_)));
    }

    p.previous_shot();
    assert_eq!(p.shot_index(), 1);
    p.go_to_shot(9);
    assert_eq!(p.shot_index(), 1);
    p.go_to_shot(0);
    p.previous_shot();
    assert_eq!(p.shot_index(), 0);
}

#[test]
fn play_restarts_the_current_shot() {
    let mut p = Player::new(vec![100, 200]);
    p.play();
    p.tick(60);
    p.play();
    assert_eq!(p.shot_time(), 0);
    assert!(p.is_playing());
}

#[test]
fn update_shots_extends_playback() {
    let mut p = Player::new(vec![100]);
    p.play();
    p.update_shots(vec![100, 100]);
    p.tick(100);
    p.tick(50);
    assert_eq!(p.shot_index(), 1);
    assert!(p.is_playing());
    assert_eq!(p.total_duration(), 200);
}

#[test]
fn empty_player_has_zero_progress() {
    let p = Player::new(Vec::new());
    let props = p.time_properties();
    assert_eq!(props.total_duration, 0);
    assert_eq!(props.total_percentage, 0.0);
    assert!(!props.is_last_shot);
}

#[test]
fn realtime_loop_runs_until_finished_or_cancelled() {
    let mut p = Player::new(vec![100]);
    p.play();
    let mut ticks = 0;
    let props = run_realtime(&mut p, &CancelToken::new(), |_| {
        ticks += 1;
        Ok(())
    })
    .unwrap();
    assert!(props.is_finished);
    assert!(ticks >= 2);

    let mut p = Player::new(vec![10_000]);
    p.play();
    let cancel = CancelToken::new();
    let props = run_realtime(&mut p, &cancel, |player| {
        if player.shot_time() >= 100 {
            cancel.cancel();
        }
        Ok(())
    })
    .unwrap();
    assert!(!props.is_playing);
    assert!(!props.is_finished);
    assert_eq!(props.shot_time, 100);
}

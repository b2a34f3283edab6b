//! End-to-end engine tests on scripted key state and a recording injector.
//!
//! All timing runs on tokio's paused clock, so held keys and macro
//! pauses elapse deterministically.

use std::{sync::Arc, time::Duration};

use keycode::VirtualKey;
use macrokey_engine::{
    BasicMacro, ComboMacro, Engine, HotkeyMonitor, ImageMacro, MacroStore, POLL_INTERVAL,
    TriggerMode, test_support::ScriptedKeyState,
};
use sendkey::{InputEvent, RecordingInjector, SendKey};
use tokio::time::sleep;

fn engine() -> (Engine, Arc<ScriptedKeyState>, Arc<RecordingInjector>) {
    let keys = ScriptedKeyState::new();
    let rec = Arc::new(RecordingInjector::new());
    let engine = Engine::with_parts(keys.clone(), SendKey::with_injector(rec.clone()));
    (engine, keys, rec)
}

fn key(token: &str) -> VirtualKey {
    keycode::resolve(token).unwrap()
}

fn basic(name: &str, hotkey: &str, actions: &[&str]) -> BasicMacro {
    BasicMacro {
        name: name.into(),
        hotkey: hotkey.into(),
        enabled: true,
        looped: false,
        hold_mode: false,
        actions: actions.iter().map(|s| s.to_string()).collect(),
    }
}

fn store_with_basic(mac: BasicMacro) -> MacroStore {
    MacroStore {
        basic: vec![mac],
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn held_key_fires_a_single_edge() {
    let (engine, keys, rec) = engine();
    let store = store_with_basic(basic("slash", "F1", &["Press A"]));
    assert_eq!(engine.start_monitoring(&store), 1);

    keys.press(key("F1"));
    // Dozens of poll ticks while the key stays down.
    sleep(POLL_INTERVAL * 50).await;

    let a = key("A");
    assert_eq!(
        rec.events(),
        vec![InputEvent::KeyDown(a), InputEvent::KeyUp(a)]
    );
    engine.stop_monitoring();
}

#[tokio::test(start_paused = true)]
async fn release_and_repress_fires_again() {
    let (engine, keys, rec) = engine();
    let store = store_with_basic(basic("slash", "F1", &["Press A"]));
    engine.start_monitoring(&store);

    keys.press(key("F1"));
    sleep(Duration::from_millis(300)).await;
    keys.release(key("F1"));
    sleep(Duration::from_millis(50)).await;
    keys.press(key("F1"));
    sleep(Duration::from_millis(300)).await;

    assert_eq!(rec.len(), 4);
    engine.stop_monitoring();
}

#[tokio::test(start_paused = true)]
async fn non_looping_macro_runs_each_action_once_in_order() {
    let (engine, keys, rec) = engine();
    let store = store_with_basic(basic("combo", "F2", &["Press Q", "Press W"]));
    engine.start_monitoring(&store);

    keys.press(key("F2"));
    sleep(Duration::from_millis(500)).await;

    let (q, w) = (key("Q"), key("W"));
    assert_eq!(
        rec.events(),
        vec![
            InputEvent::KeyDown(q),
            InputEvent::KeyUp(q),
            InputEvent::KeyDown(w),
            InputEvent::KeyUp(w),
        ]
    );
    engine.stop_monitoring();
}

#[tokio::test(start_paused = true)]
async fn hold_mode_runs_while_held_and_stops_on_release() {
    let (engine, keys, rec) = engine();
    let mut mac = basic("spam", "F3", &["Press Q"]);
    mac.hold_mode = true;
    mac.looped = true;
    engine.start_monitoring(&store_with_basic(mac));

    keys.press(key("F3"));
    // Several loop iterations.
    sleep(Duration::from_millis(700)).await;
    assert!(engine.is_executing());
    assert!(rec.len() >= 4);

    keys.release(key("F3"));
    sleep(Duration::from_millis(300)).await;
    assert!(!engine.is_executing());

    // No further input after the cancel settles.
    let settled = rec.len();
    sleep(Duration::from_millis(500)).await;
    assert_eq!(rec.len(), settled);
    engine.stop_monitoring();
}

#[tokio::test(start_paused = true)]
async fn hold_mode_nonlooping_macro_repeats_while_held() {
    let (engine, keys, rec) = engine();
    let mut mac = basic("spam", "F3", &["Press Q"]);
    mac.hold_mode = true;
    engine.start_monitoring(&store_with_basic(mac));

    // Two seconds held; each pass is one press/release pair, so the
    // sequence must restart many times even though loop is off.
    keys.press(key("F3"));
    sleep(POLL_INTERVAL * 200).await;
    assert!(
        rec.len() >= 6,
        "hold macro must repeat while held, saw {} events",
        rec.len()
    );

    keys.release(key("F3"));
    sleep(Duration::from_millis(300)).await;
    let settled = rec.len();
    sleep(Duration::from_millis(500)).await;
    assert_eq!(rec.len(), settled);
    engine.stop_monitoring();
}

#[tokio::test(start_paused = true)]
async fn shutdown_joins_the_active_run() {
    let (engine, keys, rec) = engine();
    let mut mac = basic("long", "F1", &["Press Q"]);
    mac.looped = true;
    engine.start_monitoring(&store_with_basic(mac));

    keys.press(key("F1"));
    sleep(Duration::from_millis(200)).await;
    assert!(engine.is_executing());

    engine.shutdown().await;
    assert!(!engine.is_executing());

    let settled = rec.len();
    sleep(Duration::from_millis(500)).await;
    assert_eq!(rec.len(), settled);
}

#[tokio::test(start_paused = true)]
async fn second_trigger_is_dropped_while_a_run_is_active() {
    let (engine, keys, rec) = engine();
    let mut long = basic("long", "F1", &["Press Q"]);
    long.looped = true;
    let store = MacroStore {
        basic: vec![long, basic("other", "F2", &["Press B"])],
        ..Default::default()
    };
    engine.start_monitoring(&store);

    keys.press(key("F1"));
    sleep(Duration::from_millis(200)).await;
    assert!(engine.is_executing());

    keys.press(key("F2"));
    sleep(Duration::from_millis(300)).await;

    let b = key("B");
    assert!(
        !rec.events().contains(&InputEvent::KeyDown(b)),
        "busy engine must drop the second trigger"
    );

    engine.cancel();
    sleep(Duration::from_millis(300)).await;
    assert!(!engine.is_executing());
    engine.stop_monitoring();
}

#[tokio::test(start_paused = true)]
async fn combo_skills_run_in_order_with_their_delay() {
    let (engine, keys, rec) = engine();
    let store = MacroStore {
        combo: vec![ComboMacro {
            name: "burst".into(),
            hotkey: "XBUTTON1".into(),
            enabled: true,
            delay_between: 200,
            detect_cooldown: true,
            skills: vec!["Q - Fireball".into(), "W - Heal".into()],
        }],
        ..Default::default()
    };
    engine.start_monitoring(&store);

    keys.press(key("XBUTTON1"));
    sleep(Duration::from_millis(800)).await;

    let (q, w) = (key("Q"), key("W"));
    assert_eq!(
        rec.events(),
        vec![
            InputEvent::KeyDown(q),
            InputEvent::KeyUp(q),
            InputEvent::KeyDown(w),
            InputEvent::KeyUp(w),
        ]
    );
    engine.stop_monitoring();
}

#[tokio::test(start_paused = true)]
async fn disabled_and_unresolvable_macros_are_skipped() {
    let (engine, _keys, _rec) = engine();
    let mut off = basic("off", "F1", &["Press A"]);
    off.enabled = false;
    let store = MacroStore {
        basic: vec![off, basic("bad", "NOT_A_KEY", &["Press A"]), basic("ok", "F2", &[])],
        ..Default::default()
    };
    assert_eq!(engine.start_monitoring(&store), 1);
    assert_eq!(engine.monitor().binding_count(), 1);
    engine.stop_monitoring();
}

#[tokio::test(start_paused = true)]
async fn restart_rebinds_from_the_store() {
    let (engine, keys, rec) = engine();
    engine.start_monitoring(&store_with_basic(basic("a", "F1", &["Press A"])));
    engine.stop_monitoring();

    // Press while stopped; nothing may fire.
    keys.press(key("F1"));
    sleep(Duration::from_millis(200)).await;
    assert!(rec.is_empty());

    // A restart observes the already-held key as a fresh press.
    engine.start_monitoring(&store_with_basic(basic("a", "F1", &["Press A"])));
    sleep(Duration::from_millis(300)).await;
    assert_eq!(rec.len(), 2);
    engine.stop_monitoring();
}

#[tokio::test(start_paused = true)]
async fn image_macro_runs_its_single_action_when_invoked() {
    let (engine, _keys, rec) = engine();
    let mac = ImageMacro {
        name: "revive".into(),
        image_path: "revive.png".into(),
        action: "Click Left".into(),
        confidence: 90,
        enabled: true,
    };
    assert!(engine.run_image(&mac));
    sleep(Duration::from_millis(200)).await;
    assert_eq!(
        rec.events(),
        vec![
            InputEvent::ButtonDown(keycode::MouseButton::Left),
            InputEvent::ButtonUp(keycode::MouseButton::Left),
        ]
    );

    let mut off = mac.clone();
    off.enabled = false;
    assert!(!engine.run_image(&off));
}

#[tokio::test(start_paused = true)]
async fn duplicate_binding_id_is_rejected_without_corrupting_the_first() {
    let monitor = HotkeyMonitor::new(ScriptedKeyState::new());
    monitor.register(1000, "F1", TriggerMode::EdgePress).unwrap();
    assert!(monitor.register(1000, "F2", TriggerMode::Hold).is_err());
    assert_eq!(monitor.binding_count(), 1);

    monitor.unregister(1000);
    monitor.unregister(1000);
    assert_eq!(monitor.binding_count(), 0);
}

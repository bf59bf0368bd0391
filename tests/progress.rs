use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hostexec::dispatch::Dispatcher;
use hostexec::errors::HostexecError;
use hostexec::progress::{DEFAULT_WAITING_STATUS, PercentPattern, ProgressReporter};
use hostexec_test_utils::builders::recording_dispatcher;
use hostexec_test_utils::init_tracing;
use hostexec_test_utils::recording_hook::RecordingHook;
use proptest::prelude::*;

fn reporter_with(hook: RecordingHook) -> (ProgressReporter, Dispatcher, Arc<RecordingHook>) {
    let (dispatcher, _tick) = recording_dispatcher();
    let hook = Arc::new(hook);
    let reporter = ProgressReporter::new(dispatcher.clone(), hook.clone());
    (reporter, dispatcher, hook)
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn show_renders_title_and_waiting_status_every_tick() {
    init_tracing();
    let (reporter, dispatcher, hook) = reporter_with(RecordingHook::new());

    reporter.show("Installing app...");
    assert_eq!(hook.render_count(), 0, "nothing renders before the host ticks");

    dispatcher.drain();
    dispatcher.drain();

    let frames = hook.frames();
    assert_eq!(frames.len(), 2);
    let frame = &frames[0];
    assert_eq!(frame.title, "Installing app...");
    assert_eq!(frame.status, DEFAULT_WAITING_STATUS);
    assert_close(frame.fraction, 0.0);
    assert!(!frame.cancelable);
    assert_eq!(frame.thread, std::thread::current().id());
    assert!(reporter.is_open());
}

#[test]
fn pattern_update_extracts_percentage() {
    let (reporter, dispatcher, hook) = reporter_with(RecordingHook::new());
    let pattern = PercentPattern::new(r"\[(\d+)%\]").unwrap();

    reporter.show("Installing");
    reporter.update_with_pattern("Installing [42%] done", &pattern);
    dispatcher.drain();

    let frame = hook.last_frame().unwrap();
    assert_eq!(frame.status, "Installing [42%] done");
    assert_close(frame.fraction, 0.42);

    reporter.update_with_pattern("no percent here", &pattern);
    let snapshot = reporter.snapshot();
    assert_eq!(snapshot.status, "no percent here");
    assert_close(snapshot.fraction, 0.42);
}

#[test]
fn pattern_without_groups_uses_the_whole_match_and_custom_scale() {
    let (reporter, _dispatcher, _hook) = reporter_with(RecordingHook::new());
    let pattern = PercentPattern::new(r"\d+").unwrap().with_scale(200.0).unwrap();

    reporter.show("Copying");
    reporter.update_with_pattern("copied 50 of 200 files", &pattern);

    assert_close(reporter.snapshot().fraction, 0.25);
}

#[test]
fn fraction_update_sets_both_and_clamps() {
    let (reporter, _dispatcher, _hook) = reporter_with(RecordingHook::new());

    reporter.show("Work");
    reporter.update_fraction("halfway", 0.5);
    assert_close(reporter.snapshot().fraction, 0.5);
    assert_eq!(reporter.snapshot().status, "halfway");

    reporter.update_fraction("overshoot", 1.7);
    assert_close(reporter.snapshot().fraction, 1.0);

    reporter.update("status only");
    let snapshot = reporter.snapshot();
    assert_eq!(snapshot.status, "status only");
    assert_close(snapshot.fraction, 1.0);
}

#[test]
fn show_resets_progress_and_status() {
    let (reporter, _dispatcher, _hook) = reporter_with(RecordingHook::new());

    reporter.show("First");
    reporter.update_fraction("busy", 0.8);
    reporter.show("Second");

    let snapshot = reporter.snapshot();
    assert_eq!(snapshot.title, "Second");
    assert_eq!(snapshot.status, DEFAULT_WAITING_STATUS);
    assert_close(snapshot.fraction, 0.0);
}

#[test]
fn close_clears_the_hook_and_stops_polling() {
    init_tracing();
    let (dispatcher, tick) = recording_dispatcher();
    let hook = Arc::new(RecordingHook::new());
    let reporter = ProgressReporter::new(dispatcher.clone(), hook.clone());

    reporter.show("Working");
    dispatcher.drain();
    assert_eq!(hook.render_count(), 1);

    reporter.close();
    reporter.close();
    dispatcher.drain();

    assert_eq!(hook.render_count(), 1, "no render after close");
    assert_eq!(hook.clears(), 2);
    assert!(!reporter.is_open());
    assert!(dispatcher.is_empty());
    assert!(!dispatcher.is_attached());
    assert_eq!(tick.detaches(), 1);
}

#[test]
fn overlapping_sessions_share_one_polling_task() {
    let (reporter, dispatcher, hook) = reporter_with(RecordingHook::new());

    reporter.show("First");
    reporter.show("Second");
    assert_eq!(dispatcher.len(), 1);

    dispatcher.drain();
    let frames = hook.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].title, "Second");
}

#[test]
fn reopening_before_the_poller_noticed_close_keeps_a_single_poller() {
    let (reporter, dispatcher, hook) = reporter_with(RecordingHook::new());

    reporter.show("First");
    dispatcher.drain();
    reporter.close();
    reporter.show("Second");
    dispatcher.drain();
    dispatcher.drain();

    let titles: Vec<_> = hook.frames().into_iter().map(|f| f.title).collect();
    assert_eq!(titles, vec!["First", "Second", "Second"]);
}

#[test]
fn cancel_closes_session_and_runs_callback_once() {
    init_tracing();
    let (reporter, dispatcher, hook) = reporter_with(RecordingHook::new().cancel_on_render(2));
    let cancels = Arc::new(AtomicUsize::new(0));

    let c = cancels.clone();
    reporter.show_cancelable("Installing", move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    assert!(reporter.snapshot().cancelable);

    dispatcher.drain();
    assert_eq!(cancels.load(Ordering::SeqCst), 0);

    dispatcher.drain();
    assert_eq!(cancels.load(Ordering::SeqCst), 1);
    assert!(!reporter.is_open());

    for _ in 0..3 {
        dispatcher.drain();
    }
    assert_eq!(cancels.load(Ordering::SeqCst), 1);
    assert_eq!(hook.render_count(), 2);
    assert!(hook.frames().iter().all(|f| f.cancelable));
    assert_eq!(hook.clears(), 1);
    assert!(dispatcher.is_empty());
}

#[test]
fn uncancelable_session_polls_until_closed() {
    let (reporter, dispatcher, hook) = reporter_with(RecordingHook::new().cancel_on_render(1));

    reporter.show("No cancel");
    for _ in 0..4 {
        dispatcher.drain();
    }
    assert_eq!(hook.render_count(), 4);
    assert!(reporter.is_open());

    reporter.close();
    dispatcher.drain();
    assert!(dispatcher.is_empty());
}

#[test]
fn polling_task_ends_once_every_reporter_handle_is_gone() {
    let (dispatcher, tick) = recording_dispatcher();
    let hook = Arc::new(RecordingHook::new());
    let reporter = ProgressReporter::new(dispatcher.clone(), hook.clone());

    reporter.show("Orphaned");
    dispatcher.drain();
    assert_eq!(hook.render_count(), 1);

    drop(reporter);
    assert_eq!(dispatcher.drain(), 1);

    assert_eq!(hook.render_count(), 1);
    assert!(dispatcher.is_empty());
    assert!(!dispatcher.is_attached());
    assert_eq!(tick.detaches(), 1);
    assert_eq!(Arc::strong_count(&hook), 1);
}

#[test]
fn updates_from_background_threads_are_rendered_on_the_host() {
    let (reporter, dispatcher, hook) = reporter_with(RecordingHook::new());
    reporter.show("Threads");

    let worker = {
        let reporter = reporter.clone();
        std::thread::spawn(move || reporter.update_fraction("from worker", 0.3))
    };
    worker.join().unwrap();
    dispatcher.drain();

    let frame = hook.last_frame().unwrap();
    assert_eq!(frame.status, "from worker");
    assert_close(frame.fraction, 0.3);
    assert_eq!(frame.thread, std::thread::current().id());
}

#[test]
fn invalid_patterns_and_scales_are_rejected() {
    assert!(matches!(
        PercentPattern::new(r"\[(\d+%"),
        Err(HostexecError::InvalidPattern(_))
    ));

    let pattern = PercentPattern::new(r"(\d+)").unwrap();
    assert!(matches!(
        pattern.clone().with_scale(0.0),
        Err(HostexecError::ConfigError(_))
    ));
    assert!(pattern.with_scale(f32::NAN).is_err());
}

proptest! {
    #[test]
    fn any_percent_in_brackets_maps_to_a_fraction(n in 0u32..=100, prefix in "[a-z ]{0,12}") {
        let pattern = PercentPattern::new(r"\[\s*(\d{1,3})%\]").unwrap();
        let status = format!("{prefix}[{n}%] rest");

        let fraction = pattern.extract(&status);

        prop_assert!(fraction.is_some());
        prop_assert!((fraction.unwrap() - n as f32 / 100.0).abs() < 1e-6);
    }

    #[test]
    fn text_without_digits_never_matches(text in "[a-zA-Z %\\[\\]]{0,40}") {
        let pattern = PercentPattern::new(r"\[(\d+)%\]").unwrap();
        prop_assert_eq!(pattern.extract(&text), None);
    }
}

mod common;

use common::{Frame, Harness, ScriptedSource, editor, run};
use core_events::{InputError, KeyCode, KeyEvent, KeyModifiers};
use core_model::LineRead;
use pretty_assertions::assert_eq;

#[test]
fn one_event_per_call_and_submit_on_enter() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("hi").code(KeyCode::Enter);
    assert_eq!(ed.read_line(&mut src, &mut h.hooks()).unwrap(), LineRead::Pending);
    assert_eq!(src.remaining(), 2);
    assert_eq!(ed.text(), "h");
    let out = run(&mut ed, &mut src, &mut h);
    assert_eq!(out, vec![LineRead::Submitted("hi".into())]);
    assert_eq!(ed.text(), "");
    assert!(ed.history().is_empty());
}

#[test]
fn every_insert_is_rendered() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("ab");
    run(&mut ed, &mut src, &mut h);
    assert_eq!(
        h.renderer.frames,
        vec![
            Frame { line: "a".into(), cursor: 1, scroll: 0 },
            Frame { line: "ab".into(), cursor: 2, scroll: 0 },
        ]
    );
}

#[test]
fn ctrl_w_on_multibyte_word() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("hello wörld").key(KeyEvent::ctrl('w'));
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "hello ");
    assert_eq!(ed.cursor(), 6);
}

#[test]
fn full_buffer_rejects_silently_without_redraw() {
    let mut ed = editor(4, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("abcd");
    run(&mut ed, &mut src, &mut h);
    let frames = h.renderer.frames.len();
    let mut src = ScriptedSource::new().text("é");
    let out = run(&mut ed, &mut src, &mut h);
    assert!(out.is_empty());
    assert_eq!(ed.text(), "abcd");
    assert_eq!(h.renderer.frames.len(), frames);
}

#[test]
fn typing_past_right_margin_scrolls_smoothly() {
    let mut ed = editor(100, 10);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("abcdefghijkl");
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.cursor(), 12);
    assert_eq!(ed.scroll_offset(), 4);
    let scrolls: Vec<usize> = h.renderer.frames.iter().map(|f| f.scroll).collect();
    assert_eq!(scrolls, vec![0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4]);
}

#[test]
fn history_recall_preserves_draft() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    ed.history_append("first");
    ed.history_append("second");
    let mut src = ScriptedSource::new().text("dra").code(KeyCode::Up);
    run(&mut ed, &mut src, &mut h);
    assert_eq!((ed.text(), ed.cursor()), ("second", 6));

    let mut src = ScriptedSource::new().code(KeyCode::Up).code(KeyCode::Up);
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "first");

    let mut src = ScriptedSource::new().key(KeyEvent::ctrl('n'));
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "second");

    let mut src = ScriptedSource::new().code(KeyCode::Down);
    run(&mut ed, &mut src, &mut h);
    assert_eq!((ed.text(), ed.cursor()), ("dra", 3));
}

#[test]
fn history_next_from_live_line_stashes_it() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("keep me").code(KeyCode::Down);
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "");
    let mut src = ScriptedSource::new().code(KeyCode::Up);
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "keep me");
}

#[test]
fn completion_routes_on_sigil() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("/q").code(KeyCode::Tab);
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "/quit");
    assert_eq!(ed.cursor(), 5);
    assert_eq!(h.commands.calls, vec!["/q".to_string()]);
    assert!(h.contextual.calls.is_empty());

    let mut src = ScriptedSource::new().code(KeyCode::Tab);
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "/query");

    let mut src = ScriptedSource::new()
        .key(KeyEvent::ctrl('u'))
        .text("bo")
        .code(KeyCode::Tab);
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "bob");
    assert_eq!(h.contextual.calls, vec!["bo".to_string()]);
    assert_eq!(h.commands.resets, 1);
}

#[test]
fn completion_on_empty_line_is_noop() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().code(KeyCode::Tab);
    run(&mut ed, &mut src, &mut h);
    assert!(h.commands.calls.is_empty());
    assert!(h.contextual.calls.is_empty());
    assert!(h.renderer.frames.is_empty());
}

#[test]
fn bare_escape_aborts_line_after_delay() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("abc").code(KeyCode::Esc).timeout();
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "");
    assert_eq!(ed.cursor(), 0);
    let escape = Some(ed.config().escape_delay);
    assert_eq!(src.timeouts_requested[4], escape);
    assert_eq!(h.activity.idle, 0);
}

#[test]
fn escape_digit_switches_window_without_edit() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new()
        .text("x")
        .code(KeyCode::Esc)
        .text("2")
        .key(KeyEvent::alt(KeyCode::Left))
        .code(KeyCode::Esc)
        .code(KeyCode::Right);
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "x");
    assert_eq!(h.windows.calls, vec!["switch:2", "previous", "next"]);
    assert_eq!(h.renderer.frames.len(), 1);
}

#[test]
fn idle_and_activity_notifications() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().timeout().text("a").timeout();
    run(&mut ed, &mut src, &mut h);
    assert_eq!((h.activity.idle, h.activity.activity), (2, 1));

    let mut src = ScriptedSource::new().code(KeyCode::Enter).text("/me");
    run(&mut ed, &mut src, &mut h);
    assert_eq!(h.activity.activity, 1);
}

#[test]
fn paste_drops_controls_and_stops_at_capacity() {
    let mut ed = editor(6, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().paste("ab\ncd\tefgh");
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "abcdef");
    assert_eq!(h.renderer.frames.len(), 1);
    assert_eq!(h.activity.activity, 1);
}

#[test]
fn unbound_key_is_reported() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().key(KeyEvent::ctrl('c'));
    let out = run(&mut ed, &mut src, &mut h);
    assert_eq!(
        out,
        vec![LineRead::Unhandled(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CTRL
        ))]
    );
}

#[test]
fn resize_recenters_and_reports() {
    let mut ed = editor(100, 40);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("abcdefghijklmnopqrst").resize(10, 5);
    let out = run(&mut ed, &mut src, &mut h);
    assert_eq!(out, vec![LineRead::Resized { cols: 10, rows: 5 }]);
    assert_eq!(ed.viewport().visible_width(), 10);
    assert_eq!(ed.scroll_offset(), 15);
    assert!(ed.viewport().contains(ed.cursor()));
}

#[test]
fn disconnected_source_surfaces_error() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new();
    let err = ed.read_line(&mut src, &mut h.hooks()).unwrap_err();
    assert!(matches!(err, InputError::Disconnected));
}

#[test]
fn masked_line_never_echoes_or_records() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new()
        .text("pasz")
        .code(KeyCode::Backspace)
        .text("s")
        .key(KeyEvent::ctrl('w'))
        .timeout()
        .text("!")
        .code(KeyCode::Enter);
    let secret = ed.get_masked_line(&mut src, &mut h.renderer, 4).unwrap();
    assert_eq!(secret, "pass");
    assert!(h.renderer.frames.iter().all(|f| f.line.is_empty()));
    assert!(ed.history().is_empty());
    assert_eq!(h.activity.idle, 0);
}

#[test]
fn edited_recall_survives_history_next() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    ed.history_append("a");
    ed.history_append("b");
    let mut src = ScriptedSource::new()
        .text("dr")
        .code(KeyCode::Up)
        .text("X")
        .code(KeyCode::Down);
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "dr");
    let entries: Vec<&str> = ed.history().entries().collect();
    assert_eq!(entries, vec!["a", "b", "bX"]);
}

#[test]
fn paste_after_escape_is_not_aborted() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new()
        .text("ab")
        .code(KeyCode::Esc)
        .paste("zz")
        .timeout();
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "abzz");
    assert_eq!(src.timeouts_requested[4], ed.config().idle_timeout);
    assert_eq!(h.activity.idle, 1);
}

#[test]
fn resize_after_escape_drops_prefix() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new()
        .text("ab")
        .code(KeyCode::Esc)
        .resize(40, 10)
        .timeout();
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "ab");
}

#[test]
fn unbound_keys_end_completion_cycle() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new().text("/q").code(KeyCode::Tab).code(KeyCode::F(5));
    let out = run(&mut ed, &mut src, &mut h);
    assert_eq!(out, vec![LineRead::Unhandled(KeyEvent::plain(KeyCode::F(5)))]);
    assert_eq!(h.commands.resets, 1);

    let mut src = ScriptedSource::new()
        .code(KeyCode::Tab)
        .code(KeyCode::Esc)
        .text("z");
    run(&mut ed, &mut src, &mut h);
    assert_eq!(h.commands.resets, 2);
}

#[test]
fn typing_in_front_of_command_is_not_activity() {
    let mut ed = editor(100, 80);
    let mut h = Harness::new();
    let mut src = ScriptedSource::new()
        .text("/cmd")
        .code(KeyCode::Home)
        .text("x");
    run(&mut ed, &mut src, &mut h);
    assert_eq!(ed.text(), "x/cmd");
    assert_eq!(h.activity.activity, 0);
}

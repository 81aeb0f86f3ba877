use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn buffer_sink_appends_newlines() {
    let sink = BufferSink::new();
    sink.println("hello");
    sink.println("world");
    assert_eq!(sink.get_output(), "hello\nworld\n");
}

#[test]
fn buffer_sink_clear() {
    let sink = BufferSink::new();
    sink.println("gone");
    sink.clear();
    assert_eq!(sink.get_output(), "");
}

#[test]
fn output_sink_buffer_shares_storage() {
    let (sink, handle) = OutputSink::buffer();
    let copy = sink.clone();
    sink.println("a");
    copy.println("b");
    assert_eq!(handle.get_output(), "a\nb\n");
    assert_eq!(sink.get_output(), "a\nb\n");
}

#[test]
fn output_sink_callback_receives_lines() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let captured = Rc::clone(&seen);
    let sink = OutputSink::callback(move |line| captured.borrow_mut().push(line.to_owned()));
    sink.println("x");
    assert_eq!(*seen.borrow(), vec!["x".to_owned()]);
    assert_eq!(sink.get_output(), "");
}

#[test]
fn silent_sink_discards() {
    let sink = OutputSink::Silent;
    sink.println("nothing");
    assert_eq!(sink.get_output(), "");
}

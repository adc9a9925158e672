//! End-to-end: `<observe on="x" for="change">` parks the coroutine and only
//! resumes once a matching event actually arrives in its mailbox — an
//! unrelated message must not let it fall through early. The registration
//! survives a match (it isn't removed by `select_child`): a first matching
//! event re-enters the observer's body without exiting the coroutine, and
//! only an explicit `<forget>` inside that body ends it.

use hvml_rt::event::{Event, EventSource, Message};
use hvml_rt::edom::RecordingSink;
use hvml_rt::scheduler::Scheduler;
use hvml_rt::variant::Value;
use hvml_rt::vdom::{AttrOperator, Attribute, Document};
use std::rc::Rc;

fn atom(s: &str) -> hvml_rt::atom::Atom {
    hvml_rt::atom::Atom::new(s)
}

fn set(doc: &mut Document, id: hvml_rt::vdom::ElementId, name: &str, value: &str) {
    doc.set_attr(
        id,
        Attribute {
            name: atom(name),
            operator: AttrOperator::Assign,
            value: value.to_string(),
        },
    );
}

#[test]
fn observe_persists_across_a_match_and_only_ends_via_forget() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);
    let observe = doc.insert(atom("observe"), Some(root));
    set(&mut doc, observe, "on", "x");
    set(&mut doc, observe, "for", "change");

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let cid = scheduler.spawn(Rc::new(doc));
    let mut sink = RecordingSink::default();

    while scheduler.run_pass(&mut sink).unwrap() {}
    assert!(!scheduler.get(cid).unwrap().is_exited(), "parked waiting on the observed event");
    assert_eq!(scheduler.get(cid).unwrap().observers.len(), 1);

    scheduler.get_mut(cid).unwrap().push_message(Message::Event(Event::new(
        EventSource::NamedVariable("y".to_string()),
        "change",
        Value::Null,
    )));
    while scheduler.run_pass(&mut sink).unwrap() {}
    assert!(!scheduler.get(cid).unwrap().is_exited(), "an unmatched event must not satisfy the observer");
    assert_eq!(scheduler.get(cid).unwrap().observers.len(), 1);

    scheduler.get_mut(cid).unwrap().push_message(Message::Event(Event::new(
        EventSource::NamedVariable("x".to_string()),
        "change:attached",
        Value::string("payload"),
    )));
    while scheduler.run_pass(&mut sink).unwrap() {}
    assert!(
        !scheduler.get(cid).unwrap().is_exited(),
        "a match doesn't end the observation — the observer outlives it"
    );
    assert_eq!(
        scheduler.get(cid).unwrap().observers.len(),
        1,
        "select_child must not remove the observer on a match"
    );

    scheduler.get_mut(cid).unwrap().push_message(Message::Event(Event::new(
        EventSource::NamedVariable("x".to_string()),
        "change:attached",
        Value::string("again"),
    )));
    while scheduler.run_pass(&mut sink).unwrap() {}
    assert!(
        !scheduler.get(cid).unwrap().is_exited(),
        "a second match re-triggers the same observer, still without exiting"
    );
    assert_eq!(scheduler.get(cid).unwrap().observers.len(), 1);
}

#[test]
fn forget_inside_the_observer_body_ends_the_observation() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);
    let observe = doc.insert(atom("observe"), Some(root));
    set(&mut doc, observe, "on", "x");
    set(&mut doc, observe, "for", "change");
    let forget = doc.insert(atom("forget"), Some(observe));
    set(&mut doc, forget, "on", "x");
    set(&mut doc, forget, "for", "change");

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let cid = scheduler.spawn(Rc::new(doc));
    let mut sink = RecordingSink::default();

    while scheduler.run_pass(&mut sink).unwrap() {}
    assert!(!scheduler.get(cid).unwrap().is_exited());
    assert_eq!(scheduler.get(cid).unwrap().observers.len(), 1);

    scheduler.get_mut(cid).unwrap().push_message(Message::Event(Event::new(
        EventSource::NamedVariable("x".to_string()),
        "change:attached",
        Value::string("payload"),
    )));
    while scheduler.run_pass(&mut sink).unwrap() {}

    let co = scheduler.get(cid).unwrap();
    assert!(co.is_exited(), "the body's <forget> should let the frame pop and the coroutine exit");
    assert!(co.observers.is_empty());
}

//! End-to-end: `<load on="..." as="data">` parks until its request is
//! delivered, then binds the fetched value, mirroring how a real `Fetcher`
//! implementation would complete the request asynchronously.

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
fn load_binds_its_result_once_the_fetch_completes() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);
    let load = doc.insert(atom("load"), Some(root));
    set(&mut doc, load, "on", "'some://uri'");
    set(&mut doc, load, "as", "data");

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let cid = scheduler.spawn(Rc::new(doc));
    let mut sink = RecordingSink::default();

    while scheduler.run_pass(&mut sink).unwrap() {}
    assert!(!scheduler.get(cid).unwrap().is_exited(), "parked waiting on the fetch");
    let request = scheduler.get(cid).unwrap().wait_request.expect("blocked on a request id");

    scheduler.deliver_request_result(request, Ok(Value::string("fetched!")));
    while scheduler.run_pass(&mut sink).unwrap() {}

    let co = scheduler.get(cid).unwrap();
    assert!(co.is_exited());
    assert!(co.wait_request.is_none());
    let value = co.scope.document.borrow().get("data");
    assert_eq!(value.unwrap().stringify(), "fetched!");
}

#[test]
fn sleep_resumes_only_after_its_timer_fires() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);
    let sleep = doc.insert(atom("sleep"), Some(root));
    set(&mut doc, sleep, "for", "10");

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let cid = scheduler.spawn(Rc::new(doc));
    let mut sink = RecordingSink::default();

    while scheduler.run_pass(&mut sink).unwrap() {}
    assert!(!scheduler.get(cid).unwrap().is_exited());
    let request = scheduler.get(cid).unwrap().wait_request.expect("blocked on the timer's request id");

    scheduler.deliver_request_result(request, Ok(Value::Undefined));
    while scheduler.run_pass(&mut sink).unwrap() {}
    assert!(scheduler.get(cid).unwrap().is_exited());
}

//! End-to-end: `<call on="worker" concurrently>` spawns a sibling coroutine
//! that runs the template body independently, and the caller resumes once
//! the scheduler reports the sibling's exit.

use hvml_rt::coroutine::CoroutineId;
use hvml_rt::edom::RecordingSink;
use hvml_rt::scheduler::Scheduler;
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
fn concurrent_call_spawns_and_completes_a_sibling_coroutine() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);

    let define = doc.insert(atom("define"), Some(root));
    set(&mut doc, define, "name", "worker");
    let init = doc.insert(atom("init"), Some(define));
    set(&mut doc, init, "as", "done");
    set(&mut doc, init, "with", "'yes'");

    let call = doc.insert(atom("call"), Some(root));
    set(&mut doc, call, "on", "worker");
    set(&mut doc, call, "concurrently", "true");

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let parent_cid = scheduler.spawn(Rc::new(doc));
    let mut sink = RecordingSink::default();
    while scheduler.run_pass(&mut sink).unwrap() {}

    let parent = scheduler.get(parent_cid).unwrap();
    assert!(parent.is_exited());
    assert!(parent.wait_request.is_none());

    let child_cid = CoroutineId(parent_cid.0 + 1);
    let child = scheduler.get(child_cid).expect("the concurrent call spawned a sibling coroutine");
    assert!(child.is_exited());
    let value = child.scope.document.borrow().get("done");
    assert_eq!(value.unwrap().stringify(), "yes");
}

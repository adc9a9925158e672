//! End-to-end: `<call>` re-enters a `<define>`d template's children
//! synchronously and in place.

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
fn call_runs_the_defined_templates_body() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);

    let define = doc.insert(atom("define"), Some(root));
    set(&mut doc, define, "name", "greet");
    let init = doc.insert(atom("init"), Some(define));
    set(&mut doc, init, "as", "y");
    set(&mut doc, init, "with", "'ok'");

    let call = doc.insert(atom("call"), Some(root));
    set(&mut doc, call, "on", "greet");

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let cid = scheduler.spawn(Rc::new(doc));
    let mut sink = RecordingSink::default();
    while scheduler.run_pass(&mut sink).unwrap() {}

    let co = scheduler.get(cid).unwrap();
    assert!(co.is_exited());
    assert!(co.templates.contains_key("greet"));
    let value = co.scope.document.borrow().get("y");
    assert_eq!(value.unwrap().stringify(), "ok");
}

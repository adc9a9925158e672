//! End-to-end: `<hvml><init as="x" with="'hello'"/></hvml>` defines a
//! document-level named variable that survives to the end of the run.

use hvml_rt::edom::RecordingSink;
use hvml_rt::scheduler::Scheduler;
use hvml_rt::vdom::{AttrOperator, Attribute, Document};
use std::rc::Rc;

fn atom(s: &str) -> hvml_rt::atom::Atom {
    hvml_rt::atom::Atom::new(s)
}

#[test]
fn init_defines_a_document_scoped_variable() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);
    let init = doc.insert(atom("init"), Some(root));
    doc.set_attr(
        init,
        Attribute {
            name: atom("as"),
            operator: AttrOperator::Assign,
            value: "x".to_string(),
        },
    );
    doc.set_attr(
        init,
        Attribute {
            name: atom("with"),
            operator: AttrOperator::Assign,
            value: "'hello'".to_string(),
        },
    );

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let cid = scheduler.spawn(Rc::new(doc));
    let mut sink = RecordingSink::default();
    while scheduler.run_pass(&mut sink).unwrap() {}

    let co = scheduler.get(cid).unwrap();
    assert!(co.is_exited());
    let value = co.scope.document.borrow().get("x");
    assert_eq!(value.unwrap().stringify(), "hello");
}

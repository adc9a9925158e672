//! End-to-end: `<update on="arr" to="append" with="'c'">` mutates a
//! document-scoped array variable in place, and `to="merge"` resolves
//! conflicting object keys in favor of the incoming value.

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
fn append_grows_an_existing_array_variable() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);
    let update = doc.insert(atom("update"), Some(root));
    set(&mut doc, update, "on", "arr");
    set(&mut doc, update, "to", "append");
    set(&mut doc, update, "with", "'c'");

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let cid = scheduler.spawn(Rc::new(doc));
    scheduler
        .get_mut(cid)
        .unwrap()
        .scope
        .document
        .borrow_mut()
        .define("arr", Value::array(vec![Value::string("a"), Value::string("b")]));

    let mut sink = RecordingSink::default();
    while scheduler.run_pass(&mut sink).unwrap() {}

    let co = scheduler.get(cid).unwrap();
    assert!(co.is_exited());
    let arr = co.scope.document.borrow().get("arr").unwrap();
    let Value::Array(arr) = arr else { panic!("expected an array") };
    let items: Vec<String> = arr.borrow().items.iter().map(|v| v.stringify()).collect();
    assert_eq!(items, vec!["a", "b", "c"]);
}

#[test]
fn merge_lets_the_incoming_value_win_on_conflicting_keys() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);
    let update = doc.insert(atom("update"), Some(root));
    set(&mut doc, update, "on", "obj");
    set(&mut doc, update, "to", "merge");
    // `with=` only resolves through the minimal literal/$var evaluator, so
    // the incoming object is pre-loaded onto a named variable and
    // referenced here rather than written as an inline object literal.
    set(&mut doc, update, "with", "$incoming");

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let cid = scheduler.spawn(Rc::new(doc));
    {
        let co = scheduler.get_mut(cid).unwrap();
        co.scope.document.borrow_mut().define(
            "obj",
            Value::object(vec![
                ("a".to_string(), Value::string("old")),
                ("b".to_string(), Value::string("kept")),
            ]),
        );
        co.scope
            .document
            .borrow_mut()
            .define("incoming", Value::object(vec![("a".to_string(), Value::string("new"))]));
    }

    let mut sink = RecordingSink::default();
    while scheduler.run_pass(&mut sink).unwrap() {}

    let co = scheduler.get(cid).unwrap();
    assert!(co.is_exited());
    let obj = co.scope.document.borrow().get("obj").unwrap();
    let Value::Object(obj) = obj else { panic!("expected an object") };
    assert_eq!(obj.borrow().entries.get("a").unwrap().stringify(), "new");
    assert_eq!(obj.borrow().entries.get("b").unwrap().stringify(), "kept");
}

#[test]
fn insert_before_an_index_splices_in_the_new_member() {
    let mut doc = Document::new();
    let root = doc.insert(atom("hvml"), None);
    let update = doc.insert(atom("update"), Some(root));
    set(&mut doc, update, "on", "arr");
    set(&mut doc, update, "to", "insertBefore");
    set(&mut doc, update, "at", "1");
    set(&mut doc, update, "with", "9");

    let mut scheduler: Scheduler<Document> = Scheduler::new(Default::default());
    let cid = scheduler.spawn(Rc::new(doc));
    scheduler
        .get_mut(cid)
        .unwrap()
        .scope
        .document
        .borrow_mut()
        .define(
            "arr",
            Value::array(vec![Value::number(1.0), Value::number(2.0), Value::number(3.0)]),
        );

    let mut sink = RecordingSink::default();
    while scheduler.run_pass(&mut sink).unwrap() {}

    let co = scheduler.get(cid).unwrap();
    assert!(co.is_exited());
    let arr = co.scope.document.borrow().get("arr").unwrap();
    let Value::Array(arr) = arr else { panic!("expected an array") };
    let items: Vec<String> = arr.borrow().items.iter().map(|v| v.stringify()).collect();
    assert_eq!(items, vec!["1", "9", "2", "3"]);
}

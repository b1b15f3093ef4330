//! End-to-end evaluation through the full actor pipeline: read a form,
//! send `eval` into the ground environment, dispatch to quiescence, and
//! inspect the value the customer received.

use abe_core::{Config, Value};
use abe_kernel::ctx::{a_false, a_inert, a_true};
use abe_kernel::data::{get_number, number_value};
use abe_kernel::io::{set_current_sink, SharedSink, StrSource};
use abe_kernel::pred::{eq, eq_now};
use abe_kernel::read::read_sexpr;
use abe_kernel::selftest::{eval_str, run_battery};
use abe_kernel::init_kernel;

const BUDGET: usize = 1_000_000;

fn setup() -> (Config, SharedSink) {
    let mut cfg = Config::new(1000);
    init_kernel(&mut cfg);
    let sink = SharedSink::new();
    set_current_sink(Box::new(sink.clone()));
    (cfg, sink)
}

fn eval(cfg: &mut Config, text: &str) -> Value {
    eval_str(cfg, text, BUDGET).unwrap_or_else(|e| panic!("eval {:?}: {}", text, e))
}

#[test]
fn test_inert_self_evaluates() {
    let (mut cfg, _sink) = setup();
    let got = eval(&mut cfg, "#inert");
    assert_eq!(got, a_inert());
}

#[test]
fn test_boolean_predicate() {
    let (mut cfg, _sink) = setup();
    assert_eq!(eval(&mut cfg, "(boolean? #t #f)"), a_true());
    assert_eq!(eval(&mut cfg, "(boolean? #t 0)"), a_false());
}

#[test]
fn test_number_predicate() {
    let (mut cfg, _sink) = setup();
    assert_eq!(eval(&mut cfg, "(number? 0 1 -1)"), a_true());
    assert_eq!(eval(&mut cfg, "(number? 0 #t)"), a_false());
}

#[test]
fn test_define_and_lambda() {
    let (mut cfg, _sink) = setup();
    let got = eval(
        &mut cfg,
        "($sequence ($define! y #t) (($lambda (x) x) y))",
    );
    assert_eq!(got, a_true());
}

#[test]
fn test_if_nesting() {
    let (mut cfg, _sink) = setup();
    let got = eval(&mut cfg, "($if #t ($if #f 0 42) 314)");
    let want = get_number(&mut cfg, Value::Int(42));
    assert!(eq(&cfg.heap, want, got));
}

#[test]
fn test_eq_vs_equal_on_lists() {
    let (mut cfg, _sink) = setup();
    assert_eq!(
        eval(&mut cfg, "(equal? (cons 0 (cons 1 ())) (list 0 1))"),
        a_true()
    );
    assert_eq!(
        eval(&mut cfg, "(eq? (cons 0 (cons 1 ())) (list 0 1))"),
        a_false()
    );
}

#[test]
fn test_arithmetic_folds() {
    let (mut cfg, _sink) = setup();
    let got = eval(&mut cfg, "(+ 2 3 4)");
    assert_eq!(number_value(&cfg.heap, got), Value::Int(9));
    let got = eval(&mut cfg, "(* 2 3 4)");
    assert_eq!(number_value(&cfg.heap, got), Value::Int(24));
    // identity elements
    let got = eval(&mut cfg, "(+)");
    assert_eq!(number_value(&cfg.heap, got), Value::Int(0));
    let got = eval(&mut cfg, "(*)");
    assert_eq!(number_value(&cfg.heap, got), Value::Int(1));
}

#[test]
fn test_relations_slide_pairwise() {
    let (mut cfg, _sink) = setup();
    assert_eq!(eval(&mut cfg, "(<? 1 2 3)"), a_true());
    assert_eq!(eval(&mut cfg, "(<? 1 3 2)"), a_false());
    assert_eq!(eval(&mut cfg, "(=? 5 5 5)"), a_true());
    assert_eq!(eval(&mut cfg, "(>=? 3 3 1)"), a_true());
}

#[test]
fn test_encapsulation_round_trip() {
    let (mut cfg, _sink) = setup();
    let got = eval(
        &mut cfg,
        "($sequence \
           ($define! (seal sealed? unseal) (make-encapsulation-type)) \
           ($define! x (seal 42)) \
           ($if (sealed? x) (unseal x) #f))",
    );
    assert_eq!(number_value(&cfg.heap, got), Value::Int(42));
}

#[test]
fn test_brand_worlds_are_disjoint() {
    let (mut cfg, _sink) = setup();
    let got = eval(
        &mut cfg,
        "($sequence \
           ($define! (seal-a a? unseal-a) (make-encapsulation-type)) \
           ($define! (seal-b b? unseal-b) (make-encapsulation-type)) \
           (b? (seal-a 7)))",
    );
    assert_eq!(got, a_false());
}

#[test]
fn test_vau_receives_operands_unevaluated() {
    let (mut cfg, _sink) = setup();
    let got = eval(&mut cfg, "(($vau (x) #ignore x) y)");
    let want = eval(&mut cfg, "($sequence ($define! q ($vau (x) #ignore x)) (q y))");
    // both are the interned symbol `y`
    assert_eq!(got, want);
}

#[test]
fn test_map_identity() {
    let (mut cfg, _sink) = setup();
    assert_eq!(
        eval(
            &mut cfg,
            "(equal? (map ($lambda (x) x) (list 1 2 3)) (list 1 2 3))"
        ),
        a_true()
    );
}

#[test]
fn test_map_over_two_lists() {
    let (mut cfg, _sink) = setup();
    assert_eq!(
        eval(&mut cfg, "(equal? (map + (list 1 2) (list 10 20)) (list 11 22))"),
        a_true()
    );
}

#[test]
fn test_write_then_read_round_trips() {
    let (mut cfg, sink) = setup();
    eval(&mut cfg, "(write (list 0 -2 #t #inert))");
    let text = sink.take();
    assert_eq!(text, "(0 -2 #t #inert)");
    let mut src = StrSource::new(&text);
    let reread = read_sexpr(&mut cfg, &mut src);
    let want = eval(&mut cfg, "(list 0 -2 #t #inert)");
    assert!(eq_now(&cfg.heap, want, reread));
}

#[test]
fn test_write_dotted_pair() {
    let (mut cfg, sink) = setup();
    eval(&mut cfg, "(write (cons 0 1))");
    assert_eq!(sink.take(), "(0 . 1)");
}

#[test]
fn test_copy_es_immutable_idempotent_and_frozen() {
    let (mut cfg, sink) = setup();
    assert_eq!(
        eval(
            &mut cfg,
            "(equal? (copy-es-immutable (copy-es-immutable (cons 1 ()))) \
                     (copy-es-immutable (cons 1 ())))"
        ),
        a_true()
    );
    // mutating the immutable copy throws Immutable and never replies
    let err = eval_str(
        &mut cfg,
        "($sequence ($define! p (copy-es-immutable (cons 0 1))) (set-car! p 5))",
        BUDGET,
    );
    assert!(err.is_err());
    assert!(sink.take().contains("FAIL! (Immutable"));
}

#[test]
fn test_set_car_on_mutable_cons() {
    let (mut cfg, _sink) = setup();
    let got = eval(
        &mut cfg,
        "($sequence ($define! p (cons 0 1)) (set-car! p 5) (car p))",
    );
    assert_eq!(number_value(&cfg.heap, got), Value::Int(5));
}

#[test]
fn test_undefined_symbol_reports() {
    let (mut cfg, sink) = setup();
    let err = eval_str(&mut cfg, "no-such-binding", BUDGET);
    assert!(err.is_err());
    assert!(sink.take().contains("FAIL! (Undefined"));
}

#[test]
fn test_apply_and_recursion() {
    let (mut cfg, _sink) = setup();
    let got = eval(
        &mut cfg,
        "($sequence \
           ($define! f \
             ($lambda x \
               ($if (null? x) \
                 #inert \
                 (list (number? (car x)) (apply f (cdr x)))))) \
           (car (f 1 2 3)))",
    );
    assert_eq!(got, a_true());
}

#[test]
fn test_make_environment_and_eval() {
    let (mut cfg, _sink) = setup();
    assert_eq!(eval(&mut cfg, "(environment? (make-environment))"), a_true());
    // `eval` is applicative: `z` evaluates here, the result self-evaluates
    // in the fresh environment
    let got = eval(
        &mut cfg,
        "($sequence ($define! z 7) (eval z (make-environment)))",
    );
    assert_eq!(number_value(&cfg.heap, got), Value::Int(7));
}

#[test]
fn test_wrap_unwrap() {
    let (mut cfg, _sink) = setup();
    assert_eq!(
        eval(&mut cfg, "(applicative? (wrap ($vau (x) #ignore x)))"),
        a_true()
    );
    assert_eq!(
        eval(&mut cfg, "(operative? (unwrap (wrap ($vau (x) #ignore x))))"),
        a_true()
    );
}

#[test]
fn test_battery_passes() {
    let (mut cfg, _sink) = setup();
    run_battery(&mut cfg, BUDGET).expect("battery");
}

#[test]
fn test_heap_stays_sane_after_workload() {
    use abe_core::GcList;
    let (mut cfg, _sink) = setup();
    for _ in 0..5 {
        eval(&mut cfg, "(equal? (map ($lambda (x) (+ x 1)) (list 1 2 3)) (list 2 3 4))");
        cfg.force_gc();
    }
    assert_eq!(cfg.heap.count(GcList::Aged), 0);
    assert_eq!(cfg.heap.count(GcList::Scan), 0);
    cfg.heap.sanity_check(GcList::Fresh);
    cfg.heap.sanity_check(GcList::Free);
    cfg.heap.sanity_check(GcList::Perm);
}

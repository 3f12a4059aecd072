use std::cell::RefCell;
use std::rc::Rc;

use mu_scheme::procedure::{PrimitiveProcedure, Procedure};
use mu_scheme::symbol::intern_symbol;
use mu_scheme::{EnvOps, Evaluator, SchemeValue};

fn eval(evaluator: &Evaluator, code: &str) -> String {
    match evaluator.eval_string(code) {
        Ok(value) => value.to_string(),
        Err(err) => panic!("{} failed: {}", code, err),
    }
}

fn eval_err(evaluator: &Evaluator, code: &str) -> String {
    match evaluator.eval_string(code) {
        Ok(value) => panic!("{} should fail, got {}", code, value),
        Err(err) => err.message().to_string(),
    }
}

/// Install `(record x)`, which logs `x` and returns it.
fn install_recorder(evaluator: &Evaluator) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let record = PrimitiveProcedure::new(
        "record",
        move |args: &[SchemeValue]| {
            sink.borrow_mut().push(args[0].to_string());
            Ok(args[0].clone())
        },
        false,
    );
    evaluator.global_env().define(
        intern_symbol("record"),
        SchemeValue::procedure(Procedure::Primitive(record)),
    );
    log
}

#[test]
fn atoms_evaluate_to_themselves() {
    let evaluator = Evaluator::new();
    assert_eq!(eval(&evaluator, "7"), "7");
    assert_eq!(eval(&evaluator, "-2.5"), "-2.5");
    assert_eq!(eval(&evaluator, "#t"), "#t");
    assert_eq!(eval(&evaluator, "\"str\""), "\"str\"");
    assert_eq!(eval(&evaluator, "nil"), "()");
    assert_eq!(eval(&evaluator, "car"), "#[car]");
}

#[test]
fn define_and_lookup() {
    let evaluator = Evaluator::new();
    assert_eq!(eval(&evaluator, "(define size 2)"), "size");
    assert_eq!(eval(&evaluator, "(* 5 size)"), "10");
    assert_eq!(eval(&evaluator, "(define (square x) (* x x))"), "square");
    assert_eq!(eval(&evaluator, "(square 21)"), "441");
    assert_eq!(eval(&evaluator, "square"), "(lambda (x) (* x x))");
    assert_eq!(eval_err(&evaluator, "undefined-name"), "unknown identifier: undefined-name");
}

#[test]
fn quote_returns_data() {
    let evaluator = Evaluator::new();
    assert_eq!(eval(&evaluator, "'(a (b . c) 1)"), "(a (b . c) 1)");
    assert_eq!(eval(&evaluator, "(quote undefined-name)"), "undefined-name");
}

#[test]
fn if_evaluates_only_the_chosen_branch() {
    let evaluator = Evaluator::new();
    let log = install_recorder(&evaluator);
    assert_eq!(eval(&evaluator, "(if (record #t) (record 1) (record 2))"), "1");
    assert_eq!(eval(&evaluator, "(if (record #f) (record 1) (record 2))"), "2");
    assert_eq!(*log.borrow(), vec!["#t", "1", "#f", "2"]);
    // Everything but #f is true
    assert_eq!(eval(&evaluator, "(if 0 'yes 'no)"), "yes");
    assert_eq!(eval(&evaluator, "(if '() 'yes 'no)"), "yes");
}

#[test]
fn and_or_short_circuit() {
    let evaluator = Evaluator::new();
    let log = install_recorder(&evaluator);
    assert_eq!(eval(&evaluator, "(and (record 1) (record #f) (record 3))"), "#f");
    assert_eq!(eval(&evaluator, "(or (record #f) (record 2) (record 3))"), "2");
    assert_eq!(*log.borrow(), vec!["1", "#f", "#f", "2"]);
    assert_eq!(eval(&evaluator, "(and 1 2 3)"), "3");
    assert_eq!(eval(&evaluator, "(and)"), "#t");
    assert_eq!(eval(&evaluator, "(or)"), "#f");
    assert_eq!(eval(&evaluator, "(or #f #f)"), "#f");
}

#[test]
fn cond_clauses() {
    let evaluator = Evaluator::new();
    let code = "(define (sign x) (cond ((< x 0) 'negative) ((= x 0) 'zero) (else 'positive)))";
    eval(&evaluator, code);
    assert_eq!(eval(&evaluator, "(sign -3)"), "negative");
    assert_eq!(eval(&evaluator, "(sign 0)"), "zero");
    assert_eq!(eval(&evaluator, "(sign 8)"), "positive");
    // A clause with only a test yields the test's value
    assert_eq!(eval(&evaluator, "(cond (#f 1) ((+ 2 3)))"), "5");
    assert_eq!(eval(&evaluator, "(cond ((= 1 1) (define y 1) (+ y 1)))"), "2");
    assert!(matches!(evaluator.eval_string("(cond (#f 1))").unwrap(), SchemeValue::Undefined));
    assert_eq!(eval_err(&evaluator, "(cond (else 1) (#t 2))"), "else must be last");
}

#[test]
fn begin_evaluates_in_order() {
    let evaluator = Evaluator::new();
    let log = install_recorder(&evaluator);
    assert_eq!(eval(&evaluator, "(begin (record 1) (record 2) (record 3))"), "3");
    assert_eq!(*log.borrow(), vec!["1", "2", "3"]);
    assert!(eval_err(&evaluator, "(begin)").contains("too few operands"));
}

#[test]
fn let_initializers_see_the_outer_scope() {
    let evaluator = Evaluator::new();
    eval(&evaluator, "(define x 1)");
    assert_eq!(eval(&evaluator, "(let ((x 10) (y x)) (list x y))"), "(10 1)");
    assert_eq!(eval(&evaluator, "(let () 5)"), "5");
    assert_eq!(eval(&evaluator, "x"), "1");
    assert!(eval_err(&evaluator, "(let ((x 1) (x 2)) x)").contains("badly formed formals"));
    assert!(eval_err(&evaluator, "(let ((x)) x)").contains("bad binding"));
    assert!(eval_err(&evaluator, "(let ((1 2)) 1)").contains("badly formed formals"));
}

#[test]
fn lambda_is_lexically_scoped() {
    let evaluator = Evaluator::new();
    eval(&evaluator, "(define y 1)");
    eval(&evaluator, "(define f (lambda (x) (+ x y)))");
    eval(&evaluator, "(define (g y) (f 10))");
    assert_eq!(eval(&evaluator, "(g 100)"), "11");

    eval(&evaluator, "(define (make-adder n) (lambda (x) (+ x n)))");
    eval(&evaluator, "(define add5 (make-adder 5))");
    assert_eq!(eval(&evaluator, "(add5 2)"), "7");
}

#[test]
fn mu_is_dynamically_scoped() {
    let evaluator = Evaluator::new();
    eval(&evaluator, "(define y 1)");
    eval(&evaluator, "(define f (mu (x) (+ x y)))");
    eval(&evaluator, "(define (g y) (f 10))");
    assert_eq!(eval(&evaluator, "(g 100)"), "110");
    assert_eq!(eval(&evaluator, "(f 10)"), "11");
    assert_eq!(eval(&evaluator, "f"), "(mu (x) (+ x y))");
}

#[test]
fn mu_defines_land_in_call_frame() {
    let evaluator = Evaluator::new();
    eval(&evaluator, "(define set-z (mu () (define z 3) z))");
    eval(&evaluator, "(define (caller) (set-z) 'done)");
    assert_eq!(eval(&evaluator, "(caller)"), "done");
    assert!(eval_err(&evaluator, "z").contains("unknown identifier"));
}

#[test]
fn tail_calls_run_in_constant_space() {
    let evaluator = Evaluator::new();
    eval(&evaluator, "(define (count-down n) (if (= n 0) 'done (count-down (- n 1))))");
    assert_eq!(eval(&evaluator, "(count-down 100000)"), "done");

    eval(
        &evaluator,
        "(define (loop n acc) (cond ((= n 0) acc) (else (begin (loop (- n 1) (+ acc 1))))))",
    );
    assert_eq!(eval(&evaluator, "(loop 100000 0)"), "100000");

    eval(&evaluator, "(define (even-odd n) (and #t (or #f (if (= n 0) #t (even-odd (- n 1))))))");
    assert_eq!(eval(&evaluator, "(even-odd 100000)"), "#t");

    eval(&evaluator, "(define (let-loop n) (let ((m (- n 1))) (if (< m 0) 'ok (let-loop m))))");
    assert_eq!(eval(&evaluator, "(let-loop 100000)"), "ok");
}

#[test]
fn non_tail_recursion() {
    let evaluator = Evaluator::new();
    eval(&evaluator, "(define (fact n) (if (= n 0) 1 (* n (fact (- n 1)))))");
    assert_eq!(eval(&evaluator, "(fact 20)"), "2432902008176640000");
    assert_eq!(eval(&evaluator, "(fact 25)"), "15511210043330985984000000");
}

#[test]
fn operands_are_evaluated_left_to_right() {
    let evaluator = Evaluator::new();
    let log = install_recorder(&evaluator);
    eval(&evaluator, "(list (record 1) (record 2) (record 3))");
    assert_eq!(*log.borrow(), vec!["1", "2", "3"]);
}

#[test]
fn application_errors() {
    let evaluator = Evaluator::new();
    eval(&evaluator, "(define (two a b) a)");
    assert!(eval_err(&evaluator, "(two 1)").contains("arity mismatch"));
    assert!(eval_err(&evaluator, "(two 1 2 3)").contains("arity mismatch"));
    assert_eq!(eval_err(&evaluator, "(2 3)"), "Cannot call 2");
    assert_eq!(eval_err(&evaluator, "('two 1 2)"), "Cannot call two");
    assert!(eval_err(&evaluator, "(car 1 2)").starts_with("car: expects exactly 1 argument"));
}

#[test]
fn bad_formals_are_rejected() {
    let evaluator = Evaluator::new();
    assert!(eval_err(&evaluator, "(lambda (x x) x)").contains("badly formed formals"));
    assert!(eval_err(&evaluator, "(lambda (x 1) x)").contains("badly formed formals"));
    assert!(eval_err(&evaluator, "(mu (x . rest) x)").contains("badly formed formals"));
    assert!(eval_err(&evaluator, "(define (f x x) x)").contains("badly formed formals"));
    assert!(eval_err(&evaluator, "(define 3 4)").contains("bad argument to define"));
}

#[test]
fn malformed_forms() {
    let evaluator = Evaluator::new();
    assert!(eval_err(&evaluator, "(if #t 1)").contains("too few operands"));
    assert!(eval_err(&evaluator, "(if #t 1 2 3)").contains("too many operands"));
    assert!(eval_err(&evaluator, "(quote)").contains("too few operands"));
    assert!(eval_err(&evaluator, "(define x)").contains("too few operands"));
    assert!(eval_err(&evaluator, "(+ 1 . 2)").contains("malformed list"));
    assert_eq!(eval_err(&evaluator, "(if)"), "too few operands in form: (if)");
    assert_eq!(
        eval_err(&evaluator, "(let ((x 1)))"),
        "too few operands in form: (let ((x 1)))"
    );
}

#[test]
fn deep_non_tail_recursion_fails_without_ending_the_session() {
    let evaluator = Evaluator::new();
    eval(&evaluator, "(define (f n) (if (= n 0) 0 (+ 1 (f (- n 1)))))");
    assert_eq!(eval_err(&evaluator, "(f 100000)"), "maximum recursion depth exceeded");
    assert_eq!(eval(&evaluator, "(+ 1 1)"), "2");
    assert_eq!(eval(&evaluator, "(f 100)"), "100");
}

#[test]
fn eval_and_apply_reenter_the_evaluator() {
    let evaluator = Evaluator::new();
    assert_eq!(eval(&evaluator, "(eval (list '* 6 7))"), "42");
    assert_eq!(eval(&evaluator, "(apply (lambda (a b) (- a b)) '(10 3))"), "7");
    eval(&evaluator, "(define f (mu () y))");
    assert_eq!(eval(&evaluator, "(define (g y) (apply f '())) (g 'dynamic)"), "dynamic");
}

#[test]
fn global_frame_is_shared_across_evaluations() {
    let evaluator = Evaluator::new();
    eval(&evaluator, "(define counter 0)");
    eval(&evaluator, "(define counter (+ counter 1))");
    let value = evaluator.global_env().lookup(&intern_symbol("counter")).unwrap();
    assert_eq!(value.to_string(), "1");
}

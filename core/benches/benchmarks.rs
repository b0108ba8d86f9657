use codspeed_criterion_compat::{Criterion, black_box, criterion_group, criterion_main};
use lersp::{Config, Runtime, parse};
use std::time::Duration;

fn runtime() -> Runtime {
    Runtime::new(Config::default()).unwrap()
}

// ============================================================================
// Reader Benchmarks
// ============================================================================

fn bench_read_small(c: &mut Criterion) {
    let mut rt = runtime();
    c.bench_function("read small expr", |b| {
        b.iter(|| black_box(parse(&mut rt, "(cons 1 2)").unwrap()))
    });
}

fn bench_read_large_list(c: &mut Criterion) {
    let mut rt = runtime();
    let items: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
    let expr = format!("({})", items.join(" "));

    c.bench_function("read large list (1000 elements)", |b| {
        b.iter(|| black_box(parse(&mut rt, &expr).unwrap()))
    });
}

fn bench_read_deep_nesting(c: &mut Criterion) {
    let mut rt = runtime();
    let mut expr = String::from("1");
    for _ in 0..100 {
        expr = format!("(+ {expr} 1)");
    }

    c.bench_function("read deep nesting (100 levels)", |b| {
        b.iter(|| black_box(parse(&mut rt, &expr).unwrap()))
    });
}

// ============================================================================
// Evaluation Benchmarks
// ============================================================================

fn bench_eval_arithmetic(c: &mut Criterion) {
    let mut rt = runtime();
    c.bench_function("eval nested arithmetic", |b| {
        b.iter(|| black_box(rt.eval_str("(+ (* 2 3) (- 10 4) (/ 8 2))").unwrap()))
    });
}

fn bench_eval_lambda_invocation(c: &mut Criterion) {
    let mut rt = runtime();
    rt.eval_str("(label add (lambda (a b) (+ a b)))").unwrap();
    c.bench_function("eval lambda invocation", |b| {
        b.iter(|| black_box(rt.eval_str("(add 1 2)").unwrap()))
    });
}

fn bench_recursive_factorial(c: &mut Criterion) {
    let mut rt = runtime();
    rt.eval_str(
        r#"
        (label factorial (lambda (n)
            (cond
                ((< n 1) 1)
                (t (* n (factorial (- n 1)))))))
    "#,
    )
    .unwrap();

    c.bench_function("recursive factorial(10)", |b| {
        b.iter(|| black_box(rt.eval_str("(factorial 10)").unwrap()))
    });
}

fn bench_recursive_fibonacci(c: &mut Criterion) {
    let mut rt = runtime();
    rt.eval_str(
        r#"
        (label fib (lambda (n)
            (cond
                ((< n 2) n)
                (t (+ (fib (- n 1)) (fib (- n 2)))))))
    "#,
    )
    .unwrap();

    c.bench_function("recursive fibonacci(15)", |b| {
        b.iter(|| black_box(rt.eval_str("(fib 15)").unwrap()))
    });
}

// ============================================================================
// Collector Benchmarks
// ============================================================================

fn bench_collect_live_heap(c: &mut Criterion) {
    let mut rt = runtime();
    rt.eval_str(
        r#"
        (label range (lambda (n acc)
            (cond ((< n 1) acc) (t (range (- n 1) (cons n acc))))))
        (label data (range 500 ()))
    "#,
    )
    .unwrap();

    c.bench_function("collect with 500-element live list", |b| {
        b.iter(|| black_box(rt.collect()))
    });
}

fn bench_allocation_pressure(c: &mut Criterion) {
    let mut rt = Runtime::new(Config::default().with_heap_cells(2048)).unwrap();
    rt.eval_str(
        r#"
        (label count (lambda (n acc)
            (cond ((< n 1) acc) (t (count (- n 1) (+ acc 1))))))
    "#,
    )
    .unwrap();

    c.bench_function("eval with frequent collections", |b| {
        b.iter(|| black_box(rt.eval_str("(count 100 0)").unwrap()))
    });
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group! {
    name = reader_benches;
    config = Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(10));
    targets =
        bench_read_small,
        bench_read_large_list,
        bench_read_deep_nesting
}

criterion_group! {
    name = eval_benches;
    config = Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(10));
    targets =
        bench_eval_arithmetic,
        bench_eval_lambda_invocation,
        bench_recursive_factorial,
        bench_recursive_fibonacci
}

criterion_group! {
    name = gc_benches;
    config = Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(10));
    targets =
        bench_collect_live_heap,
        bench_allocation_pressure
}

criterion_main!(reader_benches, eval_benches, gc_benches);

#[macro_use]
extern crate criterion;

use criterion::Criterion;

use petitgraph::charset::digit;
use petitgraph::node::Parser;

fn digit_sequence() -> Parser {
    digit("digit expected").plus()
}

fn large_digit_run(c: &mut Criterion) {
    let input: String = "7".repeat(100_000);
    let parser = digit_sequence();

    parser.parse(&input).into_value().expect("should parse correctly");
    c.bench_function("large digit run", move |b| {
        b.iter(|| parser.parse(&input));
    });
}

fn large_digit_run_fast_path(c: &mut Criterion) {
    let input: String = "7".repeat(100_000);
    let parser = digit_sequence();

    c.bench_function("large digit run (accept only)", move |b| {
        b.iter(|| parser.accept(&input));
    });
}

fn deeply_nested_choice(c: &mut Criterion) {
    let mut letter = petitgraph::charset::char('a', None);
    for ch in 'b'..='z' {
        letter = letter.or(&[petitgraph::charset::char(ch, None)]);
    }
    let parser = letter.star();
    let input = "z".repeat(10_000);

    c.bench_function("deeply nested choice", move |b| {
        b.iter(|| parser.parse(&input));
    });
}

criterion_group!(
    benches,
    large_digit_run,
    large_digit_run_fast_path,
    deeply_nested_choice
);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sat_stats::record::{parse_records, RecordFormat};

// 100 runs per parameter, every third one unsolved, as the DPLL logs look.
fn dpll_log(runs: usize) -> String {
    let mut log = String::new();
    for run in 0..runs {
        if run % 3 == 0 {
            log.push_str("\n\nNO SOLUTION found with dpll within the time limit...\n");
        } else {
            log.push_str("\n\nSolution found with dpll!\n");
            log.push_str(&"P1=true  P2=false  ".repeat(50));
            log.push('\n');
        }
        log.push_str(&format!("Time spent: {:.6} secs\n", run as f64 * 0.013));
        log.push_str("Number of steps: 1234\n");
    }
    log
}

fn bench_parse_records(c: &mut Criterion) {
    let log = dpll_log(100);
    c.bench_function("parse_records dpll 100 runs", |b| {
        b.iter(|| parse_records(black_box(&log), RecordFormat::DPLL).unwrap())
    });
}

criterion_group!(benches, bench_parse_records);
criterion_main!(benches);
